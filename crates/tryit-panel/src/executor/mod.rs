//! Request planning and execution

mod client;
mod plan;

pub use client::{
    decode_body, match_declared_response, ExecutedResponse, RequestExecutor, RequestOutcome,
};
pub use plan::{resolve_server_url, RequestPlan};
