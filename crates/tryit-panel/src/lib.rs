//! # tryit-panel
//!
//! Interactive "try it out" panel for a single OpenAPI operation.
//! Builds a form from the operation, validates it on submit and sends
//! the request to the selected server, keeping the pretty-printed result.

pub mod error;
pub mod executor;
pub mod form;
mod panel;
pub mod settings;
pub mod view;

pub use error::{PanelError, RequestFailure, Result};
pub use executor::{ExecutedResponse, RequestExecutor, RequestOutcome, RequestPlan};
pub use form::{FieldValues, FormModel, FormState, ValidationErrors};
pub use panel::{CompletedSubmission, Panel, PendingSubmission, SubmitBlocked};
pub use settings::{PanelSettings, SettingsManager};
pub use view::{mount, mount_selected, RenderTarget, TextTarget};

pub use openapi_fragment as fragment;
