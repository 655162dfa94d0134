//! Execute planned requests over HTTP

use openapi_fragment::{FieldSet, HttpMethod, OperationDescriptor};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::plan::RequestPlan;
use crate::error::{PanelError, RequestFailure};
use crate::form::FieldValues;
use crate::settings::PanelSettings;

/// A response that decoded as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutedResponse {
    /// HTTP status code
    pub status: u16,
    /// Declared response key matching the status (`"200"`, `"2XX"` or `"default"`)
    pub matched_response: Option<String>,
    /// Response body pretty-printed with two-space indentation
    pub body: String,
}

/// Pretty or failed result of one request
pub type RequestOutcome = std::result::Result<ExecutedResponse, RequestFailure>;

/// Sends requests for a panel. No retries are performed.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
}

impl RequestExecutor {
    /// Create an executor configured from settings
    pub fn new(settings: &PanelSettings) -> crate::error::Result<Self> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| PanelError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Plan and send a request for `operation` using submitted values
    pub async fn execute_values(
        &self,
        operation: &OperationDescriptor,
        fields: &FieldSet,
        values: &FieldValues,
        server_url: &str,
    ) -> RequestOutcome {
        let plan = RequestPlan::build(operation, fields, values, server_url)?;
        self.execute(&plan).await
    }

    /// Send a planned request and decode its JSON response
    pub async fn execute(&self, plan: &RequestPlan) -> RequestOutcome {
        let method = match plan.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut request = self
            .client
            .request(method.clone(), plan.url.clone())
            .headers(plan.headers.clone());

        if let Some(body) = &plan.body {
            // Content-Type is already in the planned headers
            request = request.body(serde_json::to_vec(body).map_err(|e| {
                RequestFailure::Network(format!("failed to encode request body: {}", e))
            })?);
        }

        info!("Executing {} {}", method, plan.url);

        let response = request
            .send()
            .await
            .map_err(|e| RequestFailure::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let response_text = response
            .text()
            .await
            .map_err(|e| RequestFailure::Network(format!("failed to read response: {}", e)))?;

        debug!("Response status: {}", status);

        let matched_response = plan
            .declared_responses
            .as_deref()
            .and_then(|declared| match_declared_response(status, declared));

        let body = decode_body(status, content_type.as_deref(), &response_text)?;

        Ok(ExecutedResponse {
            status,
            matched_response,
            body,
        })
    }
}

/// Decode a response body as JSON and pretty-print it
pub fn decode_body(
    status: u16,
    content_type: Option<&str>,
    text: &str,
) -> Result<String, RequestFailure> {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => serde_json::to_string_pretty(&json).map_err(|e| RequestFailure::Decode {
            status,
            reason: e.to_string(),
        }),
        Err(e) => match content_type {
            Some(ct) if !ct.contains("json") => {
                warn!("Non-JSON response ({}) with status {}", ct, status);
                Err(RequestFailure::NonJsonBody {
                    status,
                    content_type: ct.to_string(),
                })
            }
            _ => Err(RequestFailure::Decode {
                status,
                reason: e.to_string(),
            }),
        },
    }
}

/// Find the declared response key for a status: exact code, then range, then default
pub fn match_declared_response(status: u16, declared: &[String]) -> Option<String> {
    let exact = status.to_string();
    let range = format!("{}XX", status / 100);

    declared
        .iter()
        .find(|key| **key == exact)
        .or_else(|| declared.iter().find(|key| key.eq_ignore_ascii_case(&range)))
        .or_else(|| declared.iter().find(|key| *key == "default"))
        .cloned()
}
