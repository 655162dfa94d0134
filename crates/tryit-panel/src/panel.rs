//! Per-instance panel state and the submit state machine

use openapi_fragment::{
    FieldKey, FieldSet, OperationDescriptor, OperationResolver, OperationSelector,
    SchemaFieldExtractor, ServerEntry,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{PanelError, RequestFailure, Result};
use crate::executor::{resolve_server_url, RequestExecutor, RequestOutcome, RequestPlan};
use crate::form::{lookup_field, FormModel, ValidationErrors};
use crate::settings::PanelSettings;

/// Why a submission did not start
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitBlocked {
    /// Some required fields are empty; errors are shown inline
    Invalid(ValidationErrors),
    /// The request could not be built; shown in the result area
    Request(RequestFailure),
}

/// A submission that has been validated and snapshotted, not yet sent
#[derive(Debug)]
pub struct PendingSubmission {
    panel_id: Uuid,
    generation: u64,
    plan: RequestPlan,
    cancel: CancellationToken,
}

impl PendingSubmission {
    pub fn plan(&self) -> &RequestPlan {
        &self.plan
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Send the request unless the submission is cancelled first
    pub async fn run(self, executor: &RequestExecutor) -> CompletedSubmission {
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RequestFailure::Cancelled),
            result = executor.execute(&self.plan) => result,
        };

        CompletedSubmission {
            panel_id: self.panel_id,
            generation: self.generation,
            outcome,
        }
    }
}

/// Result of a finished submission, to be handed back to its panel
#[derive(Debug)]
pub struct CompletedSubmission {
    panel_id: Uuid,
    generation: u64,
    pub outcome: RequestOutcome,
}

/// One rendered operation: descriptor, form, server choice and last result
#[derive(Debug)]
pub struct Panel {
    id: Uuid,
    operation: OperationDescriptor,
    fields: FieldSet,
    form: FormModel,
    servers: Vec<ServerEntry>,
    selected_server: usize,
    server_base: Option<String>,
    generation: u64,
    in_flight: Option<CancellationToken>,
    outcome: Option<RequestOutcome>,
}

impl Panel {
    /// Build a panel for an already resolved operation
    pub fn new(operation: OperationDescriptor, settings: &PanelSettings) -> Self {
        let fields = SchemaFieldExtractor::extract(&operation);
        let form = FormModel::new(&fields);

        let servers = if operation.servers.is_empty() {
            settings
                .fallback_server_url
                .iter()
                .map(|url| ServerEntry {
                    url: url.clone(),
                    description: Some("fallback".to_string()),
                })
                .collect()
        } else {
            operation.servers.clone()
        };

        let id = Uuid::new_v4();
        debug!("Created panel {} for {} {}", id, operation.method, operation.path);

        Self {
            id,
            operation,
            fields,
            form,
            servers,
            selected_server: 0,
            server_base: settings.fallback_server_url.clone(),
            generation: 0,
            in_flight: None,
            outcome: None,
        }
    }

    /// Resolve the first operation in `payload` and build its panel
    pub fn from_payload(payload: &str, settings: &PanelSettings) -> Result<Self> {
        let operation = OperationResolver::resolve(payload)?;
        Ok(Self::new(operation, settings))
    }

    /// Resolve the chosen operation in `payload` and build its panel
    pub fn from_payload_selected(
        payload: &str,
        selector: &OperationSelector,
        settings: &PanelSettings,
    ) -> Result<Self> {
        let operation = OperationResolver::resolve_selected(payload, selector)?;
        Ok(Self::new(operation, settings))
    }

    pub fn operation(&self) -> &OperationDescriptor {
        &self.operation
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    pub fn servers(&self) -> &[ServerEntry] {
        &self.servers
    }

    pub fn selected_server_index(&self) -> usize {
        self.selected_server
    }

    pub fn selected_server(&self) -> Option<&ServerEntry> {
        self.servers.get(self.selected_server)
    }

    /// Choose the server for the next submission. Field values are kept.
    pub fn select_server(&mut self, index: usize) -> Result<()> {
        if index >= self.servers.len() {
            return Err(PanelError::ServerOutOfRange {
                index,
                count: self.servers.len(),
            });
        }
        self.selected_server = index;
        Ok(())
    }

    pub fn set_value(&mut self, key: &FieldKey, value: impl Into<String>) -> Result<()> {
        self.form.set_value(key, value)
    }

    /// Set a field by bare name or `location.name`
    pub fn set_named(&mut self, reference: &str, value: impl Into<String>) -> Result<()> {
        let key = lookup_field(&self.fields, reference)?;
        self.form.set_value(&key, value)
    }

    /// Clear all values, errors and the last outcome
    pub fn reset(&mut self) {
        self.cancel_in_flight();
        self.form.reset(&self.fields);
        self.outcome = None;
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn outcome(&self) -> Option<&RequestOutcome> {
        self.outcome.as_ref()
    }

    /// Validate and snapshot the form.
    ///
    /// A previous in-flight submission is cancelled; only the returned
    /// submission can update this panel.
    pub fn begin_submit(&mut self) -> std::result::Result<PendingSubmission, SubmitBlocked> {
        let values = self.form.submit().map_err(SubmitBlocked::Invalid)?;

        let plan = match self.selected_server() {
            Some(server) => resolve_server_url(&server.url, self.server_base.as_deref())
                .and_then(|url| RequestPlan::build(&self.operation, &self.fields, &values, &url)),
            None => Err(RequestFailure::NoServer),
        };
        let plan = match plan {
            Ok(plan) => plan,
            Err(failure) => {
                self.cancel_in_flight();
                self.outcome = Some(Err(failure.clone()));
                return Err(SubmitBlocked::Request(failure));
            }
        };

        self.cancel_in_flight();
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());

        debug!("Panel {} submission {} started", self.id, self.generation);

        Ok(PendingSubmission {
            panel_id: self.id,
            generation: self.generation,
            plan,
            cancel,
        })
    }

    /// Apply a finished submission. Returns false if it was stale and dropped.
    pub fn complete(&mut self, done: CompletedSubmission) -> bool {
        if done.panel_id != self.id
            || done.generation != self.generation
            || self.in_flight.is_none()
        {
            debug!(
                "Dropping stale submission {} for panel {}",
                done.generation, self.id
            );
            return false;
        }

        match &done.outcome {
            Ok(response) => info!("Request finished with status {}", response.status),
            Err(failure) => info!("Request failed: {}", failure),
        }

        self.in_flight = None;
        self.generation += 1;
        self.outcome = Some(done.outcome);
        true
    }

    /// Validate, send and apply in one step
    pub async fn submit(
        &mut self,
        executor: &RequestExecutor,
    ) -> std::result::Result<&RequestOutcome, SubmitBlocked> {
        let pending = self.begin_submit()?;
        let done = pending.run(executor).await;
        self.complete(done);
        self.outcome
            .as_ref()
            .ok_or(SubmitBlocked::Request(RequestFailure::Cancelled))
    }

    /// Tear down: any in-flight submission is cancelled and its result ignored
    pub fn unmount(&mut self) {
        self.cancel_in_flight();
        debug!("Panel {} unmounted", self.id);
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            debug!("Cancelling submission {} of panel {}", self.generation, self.id);
            token.cancel();
            self.generation += 1;
        }
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}
