use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::annotation::{AnnotationResponse, Annotator};
use crate::completion::{CompletionClientFactory, CompletionError, HttpClientFactory};
use crate::config::{Config, LookupError};

/// Errors surfaced by `AnnotationService::annotate`.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// The requested annotator or model is not configured.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The completion service could not be reached or rejected the request.
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl AnnotateError {
    /// True when the caller asked for something that does not exist.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }
}

/// Orchestrates annotation calls against a loaded configuration.
///
/// The service is UI-independent: the CLI, the HTTP API and the MCP server
/// all hold a clone and call the same methods. Configuration is shared
/// read-only, so clones are cheap and calls never coordinate.
///
/// # Examples
///
/// ```
/// use llm_annotator::AnnotationService;
/// use llm_annotator::config::Config;
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::from_yaml_str(
///     "annotators:\n  - name: a\n    mode: multilabel\n    instruction: x\n    labels: [y]\n",
/// )?;
/// let service = AnnotationService::new(config);
/// assert_eq!(service.list_annotators(), vec!["a"]);
/// assert!(service.list_models().is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AnnotationService {
    config: Arc<Config>,
    factory: Arc<dyn CompletionClientFactory>,
}

impl AnnotationService {
    /// Creates a service that talks to real completion endpoints.
    pub fn new(config: Config) -> Self {
        Self::with_client_factory(config, Arc::new(HttpClientFactory))
    }

    /// Creates a service with a custom client factory.
    ///
    /// Tests use this to substitute a stub completion client.
    pub fn with_client_factory(config: Config, factory: Arc<dyn CompletionClientFactory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves an annotator/model pair and binds it to a fresh client.
    ///
    /// Both lookups complete before the factory is asked for a client, so a
    /// bad name never causes an external call.
    ///
    /// # Errors
    ///
    /// Returns `AnnotateError::Lookup` for unknown or missing entries and
    /// `AnnotateError::Completion` if the client cannot be built.
    pub fn setup_annotator(
        &self,
        annotator_name: Option<&str>,
        model_name: Option<&str>,
    ) -> Result<Annotator, AnnotateError> {
        let annotator_config = self.config.annotator(non_blank(annotator_name))?;
        let model_config = self.config.model(non_blank(model_name))?;

        info!(
            annotator = %annotator_config.name,
            model = %model_config.name,
            mode = %annotator_config.mode,
            "setting up annotator"
        );

        let client = self.factory.connect(model_config)?;
        Ok(Annotator::new(annotator_config, client))
    }

    /// Annotates `context` with the named annotator and model.
    ///
    /// `None` or blank names select the first configured entry.
    ///
    /// # Errors
    ///
    /// Returns `AnnotateError` for lookup and completion failures. A reply
    /// that cannot be parsed is not an error; it yields a `failed` response.
    pub fn annotate(
        &self,
        context: &str,
        annotator_name: Option<&str>,
        model_name: Option<&str>,
    ) -> Result<AnnotationResponse, AnnotateError> {
        let annotator = self.setup_annotator(annotator_name, model_name)?;
        Ok(annotator.annotate(context)?)
    }

    /// Configured annotator names, in configuration order.
    pub fn list_annotators(&self) -> Vec<String> {
        self.config.annotator_names()
    }

    /// Configured model names, in configuration order.
    pub fn list_models(&self) -> Vec<String> {
        self.config.model_names()
    }
}

fn non_blank(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

#[cfg(test)]
#[path = "service/tests.rs"]
mod tests;
