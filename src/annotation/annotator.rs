use std::sync::Arc;

use tracing::{debug, info};

use super::classifier::Classifier;
use super::prompt::{Prompt, build_prompt};
use super::response::AnnotationResponse;
use crate::completion::{CompletionClient, CompletionError};
use crate::config::AnnotatorConfig;

/// One configured annotator bound to a completion client.
///
/// # Examples
///
/// ```no_run
/// use llm_annotator::annotation::Annotator;
/// use llm_annotator::completion::{CompletionClientFactory, HttpClientFactory};
/// use llm_annotator::config::{AnnotatorConfig, AnnotatorMode, ModelConfig, Provider};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let model = ModelConfig::new("local", Provider::Ollama, "llama3.1:8b");
/// let client = HttpClientFactory.connect(&model)?;
///
/// let config = AnnotatorConfig::new(
///     "stock-chat-tagging",
///     AnnotatorMode::MultiLabel,
///     "Tag finance chat messages.",
///     &["US Stock", "Accounting"],
/// );
/// let annotator = Annotator::new(&config, client);
///
/// let response = annotator.annotate("TSLA beat earnings, margins look thin")?;
/// println!("{:?}", response.tags);
/// # Ok(())
/// # }
/// ```
pub struct Annotator {
    name: String,
    instruction: String,
    classifier: Classifier,
    client: Arc<dyn CompletionClient>,
}

impl Annotator {
    pub fn new(config: &AnnotatorConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            name: config.name.clone(),
            instruction: config.instruction.clone(),
            classifier: Classifier::from_config(config),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Prompt that `annotate` would send for `context`.
    pub fn prompt(&self, context: &str) -> Prompt {
        build_prompt(&self.classifier, &self.instruction, context)
    }

    /// Runs prompt construction, one completion call and classification.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` only when the completion call itself fails.
    /// Unparseable replies come back as `Ok` with a `failed` status.
    pub fn annotate(&self, context: &str) -> Result<AnnotationResponse, CompletionError> {
        let messages = self.prompt(context).into_messages();
        debug!(annotator = %self.name, mode = %self.classifier.mode(), "requesting completion");

        let reply = self.client.complete(&messages)?;
        let response = self.classifier.classify(&reply);

        info!(
            annotator = %self.name,
            status = %response.status,
            tags = response.tags.len(),
            "annotation finished"
        );
        Ok(response)
    }
}
