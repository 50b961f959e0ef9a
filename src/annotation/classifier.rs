//! Turning a sanitized model reply into a tag list.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::response::{AnnotationMetadata, AnnotationResponse, excerpt};
use super::sanitize::sanitize_response;
use crate::config::{AnnotatorConfig, AnnotatorMode};

/// Reasons a reply could not be turned into a tag list.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("'tags' must be a list, got {0}")]
    TagsNotAList(&'static str),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Parses `{"tags": [...]}` out of a raw model reply.
///
/// The reply is sanitized first. A missing `tags` key yields an empty list.
/// Entries of `tags` that are not strings can never match a label and are
/// dropped.
///
/// # Errors
///
/// Returns `ExtractError` if the sanitized text is not JSON, is not an object,
/// or if `tags` is not a list.
pub fn extract_tags(raw_response: &str) -> Result<Vec<String>, ExtractError> {
    let cleaned = sanitize_response(raw_response);
    let value: Value = serde_json::from_str(&cleaned)?;

    let Value::Object(mut object) = value else {
        return Err(ExtractError::NotAnObject(json_kind(&value)));
    };

    let tags = match object.remove("tags") {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(ExtractError::TagsNotAList(json_kind(&other))),
    };

    Ok(tags
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::String(tag) => Some(tag),
            other => {
                debug!(index, kind = json_kind(&other), "skipping non-string tag entry");
                None
            }
        })
        .collect())
}

/// Classification strategy of an annotator, resolved once from its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classifier {
    /// Keep only tags that are members of `labels`.
    FixedLabel { labels: Vec<String> },
    /// Keep members of `labels` plus at most `max_new_labels` other tags.
    ZeroShot {
        labels: Vec<String>,
        max_new_labels: usize,
    },
}

impl Classifier {
    pub fn from_config(config: &AnnotatorConfig) -> Self {
        match config.mode {
            AnnotatorMode::MultiLabel => Self::FixedLabel {
                labels: config.labels.clone(),
            },
            AnnotatorMode::ZeroShotMultiLabel => Self::ZeroShot {
                labels: config.labels.clone(),
                max_new_labels: config.max_new_labels,
            },
        }
    }

    pub fn mode(&self) -> AnnotatorMode {
        match self {
            Self::FixedLabel { .. } => AnnotatorMode::MultiLabel,
            Self::ZeroShot { .. } => AnnotatorMode::ZeroShotMultiLabel,
        }
    }

    pub fn labels(&self) -> &[String] {
        match self {
            Self::FixedLabel { labels } | Self::ZeroShot { labels, .. } => labels,
        }
    }

    /// Cap on new labels; `None` for fixed-label classification.
    pub fn max_new_labels(&self) -> Option<usize> {
        match self {
            Self::FixedLabel { .. } => None,
            Self::ZeroShot { max_new_labels, .. } => Some(*max_new_labels),
        }
    }

    /// Classifies a raw model reply.
    ///
    /// Never fails: extraction problems produce a `failed` response carrying
    /// the error text and an excerpt of the reply.
    pub fn classify(&self, raw_response: &str) -> AnnotationResponse {
        let raw_tags = match extract_tags(raw_response) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(error = %e, mode = %self.mode(), "could not extract tags from model reply");
                return AnnotationResponse::failed(e.to_string(), Some(excerpt(raw_response)));
            }
        };

        let known: HashSet<&str> = self.labels().iter().map(String::as_str).collect();
        let raw_excerpt = Some(excerpt(raw_response));

        match self {
            Self::FixedLabel { .. } => {
                let tags = raw_tags
                    .iter()
                    .filter(|t| known.contains(t.as_str()))
                    .cloned()
                    .collect();
                AnnotationResponse::success(
                    tags,
                    AnnotationMetadata {
                        raw_tags: Some(raw_tags),
                        raw_response: raw_excerpt,
                        ..Default::default()
                    },
                )
            }
            Self::ZeroShot { max_new_labels, .. } => {
                let (predefined, mut new): (Vec<String>, Vec<String>) = raw_tags
                    .iter()
                    .cloned()
                    .partition(|t| known.contains(t.as_str()));
                new.truncate(*max_new_labels);

                let tags = predefined.iter().chain(new.iter()).cloned().collect();
                AnnotationResponse::success(
                    tags,
                    AnnotationMetadata {
                        raw_tags: Some(raw_tags),
                        predefined_tags: Some(predefined),
                        new_tags: Some(new),
                        raw_response: raw_excerpt,
                        ..Default::default()
                    },
                )
            }
        }
    }
}
