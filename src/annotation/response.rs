use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters of the raw model reply kept in metadata.
pub const RAW_RESPONSE_EXCERPT_CHARS: usize = 200;

/// Outcome of one annotation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStatus {
    /// The reply parsed; `tags` may still be empty.
    #[default]
    Success,
    /// The reply could not be sanitized or parsed.
    Failed,
}

impl fmt::Display for AnnotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Diagnostic payload attached to an `AnnotationResponse`.
///
/// Which fields are present depends on the annotator mode and the outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationMetadata {
    /// Tags exactly as the model returned them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_tags: Option<Vec<String>>,
    /// Returned tags that belong to the configured label set (zero-shot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predefined_tags: Option<Vec<String>>,
    /// Accepted tags outside the label set, after the cap (zero-shot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// First `RAW_RESPONSE_EXCERPT_CHARS` characters of the model reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Result of one annotation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResponse {
    pub tags: Vec<String>,
    pub status: AnnotationStatus,
    /// Reserved; no annotator produces a score yet.
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnnotationMetadata>,
}

impl AnnotationResponse {
    pub fn success(tags: Vec<String>, metadata: AnnotationMetadata) -> Self {
        Self {
            tags,
            status: AnnotationStatus::Success,
            confidence: None,
            metadata: Some(metadata),
        }
    }

    /// A failed result with no tags, carrying `error` and an optional reply excerpt.
    pub fn failed(error: impl Into<String>, raw_response: Option<String>) -> Self {
        Self {
            tags: Vec::new(),
            status: AnnotationStatus::Failed,
            confidence: None,
            metadata: Some(AnnotationMetadata {
                error: Some(error.into()),
                raw_response,
                ..Default::default()
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AnnotationStatus::Success
    }

    /// Error text recorded in the metadata, if any.
    pub fn error(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.error.as_deref())
    }
}

/// Truncates a model reply to the excerpt kept for debugging.
pub fn excerpt(text: &str) -> String {
    text.chars().take(RAW_RESPONSE_EXCERPT_CHARS).collect()
}
