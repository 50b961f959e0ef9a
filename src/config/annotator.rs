use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default cap on newly coined labels for zero-shot annotators.
pub const DEFAULT_MAX_NEW_LABELS: usize = 3;

/// Classification behavior of an annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnnotatorMode {
    /// Tags must come from the configured label set.
    MultiLabel,
    /// Configured labels are preferred; a bounded number of new ones is allowed.
    ZeroShotMultiLabel,
}

impl AnnotatorMode {
    pub const ALL: [Self; 2] = [Self::MultiLabel, Self::ZeroShotMultiLabel];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiLabel => "multilabel",
            Self::ZeroShotMultiLabel => "zeroshot-multilabel",
        }
    }
}

impl fmt::Display for AnnotatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mode string that does not name any supported `AnnotatorMode`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown annotator mode: '{mode}'. Supported modes: {}", supported_modes())]
pub struct UnsupportedModeError {
    pub mode: String,
}

fn supported_modes() -> String {
    AnnotatorMode::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for AnnotatorMode {
    type Err = UnsupportedModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnsupportedModeError {
                mode: s.to_string(),
            })
    }
}

impl TryFrom<String> for AnnotatorMode {
    type Error = UnsupportedModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AnnotatorMode> for String {
    fn from(mode: AnnotatorMode) -> Self {
        mode.as_str().to_string()
    }
}

/// One configured annotator: mode, instruction and label set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    pub name: String,
    #[serde(alias = "type")]
    pub mode: AnnotatorMode,
    pub instruction: String,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Only meaningful for `zeroshot-multilabel`.
    #[serde(default = "default_max_new_labels")]
    pub max_new_labels: usize,
}

fn default_max_new_labels() -> usize {
    DEFAULT_MAX_NEW_LABELS
}

impl AnnotatorConfig {
    pub fn new(
        name: impl Into<String>,
        mode: AnnotatorMode,
        instruction: impl Into<String>,
        labels: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            mode,
            instruction: instruction.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            max_new_labels: DEFAULT_MAX_NEW_LABELS,
        }
    }

    pub fn with_max_new_labels(mut self, max_new_labels: usize) -> Self {
        self.max_new_labels = max_new_labels;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("annotator entry has an empty name".to_string());
        }
        if self.instruction.trim().is_empty() {
            return Err(format!("annotator '{}' has an empty instruction", self.name));
        }
        if self.mode == AnnotatorMode::MultiLabel && self.labels.is_empty() {
            return Err(format!(
                "annotator '{}' uses mode '{}' but configures no labels",
                self.name, self.mode
            ));
        }
        Ok(())
    }
}
