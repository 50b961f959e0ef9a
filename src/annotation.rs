//! The annotation pipeline.
//!
//! A call flows through four stages: the prompt is built from the annotator's
//! instruction and labels, one completion request is made, code fences are
//! stripped from the reply, and the classifier turns the remaining JSON into
//! a tag list.

mod annotator;
mod classifier;
mod prompt;
mod response;
mod sanitize;

pub use annotator::Annotator;
pub use classifier::{Classifier, ExtractError, extract_tags};
pub use prompt::{
    Prompt, SYSTEM_TEMPLATE_MULTILABEL, SYSTEM_TEMPLATE_ZEROSHOT, USER_TEMPLATE, build_prompt,
    format_labels,
};
pub use response::{
    AnnotationMetadata, AnnotationResponse, AnnotationStatus, RAW_RESPONSE_EXCERPT_CHARS, excerpt,
};
pub use sanitize::sanitize_response;
