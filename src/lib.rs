pub mod annotation;
pub mod completion;
pub mod config;
pub mod mcp;
pub mod server;
pub mod service;

#[cfg(test)]
mod testing;

pub use annotation::{AnnotationMetadata, AnnotationResponse, AnnotationStatus, Annotator};
pub use config::{Config, ConfigError, LookupError, load_config};
pub use service::{AnnotateError, AnnotationService};
