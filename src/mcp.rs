//! Model Context Protocol server.
//!
//! Exposes one tool, `annotate(context, annotator?, model?)`, and two
//! read-only resources, `annotator://annotators` and `annotator://models`.
//! Tool failures are reported in-band as a `failed` annotation result rather
//! than as JSON-RPC errors.

mod handler;
mod protocol;
mod tools;
mod transport;

pub use handler::McpHandler;
pub use protocol::{
    JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, error_codes,
};
pub use tools::{
    ANNOTATE_TOOL, ANNOTATORS_URI, AnnotateArgs, MODELS_URI, ResourceDefinition, ToolDefinition,
    resource_definitions, tool_definitions,
};
pub use transport::{create_mcp_router, run_stdio, serve_http};

use std::fmt;
use std::str::FromStr;

/// Transport selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Stdio,
    /// Also accepted as `streamable-http`.
    Http,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Self::Stdio),
            "http" | "streamable-http" => Ok(Self::Http),
            other => Err(format!(
                "unknown transport '{}', expected stdio or http",
                other
            )),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}
