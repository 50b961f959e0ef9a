//! Tool and resource definitions advertised by the MCP server.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Name of the single tool exposed by the server.
pub const ANNOTATE_TOOL: &str = "annotate";

pub const ANNOTATORS_URI: &str = "annotator://annotators";
pub const MODELS_URI: &str = "annotator://models";

/// MCP tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// MCP resource definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Arguments of the `annotate` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotateArgs {
    pub context: String,
    #[serde(default)]
    pub annotator: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: ANNOTATE_TOOL.to_string(),
        description: "Annotate text with tags using an LLM. Returns tags, status and metadata."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "context": {
                    "type": "string",
                    "description": "Text context to annotate"
                },
                "annotator": {
                    "type": "string",
                    "description": "Annotator name to use (default: first annotator in config)"
                },
                "model": {
                    "type": "string",
                    "description": "Model name to use (default: first model in config)"
                }
            },
            "required": ["context"]
        }),
    }]
}

pub fn resource_definitions() -> Vec<ResourceDefinition> {
    vec![
        ResourceDefinition {
            uri: ANNOTATORS_URI.to_string(),
            name: "annotators".to_string(),
            description: "List all available annotators".to_string(),
            mime_type: "application/json".to_string(),
        },
        ResourceDefinition {
            uri: MODELS_URI.to_string(),
            name: "models".to_string(),
            description: "List all available models".to_string(),
            mime_type: "application/json".to_string(),
        },
    ]
}
