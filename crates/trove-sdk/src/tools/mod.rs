//! MCP tool implementations.
//!
//! Each tool:
//! 1. Validates its arguments against its input schema
//! 2. Calls the Trove client
//! 3. Formats results as Markdown or JSON

mod citations;
mod records;
pub mod schema;
mod search;
mod titles;

pub use citations::*;
pub use records::*;
pub use search::*;
pub use titles::*;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::TroveClient;
use crate::error::{ToolError, ToolResult};

/// Tool execution context.
pub struct ToolContext {
    /// API client.
    pub client: Arc<TroveClient>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(client: Arc<TroveClient>) -> Self {
        Self { client }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "trove_search").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool with already-validated input.
    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String>;

    /// Validate `input` against [`input_schema`](Self::input_schema), then execute.
    async fn call(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        schema::validate(&self.input_schema(), &input)?;
        self.execute(ctx, input).await
    }
}

/// Decode schema-checked arguments into a tool's input type.
pub(crate) fn parse_args<T: DeserializeOwned>(input: Value) -> ToolResult<T> {
    serde_json::from_value(input).map_err(ToolError::Serialization)
}

/// Pretty-printed JSON output for `ResponseFormat::Json`.
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> ToolResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::internal(format!("encoding tool output: {e}")))
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Search (3)
        Box::new(search::SearchTool),
        Box::new(search::HarvestTool),
        Box::new(search::SearchCategoriesTool),
        // Records (2)
        Box::new(records::GetRecordTool),
        Box::new(records::ResolvePidTool),
        // Titles and contributors (4)
        Box::new(titles::ListTitlesTool),
        Box::new(titles::GetTitleTool),
        Box::new(titles::SearchContributorsTool),
        Box::new(titles::GetContributorTool),
        // Citations (2)
        Box::new(citations::CiteTool),
        Box::new(citations::ExtractPidsTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashSet};

    use crate::models::GetContributorInput;

    #[test]
    fn test_tool_names_unique_and_prefixed() {
        let tools = register_all_tools();
        assert_eq!(tools.len(), 11);
        let names: HashSet<_> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), tools.len());
        assert!(names.iter().all(|n| n.starts_with("trove_")));
    }

    #[test]
    fn test_schemas_are_closed_objects() {
        for tool in register_all_tools() {
            let schema = tool.input_schema();
            assert_eq!(schema["type"], "object", "{}", tool.name());
            assert_eq!(schema["additionalProperties"], false, "{}", tool.name());
            assert!(!tool.description().is_empty());
        }
    }

    #[test]
    fn test_argument_and_output_errors_are_classified_apart() {
        let err = parse_args::<GetContributorInput>(serde_json::json!({"nuc": 5})).unwrap_err();
        assert!(matches!(err, ToolError::Serialization(_)));
        assert!(err.is_invalid_input());

        // JSON object keys must be strings.
        let unencodable = BTreeMap::from([((1u8, 2u8), 3u8)]);
        let err = to_json(&unencodable).unwrap_err();
        assert!(matches!(err, ToolError::Internal(_)));
        assert!(!err.is_invalid_input());
    }
}
