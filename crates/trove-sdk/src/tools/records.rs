//! Record tools: trove_get_record, trove_resolve_pid.

use serde_json::{Value, json};

use super::{McpTool, ToolContext, parse_args, to_json};
use crate::citation::{Pid, extract_pids_from_value};
use crate::client::{RecordOptions, Resolved};
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{AnyRecord, GetRecordInput, ResolvePidInput, ResponseFormat};

fn record_options_schema() -> Value {
    json!({
        "recordLevel": {"type": "string", "enum": ["brief", "full"], "default": "full"},
        "include": {
            "type": "array",
            "items": {"type": "string", "enum": [
                "tags", "comments", "lists", "links", "workversions", "holdings",
                "subscribinginstitutions", "articletext"
            ]}
        },
        "responseFormat": {"type": "string", "enum": ["markdown", "json"], "default": "markdown"}
    })
}

fn with_record_options(mut properties: Value) -> Value {
    if let (Some(props), Value::Object(extra)) = (properties.as_object_mut(), record_options_schema()) {
        props.extend(extra);
    }
    properties
}

fn render_record(record: &AnyRecord, format: ResponseFormat) -> ToolResult<String> {
    match format {
        ResponseFormat::Markdown => {
            let mut output = formatters::format_record_markdown(record, 1);
            let pids = extract_pids_from_value(record.raw());
            if !pids.is_empty() {
                output.push_str("\n**Identifiers**:\n");
                for pid in pids {
                    output.push_str(&format!("- {} ({:?})\n", pid.persistent_url(), pid.kind));
                }
            }
            Ok(output)
        }
        ResponseFormat::Json => to_json(record.raw()),
    }
}

/// Fetch one record by type and ID.
pub struct GetRecordTool;

#[async_trait::async_trait]
impl McpTool for GetRecordTool {
    fn name(&self) -> &'static str {
        "trove_get_record"
    }

    fn description(&self) -> &'static str {
        "Fetch a single Trove record (work, newspaper or gazette article, person, list) by ID. \
         JSON output returns the record exactly as the API sent it."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": with_record_options(json!({
                "type": {
                    "type": "string",
                    "enum": ["work", "newspaper", "gazette", "people", "list"],
                    "description": "Record type"
                },
                "id": {"type": "string", "minLength": 1, "pattern": "^[A-Za-z0-9._:-]+$"}
            })),
            "required": ["type", "id"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: GetRecordInput = parse_args(input)?;
        let options = RecordOptions {
            record_level: params.record_level,
            include: params.include,
            ..RecordOptions::default()
        };

        let record = ctx.client.get_record(params.record_type, &params.id, &options).await?;
        render_record(&record, params.response_format)
    }
}

/// Resolve a PID or Trove URL and fetch what it names.
pub struct ResolvePidTool;

#[async_trait::async_trait]
impl McpTool for ResolvePidTool {
    fn name(&self) -> &'static str {
        "trove_resolve_pid"
    }

    fn description(&self) -> &'static str {
        "Resolve a persistent identifier (e.g., 'nla.news-article18341291') or a Trove URL \
         to its record or newspaper title."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": with_record_options(json!({
                "pid": {
                    "type": "string",
                    "minLength": 1,
                    "description": "PID or Trove/NLA URL"
                }
            })),
            "required": ["pid"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ResolvePidInput = parse_args(input)?;
        let pid = Pid::parse(&params.pid).ok_or_else(|| {
            ToolError::validation("pid", format!("'{}' is not a recognised Trove identifier", params.pid))
        })?;
        let options = RecordOptions {
            record_level: params.record_level,
            include: params.include,
            ..RecordOptions::default()
        };

        tracing::debug!(kind = ?pid.kind, id = %pid.id, "resolving pid");

        match ctx.client.resolve_pid(&pid, &options).await? {
            Resolved::Record(record) => render_record(&record, params.response_format),
            Resolved::Title(title) => match params.response_format {
                ResponseFormat::Markdown => Ok(formatters::format_title_markdown(&title)),
                ResponseFormat::Json => to_json(title.raw()),
            },
        }
    }
}
