//! Citation tools: trove_cite, trove_extract_pids.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{Value, json};

use super::{McpTool, ToolContext, parse_args, to_json};
use crate::citation::{self, Citation, CitationKind, Pid};
use crate::client::{RecordOptions, Resolved};
use crate::config::limits;
use crate::error::{ToolError, ToolResult};
use crate::models::{AnyRecord, CiteInput, ExtractPidsInput, ResponseFormat};

const MAX_CITATIONS: usize = 50;

/// Generate citations for Trove records.
pub struct CiteTool;

#[async_trait::async_trait]
impl McpTool for CiteTool {
    fn name(&self) -> &'static str {
        "trove_cite"
    }

    fn description(&self) -> &'static str {
        "Generate citations for Trove records given by type and ID or by PID/URL. \
         Styles: apa, mla, chicago, harvard, bibtex, ris, endnote, csv."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "records": {
                    "type": "array",
                    "maxItems": MAX_CITATIONS,
                    "items": {
                        "type": "object",
                        "properties": {
                            "type": {"type": "string", "enum": ["work", "newspaper", "gazette", "people", "list"]},
                            "id": {"type": "string", "minLength": 1, "pattern": "^[A-Za-z0-9._:-]+$"}
                        },
                        "required": ["type", "id"],
                        "additionalProperties": false
                    }
                },
                "pids": {
                    "type": "array",
                    "maxItems": MAX_CITATIONS,
                    "items": {"type": "string", "minLength": 1},
                    "description": "PIDs or Trove URLs"
                },
                "style": {
                    "type": "string",
                    "enum": ["apa", "mla", "chicago", "harvard", "bibtex", "ris", "endnote", "csv"],
                    "default": "apa"
                },
                "accessed": {
                    "type": "string",
                    "pattern": "^\\d{4}-\\d{2}-\\d{2}$",
                    "description": "Access date (YYYY-MM-DD); defaults to today"
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: CiteInput = parse_args(input)?;
        if params.records.is_empty() && params.pids.is_empty() {
            return Err(ToolError::validation("records", "provide at least one record or PID"));
        }
        if params.records.len() + params.pids.len() > MAX_CITATIONS {
            return Err(ToolError::validation(
                "records",
                format!("at most {MAX_CITATIONS} citations per call"),
            ));
        }

        let pids = params
            .pids
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Pid::parse(text).ok_or_else(|| {
                    ToolError::validation(format!("pids[{i}]"), format!("'{text}' is not a Trove identifier"))
                })
            })
            .collect::<ToolResult<Vec<_>>>()?;

        let options = RecordOptions::full();
        let client = &ctx.client;

        let record_futures: Vec<_> = params
            .records
            .iter()
            .map(|r| client.get_record(r.record_type, &r.id, &options))
            .collect();
        let records: Vec<AnyRecord> = stream::iter(record_futures)
            .buffered(limits::BATCH_CONCURRENCY)
            .try_collect()
            .await?;
        let mut citations: Vec<Citation> = records.iter().map(Citation::from_record).collect();

        let pid_futures: Vec<_> = pids.iter().map(|pid| client.resolve_pid(pid, &options)).collect();
        let resolved: Vec<Resolved> = stream::iter(pid_futures)
            .buffered(limits::BATCH_CONCURRENCY)
            .try_collect()
            .await?;
        for (pid, item) in pids.into_iter().zip(resolved) {
            citations.push(match item {
                Resolved::Record(record) => Citation::from_record(&record),
                Resolved::Title(title) => Citation {
                    kind: CitationKind::Work,
                    record_id: title.id.clone(),
                    title: title.title_or_default().to_string(),
                    url: title.trove_url.clone(),
                    pid: Some(pid),
                    ..Citation::default()
                },
            });
        }

        let accessed = params.accessed.unwrap_or_else(|| chrono::Utc::now().date_naive());
        let citations: Vec<Citation> = citations.into_iter().map(|c| c.accessed_on(accessed)).collect();

        tracing::info!(count = citations.len(), style = %params.style, "formatted citations");
        Ok(citation::format_citations(&citations, params.style))
    }
}

/// Find PIDs and Trove URLs in free text.
pub struct ExtractPidsTool;

#[async_trait::async_trait]
impl McpTool for ExtractPidsTool {
    fn name(&self) -> &'static str {
        "trove_extract_pids"
    }

    fn description(&self) -> &'static str {
        "Find Trove persistent identifiers and Trove URLs in text, deduplicated in order of \
         appearance, with their persistent URLs. No API call is made."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "Text to scan"},
                "responseFormat": {"type": "string", "enum": ["markdown", "json"], "default": "markdown"}
            },
            "required": ["text"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, _ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ExtractPidsInput = parse_args(input)?;
        let pids = citation::extract_pids(&params.text);

        match params.response_format {
            ResponseFormat::Markdown => {
                if pids.is_empty() {
                    return Ok("No Trove identifiers found.".to_string());
                }
                let mut output = format!("# Identifiers ({})\n\n", pids.len());
                output.push_str("| Kind | ID | Persistent URL |\n|------|----|----------------|\n");
                for pid in &pids {
                    output.push_str(&format!("| {:?} | {} | {} |\n", pid.kind, pid.id, pid.persistent_url()));
                }
                Ok(output)
            }
            ResponseFormat::Json => {
                let items: Vec<Value> = pids
                    .iter()
                    .map(|pid| json!({"kind": pid.kind, "id": pid.id, "url": pid.persistent_url()}))
                    .collect();
                to_json(&items)
            }
        }
    }
}
