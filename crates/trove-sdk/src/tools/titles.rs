//! Serial title and contributor tools.

use serde_json::{Value, json};

use super::{McpTool, ToolContext, parse_args, to_json};
use crate::client::{TitleListOptions, TitleOptions};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{
    GetContributorInput, GetTitleInput, ListTitlesInput, ResponseFormat, SearchContributorsInput,
};

const TITLE_KINDS: [&str; 3] = ["newspaper", "magazine", "gazette"];

/// List newspaper, magazine or gazette titles.
pub struct ListTitlesTool;

#[async_trait::async_trait]
impl McpTool for ListTitlesTool {
    fn name(&self) -> &'static str {
        "trove_list_titles"
    }

    fn description(&self) -> &'static str {
        "List digitised newspaper, magazine or gazette titles, optionally filtered by state. \
         Title IDs feed the newspaperTitle search filter."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "kind": {"type": "string", "enum": TITLE_KINDS, "default": "newspaper"},
                "state": {
                    "type": "string",
                    "enum": ["act", "nsw", "nt", "qld", "sa", "tas", "vic", "wa", "national", "international"],
                    "description": "Place of publication"
                },
                "offset": {"type": "integer", "minimum": 0},
                "limit": {"type": "integer", "minimum": 1},
                "responseFormat": {"type": "string", "enum": ["markdown", "json"], "default": "markdown"}
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: ListTitlesInput = parse_args(input)?;
        let options = TitleListOptions { state: params.state, offset: params.offset, limit: params.limit };

        let list = ctx.client.list_titles(params.kind, &options).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_titles_markdown(&list)),
            ResponseFormat::Json => to_json(&formatters::compact_titles(&list)),
        }
    }
}

/// Details of one title, optionally with issue counts per year.
pub struct GetTitleTool;

#[async_trait::async_trait]
impl McpTool for GetTitleTool {
    fn name(&self) -> &'static str {
        "trove_get_title"
    }

    fn description(&self) -> &'static str {
        "Get a newspaper, magazine or gazette title by ID, with optional issue counts per year \
         and issue listings for a date range."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "kind": {"type": "string", "enum": TITLE_KINDS, "default": "newspaper"},
                "id": {"type": "string", "minLength": 1, "pattern": "^[A-Za-z0-9._:-]+$"},
                "includeYears": {"type": "boolean", "default": false},
                "range": {
                    "type": "string",
                    "pattern": "^\\d{8}-\\d{8}$",
                    "description": "Issue date range as YYYYMMDD-YYYYMMDD"
                },
                "responseFormat": {"type": "string", "enum": ["markdown", "json"], "default": "markdown"}
            },
            "required": ["id"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: GetTitleInput = parse_args(input)?;
        let options = TitleOptions { include_years: params.include_years, range: params.range };

        let title = ctx.client.get_title(params.kind, &params.id, &options).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_title_markdown(&title)),
            ResponseFormat::Json => to_json(&formatters::compact_title(&title)),
        }
    }
}

/// Search the libraries that contribute to Trove.
pub struct SearchContributorsTool;

#[async_trait::async_trait]
impl McpTool for SearchContributorsTool {
    fn name(&self) -> &'static str {
        "trove_search_contributors"
    }

    fn description(&self) -> &'static str {
        "Search contributing libraries and organisations by name. NUC symbols feed the \
         partnerNuc limit."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Name to search for (empty lists all)"},
                "responseFormat": {"type": "string", "enum": ["markdown", "json"], "default": "markdown"}
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: SearchContributorsInput = parse_args(input)?;
        let list = ctx.client.search_contributors(&params.query).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_contributors_markdown(&list)),
            ResponseFormat::Json => {
                to_json(&formatters::compact_contributors(&list))
            }
        }
    }
}

/// One contributing library by NUC symbol.
pub struct GetContributorTool;

#[async_trait::async_trait]
impl McpTool for GetContributorTool {
    fn name(&self) -> &'static str {
        "trove_get_contributor"
    }

    fn description(&self) -> &'static str {
        "Get a contributing library or organisation by its NUC symbol (e.g., 'ANL')."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "nuc": {"type": "string", "minLength": 1, "pattern": "^[A-Za-z0-9._:-]+$"},
                "responseFormat": {"type": "string", "enum": ["markdown", "json"], "default": "markdown"}
            },
            "required": ["nuc"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: GetContributorInput = parse_args(input)?;
        let contributor = ctx.client.get_contributor(&params.nuc).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_contributor_markdown(&contributor)),
            ResponseFormat::Json => to_json(contributor.raw()),
        }
    }
}
