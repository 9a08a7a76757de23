//! Search tools: trove_search, trove_harvest, trove_search_categories.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::{Map, Value, json};

use super::{McpTool, ToolContext, parse_args, to_json};
use crate::config::limits;
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{
    AnyRecord, Category, Facet, HarvestInput, ResponseFormat, SearchCategoriesInput, SearchFilters,
    SearchInput,
};
use crate::pagination::CursorState;
use crate::query::SearchBuilder;

const CATEGORIES: [&str; 10] = [
    "all", "book", "diary", "image", "list", "magazine", "music", "newspaper", "people", "research",
];

const CONCRETE_CATEGORIES: [&str; 9] =
    ["book", "diary", "image", "list", "magazine", "music", "newspaper", "people", "research"];

const INCLUDES: [&str; 9] = [
    "tags", "comments", "lists", "links", "workversions", "years", "holdings",
    "subscribinginstitutions", "articletext",
];

fn facet_names() -> Vec<&'static str> {
    Facet::ALL.iter().map(|f| f.as_str()).collect()
}

/// Schema properties for the filters shared by every search tool.
fn filter_properties() -> Map<String, Value> {
    properties(json!({
        "decade": {
            "type": "integer", "minimum": 100, "maximum": 999,
            "description": "Decade as its first three digits (190 = 1900-1909)"
        },
        "year": {
            "type": "integer", "minimum": 1000, "maximum": 9999,
            "description": "Year within the decade; requires decade"
        },
        "month": {
            "type": "integer", "minimum": 1, "maximum": 12,
            "description": "Month 1-12; requires year (newspapers only)"
        },
        "format": {"type": "array", "items": {"type": "string", "minLength": 1},
            "description": "Formats (e.g., ['Book', 'Map', 'Photograph'])"},
        "language": {"type": "array", "items": {"type": "string", "minLength": 1}},
        "online": {"type": "boolean", "description": "Only records available online"},
        "australian": {"type": "boolean", "description": "Only Australian content"},
        "occupation": {"type": "array", "items": {"type": "string", "minLength": 1},
            "description": "Occupations (people)"},
        "newspaperTitle": {"type": "array", "items": {"type": "string", "minLength": 1},
            "description": "Newspaper title IDs"},
        "state": {"type": "array", "items": {"type": "string", "minLength": 1},
            "description": "States of publication (newspapers)"},
        "illustrated": {"type": "boolean", "description": "Illustrated articles only (or only unillustrated)"},
        "wordCount": {"type": "string", "enum": ["<100 Words", "100 - 1000 Words", "1000+ Words"]},
        "articleCategory": {"type": "array", "items": {"type": "string", "minLength": 1},
            "description": "Article categories (e.g., ['Article', 'Family Notices'])"},
        "limits": {
            "type": "object",
            "description": "Other limits by dimension name, e.g. {\"rights\": [\"Free\"]}",
            "additionalProperties": {"type": "array", "items": {"type": "string"}}
        }
    }))
}

fn object_schema(mut properties: Map<String, Value>, required: &[&str]) -> Value {
    properties.extend(filter_properties());
    properties.insert(
        "responseFormat".to_string(),
        json!({"type": "string", "enum": ["markdown", "json"], "default": "markdown"}),
    );
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn properties(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Start a builder from query text and the shared filters.
pub(crate) fn apply_filters(query: &str, filters: &SearchFilters) -> ToolResult<SearchBuilder> {
    let mut builder = SearchBuilder::new().text(query);

    if let Some(decade) = filters.decade {
        builder = builder.decade(decade);
    }
    if let Some(year) = filters.year {
        builder = builder.year(year);
    }
    if let Some(month) = filters.month {
        builder = builder.month(month);
    }
    for format in &filters.format {
        builder = builder.format(format.as_str());
    }
    for language in &filters.language {
        builder = builder.language(language.as_str());
    }
    if filters.online {
        builder = builder.online();
    }
    if filters.australian {
        builder = builder.australian();
    }
    for occupation in &filters.occupation {
        builder = builder.occupation(occupation.as_str());
    }
    for title in &filters.newspaper_title {
        builder = builder.newspaper_title(title.as_str());
    }
    for state in &filters.state {
        builder = builder.state(state.as_str());
    }
    if let Some(illustrated) = filters.illustrated {
        builder = builder.illustrated(illustrated);
    }
    if let Some(bucket) = filters.word_count {
        builder = builder.word_count(bucket);
    }
    for category in &filters.article_category {
        builder = builder.article_category(category.as_str());
    }
    for (name, values) in &filters.limits {
        let dimension = Facet::from_str(name)
            .map_err(|e| ToolError::validation(format!("limits.{name}"), e))?;
        for value in values {
            builder = builder.limit(dimension, value.as_str());
        }
    }
    Ok(builder)
}

/// Single search page across one or more categories.
pub struct SearchTool;

#[async_trait::async_trait]
impl McpTool for SearchTool {
    fn name(&self) -> &'static str {
        "trove_search"
    }

    fn description(&self) -> &'static str {
        "Search Trove (National Library of Australia) across one or more categories. \
         Returns one page per category with totals, optional facets and a cursor \
         for the next page. Pass the cursor back with a single category to page on."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            properties(json!({
                "query": {
                    "type": "string",
                    "description": "Search text; Trove syntax allowed (e.g., 'title:gold AND \"rush\"')"
                },
                "categories": {
                    "type": "array",
                    "items": {"type": "string", "enum": CATEGORIES},
                    "minItems": 1,
                    "description": "Categories to search ('all' cannot be combined)"
                },
                "facets": {
                    "type": "array",
                    "items": {"type": "string", "enum": facet_names()},
                    "description": "Facets to compute (e.g., ['decade', 'format'])"
                },
                "sort": {"type": "string", "enum": ["relevance", "datedesc", "dateasc"], "default": "relevance"},
                "pageSize": {"type": "integer", "minimum": 0, "maximum": limits::MAX_PAGE_SIZE, "default": 20},
                "recordLevel": {"type": "string", "enum": ["brief", "full"], "default": "brief"},
                "include": {"type": "array", "items": {"type": "string", "enum": INCLUDES}},
                "cursor": {"type": "string", "minLength": 1, "description": "nextCursor from a previous page"},
                "bulkHarvest": {"type": "boolean", "default": false}
            })),
            &["categories"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: SearchInput = parse_args(input)?;

        let mut builder = apply_filters(&params.query, &params.filters)?
            .categories(params.categories.iter().copied())
            .facets(params.facets.iter().copied())
            .sort(params.sort)
            .page_size(params.page_size)
            .record_level(params.record_level)
            .bulk_harvest(params.bulk_harvest);
        for include in &params.include {
            builder = builder.include(*include);
        }
        if let Some(cursor) = params.cursor {
            builder = builder.cursor(cursor);
        }

        let response = builder.send(&ctx.client).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_search_markdown(&response)),
            ResponseFormat::Json => to_json(&formatters::compact_search(&response)),
        }
    }
}

/// Bounded harvest of one category.
pub struct HarvestTool;

#[async_trait::async_trait]
impl McpTool for HarvestTool {
    fn name(&self) -> &'static str {
        "trove_harvest"
    }

    fn description(&self) -> &'static str {
        "Collect many records from one category by following cursors page after page. \
         Stops at maxRecords (at most 1000) and returns a cursor to resume from."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            properties(json!({
                "query": {"type": "string", "description": "Search text"},
                "category": {"type": "string", "enum": CONCRETE_CATEGORIES},
                "sort": {"type": "string", "enum": ["relevance", "datedesc", "dateasc"], "default": "relevance"},
                "recordLevel": {"type": "string", "enum": ["brief", "full"], "default": "brief"},
                "include": {"type": "array", "items": {"type": "string", "enum": INCLUDES}},
                "bulkHarvest": {
                    "type": "boolean", "default": false,
                    "description": "Stable ordering for large harvests (relevance sort only)"
                },
                "maxRecords": {
                    "type": "integer", "minimum": 1,
                    "maximum": limits::MAX_HARVEST_RECORDS, "default": 100
                },
                "cursor": {"type": "string", "minLength": 1, "description": "Resume from this cursor"}
            })),
            &["category"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: HarvestInput = parse_args(input)?;
        let max_records = params.max_records.clamp(1, limits::MAX_HARVEST_RECORDS);
        let page_size = max_records.min(limits::MAX_PAGE_SIZE as usize) as u32;

        let mut builder = apply_filters(&params.query, &params.filters)?
            .category(params.category)
            .sort(params.sort)
            .page_size(page_size)
            .record_level(params.record_level)
            .bulk_harvest(params.bulk_harvest);
        for include in &params.include {
            builder = builder.include(*include);
        }
        if let Some(cursor) = params.cursor {
            builder = builder.cursor(cursor);
        }

        let mut pager = builder.pager(&ctx.client)?.max_records(max_records);
        let mut records: Vec<AnyRecord> = Vec::new();
        let mut total = 0;

        while records.len() < max_records {
            let Some(page) = pager.next_page().await? else {
                break;
            };
            total = total.max(page.total());
            records.extend(page.into_records());
        }
        records.truncate(max_records);
        let resume = pager.state().resume_cursor().map(str::to_string);

        tracing::info!(
            category = %params.category,
            harvested = records.len(),
            pages = pager.pages_fetched(),
            "harvest finished"
        );

        match params.response_format {
            ResponseFormat::Markdown => {
                let heading = format!("Harvest: {} of {total} {} records", records.len(), params.category);
                let mut output = formatters::format_records_markdown(&heading, &records);
                if let Some(cursor) = resume {
                    output.push_str(&format!("\n**Resume cursor**: `{cursor}`\n"));
                }
                Ok(output)
            }
            ResponseFormat::Json => to_json(&json!({
                "category": params.category,
                "total": total,
                "harvested": records.len(),
                "pages": pager.pages_fetched(),
                "nextCursor": resume,
                "records": records.iter().map(formatters::compact_record).collect::<Vec<_>>(),
            })),
        }
    }
}

/// Several categories paged together, one cursor each.
pub struct SearchCategoriesTool;

#[derive(Default)]
struct CategoryHarvest {
    total: u64,
    records: Vec<AnyRecord>,
}

#[async_trait::async_trait]
impl McpTool for SearchCategoriesTool {
    fn name(&self) -> &'static str {
        "trove_search_categories"
    }

    fn description(&self) -> &'static str {
        "Search several categories at once and fetch up to pagesPerCategory pages of each. \
         Categories advance independently, each with its own cursor."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            properties(json!({
                "query": {"type": "string", "description": "Search text"},
                "categories": {
                    "type": "array",
                    "items": {"type": "string", "enum": CONCRETE_CATEGORIES},
                    "minItems": 1
                },
                "facets": {"type": "array", "items": {"type": "string", "enum": facet_names()}},
                "pageSize": {"type": "integer", "minimum": 1, "maximum": limits::MAX_PAGE_SIZE, "default": 20},
                "recordLevel": {"type": "string", "enum": ["brief", "full"], "default": "brief"},
                "pagesPerCategory": {
                    "type": "integer", "minimum": 1,
                    "maximum": limits::MAX_PAGES_PER_CATEGORY, "default": 1
                }
            })),
            &["categories"],
        )
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<String> {
        let params: SearchCategoriesInput = parse_args(input)?;
        let rounds = params.pages_per_category.clamp(1, limits::MAX_PAGES_PER_CATEGORY);

        let mut pager = apply_filters(&params.query, &params.filters)?
            .categories(params.categories.iter().copied())
            .facets(params.facets.iter().copied())
            .page_size(params.page_size)
            .record_level(params.record_level)
            .multi_pager(&ctx.client)?
            .max_pages(rounds);

        let mut harvested: BTreeMap<Category, CategoryHarvest> =
            params.categories.iter().map(|c| (*c, CategoryHarvest::default())).collect();
        let mut facets = Vec::new();

        while !pager.is_exhausted() {
            let pages = pager.next_round().await?;
            if pages.is_empty() {
                break;
            }
            for page in pages {
                let Some(category) = page.category() else {
                    continue;
                };
                if !page.facet_groups().is_empty() {
                    facets.push((category, page.facet_groups().to_vec()));
                }
                let entry = harvested.entry(category).or_default();
                entry.total = entry.total.max(page.total());
                entry.records.extend(page.into_records());
            }
        }

        match params.response_format {
            ResponseFormat::Markdown => {
                let mut output = String::new();
                if !params.query.is_empty() {
                    output.push_str(&format!("# Search: {}\n\n", params.query));
                }
                for (category, harvest) in &harvested {
                    let heading = format!("{category} ({} of {} results)", harvest.records.len(), harvest.total);
                    output.push_str(&format!("## {heading}\n\n"));
                    for (i, record) in harvest.records.iter().enumerate() {
                        output.push_str(&formatters::format_record_markdown(record, i + 1));
                        output.push_str("\n---\n\n");
                    }
                    if let Some(cursor) = pager.cursor(*category).and_then(CursorState::resume_cursor) {
                        output.push_str(&format!("**Next page cursor** ({category}): `{cursor}`\n\n"));
                    }
                }
                for (category, groups) in &facets {
                    output.push_str(&format!("## Facets: {category}\n\n"));
                    output.push_str(&formatters::format_facets_markdown(groups));
                }
                Ok(output)
            }
            ResponseFormat::Json => {
                let categories: Vec<Value> = harvested
                    .iter()
                    .map(|(category, harvest)| {
                        let mut obj = json!({
                            "category": category,
                            "total": harvest.total,
                            "count": harvest.records.len(),
                            "pages": pager.pages_fetched(*category),
                            "nextCursor": pager.cursor(*category).and_then(CursorState::resume_cursor),
                            "records": harvest.records.iter().map(formatters::compact_record).collect::<Vec<_>>(),
                        });
                        if let Some((_, groups)) = facets.iter().find(|(c, _)| c == category) {
                            obj["facets"] = formatters::compact_facets(groups);
                        }
                        obj
                    })
                    .collect();
                to_json(&json!({"query": params.query, "categories": categories}))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WordCount;

    #[test]
    fn test_filters_become_limits() {
        let filters = SearchFilters {
            decade: Some(190),
            year: Some(1901),
            state: vec!["New South Wales".into()],
            word_count: Some(WordCount::OverThousand),
            limits: BTreeMap::from([("l-illustrationType".to_string(), vec!["Photo".to_string()])]),
            ..SearchFilters::default()
        };
        let params = apply_filters("federation", &filters)
            .unwrap()
            .category(Category::Newspaper)
            .build()
            .unwrap();

        assert_eq!(params.query, "federation");
        assert_eq!(params.limit_values(Facet::Decade), ["190"]);
        assert_eq!(params.limit_values(Facet::Year), ["1901"]);
        assert_eq!(params.limit_values(Facet::State), ["New South Wales"]);
        assert_eq!(params.limit_values(Facet::WordCount), ["1000+ Words"]);
        assert_eq!(params.limit_values(Facet::IllustrationType), ["Photo"]);
    }

    #[test]
    fn test_unknown_limit_name() {
        let filters = SearchFilters {
            limits: BTreeMap::from([("colour".to_string(), vec!["red".to_string()])]),
            ..SearchFilters::default()
        };
        let err = apply_filters("", &filters).unwrap_err();
        assert!(matches!(err, ToolError::Validation { ref field, .. } if field == "limits.colour"));
    }

    #[test]
    fn test_schema_lists_shared_filters() {
        let schema = SearchTool.input_schema();
        for key in ["decade", "year", "month", "wordCount", "limits", "responseFormat", "cursor"] {
            assert!(schema["properties"].get(key).is_some(), "missing {key}");
        }
        assert_eq!(schema["required"], json!(["categories"]));
        assert_eq!(HarvestTool.input_schema()["properties"]["maxRecords"]["maximum"], 1000);
    }
}
