//! Input models for MCP tool parameters.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    Category, Facet, Include, RecordLevel, RecordType, ResponseFormat, SortBy, TitleKind,
    WordCount,
};
use crate::citation::CitationStyle;

/// Filters shared by the search tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Decade as its first three digits (190 for 1900-1909).
    #[serde(default)]
    pub decade: Option<u16>,

    /// Year; requires `decade`.
    #[serde(default)]
    pub year: Option<u16>,

    /// Month 1-12; requires `year`. Newspapers only.
    #[serde(default)]
    pub month: Option<u8>,

    /// Formats ("Book", "Map", "Photograph").
    #[serde(default)]
    pub format: Vec<String>,

    /// Languages.
    #[serde(default)]
    pub language: Vec<String>,

    /// Only records available online.
    #[serde(default)]
    pub online: bool,

    /// Only Australian content.
    #[serde(default)]
    pub australian: bool,

    /// Occupations (people).
    #[serde(default)]
    pub occupation: Vec<String>,

    /// Newspaper title IDs.
    #[serde(default)]
    pub newspaper_title: Vec<String>,

    /// States of publication (newspapers).
    #[serde(default)]
    pub state: Vec<String>,

    /// Illustrated articles only / unillustrated only.
    #[serde(default)]
    pub illustrated: Option<bool>,

    /// Article length bucket.
    #[serde(default)]
    pub word_count: Option<WordCount>,

    /// Article categories ("Article", "Advertising", "Family Notices").
    #[serde(default)]
    pub article_category: Vec<String>,

    /// Any other limit dimension, by name ("rights", "zoom", "l-geocoverage").
    #[serde(default)]
    pub limits: BTreeMap<String, Vec<String>>,
}

/// Input for a single search page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    /// Query text, Trove syntax allowed.
    #[serde(default)]
    pub query: String,

    /// Categories to search.
    pub categories: Vec<Category>,

    #[serde(flatten)]
    pub filters: SearchFilters,

    /// Facets to compute.
    #[serde(default)]
    pub facets: Vec<Facet>,

    #[serde(default)]
    pub sort: SortBy,

    /// Records per category.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub record_level: RecordLevel,

    #[serde(default)]
    pub include: Vec<Include>,

    /// Cursor from a previous page (single category only).
    #[serde(default)]
    pub cursor: Option<String>,

    #[serde(default)]
    pub bulk_harvest: bool,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_page_size() -> u32 {
    20
}

/// Input for bounded harvesting of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestInput {
    #[serde(default)]
    pub query: String,

    /// The category to harvest.
    pub category: Category,

    #[serde(flatten)]
    pub filters: SearchFilters,

    #[serde(default)]
    pub sort: SortBy,

    #[serde(default)]
    pub record_level: RecordLevel,

    #[serde(default)]
    pub include: Vec<Include>,

    /// Stable ordering for large harvests.
    #[serde(default)]
    pub bulk_harvest: bool,

    /// Records to collect in total.
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Resume from a cursor.
    #[serde(default)]
    pub cursor: Option<String>,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_max_records() -> usize {
    100
}

/// Input for paging several categories together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCategoriesInput {
    #[serde(default)]
    pub query: String,

    /// Categories to search together.
    pub categories: Vec<Category>,

    #[serde(flatten)]
    pub filters: SearchFilters,

    #[serde(default)]
    pub facets: Vec<Facet>,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub record_level: RecordLevel,

    /// Pages to fetch per category.
    #[serde(default = "default_rounds")]
    pub pages_per_category: usize,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_rounds() -> usize {
    1
}

/// Input for fetching one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRecordInput {
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record ID.
    pub id: String,

    #[serde(default = "default_full")]
    pub record_level: RecordLevel,

    #[serde(default)]
    pub include: Vec<Include>,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_full() -> RecordLevel {
    RecordLevel::Full
}

/// Input for resolving a persistent identifier or Trove URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvePidInput {
    /// PID ("nla.news-article18341291") or Trove URL.
    pub pid: String,

    #[serde(default = "default_full")]
    pub record_level: RecordLevel,

    #[serde(default)]
    pub include: Vec<Include>,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for listing serial titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTitlesInput {
    #[serde(default)]
    pub kind: TitleKind,

    /// State code ("nsw", "vic", "national", "international").
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub offset: Option<u32>,

    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for fetching one serial title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTitleInput {
    #[serde(default)]
    pub kind: TitleKind,

    /// Title ID.
    pub id: String,

    /// Include issue counts per year.
    #[serde(default)]
    pub include_years: bool,

    /// Issue date range, `YYYYMMDD-YYYYMMDD`.
    #[serde(default)]
    pub range: Option<String>,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for searching contributing libraries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContributorsInput {
    /// Name to search for.
    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for fetching one contributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetContributorInput {
    /// NUC symbol ("ANL").
    pub nuc: String,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// A record to cite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRef {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub id: String,
}

/// Input for citation generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiteInput {
    /// Records by type and ID.
    #[serde(default)]
    pub records: Vec<RecordRef>,

    /// PIDs or Trove URLs.
    #[serde(default)]
    pub pids: Vec<String>,

    #[serde(default)]
    pub style: CitationStyle,

    /// Access date (YYYY-MM-DD) for styles that show one.
    #[serde(default)]
    pub accessed: Option<NaiveDate>,
}

/// Input for PID extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPidsInput {
    /// Text to scan.
    pub text: String,

    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_input_defaults_and_flattened_filters() {
        let input: SearchInput = serde_json::from_value(json!({
            "query": "federation",
            "categories": ["newspaper"],
            "decade": 190,
            "year": 1901,
            "wordCount": "1000+ Words",
            "limits": {"rights": ["Free"]}
        }))
        .unwrap();

        assert_eq!(input.page_size, 20);
        assert_eq!(input.filters.decade, Some(190));
        assert_eq!(input.filters.word_count, Some(WordCount::OverThousand));
        assert_eq!(input.filters.limits["rights"], vec!["Free"]);
        assert!(input.response_format.is_markdown());
    }

    #[test]
    fn test_record_input_type_field() {
        let input: GetRecordInput =
            serde_json::from_value(json!({"type": "people", "id": "1478491"})).unwrap();
        assert_eq!(input.record_type, RecordType::People);
        assert_eq!(input.record_level, RecordLevel::Full);
    }

    #[test]
    fn test_cite_input() {
        let input: CiteInput = serde_json::from_value(json!({
            "records": [{"type": "work", "id": "1"}],
            "style": "bibtex",
            "accessed": "2024-03-05"
        }))
        .unwrap();
        assert_eq!(input.style, CitationStyle::Bibtex);
        assert_eq!(input.accessed, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert!(input.pids.is_empty());
    }
}
