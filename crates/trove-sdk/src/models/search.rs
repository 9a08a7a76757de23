//! Search result envelope: categories, record blocks, facets and cursors.

use serde::{Deserialize, Serialize};

use super::de;
use super::enums::Category;
use super::records::{AnyRecord, Article, People, UserList, Work};
use super::Record;

/// Response from `/result`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Query text echoed by the API.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub query: Option<String>,

    /// One entry per requested category.
    #[serde(default, rename = "category", deserialize_with = "de::one_or_many")]
    pub categories: Vec<CategoryResult>,
}

impl SearchResponse {
    /// Sum of `total` over every category.
    #[must_use]
    pub fn total_results(&self) -> u64 {
        self.categories.iter().map(CategoryResult::total).sum()
    }

    /// Result block for one category.
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategoryResult> {
        self.categories.iter().find(|c| c.code == category.as_str())
    }

    /// Consume the response, keeping one category's block.
    #[must_use]
    pub fn into_category(self, category: Category) -> Option<CategoryResult> {
        self.categories.into_iter().find(|c| c.code == category.as_str())
    }

    /// Cursor for the next page of one category, if any.
    #[must_use]
    pub fn next_cursor(&self, category: Category) -> Option<&str> {
        self.category(category).and_then(CategoryResult::next_cursor)
    }

    /// Records of one category, in response order.
    #[must_use]
    pub fn records(&self, category: Category) -> Vec<AnyRecord> {
        self.category(category).map(|c| c.records().collect()).unwrap_or_default()
    }
}

/// Results for one category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryResult {
    /// Category code ("book", "newspaper", ...).
    #[serde(default)]
    pub code: String,

    /// Display name ("Books & Libraries").
    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,

    /// Paging metadata and records.
    #[serde(default)]
    pub records: RecordsBlock,

    /// Facets, when requested.
    #[serde(default)]
    pub facets: Option<Facets>,
}

impl CategoryResult {
    /// Parsed category code.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.code.parse().ok()
    }

    /// Total matching records in this category.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.records.total.unwrap_or(0)
    }

    /// Cursor for the next page. Empty strings count as absent.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.records.next_start.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether another page exists.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_cursor().is_some()
    }

    /// Number of records on this page.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.work.len()
            + self.records.article.len()
            + self.records.people.len()
            + self.records.list.len()
    }

    /// Records on this page, in the order of the record arrays.
    pub fn records(&self) -> impl Iterator<Item = AnyRecord> + '_ {
        let RecordsBlock { work, article, people, list, .. } = &self.records;
        work.iter()
            .cloned()
            .map(AnyRecord::Work)
            .chain(article.iter().cloned().map(AnyRecord::Article))
            .chain(people.iter().cloned().map(AnyRecord::People))
            .chain(list.iter().cloned().map(AnyRecord::List))
    }

    /// Consume the block, yielding its records.
    #[must_use]
    pub fn into_records(self) -> Vec<AnyRecord> {
        let RecordsBlock { work, article, people, list, .. } = self.records;
        work.into_iter()
            .map(AnyRecord::Work)
            .chain(article.into_iter().map(AnyRecord::Article))
            .chain(people.into_iter().map(AnyRecord::People))
            .chain(list.into_iter().map(AnyRecord::List))
            .collect()
    }

    /// Facet groups (empty unless facets were requested).
    #[must_use]
    pub fn facet_groups(&self) -> &[FacetGroup] {
        self.facets.as_ref().map(|f| f.facet.as_slice()).unwrap_or_default()
    }

    /// Facet group by name.
    #[must_use]
    pub fn facet(&self, name: &str) -> Option<&FacetGroup> {
        self.facet_groups().iter().find(|f| f.name == name)
    }
}

/// Paging metadata plus the record arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsBlock {
    /// Cursor this page was requested with.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub s: Option<String>,

    /// Records on this page.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub n: Option<u64>,

    /// Total matching records.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub total: Option<u64>,

    /// Full URL of the next page.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub next: Option<String>,

    /// Cursor of the next page.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub next_start: Option<String>,

    /// Works (book, image, music, ...).
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub work: Vec<Record<Work>>,

    /// Newspaper and gazette articles.
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub article: Vec<Record<Article>>,

    /// People and organisations.
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub people: Vec<Record<People>>,

    /// User lists.
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub list: Vec<Record<UserList>>,
}

/// Facet container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Facets {
    /// Facet groups.
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub facet: Vec<FacetGroup>,
}

/// One facet dimension with its terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetGroup {
    /// Facet name ("decade", "format").
    #[serde(default)]
    pub name: String,

    /// Display name.
    #[serde(default, rename = "displayname", deserialize_with = "de::opt_string")]
    pub display_name: Option<String>,

    /// Terms.
    #[serde(default, rename = "term", deserialize_with = "de::one_or_many")]
    pub terms: Vec<FacetTerm>,
}

/// A facet term with its count. Hierarchical facets nest terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetTerm {
    /// Value to feed back into the matching limit.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub search: Option<String>,

    /// Display label.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub display: Option<String>,

    /// Matching records.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub count: Option<u64>,

    /// API URL narrowing the search to this term.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,

    /// Nested terms.
    #[serde(default, rename = "term", deserialize_with = "de::one_or_many")]
    pub terms: Vec<FacetTerm>,
}

impl FacetTerm {
    /// Label, falling back to the search value.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display.as_deref().or(self.search.as_deref()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "query": "federation",
            "category": [
                {
                    "code": "book",
                    "name": "Books & Libraries",
                    "records": {
                        "s": "*", "n": 1, "total": 120, "nextStart": "AoE/abc",
                        "work": [{"id": "1", "title": "Federation"}]
                    },
                    "facets": {"facet": {"name": "decade", "displayname": "Decade",
                        "term": [{"search": "190", "display": "1900-1909", "count": "80"}]}}
                },
                {
                    "code": "newspaper",
                    "name": "Newspapers & Gazettes",
                    "records": {"s": "*", "n": "2", "total": "3000", "nextStart": "",
                        "article": [{"id": "10"}, {"id": "11"}]}
                }
            ]
        })
    }

    #[test]
    fn test_totals_and_cursors_per_category() {
        let resp: SearchResponse = serde_json::from_value(sample()).unwrap();
        assert_eq!(resp.total_results(), 3120);
        assert_eq!(resp.next_cursor(Category::Book), Some("AoE/abc"));
        assert_eq!(resp.next_cursor(Category::Newspaper), None);
        assert!(resp.category(Category::People).is_none());
    }

    #[test]
    fn test_records_and_facets() {
        let resp: SearchResponse = serde_json::from_value(sample()).unwrap();
        let articles = resp.records(Category::Newspaper);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].kind(), "article");

        let book = resp.category(Category::Book).unwrap();
        let decade = book.facet("decade").unwrap();
        assert_eq!(decade.terms[0].count, Some(80));
        assert_eq!(decade.terms[0].label(), "1900-1909");
    }

    #[test]
    fn test_single_category_object() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "category": {"code": "people", "records": {"total": 0}}
        }))
        .unwrap();
        assert_eq!(resp.categories.len(), 1);
        assert_eq!(resp.categories[0].category(), Some(Category::People));
        assert_eq!(resp.categories[0].record_count(), 0);
    }
}
