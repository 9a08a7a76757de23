//! Fluent search builder.

use crate::client::TroveClient;
use crate::error::ClientResult;
use crate::models::{
    Category, Encoding, Facet, Include, RecordLevel, SearchResponse, SortBy, WordCount,
};
use crate::pagination::{MultiCategoryPager, SearchPager};

use super::params::SearchParams;

/// Accumulates search options and hands a validated [`SearchParams`] to the client.
///
/// Every method consumes the builder and returns a new one, so partially
/// configured builders can be cloned and reused.
///
/// ```no_run
/// # use trove_sdk::{Category, SearchBuilder, TroveClient, Config};
/// # async fn run() -> anyhow::Result<()> {
/// let client = TroveClient::new(Config::from_env()?)?;
/// let response = SearchBuilder::new()
///     .text("federation")
///     .category(Category::Newspaper)
///     .decade(190)
///     .year(1901)
///     .page_size(50)
///     .send(&client)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchBuilder {
    terms: Vec<String>,
    params: SearchParams,
}

impl SearchBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add free text. Repeated calls are joined with spaces.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.terms.push(text.trim().to_string());
        }
        self
    }

    /// Add an exact phrase.
    pub fn phrase(self, phrase: &str) -> Self {
        let phrase = phrase.replace('"', "");
        self.text(format!("\"{}\"", phrase.trim()))
    }

    /// Restrict by date using the index range syntax, e.g. `date:[1900 TO 1910]`.
    pub fn date_range(self, from: &str, to: &str) -> Self {
        self.text(format!("date:[{from} TO {to}]"))
    }

    /// Add a category. Duplicates are ignored.
    pub fn category(mut self, category: Category) -> Self {
        if !self.params.categories.contains(&category) {
            self.params.categories.push(category);
        }
        self
    }

    /// Add several categories.
    pub fn categories(self, categories: impl IntoIterator<Item = Category>) -> Self {
        categories.into_iter().fold(self, Self::category)
    }

    /// Limit to a decade, given as its first three digits (190 for the 1900s).
    pub fn decade(mut self, decade: u16) -> Self {
        self.params.set_limit(Facet::Decade, decade.to_string());
        self
    }

    /// Limit to a year. Requires [`decade`](Self::decade).
    pub fn year(mut self, year: u16) -> Self {
        self.params.set_limit(Facet::Year, year.to_string());
        self
    }

    /// Limit to a month of the year (newspapers only). Requires [`year`](Self::year).
    pub fn month(mut self, month: u8) -> Self {
        self.params.set_limit(Facet::Month, format!("{month:02}"));
        self
    }

    /// Add a value to any limit dimension.
    pub fn limit(mut self, dimension: Facet, value: impl Into<String>) -> Self {
        self.params.add_limit(dimension, value);
        self
    }

    /// Limit by format ("Book", "Map", "Photograph", ...).
    pub fn format(self, format: impl Into<String>) -> Self {
        self.limit(Facet::Format, format)
    }

    /// Limit by language.
    pub fn language(self, language: impl Into<String>) -> Self {
        self.limit(Facet::Language, language)
    }

    /// Only records available online.
    pub fn online(self) -> Self {
        self.limit(Facet::Availability, "y")
    }

    /// Only Australian content.
    pub fn australian(self) -> Self {
        self.limit(Facet::Australian, "y")
    }

    /// Limit people by occupation.
    pub fn occupation(self, occupation: impl Into<String>) -> Self {
        self.limit(Facet::Occupation, occupation)
    }

    /// Limit articles to a newspaper or gazette title ID.
    pub fn newspaper_title(self, title_id: impl Into<String>) -> Self {
        self.limit(Facet::Title, title_id)
    }

    /// Limit articles by state of publication.
    pub fn state(self, state: impl Into<String>) -> Self {
        self.limit(Facet::State, state)
    }

    /// Limit articles by whether they are illustrated.
    pub fn illustrated(self, illustrated: bool) -> Self {
        self.limit(Facet::Illustrated, illustrated.to_string())
    }

    /// Limit articles by length.
    pub fn word_count(self, bucket: WordCount) -> Self {
        self.limit(Facet::WordCount, bucket.as_str())
    }

    /// Limit articles by category ("Article", "Advertising", "Family Notices", ...).
    pub fn article_category(self, category: impl Into<String>) -> Self {
        self.limit(Facet::Category, category)
    }

    /// Request a facet.
    pub fn facet(mut self, facet: Facet) -> Self {
        if !self.params.facets.contains(&facet) {
            self.params.facets.push(facet);
        }
        self
    }

    /// Request several facets.
    pub fn facets(self, facets: impl IntoIterator<Item = Facet>) -> Self {
        facets.into_iter().fold(self, Self::facet)
    }

    pub fn record_level(mut self, level: RecordLevel) -> Self {
        self.params.record_level = level;
        self
    }

    /// Records per page (0-100).
    pub fn page_size(mut self, n: u32) -> Self {
        self.params.page_size = Some(n);
        self
    }

    pub fn sort(mut self, sort: SortBy) -> Self {
        self.params.sort = sort;
        self
    }

    /// Request an optional record section.
    pub fn include(mut self, include: Include) -> Self {
        if !self.params.include.contains(&include) {
            self.params.include.push(include);
        }
        self
    }

    /// Stable ordering for harvesting large result sets.
    pub fn bulk_harvest(mut self, enabled: bool) -> Self {
        self.params.bulk_harvest = enabled;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.params.encoding = encoding;
        self
    }

    /// Resume from a cursor. Only valid with a single category.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.params.cursor = Some(cursor.into());
        self
    }

    /// The parameters accumulated so far, without validation.
    #[must_use]
    pub fn params(&self) -> SearchParams {
        let mut params = self.params.clone();
        params.query = self.terms.join(" ");
        params
    }

    /// Validate and produce the parameters.
    ///
    /// # Errors
    ///
    /// Returns a validation error when options conflict.
    pub fn build(self) -> ClientResult<SearchParams> {
        let params = self.params();
        params.validate()?;
        Ok(params)
    }

    /// Run the search.
    ///
    /// # Errors
    ///
    /// Returns error if validation or the request fails.
    pub async fn send(self, client: &TroveClient) -> ClientResult<SearchResponse> {
        client.search(&self.build()?).await
    }

    /// Page through a single-category search.
    ///
    /// # Errors
    ///
    /// Returns error if the parameters are invalid or name more than one category.
    pub fn pager(self, client: &TroveClient) -> ClientResult<SearchPager> {
        SearchPager::new(client.clone(), self.build()?)
    }

    /// Page through several categories at once.
    ///
    /// # Errors
    ///
    /// Returns error if the parameters are invalid.
    pub fn multi_pager(self, client: &TroveClient) -> ClientResult<MultiCategoryPager> {
        MultiCategoryPager::new(client.clone(), self.build()?)
    }
}

impl From<SearchParams> for SearchBuilder {
    fn from(params: SearchParams) -> Self {
        let terms = if params.query.trim().is_empty() {
            Vec::new()
        } else {
            vec![params.query.trim().to_string()]
        };
        Self { terms, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_query_terms() {
        let params = SearchBuilder::new()
            .text("gold")
            .phrase("Ballarat \"diggings\"")
            .date_range("1850", "1860")
            .category(Category::Newspaper)
            .build()
            .unwrap();
        assert_eq!(params.query, "gold \"Ballarat diggings\" date:[1850 TO 1860]");
    }

    #[test]
    fn test_builder_is_reusable() {
        let base = SearchBuilder::new().text("wattle").category(Category::Image);
        let a = base.clone().format("Photograph").build().unwrap();
        let b = base.online().build().unwrap();
        assert_eq!(a.limit_values(Facet::Format), ["Photograph".to_string()]);
        assert!(a.limit_values(Facet::Availability).is_empty());
        assert_eq!(b.limit_values(Facet::Availability), ["y".to_string()]);
    }

    #[test]
    fn test_builder_dates() {
        let params = SearchBuilder::new()
            .category(Category::Newspaper)
            .decade(190)
            .year(1901)
            .month(1)
            .build()
            .unwrap();
        assert_eq!(params.limit_values(Facet::Month), ["01".to_string()]);

        let err = SearchBuilder::new().category(Category::Newspaper).year(1901).build();
        assert!(err.is_err());
    }

    #[test]
    fn test_builder_deduplicates() {
        let params = SearchBuilder::new()
            .categories([Category::Book, Category::Book, Category::Music])
            .facets([Facet::Format, Facet::Format])
            .include(Include::Links)
            .include(Include::Links)
            .build()
            .unwrap();
        assert_eq!(params.categories, vec![Category::Book, Category::Music]);
        assert_eq!(params.facets, vec![Facet::Format]);
        assert_eq!(params.include, vec![Include::Links]);
    }

    #[test]
    fn test_builder_rejects_cursor_with_many_categories() {
        let result = SearchBuilder::new()
            .categories([Category::Book, Category::Newspaper])
            .cursor("AoE")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_newspaper_options() {
        let params = SearchBuilder::new()
            .category(Category::Newspaper)
            .newspaper_title("35")
            .state("New South Wales")
            .illustrated(true)
            .word_count(WordCount::OverThousand)
            .article_category("Article")
            .build()
            .unwrap();
        assert_eq!(params.limit_values(Facet::Illustrated), ["true".to_string()]);
        assert_eq!(params.limit_values(Facet::WordCount), ["1000+ Words".to_string()]);
    }

    #[test]
    fn test_from_params_round_trip() {
        let params = SearchParams::new("lawson", &[Category::People]);
        let rebuilt = SearchBuilder::from(params.clone()).occupation("Poet").build().unwrap();
        assert_eq!(rebuilt.query, "lawson");
        assert_eq!(rebuilt.categories, params.categories);
    }
}
