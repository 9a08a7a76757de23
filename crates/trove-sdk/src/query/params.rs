//! The search parameter model.
//!
//! [`SearchParams`] holds every option `/result` understands. [`SearchParams::validate`]
//! enforces the dependencies between them before anything is sent, and
//! [`SearchParams::to_query_pairs`] compiles the model to raw query parameters.

use std::collections::BTreeMap;

use crate::config::limits;
use crate::error::{ClientError, ClientResult};
use crate::models::{Category, Encoding, Facet, Include, RecordLevel, SortBy, WordCount};

/// Cursor value that starts a result set.
pub const START_CURSOR: &str = "*";

/// Every option of a `/result` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// Query text (`q`). May contain Trove query syntax.
    pub query: String,

    /// Categories to search (`category`).
    pub categories: Vec<Category>,

    /// Limit values per dimension (`l-<dimension>`), repeated per value.
    pub limits: BTreeMap<Facet, Vec<String>>,

    /// Facets to compute (`facet`).
    pub facets: Vec<Facet>,

    /// Record detail (`reclevel`).
    pub record_level: RecordLevel,

    /// Page size (`n`); `None` leaves the API default (20).
    pub page_size: Option<u32>,

    /// Ordering (`sortby`).
    pub sort: SortBy,

    /// Pagination cursor (`s`). Only valid with a single category.
    pub cursor: Option<String>,

    /// Optional record sections (`include`).
    pub include: Vec<Include>,

    /// Stable ordering for harvesting (`bulkHarvest`).
    pub bulk_harvest: bool,

    /// Response encoding (`encoding`).
    pub encoding: Encoding,
}

impl SearchParams {
    /// Parameters for a query against the given categories.
    #[must_use]
    pub fn new(query: impl Into<String>, categories: &[Category]) -> Self {
        Self { query: query.into(), categories: categories.to_vec(), ..Self::default() }
    }

    /// Add a limit value.
    pub fn add_limit(&mut self, dimension: Facet, value: impl Into<String>) {
        self.limits.entry(dimension).or_default().push(value.into());
    }

    /// Replace every value of a limit dimension.
    pub fn set_limit(&mut self, dimension: Facet, value: impl Into<String>) {
        self.limits.insert(dimension, vec![value.into()]);
    }

    /// Values of a limit dimension.
    #[must_use]
    pub fn limit_values(&self, dimension: Facet) -> &[String] {
        self.limits.get(&dimension).map(Vec::as_slice).unwrap_or_default()
    }

    /// The category, when exactly one is requested.
    #[must_use]
    pub fn single_category(&self) -> Option<Category> {
        match self.categories.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Derive the follow-up request for one category of a multi-category query.
    ///
    /// Limits and facets that do not apply to `category` are dropped, so the
    /// derived request validates on its own.
    #[must_use]
    pub fn for_category(&self, category: Category, cursor: Option<&str>) -> Self {
        let mut params = self.clone();
        params.categories = vec![category];
        params.cursor = cursor.map(str::to_string);
        params.limits.retain(|dimension, _| dimension.applies_to(category));
        params.facets.retain(|facet| facet.applies_to(category));
        params
    }

    /// Check the parameters against the API's rules.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] naming the offending parameter.
    pub fn validate(&self) -> ClientResult<()> {
        self.validate_categories()?;

        if let Some(n) = self.page_size {
            if n > limits::MAX_PAGE_SIZE {
                return Err(ClientError::validation(
                    "n",
                    format!("page size {n} exceeds the maximum of {}", limits::MAX_PAGE_SIZE),
                ));
            }
        }

        for (dimension, values) in &self.limits {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ClientError::validation(dimension.limit_param(), "empty value"));
            }
        }

        self.validate_dates()?;
        self.validate_values()?;
        self.validate_applicability()?;

        if let Some(cursor) = &self.cursor {
            if cursor.is_empty() {
                return Err(ClientError::validation("s", "cursor cannot be empty"));
            }
            if self.categories.len() != 1 {
                return Err(ClientError::validation(
                    "s",
                    "a cursor belongs to one category; request a single category to page",
                ));
            }
        }

        if self.bulk_harvest && self.sort != SortBy::Relevance {
            return Err(ClientError::validation(
                "bulkHarvest",
                "bulk harvest returns records in a fixed order and cannot be sorted",
            ));
        }

        Ok(())
    }

    fn validate_categories(&self) -> ClientResult<()> {
        if self.categories.is_empty() {
            return Err(ClientError::validation("category", "at least one category is required"));
        }
        if self.categories.contains(&Category::All) && self.categories.len() > 1 {
            return Err(ClientError::validation(
                "category",
                "'all' cannot be combined with other categories",
            ));
        }
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].contains(category) {
                return Err(ClientError::validation(
                    "category",
                    format!("'{category}' is listed more than once"),
                ));
            }
        }
        Ok(())
    }

    /// Decade, year and month form a chain: each needs the one above it.
    fn validate_dates(&self) -> ClientResult<()> {
        let decade = self.single_limit(Facet::Decade)?;
        let year = self.single_limit(Facet::Year)?;
        let month = self.single_limit(Facet::Month)?;

        let decade = decade
            .map(|d| parse_digits(d, 3).ok_or_else(|| {
                ClientError::validation("l-decade", format!("'{d}' is not a decade like 190 (1900-1909)"))
            }))
            .transpose()?;

        let year = year
            .map(|y| parse_digits(y, 4).ok_or_else(|| {
                ClientError::validation("l-year", format!("'{y}' is not a four-digit year"))
            }))
            .transpose()?;

        if let Some(year) = year {
            let decade = decade
                .ok_or_else(|| ClientError::validation("l-year", "l-year requires l-decade"))?;
            if year / 10 != decade {
                return Err(ClientError::validation(
                    "l-year",
                    format!("year {year} is outside decade {decade} ({}0-{}9)", decade, decade),
                ));
            }
        }

        if let Some(m) = month {
            let parsed: u32 = m
                .trim()
                .parse()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or_else(|| ClientError::validation("l-month", format!("'{m}' is not a month (1-12)")))?;
            if year.is_none() {
                return Err(ClientError::validation(
                    "l-month",
                    format!("l-month ({parsed}) requires l-year"),
                ));
            }
        }

        Ok(())
    }

    fn validate_values(&self) -> ClientResult<()> {
        for value in self.limit_values(Facet::WordCount) {
            let known = [WordCount::UnderHundred, WordCount::HundredToThousand, WordCount::OverThousand];
            if !known.iter().any(|w| w.as_str() == value) {
                return Err(ClientError::validation(
                    "l-wordCount",
                    format!("'{value}' is not one of '<100 Words', '100 - 1000 Words', '1000+ Words'"),
                ));
            }
        }
        for value in self.limit_values(Facet::Illustrated) {
            if value != "true" && value != "false" {
                return Err(ClientError::validation(
                    "l-illustrated",
                    format!("'{value}' must be 'true' or 'false'"),
                ));
            }
        }
        Ok(())
    }

    fn validate_applicability(&self) -> ClientResult<()> {
        let applies = |dimension: Facet| self.categories.iter().any(|c| dimension.applies_to(*c));
        let requested = || {
            self.categories.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
        };

        for dimension in self.limits.keys() {
            if !applies(*dimension) {
                return Err(ClientError::validation(
                    dimension.limit_param(),
                    format!("does not apply to the requested categories ({})", requested()),
                ));
            }
        }
        for facet in &self.facets {
            if !applies(*facet) {
                return Err(ClientError::validation(
                    "facet",
                    format!("'{facet}' does not apply to the requested categories ({})", requested()),
                ));
            }
        }
        Ok(())
    }

    fn single_limit(&self, dimension: Facet) -> ClientResult<Option<&str>> {
        match self.limit_values(dimension) {
            [] => Ok(None),
            [value] => Ok(Some(value.as_str())),
            _ => Err(ClientError::validation(dimension.limit_param(), "only one value is allowed")),
        }
    }

    /// Validate and compile to raw query parameters.
    ///
    /// Defaults are omitted, except `category` which the API requires.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if [`validate`](Self::validate) fails.
    pub fn to_query_pairs(&self) -> ClientResult<Vec<(String, String)>> {
        self.validate()?;

        let mut pairs = Vec::new();
        let query = self.query.trim();
        if !query.is_empty() {
            pairs.push(("q".to_string(), query.to_string()));
        }
        pairs.push((
            "category".to_string(),
            self.categories.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(","),
        ));

        for (dimension, values) in &self.limits {
            for value in values {
                pairs.push((dimension.limit_param(), value.trim().to_string()));
            }
        }

        if !self.facets.is_empty() {
            pairs.push((
                "facet".to_string(),
                self.facets.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(","),
            ));
        }
        if self.record_level != RecordLevel::Brief {
            pairs.push(("reclevel".to_string(), self.record_level.as_str().to_string()));
        }
        if let Some(n) = self.page_size {
            pairs.push(("n".to_string(), n.to_string()));
        }
        if self.sort != SortBy::Relevance {
            pairs.push(("sortby".to_string(), self.sort.as_str().to_string()));
        }
        if let Some(cursor) = &self.cursor {
            pairs.push(("s".to_string(), cursor.clone()));
        }
        if !self.include.is_empty() {
            pairs.push((
                "include".to_string(),
                self.include.iter().map(|i| i.as_str()).collect::<Vec<_>>().join(","),
            ));
        }
        if self.bulk_harvest {
            pairs.push(("bulkHarvest".to_string(), "true".to_string()));
        }
        if self.encoding != Encoding::Json {
            pairs.push(("encoding".to_string(), self.encoding.as_str().to_string()));
        }

        Ok(pairs)
    }
}

fn parse_digits(value: &str, len: usize) -> Option<u32> {
    let value = value.trim();
    (value.len() == len && value.bytes().all(|b| b.is_ascii_digit()))
        .then(|| value.parse().ok())
        .flatten()
}
