//! Tests for the search parameter model and the fluent builder.

use proptest::prelude::*;
use tokio_test::assert_ok;

use trove_sdk::models::{Include, WordCount};
use trove_sdk::{Category, ClientError, Facet, RecordLevel, SearchBuilder, SearchParams, SortBy};

fn field_of(err: ClientError) -> String {
    match err {
        ClientError::Validation { field, .. } => field,
        other => panic!("expected validation error, got {other:?}"),
    }
}

fn pairs(params: &SearchParams) -> Vec<(String, String)> {
    params.to_query_pairs().unwrap()
}

fn value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

// =============================================================================
// Compilation
// =============================================================================

#[test]
fn test_defaults_are_omitted() {
    let params = SearchBuilder::new().text("wattle").category(Category::Image).build().unwrap();
    let pairs = pairs(&params);

    assert_eq!(
        pairs,
        vec![
            ("q".to_string(), "wattle".to_string()),
            ("category".to_string(), "image".to_string()),
        ]
    );
}

#[test]
fn test_empty_query_is_omitted() {
    let params = SearchBuilder::new().text("   ").category(Category::Book).build().unwrap();
    assert_eq!(value(&pairs(&params), "q"), None);
    assert_eq!(value(&pairs(&params), "category"), Some("book"));
}

#[test]
fn test_every_option_compiles() {
    let params = SearchBuilder::new()
        .text("federation")
        .category(Category::Newspaper)
        .decade(190)
        .year(1901)
        .month(1)
        .state("New South Wales")
        .word_count(WordCount::OverThousand)
        .facet(Facet::Decade)
        .facet(Facet::Category)
        .record_level(RecordLevel::Full)
        .page_size(100)
        .sort(SortBy::DateDesc)
        .include(Include::ArticleText)
        .cursor("AoE/abc")
        .build()
        .unwrap();
    let pairs = pairs(&params);

    assert_eq!(value(&pairs, "l-decade"), Some("190"));
    assert_eq!(value(&pairs, "l-year"), Some("1901"));
    assert_eq!(value(&pairs, "l-month"), Some("01"));
    assert_eq!(value(&pairs, "l-state"), Some("New South Wales"));
    assert_eq!(value(&pairs, "l-wordCount"), Some("1000+ Words"));
    assert_eq!(value(&pairs, "facet"), Some("decade,category"));
    assert_eq!(value(&pairs, "reclevel"), Some("full"));
    assert_eq!(value(&pairs, "n"), Some("100"));
    assert_eq!(value(&pairs, "sortby"), Some("datedesc"));
    assert_eq!(value(&pairs, "include"), Some("articletext"));
    assert_eq!(value(&pairs, "s"), Some("AoE/abc"));
}

#[test]
fn test_repeated_limits_repeat_the_parameter() {
    let params = SearchBuilder::new()
        .category(Category::Book)
        .format("Book")
        .format("Map")
        .build()
        .unwrap();
    let formats: Vec<_> = pairs(&params)
        .into_iter()
        .filter(|(k, _)| k == "l-format")
        .map(|(_, v)| v)
        .collect();
    assert_eq!(formats, ["Book", "Map"]);
}

#[test]
fn test_multiple_categories_joined() {
    let params = SearchBuilder::new()
        .categories([Category::Book, Category::Newspaper, Category::People])
        .build()
        .unwrap();
    assert_eq!(value(&pairs(&params), "category"), Some("book,newspaper,people"));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_category_rules() {
    assert_eq!(field_of(SearchParams::default().validate().unwrap_err()), "category");

    let all_plus = SearchParams::new("x", &[Category::All, Category::Book]);
    assert_eq!(field_of(all_plus.validate().unwrap_err()), "category");

    let duplicated = SearchParams::new("x", &[Category::Book, Category::Book]);
    assert_eq!(field_of(duplicated.validate().unwrap_err()), "category");

    assert_ok!(SearchParams::new("x", &[Category::All]).validate());
}

#[test]
fn test_date_chain() {
    let err = SearchBuilder::new().category(Category::Book).year(1901).build().unwrap_err();
    assert_eq!(field_of(err), "l-year");

    let err = SearchBuilder::new()
        .category(Category::Book)
        .decade(190)
        .year(1911)
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "l-year");

    let err = SearchBuilder::new()
        .category(Category::Newspaper)
        .decade(190)
        .month(3)
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "l-month");
}

#[test]
fn test_month_is_newspaper_only() {
    let err = SearchBuilder::new()
        .category(Category::Book)
        .decade(190)
        .year(1901)
        .month(3)
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "l-month");
}

#[test]
fn test_limits_must_apply_to_a_requested_category() {
    let err = SearchBuilder::new().category(Category::Book).occupation("Poet").build().unwrap_err();
    assert_eq!(field_of(err), "l-occupation");

    // One applicable category is enough.
    assert_ok!(
        SearchBuilder::new()
            .categories([Category::Book, Category::People])
            .occupation("Poet")
            .build()
    );

    let err = SearchBuilder::new().category(Category::Book).facet(Facet::WordCount).build().unwrap_err();
    assert_eq!(field_of(err), "facet");
}

#[test]
fn test_cursor_needs_one_category() {
    let err = SearchBuilder::new()
        .categories([Category::Book, Category::Image])
        .cursor("abc")
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "s");
}

#[test]
fn test_bulk_harvest_cannot_be_sorted() {
    let err = SearchBuilder::new()
        .category(Category::Book)
        .bulk_harvest(true)
        .sort(SortBy::DateAsc)
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "bulkHarvest");

    let params = SearchBuilder::new().category(Category::Book).bulk_harvest(true).build().unwrap();
    assert_eq!(value(&pairs(&params), "bulkHarvest"), Some("true"));
}

#[test]
fn test_illustrated_values() {
    let mut params = SearchParams::new("x", &[Category::Newspaper]);
    params.add_limit(Facet::Illustrated, "maybe");
    assert_eq!(field_of(params.validate().unwrap_err()), "l-illustrated");
}

#[test]
fn test_for_category_drops_inapplicable_limits() {
    let params = SearchBuilder::new()
        .categories([Category::Book, Category::Newspaper])
        .state("Victoria")
        .format("Book")
        .facet(Facet::State)
        .build()
        .unwrap();

    let book = params.for_category(Category::Book, Some("abc"));
    assert_eq!(book.categories, [Category::Book]);
    assert!(book.limit_values(Facet::State).is_empty());
    assert_eq!(book.limit_values(Facet::Format), ["Book"]);
    assert!(book.facets.is_empty());
    assert_ok!(book.validate());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Any page size up to 100 is accepted; anything above is rejected on `n`.
    #[test]
    fn page_size_bound(n in 0u32..1000) {
        let result = SearchBuilder::new().category(Category::Book).page_size(n).build();
        if n <= 100 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(field_of(result.unwrap_err()), "n");
        }
    }

    /// A year validates exactly when it falls inside the given decade.
    #[test]
    fn year_inside_decade(decade in 150u16..203, year in 1500u16..2040) {
        let result = SearchBuilder::new()
            .category(Category::Book)
            .decade(decade)
            .year(year)
            .build();
        prop_assert_eq!(result.is_ok(), year / 10 == decade);
    }

    /// Months validate for newspapers when the full chain is present.
    #[test]
    fn month_with_full_chain(year in 1803u16..2030, month in 1u8..=12) {
        let result = SearchBuilder::new()
            .category(Category::Newspaper)
            .decade(year / 10)
            .year(year)
            .month(month)
            .build();
        prop_assert!(result.is_ok());
    }

    /// Compiled parameters always carry exactly one `category`.
    #[test]
    fn one_category_parameter(query in "[a-z ]{0,20}", n in 1u32..=100) {
        let params = SearchBuilder::new().text(query).category(Category::Magazine).page_size(n).build().unwrap();
        let pairs = params.to_query_pairs().unwrap();
        prop_assert_eq!(pairs.iter().filter(|(k, _)| k == "category").count(), 1);
    }
}
