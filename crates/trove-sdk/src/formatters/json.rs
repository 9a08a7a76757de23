//! Compact JSON output formatting.
//!
//! Keeps the fields an agent needs to decide what to fetch next and drops
//! the rest. Full records stay available through `trove_get_record`.

use serde_json::{Value, json};

use crate::models::{
    AnyRecord, CategoryResult, Contributor, ContributorList, FacetGroup, FacetTerm, SearchResponse,
    Title, TitleList,
};

/// Compact representation of any record.
#[must_use]
pub fn compact_record(record: &AnyRecord) -> Value {
    let mut obj = json!({
        "kind": record.kind(),
        "id": record.id(),
        "title": record.display_title(),
    });

    match record {
        AnyRecord::Work(work) => {
            if !work.contributor.is_empty() {
                obj["contributors"] = json!(work.contributor);
            }
            if let Some(issued) = &work.issued {
                obj["issued"] = json!(issued);
            }
            if !work.types.is_empty() {
                obj["types"] = json!(work.types);
            }
            if let Some(holdings) = work.holdings_count {
                obj["holdings"] = json!(holdings);
            }
            if let Some(fulltext) = work.link("fulltext") {
                obj["fulltext"] = json!(fulltext);
            }
        }
        AnyRecord::Article(article) => {
            if let Some(paper) = article.newspaper() {
                obj["newspaper"] = json!(paper);
            }
            if let Some(date) = &article.date {
                obj["date"] = json!(date);
            }
            if let Some(page) = &article.page {
                obj["page"] = json!(page);
            }
            if let Some(category) = &article.category {
                obj["category"] = json!(category);
            }
            if let Some(words) = article.word_count {
                obj["wordCount"] = json!(words);
            }
            if let Some(snippet) = &article.snippet {
                obj["snippet"] = json!(snippet);
            }
        }
        AnyRecord::People(people) => {
            if !people.occupation.is_empty() {
                obj["occupation"] = json!(people.occupation);
            }
            if !people.types.is_empty() {
                obj["types"] = json!(people.types);
            }
        }
        AnyRecord::List(list) => {
            if let Some(creator) = &list.creator {
                obj["creator"] = json!(creator);
            }
            if let Some(count) = list.list_item_count {
                obj["items"] = json!(count);
            }
        }
    }

    if let Some(url) = record.trove_url() {
        obj["troveUrl"] = json!(url);
    }
    obj
}

/// Compact representation of one category's page.
#[must_use]
pub fn compact_category(category: &CategoryResult) -> Value {
    let mut obj = json!({
        "category": category.code,
        "total": category.total(),
        "count": category.record_count(),
        "nextCursor": category.next_cursor(),
        "records": category.records().map(|r| compact_record(&r)).collect::<Vec<_>>(),
    });
    if !category.facet_groups().is_empty() {
        obj["facets"] = compact_facets(category.facet_groups());
    }
    obj
}

/// Compact representation of a search page.
#[must_use]
pub fn compact_search(response: &SearchResponse) -> Value {
    json!({
        "query": response.query,
        "totalResults": response.total_results(),
        "categories": response.categories.iter().map(compact_category).collect::<Vec<_>>(),
    })
}

/// Facets as `{name: [{term, search, count}]}`.
#[must_use]
pub fn compact_facets(facets: &[FacetGroup]) -> Value {
    let map: serde_json::Map<String, Value> = facets
        .iter()
        .map(|group| (group.name.clone(), json!(group.terms.iter().map(compact_term).collect::<Vec<_>>())))
        .collect();
    Value::Object(map)
}

fn compact_term(term: &FacetTerm) -> Value {
    let mut obj = json!({
        "term": term.label(),
        "search": term.search,
        "count": term.count,
    });
    if !term.terms.is_empty() {
        obj["terms"] = json!(term.terms.iter().map(compact_term).collect::<Vec<_>>());
    }
    obj
}

/// Compact representation of a serial title.
#[must_use]
pub fn compact_title(title: &Title) -> Value {
    let mut obj = json!({
        "id": title.id,
        "title": title.title_or_default(),
        "state": title.state,
        "startDate": title.start_date,
        "endDate": title.end_date,
    });
    if let Some(issn) = &title.issn {
        obj["issn"] = json!(issn);
    }
    if !title.year.is_empty() {
        obj["years"] = json!(
            title
                .year
                .iter()
                .map(|y| json!({"year": y.date, "issues": y.issuecount}))
                .collect::<Vec<_>>()
        );
    }
    obj
}

/// Compact title list.
#[must_use]
pub fn compact_titles(list: &TitleList) -> Value {
    json!({
        "total": list.total,
        "titles": list.titles.iter().map(|t| compact_title(t)).collect::<Vec<_>>(),
    })
}

/// Compact representation of a contributor.
#[must_use]
pub fn compact_contributor(contributor: &Contributor) -> Value {
    json!({
        "nuc": contributor.id,
        "name": contributor.display_name(),
        "holdings": contributor.totalholdings,
    })
}

/// Compact contributor list.
#[must_use]
pub fn compact_contributors(list: &ContributorList) -> Value {
    json!({
        "total": list.total,
        "contributors": list.contributor.iter().map(|c| compact_contributor(c)).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    #[test]
    fn test_compact_work() {
        let work = Record::from_value(json!({
            "id": "10013347",
            "title": "While the billy boils",
            "contributor": "Lawson, Henry, 1867-1922",
            "issued": 1896,
            "identifier": [{"type": "url", "linktype": "fulltext", "value": "https://nla.gov.au/nla.obj-1"}],
            "unknownField": {"kept": true}
        }))
        .unwrap();
        let obj = compact_record(&AnyRecord::Work(work));
        assert_eq!(obj["kind"], "work");
        assert_eq!(obj["contributors"], json!(["Lawson, Henry, 1867-1922"]));
        assert_eq!(obj["issued"], "1896");
        assert_eq!(obj["fulltext"], "https://nla.gov.au/nla.obj-1");
        assert!(obj.get("unknownField").is_none());
    }

    #[test]
    fn test_compact_category_with_facets() {
        let category: CategoryResult = serde_json::from_value(json!({
            "code": "book",
            "records": {"total": 5, "nextStart": "next", "work": [{"id": "1"}]},
            "facets": {"facet": {"name": "format", "term": [
                {"search": "Book", "count": 4, "term": [{"search": "Book/Illustrated", "count": 1}]}
            ]}}
        }))
        .unwrap();
        let obj = compact_category(&category);
        assert_eq!(obj["total"], 5);
        assert_eq!(obj["nextCursor"], "next");
        assert_eq!(obj["facets"]["format"][0]["count"], 4);
        assert_eq!(obj["facets"]["format"][0]["terms"][0]["search"], "Book/Illustrated");
    }
}
