//! Persistent identifiers and Trove URLs.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::api;
use crate::models::{RecordType, TitleKind};

/// What a persistent identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PidKind {
    /// Newspaper article (`nla.news-article…`).
    NewspaperArticle,
    /// Government gazette article (API URLs only; gazettes share article PIDs).
    GazetteArticle,
    /// Newspaper title (`nla.news-title…`).
    NewspaperTitle,
    /// Newspaper page image (`nla.news-page…`).
    NewspaperPage,
    /// Digitised object (`nla.obj-…`).
    DigitisedObject,
    /// Catalogue record (`nla.cat-vn…`).
    CatalogueRecord,
    /// Person or organisation (`nla.party-…`).
    Party,
    /// Work (`trove.nla.gov.au/work/…`).
    Work,
    /// User list.
    List,
}

/// Where a PID can be fetched through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidTarget {
    /// A record endpoint.
    Record(RecordType),
    /// A serial title endpoint.
    Title(TitleKind),
}

impl PidKind {
    /// API endpoint serving this kind, if any.
    #[must_use]
    pub const fn target(self) -> Option<PidTarget> {
        match self {
            Self::NewspaperArticle => Some(PidTarget::Record(RecordType::Newspaper)),
            Self::GazetteArticle => Some(PidTarget::Record(RecordType::Gazette)),
            Self::Party => Some(PidTarget::Record(RecordType::People)),
            Self::Work => Some(PidTarget::Record(RecordType::Work)),
            Self::List => Some(PidTarget::Record(RecordType::List)),
            Self::NewspaperTitle => Some(PidTarget::Title(TitleKind::Newspaper)),
            Self::NewspaperPage | Self::DigitisedObject | Self::CatalogueRecord => None,
        }
    }
}

static PATTERNS: LazyLock<Vec<(PidKind, Regex)>> = LazyLock::new(|| {
    [
        (PidKind::NewspaperArticle, r"nla\.news-article(\d+)"),
        (PidKind::NewspaperTitle, r"nla\.news-title(\d+)"),
        (PidKind::NewspaperPage, r"nla\.news-page(\d+)"),
        (PidKind::DigitisedObject, r"nla\.obj-(\d+)"),
        (PidKind::CatalogueRecord, r"nla\.cat-vn(\d+)"),
        (PidKind::Party, r"nla\.party-(\d+)"),
        (PidKind::NewspaperArticle, r"trove\.nla\.gov\.au/newspaper/article/(\d+)"),
        (PidKind::NewspaperTitle, r"trove\.nla\.gov\.au/newspaper/title/(\d+)"),
        (PidKind::NewspaperPage, r"trove\.nla\.gov\.au/newspaper/page/(\d+)"),
        (PidKind::Work, r"trove\.nla\.gov\.au/work/(\d+)"),
        (PidKind::Party, r"trove\.nla\.gov\.au/people/(\d+)"),
        (PidKind::List, r"trove\.nla\.gov\.au/(?:user)?lists?\?id=(\d+)"),
        (PidKind::List, r"trove\.nla\.gov\.au/list/(\d+)"),
        (PidKind::Work, r"api\.trove\.nla\.gov\.au/v3/work/(\d+)"),
        (PidKind::NewspaperArticle, r"api\.trove\.nla\.gov\.au/v3/newspaper/(\d+)"),
        (PidKind::NewspaperTitle, r"api\.trove\.nla\.gov\.au/v3/newspaper/title/(\d+)"),
        (PidKind::GazetteArticle, r"api\.trove\.nla\.gov\.au/v3/gazette/(\d+)"),
        (PidKind::Party, r"api\.trove\.nla\.gov\.au/v3/people/(\d+)"),
        (PidKind::List, r"api\.trove\.nla\.gov\.au/v3/list/(\d+)"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid pid pattern")))
    .collect()
});

/// A recognised persistent identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pid {
    /// What the identifier names.
    pub kind: PidKind,
    /// Numeric identifier.
    pub id: String,
}

impl Pid {
    #[must_use]
    pub fn new(kind: PidKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    /// Parse a PID or Trove URL. The first identifier found in `text` wins.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        scan(text).into_iter().next().map(|(_, pid)| pid)
    }

    /// Stable public URL for the identifier.
    #[must_use]
    pub fn persistent_url(&self) -> String {
        let id = &self.id;
        match self.kind {
            PidKind::NewspaperArticle | PidKind::GazetteArticle => {
                format!("{}/nla.news-article{id}", api::PID_HOST)
            }
            PidKind::NewspaperTitle => format!("{}/nla.news-title{id}", api::PID_HOST),
            PidKind::NewspaperPage => format!("{}/nla.news-page{id}", api::PID_HOST),
            PidKind::DigitisedObject => format!("{}/nla.obj-{id}", api::PID_HOST),
            PidKind::CatalogueRecord => format!("{}/nla.cat-vn{id}", api::PID_HOST),
            PidKind::Party => format!("{}/nla.party-{id}", api::PID_HOST),
            PidKind::Work => format!("https://trove.nla.gov.au/work/{id}"),
            PidKind::List => format!("https://trove.nla.gov.au/list?id={id}"),
        }
    }

    /// API endpoint serving this identifier, if any.
    #[must_use]
    pub const fn target(&self) -> Option<PidTarget> {
        self.kind.target()
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.persistent_url())
    }
}

/// Every match in `text`, ordered by position.
fn scan(text: &str) -> Vec<(usize, Pid)> {
    let mut found: Vec<(usize, Pid)> = PATTERNS
        .iter()
        .flat_map(|(kind, re)| {
            re.captures_iter(text).filter_map(move |caps| {
                let whole = caps.get(0)?;
                let id = caps.get(1)?;
                Some((whole.start(), Pid::new(*kind, id.as_str())))
            })
        })
        .collect();
    found.sort_by_key(|(start, _)| *start);
    found
}

/// Identifiers in `text`, deduplicated, in order of first appearance.
#[must_use]
pub fn extract_pids(text: &str) -> Vec<Pid> {
    let mut seen = HashSet::new();
    scan(text)
        .into_iter()
        .map(|(_, pid)| pid)
        .filter(|pid| seen.insert(pid.clone()))
        .collect()
}

/// Identifiers in every string of a JSON value.
#[must_use]
pub fn extract_pids_from_value(value: &Value) -> Vec<Pid> {
    let mut seen = HashSet::new();
    let mut pids = Vec::new();
    walk(value, &mut |s| {
        for pid in extract_pids(s) {
            if seen.insert(pid.clone()) {
                pids.push(pid);
            }
        }
    });
    pids
}

fn walk<F: FnMut(&str)>(value: &Value, visit: &mut F) {
    match value {
        Value::String(s) => visit(s),
        Value::Array(items) => {
            for item in items {
                walk(item, &mut *visit);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                walk(item, &mut *visit);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_pids() {
        let pid = Pid::parse("nla.news-article18341291").unwrap();
        assert_eq!(pid, Pid::new(PidKind::NewspaperArticle, "18341291"));
        assert_eq!(pid.persistent_url(), "https://nla.gov.au/nla.news-article18341291");

        assert_eq!(Pid::parse("nla.obj-123456789").unwrap().kind, PidKind::DigitisedObject);
        assert_eq!(Pid::parse("nla.cat-vn2437016").unwrap().kind, PidKind::CatalogueRecord);
        assert_eq!(Pid::parse("nla.party-1478491").unwrap().kind, PidKind::Party);
    }

    #[test]
    fn test_parse_urls() {
        let work = Pid::parse("https://trove.nla.gov.au/work/10013347").unwrap();
        assert_eq!(work, Pid::new(PidKind::Work, "10013347"));

        let article = Pid::parse("https://trove.nla.gov.au/newspaper/article/4349378?searchTerm=x").unwrap();
        assert_eq!(article.kind, PidKind::NewspaperArticle);

        let list = Pid::parse("https://trove.nla.gov.au/list?id=83774").unwrap();
        assert_eq!(list, Pid::new(PidKind::List, "83774"));

        let gazette = Pid::parse("https://api.trove.nla.gov.au/v3/gazette/123").unwrap();
        assert_eq!(gazette.kind, PidKind::GazetteArticle);

        let title = Pid::parse("https://api.trove.nla.gov.au/v3/newspaper/title/35").unwrap();
        assert_eq!(title.kind, PidKind::NewspaperTitle);
    }

    #[test]
    fn test_parse_rejects_unrelated_text() {
        assert!(Pid::parse("https://example.com/work/1").is_none());
        assert!(Pid::parse("").is_none());
    }

    #[test]
    fn test_extract_dedupes_in_order() {
        let text = "See nla.obj-2 and https://trove.nla.gov.au/work/7, then nla.obj-2 again \
                    and http://nla.gov.au/nla.news-article99.";
        let pids = extract_pids(text);
        assert_eq!(
            pids,
            vec![
                Pid::new(PidKind::DigitisedObject, "2"),
                Pid::new(PidKind::Work, "7"),
                Pid::new(PidKind::NewspaperArticle, "99"),
            ]
        );
    }

    #[test]
    fn test_extract_from_value() {
        let record = json!({
            "id": "1",
            "identifier": [
                {"type": "url", "value": "https://nla.gov.au/nla.obj-555"},
                {"type": "url", "value": "https://nla.gov.au/nla.obj-555"}
            ],
            "contributor": ["nla.party-42"]
        });
        let pids = extract_pids_from_value(&record);
        assert_eq!(pids.len(), 2);
        assert_eq!(pids[0].kind, PidKind::DigitisedObject);
        assert_eq!(pids[1].kind, PidKind::Party);
    }

    #[test]
    fn test_targets() {
        assert_eq!(PidKind::Party.target(), Some(PidTarget::Record(RecordType::People)));
        assert_eq!(PidKind::NewspaperTitle.target(), Some(PidTarget::Title(TitleKind::Newspaper)));
        assert_eq!(PidKind::NewspaperPage.target(), None);
    }
}
