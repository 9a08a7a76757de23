//! Newspaper/magazine/gazette titles and contributing libraries.

use serde::{Deserialize, Serialize};

use super::de;
use super::Record;

/// A digitised serial title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    /// Title ID (the value used in `l-title`).
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,

    /// Full title, including place and years.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub title: Option<String>,

    /// State or territory.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub state: Option<String>,

    /// ISSN.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub issn: Option<String>,

    /// Public Trove page.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub trove_url: Option<String>,

    /// First digitised issue date.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub start_date: Option<String>,

    /// Last digitised issue date.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub end_date: Option<String>,

    /// Places of publication.
    #[serde(default, deserialize_with = "de::string_list")]
    pub place: Vec<String>,

    /// Issues per year (requires `include=years`).
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub year: Vec<TitleYear>,
}

impl Title {
    /// Title, falling back to "Untitled".
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

/// Issue count for one year of a title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleYear {
    /// Year.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub date: Option<String>,

    /// Number of digitised issues.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub issuecount: Option<u64>,
}

/// Envelope returned by `/<kind>/titles`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleList {
    /// Number of titles.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub total: Option<u64>,

    /// Titles (the array is named after the kind in the response).
    #[serde(
        default,
        rename = "newspaper",
        alias = "magazine",
        alias = "gazette",
        deserialize_with = "de::one_or_many"
    )]
    pub titles: Vec<Record<Title>>,
}

/// A contributing library or organisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contributor {
    /// NUC symbol (e.g. "ANL").
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,

    /// Full name.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,

    /// Short name.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub shortname: Option<String>,

    /// API URL.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,

    /// Number of holdings contributed.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub totalholdings: Option<u64>,
}

impl Contributor {
    /// Best available name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.shortname.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Envelope returned by `/contributor`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributorList {
    /// Number of contributors.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub total: Option<u64>,

    /// Contributors.
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub contributor: Vec<Record<Contributor>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_list_accepts_any_kind_key() {
        let list: TitleList = serde_json::from_value(json!({
            "total": "2",
            "magazine": [
                {"id": "1", "title": "The Bulletin"},
                {"id": "2", "title": "The Lone Hand"}
            ]
        }))
        .unwrap();
        assert_eq!(list.total, Some(2));
        assert_eq!(list.titles.len(), 2);
        assert_eq!(list.titles[1].title_or_default(), "The Lone Hand");
    }

    #[test]
    fn test_title_years() {
        let title: Title = serde_json::from_value(json!({
            "id": "35",
            "title": "The Sydney Morning Herald (NSW : 1842 - 1954)",
            "year": [{"date": "1842", "issuecount": 250}, {"date": "1843", "issuecount": "301"}]
        }))
        .unwrap();
        assert_eq!(title.year.len(), 2);
        assert_eq!(title.year[1].issuecount, Some(301));
    }

    #[test]
    fn test_contributor_single_object() {
        let list: ContributorList =
            serde_json::from_value(json!({"contributor": {"id": "ANL", "name": "National Library of Australia"}}))
                .unwrap();
        assert_eq!(list.contributor.len(), 1);
        assert_eq!(list.contributor[0].display_name(), "National Library of Australia");
    }
}
