//! Record models matching the Trove v3 schema.
//!
//! Only commonly used fields are typed; everything else stays reachable
//! through [`Record::get`](super::Record::get).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use super::Record;

/// A work: book, image, map, recording, diary, thesis, magazine issue...
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    /// Work ID.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,

    /// API URL of this record.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,

    /// Public Trove page.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub trove_url: Option<String>,

    /// Title.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub title: Option<String>,

    /// Creators, as display strings ("Lawson, Henry, 1867-1922").
    #[serde(default, deserialize_with = "de::string_list")]
    pub contributor: Vec<String>,

    /// Publication date or range ("1896", "1901-1905").
    #[serde(default, deserialize_with = "de::opt_string")]
    pub issued: Option<String>,

    /// Format types ("Book", "Map", "Photograph").
    #[serde(default, rename = "type", deserialize_with = "de::string_list")]
    pub types: Vec<String>,

    /// Subjects.
    #[serde(default, deserialize_with = "de::string_list")]
    pub subject: Vec<String>,

    /// Abstracts.
    #[serde(default, rename = "abstract", deserialize_with = "de::string_list")]
    pub abstracts: Vec<String>,

    /// Publishers.
    #[serde(default, deserialize_with = "de::string_list")]
    pub publisher: Vec<String>,

    /// Languages.
    #[serde(default, deserialize_with = "de::string_list")]
    pub language: Vec<String>,

    /// Number of libraries holding a copy.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub holdings_count: Option<u64>,

    /// Number of editions grouped into this work.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub version_count: Option<u64>,

    /// Links and identifiers (fulltext, thumbnail, ISBN...).
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub identifier: Vec<Identifier>,

    /// Highlighted match text.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub snippet: Option<String>,

    /// Relevance score.
    #[serde(default)]
    pub relevance: Option<Relevance>,
}

impl Work {
    /// Title, falling back to "Untitled".
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// First listed creator.
    #[must_use]
    pub fn first_contributor(&self) -> Option<&str> {
        self.contributor.first().map(String::as_str)
    }

    /// Four-digit year extracted from `issued`.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.issued.as_deref().and_then(leading_year)
    }

    /// First identifier with the given `linktype` ("fulltext", "thumbnail", ...).
    #[must_use]
    pub fn link(&self, linktype: &str) -> Option<&str> {
        self.identifier
            .iter()
            .find(|i| i.linktype.as_deref() == Some(linktype))
            .and_then(|i| i.value.as_deref())
    }
}

/// An identifier or link attached to a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identifier {
    /// Identifier type ("url", "isbn", "issn").
    #[serde(default, rename = "type", deserialize_with = "de::opt_string")]
    pub kind: Option<String>,

    /// Link type for URLs ("fulltext", "thumbnail", "restricted").
    #[serde(default, deserialize_with = "de::opt_string")]
    pub linktype: Option<String>,

    /// Link text.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub linktext: Option<String>,

    /// Identifier value.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub value: Option<String>,
}

/// Relevance ranking of a search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relevance {
    /// Raw score.
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub score: Option<f64>,

    /// Bucket label ("very relevant", "likely to be relevant", ...).
    #[serde(default, deserialize_with = "de::opt_string")]
    pub value: Option<String>,
}

/// A newspaper or gazette article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Article ID.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,

    /// API URL of this record.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,

    /// Public Trove page.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub trove_url: Option<String>,

    /// Headline.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub heading: Option<String>,

    /// Article category ("Article", "Advertising", "Family Notices").
    #[serde(default, deserialize_with = "de::opt_string")]
    pub category: Option<String>,

    /// Newspaper the article appeared in.
    #[serde(default)]
    pub title: Option<ArticleTitle>,

    /// Issue date (YYYY-MM-DD).
    #[serde(default, deserialize_with = "de::opt_string")]
    pub date: Option<String>,

    /// Page label.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub page: Option<String>,

    /// Page position within the issue.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub page_sequence: Option<String>,

    /// Edition.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub edition: Option<String>,

    /// Whether the article is illustrated.
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub illustrated: Option<bool>,

    /// OCR word count.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub word_count: Option<u64>,

    /// Number of text corrections made by users.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub correction_count: Option<u64>,

    /// Highlighted match text.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub snippet: Option<String>,

    /// OCR text (requires `include=articletext`).
    #[serde(default, deserialize_with = "de::opt_string")]
    pub article_text: Option<String>,

    /// Relevance score.
    #[serde(default)]
    pub relevance: Option<Relevance>,
}

impl Article {
    /// Headline, falling back to "Untitled".
    #[must_use]
    pub fn heading_or_default(&self) -> &str {
        self.heading.as_deref().unwrap_or("Untitled")
    }

    /// Name of the newspaper.
    #[must_use]
    pub fn newspaper(&self) -> Option<&str> {
        self.title.as_ref()?.title.as_deref()
    }

    /// Newspaper name without the trailing "(Place : years)" qualifier.
    #[must_use]
    pub fn newspaper_short(&self) -> Option<&str> {
        self.newspaper().map(|t| t.split(" (").next().unwrap_or(t).trim())
    }

    /// Year of the issue.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.date.as_deref().and_then(leading_year)
    }
}

/// Newspaper reference embedded in an article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleTitle {
    /// Newspaper title ID.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,

    /// Newspaper name, including place and years.
    #[serde(default, alias = "value", deserialize_with = "de::opt_string")]
    pub title: Option<String>,
}

/// A person or organisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct People {
    /// Party ID.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,

    /// API URL of this record.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,

    /// Public Trove page.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub trove_url: Option<String>,

    /// Authorised name.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub primary_name: Option<String>,

    /// Display form of the name, with dates.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub primary_display_name: Option<String>,

    /// Other names.
    #[serde(default, deserialize_with = "de::string_list")]
    pub alternate_name: Vec<String>,

    /// Occupations.
    #[serde(default, deserialize_with = "de::string_list")]
    pub occupation: Vec<String>,

    /// Biographical notes.
    #[serde(default, deserialize_with = "de::string_list")]
    pub biography: Vec<String>,

    /// "Person", "Organisation", "Family".
    #[serde(default, rename = "type", deserialize_with = "de::string_list")]
    pub types: Vec<String>,
}

impl People {
    /// Best available name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.primary_display_name
            .as_deref()
            .or(self.primary_name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// A user-curated list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    /// List ID.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,

    /// API URL of this record.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub url: Option<String>,

    /// Public Trove page.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub trove_url: Option<String>,

    /// List title.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub title: Option<String>,

    /// Creator's user name.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub creator: Option<String>,

    /// Description.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub description: Option<String>,

    /// Number of items on the list.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub list_item_count: Option<u64>,

    /// Highlighted match text.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub snippet: Option<String>,
}

/// Any search hit, tagged by the record array it came from.
#[derive(Debug, Clone)]
pub enum AnyRecord {
    /// From `work`.
    Work(Record<Work>),
    /// From `article`.
    Article(Record<Article>),
    /// From `people`.
    People(Record<People>),
    /// From `list`.
    List(Record<UserList>),
}

impl AnyRecord {
    /// Record ID.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Work(r) => r.id.as_deref(),
            Self::Article(r) => r.id.as_deref(),
            Self::People(r) => r.id.as_deref(),
            Self::List(r) => r.id.as_deref(),
        }
    }

    /// Display title (headline for articles, name for people).
    #[must_use]
    pub fn display_title(&self) -> &str {
        match self {
            Self::Work(r) => r.title_or_default(),
            Self::Article(r) => r.heading_or_default(),
            Self::People(r) => r.name(),
            Self::List(r) => r.title.as_deref().unwrap_or("Untitled list"),
        }
    }

    /// Public Trove page.
    #[must_use]
    pub fn trove_url(&self) -> Option<&str> {
        match self {
            Self::Work(r) => r.trove_url.as_deref(),
            Self::Article(r) => r.trove_url.as_deref(),
            Self::People(r) => r.trove_url.as_deref(),
            Self::List(r) => r.trove_url.as_deref(),
        }
    }

    /// Name of the record array ("work", "article", "people", "list").
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Work(_) => "work",
            Self::Article(_) => "article",
            Self::People(_) => "people",
            Self::List(_) => "list",
        }
    }

    /// Raw JSON.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        match self {
            Self::Work(r) => r.raw(),
            Self::Article(r) => r.raw(),
            Self::People(r) => r.raw(),
            Self::List(r) => r.raw(),
        }
    }
}

/// First run of four digits in a date string.
pub(crate) fn leading_year(date: &str) -> Option<i32> {
    date.as_bytes()
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .and_then(|start| date.get(start..start + 4))
        .and_then(|y| y.parse().ok())
}
