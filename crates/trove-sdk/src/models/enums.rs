//! Enumeration types for API and tool parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}

impl ResponseFormat {
    /// Check if this is markdown format.
    #[must_use]
    pub const fn is_markdown(self) -> bool {
        matches!(self, Self::Markdown)
    }

    /// Check if this is JSON format.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A searchable partition of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Every category at once. Cannot be combined with others.
    All,
    /// Books & Libraries.
    Book,
    /// Diaries, Letters & Archives.
    Diary,
    /// Images, Maps & Artefacts.
    Image,
    /// User-created lists.
    List,
    /// Magazines & Newsletters.
    Magazine,
    /// Music, Audio & Video.
    Music,
    /// Newspapers & Gazettes.
    Newspaper,
    /// People & Organisations.
    People,
    /// Research & Reports.
    Research,
}

impl Category {
    /// Every category except `all`.
    pub const CONCRETE: [Self; 9] = [
        Self::Book,
        Self::Diary,
        Self::Image,
        Self::List,
        Self::Magazine,
        Self::Music,
        Self::Newspaper,
        Self::People,
        Self::Research,
    ];

    /// Code used in the `category` parameter and in responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Book => "book",
            Self::Diary => "diary",
            Self::Image => "image",
            Self::List => "list",
            Self::Magazine => "magazine",
            Self::Music => "music",
            Self::Newspaper => "newspaper",
            Self::People => "people",
            Self::Research => "research",
        }
    }

    /// Whether records in this category are works (as opposed to articles, people or lists).
    #[must_use]
    pub const fn holds_works(self) -> bool {
        matches!(
            self,
            Self::Book | Self::Diary | Self::Image | Self::Magazine | Self::Music | Self::Research
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "book" => Ok(Self::Book),
            "diary" => Ok(Self::Diary),
            "image" => Ok(Self::Image),
            "list" => Ok(Self::List),
            "magazine" => Ok(Self::Magazine),
            "music" => Ok(Self::Music),
            "newspaper" => Ok(Self::Newspaper),
            "people" => Ok(Self::People),
            "research" => Ok(Self::Research),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Best match first.
    #[default]
    Relevance,
    /// Newest first.
    DateDesc,
    /// Oldest first.
    DateAsc,
}

impl SortBy {
    /// Value of the `sortby` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::DateDesc => "datedesc",
            Self::DateAsc => "dateasc",
        }
    }
}

/// How much metadata the API returns per record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordLevel {
    /// Summary fields only.
    #[default]
    Brief,
    /// Everything the API holds.
    Full,
}

impl RecordLevel {
    /// Value of the `reclevel` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Full => "full",
        }
    }
}

/// Response body encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// JSON (default).
    #[default]
    Json,
    /// XML, decoded into the same tree as JSON.
    Xml,
}

impl Encoding {
    /// Value of the `encoding` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

/// Optional record sections requested with `include`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    /// User tags.
    Tags,
    /// User comments.
    Comments,
    /// Lists containing the record.
    Lists,
    /// Links to digitised copies and related resources.
    Links,
    /// Editions of a work.
    WorkVersions,
    /// Years a title was published (title endpoints).
    Years,
    /// Holding libraries.
    Holdings,
    /// Subscribing institutions.
    SubscribingInstitutions,
    /// Full OCR text of a newspaper article.
    ArticleText,
}

impl Include {
    /// Value used in the `include` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Comments => "comments",
            Self::Lists => "lists",
            Self::Links => "links",
            Self::WorkVersions => "workversions",
            Self::Years => "years",
            Self::Holdings => "holdings",
            Self::SubscribingInstitutions => "subscribinginstitutions",
            Self::ArticleText => "articletext",
        }
    }
}

/// A limit dimension. Used both for `l-<name>` filters and for facet requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Facet {
    #[serde(rename = "decade")]
    Decade,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "format")]
    Format,
    #[serde(rename = "artType")]
    ArtType,
    #[serde(rename = "language")]
    Language,
    #[serde(rename = "austlanguage")]
    AustLanguage,
    #[serde(rename = "availability")]
    Availability,
    #[serde(rename = "australian")]
    Australian,
    #[serde(rename = "occupation")]
    Occupation,
    #[serde(rename = "zoom")]
    Zoom,
    #[serde(rename = "birth")]
    Birth,
    #[serde(rename = "death")]
    Death,
    #[serde(rename = "contribcollection")]
    ContribCollection,
    #[serde(rename = "firstcontributor")]
    FirstContributor,
    #[serde(rename = "rights")]
    Rights,
    /// Newspaper title id.
    #[serde(rename = "title")]
    Title,
    /// Newspaper article category (Article, Advertising, ...).
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "illustrated")]
    Illustrated,
    #[serde(rename = "illustrationType")]
    IllustrationType,
    #[serde(rename = "wordCount")]
    WordCount,
    #[serde(rename = "state")]
    State,
    #[serde(rename = "place")]
    Place,
    #[serde(rename = "geocoverage")]
    GeoCoverage,
    #[serde(rename = "culturalSensitivity")]
    CulturalSensitivity,
    #[serde(rename = "partnerNuc")]
    PartnerNuc,
}

impl Facet {
    /// Every dimension, in parameter order.
    pub const ALL: [Self; 26] = [
        Self::Decade,
        Self::Year,
        Self::Month,
        Self::Format,
        Self::ArtType,
        Self::Language,
        Self::AustLanguage,
        Self::Availability,
        Self::Australian,
        Self::Occupation,
        Self::Zoom,
        Self::Birth,
        Self::Death,
        Self::ContribCollection,
        Self::FirstContributor,
        Self::Rights,
        Self::Title,
        Self::Category,
        Self::Illustrated,
        Self::IllustrationType,
        Self::WordCount,
        Self::State,
        Self::Place,
        Self::GeoCoverage,
        Self::CulturalSensitivity,
        Self::PartnerNuc,
    ];

    /// Name used in the `facet` parameter and in facet responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decade => "decade",
            Self::Year => "year",
            Self::Month => "month",
            Self::Format => "format",
            Self::ArtType => "artType",
            Self::Language => "language",
            Self::AustLanguage => "austlanguage",
            Self::Availability => "availability",
            Self::Australian => "australian",
            Self::Occupation => "occupation",
            Self::Zoom => "zoom",
            Self::Birth => "birth",
            Self::Death => "death",
            Self::ContribCollection => "contribcollection",
            Self::FirstContributor => "firstcontributor",
            Self::Rights => "rights",
            Self::Title => "title",
            Self::Category => "category",
            Self::Illustrated => "illustrated",
            Self::IllustrationType => "illustrationType",
            Self::WordCount => "wordCount",
            Self::State => "state",
            Self::Place => "place",
            Self::GeoCoverage => "geocoverage",
            Self::CulturalSensitivity => "culturalSensitivity",
            Self::PartnerNuc => "partnerNuc",
        }
    }

    /// Name of the limit parameter (`l-decade`, `l-wordCount`, ...).
    #[must_use]
    pub fn limit_param(self) -> String {
        format!("l-{}", self.as_str())
    }

    /// Whether this dimension is meaningful for records of `category`.
    #[must_use]
    pub const fn applies_to(self, category: Category) -> bool {
        if matches!(category, Category::All) {
            return true;
        }
        match self {
            Self::Decade | Self::Year => {
                !matches!(category, Category::People | Category::List)
            }
            Self::Month
            | Self::Title
            | Self::Category
            | Self::Illustrated
            | Self::IllustrationType
            | Self::WordCount
            | Self::State
            | Self::Place => matches!(category, Category::Newspaper),
            Self::Occupation | Self::Birth | Self::Death => matches!(category, Category::People),
            Self::Format
            | Self::ArtType
            | Self::Language
            | Self::AustLanguage
            | Self::Availability
            | Self::Australian
            | Self::Zoom
            | Self::ContribCollection
            | Self::FirstContributor
            | Self::Rights
            | Self::GeoCoverage
            | Self::CulturalSensitivity
            | Self::PartnerNuc => category.holds_works(),
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches("l-");
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown facet '{s}'"))
    }
}

/// Newspaper article length buckets accepted by `l-wordCount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordCount {
    #[serde(rename = "<100 Words")]
    UnderHundred,
    #[serde(rename = "100 - 1000 Words")]
    HundredToThousand,
    #[serde(rename = "1000+ Words")]
    OverThousand,
}

impl WordCount {
    /// Value of the `l-wordCount` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnderHundred => "<100 Words",
            Self::HundredToThousand => "100 - 1000 Words",
            Self::OverThousand => "1000+ Words",
        }
    }
}

/// Serial title families served by the `/<kind>/title` endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    /// Digitised newspapers.
    #[default]
    Newspaper,
    /// Digitised magazines.
    Magazine,
    /// Government gazettes.
    Gazette,
}

impl TitleKind {
    /// Path segment for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newspaper => "newspaper",
            Self::Magazine => "magazine",
            Self::Gazette => "gazette",
        }
    }
}

/// Kinds of single record served by the record endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// `/work/{id}`
    Work,
    /// `/newspaper/{id}`
    Newspaper,
    /// `/gazette/{id}`
    Gazette,
    /// `/people/{id}`
    People,
    /// `/list/{id}`
    List,
}

impl RecordType {
    /// Path segment for this record type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Newspaper => "newspaper",
            Self::Gazette => "gazette",
            Self::People => "people",
            Self::List => "list",
        }
    }
}
