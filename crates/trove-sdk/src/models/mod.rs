//! Data models for Trove API entities.
//!
//! Records decode leniently (numbers as strings, single objects for arrays)
//! and keep their raw JSON for fields the typed models do not cover.

pub(crate) mod de;
mod enums;
mod inputs;
mod record;
mod records;
mod search;
mod serials;
pub mod xml;

pub use enums::{
    Category, Encoding, Facet, Include, RecordLevel, RecordType, ResponseFormat, SortBy,
    TitleKind, WordCount,
};
pub use inputs::*;
pub use record::Record;
pub use records::{AnyRecord, Article, ArticleTitle, Identifier, People, Relevance, UserList, Work};
pub use search::{CategoryResult, FacetGroup, FacetTerm, Facets, RecordsBlock, SearchResponse};
pub use serials::{Contributor, ContributorList, Title, TitleList, TitleYear};
