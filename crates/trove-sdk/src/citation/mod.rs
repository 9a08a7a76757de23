//! Persistent identifiers and citation formatting.

mod format;
mod pid;

pub use format::{format_citation, format_citations, Citation, CitationKind, CitationStyle};
pub use pid::{extract_pids, extract_pids_from_value, Pid, PidKind, PidTarget};
