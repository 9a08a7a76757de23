//! Citation extraction and formatting.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::pid::{extract_pids_from_value, Pid};
use crate::models::{AnyRecord, Article, People, UserList, Work};

/// Output style for citations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    #[default]
    Apa,
    Mla,
    Chicago,
    Harvard,
    Bibtex,
    Ris,
    Endnote,
    Csv,
}

impl CitationStyle {
    pub const ALL: [Self; 8] = [
        Self::Apa,
        Self::Mla,
        Self::Chicago,
        Self::Harvard,
        Self::Bibtex,
        Self::Ris,
        Self::Endnote,
        Self::Csv,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apa => "apa",
            Self::Mla => "mla",
            Self::Chicago => "chicago",
            Self::Harvard => "harvard",
            Self::Bibtex => "bibtex",
            Self::Ris => "ris",
            Self::Endnote => "endnote",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| format!("unknown citation style '{s}'"))
    }
}

/// The kind of record a citation describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    #[default]
    Work,
    Article,
    Person,
    List,
}

/// Bibliographic fields pulled from a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub kind: CitationKind,
    pub record_id: Option<String>,
    pub title: String,
    /// Creators with life dates removed ("Lawson, Henry").
    pub creators: Vec<String>,
    /// Date as given by the API ("1896", "1901-01-01").
    pub date: Option<String>,
    pub year: Option<i32>,
    /// Newspaper for articles.
    pub container: Option<String>,
    pub publisher: Option<String>,
    pub page: Option<String>,
    /// Format of a work ("Book", "Map", "Thesis").
    pub format: Option<String>,
    pub url: Option<String>,
    pub pid: Option<Pid>,
    pub accessed: Option<NaiveDate>,
}

impl Citation {
    #[must_use]
    pub fn from_work(work: &Work) -> Self {
        Self {
            kind: CitationKind::Work,
            record_id: work.id.clone(),
            title: work.title_or_default().to_string(),
            creators: work.contributor.iter().map(|c| strip_life_dates(c)).collect(),
            date: work.issued.clone(),
            year: work.year(),
            publisher: work.publisher.first().cloned(),
            format: work.types.first().cloned(),
            url: work.trove_url.clone(),
            pid: work.trove_url.as_deref().and_then(Pid::parse),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_article(article: &Article) -> Self {
        Self {
            kind: CitationKind::Article,
            record_id: article.id.clone(),
            title: article.heading_or_default().to_string(),
            date: article.date.clone(),
            year: article.year(),
            container: article.newspaper_short().map(str::to_string),
            page: article.page.clone(),
            url: article.trove_url.clone(),
            pid: article.trove_url.as_deref().and_then(Pid::parse),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_people(people: &People) -> Self {
        Self {
            kind: CitationKind::Person,
            record_id: people.id.clone(),
            title: people.name().to_string(),
            url: people.trove_url.clone(),
            pid: people.trove_url.as_deref().and_then(Pid::parse),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_list(list: &UserList) -> Self {
        Self {
            kind: CitationKind::List,
            record_id: list.id.clone(),
            title: list.title.clone().unwrap_or_else(|| "Untitled list".to_string()),
            creators: list.creator.iter().cloned().collect(),
            url: list.trove_url.clone(),
            pid: list.trove_url.as_deref().and_then(Pid::parse),
            ..Self::default()
        }
    }

    /// Build from any search hit. Falls back to PIDs found anywhere in the
    /// raw record when the typed URL carries none.
    #[must_use]
    pub fn from_record(record: &AnyRecord) -> Self {
        let mut citation = match record {
            AnyRecord::Work(r) => Self::from_work(r),
            AnyRecord::Article(r) => Self::from_article(r),
            AnyRecord::People(r) => Self::from_people(r),
            AnyRecord::List(r) => Self::from_list(r),
        };
        if citation.pid.is_none() {
            citation.pid = extract_pids_from_value(record.raw()).into_iter().next();
        }
        citation
    }

    /// Set the access date shown by styles that carry one.
    #[must_use]
    pub fn accessed_on(mut self, date: NaiveDate) -> Self {
        self.accessed = Some(date);
        self
    }

    /// Persistent URL when known, else the Trove page.
    #[must_use]
    pub fn link(&self) -> Option<String> {
        self.pid.as_ref().map(Pid::persistent_url).or_else(|| self.url.clone())
    }

    fn first_surname(&self) -> Option<&str> {
        self.creators.first().map(|c| c.split(',').next().unwrap_or(c).trim())
    }

    fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }

    fn year_text(&self) -> String {
        self.year.map_or_else(|| "n.d.".to_string(), |y| y.to_string())
    }
}

/// Drop trailing life dates: "Lawson, Henry, 1867-1922" becomes "Lawson, Henry".
fn strip_life_dates(name: &str) -> String {
    name.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty() && !part.starts_with(|c: char| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// "Lawson, Henry Archibald" becomes "Lawson, H. A.". Names without a comma are kept.
fn apa_name(name: &str) -> String {
    match name.split_once(',') {
        Some((surname, given)) => {
            let initials: Vec<String> = given
                .split_whitespace()
                .filter_map(|g| g.chars().next())
                .map(|c| format!("{c}."))
                .collect();
            if initials.is_empty() {
                surname.trim().to_string()
            } else {
                format!("{}, {}", surname.trim(), initials.join(" "))
            }
        }
        None => name.to_string(),
    }
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{first} & {second}"),
        [rest @ .., last] => format!("{}, & {last}", rest.join(", ")),
    }
}

fn end_with_period(s: &str) -> String {
    let s = s.trim();
    if s.ends_with(['.', '?', '!']) { s.to_string() } else { format!("{s}.") }
}

/// Format one citation.
#[must_use]
pub fn format_citation(citation: &Citation, style: CitationStyle) -> String {
    match style {
        CitationStyle::Apa => format_apa(citation),
        CitationStyle::Mla => format_mla(citation),
        CitationStyle::Chicago => format_chicago(citation),
        CitationStyle::Harvard => format_harvard(citation),
        CitationStyle::Bibtex => format_bibtex(citation),
        CitationStyle::Ris => format_ris(citation),
        CitationStyle::Endnote => format_endnote(citation),
        CitationStyle::Csv => format!("{CSV_HEADER}\n{}", csv_row(citation)),
    }
}

/// Format several citations as one document.
#[must_use]
pub fn format_citations(citations: &[Citation], style: CitationStyle) -> String {
    match style {
        CitationStyle::Csv => {
            let mut output = format!("{CSV_HEADER}\n");
            for citation in citations {
                output.push_str(&csv_row(citation));
                output.push('\n');
            }
            output
        }
        CitationStyle::Bibtex | CitationStyle::Ris | CitationStyle::Endnote => citations
            .iter()
            .map(|c| format_citation(c, style))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => citations
            .iter()
            .map(|c| format_citation(c, style))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

fn format_apa(c: &Citation) -> String {
    let mut parts = Vec::new();
    let authors: Vec<String> = c.creators.iter().map(|n| apa_name(n)).collect();

    let date = match (c.kind, c.parsed_date()) {
        (CitationKind::Article, Some(d)) => d.format("%Y, %B %-d").to_string(),
        _ => c.year_text(),
    };

    if authors.is_empty() {
        parts.push(end_with_period(&c.title));
        parts.push(format!("({date})."));
    } else {
        parts.push(format!("{} ({date}).", join_names(&authors)));
        parts.push(end_with_period(&c.title));
    }

    if let Some(container) = &c.container {
        match &c.page {
            Some(page) => parts.push(format!("{container}, p. {page}.")),
            None => parts.push(end_with_period(container)),
        }
    }
    if let Some(publisher) = &c.publisher {
        parts.push(end_with_period(publisher));
    }
    if let Some(link) = c.link() {
        parts.push(link);
    }
    parts.join(" ")
}

fn format_mla(c: &Citation) -> String {
    let mut parts = Vec::new();
    if let Some(first) = c.creators.first() {
        let author = if c.creators.len() > 1 { format!("{first}, et al") } else { first.clone() };
        parts.push(end_with_period(&author));
    }

    match c.kind {
        CitationKind::Article => {
            parts.push(format!("\"{}\"", end_with_period(&c.title)));
            let mut detail = Vec::new();
            if let Some(container) = &c.container {
                detail.push(container.clone());
            }
            if let Some(d) = c.parsed_date() {
                detail.push(d.format("%-d %b. %Y").to_string());
            }
            if let Some(page) = &c.page {
                detail.push(format!("p. {page}"));
            }
            if !detail.is_empty() {
                parts.push(format!("{}.", detail.join(", ")));
            }
        }
        _ => {
            parts.push(end_with_period(&c.title));
            let publication = match (&c.publisher, c.year) {
                (Some(p), Some(y)) => Some(format!("{p}, {y}.")),
                (Some(p), None) => Some(end_with_period(p)),
                (None, Some(y)) => Some(format!("{y}.")),
                (None, None) => None,
            };
            parts.extend(publication);
        }
    }

    if let Some(link) = c.link() {
        parts.push(format!("Trove, {link}."));
    }
    if let Some(accessed) = c.accessed {
        parts.push(format!("Accessed {}.", accessed.format("%-d %b. %Y")));
    }
    parts.join(" ")
}

fn format_chicago(c: &Citation) -> String {
    let mut parts = Vec::new();
    if !c.creators.is_empty() {
        parts.push(end_with_period(&c.creators.join(", and ")));
    }

    match c.kind {
        CitationKind::Article => {
            parts.push(format!("\"{}\"", end_with_period(&c.title)));
            let mut detail = Vec::new();
            if let Some(container) = &c.container {
                detail.push(container.clone());
            }
            match c.parsed_date() {
                Some(d) => detail.push(d.format("%B %-d, %Y").to_string()),
                None => detail.extend(c.date.clone()),
            }
            if let Some(page) = &c.page {
                detail.push(page.clone());
            }
            if !detail.is_empty() {
                parts.push(format!("{}.", detail.join(", ")));
            }
        }
        _ => {
            parts.push(end_with_period(&c.title));
            match (&c.publisher, c.year) {
                (Some(p), Some(y)) => parts.push(format!("{p}, {y}.")),
                (Some(p), None) => parts.push(end_with_period(p)),
                (None, Some(y)) => parts.push(format!("{y}.")),
                (None, None) => {}
            }
        }
    }

    if let Some(link) = c.link() {
        parts.push(format!("{link}."));
    }
    parts.join(" ")
}

fn format_harvard(c: &Citation) -> String {
    let mut output = String::new();
    let lead = if c.creators.is_empty() {
        c.container.clone().unwrap_or_else(|| c.title.clone())
    } else {
        join_names(&c.creators.iter().map(|n| apa_name(n)).collect::<Vec<_>>())
    };
    output.push_str(&format!("{lead} ({})", c.year_text()));

    if c.kind == CitationKind::Article {
        output.push_str(&format!(" '{}'", c.title.trim()));
        if let Some(d) = c.parsed_date() {
            output.push_str(&format!(", {}", d.format("%-d %B")));
        }
        if let Some(page) = &c.page {
            output.push_str(&format!(", p. {page}"));
        }
        output.push('.');
    } else {
        if !(c.creators.is_empty() && c.container.is_none()) {
            output.push(' ');
            output.push_str(&end_with_period(&c.title));
        } else {
            output.push('.');
        }
        if let Some(publisher) = &c.publisher {
            output.push(' ');
            output.push_str(&end_with_period(publisher));
        }
    }

    if let Some(link) = c.link() {
        output.push_str(&format!(" Available at: {link}"));
        if let Some(accessed) = c.accessed {
            output.push_str(&format!(" (Accessed: {})", accessed.format("%-d %B %Y")));
        }
        output.push('.');
    }
    output
}

fn bibtex_key(c: &Citation) -> String {
    let stem: String = c
        .first_surname()
        .unwrap_or("trove")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    let stem = if stem.is_empty() { "trove".to_string() } else { stem };
    match (c.year, &c.record_id) {
        (Some(y), Some(id)) => format!("{stem}{y}_{id}"),
        (Some(y), None) => format!("{stem}{y}"),
        (None, Some(id)) => format!("{stem}_{id}"),
        (None, None) => stem,
    }
}

fn format_bibtex(c: &Citation) -> String {
    let entry = match c.kind {
        CitationKind::Article => "article",
        CitationKind::Work if c.format.as_deref().is_some_and(|f| f.starts_with("Book")) => "book",
        CitationKind::Work if c.format.as_deref().is_some_and(|f| f.starts_with("Thesis")) => {
            "phdthesis"
        }
        _ => "misc",
    };

    let mut output = format!("@{entry}{{{},\n", bibtex_key(c));
    output.push_str(&format!("  title = {{{}}},\n", escape_bibtex(&c.title)));
    if !c.creators.is_empty() {
        output.push_str(&format!("  author = {{{}}},\n", escape_bibtex(&c.creators.join(" and "))));
    }
    if let Some(year) = c.year {
        output.push_str(&format!("  year = {{{year}}},\n"));
    }
    if let Some(container) = &c.container {
        output.push_str(&format!("  journal = {{{}}},\n", escape_bibtex(container)));
    }
    if let Some(publisher) = &c.publisher {
        output.push_str(&format!("  publisher = {{{}}},\n", escape_bibtex(publisher)));
    }
    if let Some(page) = &c.page {
        output.push_str(&format!("  pages = {{{}}},\n", escape_bibtex(page)));
    }
    if let Some(date) = c.parsed_date() {
        output.push_str(&format!("  date = {{{}}},\n", date.format("%Y-%m-%d")));
    }
    if let Some(link) = c.link() {
        output.push_str(&format!("  url = {{{link}}},\n"));
    }
    if let Some(accessed) = c.accessed {
        output.push_str(&format!("  urldate = {{{}}},\n", accessed.format("%Y-%m-%d")));
    }
    output.push_str("}\n");
    output
}

fn ris_type(c: &Citation) -> &'static str {
    match c.kind {
        CitationKind::Article => "NEWS",
        CitationKind::List => "ELEC",
        CitationKind::Person => "GEN",
        CitationKind::Work => match c.format.as_deref().unwrap_or("") {
            f if f.starts_with("Book") => "BOOK",
            f if f.starts_with("Map") => "MAP",
            f if f.starts_with("Thesis") => "THES",
            f if f.starts_with("Sound") || f.starts_with("Music") => "SOUND",
            f if f.starts_with("Photograph") || f.starts_with("Image") || f.starts_with("Art") => {
                "ART"
            }
            _ => "GEN",
        },
    }
}

fn single_line(s: &str) -> String {
    s.replace('\r', "").replace('\n', " ")
}

/// Append one tagged line. Line breaks in `value` are flattened so a field
/// can never start a new tag or record.
fn push_tagged(output: &mut String, tag: &str, value: &str) {
    output.push_str(tag);
    output.push_str(&single_line(value));
    output.push('\n');
}

fn format_ris(c: &Citation) -> String {
    let mut output = format!("TY  - {}\n", ris_type(c));
    push_tagged(&mut output, "TI  - ", &c.title);
    for creator in &c.creators {
        push_tagged(&mut output, "AU  - ", creator);
    }
    if let Some(year) = c.year {
        push_tagged(&mut output, "PY  - ", &year.to_string());
    }
    if let Some(date) = c.parsed_date() {
        push_tagged(&mut output, "DA  - ", &date.format("%Y/%m/%d").to_string());
    }
    if let Some(container) = &c.container {
        push_tagged(&mut output, "T2  - ", container);
    }
    if let Some(publisher) = &c.publisher {
        push_tagged(&mut output, "PB  - ", publisher);
    }
    if let Some(page) = &c.page {
        push_tagged(&mut output, "SP  - ", page);
    }
    if let Some(link) = c.link() {
        push_tagged(&mut output, "UR  - ", &link);
    }
    if let Some(accessed) = c.accessed {
        push_tagged(&mut output, "Y2  - ", &accessed.format("%Y/%m/%d").to_string());
    }
    if let Some(id) = &c.record_id {
        push_tagged(&mut output, "ID  - ", id);
    }
    output.push_str("DB  - Trove\n");
    output.push_str("ER  - \n");
    output
}

fn format_endnote(c: &Citation) -> String {
    let reference_type = match c.kind {
        CitationKind::Article => "Newspaper Article",
        CitationKind::List => "Web Page",
        CitationKind::Person => "Generic",
        CitationKind::Work => match ris_type(c) {
            "BOOK" => "Book",
            "MAP" => "Map",
            "THES" => "Thesis",
            "SOUND" => "Music",
            "ART" => "Artwork",
            _ => "Generic",
        },
    };

    let mut output = format!("%0 {reference_type}\n");
    push_tagged(&mut output, "%T ", &c.title);
    for creator in &c.creators {
        push_tagged(&mut output, "%A ", creator);
    }
    if let Some(year) = c.year {
        push_tagged(&mut output, "%D ", &year.to_string());
    }
    if let Some(container) = &c.container {
        push_tagged(&mut output, "%J ", container);
    }
    if let Some(publisher) = &c.publisher {
        push_tagged(&mut output, "%I ", publisher);
    }
    if let Some(page) = &c.page {
        push_tagged(&mut output, "%P ", page);
    }
    if let Some(link) = c.link() {
        push_tagged(&mut output, "%U ", &link);
    }
    if let Some(id) = &c.record_id {
        push_tagged(&mut output, "%M ", id);
    }
    output
}

const CSV_HEADER: &str = "record_id,kind,title,creators,date,container,publisher,page,url";

fn csv_row(c: &Citation) -> String {
    let kind = match c.kind {
        CitationKind::Work => "work",
        CitationKind::Article => "article",
        CitationKind::Person => "person",
        CitationKind::List => "list",
    };
    [
        c.record_id.clone().unwrap_or_default(),
        kind.to_string(),
        c.title.clone(),
        c.creators.join("; "),
        c.date.clone().unwrap_or_default(),
        c.container.clone().unwrap_or_default(),
        c.publisher.clone().unwrap_or_default(),
        c.page.clone().unwrap_or_default(),
        c.link().unwrap_or_default(),
    ]
    .iter()
    .map(|field| csv_escape(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Escape a string for BibTeX output.
pub(crate) fn escape_bibtex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '{' | '}' | '&' | '%' | '$' | '#' | '_' => {
                out.push('\\');
                out.push(ch);
            }
            '\r' | '\n' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a CSV field. Leading formula characters are neutralised for spreadsheets.
pub(crate) fn csv_escape(s: &str) -> String {
    let guarded = if s.starts_with(['=', '+', '-', '@']) { format!("'{s}") } else { s.to_string() };
    if guarded.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", guarded.replace('"', "\"\""))
    } else {
        guarded
    }
}
