//! Markdown output formatting.

use crate::citation::Pid;
use crate::models::{
    AnyRecord, Article, CategoryResult, Contributor, ContributorList, FacetGroup, People, Record,
    SearchResponse, Title, TitleList, UserList, Work,
};

const SNIPPET_CHARS: usize = 300;
const FACET_TERMS: usize = 10;

/// Format a search page (every category) as Markdown.
#[must_use]
pub fn format_search_markdown(response: &SearchResponse) -> String {
    if response.categories.is_empty() {
        return "No results found.".to_string();
    }

    let mut output = String::new();
    if let Some(query) = response.query.as_deref().filter(|q| !q.is_empty()) {
        output.push_str(&format!("# Search: {query}\n\n"));
    }
    for category in &response.categories {
        output.push_str(&format_category_markdown(category));
    }
    output
}

/// Format one category's page as Markdown.
#[must_use]
pub fn format_category_markdown(category: &CategoryResult) -> String {
    let name = category.name.as_deref().unwrap_or(&category.code);
    let mut output = format!(
        "## {name} ({} of {} results)\n\n",
        category.record_count(),
        category.total()
    );

    if category.record_count() == 0 {
        output.push_str("No records on this page.\n\n");
    }
    for (i, record) in category.records().enumerate() {
        output.push_str(&format_record_markdown(&record, i + 1));
        output.push_str("\n---\n\n");
    }

    if !category.facet_groups().is_empty() {
        output.push_str(&format_facets_markdown(category.facet_groups()));
    }

    if let Some(cursor) = category.next_cursor() {
        output.push_str(&format!("**Next page cursor** ({}): `{cursor}`\n\n", category.code));
    }
    output
}

/// Format a flat list of records (e.g. a harvest) as Markdown.
#[must_use]
pub fn format_records_markdown(title: &str, records: &[AnyRecord]) -> String {
    if records.is_empty() {
        return "No records found.".to_string();
    }

    let mut output = format!("# {title} ({} records)\n\n", records.len());
    for (i, record) in records.iter().enumerate() {
        output.push_str(&format_record_markdown(record, i + 1));
        output.push_str("\n---\n\n");
    }
    output
}

/// Format any record as Markdown.
#[must_use]
pub fn format_record_markdown(record: &AnyRecord, index: usize) -> String {
    match record {
        AnyRecord::Work(work) => format_work_markdown(work, index),
        AnyRecord::Article(article) => format_article_markdown(article, index),
        AnyRecord::People(people) => format_people_markdown(people, index),
        AnyRecord::List(list) => format_list_markdown(list, index),
    }
}

fn format_work_markdown(work: &Record<Work>, index: usize) -> String {
    let mut output = format!("### {index}. {}\n\n", work.title_or_default());

    if !work.contributor.is_empty() {
        output.push_str(&format!("**By**: {}\n\n", work.contributor.join("; ")));
    }

    let mut meta = Vec::new();
    if let Some(issued) = &work.issued {
        meta.push(format!("**Issued**: {issued}"));
    }
    if !work.types.is_empty() {
        meta.push(format!("**Format**: {}", work.types.join(", ")));
    }
    if let Some(holdings) = work.holdings_count {
        meta.push(format!("**Holdings**: {holdings}"));
    }
    if let Some(versions) = work.version_count.filter(|v| *v > 1) {
        meta.push(format!("**Versions**: {versions}"));
    }
    if !meta.is_empty() {
        output.push_str(&format!("{}\n\n", meta.join(" | ")));
    }

    if !work.subject.is_empty() {
        output.push_str(&format!("**Subjects**: {}\n\n", work.subject.join(", ")));
    }

    output.push_str(&links_line(work.id.as_deref(), work.trove_url.as_deref(), work.link("fulltext")));

    if let Some(text) = work.abstracts.first().or(work.snippet.as_ref()) {
        output.push_str(&format!("**Abstract**: {}\n", truncate(&highlight(text), SNIPPET_CHARS)));
    }
    output
}

fn format_article_markdown(article: &Record<Article>, index: usize) -> String {
    let mut output = format!("### {index}. {}\n\n", article.heading_or_default());

    let mut meta = Vec::new();
    if let Some(paper) = article.newspaper() {
        meta.push(format!("**Newspaper**: {paper}"));
    }
    if let Some(date) = &article.date {
        meta.push(format!("**Date**: {date}"));
    }
    if let Some(page) = &article.page {
        meta.push(format!("**Page**: {page}"));
    }
    if let Some(category) = &article.category {
        meta.push(format!("**Category**: {category}"));
    }
    if !meta.is_empty() {
        output.push_str(&format!("{}\n\n", meta.join(" | ")));
    }

    if let Some(words) = article.word_count {
        let illustrated = if article.illustrated == Some(true) { ", illustrated" } else { "" };
        output.push_str(&format!("**Words**: {words}{illustrated}\n\n"));
    }

    output.push_str(&links_line(article.id.as_deref(), article.trove_url.as_deref(), None));

    if let Some(text) = article.snippet.as_ref().or(article.article_text.as_ref()) {
        output.push_str(&format!("> {}\n", truncate(&highlight(text), SNIPPET_CHARS)));
    }
    output
}

fn format_people_markdown(people: &Record<People>, index: usize) -> String {
    let mut output = format!("### {index}. {}\n\n", people.name());

    if !people.types.is_empty() {
        output.push_str(&format!("**Type**: {}\n\n", people.types.join(", ")));
    }
    if !people.occupation.is_empty() {
        output.push_str(&format!("**Occupation**: {}\n\n", people.occupation.join(", ")));
    }
    if !people.alternate_name.is_empty() {
        output.push_str(&format!("**Also known as**: {}\n\n", people.alternate_name.join("; ")));
    }
    output.push_str(&links_line(people.id.as_deref(), people.trove_url.as_deref(), None));
    if let Some(bio) = people.biography.first() {
        output.push_str(&format!("**Biography**: {}\n", truncate(&highlight(bio), SNIPPET_CHARS)));
    }
    output
}

fn format_list_markdown(list: &Record<UserList>, index: usize) -> String {
    let mut output = format!(
        "### {index}. {}\n\n",
        list.title.as_deref().unwrap_or("Untitled list")
    );

    let mut meta = Vec::new();
    if let Some(creator) = &list.creator {
        meta.push(format!("**Creator**: {creator}"));
    }
    if let Some(count) = list.list_item_count {
        meta.push(format!("**Items**: {count}"));
    }
    if !meta.is_empty() {
        output.push_str(&format!("{}\n\n", meta.join(" | ")));
    }
    output.push_str(&links_line(list.id.as_deref(), list.trove_url.as_deref(), None));
    if let Some(description) = &list.description {
        output.push_str(&format!("{}\n", truncate(&highlight(description), SNIPPET_CHARS)));
    }
    output
}

fn links_line(id: Option<&str>, trove_url: Option<&str>, fulltext: Option<&str>) -> String {
    let mut links = Vec::new();
    if let Some(id) = id {
        links.push(format!("**ID**: {id}"));
    }
    if let Some(url) = trove_url {
        links.push(format!("[Trove]({url})"));
        if let Some(pid) = Pid::parse(url) {
            links.push(format!("[Persistent link]({})", pid.persistent_url()));
        }
    }
    if let Some(fulltext) = fulltext {
        links.push(format!("[Online]({fulltext})"));
    }
    if links.is_empty() { String::new() } else { format!("{}\n\n", links.join(" | ")) }
}

/// Format facet groups as Markdown tables of the top terms.
#[must_use]
pub fn format_facets_markdown(facets: &[FacetGroup]) -> String {
    let mut output = String::from("#### Facets\n\n");
    for group in facets {
        let label = group.display_name.as_deref().unwrap_or(&group.name);
        output.push_str(&format!("**{label}** (`{}`)\n\n", group.name));
        output.push_str("| Term | Count |\n|------|-------|\n");
        for term in group.terms.iter().take(FACET_TERMS) {
            let count = term.count.map_or_else(String::new, |c| c.to_string());
            output.push_str(&format!("| {} | {count} |\n", term.label()));
        }
        if group.terms.len() > FACET_TERMS {
            output.push_str(&format!("| ... {} more | |\n", group.terms.len() - FACET_TERMS));
        }
        output.push('\n');
    }
    output
}

/// Format a title list as Markdown.
#[must_use]
pub fn format_titles_markdown(list: &TitleList) -> String {
    if list.titles.is_empty() {
        return "No titles found.".to_string();
    }

    let total = list.total.unwrap_or(list.titles.len() as u64);
    let mut output = format!("# Titles ({} of {total})\n\n", list.titles.len());
    output.push_str("| ID | Title | State | Issued |\n|----|-------|-------|--------|\n");
    for title in &list.titles {
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            title.id.as_deref().unwrap_or(""),
            title.title_or_default(),
            title.state.as_deref().unwrap_or(""),
            date_span(title),
        ));
    }
    output
}

/// Format one title as Markdown.
#[must_use]
pub fn format_title_markdown(title: &Title) -> String {
    let mut output = format!("# {}\n\n", title.title_or_default());

    let mut meta = Vec::new();
    if let Some(id) = &title.id {
        meta.push(format!("**ID**: {id}"));
    }
    if let Some(state) = &title.state {
        meta.push(format!("**State**: {state}"));
    }
    if let Some(issn) = &title.issn {
        meta.push(format!("**ISSN**: {issn}"));
    }
    let span = date_span(title);
    if !span.is_empty() {
        meta.push(format!("**Issued**: {span}"));
    }
    if !meta.is_empty() {
        output.push_str(&format!("{}\n\n", meta.join(" | ")));
    }
    if !title.place.is_empty() {
        output.push_str(&format!("**Places**: {}\n\n", title.place.join(", ")));
    }
    if let Some(url) = &title.trove_url {
        output.push_str(&format!("[Trove]({url})\n\n"));
    }

    if !title.year.is_empty() {
        output.push_str("| Year | Issues |\n|------|--------|\n");
        for year in &title.year {
            output.push_str(&format!(
                "| {} | {} |\n",
                year.date.as_deref().unwrap_or(""),
                year.issuecount.map_or_else(String::new, |c| c.to_string())
            ));
        }
    }
    output
}

fn date_span(title: &Title) -> String {
    match (title.start_date.as_deref(), title.end_date.as_deref()) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        (Some(start), None) => format!("from {start}"),
        (None, Some(end)) => format!("until {end}"),
        (None, None) => String::new(),
    }
}

/// Format a contributor list as Markdown.
#[must_use]
pub fn format_contributors_markdown(list: &ContributorList) -> String {
    if list.contributor.is_empty() {
        return "No contributors found.".to_string();
    }

    let mut output = format!("# Contributors ({})\n\n", list.contributor.len());
    output.push_str("| NUC | Name | Holdings |\n|-----|------|----------|\n");
    for contributor in &list.contributor {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            contributor.id.as_deref().unwrap_or(""),
            contributor.display_name(),
            contributor.totalholdings.map_or_else(String::new, |h| h.to_string())
        ));
    }
    output
}

/// Format one contributor as Markdown.
#[must_use]
pub fn format_contributor_markdown(contributor: &Contributor) -> String {
    let mut output = format!("# {}\n\n", contributor.display_name());
    if let Some(id) = &contributor.id {
        output.push_str(&format!("**NUC**: {id}\n\n"));
    }
    if let Some(short) = &contributor.shortname {
        output.push_str(&format!("**Short name**: {short}\n\n"));
    }
    if let Some(holdings) = contributor.totalholdings {
        output.push_str(&format!("**Holdings**: {holdings}\n\n"));
    }
    output
}

/// Turn the API's `<strong>` match highlighting into Markdown bold and drop other tags.
fn highlight(text: &str) -> String {
    let text = text.replace("<strong>", "**").replace("</strong>", "**");
    let mut output = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => output.push(ch),
            _ => {}
        }
    }
    output.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to `max` characters on a char boundary.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
