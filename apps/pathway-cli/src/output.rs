use anyhow::Result;
use std::fmt::Write;

use pathway_core::types::OriginKind;
use pathway_hybrid::SearchResponse;

const SNIPPET_CHARS: usize = 160;

pub fn format_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn format_human(query: &str, response: &SearchResponse) -> String {
    let mut out = String::new();
    let origin = if response.from_cache { " (cached)" } else { "" };
    let _ = writeln!(out, "{} results for \"{}\"{}", response.results.len(), query, origin);
    for (i, r) in response.results.iter().enumerate() {
        let kind = match r.origin_kind { OriginKind::Vector => "vector", OriginKind::Text => "text" };
        let _ = writeln!(out, "\n  {}. [{:.3} {}] {}  ({})", i + 1, r.similarity, kind, r.title, r.id);
        if let Some(url) = &r.url { let _ = writeln!(out, "     {url}"); }
        let _ = writeln!(out, "     {}", snippet(&r.content));
    }
    out
}

fn snippet(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS { return flat; }
    let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_content_is_shortened_on_char_boundaries() {
        let s = snippet(&"é ".repeat(200));
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), SNIPPET_CHARS + 3);
    }

    #[test]
    fn empty_response_prints_header_only() {
        let r = SearchResponse { results: vec![], from_cache: true };
        assert_eq!(format_human("q", &r), "0 results for \"q\" (cached)\n");
    }
}
