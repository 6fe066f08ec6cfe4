use std::sync::LazyLock;

use regex::Regex;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:svg|xml|html)?").expect("code fence regex is valid")
});

static SVG_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<svg\b.*?</svg>").expect("svg span regex is valid"));

static XML_PROLOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*<\?xml.*?\?>").expect("xml prolog regex is valid"));

/// Pulls the first `<svg>...</svg>` span out of free-form model output.
///
/// Markdown code fences (bare or tagged `svg`/`xml`/`html`) are removed
/// first, then the span is matched case-insensitively and non-greedily
/// across newlines. A leading XML declaration is stripped from the match.
/// Returns an empty string when no span is present; callers decide whether
/// that is an error.
///
/// This is pure text processing. The returned fragment is not validated or
/// sanitized; rendering it into a document context trusts the upstream
/// model. That boundary is deliberate and owned by the caller.
pub fn extract_svg(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let cleaned = CODE_FENCE.replace_all(raw, "");
    let Some(span) = SVG_SPAN.find(&cleaned) else {
        return String::new();
    };

    XML_PROLOG.replace(span.as_str(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_span() {
        let raw = r#"<svg viewBox="0 0 10 10"><circle r="5"/></svg>"#;
        assert_eq!(extract_svg(raw), raw);
    }

    #[test]
    fn strips_fences_and_surrounding_prose() {
        let raw = "Here you go:\n```xml\n<svg viewBox=\"0 0 10 10\"><circle r=\"5\"/></svg>\n```\nEnjoy!";
        assert_eq!(
            extract_svg(raw),
            r#"<svg viewBox="0 0 10 10"><circle r="5"/></svg>"#
        );
    }

    #[test]
    fn strips_svg_tagged_fence() {
        let raw = "```svg\n<svg width=\"4\" height=\"4\"></svg>\n```";
        assert_eq!(extract_svg(raw), "<svg width=\"4\" height=\"4\"></svg>");
    }

    #[test]
    fn takes_first_span_only() {
        let raw = "<svg id=\"a\"></svg> and then <svg id=\"b\"></svg>";
        assert_eq!(extract_svg(raw), "<svg id=\"a\"></svg>");
    }

    #[test]
    fn matches_case_insensitively_across_newlines() {
        let raw = "<SVG viewBox=\"0 0 1 1\">\n<rect/>\n</SVG>";
        assert_eq!(extract_svg(raw), raw);
    }

    #[test]
    fn drops_xml_prolog() {
        let raw = "```xml\n<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg viewBox=\"0 0 2 2\"><rect/></svg>\n```";
        assert_eq!(extract_svg(raw), "<svg viewBox=\"0 0 2 2\"><rect/></svg>");
    }

    #[test]
    fn no_markup_yields_empty() {
        assert_eq!(extract_svg("no markup here"), "");
        assert_eq!(extract_svg(""), "");
        assert_eq!(extract_svg("   \n\t"), "");
    }

    #[test]
    fn is_idempotent_on_its_own_output() {
        let raw = "prose ```xml\n<svg viewBox=\"0 0 8 8\"><path d=\"M0 0\"/></svg>``` more";
        let once = extract_svg(raw);
        assert_eq!(extract_svg(&once), once);
    }

    #[test]
    fn minimal_circle_scenario() {
        let raw = "```xml\n<svg viewBox=\"0 0 10 10\"><circle r=\"5\"/></svg>\n```";
        assert_eq!(
            extract_svg(raw),
            r#"<svg viewBox="0 0 10 10"><circle r="5"/></svg>"#
        );
    }
}
