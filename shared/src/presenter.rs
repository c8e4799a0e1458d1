use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EXECUTIVE_SUMMARY_HEADING: Regex =
        Regex::new(r"(?im)^#+\s*Executive Summary\s*").unwrap();
    static ref EXECUTIVE_SUMMARY_LEAD: Regex =
        Regex::new(r"(?i)\AExecutive Summary\s*:?\s*").unwrap();
    static ref DETAILED_FINDINGS_HEADING: Regex =
        Regex::new(r"(?im)^#+\s*Detailed Findings\s*").unwrap();
}

/// Strips the model's habitual "Executive Summary" / "Detailed Findings"
/// headings so the client's own framing is not duplicated. Everything else,
/// Markdown included, passes through verbatim.
pub fn clean(raw: &str) -> String {
    let text = EXECUTIVE_SUMMARY_HEADING.replace_all(raw, "");
    let text = EXECUTIVE_SUMMARY_LEAD.replace(&text, "");
    let text = DETAILED_FINDINGS_HEADING.replace_all(&text, "");
    text.trim().to_string()
}
