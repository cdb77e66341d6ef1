use std::sync::OnceLock;

use regex::Regex;

/// Resume section headers. Compound headers come first so they win over their suffix.
fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(WORK EXPERIENCE|PROFESSIONAL EXPERIENCE|TECHNICAL SKILLS|PERSONAL PROJECTS|EDUCATION|EXPERIENCE|SKILLS|PROJECTS|CERTIFICATIONS|LANGUAGES|SUMMARY|OBJECTIVE)\b",
        )
        .expect("section header pattern is valid")
    })
}

/// Collapses whitespace runs to one space and starts a paragraph at each section header.
///
/// Applying it twice gives the same result as applying it once.
pub fn normalize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::with_capacity(collapsed.len() + 32);
    let mut last = 0;
    for header in header_regex().find_iter(&collapsed) {
        let start = header.start();
        if start == 0 {
            continue;
        }
        let before = &collapsed[last..start];
        out.push_str(before.strip_suffix(' ').unwrap_or(before));
        out.push_str("\n\n");
        last = start;
    }
    out.push_str(&collapsed[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_breaks_before_headers() {
        let raw = "Jane Doe\n  jane@example.com\tEducation\n\nBSc CS   Skills: Rust, Go";
        assert_eq!(
            normalize_text(raw),
            "Jane Doe jane@example.com\n\nEducation BSc CS\n\nSkills: Rust, Go"
        );
    }

    #[test]
    fn test_compound_header_gets_a_single_break() {
        let text = normalize_text("Profile WORK EXPERIENCE Acme Corp");
        assert_eq!(text, "Profile\n\nWORK EXPERIENCE Acme Corp");
    }

    #[test]
    fn test_no_break_at_start_or_inside_words() {
        assert_eq!(
            normalize_text("SUMMARY  Reskilled engineer"),
            "SUMMARY Reskilled engineer"
        );
    }

    #[test]
    fn test_idempotent() {
        let raw = "A  B\nTECHNICAL SKILLS  Rust\n\n\nPROJECTS x  EXPERIENCE y";
        let once = normalize_text(raw);
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize_text(" \n\t "), "");
    }
}
