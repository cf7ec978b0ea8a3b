//! # Diagnostic Report
//!
//! Plain-text rendering of a [`DiagnosticResult`], suitable for download.
//!
//! Sections, in order: header, all capacity ratings (ascending), primary
//! bottlenecks with lever breakdowns, recommendation, next steps, footer.
//! Rendering is pure: the caller supplies the date string and booking URL.

use crate::catalog::Catalog;
use crate::engine::{CapacityScore, DiagnosticResult};
use crate::primitives::{RATING_MAX, WEAK_RATING_THRESHOLD};
use crate::types::{Lever, Ratings, Recommendation};

/// Width of every bar, in cells.
const BAR_CELLS: usize = 10;

/// Wrap width for prose paragraphs.
const WRAP_COLUMNS: usize = 72;

const BRAND_LINE: &str = "WHETSTONE  |  THE EXECUTION SYSTEM";
const TITLE: &str = "Executive Function Diagnostic";
const FOOTER_LINES: [&str; 2] = [
    "Whetstone Advisory LLC  ·  The Execution System  ·  whetstoneadmissions.com",
    "Confidential - prepared for individual use only",
];

const NEXT_STEPS: [&str; 3] = [
    "Schedule a free 30-minute diagnostic call",
    "We'll confirm your bottlenecks and assess fit",
    "If it's a match, we onboard you within 48 hours",
];

const FULL_SYSTEM_TEXT: &str = "Based on your results, you have accountability gaps across \
multiple capacities. The Full Execution System (Tier 2) is designed for exactly this pattern: \
weekly coaching, a dedicated Executive Assistant for daily planning calls, and formalized \
failure-mode diagnostics.";

const COACH_ONLY_TEXT: &str = "Your pattern suggests you may benefit from Coached Execution \
(Tier 1), which focuses on the accountability lever through weekly coaching without daily EA \
support.";

/// Everything the renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    /// Respondent name; `None` or blank renders a generic subtitle.
    pub name: Option<&'a str>,
    /// Pre-formatted date, e.g. "October 17, 2026".
    pub date: &'a str,
    pub ratings: &'a Ratings,
    pub result: &'a DiagnosticResult,
    pub catalog: &'a Catalog,
    /// Consultation booking link printed under the next steps.
    pub booking_url: &'a str,
}

/// Prose describing a recommendation, as printed in the report.
#[must_use]
pub fn recommendation_text(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::FullSystem => FULL_SYSTEM_TEXT,
        Recommendation::CoachOnly => COACH_ONLY_TEXT,
    }
}

/// Render the full report.
#[must_use]
pub fn render_report(input: &ReportInput<'_>) -> String {
    let mut out = String::new();

    render_header(&mut out, input);
    render_all_ratings(&mut out, input);
    render_bottlenecks(&mut out, input.result);
    render_recommendation(&mut out, input.result.recommendation);
    render_next_steps(&mut out, input.booking_url);

    out.push('\n');
    for line in FOOTER_LINES {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Download filename for a report.
///
/// Whitespace runs in the name become `-`; characters other than ASCII
/// alphanumerics, `-`, `_` and `.` are dropped.
#[must_use]
pub fn report_filename(name: Option<&str>) -> String {
    let slug = name
        .unwrap_or_default()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "Execution-Diagnostic-Report.txt".to_string()
    } else {
        format!("Execution-Diagnostic-{}.txt", slug)
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

fn render_header(out: &mut String, input: &ReportInput<'_>) {
    let subtitle = match input.name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Prepared for {}", name),
        None => "Your Personalized Report".to_string(),
    };

    out.push_str(BRAND_LINE);
    out.push('\n');
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(&format!("{}  ·  {}\n", subtitle, input.date));
    out.push_str(&"=".repeat(WRAP_COLUMNS));
    out.push_str("\n\n");
}

fn render_all_ratings(out: &mut String, input: &ReportInput<'_>) {
    section_title(out, "All Capacity Ratings");

    // Unrated capacities sort as 0, ahead of every rated one.
    let mut rows: Vec<(&str, u8)> = input
        .catalog
        .capacities()
        .map(|c| {
            let value = input.ratings.get(c.id.as_str()).map_or(0, |r| r.value());
            (c.name.as_str(), value)
        })
        .collect();
    rows.sort_by_key(|(_, value)| *value);

    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in rows {
        let flag = if value > 0 && value <= WEAK_RATING_THRESHOLD {
            '!'
        } else {
            ' '
        };
        let score = if value == 0 {
            "unrated".to_string()
        } else {
            format!("{}/{} {}", value, RATING_MAX, band(value))
        };
        out.push_str(&format!(
            "{} {:<width$}  {}  {}\n",
            flag,
            name,
            bar(usize::from(value), usize::from(RATING_MAX)),
            score,
            width = width
        ));
    }
    out.push('\n');
}

fn render_bottlenecks(out: &mut String, result: &DiagnosticResult) {
    section_title(out, "Primary Bottlenecks");
    out.push_str(&format!(
        "Your {} weakest capacities and which support lever is most lacking.\n\n",
        result.weakest.len()
    ));

    for (i, score) in result.weakest.iter().enumerate() {
        render_score(out, i + 1, score);
    }
}

fn render_score(out: &mut String, position: usize, score: &CapacityScore) {
    out.push_str(&format!("{}. {}\n", position, score.capacity.name));
    out.push_str(&format!(
        "   Rating: {}/{}    Missing lever: {}\n",
        score.rating,
        RATING_MAX,
        score.missing_lever.label()
    ));

    let width = Lever::ALL.iter().map(|l| l.label().len()).max().unwrap_or(0);
    for lever in Lever::ALL {
        let marker = if lever == score.missing_lever { '*' } else { ' ' };
        let done = score.implemented_for(lever);
        let total = score.total_for(lever);
        out.push_str(&format!(
            "   {} {:<width$}  {}/{}  {}\n",
            marker,
            lever.label(),
            done,
            total,
            bar(done, total),
            width = width
        ));
    }
    out.push('\n');
}

fn render_recommendation(out: &mut String, recommendation: Recommendation) {
    section_title(out, "Our Recommendation");
    out.push_str(recommendation.tier_name());
    out.push('\n');
    for line in wrap(recommendation_text(recommendation), WRAP_COLUMNS) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

fn render_next_steps(out: &mut String, booking_url: &str) {
    section_title(out, "Next Steps");
    for (i, step) in NEXT_STEPS.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, step));
    }
    out.push('\n');
    out.push_str(&format!("Book your call: {}\n", booking_url));
}

// =============================================================================
// HELPERS
// =============================================================================

fn section_title(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.chars().count()));
    out.push('\n');
}

/// `[####------]` with `filled / of` of the cells filled, rounded down.
fn bar(filled: usize, of: usize) -> String {
    let cells = if of == 0 {
        0
    } else {
        (filled.min(of) * BAR_CELLS) / of
    };
    format!("[{}{}]", "#".repeat(cells), "-".repeat(BAR_CELLS - cells))
}

fn band(value: u8) -> &'static str {
    match value {
        0..=3 => "(low)",
        4..=6 => "(moderate)",
        _ => "(strong)",
    }
}

fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// =============================================================================
// TESTS
// =============================================================================
