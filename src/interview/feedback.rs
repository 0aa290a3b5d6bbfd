use super::{FeedbackCategory, FeedbackReport};

pub const FEEDBACK_HEADER: &str = "--- Final Feedback ---";
const SUGGESTION_BULLET: &str = "    - ";
const NO_SUGGESTIONS: &str = "    (no suggestions)";

/// Render a report as the fixed multi-line block shown at the end of a session.
pub fn format_feedback(report: &FeedbackReport) -> String {
    let mut out = String::from(FEEDBACK_HEADER);
    out.push('\n');

    for (name, category) in [
        ("Communication", &report.communication),
        ("Technical", &report.technical),
        ("Problem Solving", &report.problem_solving),
    ] {
        out.push('\n');
        push_category(&mut out, name, category);
    }

    out.push_str("\nOverall Summary:\n");
    out.push_str(report.summary.trim());
    out
}

fn push_category(out: &mut String, name: &str, category: &FeedbackCategory) {
    out.push_str(&format!("{}:\n", name));
    out.push_str(&format!("  Score: {}\n", format_score(category.score)));
    out.push_str(&format!("  Reason: {}\n", category.reason.trim()));
    out.push_str("  Suggestions:\n");

    let suggestions: Vec<&str> = category
        .suggestions
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if suggestions.is_empty() {
        out.push_str(NO_SUGGESTIONS);
        out.push('\n');
        return;
    }

    for suggestion in suggestions {
        out.push_str(SUGGESTION_BULLET);
        out.push_str(suggestion);
        out.push('\n');
    }
}

// Whole scores print without a trailing ".0"
fn format_score(score: f64) -> String {
    if score.is_finite() && score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}
