//! Keyword-based context tagging and follow-up suggestions.
//!
//! Tags are a best-effort annotation of what the user asked about. They are
//! derived from the message text alone and say nothing about which data the
//! model actually used.

use std::sync::LazyLock;

use regex::Regex;

/// Message returned when the model cannot be reached.
pub const FALLBACK_MESSAGE: &str = "I'm having trouble accessing the dealership data right now. \
Please try again in a moment, or ask me something else in the meantime.";

/// Suggestions returned alongside [`FALLBACK_MESSAGE`].
pub const FALLBACK_SUGGESTIONS: [&str; 4] = [
    "Show me current inventory status",
    "What are today's priorities?",
    "How are sales performing this month?",
    "Which leads need follow-up?",
];

/// Suggestions offered when the message matched no context tag.
pub const DEFAULT_SUGGESTIONS: [&str; 4] = [
    "Give me a summary of the business today",
    "Which vehicles have been in stock the longest?",
    "How is the sales team performing?",
    "What should I focus on this week?",
];

/// Maximum number of suggestions returned with an answer.
pub const MAX_SUGGESTIONS: usize = 4;

/// Context tag, trigger keywords, suggestion offered when the tag matches.
const CONTEXT_RULES: &[(&str, &[&str], &str)] = &[
    (
        "inventory_data",
        &["inventory", "stock", "vehicles?", "cars?", "makes?", "models?", "forecourt"],
        "Which vehicles have been in stock over 90 days?",
    ),
    (
        "sales_data",
        &["sales?", "sold", "selling", "revenue", "invoices?"],
        "How do this month's sales compare with last month?",
    ),
    (
        "lead_data",
        &["leads?", "pipeline", "prospects?", "enquiry", "enquiries", "funnel"],
        "Which hot leads need a follow-up today?",
    ),
    (
        "customer_data",
        &["customers?", "clients?", "buyers?", "lifetime value"],
        "Who are our most valuable customers?",
    ),
    (
        "financial_data",
        &["profit", "margins?", "roi", "finance", "financial", "costs?", "prices?"],
        "What is our gross profit per vehicle this month?",
    ),
    (
        "interaction_data",
        &["calls?", "emails?", "interactions?", "contacts?", "follow[- ]?ups?"],
        "How many follow-ups are overdue?",
    ),
    (
        "appointment_data",
        &["appointments?", "bookings?", "test drives?", "diary"],
        "What appointments are booked for this week?",
    ),
    (
        "performance_data",
        &["performance", "team", "salespe(?:rson|ople)", "staff", "targets?", "kpis?"],
        "Who is the top performing salesperson this month?",
    ),
    (
        "trend_data",
        &["trends?", "growth", "forecast", "monthly", "compare", "comparison"],
        "What is the revenue trend over the last six months?",
    ),
];

/// Compiled `(tag, pattern, suggestion)` rules. Compiled once, reused forever.
static CONTEXT_PATTERNS: LazyLock<Vec<(&'static str, Regex, &'static str)>> = LazyLock::new(|| {
    CONTEXT_RULES
        .iter()
        .map(|(tag, keywords, suggestion)| {
            let pattern = format!(r"(?i)\b(?:{})\b", keywords.join("|"));
            (*tag, Regex::new(&pattern).expect("valid regex"), *suggestion)
        })
        .collect()
});

/// Tags whose keywords occur in `message`, in rule order.
pub fn detect_context(message: &str) -> Vec<String> {
    CONTEXT_PATTERNS
        .iter()
        .filter(|(_, re, _)| re.is_match(message))
        .map(|(tag, _, _)| (*tag).to_string())
        .collect()
}

/// Up to [`MAX_SUGGESTIONS`] follow-up prompts for the given tags, padded
/// from [`DEFAULT_SUGGESTIONS`].
pub fn suggestions_for(context: &[String]) -> Vec<String> {
    let mut out: Vec<String> = CONTEXT_PATTERNS
        .iter()
        .filter(|(tag, _, _)| context.iter().any(|c| c == tag))
        .map(|(_, _, suggestion)| (*suggestion).to_string())
        .take(MAX_SUGGESTIONS)
        .collect();

    for default in DEFAULT_SUGGESTIONS {
        if out.len() >= MAX_SUGGESTIONS {
            break;
        }
        if !out.iter().any(|s| s == default) {
            out.push(default.to_string());
        }
    }
    out
}

/// The canned suggestions that accompany a fallback answer.
pub fn fallback_suggestions() -> Vec<String> {
    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_keyword_tags_inventory() {
        assert_eq!(
            detect_context("What's in our inventory?"),
            vec!["inventory_data".to_string()]
        );
    }

    #[test]
    fn matching_is_case_insensitive_and_multi_tag() {
        let tags = detect_context("Show SALES and PROFIT for each Salesperson");
        assert_eq!(tags, vec!["sales_data", "financial_data", "performance_data"]);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "stockholm" must not trigger the inventory tag.
        assert!(detect_context("Flights to Stockholm").is_empty());
    }

    #[test]
    fn plural_and_hyphenated_forms_match() {
        assert_eq!(detect_context("any follow-ups?"), vec!["interaction_data"]);
        assert_eq!(detect_context("book test drives"), vec!["appointment_data"]);
    }

    #[test]
    fn suggestions_are_capped_and_padded() {
        let none = suggestions_for(&[]);
        assert_eq!(none.len(), MAX_SUGGESTIONS);
        assert_eq!(none[0], DEFAULT_SUGGESTIONS[0]);

        let one = suggestions_for(&["lead_data".to_string()]);
        assert_eq!(one.len(), MAX_SUGGESTIONS);
        assert_eq!(one[0], "Which hot leads need a follow-up today?");

        let all: Vec<String> = CONTEXT_RULES.iter().map(|(t, _, _)| t.to_string()).collect();
        assert_eq!(suggestions_for(&all).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn fallback_suggestions_are_the_canned_four() {
        assert_eq!(fallback_suggestions(), FALLBACK_SUGGESTIONS.to_vec());
    }
}
