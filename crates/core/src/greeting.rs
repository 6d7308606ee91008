//! The startup briefing shown when a user opens DealerGPT.

use crate::conversation::InsightBrief;
use crate::format::{format_gbp, format_number};
use crate::snapshot::BusinessSnapshot;

/// How many insight titles the briefing lists.
const GREETING_INSIGHTS: usize = 3;

fn salutation(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Render the briefing for a local `hour` of the day (0-23).
///
/// A snapshot that is not live produces a short apology instead of figures.
pub fn render_greeting(
    snapshot: &BusinessSnapshot,
    insights: &[InsightBrief],
    hour: u32,
) -> String {
    let mut out = format!("{}! I'm DealerGPT, your dealership assistant.", salutation(hour));

    if !snapshot.is_live() {
        out.push_str(
            " I can't reach the latest business figures right now, but you can still ask me \
             questions and I'll answer with what I have.",
        );
        return out;
    }

    let h = &snapshot.headline;
    let inv = &snapshot.inventory;
    let leads = &snapshot.leads;

    out.push_str(" Here's where things stand today:\n");
    out.push_str(&format!(
        "\n- {} vehicles sold this month for {} revenue ({} gross profit)",
        format_number(h.month_units_sold),
        format_gbp(h.month_revenue),
        format_gbp(h.month_gross_profit)
    ));
    out.push_str(&format!(
        "\n- {} vehicles in stock worth {}",
        format_number(inv.stock_count),
        format_gbp(inv.stock_value)
    ));
    out.push_str(&format!(
        "\n- {} active leads, {} of them hot",
        format_number(leads.active),
        format_number(leads.hot_leads)
    ));
    if leads.follow_ups_due_today > 0 || leads.overdue_follow_ups > 0 {
        out.push_str(&format!(
            "\n- {} follow-ups due today, {} overdue",
            format_number(leads.follow_ups_due_today),
            format_number(leads.overdue_follow_ups)
        ));
    }
    if snapshot.appointments.today > 0 {
        out.push_str(&format!(
            "\n- {} appointments booked for today",
            format_number(snapshot.appointments.today)
        ));
    }

    if !insights.is_empty() {
        out.push_str("\n\nNeeds your attention:");
        for insight in insights.iter().take(GREETING_INSIGHTS) {
            out.push_str(&format!("\n- {}", insight.title));
        }
    }

    out.push_str("\n\nWhat would you like to look into?");
    out
}
