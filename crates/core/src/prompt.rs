//! System prompt construction for DealerGPT.
//!
//! Renders a [`BusinessSnapshot`], a window of recent conversation and the
//! active insights into one system prompt. Output is deterministic for
//! identical inputs. Sizes are bounded by a [`PromptBudget`]: history is a
//! sliding window of the most recent turns that fit the history budget, and
//! the finished prompt is cut at the overall budget.

use serde::Serialize;

use crate::conversation::{HistoryTurn, InsightBrief};
use crate::format::{format_gbp, format_number, format_percent};
use crate::snapshot::{BusinessSnapshot, CountBy};

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

/// Default maximum number of history turns considered.
pub const DEFAULT_HISTORY_TURNS: usize = 10;
/// Default character budget for the rendered history section.
pub const DEFAULT_HISTORY_CHARS: usize = 6_000;
/// Default per-message cap inside the history section.
pub const DEFAULT_TURN_CHARS: usize = 800;
/// Default character budget for the whole system prompt.
pub const DEFAULT_PROMPT_CHARS: usize = 48_000;

/// How many makes, customers and team members are listed individually.
const TOP_N: usize = 8;

/// Marker appended when the prompt is cut at the overall budget.
const TRUNCATION_MARKER: &str = "\n[... context truncated ...]";

/// Size limits applied while building a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBudget {
    pub max_history_turns: usize,
    pub max_history_chars: usize,
    pub max_turn_chars: usize,
    pub max_prompt_chars: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            max_history_turns: DEFAULT_HISTORY_TURNS,
            max_history_chars: DEFAULT_HISTORY_CHARS,
            max_turn_chars: DEFAULT_TURN_CHARS,
            max_prompt_chars: DEFAULT_PROMPT_CHARS,
        }
    }
}

/// A finished system prompt and what went into it.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltPrompt {
    pub text: String,
    pub history_turns_included: usize,
    pub insights_included: usize,
    /// Whether the overall budget cut the prompt short.
    pub truncated: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Truncate to at most `max` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn render_counts(counts: &[CountBy]) -> String {
    if counts.is_empty() {
        return "none".to_string();
    }
    counts
        .iter()
        .map(|c| format!("{} {}", c.label, format_number(c.count)))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn render_preamble(out: &mut String, snapshot: &BusinessSnapshot) {
    push_line(
        out,
        "You are DealerGPT, the business intelligence assistant for a UK car dealership.",
    );
    push_line(
        out,
        "Answer using the dealership data below. Quote figures in pounds sterling (£) with \
         en-GB formatting. If the data does not cover a question, say so rather than guessing.",
    );
    match snapshot.generated_at {
        Some(at) => push_line(
            out,
            &format!("Data snapshot taken {}.", at.format("%d/%m/%Y %H:%M UTC")),
        ),
        None => push_line(
            out,
            "Live data is currently unavailable; all figures below are empty defaults.",
        ),
    }
    out.push('\n');
}

fn render_headline(out: &mut String, snapshot: &BusinessSnapshot) {
    let h = &snapshot.headline;
    push_line(out, "## Headline");
    push_line(
        out,
        &format!(
            "- This month: {} units sold, revenue {}, gross profit {}",
            format_number(h.month_units_sold),
            format_gbp(h.month_revenue),
            format_gbp(h.month_gross_profit)
        ),
    );
    push_line(
        out,
        &format!(
            "- Year to date: {} units sold, revenue {}",
            format_number(h.ytd_units_sold),
            format_gbp(h.ytd_revenue)
        ),
    );
    push_line(
        out,
        &format!(
            "- Invoiced this month: {} invoices worth {}",
            format_number(snapshot.invoices.month_count),
            format_gbp(snapshot.invoices.month_value)
        ),
    );
    out.push('\n');
}

fn render_inventory(out: &mut String, snapshot: &BusinessSnapshot) {
    let inv = &snapshot.inventory;
    push_line(out, "## Inventory");
    push_line(
        out,
        &format!(
            "- In stock: {} vehicles valued at {}",
            format_number(inv.stock_count),
            format_gbp(inv.stock_value)
        ),
    );
    push_line(
        out,
        &format!(
            "- In Autolab (preparation): {}; awaiting delivery: {}",
            format_number(inv.autolab_count),
            format_number(inv.awaiting_delivery_count)
        ),
    );
    push_line(
        out,
        &format!(
            "- Average stock age: {:.0} days; aged stock (over 90 days): {}",
            inv.average_stock_age_days,
            format_number(inv.aged_stock_count)
        ),
    );
    push_line(out, &format!("- By status: {}", render_counts(&inv.by_status)));
    if !inv.by_make.is_empty() {
        push_line(out, "- By make:");
        for make in inv.by_make.iter().take(TOP_N) {
            push_line(
                out,
                &format!(
                    "  - {}: {} in stock ({}), {} sold",
                    make.make,
                    format_number(make.stock_count),
                    format_gbp(make.stock_value),
                    format_number(make.sold_count)
                ),
            );
        }
    }
    out.push('\n');
}

fn render_sales(out: &mut String, snapshot: &BusinessSnapshot) {
    let s = &snapshot.sales;
    push_line(out, "## Sales performance");
    push_line(
        out,
        &format!(
            "- Sold: {} vehicles, revenue {}, gross profit {}",
            format_number(s.sold_count),
            format_gbp(s.total_revenue),
            format_gbp(s.gross_profit)
        ),
    );
    push_line(
        out,
        &format!(
            "- Average sale price {}, average gross profit per unit {}",
            format_gbp(s.average_sale_price),
            format_gbp(s.average_gross_profit)
        ),
    );
    push_line(
        out,
        &format!(
            "- Average days to sell: {:.1}; inventory turnover: {:.2}; gross ROI: {}",
            s.average_days_to_sell,
            s.inventory_turnover,
            format_percent(s.gross_roi)
        ),
    );
    push_line(
        out,
        &format!(
            "- Trend: {} ({} month on month)",
            s.trend.label(),
            format_percent(s.revenue_change_pct)
        ),
    );
    if !s.monthly.is_empty() {
        let months = s
            .monthly
            .iter()
            .map(|m| format!("{} {} ({} units)", m.period, format_gbp(m.revenue), m.units))
            .collect::<Vec<_>>()
            .join("; ");
        push_line(out, &format!("- Monthly revenue: {months}"));
    }
    out.push('\n');
}

fn render_leads(out: &mut String, snapshot: &BusinessSnapshot) {
    let l = &snapshot.leads;
    push_line(out, "## Leads");
    push_line(
        out,
        &format!(
            "- {} leads in total, {} active, pipeline value {}",
            format_number(l.total),
            format_number(l.active),
            format_gbp(l.pipeline_value)
        ),
    );
    push_line(out, &format!("- By stage: {}", render_counts(&l.by_stage)));
    push_line(
        out,
        &format!(
            "- Hot leads: {} ({} with no follow-up); follow-ups due today: {}; overdue: {}",
            format_number(l.hot_leads),
            format_number(l.hot_leads_without_follow_up),
            format_number(l.follow_ups_due_today),
            format_number(l.overdue_follow_ups)
        ),
    );
    push_line(
        out,
        &format!(
            "- Converted {}, lost {}, conversion rate {}",
            format_number(l.converted),
            format_number(l.lost),
            format_percent(l.conversion_rate)
        ),
    );
    out.push('\n');
}

fn render_customers(out: &mut String, snapshot: &BusinessSnapshot) {
    let c = &snapshot.customers;
    push_line(out, "## Customers");
    push_line(
        out,
        &format!(
            "- {} customers, {} new this month, {} repeat buyers",
            format_number(c.total),
            format_number(c.new_this_month),
            format_number(c.repeat_customers)
        ),
    );
    push_line(
        out,
        &format!(
            "- Lifetime value: total {}, average {}",
            format_gbp(c.total_lifetime_value),
            format_gbp(c.average_lifetime_value)
        ),
    );
    for top in c.top_customers.iter().take(TOP_N) {
        push_line(
            out,
            &format!(
                "  - {}: {} across {} purchase(s)",
                top.name,
                format_gbp(top.total_spend),
                top.purchases
            ),
        );
    }
    out.push('\n');
}

fn render_activity(out: &mut String, snapshot: &BusinessSnapshot) {
    let i = &snapshot.interactions;
    let a = &snapshot.appointments;
    push_line(out, "## Activity");
    push_line(
        out,
        &format!(
            "- Interactions (last 30 days): {} ({} inbound, {} outbound), {} needing follow-up",
            format_number(i.recent_count),
            format_number(i.inbound),
            format_number(i.outbound),
            format_number(i.follow_ups_required)
        ),
    );
    push_line(out, &format!("- Interaction types: {}", render_counts(&i.by_type)));
    push_line(
        out,
        &format!(
            "- Appointments: {} today, {} in the next 7 days ({})",
            format_number(a.today),
            format_number(a.upcoming),
            render_counts(&a.by_type)
        ),
    );
    out.push('\n');
}

fn render_team(out: &mut String, snapshot: &BusinessSnapshot) {
    if snapshot.team.is_empty() {
        return;
    }
    push_line(out, "## Sales team");
    for member in snapshot.team.iter().take(TOP_N) {
        push_line(
            out,
            &format!(
                "- {}: {} units, revenue {}, gross profit {}, {} leads ({} conversion)",
                member.name,
                format_number(member.units_sold),
                format_gbp(member.revenue),
                format_gbp(member.gross_profit),
                format_number(member.leads_assigned),
                format_percent(member.conversion_rate)
            ),
        );
    }
    out.push('\n');
}

fn render_insights(out: &mut String, insights: &[InsightBrief]) -> usize {
    if insights.is_empty() {
        return 0;
    }
    push_line(out, "## Active insights");
    for insight in insights {
        push_line(
            out,
            &format!(
                "- [{}] {}: {}",
                insight.priority.as_str(),
                insight.title,
                insight.description
            ),
        );
    }
    out.push('\n');
    insights.len()
}

/// Select the newest turns that fit the budget and render them oldest first.
fn render_history(out: &mut String, history: &[HistoryTurn], budget: &PromptBudget) -> usize {
    let mut rendered: Vec<String> = Vec::new();
    let mut used = 0usize;

    for turn in history.iter().rev().take(budget.max_history_turns) {
        let entry = format!(
            "User: {}\nDealerGPT: {}\n",
            truncate_chars(&turn.message, budget.max_turn_chars),
            truncate_chars(&turn.response, budget.max_turn_chars)
        );
        let len = entry.chars().count();
        if used + len > budget.max_history_chars {
            break;
        }
        used += len;
        rendered.push(entry);
    }

    if rendered.is_empty() {
        return 0;
    }
    push_line(out, "## Recent conversation");
    for entry in rendered.iter().rev() {
        out.push_str(entry);
    }
    out.push('\n');
    rendered.len()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Build the system prompt.
///
/// `history` must be in chronological order (oldest first).
pub fn build_system_prompt(
    snapshot: &BusinessSnapshot,
    history: &[HistoryTurn],
    insights: &[InsightBrief],
    budget: &PromptBudget,
) -> BuiltPrompt {
    let mut text = String::with_capacity(8 * 1024);

    render_preamble(&mut text, snapshot);
    render_headline(&mut text, snapshot);
    render_inventory(&mut text, snapshot);
    render_sales(&mut text, snapshot);
    render_leads(&mut text, snapshot);
    render_customers(&mut text, snapshot);
    render_activity(&mut text, snapshot);
    render_team(&mut text, snapshot);
    let insights_included = render_insights(&mut text, insights);
    let history_turns_included = render_history(&mut text, history, budget);

    push_line(
        &mut text,
        "Keep answers concise and actionable. Use bullet points for lists and highlight \
         anything that needs attention today.",
    );

    let truncated = text.chars().count() > budget.max_prompt_chars;
    if truncated {
        let keep = budget
            .max_prompt_chars
            .saturating_sub(TRUNCATION_MARKER.chars().count());
        text = text.chars().take(keep).collect();
        text.push_str(TRUNCATION_MARKER);
    }

    BuiltPrompt {
        text,
        history_turns_included,
        insights_included,
        truncated,
    }
}
