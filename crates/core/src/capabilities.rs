//! Static description of what DealerGPT can do, served to the front end.

use serde::Serialize;

use crate::context::MAX_SUGGESTIONS;
use crate::conversation::MAX_MESSAGE_LENGTH;

/// Business areas the assistant reads from.
pub const DATA_SOURCES: [&str; 10] = [
    "vehicles",
    "leads",
    "customers",
    "interactions",
    "invoices",
    "appointments",
    "users",
    "conversations",
    "memory",
    "insights",
];

const FEATURES: [&str; 7] = [
    "conversational business intelligence",
    "startup briefing with headline KPIs",
    "inventory, sales, lead and customer analysis",
    "sales trend classification",
    "proactive business insights",
    "conversation memory",
    "contextual follow-up suggestions",
];

#[derive(Debug, Clone, Serialize)]
pub struct CapabilityLimits {
    pub max_message_length: usize,
    pub max_history_turns: usize,
    pub max_suggestions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub name: &'static str,
    pub version: String,
    pub model: String,
    pub model_configured: bool,
    pub features: Vec<&'static str>,
    pub data_sources: Vec<&'static str>,
    pub locale: &'static str,
    pub currency: &'static str,
    pub limits: CapabilityLimits,
}

/// Build the capability document for the running configuration.
pub fn capabilities(
    version: &str,
    model: &str,
    model_configured: bool,
    max_history_turns: usize,
) -> Capabilities {
    Capabilities {
        name: "DealerGPT",
        version: version.to_string(),
        model: model.to_string(),
        model_configured,
        features: FEATURES.to_vec(),
        data_sources: DATA_SOURCES.to_vec(),
        locale: "en-GB",
        currency: "GBP",
        limits: CapabilityLimits {
            max_message_length: MAX_MESSAGE_LENGTH,
            max_history_turns,
            max_suggestions: MAX_SUGGESTIONS,
        },
    }
}
