//! Dealership vocabulary shared by the schema, the aggregator and the prompt.
//!
//! Each enum is stored as TEXT in PostgreSQL. The `as_str` values must match
//! the CHECK constraints in `db/migrations`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Vehicle status
// ---------------------------------------------------------------------------

/// Where a vehicle currently sits in the stock lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Stock,
    Sold,
    Autolab,
    AwaitingDelivery,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        Self::Stock,
        Self::Sold,
        Self::Autolab,
        Self::AwaitingDelivery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Sold => "sold",
            Self::Autolab => "autolab",
            Self::AwaitingDelivery => "awaiting_delivery",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown vehicle status '{value}'")))
    }
}

// ---------------------------------------------------------------------------
// Lead pipeline
// ---------------------------------------------------------------------------

/// A lead's position in the sales funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    New,
    Contacted,
    Qualified,
    AppointmentBooked,
    TestDrive,
    Negotiating,
    Converted,
    Lost,
}

impl PipelineStage {
    /// Funnel order, used when rendering stage counts.
    pub const ALL: [PipelineStage; 8] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::AppointmentBooked,
        Self::TestDrive,
        Self::Negotiating,
        Self::Converted,
        Self::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::AppointmentBooked => "appointment_booked",
            Self::TestDrive => "test_drive",
            Self::Negotiating => "negotiating",
            Self::Converted => "converted",
            Self::Lost => "lost",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::AppointmentBooked => "Appointment booked",
            Self::TestDrive => "Test drive",
            Self::Negotiating => "Negotiating",
            Self::Converted => "Converted",
            Self::Lost => "Lost",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown pipeline stage '{value}'")))
    }

    /// Converted and lost leads have left the funnel.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Converted | Self::Lost)
    }
}

/// Sales team's read on how likely a lead is to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadQuality {
    Hot,
    Warm,
    Cold,
}

impl LeadQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "hot" => Ok(Self::Hot),
            "warm" => Ok(Self::Warm),
            "cold" => Ok(Self::Cold),
            other => Err(CoreError::Validation(format!(
                "Unknown lead quality '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority (leads, memory entries, insights)
// ---------------------------------------------------------------------------

/// Priority shared by leads, memory entries and insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(CoreError::Validation(format!("Unknown priority '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn vehicle_status_round_trips_through_text() {
        for status in VehicleStatus::ALL {
            assert_eq!(VehicleStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_pipeline_stage_is_rejected() {
        assert_matches!(
            PipelineStage::parse("won"),
            Err(CoreError::Validation(msg)) if msg.contains("won")
        );
    }

    #[test]
    fn closed_stages() {
        assert!(PipelineStage::Converted.is_closed());
        assert!(PipelineStage::Lost.is_closed());
        assert!(!PipelineStage::Negotiating.is_closed());
    }

    #[test]
    fn priority_orders_low_to_urgent() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Urgent);
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
