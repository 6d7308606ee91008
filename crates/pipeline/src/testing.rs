//! Hand-written test doubles shared by the unit tests in this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use dealergpt_core::conversation::{HistoryTurn, InsightBrief};
use dealergpt_core::insights::InsightDraft;
use dealergpt_core::types::{Date, DbId, Timestamp};
use dealergpt_db::models::conversation::NewConversation;
use dealergpt_db::models::customer::Customer;
use dealergpt_db::models::insight::Insight;
use dealergpt_db::models::lead::Lead;
use dealergpt_db::models::reporting::{
    AppointmentCountRow, CustomerStatsRow, InteractionCountRow, InvoiceTotalsRow,
    SalespersonStatsRow,
};
use dealergpt_db::models::vehicle::{Vehicle, VehicleFilter};
use dealergpt_llm::{ChatCompletion, ChatMessage, LlmError};

use crate::error::PipelineError;
use crate::memory::ConversationMemory;
use crate::source::BusinessDataSource;

pub fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> Date {
    Utc::now().date_naive()
}

fn vehicle(id: DbId, make: &str, status: &str) -> Vehicle {
    Vehicle {
        id,
        stock_number: format!("STK{id:04}"),
        registration: None,
        make: make.to_string(),
        model: "Model".to_string(),
        derivative: None,
        colour: None,
        year: Some(2022),
        mileage: Some(12_000),
        sales_status: status.to_string(),
        purchase_date: None,
        purchase_price: None,
        sale_date: None,
        sale_price: None,
        salesperson_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn stock(id: DbId, make: &str, price: f64, purchased: Date) -> Vehicle {
    Vehicle {
        purchase_date: Some(purchased),
        purchase_price: Some(price),
        ..vehicle(id, make, "stock")
    }
}

pub fn sold(
    id: DbId,
    make: &str,
    sale_price: f64,
    purchase_price: f64,
    purchased: Option<Date>,
    sale_date: Date,
) -> Vehicle {
    Vehicle {
        purchase_date: purchased,
        purchase_price: Some(purchase_price),
        sale_date: Some(sale_date),
        sale_price: Some(sale_price),
        ..vehicle(id, make, "sold")
    }
}

pub fn lead(
    id: DbId,
    stage: &str,
    quality: &str,
    follow_up: Option<Date>,
    value: Option<f64>,
) -> Lead {
    Lead {
        id,
        first_name: "Lead".to_string(),
        last_name: id.to_string(),
        email: None,
        phone: None,
        source: Some("website".to_string()),
        vehicle_interest: None,
        pipeline_stage: stage.to_string(),
        lead_quality: quality.to_string(),
        priority: "medium".to_string(),
        assigned_salesperson_id: None,
        next_follow_up_date: follow_up,
        estimated_value: value,
        converted_customer_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn unavailable() -> PipelineError {
    PipelineError::Database(sqlx::Error::PoolTimedOut)
}

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeSource {
    pub unsold: Vec<Vehicle>,
    pub sold: Vec<Vehicle>,
    pub leads: Vec<Lead>,
    pub fail_leads: bool,
    /// Every read sleeps this long first.
    pub delay: Option<Duration>,
}

impl FakeSource {
    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl BusinessDataSource for FakeSource {
    async fn unsold_vehicles(&self) -> Result<Vec<Vehicle>, PipelineError> {
        self.pause().await;
        Ok(self.unsold.clone())
    }

    async fn sold_vehicles(&self, since: Date) -> Result<Vec<Vehicle>, PipelineError> {
        self.pause().await;
        Ok(self
            .sold
            .iter()
            .filter(|v| v.sale_date.is_some_and(|d| d >= since))
            .cloned()
            .collect())
    }

    async fn leads(&self) -> Result<Vec<Lead>, PipelineError> {
        self.pause().await;
        if self.fail_leads {
            return Err(unavailable());
        }
        Ok(self.leads.clone())
    }

    async fn customer_stats(&self, _: Timestamp) -> Result<CustomerStatsRow, PipelineError> {
        self.pause().await;
        Ok(CustomerStatsRow::default())
    }

    async fn top_customers(&self, _: i64) -> Result<Vec<Customer>, PipelineError> {
        Ok(Vec::new())
    }

    async fn interaction_counts(
        &self,
        _: Timestamp,
    ) -> Result<Vec<InteractionCountRow>, PipelineError> {
        Ok(Vec::new())
    }

    async fn appointment_counts(
        &self,
        _: Timestamp,
        _: Timestamp,
        _: Timestamp,
    ) -> Result<Vec<AppointmentCountRow>, PipelineError> {
        Ok(Vec::new())
    }

    async fn salesperson_stats(
        &self,
        _: Date,
    ) -> Result<Vec<SalespersonStatsRow>, PipelineError> {
        Ok(Vec::new())
    }

    /// One invoice per sold vehicle, at its sale price.
    async fn invoice_totals(&self, since: Date) -> Result<InvoiceTotalsRow, PipelineError> {
        let invoiced: Vec<f64> = self
            .sold
            .iter()
            .filter(|v| v.sale_date.is_some_and(|d| d >= since))
            .filter_map(|v| v.sale_price)
            .collect();
        Ok(InvoiceTotalsRow {
            count: invoiced.len() as i64,
            total_amount: invoiced.iter().sum(),
        })
    }

    async fn vehicles(
        &self,
        _: &VehicleFilter,
        limit: i64,
    ) -> Result<Vec<Vehicle>, PipelineError> {
        Ok(self
            .unsold
            .iter()
            .chain(self.sold.iter())
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_rows(&self, table: &'static str) -> Result<i64, PipelineError> {
        self.pause().await;
        match table {
            "leads" if self.fail_leads => Err(unavailable()),
            "vehicles" => Ok((self.unsold.len() + self.sold.len()) as i64),
            _ => Ok(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeMemory {
    pub fail: bool,
    pub exchanges: Mutex<Vec<NewConversation>>,
    pub insights: Mutex<Vec<Insight>>,
}

impl FakeMemory {
    pub fn seed_turn(&self, session_id: &str, message: &str, response: &str) {
        self.exchanges.lock().unwrap().push(NewConversation {
            user_id: 7,
            session_id: session_id.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            context_used: Vec::new(),
            response_time_ms: 10,
        });
    }
}

#[async_trait]
impl ConversationMemory for FakeMemory {
    async fn recent_history(
        &self,
        user_id: DbId,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryTurn>, PipelineError> {
        if self.fail {
            return Err(unavailable());
        }
        let exchanges = self.exchanges.lock().unwrap();
        let matching: Vec<HistoryTurn> = exchanges
            .iter()
            .filter(|e| e.user_id == user_id && e.session_id == session_id)
            .map(|e| HistoryTurn {
                message: e.message.clone(),
                response: e.response.clone(),
                created_at: Utc::now(),
            })
            .collect();
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }

    async fn record_exchange(&self, exchange: NewConversation) -> Result<(), PipelineError> {
        if self.fail {
            return Err(unavailable());
        }
        self.exchanges.lock().unwrap().push(exchange);
        Ok(())
    }

    async fn active_insights(
        &self,
        _: DbId,
        limit: usize,
    ) -> Result<Vec<InsightBrief>, PipelineError> {
        if self.fail {
            return Err(unavailable());
        }
        Ok(self
            .insights
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .map(crate::memory::insight_brief)
            .collect())
    }

    async fn active_insight_types(&self) -> Result<Vec<String>, PipelineError> {
        Ok(self
            .insights
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.insight_type.clone())
            .collect())
    }

    async fn store_insight(
        &self,
        draft: &InsightDraft,
        expires_at: Timestamp,
    ) -> Result<Insight, PipelineError> {
        let mut insights = self.insights.lock().unwrap();
        let insight = Insight {
            id: insights.len() as DbId + 1,
            insight_type: draft.insight_type.to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            data: draft.data.clone(),
            priority: draft.priority.as_str().to_string(),
            target_users: Vec::new(),
            is_active: true,
            is_acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            expires_at: Some(expires_at),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        insights.push(insight.clone());
        Ok(insight)
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

pub struct FakeLlm {
    answer: Option<String>,
    delay: Option<Duration>,
    /// Content of every message sent, in order.
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeLlm {
    fn new(answer: Option<&str>, delay: Option<Duration>) -> Self {
        Self {
            answer: answer.map(str::to_string),
            delay,
            prompts: Arc::default(),
            calls: Arc::default(),
        }
    }

    pub fn answering(answer: &str) -> Self {
        Self::new(Some(answer), None)
    }

    pub fn failing() -> Self {
        Self::new(None, None)
    }

    pub fn slow(delay: Duration) -> Self {
        Self::new(Some("too late"), Some(delay))
    }
}

#[async_trait]
impl ChatCompletion for FakeLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .extend(messages.iter().map(|m| m.content.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone().ok_or(LlmError::Api {
            status: 503,
            body: "upstream unavailable".to_string(),
        })
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    fn is_configured(&self) -> bool {
        true
    }
}
