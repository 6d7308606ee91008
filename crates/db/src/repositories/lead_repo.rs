//! Repository for the `leads` table.

use sqlx::PgPool;

use crate::models::lead::{CreateLead, Lead};

const COLUMNS: &str = "id, first_name, last_name, email, phone, source, vehicle_interest, \
                       pipeline_stage, lead_quality, priority, assigned_salesperson_id, \
                       next_follow_up_date, estimated_value, converted_customer_id, \
                       created_at, updated_at";

pub struct LeadRepo;

impl LeadRepo {
    /// Insert a lead. Stage, quality and priority fall back to the column
    /// defaults.
    pub async fn create(pool: &PgPool, input: &CreateLead) -> Result<Lead, sqlx::Error> {
        let query = format!(
            "INSERT INTO leads (first_name, last_name, email, phone, source, vehicle_interest, \
                 pipeline_stage, lead_quality, priority, assigned_salesperson_id, \
                 next_follow_up_date, estimated_value)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'new'), COALESCE($8, 'warm'), \
                 COALESCE($9, 'medium'), $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.source)
            .bind(&input.vehicle_interest)
            .bind(&input.pipeline_stage)
            .bind(&input.lead_quality)
            .bind(&input.priority)
            .bind(input.assigned_salesperson_id)
            .bind(input.next_follow_up_date)
            .bind(input.estimated_value)
            .fetch_one(pool)
            .await
    }

    /// Every lead, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Lead>(&query).fetch_all(pool).await
    }
}
