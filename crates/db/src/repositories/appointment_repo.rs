//! Repository for the `appointments` table.

use sqlx::PgPool;

use crate::models::appointment::{Appointment, CreateAppointment};

const COLUMNS: &str = "id, lead_id, customer_id, user_id, appointment_type, scheduled_at, \
                       status, notes, created_at, updated_at";

pub struct AppointmentRepo;

impl AppointmentRepo {
    /// Book an appointment in the `scheduled` state.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAppointment,
    ) -> Result<Appointment, sqlx::Error> {
        let query = format!(
            "INSERT INTO appointments (lead_id, customer_id, user_id, appointment_type, \
                 scheduled_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(input.lead_id)
            .bind(input.customer_id)
            .bind(input.user_id)
            .bind(&input.appointment_type)
            .bind(input.scheduled_at)
            .fetch_one(pool)
            .await
    }
}
