//! Repository for the `interactions` table.
//!
//! Interactions are an append-only log; there is no update or delete.

use sqlx::PgPool;

use crate::models::interaction::{CreateInteraction, Interaction};

const COLUMNS: &str = "id, lead_id, user_id, interaction_type, direction, outcome, notes, \
                       follow_up_required, follow_up_date, created_at, updated_at";

pub struct InteractionRepo;

impl InteractionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateInteraction,
    ) -> Result<Interaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO interactions (lead_id, user_id, interaction_type, direction, outcome, \
                 notes, follow_up_required, follow_up_date)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, false), $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Interaction>(&query)
            .bind(input.lead_id)
            .bind(input.user_id)
            .bind(&input.interaction_type)
            .bind(&input.direction)
            .bind(&input.outcome)
            .bind(&input.notes)
            .bind(input.follow_up_required)
            .bind(input.follow_up_date)
            .fetch_one(pool)
            .await
    }
}
