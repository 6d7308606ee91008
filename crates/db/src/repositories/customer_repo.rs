//! Repository for the `customers` table.

use sqlx::PgPool;

use crate::models::customer::{CreateCustomer, Customer};

const COLUMNS: &str = "id, first_name, last_name, email, phone, total_spend, total_purchases, \
                       last_purchase_date, notes, created_at, updated_at";

pub struct CustomerRepo;

impl CustomerRepo {
    pub async fn create(pool: &PgPool, input: &CreateCustomer) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (first_name, last_name, email, phone, total_spend, \
                 total_purchases, last_purchase_date)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 0), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.total_spend)
            .bind(input.total_purchases)
            .bind(input.last_purchase_date)
            .fetch_one(pool)
            .await
    }

    /// Customers with the highest lifetime spend.
    pub async fn top_by_spend(pool: &PgPool, limit: i64) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customers \
             WHERE total_spend > 0 \
             ORDER BY total_spend DESC, id ASC LIMIT $1"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
