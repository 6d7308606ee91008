//! Repository for the `invoices` table.

use sqlx::PgPool;

use crate::models::invoice::{CreateInvoice, Invoice};

const COLUMNS: &str = "id, invoice_number, vehicle_id, customer_id, salesperson_id, sale_date, \
                       total_amount, created_at, updated_at";

pub struct InvoiceRepo;

impl InvoiceRepo {
    pub async fn create(pool: &PgPool, input: &CreateInvoice) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices (invoice_number, vehicle_id, customer_id, salesperson_id, \
                 sale_date, total_amount)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(&input.invoice_number)
            .bind(input.vehicle_id)
            .bind(input.customer_id)
            .bind(input.salesperson_id)
            .bind(input.sale_date)
            .bind(input.total_amount)
            .fetch_one(pool)
            .await
    }
}
