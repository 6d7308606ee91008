//! Repository for the `vehicles` table.

use dealergpt_core::types::Date;
use sqlx::PgPool;

use crate::models::vehicle::{CreateVehicle, Vehicle, VehicleFilter};

const COLUMNS: &str = "id, stock_number, registration, make, model, derivative, colour, year, \
                       mileage, sales_status, purchase_date, purchase_price, sale_date, \
                       sale_price, salesperson_id, created_at, updated_at";

/// Read access to vehicles, plus inserts for seeding and tests.
pub struct VehicleRepo;

impl VehicleRepo {
    /// Insert a vehicle. `sales_status` defaults to `stock`.
    pub async fn create(pool: &PgPool, input: &CreateVehicle) -> Result<Vehicle, sqlx::Error> {
        let query = format!(
            "INSERT INTO vehicles (stock_number, registration, make, model, derivative, \
                 sales_status, purchase_date, purchase_price, sale_date, sale_price, salesperson_id)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'stock'), $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(&input.stock_number)
            .bind(&input.registration)
            .bind(&input.make)
            .bind(&input.model)
            .bind(&input.derivative)
            .bind(&input.sales_status)
            .bind(input.purchase_date)
            .bind(input.purchase_price)
            .bind(input.sale_date)
            .bind(input.sale_price)
            .bind(input.salesperson_id)
            .fetch_one(pool)
            .await
    }

    /// Every vehicle not yet sold (stock, autolab, awaiting delivery).
    pub async fn list_unsold(pool: &PgPool) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vehicles WHERE sales_status <> 'sold' \
             ORDER BY purchase_date ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Vehicle>(&query).fetch_all(pool).await
    }

    /// Sold vehicles with a sale date on or after `since`, oldest sale first.
    pub async fn list_sold_since(pool: &PgPool, since: Date) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vehicles \
             WHERE sales_status = 'sold' AND sale_date >= $1 \
             ORDER BY sale_date ASC, id ASC"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Filtered slice of the inventory. Unset filter fields match everything.
    ///
    /// `make` matches case-insensitively. Price and date bounds are inclusive.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &VehicleFilter,
        limit: i64,
    ) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vehicles \
             WHERE ($1::TEXT IS NULL OR sales_status = $1) \
               AND ($2::TEXT IS NULL OR LOWER(make) = LOWER($2)) \
               AND ($3::DOUBLE PRECISION IS NULL OR COALESCE(sale_price, purchase_price) >= $3) \
               AND ($4::DOUBLE PRECISION IS NULL OR COALESCE(sale_price, purchase_price) <= $4) \
               AND ($5::DATE IS NULL OR COALESCE(sale_date, purchase_date) >= $5) \
               AND ($6::DATE IS NULL OR COALESCE(sale_date, purchase_date) <= $6) \
             ORDER BY COALESCE(sale_date, purchase_date) DESC NULLS LAST, id DESC \
             LIMIT $7"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(&filter.status)
            .bind(&filter.make)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.from)
            .bind(filter.to)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
