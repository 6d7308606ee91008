//! Vehicle entity model, DTOs and the inventory slice filter.

use dealergpt_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `vehicles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vehicle {
    pub id: DbId,
    pub stock_number: String,
    pub registration: Option<String>,
    pub make: String,
    pub model: String,
    pub derivative: Option<String>,
    pub colour: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub sales_status: String,
    pub purchase_date: Option<Date>,
    pub purchase_price: Option<f64>,
    pub sale_date: Option<Date>,
    pub sale_price: Option<f64>,
    pub salesperson_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Vehicle {
    /// Sale price minus purchase price, when both are known.
    pub fn gross_profit(&self) -> Option<f64> {
        match (self.sale_price, self.purchase_price) {
            (Some(sale), Some(cost)) => Some(sale - cost),
            _ => None,
        }
    }
}

/// DTO for creating a vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVehicle {
    pub stock_number: String,
    pub registration: Option<String>,
    pub make: String,
    pub model: String,
    pub derivative: Option<String>,
    pub sales_status: Option<String>,
    pub purchase_date: Option<Date>,
    pub purchase_price: Option<f64>,
    pub sale_date: Option<Date>,
    pub sale_price: Option<f64>,
    pub salesperson_id: Option<DbId>,
}

/// Filter for inventory slice queries. Every field is optional.
///
/// Price bounds apply to the sale price for sold vehicles and the purchase
/// price otherwise; date bounds apply to the sale date for sold vehicles and
/// the purchase date otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilter {
    pub status: Option<String>,
    pub make: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub from: Option<Date>,
    pub to: Option<Date>,
}
