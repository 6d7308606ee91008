/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (purchase, sale, follow-up) carry no time zone.
pub type Date = chrono::NaiveDate;
