//! Bill repository implementation
//!
//! Database access for bills and their splits. A bill and its splits are
//! always written and removed in one transaction, and split status changes
//! go through a conditional `UPDATE` so concurrent writers cannot both win.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const BILL_COLUMNS: &str =
    "id, name, amount, description, due_date, household_id, created_by, created_at";

const SPLIT_COLUMNS: &str = "id, bill_id, user_id, split_amount, status";

/// Repository for bills and bill splits
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: PgPool,
}

impl BillRepository {
    /// Creates a new BillRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a bill and its splits in a single transaction
    ///
    /// Either the bill and every split are committed, or nothing is.
    pub async fn insert_with_splits(
        &self,
        bill: &NewBill,
        splits: &[NewBillSplit],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::classify)?;

        sqlx::query(
            r#"
            INSERT INTO bill (
                id, name, amount, description, due_date,
                household_id, created_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(bill.id)
        .bind(&bill.name)
        .bind(bill.amount)
        .bind(&bill.description)
        .bind(bill.due_date)
        .bind(bill.household_id)
        .bind(bill.created_by)
        .bind(bill.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::classify)?;

        for split in splits {
            sqlx::query(
                r#"
                INSERT INTO bill_split (id, bill_id, user_id, split_amount, status)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(split.id)
            .bind(bill.id)
            .bind(split.user_id)
            .bind(split.split_amount)
            .bind(split.status)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::classify)?;
        }

        tx.commit().await.map_err(DatabaseError::classify)?;
        Ok(())
    }

    /// Retrieves a bill by id
    pub async fn find_bill(&self, id: Uuid) -> Result<Option<BillRow>, DatabaseError> {
        sqlx::query_as::<_, BillRow>(&format!("SELECT {BILL_COLUMNS} FROM bill WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    /// Retrieves a split by id
    pub async fn find_split(&self, id: Uuid) -> Result<Option<BillSplitRow>, DatabaseError> {
        sqlx::query_as::<_, BillSplitRow>(&format!(
            "SELECT {SPLIT_COLUMNS} FROM bill_split WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::classify)
    }

    /// Sets a split's status to `to` if it is currently `from`
    ///
    /// Returns whether a row was updated. Postgres row locking makes the
    /// check and the write atomic.
    pub async fn compare_and_set_status(
        &self,
        id: Uuid,
        from: SplitStatus,
        to: SplitStatus,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE bill_split SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes a bill and its splits in one transaction
    ///
    /// Returns false if the bill did not exist.
    pub async fn delete_with_splits(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::classify)?;

        sqlx::query("DELETE FROM bill_split WHERE bill_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::classify)?;

        let removed = sqlx::query("DELETE FROM bill WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::classify)?
            .rows_affected();

        tx.commit().await.map_err(DatabaseError::classify)?;
        Ok(removed > 0)
    }

    /// Bills created by or split with a user, newest first
    pub async fn find_bills_for_user(&self, user_id: Uuid) -> Result<Vec<BillRow>, DatabaseError> {
        sqlx::query_as::<_, BillRow>(&format!(
            r#"
            SELECT {BILL_COLUMNS}
            FROM bill b
            WHERE b.created_by = $1
               OR EXISTS (
                   SELECT 1 FROM bill_split s
                   WHERE s.bill_id = b.id AND s.user_id = $1
               )
            ORDER BY b.created_at DESC, b.id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::classify)
    }

    /// Splits of a bill in creation order (ids are time-ordered)
    pub async fn find_splits_for_bill(
        &self,
        bill_id: Uuid,
    ) -> Result<Vec<BillSplitRow>, DatabaseError> {
        sqlx::query_as::<_, BillSplitRow>(&format!(
            "SELECT {SPLIT_COLUMNS} FROM bill_split WHERE bill_id = $1 ORDER BY id"
        ))
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::classify)
    }

    /// Splits owed by a user, newest bill first
    pub async fn find_splits_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BillSplitRow>, DatabaseError> {
        sqlx::query_as::<_, BillSplitRow>(
            r#"
            SELECT s.id, s.bill_id, s.user_id, s.split_amount, s.status
            FROM bill_split s
            JOIN bill b ON b.id = s.bill_id
            WHERE s.user_id = $1
            ORDER BY b.created_at DESC, s.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::classify)
    }
}

// ============================================================================
// Type definitions
// ============================================================================

/// Split status as stored in the `bill_split_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "bill_split_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitStatus {
    Unpaid,
    PendingApproval,
    Paid,
}

/// Bill row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BillRow {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub household_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Bill split row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BillSplitRow {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub user_id: Uuid,
    pub split_amount: Decimal,
    pub status: SplitStatus,
}

/// Data for inserting a bill
#[derive(Debug, Clone)]
pub struct NewBill {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub household_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a split
#[derive(Debug, Clone)]
pub struct NewBillSplit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub split_amount: Decimal,
    pub status: SplitStatus,
}
