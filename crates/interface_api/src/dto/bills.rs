//! Bill DTOs

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{BillId, BillSplitId, HouseholdId, UserId};
use domain_bills::{Bill, BillDraft, BillSplit, BillSummary, ObligorSelection, SplitStatus};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub obligor_ids: Option<Vec<UserId>>,
    #[serde(default)]
    pub split_equally: bool,
}

impl CreateBillRequest {
    /// Splits the request into the draft and the obligor selection
    pub fn into_parts(self) -> (BillDraft, ObligorSelection) {
        let selection = ObligorSelection::from_request(self.obligor_ids, self.split_equally);
        let draft = BillDraft {
            name: self.name,
            amount: self.amount,
            description: self.description,
            due_date: self.due_date,
        };
        (draft, selection)
    }
}

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("amount_must_be_positive"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    pub id: BillId,
    pub name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub household_id: HouseholdId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<Bill> for BillResponse {
    fn from(bill: Bill) -> Self {
        Self {
            id: bill.id,
            name: bill.name,
            amount: bill.amount.amount(),
            description: bill.description,
            due_date: bill.due_date,
            household_id: bill.household_id,
            created_by: bill.created_by,
            created_at: bill.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSplitResponse {
    pub id: BillSplitId,
    pub bill_id: BillId,
    pub user_id: UserId,
    pub split_amount: Decimal,
    pub status: SplitStatus,
}

impl From<BillSplit> for BillSplitResponse {
    fn from(split: BillSplit) -> Self {
        Self {
            id: split.id,
            bill_id: split.bill_id,
            user_id: split.user_id,
            split_amount: split.split_amount.amount(),
            status: split.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSummaryResponse {
    pub total: Decimal,
    pub allocated: Decimal,
    pub outstanding: Decimal,
    pub unpaid: usize,
    pub pending_approval: usize,
    pub paid: usize,
    pub fully_paid: bool,
}

impl From<BillSummary> for BillSummaryResponse {
    fn from(summary: BillSummary) -> Self {
        Self {
            total: summary.total.amount(),
            allocated: summary.allocated.amount(),
            outstanding: summary.outstanding.amount(),
            unpaid: summary.unpaid,
            pending_approval: summary.pending_approval,
            paid: summary.paid,
            fully_paid: summary.is_fully_paid(),
        }
    }
}

/// A bill together with its splits
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDetailResponse {
    pub bill: BillResponse,
    pub splits: Vec<BillSplitResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BillSummaryResponse>,
}
