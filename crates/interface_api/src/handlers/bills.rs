//! Bill and split handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BillId, BillSplitId, UserId};

use crate::auth::CurrentUser;
use crate::dto::bills::*;
use crate::{error::ApiError, AppState};

/// Creates a bill in the caller's household
pub async fn create_bill(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(request): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<BillDetailResponse>), ApiError> {
    request.validate()?;
    let (draft, selection) = request.into_parts();

    let issued = state.service.create_bill(actor, draft, selection).await?;

    Ok((
        StatusCode::CREATED,
        Json(BillDetailResponse {
            bill: issued.bill.into(),
            splits: issued.splits.into_iter().map(Into::into).collect(),
            summary: None,
        }),
    ))
}

/// Lists the caller's bills
pub async fn list_my_bills(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let bills = state.service.list_bills_for_user(actor).await?;
    Ok(Json(bills.into_iter().map(Into::into).collect()))
}

/// Lists the bills of a given user
pub async fn list_user_bills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let bills = state.service.list_bills_for_user(UserId::from_uuid(id)).await?;
    Ok(Json(bills.into_iter().map(Into::into).collect()))
}

/// Gets a bill with its splits and settlement summary
pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillDetailResponse>, ApiError> {
    let bill_id = BillId::from_uuid(id);
    let bill = state.service.get_bill(bill_id).await?;
    let splits = state.service.list_splits_for_bill(bill_id).await?;
    let summary = domain_bills::BillSummary::new(&bill, &splits);

    Ok(Json(BillDetailResponse {
        bill: bill.into(),
        splits: splits.into_iter().map(Into::into).collect(),
        summary: Some(summary.into()),
    }))
}

/// Deletes a bill and its splits
pub async fn delete_bill(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_bill(actor, BillId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the splits of a bill
pub async fn list_bill_splits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BillSplitResponse>>, ApiError> {
    let splits = state.service.list_splits_for_bill(BillId::from_uuid(id)).await?;
    Ok(Json(splits.into_iter().map(Into::into).collect()))
}

/// Lists the splits the caller owes
pub async fn list_my_splits(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<BillSplitResponse>>, ApiError> {
    let splits = state.service.list_splits_for_user(actor).await?;
    Ok(Json(splits.into_iter().map(Into::into).collect()))
}

/// Marks the caller's split as paid, pending approval
pub async fn settle_split(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BillSplitResponse>, ApiError> {
    let split = state.service.settle(actor, BillSplitId::from_uuid(id)).await?;
    Ok(Json(split.into()))
}

/// Confirms a settled split as paid
pub async fn approve_split(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BillSplitResponse>, ApiError> {
    let split = state.service.approve(actor, BillSplitId::from_uuid(id)).await?;
    Ok(Json(split.into()))
}
