/// Asset assignment workflow
///
/// Managers assign assets to their personnel; the assigned employee
/// approves or rejects the pending assignment. Approved and rejected are
/// terminal, and the transition itself is a conditional write so two
/// concurrent responses to the same assignment cannot both win.

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
    response::Envelope,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use kadro_shared::models::{
    asset::{Asset, CreateAsset},
    user::{User, UserRole},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Assignment request
#[derive(Debug, Deserialize, Validate)]
pub struct AssignAssetRequest {
    /// Employee the asset is assigned to
    pub personnel_id: Uuid,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(max = 255))]
    pub serial_number: Option<String>,
}

/// POST /v1/assets
///
/// Manager only. The target must be an employee of the manager's own
/// company. The assignment starts pending; assigning another asset to the
/// same employee while one is still pending is allowed.
pub async fn assign_new_asset(
    State(state): State<AppState>,
    Extension(CurrentUser(manager)): Extension<CurrentUser>,
    Json(payload): Json<AssignAssetRequest>,
) -> ApiResult<Json<Envelope<Asset>>> {
    payload.validate()?;

    if manager.role != UserRole::CompanyManager {
        return Err(ApiError::Unauthorized);
    }

    let personnel = User::find_by_id(&state.db, payload.personnel_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    if personnel.company_id != manager.company_id {
        return Err(ApiError::Unauthorized);
    }

    let asset = Asset::create(
        &state.db,
        CreateAsset {
            company_id: manager.company_id,
            user_id: personnel.id,
            name: payload.name,
            serial_number: payload.serial_number,
        },
    )
    .await?;

    tracing::info!(asset_id = %asset.id, user_id = %personnel.id, "Asset assigned");

    Ok(Json(Envelope::ok("Asset assigned", asset)))
}

/// GET /v1/assets/mine
///
/// The caller's own assignments, newest first.
pub async fn get_personnel_assets(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Envelope<Vec<Asset>>>> {
    let assets = Asset::list_by_user(&state.db, user.id).await?;

    Ok(Json(Envelope::ok("Assets", assets)))
}

/// GET /v1/assets/company
///
/// Manager only. Every assignment across the company's personnel.
pub async fn get_company_assets(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Envelope<Vec<Asset>>>> {
    if user.role != UserRole::CompanyManager {
        return Err(ApiError::Unauthorized);
    }

    let assets = Asset::list_by_company(&state.db, user.company_id).await?;

    Ok(Json(Envelope::ok("Company assets", assets)))
}

/// PUT /v1/assets/:id/approve
///
/// Only the assigned employee may respond, and only while the assignment
/// is pending. The pending check lives in the UPDATE predicate; a false
/// write count means the assignment already left the pending state.
pub async fn approve_asset(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(asset_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    let asset = Asset::find_by_id(&state.db, asset_id)
        .await?
        .ok_or(ApiError::AssetNotFound)?;

    if asset.user_id != user.id {
        return Err(ApiError::Unauthorized);
    }

    if !Asset::approve(&state.db, asset.id).await? {
        return Err(ApiError::InvalidStateTransition);
    }

    tracing::info!(asset_id = %asset.id, "Asset assignment approved");

    Ok(Json(Envelope::ok_empty("Asset approved")))
}

/// Rejection request
#[derive(Debug, Deserialize, Validate)]
pub struct RejectAssetRequest {
    /// Why the assignment is declined; retained for audit
    #[validate(length(min = 1, max = 1024))]
    pub reason: String,
}

/// PUT /v1/assets/:id/reject
pub async fn reject_asset(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(asset_id): Path<Uuid>,
    Json(payload): Json<RejectAssetRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    payload.validate()?;

    let asset = Asset::find_by_id(&state.db, asset_id)
        .await?
        .ok_or(ApiError::AssetNotFound)?;

    if asset.user_id != user.id {
        return Err(ApiError::Unauthorized);
    }

    if !Asset::reject(&state.db, asset.id, &payload.reason).await? {
        return Err(ApiError::InvalidStateTransition);
    }

    tracing::info!(asset_id = %asset.id, "Asset assignment rejected");

    Ok(Json(Envelope::ok_empty("Asset rejected")))
}
