/// Profile reads
///
/// All three endpoints sit behind the session middleware and read only;
/// calling them twice in a row returns the same result with no side
/// effects.

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
    response::Envelope,
};
use axum::{extract::State, Extension, Json};
use kadro_shared::models::{
    asset::Asset,
    company::Company,
    user::{User, UserRole},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Basic profile projection of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Personnel profile: the caller plus their assigned assets
#[derive(Debug, Serialize, Deserialize)]
pub struct PersonnelProfile {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub assets: Vec<Asset>,
}

/// Manager profile: the caller, their company, and the employee roster
#[derive(Debug, Serialize, Deserialize)]
pub struct ManagerProfile {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub company_name: String,
    pub company_logo_url: Option<String>,
    pub employees: Vec<UserProfile>,
}

/// GET /v1/profile
pub async fn get_profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Envelope<UserProfile>>> {
    Ok(Json(Envelope::ok("Profile", UserProfile::from(&user))))
}

/// GET /v1/profile/personnel
///
/// The basic profile enriched with every asset assigned to the caller,
/// newest assignment first.
pub async fn get_personnel_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Envelope<PersonnelProfile>>> {
    let assets = Asset::list_by_user(&state.db, user.id).await?;

    Ok(Json(Envelope::ok(
        "Personnel profile",
        PersonnelProfile {
            profile: UserProfile::from(&user),
            assets,
        },
    )))
}

/// GET /v1/profile/manager
///
/// Manager only. The basic profile enriched with company details and the
/// full employee roster.
pub async fn get_manager_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Envelope<ManagerProfile>>> {
    if user.role != UserRole::CompanyManager {
        return Err(ApiError::Unauthorized);
    }

    let company = Company::find_by_id(&state.db, user.company_id)
        .await?
        .ok_or(ApiError::CompanyNotFound)?;

    let employees =
        User::list_by_company_and_role(&state.db, company.id, UserRole::Employee).await?;

    Ok(Json(Envelope::ok(
        "Manager profile",
        ManagerProfile {
            profile: UserProfile::from(&user),
            company_name: company.name,
            company_logo_url: company.logo_url,
            employees: employees.iter().map(UserProfile::from).collect(),
        },
    )))
}
