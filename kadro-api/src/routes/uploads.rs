/// Media uploads: company logo and user avatar
///
/// Both endpoints accept a multipart body with a single `file` part, push
/// it through the media store, and persist the returned URL. Storage
/// mechanics live behind the `MediaStore` port; these handlers only hold
/// the authorization and persistence rules.

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
    response::Envelope,
};
use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use bytes::Bytes;
use kadro_shared::models::{
    company::Company,
    user::{User, UserRole},
};
use serde::{Deserialize, Serialize};

/// Upload response payload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Public URL the media store assigned to the file
    pub url: String,
}

/// POST /v1/uploads/company-logo
///
/// Manager only. Verifies the company still exists before uploading, then
/// persists the media URL on the company row.
pub async fn add_logo_to_company(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<Json<Envelope<UploadResponse>>> {
    if user.role != UserRole::CompanyManager {
        return Err(ApiError::Unauthorized);
    }

    let company = Company::find_by_id(&state.db, user.company_id)
        .await?
        .ok_or(ApiError::CompanyNotFound)?;

    let (filename, content) = read_file_part(multipart).await?;
    let url = state.media.upload(&filename, content).await?;

    if !Company::update_logo(&state.db, company.id, &url).await? {
        return Err(ApiError::CompanyNotFound);
    }

    tracing::info!(company_id = %company.id, "Company logo updated");

    Ok(Json(Envelope::ok("Logo uploaded", UploadResponse { url })))
}

/// POST /v1/uploads/avatar
///
/// Manager only. Persists the media URL on the caller's own user row.
pub async fn add_avatar_to_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<Json<Envelope<UploadResponse>>> {
    if user.role != UserRole::CompanyManager {
        return Err(ApiError::Unauthorized);
    }

    let (filename, content) = read_file_part(multipart).await?;
    let url = state.media.upload(&filename, content).await?;

    if !User::update_avatar(&state.db, user.id, &url).await? {
        return Err(ApiError::UserNotFound);
    }

    tracing::info!(user_id = %user.id, "Avatar updated");

    Ok(Json(Envelope::ok("Avatar uploaded", UploadResponse { url })))
}

/// Extracts the `file` part from a multipart body
///
/// Returns the client-supplied filename (defaulted when absent) and the
/// full file content.
async fn read_file_part(mut multipart: Multipart) -> ApiResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation_error("file", format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("upload.bin")
            .to_string();

        let content = field
            .bytes()
            .await
            .map_err(|e| validation_error("file", format!("Failed to read file part: {}", e)))?;

        if content.is_empty() {
            return Err(validation_error("file", "File part is empty".to_string()));
        }

        return Ok((filename, content));
    }

    Err(validation_error(
        "file",
        "Multipart body is missing a 'file' part".to_string(),
    ))
}

fn validation_error(field: &str, message: String) -> ApiError {
    ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
        field: field.to_string(),
        message,
    }])
}
