/// Identity workflow: registration, verification, login, password reset
///
/// Registration creates the full company aggregate (two addresses, the
/// company, its manager user, its membership) in one transaction, then
/// issues and mails a single-use verification token. Login resolves the
/// email/password pair to a tagged [`Principal`] and issues a session
/// token. Password reset is a two-step token exchange.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::Envelope,
};
use axum::{
    extract::{Query, State},
    Json,
};
use kadro_shared::{
    auth::{
        credentials::{digest_password, validate_password_strength},
        jwt::{self, Claims, TokenPurpose},
    },
    models::{
        address::{Address, CreateAddress},
        company::{Company, CreateCompany},
        membership::{CreateMembership, Membership, MembershipType},
        user::{ProvisionalManager, User, UserRole},
        verification_token::{CreateVerificationToken, VerificationToken},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Address fields captured at registration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddressInput {
    #[validate(length(min = 1, max = 100))]
    pub country: String,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    #[validate(length(min = 1, max = 100))]
    pub district: String,

    #[validate(length(min = 1, max = 255))]
    pub street: String,

    #[validate(length(min = 1, max = 20))]
    pub zip_code: String,
}

impl From<AddressInput> for CreateAddress {
    fn from(input: AddressInput) -> Self {
        CreateAddress {
            country: input.country,
            city: input.city,
            district: input.district,
            street: input.street,
            zip_code: input.zip_code,
        }
    }
}

/// Registration request: manager account + company + membership choice
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    /// Manager's login email
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(nested)]
    pub user_address: AddressInput,

    #[validate(length(min = 1, max = 255))]
    pub company_name: String,

    /// Company's login email; the verification mail goes here
    #[validate(email)]
    pub company_email: String,

    #[validate(length(min = 8, max = 128))]
    pub company_password: String,

    #[validate(nested)]
    pub company_address: AddressInput,

    pub membership_type: MembershipType,
}

/// POST /v1/auth/register
///
/// Creates the company aggregate atomically, then issues the verification
/// token and dispatches the verification mail. Mail dispatch happens after
/// commit; a transport failure never rolls back the registration (the
/// unverified-login path re-dispatches).
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    payload.validate()?;

    validate_password_strength(&payload.password)
        .map_err(|m| password_validation_error("password", m))?;
    validate_password_strength(&payload.company_password)
        .map_err(|m| password_validation_error("company_password", m))?;

    // Duplicate check across both principal tables
    if User::exists_by_email(&state.db, &payload.email).await?
        || Company::exists_by_email(&state.db, &payload.email).await?
        || User::exists_by_email(&state.db, &payload.company_email).await?
        || Company::exists_by_email(&state.db, &payload.company_email).await?
    {
        return Err(ApiError::MailAlreadyExists);
    }

    let provisional = ProvisionalManager {
        email: payload.email,
        password_digest: digest_password(&payload.password),
        first_name: payload.first_name,
        last_name: payload.last_name,
        address_id: None,
    };

    let mut tx = state.db.begin().await?;

    let user_address = Address::create(&mut *tx, payload.user_address.into()).await?;
    let company_address = Address::create(&mut *tx, payload.company_address.into()).await?;

    let company = Company::create(
        &mut *tx,
        CreateCompany {
            name: payload.company_name,
            email: payload.company_email,
            password_digest: digest_password(&payload.company_password),
            address_id: company_address.id,
        },
    )
    .await?;

    let mut manager = provisional.commit(company.id);
    manager.address_id = Some(user_address.id);
    User::create(&mut *tx, manager).await?;

    Membership::create(
        &mut *tx,
        CreateMembership {
            company_id: company.id,
            membership_type: payload.membership_type,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(company_id = %company.id, "Company registered");

    // The registration is committed; a dispatch failure is recoverable
    // because an unverified login re-dispatches a fresh token
    if let Err(e) = dispatch_verification(&state, &company).await {
        tracing::warn!(company_id = %company.id, error = %e, "Verification dispatch failed after commit");
    }

    Ok(Json(Envelope::ok_empty(
        "Registration successful. Check the company inbox to verify the account",
    )))
}

/// Verification token query parameter
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// GET /v1/auth/verify?token=...
///
/// Spends a verification token. Failure ordering: unknown, already spent,
/// expired (which also retires the record), company gone. On success the
/// verified flag and the spent token persist together.
pub async fn verify_account(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> ApiResult<Json<Envelope<()>>> {
    let record = VerificationToken::find_by_token(&state.db, &query.token)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    if record.is_spent() {
        return Err(ApiError::TokenAlreadyUsed);
    }

    if record.is_expired() {
        // The only write on a failure path: an expired token is retired
        // so re-presenting it reports TokenAlreadyUsed, not a retry
        VerificationToken::consume(&state.db, record.id).await?;
        return Err(ApiError::ExpiredToken);
    }

    let company = Company::find_by_id(&state.db, record.company_id)
        .await?
        .ok_or(ApiError::CompanyNotFound)?;

    let mut tx = state.db.begin().await?;
    Company::set_mail_verified(&mut *tx, company.id).await?;
    // Conditional spend: losing the race to a concurrent verify means the
    // token is already used, and dropping the tx rolls the flag write back
    if !VerificationToken::consume(&mut *tx, record.id).await? {
        return Err(ApiError::TokenAlreadyUsed);
    }
    tx.commit().await?;

    tracing::info!(company_id = %company.id, "Company email verified");

    Ok(Json(Envelope::ok_empty("Account verified")))
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response payload
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer session token
    pub token: String,

    /// Role the session acts as
    pub role: UserRole,
}

/// The authenticated principal a credential pair resolves to
#[derive(Debug)]
pub enum Principal {
    /// Company credentials: the session acts as the company's manager
    Manager { user: User, company: Company },

    /// Personal credentials
    Employee { user: User },
}

impl Principal {
    /// The user identity the session token is issued for
    pub fn user(&self) -> &User {
        match self {
            Principal::Manager { user, .. } => user,
            Principal::Employee { user } => user,
        }
    }
}

/// Resolves an email/password pair to a [`Principal`]
///
/// Company credentials are tried first. An unverified company match gets
/// exactly one fresh verification mail before the call fails with
/// `MailNotVerified`. A verified company resolves to its manager user, so
/// the issued session carries the manager identity.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> ApiResult<Principal> {
    let digest = digest_password(password);

    if let Some(company) = Company::find_by_email_and_digest(&state.db, email, &digest).await? {
        if !company.mail_verified {
            dispatch_verification(state, &company).await?;
            return Err(ApiError::MailNotVerified);
        }

        let user = User::find_manager_of_company(&state.db, company.id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        return Ok(Principal::Manager { user, company });
    }

    if let Some(user) = User::find_by_email_and_digest(&state.db, email, &digest).await? {
        return Ok(Principal::Employee { user });
    }

    Err(ApiError::InvalidCredentials)
}

/// POST /v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<Envelope<LoginResponse>>> {
    payload.validate()?;

    let principal = authenticate(&state, &payload.email, &payload.password).await?;
    let user = principal.user();

    let claims = Claims::session(user.id);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "Login successful");

    Ok(Json(Envelope::ok(
        "Login successful",
        LoginResponse {
            token,
            role: user.role,
        },
    )))
}

/// Forgot-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// POST /v1/auth/forgot-password
///
/// Issues a short-lived reset token and mails it. Reports success once
/// the mail is dispatched; the token itself is the only secret.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    payload.validate()?;

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::MailNotFound)?;

    let claims = Claims::new(user.id, TokenPurpose::PasswordReset);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    if let Err(e) = state.mailer.send_reset(&user.email, &token).await {
        tracing::warn!(user_id = %user.id, error = %e, "Reset mail dispatch failed");
    }

    Ok(Json(Envelope::ok_empty("Password reset email sent")))
}

/// Reset-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,

    pub confirm_password: String,
}

/// POST /v1/auth/reset-password
///
/// Exchanges a valid reset token for a credential update. A mismatched
/// confirmation fails before any write, leaving the stored credential
/// unchanged. Manager subjects update the company credential (that is the
/// pair they log in with); employees update their own.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    payload.validate()?;

    let claims = jwt::validate_purpose_token(
        &payload.token,
        state.jwt_secret(),
        TokenPurpose::PasswordReset,
    )?;

    // Failure precedence: a dangling subject outranks a bad confirmation
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    if payload.new_password != payload.confirm_password {
        return Err(ApiError::PasswordsDoNotMatch);
    }

    validate_password_strength(&payload.new_password)
        .map_err(|m| password_validation_error("new_password", m))?;

    let digest = digest_password(&payload.new_password);

    let updated = match user.role {
        UserRole::CompanyManager => {
            Company::update_password(&state.db, user.company_id, &digest)
                .await?
                .then_some(())
                .ok_or(ApiError::CompanyNotFound)
        }
        UserRole::Employee => User::update_password(&state.db, user.id, &digest)
            .await?
            .then_some(())
            .ok_or(ApiError::UserNotFound),
    };
    updated?;

    tracing::info!(user_id = %user.id, "Password reset");

    Ok(Json(Envelope::ok_empty("Password updated")))
}

/// Issues a fresh verification token for a company and mails it
///
/// The token row is persisted before the dispatch; a transport failure is
/// logged and swallowed so it cannot undo the persisted state.
async fn dispatch_verification(state: &AppState, company: &Company) -> ApiResult<()> {
    let claims = Claims::new(company.id, TokenPurpose::Verification);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    VerificationToken::create(
        &state.db,
        CreateVerificationToken {
            token: token.clone(),
            company_id: company.id,
            expires_at: claims.expires_at(),
        },
    )
    .await?;

    if let Err(e) = state.mailer.send_verification(&company.email, &token).await {
        tracing::warn!(company_id = %company.id, error = %e, "Verification mail dispatch failed");
    }

    Ok(())
}

fn password_validation_error(field: &str, message: String) -> ApiError {
    ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
        field: field.to_string(),
        message,
    }])
}
