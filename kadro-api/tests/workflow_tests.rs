/// Workflow tests for the Kadro API
///
/// End-to-end coverage of the identity and asset workflows through the
/// real router, with the recording mailer and a canned media store.
///
/// These tests require a running PostgreSQL database and are ignored by
/// default. Run with: cargo test --test workflow_tests -- --ignored

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{
    body_json, expect_status, seed_company, seed_employee, send_json, unique_email, TestContext,
    COMPANY_PASSWORD, EMPLOYEE_PASSWORD,
};
use kadro_api::mailer::OutboundMail;
use kadro_shared::models::asset::AssetState;
use kadro_shared::models::company::Company;
use kadro_shared::models::user::User;
use serde_json::json;
use tower::ServiceExt as _;

fn register_payload(email: &str, company_email: &str) -> serde_json::Value {
    let address = json!({
        "country": "Turkey",
        "city": "Istanbul",
        "district": "Kadikoy",
        "street": "Bagdat Cad. 1",
        "zip_code": "34710"
    });

    json!({
        "first_name": "Ada",
        "last_name": "Bilgin",
        "email": email,
        "password": "manager_pass_1",
        "user_address": address,
        "company_name": "Acme",
        "company_email": company_email,
        "company_password": "company_pass_1",
        "company_address": address,
        "membership_type": "monthly"
    })
}

/// Picks the latest verification token mailed to an address
fn verification_token_for(ctx: &TestContext, to: &str) -> Option<String> {
    ctx.mailer.sent().into_iter().rev().find_map(|m| match m {
        OutboundMail::Verification { to: t, token } if t == to => Some(token),
        _ => None,
    })
}

fn reset_token_for(ctx: &TestContext, to: &str) -> Option<String> {
    ctx.mailer.sent().into_iter().rev().find_map(|m| match m {
        OutboundMail::PasswordReset { to: t, token } if t == to => Some(token),
        _ => None,
    })
}

#[tokio::test]
#[ignore]
async fn test_register_creates_unverified_company_and_mails_token() {
    let ctx = TestContext::new().await.unwrap();

    let email = unique_email("ada");
    let company_email = unique_email("hr");

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/register",
        None,
        Some(register_payload(&email, &company_email)),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["success"], true);

    let company = Company::find_by_email(&ctx.db, &company_email)
        .await
        .unwrap()
        .expect("Company should exist");
    assert!(!company.mail_verified);

    let manager = User::find_by_email(&ctx.db, &email)
        .await
        .unwrap()
        .expect("Manager should exist");
    assert_eq!(manager.company_id, company.id);

    // Exactly one verification mail, addressed to the company inbox
    assert!(verification_token_for(&ctx, &company_email).is_some());
    assert_eq!(ctx.mailer.sent_count(), 1);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_registration_is_rejected_without_side_effects() {
    let ctx = TestContext::new().await.unwrap();

    let email = unique_email("ada");
    let company_email = unique_email("hr");
    let payload = register_payload(&email, &company_email);

    let first = send_json(&ctx.app, "POST", "/v1/auth/register", None, Some(payload.clone())).await;
    expect_status(first, StatusCode::OK).await;

    let mails_after_first = ctx.mailer.sent_count();

    let second = send_json(&ctx.app, "POST", "/v1/auth/register", None, Some(payload)).await;
    expect_status(second, StatusCode::CONFLICT).await;

    // The failed attempt dispatched nothing
    assert_eq!(ctx.mailer.sent_count(), mails_after_first);
}

#[tokio::test]
#[ignore]
async fn test_verify_account_spends_token_exactly_once() {
    let ctx = TestContext::new().await.unwrap();

    let email = unique_email("ada");
    let company_email = unique_email("hr");
    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/register",
        None,
        Some(register_payload(&email, &company_email)),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let token = verification_token_for(&ctx, &company_email).unwrap();
    let uri = format!("/v1/auth/verify?token={}", token);

    let response = send_json(&ctx.app, "GET", &uri, None, None).await;
    expect_status(response, StatusCode::OK).await;

    let company = Company::find_by_email(&ctx.db, &company_email)
        .await
        .unwrap()
        .unwrap();
    assert!(company.mail_verified);

    // Replay: the spent token reports 410, not a second verification
    let response = send_json(&ctx.app, "GET", &uri, None, None).await;
    let body = expect_status(response, StatusCode::GONE).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_verify_with_unknown_token_fails() {
    let ctx = TestContext::new().await.unwrap();

    let response = send_json(
        &ctx.app,
        "GET",
        "/v1/auth/verify?token=never-issued",
        None,
        None,
    )
    .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
#[ignore]
async fn test_expired_verification_token_is_retired() {
    use kadro_shared::models::verification_token::{CreateVerificationToken, VerificationToken};

    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, false).await.unwrap();

    let record = VerificationToken::create(
        &ctx.db,
        CreateVerificationToken {
            token: format!("expired-{}", uuid::Uuid::new_v4()),
            company_id: seeded.company.id,
            expires_at: chrono::Utc::now() - chrono::Duration::hours(1),
        },
    )
    .await
    .unwrap();

    let uri = format!("/v1/auth/verify?token={}", record.token);

    let response = send_json(&ctx.app, "GET", &uri, None, None).await;
    expect_status(response, StatusCode::GONE).await;

    // Expiry consumed the record, so re-presentation reports already-used
    let spent = VerificationToken::find_by_token(&ctx.db, &record.token)
        .await
        .unwrap()
        .unwrap();
    assert!(spent.is_spent());

    let response = send_json(&ctx.app, "GET", &uri, None, None).await;
    let body = expect_status(response, StatusCode::GONE).await;
    assert_eq!(body["message"], "Verification token was already used");
}

#[tokio::test]
#[ignore]
async fn test_login_as_employee_issues_session_token() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"email": employee.email, "password": EMPLOYEE_PASSWORD})),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    assert_eq!(body["data"]["role"], "employee");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // The issued token opens the gated surface
    let response = send_json(
        &ctx.app,
        "GET",
        "/v1/profile",
        Some(&format!("Bearer {}", token)),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["email"], employee.email);
}

#[tokio::test]
#[ignore]
async fn test_login_with_company_credentials_acts_as_manager() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"email": seeded.company.email, "password": COMPANY_PASSWORD})),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["role"], "company_manager");

    // The session carries the manager identity
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let response = send_json(
        &ctx.app,
        "GET",
        "/v1/profile",
        Some(&format!("Bearer {}", token)),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["id"], seeded.manager.id.to_string());
}

#[tokio::test]
#[ignore]
async fn test_unverified_login_dispatches_exactly_one_fresh_mail() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, false).await.unwrap();

    let login = json!({"email": seeded.company.email, "password": COMPANY_PASSWORD});

    let response = send_json(&ctx.app, "POST", "/v1/auth/login", None, Some(login.clone())).await;
    expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(ctx.mailer.sent_count(), 1);

    let response = send_json(&ctx.app, "POST", "/v1/auth/login", None, Some(login)).await;
    expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(ctx.mailer.sent_count(), 2);

    // And the freshly mailed token works
    let token = verification_token_for(&ctx, &seeded.company.email).unwrap();
    let response = send_json(
        &ctx.app,
        "GET",
        &format!("/v1/auth/verify?token={}", token),
        None,
        None,
    )
    .await;
    expect_status(response, StatusCode::OK).await;
}

#[tokio::test]
#[ignore]
async fn test_login_with_wrong_password_fails() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"email": employee.email, "password": "wrong_pass_1"})),
    )
    .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
#[ignore]
async fn test_password_reset_mismatch_leaves_credential_unchanged() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/forgot-password",
        None,
        Some(json!({"email": employee.email})),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let token = reset_token_for(&ctx, &employee.email).unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/reset-password",
        None,
        Some(json!({
            "token": token,
            "new_password": "brand_new_pass_1",
            "confirm_password": "different_pass_1"
        })),
    )
    .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;

    // The old credential still logs in
    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"email": employee.email, "password": EMPLOYEE_PASSWORD})),
    )
    .await;
    expect_status(response, StatusCode::OK).await;
}

#[tokio::test]
#[ignore]
async fn test_password_reset_updates_employee_credential() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/forgot-password",
        None,
        Some(json!({"email": employee.email})),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let token = reset_token_for(&ctx, &employee.email).unwrap();
    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/reset-password",
        None,
        Some(json!({
            "token": token,
            "new_password": "brand_new_pass_1",
            "confirm_password": "brand_new_pass_1"
        })),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // New credential in, old credential out
    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"email": employee.email, "password": "brand_new_pass_1"})),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"email": employee.email, "password": EMPLOYEE_PASSWORD})),
    )
    .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
#[ignore]
async fn test_manager_reset_routes_to_company_credential() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/forgot-password",
        None,
        Some(json!({"email": seeded.manager.email})),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let token = reset_token_for(&ctx, &seeded.manager.email).unwrap();
    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/reset-password",
        None,
        Some(json!({
            "token": token,
            "new_password": "rotated_pass_1",
            "confirm_password": "rotated_pass_1"
        })),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // The company login pair changed, because that is what managers
    // authenticate with
    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"email": seeded.company.email, "password": "rotated_pass_1"})),
    )
    .await;
    expect_status(response, StatusCode::OK).await;
}

#[tokio::test]
#[ignore]
async fn test_reset_for_vanished_user_outranks_mismatch() {
    use kadro_shared::auth::jwt::{create_token, Claims, TokenPurpose};

    let ctx = TestContext::new().await.unwrap();

    // A valid reset token whose subject no longer exists, presented with a
    // bad confirmation: the dangling subject is reported, not the mismatch
    let claims = Claims::new(uuid::Uuid::new_v4(), TokenPurpose::PasswordReset);
    let token = create_token(&claims, common::TEST_JWT_SECRET).unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/reset-password",
        None,
        Some(json!({
            "token": token,
            "new_password": "brand_new_pass_1",
            "confirm_password": "different_pass_1"
        })),
    )
    .await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
#[ignore]
async fn test_forgot_password_for_unknown_email_fails() {
    let ctx = TestContext::new().await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/auth/forgot-password",
        None,
        Some(json!({"email": unique_email("nobody")})),
    )
    .await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
#[ignore]
async fn test_asset_assignment_approval_flow() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let manager_auth = ctx.auth_header(seeded.manager.id);
    let employee_auth = ctx.auth_header(employee.id);

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/assets",
        Some(&manager_auth),
        Some(json!({
            "personnel_id": employee.id,
            "name": "ThinkPad T14",
            "serial_number": "SN-0042"
        })),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["state"], "pending");
    let asset_id = body["data"]["id"].as_str().unwrap().to_string();

    // Only the assigned employee may respond
    let response = send_json(
        &ctx.app,
        "PUT",
        &format!("/v1/assets/{}/approve", asset_id),
        Some(&manager_auth),
        None,
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;

    let response = send_json(
        &ctx.app,
        "PUT",
        &format!("/v1/assets/{}/approve", asset_id),
        Some(&employee_auth),
        None,
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // Approved is terminal
    let response = send_json(
        &ctx.app,
        "PUT",
        &format!("/v1/assets/{}/approve", asset_id),
        Some(&employee_auth),
        None,
    )
    .await;
    expect_status(response, StatusCode::CONFLICT).await;

    let response = send_json(
        &ctx.app,
        "PUT",
        &format!("/v1/assets/{}/reject", asset_id),
        Some(&employee_auth),
        Some(json!({"reason": "changed my mind"})),
    )
    .await;
    expect_status(response, StatusCode::CONFLICT).await;
}

#[tokio::test]
#[ignore]
async fn test_asset_rejection_keeps_reason() {
    use kadro_shared::models::asset::Asset;

    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/assets",
        Some(&ctx.auth_header(seeded.manager.id)),
        Some(json!({"personnel_id": employee.id, "name": "Cracked monitor"})),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    let asset_id: uuid::Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    let response = send_json(
        &ctx.app,
        "PUT",
        &format!("/v1/assets/{}/reject", asset_id),
        Some(&ctx.auth_header(employee.id)),
        Some(json!({"reason": "Screen is cracked"})),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let asset = Asset::find_by_id(&ctx.db, asset_id).await.unwrap().unwrap();
    assert_eq!(asset.state, AssetState::Rejected);
    assert_eq!(asset.rejection_reason.as_deref(), Some("Screen is cracked"));
}

#[tokio::test]
#[ignore]
async fn test_employee_cannot_assign_assets() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/assets",
        Some(&ctx.auth_header(employee.id)),
        Some(json!({"personnel_id": employee.id, "name": "Self-assigned laptop"})),
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
#[ignore]
async fn test_manager_cannot_assign_across_companies() {
    let ctx = TestContext::new().await.unwrap();
    let ours = seed_company(&ctx.db, true).await.unwrap();
    let theirs = seed_company(&ctx.db, true).await.unwrap();
    let outsider = seed_employee(&ctx.db, theirs.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/assets",
        Some(&ctx.auth_header(ours.manager.id)),
        Some(json!({"personnel_id": outsider.id, "name": "Poached laptop"})),
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
#[ignore]
async fn test_profile_reads_are_idempotent() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();
    let auth = ctx.auth_header(employee.id);

    let first = body_json(send_json(&ctx.app, "GET", "/v1/profile", Some(&auth), None).await).await;
    let second =
        body_json(send_json(&ctx.app, "GET", "/v1/profile", Some(&auth), None).await).await;

    assert_eq!(first, second);
    assert_eq!(first["data"]["first_name"], "Deniz");
    assert!(first["data"].get("password_digest").is_none());
}

#[tokio::test]
#[ignore]
async fn test_manager_profile_lists_employee_roster() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    seed_employee(&ctx.db, seeded.company.id).await.unwrap();
    seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "GET",
        "/v1/profile/manager",
        Some(&ctx.auth_header(seeded.manager.id)),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    assert_eq!(body["data"]["company_name"], "Acme");
    assert_eq!(body["data"]["employees"].as_array().unwrap().len(), 2);

    // Employees do not get the manager view
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();
    let response = send_json(
        &ctx.app,
        "GET",
        "/v1/profile/manager",
        Some(&ctx.auth_header(employee.id)),
        None,
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
#[ignore]
async fn test_personnel_profile_includes_assets() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let response = send_json(
        &ctx.app,
        "POST",
        "/v1/assets",
        Some(&ctx.auth_header(seeded.manager.id)),
        Some(json!({"personnel_id": employee.id, "name": "Phone"})),
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let response = send_json(
        &ctx.app,
        "GET",
        "/v1/profile/personnel",
        Some(&ctx.auth_header(employee.id)),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    let assets = body["data"]["assets"].as_array().unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["name"], "Phone");
}

#[tokio::test]
#[ignore]
async fn test_gated_routes_require_session_token() {
    let ctx = TestContext::new().await.unwrap();

    let response = send_json(&ctx.app, "GET", "/v1/profile", None, None).await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;

    let response = send_json(
        &ctx.app,
        "GET",
        "/v1/profile",
        Some("Bearer not-a-token"),
        None,
    )
    .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
#[ignore]
async fn test_logo_upload_persists_media_url() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();

    let boundary = "kadro-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         not-really-a-png\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let request = Request::builder()
        .method("POST")
        .uri("/v1/uploads/company-logo")
        .header(header::AUTHORIZATION, ctx.auth_header(seeded.manager.id))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["url"], "https://media.example/file.png");

    let company = Company::find_by_id(&ctx.db, seeded.company.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        company.logo_url.as_deref(),
        Some("https://media.example/file.png")
    );
}

#[tokio::test]
#[ignore]
async fn test_upload_requires_manager_role() {
    let ctx = TestContext::new().await.unwrap();
    let seeded = seed_company(&ctx.db, true).await.unwrap();
    let employee = seed_employee(&ctx.db, seeded.company.id).await.unwrap();

    let boundary = "kadro-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\r\n\
         bytes\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let request = Request::builder()
        .method("POST")
        .uri("/v1/uploads/avatar")
        .header(header::AUTHORIZATION, ctx.auth_header(employee.id))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    expect_status(response, StatusCode::FORBIDDEN).await;
}
