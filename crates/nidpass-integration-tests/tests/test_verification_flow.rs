//! # Consent-Scoped Verification — End-to-End Integration Tests
//!
//! Exercises the full platform lifecycle through the HTTP API: citizen
//! enrollment, approval, alias minting and rotation, consent grants and
//! revocation, verification with scope-limited disclosure, and the
//! history/audit trail.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use nidpass_api::config::ApiConfig;
use nidpass_api::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_app() -> axum::Router {
    nidpass_api::app(AppState::new(ApiConfig::default()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn admin_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-nidpass-role", "ADMIN")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn citizen_post(uri: &str, citizen_id: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-nidpass-role", "CITIZEN")
        .header("x-nidpass-citizen-id", citizen_id)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn citizen_get(uri: &str, citizen_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-nidpass-role", "CITIZEN")
        .header("x-nidpass-citizen-id", citizen_id)
        .body(Body::empty())
        .unwrap()
}

fn org_post(uri: &str, org_id: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-nidpass-role", "ORG_USER")
        .header("x-nidpass-org-id", org_id)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn org_get(uri: &str, org_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-nidpass-role", "ORG_USER")
        .header("x-nidpass-org-id", org_id)
        .body(Body::empty())
        .unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-nidpass-role", "ADMIN")
        .body(Body::empty())
        .unwrap()
}

/// Register an approved organization; returns its id.
async fn setup_org(app: &axum::Router, name: &str, reg: &str) -> String {
    let resp = app
        .clone()
        .oneshot(admin_post(
            "/v1/organizations",
            serde_json::json!({
                "name": name,
                "org_type": "Bank",
                "registration_number": reg
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_str().unwrap().to_string()
}

/// Enroll a citizen (PENDING); returns the citizen id.
async fn setup_citizen(app: &axum::Router, name: &str, nid: &str, dob: &str) -> String {
    let resp = app
        .clone()
        .oneshot(admin_post(
            "/v1/citizens",
            serde_json::json!({
                "full_name": name,
                "nid_number": nid,
                "date_of_birth": dob,
                "residency_district": "Dhanmondi",
                "phone_verified": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_str().unwrap().to_string()
}

/// Approve an enrolled citizen.
async fn approve_citizen(app: &axum::Router, citizen_id: &str) {
    let resp = app
        .clone()
        .oneshot(admin_post(
            &format!("/v1/citizens/{citizen_id}/decision"),
            serde_json::json!({"decision": "APPROVED"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

/// Mint a global alias; returns its token.
async fn mint_global(app: &axum::Router, citizen_id: &str) -> String {
    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/aliases",
            citizen_id,
            serde_json::json!({"kind": "GLOBAL"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["token"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Test: full lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_verification_lifecycle() {
    let app = test_app();

    // Step 1: organization and citizen arrive through the ingest boundary.
    let org = setup_org(&app, "City Bank", "REG-1001").await;
    let citizen = setup_citizen(&app, "Amina Rahman", "1234567890123", "1990-03-14").await;

    // Step 2: minting before approval is refused.
    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/aliases",
            &citizen,
            serde_json::json!({"kind": "GLOBAL"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["code"], "NOT_VERIFIED");

    // Step 3: approval unlocks minting; the global mint is idempotent.
    approve_citizen(&app, &citizen).await;
    let token = mint_global(&app, &citizen).await;

    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/aliases",
            &citizen,
            serde_json::json!({"kind": "GLOBAL"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "second mint returns existing");
    assert_eq!(body_json(resp).await["token"], token.as_str());

    // Step 4: verification without consent is denied, and leaves no history.
    let resp = app
        .clone()
        .oneshot(org_post(
            "/v1/verify",
            &org,
            serde_json::json!({"alias_token": token, "organization_id": org}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["code"], "CONSENT_DENIED");

    let resp = app.clone().oneshot(org_get("/v1/verifications", &org)).await.unwrap();
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 0);

    // Step 5: the citizen grants name and phone scopes.
    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/consents",
            &citizen,
            serde_json::json!({
                "organization_id": org,
                "scopes": ["name_match", "phone_verified"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let grant = body_json(resp).await;
    let grant_id = grant["id"].as_str().unwrap().to_string();
    assert_eq!(grant["organization_name"], "City Bank");

    // Step 6: verification discloses exactly the granted attributes.
    let resp = app
        .clone()
        .oneshot(org_post(
            "/v1/verify",
            &org,
            serde_json::json!({"alias_token": token, "organization_id": org}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let verification = body_json(resp).await;
    assert_eq!(verification["valid"], true);
    assert_eq!(verification["data"]["full_name"], "Amina Rahman");
    assert_eq!(verification["data"]["phone_verified"], true);
    assert_eq!(verification["data"]["organization"], "City Bank");
    assert!(verification["data"].get("age_over_18").is_none());
    assert!(verification["data"].get("residency_district").is_none());
    let scopes: Vec<&str> = verification["scopes_granted"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert_eq!(scopes, ["name_match", "phone_verified"]);

    // Step 7: exactly one history record was appended.
    let resp = app.clone().oneshot(org_get("/v1/verifications", &org)).await.unwrap();
    let history = body_json(resp).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["status"], "SUCCESS");
    assert_eq!(history[0]["citizen_name"], "Amina Rahman");
    assert_eq!(history[0]["disclosed"]["full_name"], "Amina Rahman");

    // Step 8: revocation takes effect immediately.
    let resp = app
        .clone()
        .oneshot(citizen_post(
            &format!("/v1/consents/{grant_id}/revoke"),
            &citizen,
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(org_post(
            "/v1/verify",
            &org,
            serde_json::json!({"alias_token": token, "organization_id": org}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["code"], "CONSENT_DENIED");

    // Still exactly one history record — denials are not recorded.
    let resp = app.clone().oneshot(org_get("/v1/verifications", &org)).await.unwrap();
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);

    // Step 9: the audit trail saw the whole story.
    let resp = app.clone().oneshot(admin_get("/v1/audit")).await.unwrap();
    let audit = body_json(resp).await;
    let kinds: Vec<&str> = audit
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    for expected in [
        "ENROLLMENT_SUBMITTED",
        "ENROLLMENT_APPROVED",
        "ALIAS_GENERATED",
        "CONSENT_GRANTED",
        "VERIFICATION_COMPLETED",
        "CONSENT_REVOKED",
    ] {
        assert!(kinds.contains(&expected), "missing {expected} in {kinds:?}");
    }
}

// ---------------------------------------------------------------------------
// Test: scanned tokens and rotation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scanned_token_and_rotation() {
    let app = test_app();
    let org = setup_org(&app, "City Bank", "REG-1001").await;
    let citizen = setup_citizen(&app, "Amina Rahman", "1234567890123", "1990-03-14").await;
    approve_citizen(&app, &citizen).await;
    let token = mint_global(&app, &citizen).await;

    app.clone()
        .oneshot(citizen_post(
            "/v1/consents",
            &citizen,
            serde_json::json!({"organization_id": org, "scopes": ["name_match"]}),
        ))
        .await
        .unwrap();

    // QR-scanned form verifies like the bare token.
    let resp = app
        .clone()
        .oneshot(org_post(
            "/v1/verify",
            &org,
            serde_json::json!({
                "alias_token": format!("NID_VERIFY:{token}"),
                "organization_id": org
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Rotate: the alias id survives, the old token dies.
    let resp = app
        .clone()
        .oneshot(citizen_get("/v1/aliases", &citizen))
        .await
        .unwrap();
    let aliases = body_json(resp).await;
    let alias_id = aliases[0]["id"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(citizen_post(
            &format!("/v1/aliases/{alias_id}/rotate"),
            &citizen,
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rotated = body_json(resp).await;
    let new_token = rotated["token"].as_str().unwrap().to_string();
    assert_ne!(new_token, token);
    assert!(rotated["rotated_at"].is_string());

    let resp = app
        .clone()
        .oneshot(org_post(
            "/v1/verify",
            &org,
            serde_json::json!({"alias_token": token, "organization_id": org}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"]["code"], "ALIAS_NOT_FOUND");

    let resp = app
        .clone()
        .oneshot(org_post(
            "/v1/verify",
            &org,
            serde_json::json!({"alias_token": new_token, "organization_id": org}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: pairwise aliases do not correlate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pairwise_aliases_are_distinct_per_organization() {
    let app = test_app();
    let org_a = setup_org(&app, "City Bank", "REG-1001").await;
    let org_b = setup_org(&app, "Metro Telecom", "REG-1002").await;
    let citizen = setup_citizen(&app, "Amina Rahman", "1234567890123", "1990-03-14").await;
    approve_citizen(&app, &citizen).await;

    let mut tokens = Vec::new();
    for org in [&org_a, &org_b] {
        let resp = app
            .clone()
            .oneshot(citizen_post(
                "/v1/aliases",
                &citizen,
                serde_json::json!({"kind": "PAIRWISE", "organization_id": org}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        tokens.push(body_json(resp).await["token"].as_str().unwrap().to_string());
    }
    assert_ne!(tokens[0], tokens[1]);

    // A pairwise token only works where its citizen granted consent; the
    // other organization's token is a different string entirely.
    app.clone()
        .oneshot(citizen_post(
            "/v1/consents",
            &citizen,
            serde_json::json!({"organization_id": org_a, "scopes": ["age_over_18"]}),
        ))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(org_post(
            "/v1/verify",
            &org_a,
            serde_json::json!({"alias_token": tokens[0], "organization_id": org_a}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let data = body_json(resp).await;
    assert_eq!(data["data"]["age_over_18"], true);
    assert!(data["data"].get("full_name").is_none());
}

// ---------------------------------------------------------------------------
// Test: validation and policy failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_scope_is_rejected_by_name() {
    let app = test_app();
    let org = setup_org(&app, "City Bank", "REG-1001").await;
    let citizen = setup_citizen(&app, "Amina Rahman", "1234567890123", "1990-03-14").await;
    approve_citizen(&app, &citizen).await;

    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/consents",
            &citizen,
            serde_json::json!({
                "organization_id": org,
                "scopes": ["name_match", "blood_type"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_SCOPE");
    assert!(body["error"]["message"].as_str().unwrap().contains("blood_type"));
}

#[tokio::test]
async fn alias_spec_mismatches_are_rejected() {
    let app = test_app();
    let org = setup_org(&app, "City Bank", "REG-1001").await;
    let citizen = setup_citizen(&app, "Amina Rahman", "1234567890123", "1990-03-14").await;
    approve_citizen(&app, &citizen).await;

    // Global with an organization.
    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/aliases",
            &citizen,
            serde_json::json!({"kind": "GLOBAL", "organization_id": org}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["error"]["code"], "INVALID_ALIAS_SPEC");

    // Pairwise without one.
    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/aliases",
            &citizen,
            serde_json::json!({"kind": "PAIRWISE"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["error"]["code"], "INVALID_ALIAS_SPEC");

    // Pairwise against an unknown organization.
    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/aliases",
            &citizen,
            serde_json::json!({
                "kind": "PAIRWISE",
                "organization_id": uuid::Uuid::new_v4()
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(resp).await["error"]["code"],
        "ORGANIZATION_NOT_FOUND"
    );
}

#[tokio::test]
async fn role_policy_is_enforced_at_the_boundary() {
    let app = test_app();
    let org = setup_org(&app, "City Bank", "REG-1001").await;
    let citizen = setup_citizen(&app, "Amina Rahman", "1234567890123", "1990-03-14").await;
    approve_citizen(&app, &citizen).await;

    // A citizen may not verify.
    let resp = app
        .clone()
        .oneshot(citizen_post(
            "/v1/verify",
            &citizen,
            serde_json::json!({"alias_token": "ALIAS-0123456789AB", "organization_id": org}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["code"], "FORBIDDEN");

    // An org user may not mint aliases.
    let resp = app
        .clone()
        .oneshot(org_post(
            "/v1/aliases",
            &org,
            serde_json::json!({"kind": "GLOBAL"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // An org user may not read the audit log.
    let resp = app
        .clone()
        .oneshot(org_get("/v1/audit", &org))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // No role header at all: unauthorized.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/aliases")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_nid_enrollment_conflicts() {
    let app = test_app();
    setup_citizen(&app, "Amina Rahman", "1234567890123", "1990-03-14").await;

    let resp = app
        .clone()
        .oneshot(admin_post(
            "/v1/citizens",
            serde_json::json!({
                "full_name": "Impostor",
                "nid_number": "1234567890123",
                "date_of_birth": "1991-01-01",
                "residency_district": "Gulshan"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["error"]["code"], "DUPLICATE_NID");
}

#[tokio::test]
async fn health_probes_require_no_auth() {
    let app = test_app();
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health/liveness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health/readiness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
