//! End-to-end tests for the HTTP surface.
//!
//! Drives the full router with in-memory adapters and a mock provider that
//! verifies webhooks with the real Stripe signing scheme.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use intake_gate::adapters::http::{build_router, AppState, RouterSettings};
use intake_gate::adapters::memory::{
    InMemoryAccountDirectory, InMemoryPaymentLedger, InMemoryPendingSubmissionRepository,
    InMemorySubmissionRepository,
};
use intake_gate::adapters::rate_limiter::InMemoryRateLimiter;
use intake_gate::adapters::storage::InMemoryClientStore;
use intake_gate::adapters::stripe::{sign_payload, MockPaymentProvider};
use intake_gate::application::handlers::CheckoutSettings;
use intake_gate::domain::foundation::{EmailAddress, Timestamp};
use intake_gate::ports::PaymentLedger;

const SECRET: &str = "whsec_integration";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    ledger: InMemoryPaymentLedger,
    provider: MockPaymentProvider,
}

fn app() -> TestApp {
    let ledger = InMemoryPaymentLedger::new();
    let provider = MockPaymentProvider::new(SECRET);
    let state = AppState {
        provider: Arc::new(provider.clone()),
        ledger: Arc::new(ledger.clone()),
        submissions: Arc::new(InMemorySubmissionRepository::new()),
        pending: Arc::new(InMemoryPendingSubmissionRepository::new()),
        accounts: Arc::new(InMemoryAccountDirectory::new()),
        client_store: Arc::new(InMemoryClientStore::new()),
        rate_limiter: Arc::new(InMemoryRateLimiter::with_defaults()),
        checkout_settings: CheckoutSettings::default(),
    };

    TestApp {
        router: build_router(state, &RouterSettings::default()),
        ledger,
        provider,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn deliver_webhook(&self, event: &Value, signature: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/payment-webhook")
            .header("content-type", "application/json")
            .header("Stripe-Signature", signature)
            .body(Body::from(serde_json::to_vec(event).unwrap()))
            .unwrap();
        self.send(request).await
    }

    async fn submit(&self, email: &str) -> (StatusCode, Value) {
        self.post_json(
            "/submit-form",
            json!({
                "formType": "general_intake",
                "email": email,
                "payload": { "fullName": "Ada Lovelace", "concern": "Engine design review" }
            }),
        )
        .await
    }

    async fn succeeded_rows(&self, email: &str) -> usize {
        let email = EmailAddress::parse(email).unwrap();
        self.ledger
            .list_for_email(&email)
            .await
            .unwrap()
            .iter()
            .filter(|p| p.is_succeeded())
            .count()
    }
}

fn sign(event: &Value) -> String {
    let body = serde_json::to_vec(event).unwrap();
    sign_payload(SECRET, Timestamp::now().as_unix_secs(), &body)
}

fn checkout_completed(ppid: &str, email: &str, amount_minor: i64, correlation: &str) -> Value {
    json!({
        "id": format!("evt_{}", ppid),
        "type": "checkout.session.completed",
        "created": Timestamp::now().as_unix_secs(),
        "livemode": false,
        "data": { "object": {
            "id": format!("cs_{}", ppid),
            "payment_intent": ppid,
            "customer_email": email,
            "client_reference_id": correlation,
            "amount_total": amount_minor,
            "currency": "usd",
            "payment_status": "paid",
            "metadata": { "correlation_id": correlation, "payment_type": "consultation" }
        }}
    })
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Checkout and webhook
// =============================================================================

#[tokio::test]
async fn checkout_then_webhook_records_one_succeeded_payment() {
    let app = app();

    let (status, session) = app
        .post_json(
            "/create-checkout-session",
            json!({ "email": "a@x.com", "amount": 499 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(session["url"].as_str().unwrap().starts_with("https://"));
    let correlation = session["correlationId"].as_str().unwrap().to_string();

    let requests = app.provider.checkout_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount.minor_units(), 49900);

    let event = checkout_completed("pi_a", "a@x.com", 49900, &correlation);
    let (status, body) = app.deliver_webhook(&event, sign(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": true }));

    let email = EmailAddress::parse("a@x.com").unwrap();
    let payments = app.ledger.list_for_email(&email).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount_dollars(), 499);
    assert!(payments[0].is_succeeded());

    let (status, body) = app.get("/payment-status?email=a@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paid"], json!(true));
    assert_eq!(body["paymentId"], json!(payments[0].id().to_string()));
}

#[tokio::test]
async fn redelivered_webhook_is_acknowledged_without_a_second_row() {
    let app = app();
    let event = checkout_completed("pi_dup", "a@x.com", 1000, "");

    let (first, _) = app.deliver_webhook(&event, sign(&event)).await;
    let (second, body) = app.deliver_webhook(&event, sign(&event)).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body, json!({ "received": true }));
    assert_eq!(app.succeeded_rows("a@x.com").await, 1);
}

#[tokio::test]
async fn tampered_signature_is_rejected_and_nothing_is_written() {
    let app = app();
    let event = checkout_completed("pi_bad", "a@x.com", 49900, "");
    let signature = sign(&event);

    let mut tampered = event.clone();
    tampered["data"]["object"]["amount_total"] = json!(1);

    let (status, body) = app.deliver_webhook(&tampered, signature).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_SIGNATURE"));
    assert_eq!(app.succeeded_rows("a@x.com").await, 0);
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let app = app();
    let event = checkout_completed("pi_nosig", "a@x.com", 49900, "");

    let request = Request::builder()
        .method("POST")
        .uri("/payment-webhook")
        .body(Body::from(serde_json::to_vec(&event).unwrap()))
        .unwrap();
    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.succeeded_rows("a@x.com").await, 0);
}

#[tokio::test]
async fn checkout_without_amount_is_a_validation_error() {
    let app = app();
    let (status, body) = app
        .post_json("/create-checkout-session", json!({ "email": "a@x.com" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["code"].is_string());
    assert!(app.provider.checkout_requests().is_empty());
}

// =============================================================================
// Free tier
// =============================================================================

#[tokio::test]
async fn first_submission_is_free_and_second_needs_payment() {
    let app = app();

    let (status, first) = app.submit("new@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["needsPayment"], json!(false));
    assert_eq!(first["status"], json!("pending"));

    let (status, second) = app.submit("new@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["needsPayment"], json!(true));
    assert_eq!(second["status"], json!("pending_payment"));
    assert!(second["correlationId"].is_string());
}

#[tokio::test]
async fn payment_promotes_the_waiting_submission_and_resolves_the_redirect() {
    let app = app();
    app.submit("b@x.com").await;
    let (_, gated) = app.submit("b@x.com").await;
    let correlation = gated["correlationId"].as_str().unwrap().to_string();

    let uri = format!("/pending-submissions/{}", correlation);
    let (status, before) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["paid"], json!(false));
    assert_eq!(before["formType"], json!("general_intake"));
    assert_eq!(before["submissionId"], gated["submissionId"]);

    let event = checkout_completed("pi_b", "b@x.com", 49900, &correlation);
    let (status, _) = app.deliver_webhook(&event, sign(&event)).await;
    assert_eq!(status, StatusCode::OK);
    settle().await;

    let (_, after) = app.get(&uri).await;
    assert_eq!(after["paid"], json!(true));
}

#[tokio::test]
async fn unknown_correlation_id_is_not_found() {
    let app = app();
    let (status, body) = app
        .get("/pending-submissions/6f1c1f4e-8a0a-4a57-9d4b-3a1f0e2b7c11")
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["code"].is_string());
}

#[tokio::test]
async fn unknown_form_type_is_rejected() {
    let app = app();
    let (status, _) = app
        .post_json(
            "/submit-form",
            json!({ "formType": "tax_return", "email": "a@x.com", "payload": {} }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Cross-device verification
// =============================================================================

#[tokio::test]
async fn paid_email_on_a_second_device_is_blocked_until_signup() {
    let app = app();

    let event = checkout_completed("pi_d", "d@x.com", 49900, "");
    app.deliver_webhook(&event, sign(&event)).await;

    let (status, before) = app.get("/form-access?deviceId=device-b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["decision"], json!("allowed"));

    let (status, verified) = app
        .post_json(
            "/verify-email",
            json!({ "email": "D@x.com", "deviceId": "device-b" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified, json!({ "paid": true }));

    let (status, after) = app.get("/form-access?deviceId=device-b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["state"], json!("blocked"));
    assert_eq!(after["decision"], json!("blocked"));
    assert_eq!(after["reason"]["type"], json!("account_required"));
    assert_eq!(after["reason"]["email"], json!("d@x.com"));

    let (status, refused) = app
        .post_json(
            "/submit-form",
            json!({
                "formType": "general_intake",
                "email": "d@x.com",
                "deviceId": "device-b",
                "payload": { "fullName": "Ada Lovelace", "concern": "Engine design review" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(refused["code"], json!("ACCOUNT_REQUIRED"));

    let (_, other_device) = app.get("/form-access?deviceId=device-c").await;
    assert_eq!(other_device["decision"], json!("allowed"));

    let (status, accepted) = app
        .post_json(
            "/submit-form",
            json!({
                "formType": "general_intake",
                "email": "e@x.com",
                "deviceId": "device-c",
                "payload": { "fullName": "Ada Lovelace", "concern": "Engine design review" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["needsPayment"], json!(false));
}

#[tokio::test]
async fn unpaid_email_verifies_as_unpaid() {
    let app = app();
    let (status, body) = app
        .post_json("/verify-email", json!({ "email": "nobody@x.com" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "paid": false }));
}

#[tokio::test]
async fn verify_email_without_email_is_a_validation_error() {
    let app = app();
    let (status, _) = app.post_json("/verify-email", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Plumbing
// =============================================================================

#[tokio::test]
async fn healthz_responds_and_request_id_is_propagated() {
    let app = app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
