mod common;

use common::{coins, json_body, TestApp};
use recipe_service::models::PAYMENTS_COLLECTION;
use recipe_service::services::{payment_gateway::PaymentIntentRequest, MockPaymentGateway};
use serde_json::json;

#[tokio::test]
async fn payment_intent_is_created_in_cents() {
    let app = TestApp::spawn().await;

    let response = app
        .authed_post("/create-payment-intent", "buyer@example.com")
        .json(&json!({ "price": 4.99 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body = json_body(response).await;
    assert_eq!(body["clientSecret"], "pi_mock_1_secret_mock");
    assert_eq!(
        app.gateway.requests(),
        vec![PaymentIntentRequest::card(499, "usd")]
    );
}

#[tokio::test]
async fn payment_intent_accepts_numeric_strings() {
    let app = TestApp::spawn().await;

    let response = app
        .authed_post("/create-payment-intent", "buyer@example.com")
        .json(&json!({ "price": "5" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(app.gateway.requests()[0].amount, 500);
}

#[tokio::test]
async fn invalid_price_never_reaches_the_gateway() {
    let app = TestApp::spawn().await;

    for price in [json!("free"), json!(0), json!(-2)] {
        let response = app
            .authed_post("/create-payment-intent", "buyer@example.com")
            .json(&json!({ "price": price }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), 400);
    }
    assert!(app.gateway.requests().is_empty());
}

#[tokio::test]
async fn gateway_failure_is_a_bad_gateway() {
    let app = TestApp::spawn_with_gateway(MockPaymentGateway::failing()).await;

    let response = app
        .authed_post("/create-payment-intent", "buyer@example.com")
        .json(&json!({ "price": 1 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 502);
}

#[tokio::test]
async fn payment_sets_coins_from_the_package_table() {
    let cases = [
        (json!(1), 100),
        (json!(1.5), 100),
        (json!("1"), 100),
        (json!(5), 500),
        (json!("5.0"), 500),
        (json!(10), 1000),
    ];

    for (amount, credited) in cases {
        let app = TestApp::spawn().await;
        app.seed_user("buyer@example.com", Some(7)).await;

        let response = app
            .authed_post("/payment", "buyer@example.com")
            .json(&json!({
                "email": "buyer@example.com",
                "amount": amount,
                "transactionId": "pi_123"
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), 200, "amount {}", amount);
        assert_eq!(coins(&app.store.users().await[0]), Some(credited), "amount {}", amount);
    }
}

#[tokio::test]
async fn payment_receipt_is_stored() {
    let app = TestApp::spawn().await;
    app.seed_user("buyer@example.com", Some(0)).await;

    let response = app
        .authed_post("/payment", "buyer@example.com")
        .json(&json!({
            "email": "buyer@example.com",
            "amount": "5",
            "transactionId": "pi_123",
            "date": "2024-01-01"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body = json_body(response).await;
    assert_eq!(body["acknowledged"], true);

    let payments = app.store.payments().await;
    assert_eq!(payments.len(), 1);
    let receipt = &payments[0];
    assert_eq!(receipt.get_object_id("_id").unwrap().to_hex(), body["insertedId"]);
    assert_eq!(receipt.get_str("email").unwrap(), "buyer@example.com");
    assert_eq!(receipt.get_str("amount").unwrap(), "5");
    assert_eq!(receipt.get_i64("creditedCoins").unwrap(), 500);
    assert!(receipt.get_datetime("createdAt").is_ok());
    assert_eq!(receipt.get_str("transactionId").unwrap(), "pi_123");
}

#[tokio::test]
async fn payment_for_unknown_user_is_an_internal_error() {
    let app = TestApp::spawn().await;

    let response = app
        .authed_post("/payment", "buyer@example.com")
        .json(&json!({ "email": "ghost@example.com", "amount": 1 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    assert_eq!(json_body(response).await["message"], "Internal Error. Try again");
    assert!(app.store.payments().await.is_empty());
}

#[tokio::test]
async fn payment_that_changes_nothing_is_an_internal_error() {
    let app = TestApp::spawn().await;
    app.seed_user("buyer@example.com", Some(100)).await;

    let response = app
        .authed_post("/payment", "buyer@example.com")
        .json(&json!({ "email": "buyer@example.com", "amount": 1 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    assert!(app.store.payments().await.is_empty());
}

#[tokio::test]
async fn unreadable_amounts_get_the_largest_package() {
    for body in [
        json!({ "email": "buyer@example.com", "amount": "lots" }),
        json!({ "email": "buyer@example.com" }),
    ] {
        let app = TestApp::spawn().await;
        app.seed_user("buyer@example.com", Some(0)).await;

        let response = app
            .authed_post("/payment", "buyer@example.com")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), 200, "body {}", body);
        assert_eq!(coins(&app.store.users().await[0]), Some(1000), "body {}", body);
        assert_eq!(app.store.payments().await.len(), 1);
    }
}

#[tokio::test]
async fn receipt_write_failure_is_reported() {
    let app = TestApp::spawn().await;
    app.seed_user("buyer@example.com", Some(0)).await;
    app.store.reject_writes_to(PAYMENTS_COLLECTION).await;

    let response = app
        .authed_post("/payment", "buyer@example.com")
        .json(&json!({ "email": "buyer@example.com", "amount": 1 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
}
