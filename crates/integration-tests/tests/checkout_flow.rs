//! Integration tests for the checkout pages and the session-held draft.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use shopcart_integration_tests::{TestServer, location};

const ADDRESS: &[(&str, &str)] = &[
    ("fullName", "Ada Lovelace"),
    ("email", "ada@example.com"),
    ("address", "12 Analytical Row"),
    ("city", "London"),
    ("zipCode", "12345"),
    ("country", "United Kingdom"),
    ("phoneNumber", "+44 20 7946 0000"),
];

const PAYMENT: &[(&str, &str)] = &[
    ("paymentMethod", "card"),
    ("cardholderName", "A. Lovelace"),
    ("cardNumber", "4242424242421234"),
    ("cardExpiry", "04/29"),
    ("cardCvv", "123"),
    ("cardAgreement", "on"),
];

#[tokio::test]
async fn test_pages_show_progress() {
    let server = TestServer::start().await;

    for (path, progress) in [
        ("/checkout/step-1", "Step 1 of 4"),
        ("/checkout/step-2", "Step 2 of 4"),
        ("/checkout/step-3", "Step 3 of 4"),
        ("/checkout/order-summary", "Step 4 of 4"),
    ] {
        let resp = server.get(path).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        assert!(resp.text().await.unwrap().contains(progress), "{path}");
    }
}

#[tokio::test]
async fn test_detail_continues_to_address() {
    let server = TestServer::start().await;

    let resp = server.post_form("/checkout/step-1", &[]).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/checkout/step-2"));
}

#[tokio::test]
async fn test_invalid_address_is_rerendered() {
    let server = TestServer::start().await;
    let mut form = ADDRESS.to_vec();
    form.retain(|(name, _)| *name != "city");
    form.retain(|(name, _)| *name != "zipCode");
    form.push(("zipCode", "12"));

    let resp = server.post_form("/checkout/step-2", &form).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("City is required"));
    assert!(body.contains("Zip code must be 4 to 10 digits"));
    assert!(body.contains(r#"value="Ada Lovelace""#));

    // Nothing reached the draft
    let summary = server.page("/checkout/order-summary").await;
    assert!(summary.contains("No shipping address entered."));
}

#[tokio::test]
async fn test_address_then_payment_fills_summary() {
    let server = TestServer::start().await;
    server.post_form("/cart/add", &[("product_id", "2")]).await;

    let resp = server.post_form("/checkout/step-2", ADDRESS).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/checkout/step-3"));

    let resp = server.post_form("/checkout/step-3", PAYMENT).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/checkout/order-summary"));

    let body = server.page("/checkout/order-summary").await;
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("London"));
    assert!(body.contains("A. Lovelace"));
    assert!(body.contains("**** **** **** 1234"));
    assert!(!body.contains("4242424242421234"));
    assert!(body.contains("Mug"));
    assert!(body.contains("$8.50"));
}

#[tokio::test]
async fn test_resubmitted_address_overwrites_draft() {
    let server = TestServer::start().await;
    server.post_form("/checkout/step-2", ADDRESS).await;

    let mut moved = ADDRESS.to_vec();
    moved.retain(|(name, _)| *name != "city");
    moved.push(("city", "Paris"));
    server.post_form("/checkout/step-2", &moved).await;

    let body = server.page("/checkout/order-summary").await;
    assert!(body.contains("Paris"));
    assert!(!body.contains("London"));

    // The address page is pre-filled from the draft
    let form = server.page("/checkout/step-2").await;
    assert!(form.contains(r#"value="Paris""#));
}

#[tokio::test]
async fn test_payment_requires_agreement() {
    let server = TestServer::start().await;
    let mut form = PAYMENT.to_vec();
    form.retain(|(name, _)| *name != "cardAgreement");

    let resp = server.post_form("/checkout/step-3", &form).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("You must accept the conditions to continue.")
    );
}

#[tokio::test]
async fn test_payment_rejects_other_methods() {
    let server = TestServer::start().await;
    let mut form = PAYMENT.to_vec();
    form.retain(|(name, _)| *name != "paymentMethod");
    form.push(("paymentMethod", "paypal"));

    let resp = server.post_form("/checkout/step-3", &form).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Only card payments are available"));
}

#[tokio::test]
async fn test_drafts_are_per_visitor() {
    let server = TestServer::start().await;
    server.post_form("/checkout/step-2", ADDRESS).await;

    let stranger = reqwest::Client::new();
    let body = stranger
        .get(format!("{}/checkout/order-summary", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(!body.contains("Ada Lovelace"));
}

#[tokio::test]
async fn test_field_validation_fragment() {
    let server = TestServer::start().await;

    let bad = server
        .post_form("/forms/address/zipCode", &[("zipCode", "abc")])
        .await;
    assert_eq!(bad.status(), StatusCode::OK);
    assert!(bad.text().await.unwrap().contains("Zip code must be 4 to 10 digits"));

    let good = server
        .post_form("/forms/address/zipCode", &[("zipCode", "1000")])
        .await;
    assert_eq!(good.text().await.unwrap().trim(), "");

    let unknown = server.post_form("/forms/address/nope", &[]).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sign_in_and_out() {
    let server = TestServer::start().await;

    let rejected = server
        .post_form("/auth", &[("email", "ada@example.com"), ("password", "123")])
        .await;
    assert_eq!(rejected.status(), StatusCode::OK);
    assert!(
        rejected
            .text()
            .await
            .unwrap()
            .contains("Password must be at least 6 characters")
    );

    let resp = server
        .post_form("/auth", &[("email", "ada@example.com"), ("password", "secret1")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(server.page("/").await.contains("ada@example.com"));

    let resp = server.post_form("/auth/logout", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(!server.page("/").await.contains("ada@example.com"));
}
