//! Resource endpoint integration tests
//!
//! Paths, query parameters and payloads of the typed wrappers.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use studio_admin::api::Upload;
use studio_admin::shared::models::{
    BookingCreate, BookingFilter, DirectionCreate, DirectionUpdate, ManualSubscriptionGrant,
    PaymentCreate, ProductCreate, ProductUpdate, SlotFilter, StudentUserUpdate,
};
use studio_admin::shared::ApiError;
use wiremock::matchers::{
    body_json, body_string_contains, header_regex, method, path, query_param,
};
use wiremock::{Mock, ResponseTemplate};

use crate::common::*;

fn slot_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "direction_id": 2,
        "starts_at": "2024-05-01T18:30:00",
        "duration_min": 60,
        "capacity": 12,
        "price_single_visit": 900.0,
        "allow_subscription": true,
        "status": "scheduled"
    })
}

fn booking_json(id: i64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": 4,
        "class_slot_id": 9,
        "status": status,
        "created_at": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_direction_list_include_inactive() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/directions"))
        .and(query_param("include_inactive", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Salsa", "is_active": true},
            {"id": 2, "name": "Tango", "is_active": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let directions = crate::assert_ok!(client.directions().list(true).await);
    assert_eq!(directions.len(), 2);
    assert!(!directions[1].is_active);
}

#[tokio::test]
async fn test_direction_list_active_only_sends_no_flag() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    crate::assert_ok!(client.directions().list(false).await);

    let requests = received(&server).await;
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_direction_create_update_delete() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/directions"))
        .and(body_json(json!({"name": "Salsa", "is_active": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Salsa"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/directions/1"))
        .and(body_json(json!({"is_active": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "Salsa",
            "is_active": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/directions/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = crate::assert_ok!(
        client
            .directions()
            .create(&DirectionCreate {
                name: "Salsa".to_string(),
                description: None,
                is_active: true,
            })
            .await
    );
    assert!(created.is_active);

    let update = DirectionUpdate {
        is_active: Some(false),
        ..Default::default()
    };
    let updated = crate::assert_ok!(client.directions().update(created.id, &update).await);
    assert!(!updated.is_active);

    crate::assert_ok!(client.directions().delete(created.id).await);
}

#[tokio::test]
async fn test_product_create_update_delete() {
    let server = start_backend().await;
    let product = json!({
        "id": 2,
        "type": "subscription",
        "name": "8 classes",
        "price": 6400.0,
        "classes_count": 8,
        "validity_days": 30
    });
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product.clone()])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .and(body_json(json!({
            "type": "subscription",
            "name": "8 classes",
            "price": 6400.0,
            "classes_count": 8,
            "validity_days": 30,
            "is_active": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(product.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/products/2"))
        .and(body_json(json!({"price": 7000.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(product))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/products/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let products = crate::assert_ok!(client.products().list().await);
    assert_eq!(products[0].kind, "subscription");

    let create = ProductCreate {
        kind: "subscription".to_string(),
        name: "8 classes".to_string(),
        description: None,
        price: 6400.0,
        classes_count: Some(8),
        validity_days: Some(30),
        direction_limit_id: None,
        is_active: true,
    };
    let created = crate::assert_ok!(client.products().create(&create).await);
    assert_eq!(created.classes_count, Some(8));

    let update = ProductUpdate {
        price: Some(7000.0),
        ..Default::default()
    };
    crate::assert_ok!(client.products().update(created.id, &update).await);
    crate::assert_ok!(client.products().delete(created.id).await);
}

#[tokio::test]
async fn test_payment_create_path() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/payments/create"))
        .and(body_json(json!({
            "user_id": 4,
            "amount": 900.0,
            "currency": "RUB",
            "purpose": "single",
            "class_slot_id": 9
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 21,
            "user_id": 4,
            "amount": 900.0,
            "currency": "RUB",
            "purpose": "single",
            "class_slot_id": 9,
            "status": "pending",
            "provider": "manual",
            "order_id": "ord-21",
            "created_at": "2024-05-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let payment = crate::assert_ok!(
        client
            .payments()
            .create(&PaymentCreate {
                user_id: 4,
                amount: 900.0,
                currency: "RUB".to_string(),
                purpose: "single".to_string(),
                product_id: None,
                class_slot_id: Some(9),
            })
            .await
    );
    assert_eq!(payment.id, 21);
    assert_eq!(payment.status, "pending");
}

#[tokio::test]
async fn test_slot_list_filter() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/slots"))
        .and(query_param("from_dt", "2024-05-01T00:00:00Z"))
        .and(query_param("direction_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([slot_json(3)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let filter = SlotFilter {
        from: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
        to: None,
        direction_id: Some(2),
    };
    let slots = crate::assert_ok!(client.slots().list(&filter).await);

    assert_eq!(slots.len(), 1);
    assert_eq!(
        slots[0].starts_at,
        Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap()
    );

    let requests = received(&server).await;
    assert!(!requests[0].url.query().unwrap_or_default().contains("to_dt"));
}

#[tokio::test]
async fn test_slot_cancel() {
    let server = start_backend().await;
    let mut cancelled = slot_json(3);
    cancelled["status"] = json!("cancelled");
    Mock::given(method("POST"))
        .and(path("/slots/3/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cancelled))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let slot = crate::assert_ok!(client.slots().cancel(3).await);
    assert_eq!(slot.status, "cancelled");
}

#[tokio::test]
async fn test_booking_create_and_cancel() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(body_json(json!({"user_id": 4, "class_slot_id": 9, "source": "admin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json(11, "confirmed")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bookings/11/cancel"))
        .and(body_json(json!({"reason": "sick"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json(11, "cancelled")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let booking = crate::assert_ok!(client.bookings().create(&BookingCreate::by_admin(4, 9)).await);
    assert_eq!(booking.status, "confirmed");

    let booking = crate::assert_ok!(
        client
            .bookings()
            .cancel(booking.id, Some("sick".to_string()))
            .await
    );
    assert_eq!(booking.status, "cancelled");
}

#[tokio::test]
async fn test_booking_list_filter() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(query_param("user_id", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([booking_json(1, "reserved")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let filter = BookingFilter {
        slot_id: None,
        user_id: Some(4),
    };
    let bookings = crate::assert_ok!(client.bookings().list(&filter).await);
    assert_eq!(bookings[0].user_id, 4);
}

#[tokio::test]
async fn test_booking_stats() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/bookings/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 40,
            "confirmed": 31,
            "bookings_today": 5,
            "attendance_rate": 82.0,
            "weekly_revenue": 27500.0
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let stats = crate::assert_ok!(client.bookings().stats().await);
    assert_eq!(stats.total, 40);
    assert_eq!(stats.bookings_today, 5);
    assert_eq!(stats.attendance_rate, 82.0);
}

#[tokio::test]
async fn test_user_search_and_update() {
    let server = start_backend().await;
    let user = json!({
        "id": 4,
        "tg_id": 100500,
        "full_name": "Anna",
        "phone": "+70000000000",
        "created_at": "2024-04-01T09:00:00"
    });
    Mock::given(method("GET"))
        .and(path("/users/search"))
        .and(query_param("q", "Anna"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user.clone()])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/users/4"))
        .and(body_json(json!({"age": 27})))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let found = crate::assert_ok!(client.users().search("  Anna ").await);
    assert_eq!(found[0].full_name.as_deref(), Some("Anna"));

    let update = StudentUserUpdate {
        age: Some(27),
        ..Default::default()
    };
    crate::assert_ok!(client.users().update(4, &update).await);
}

#[tokio::test]
async fn test_manual_subscription_grant() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/users/4/manual-subscription"))
        .and(body_json(json!({"classes_count": 8, "validity_days": 30})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 15,
            "user_id": 4,
            "product_id": 2,
            "remaining_classes": 8,
            "initial_classes": 8,
            "valid_from": "2024-05-01T00:00:00",
            "valid_to": "2024-05-31T00:00:00",
            "status": "active"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let grant = ManualSubscriptionGrant {
        classes_count: 8,
        validity_days: Some(30),
    };
    let subscription = crate::assert_ok!(client.users().grant_manual_subscription(4, &grant).await);
    assert_eq!(subscription.remaining_classes, 8);
}

#[tokio::test]
async fn test_update_addresses_keeps_listed_media() {
    let server = start_backend().await;
    Mock::given(method("PUT"))
        .and(path("/settings/addresses"))
        .and(body_json(json!({"addresses": "Main st. 1", "media_ids": [1, 3]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "addresses": "Main st. 1",
            "media": [
                {"id": 1, "url": "/media/1.jpg", "media_type": "photo"},
                {"id": 3, "url": "/media/3.mp4", "media_type": "video", "filename": "tour.mp4"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let settings = crate::assert_ok!(
        client
            .settings()
            .update_addresses("Main st. 1", vec![1, 3])
            .await
    );
    assert_eq!(settings.media.len(), 2);

    // Removing media is a save with fewer ids; no delete call is made.
    let methods: Vec<String> = received(&server)
        .await
        .iter()
        .map(|request| request.method.to_string())
        .collect();
    assert_eq!(methods, vec!["PUT"]);
}

#[tokio::test]
async fn test_upload_address_media() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/settings/addresses/media"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("studio.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "url": "/media/5.jpg", "media_type": "photo", "filename": "studio.jpg"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let upload =
        Upload::new("files", "studio.jpg", b"jpeg bytes".to_vec()).with_content_type("image/jpeg");
    let media = crate::assert_ok!(client.settings().upload_address_media(vec![upload]).await);
    assert_eq!(media[0].id, 5);
}

#[tokio::test]
async fn test_upload_without_files_is_rejected_locally() {
    let server = start_backend().await;
    let client = client_for(&server);

    crate::assert_err!(
        client.settings().upload_address_media(Vec::new()).await,
        ApiError::InvalidRequest { .. }
    );
    assert!(received(&server).await.is_empty());
}
