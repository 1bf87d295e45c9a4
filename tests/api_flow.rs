use std::net::SocketAddr;

use actix_web::{App, http::StatusCode, test, web::Data};
use attendance_tracker::{
    auth::jwt::generate_access_token, config::Config, models::Claims, routes,
    store::RecordStore,
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .unwrap()
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn bearer(user_id: &str) -> (&'static str, String) {
    let token = generate_access_token(user_id, user_id, SECRET, 600).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! test_app {
    ($store:expr) => {{
        let config = test_config();
        test::init_service(
            App::new()
                .app_data(Data::new($store.clone()))
                .app_data(Data::new(config.clone()))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let store = RecordStore::memory();
    let app = test_app!(store);

    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Access denied" }));

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .set_json(json!({ "status": "present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // not a bearer scheme
    let req = test::TestRequest::get()
        .uri("/api/subjects")
        .peer_addr(peer())
        .insert_header(("Authorization", "Basic YWxpY2U6cHc="))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn bad_tokens_are_forbidden() {
    let store = RecordStore::memory();
    let app = test_app!(store);

    // user 42's signature over user 7's claims
    let token = generate_access_token("42", "42", SECRET, 600).unwrap();
    let other = generate_access_token("7", "7", SECRET, 600).unwrap();
    let mut parts: Vec<&str> = token.split('.').collect();
    parts[1] = other.split('.').nth(1).unwrap();
    let tampered = parts.join(".");

    let expired = {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "42".into(),
            username: "42".into(),
            iat: now - 7200,
            exp: now - 3600,
            jti: "expired".into(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    };

    let foreign = generate_access_token("42", "42", "someone-else", 600).unwrap();

    for bad in [tampered, expired, foreign, "not-a-jwt".to_string()] {
        let req = test::TestRequest::get()
            .uri("/api/attendance")
            .peer_addr(peer())
            .insert_header(("Authorization", format!("Bearer {bad}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "token {bad}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid token");
    }
}

#[actix_web::test]
async fn bearer_scheme_is_case_insensitive() {
    let store = RecordStore::memory();
    let app = test_app!(store);
    let token = generate_access_token("42", "42", SECRET, 600).unwrap();

    for scheme in ["bearer", "BEARER", "Bearer"] {
        let req = test::TestRequest::get()
            .uri("/api/attendance")
            .peer_addr(peer())
            .insert_header(("Authorization", format!("{scheme} {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "scheme {scheme}");
    }

    // scheme without a token is still missing credentials
    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .insert_header(("Authorization", "bearer "))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn recorded_day_shows_up_in_listing() {
    let store = RecordStore::memory();
    let app = test_app!(store);
    let today = Utc::now().date_naive().to_string();

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .insert_header(bearer("42"))
        .set_json(json!({ "status": "present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Attendance recorded successfully");
    assert_eq!(body["record"]["date"], today.as_str());

    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .insert_header(bearer("42"))
        .to_request();
    let records: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        records,
        json!([{ "user_id": "42", "date": today, "status": "present" }])
    );

    // another user sees nothing
    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .insert_header(bearer("7"))
        .to_request();
    let records: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(records, json!([]));
}

#[actix_web::test]
async fn later_write_on_same_day_wins() {
    let store = RecordStore::memory();
    let app = test_app!(store);
    let today = Utc::now().date_naive().to_string();

    for status in ["present", "absent"] {
        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .peer_addr(peer())
            .insert_header(bearer("42"))
            .set_json(json!({ "status": status }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/attendance/calendar")
        .peer_addr(peer())
        .insert_header(bearer("42"))
        .to_request();
    let calendar: Value = test::call_and_read_body_json(&app, req).await;
    let mut expected = serde_json::Map::new();
    expected.insert(today, json!("absent"));
    assert_eq!(calendar, Value::Object(expected));

    assert_eq!(store.records_for("42").await.unwrap().len(), 1);
}

#[actix_web::test]
async fn malformed_bodies_are_rejected_without_writes() {
    let store = RecordStore::memory();
    let app = test_app!(store);

    for body in [
        json!({ "status": "late" }),
        json!({}),
        json!({ "status": "present", "userId": "99" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .peer_addr(peer())
            .insert_header(bearer("42"))
            .set_json(body.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
        let err: Value = test::read_body_json(resp).await;
        assert!(err["error"].is_string());
    }

    assert!(store.records_for("42").await.unwrap().is_empty());
}

#[actix_web::test]
async fn register_login_then_use_token() {
    let store = RecordStore::memory();
    let app = test_app!(store);
    let creds = json!({ "username": "Alice", "password": "pw-123" });

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .peer_addr(peer())
        .set_json(creds.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let registered: Value = test::read_body_json(resp).await;
    assert_eq!(registered["username"], "alice");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .peer_addr(peer())
        .set_json(json!({ "username": "alice", "password": "other" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": "alice", "password": "wrong" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer())
        .set_json(creds)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = test::read_body_json(resp).await;
    assert_eq!(login["token_type"], "Bearer");
    let token = login["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "status": "present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["record"]["user_id"], registered["id"]);
}

#[actix_web::test]
async fn unknown_user_and_wrong_password_look_alike() {
    let store = RecordStore::memory();
    let app = test_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .peer_addr(peer())
        .set_json(json!({ "username": "carol", "password": "pw-123" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let mut bodies = Vec::new();
    for username in ["carol", "nobody"] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "username": username, "password": "wrong" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{username}");
        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0], json!({ "error": "Invalid credentials" }));
}

#[actix_web::test]
async fn empty_credentials_are_a_validation_failure() {
    let store = RecordStore::memory();
    let app = test_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .peer_addr(peer())
        .set_json(json!({ "username": "  ", "password": "pw" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn subject_counts_follow_toggle_and_add_class() {
    let store = RecordStore::memory();
    let app = test_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/subjects")
        .peer_addr(peer())
        .insert_header(bearer("42"))
        .set_json(json!({ "name": " Physics " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["name"], "Physics");
    let id = created["id"].as_str().unwrap().to_string();

    let mark = |present: bool| {
        test::TestRequest::put()
            .uri(&format!("/api/subjects/{id}/attendance"))
            .peer_addr(peer())
            .insert_header(bearer("42"))
            .set_json(json!({ "present": present }))
            .to_request()
    };
    let add_class = || {
        test::TestRequest::post()
            .uri(&format!("/api/subjects/{id}/classes"))
            .peer_addr(peer())
            .insert_header(bearer("42"))
            .to_request()
    };

    // no class held yet, so present is clamped
    let s: Value = test::call_and_read_body_json(&app, mark(true)).await;
    assert_eq!((s["attended"].clone(), s["total"].clone()), (json!(0), json!(0)));

    let s: Value = test::call_and_read_body_json(&app, add_class()).await;
    assert_eq!((s["attended"].clone(), s["total"].clone()), (json!(0), json!(1)));

    let s: Value = test::call_and_read_body_json(&app, mark(true)).await;
    assert_eq!(s["attended"], 1);

    let s: Value = test::call_and_read_body_json(&app, mark(true)).await;
    assert_eq!(s["attended"], 1, "attended never exceeds total");

    let s: Value = test::call_and_read_body_json(&app, mark(false)).await;
    assert_eq!((s["attended"].clone(), s["total"].clone()), (json!(0), json!(1)));

    let req = test::TestRequest::get()
        .uri("/api/subjects")
        .peer_addr(peer())
        .insert_header(bearer("42"))
        .to_request();
    let subjects: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(subjects.as_array().unwrap().len(), 1);

    // someone else's subject is not found
    let req = test::TestRequest::post()
        .uri(&format!("/api/subjects/{id}/classes"))
        .peer_addr(peer())
        .insert_header(bearer("7"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn blank_subject_name_is_rejected() {
    let store = RecordStore::memory();
    let app = test_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/subjects")
        .peer_addr(peer())
        .insert_header(bearer("42"))
        .set_json(json!({ "name": "   " }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
    assert!(store.subjects_for("42").await.unwrap().is_empty());
}
