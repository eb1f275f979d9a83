use axum::http::{self, Request, StatusCode};
use axum::routing::RouterIntoService;
use http_body_util::BodyExt;
use mock_server::{app, API_KEY_HEADER, MOCK_API_KEY};
use serde_json::{json, Value};
use tower::{Service, ServiceExt};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(API_KEY_HEADER, MOCK_API_KEY);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(body.map(|b| b.to_string()).unwrap_or_default())
        .unwrap()
}

async fn call(
    app: &mut RouterIntoService<String>,
    req: Request<String>,
) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(req).await.unwrap()
}

/// Register and log in; returns the access token.
async fn sign_up(app: &mut RouterIntoService<String>, name: &str, manager: bool) -> String {
    let email = format!("{name}@stud.noroff.no");
    let resp = call(
        app,
        request(
            "POST",
            "/auth/register",
            None,
            Some(json!({"name": name, "email": email, "password": "password123", "venueManager": manager})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call(
        app,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": email, "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["name"], name);
    body["data"]["accessToken"].as_str().unwrap().to_string()
}

fn venue_body(name: &str, price: f64) -> Value {
    json!({
        "name": name,
        "description": format!("{name} by the sea"),
        "price": price,
        "maxGuests": 4,
        "meta": {"wifi": true}
    })
}

async fn create_venue(app: &mut RouterIntoService<String>, token: &str, name: &str, price: f64) -> String {
    let resp = call(app, request("POST", "/venues", Some(token), Some(venue_body(name, price)))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["data"]["id"].as_str().unwrap().to_string()
}

// --- api key ---

#[tokio::test]
async fn missing_api_key_is_rejected() {
    let resp = app()
        .oneshot(Request::builder().uri("/venues").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["message"], "No API key header was found");
    assert_eq!(body["statusCode"], 401);
}

// --- venues ---

#[tokio::test]
async fn list_venues_empty_has_upstream_meta() {
    let resp = app().oneshot(request("GET", "/venues", None, None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["currentPage"], 1);
    assert_eq!(body["meta"]["pageCount"], 1);
    assert_eq!(body["meta"]["totalCount"], 0);
}

#[tokio::test]
async fn get_venue_not_found_has_error_body() {
    let resp = app()
        .oneshot(request(
            "GET",
            "/venues/00000000-0000-0000-0000-000000000000",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["message"], "No venue with such ID");
}

#[tokio::test]
async fn create_venue_requires_token() {
    let resp = app()
        .oneshot(request("POST", "/venues", None, Some(venue_body("Loft", 100.0))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customers_cannot_create_venues() {
    let mut app = app().into_service();
    let token = sign_up(&mut app, "guest", false).await;
    let resp = call(
        &mut app,
        request("POST", "/venues", Some(&token), Some(venue_body("Loft", 100.0))),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_venue_lists_field_errors() {
    let mut app = app().into_service();
    let token = sign_up(&mut app, "host", true).await;
    let resp = call(
        &mut app,
        request(
            "POST",
            "/venues",
            Some(&token),
            Some(json!({"name": "Loft", "description": "Nice", "price": 0, "maxGuests": 2})),
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(
        body["errors"],
        json!([{"message": "Price must be a positive number", "path": ["price"]}])
    );
}

#[tokio::test]
async fn venues_are_sorted_and_paginated() {
    let mut app = app().into_service();
    let token = sign_up(&mut app, "host", true).await;
    for (name, price) in [("A", 300.0), ("B", 100.0), ("C", 200.0)] {
        create_venue(&mut app, &token, name, price).await;
    }

    let resp = call(
        &mut app,
        request("GET", "/venues?page=1&limit=2&sort=price&sortOrder=asc", None, None),
    )
    .await;
    let body = body_json(resp).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["B", "C"]);
    assert_eq!(body["meta"]["pageCount"], 2);
    assert_eq!(body["meta"]["totalCount"], 3);
    assert_eq!(body["meta"]["nextPage"], 2);
}

#[tokio::test]
async fn search_matches_name_or_description() {
    let mut app = app().into_service();
    let token = sign_up(&mut app, "host", true).await;
    create_venue(&mut app, &token, "Harbour flat", 100.0).await;
    create_venue(&mut app, &token, "Forest cabin", 100.0).await;

    let resp = call(&mut app, request("GET", "/venues/search?q=SEA", None, None)).await;
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let resp = call(&mut app, request("GET", "/venues/search?q=cabin", None, None)).await;
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Forest cabin");
}

#[tokio::test]
async fn profile_venues_is_a_bare_array() {
    let mut app = app().into_service();
    let token = sign_up(&mut app, "host", true).await;
    create_venue(&mut app, &token, "Loft", 100.0).await;

    let resp = call(&mut app, request("GET", "/profiles/host/venues", None, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body.is_array());
    assert_eq!(body[0]["name"], "Loft");
}

// --- auth & profiles ---

#[tokio::test]
async fn wrong_password_is_401() {
    let mut app = app().into_service();
    sign_up(&mut app, "kari", false).await;
    let resp = call(
        &mut app,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "kari@stud.noroff.no", "password": "nope"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["message"], "Invalid email or password");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let mut app = app().into_service();
    sign_up(&mut app, "kari", false).await;
    let resp = call(
        &mut app,
        request(
            "POST",
            "/auth/register",
            None,
            Some(json!({"name": "kari", "email": "other@stud.noroff.no", "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn profile_update_is_owner_only() {
    let mut app = app().into_service();
    let kari = sign_up(&mut app, "kari", false).await;
    let ola = sign_up(&mut app, "ola", false).await;

    let resp = call(
        &mut app,
        request("PUT", "/profiles/kari", Some(&ola), Some(json!({"bio": "hi"}))),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call(
        &mut app,
        request("PUT", "/profiles/kari", Some(&kari), Some(json!({"bio": "hi"}))),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = call(&mut app, request("GET", "/profiles/me", Some(&kari), None)).await;
    let body = body_json(resp).await;
    assert_eq!(body["data"]["bio"], "hi");
}

// --- bookings lifecycle ---

#[tokio::test]
async fn booking_lifecycle() {
    let mut app = app().into_service();
    let host = sign_up(&mut app, "host", true).await;
    let guest = sign_up(&mut app, "guest", false).await;
    let venue_id = create_venue(&mut app, &host, "Loft", 100.0).await;

    // too many guests
    let resp = call(
        &mut app,
        request(
            "POST",
            "/bookings",
            Some(&guest),
            Some(json!({"dateFrom": "2030-06-01", "dateTo": "2030-06-04", "guests": 9, "venueId": venue_id})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // create
    let resp = call(
        &mut app,
        request(
            "POST",
            "/bookings",
            Some(&guest),
            Some(json!({"dateFrom": "2030-06-01", "dateTo": "2030-06-04", "guests": 2, "venueId": venue_id})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let booking_id = body_json(resp).await["data"]["id"].as_str().unwrap().to_string();

    // overlapping stay
    let resp = call(
        &mut app,
        request(
            "POST",
            "/bookings",
            Some(&host),
            Some(json!({"dateFrom": "2030-06-03", "dateTo": "2030-06-05", "guests": 1, "venueId": venue_id})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // venue detail with bookings and customers
    let resp = call(
        &mut app,
        request(
            "GET",
            &format!("/venues/{venue_id}?_owner=true&_bookings=true&_customer=true"),
            None,
            None,
        ),
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["data"]["owner"]["name"], "host");
    assert_eq!(body["data"]["bookings"][0]["customer"]["name"], "guest");

    // list with expansions
    let resp = call(
        &mut app,
        request("GET", "/bookings?_customer=true&_venue=true", Some(&guest), None),
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["venue"]["name"], "Loft");
    assert_eq!(body["data"][0]["customer"]["name"], "guest");

    // update guests
    let resp = call(
        &mut app,
        request(
            "PUT",
            &format!("/bookings/{booking_id}"),
            Some(&guest),
            Some(json!({"guests": 3})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["guests"], 3);

    // only the customer may delete
    let resp = call(
        &mut app,
        request("DELETE", &format!("/bookings/{booking_id}"), Some(&host), None),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = call(
        &mut app,
        request("DELETE", &format!("/bookings/{booking_id}"), Some(&guest), None),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = call(
        &mut app,
        request("GET", &format!("/bookings/{booking_id}"), Some(&guest), None),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_venue_removes_its_bookings() {
    let mut app = app().into_service();
    let host = sign_up(&mut app, "host", true).await;
    let guest = sign_up(&mut app, "guest", false).await;
    let venue_id = create_venue(&mut app, &host, "Loft", 100.0).await;
    call(
        &mut app,
        request(
            "POST",
            "/bookings",
            Some(&guest),
            Some(json!({"dateFrom": "2030-06-01", "dateTo": "2030-06-04", "guests": 2, "venueId": venue_id})),
        ),
    )
    .await;

    let resp = call(&mut app, request("DELETE", &format!("/venues/{venue_id}"), Some(&guest), None)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = call(&mut app, request("DELETE", &format!("/venues/{venue_id}"), Some(&host), None)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = call(&mut app, request("GET", "/profiles/guest/bookings", Some(&guest), None)).await;
    assert_eq!(body_json(resp).await["data"], json!([]));
}
