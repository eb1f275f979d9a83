//! In-memory stand-in for the Holidaze API.
//!
//! Reproduces the endpoints the client consumes, including the upstream
//! envelope quirks: most endpoints answer `{data, meta}`, while
//! `GET /profiles/{name}/venues` answers a bare array. Every request must
//! carry [`MOCK_API_KEY`]; writes and private reads also need a bearer token
//! obtained from `POST /auth/login`.

pub mod error;
pub mod model;

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, Query, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

use crate::error::{FieldIssue, MockError, MockResult};
use crate::model::{
    parse_instant, Account, Booking, BookingBody, BookingView, Expand, ListQuery, LoginBody,
    Profile, ProfileBody, RegisterBody, SearchQuery, Store, Venue, VenueBody, VenueView,
};

pub const API_KEY_HEADER: &str = "x-noroff-api-key";
pub const MOCK_API_KEY: &str = "mock-api-key";

const MAX_LIMIT: u32 = 100;

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/profiles/me", get(me))
        .route("/profiles/{name}", put(update_profile))
        .route("/profiles/{name}/venues", get(profile_venues))
        .route("/profiles/{name}/bookings", get(profile_bookings))
        .route("/venues", get(list_venues).post(create_venue))
        .route("/venues/search", get(search_venues))
        .route(
            "/venues/{id}",
            get(get_venue).put(update_venue).delete(delete_venue),
        )
        .route("/bookings", get(list_bookings).post(create_booking))
        .route(
            "/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .layer(middleware::from_fn(require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let valid = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| key == MOCK_API_KEY);
    if !valid {
        return MockError::MissingApiKey.into_response();
    }
    next.run(request).await
}

/// Profile name behind the request's bearer token.
pub struct Caller(pub String);

impl FromRequestParts<Db> for Caller {
    type Rejection = MockError;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(MockError::Unauthorized)?;
        let store = db.read().await;
        store
            .tokens
            .get(token)
            .cloned()
            .map(Caller)
            .ok_or(MockError::Unauthorized)
    }
}

#[derive(Serialize, Default)]
struct NoMeta {}

#[derive(Serialize)]
struct Data<T> {
    data: T,
    meta: NoMeta,
}

fn data<T: Serialize>(data: T) -> Json<Data<T>> {
    Json(Data {
        data,
        meta: NoMeta {},
    })
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    is_first_page: bool,
    is_last_page: bool,
    current_page: u32,
    previous_page: Option<u32>,
    next_page: Option<u32>,
    page_count: u32,
    total_count: u32,
}

#[derive(Serialize)]
struct Paged<T> {
    data: Vec<T>,
    meta: PageInfo,
}

fn paginate<T>(items: Vec<T>, query: &ListQuery) -> Paged<T> {
    let limit = query.limit.unwrap_or(MAX_LIMIT).clamp(1, MAX_LIMIT);
    let page = query.page.unwrap_or(1).max(1);
    let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
    let page_count = total.div_ceil(limit).max(1);
    let offset = u64::from(page - 1) * u64::from(limit);
    let data: Vec<T> = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(limit as usize)
        .collect();
    Paged {
        data,
        meta: PageInfo {
            is_first_page: page == 1,
            is_last_page: page >= page_count,
            current_page: page,
            previous_page: (page > 1).then(|| page - 1),
            next_page: (page < page_count).then(|| page.saturating_add(1)),
            page_count,
            total_count: total,
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginView {
    #[serde(flatten)]
    profile: Profile,
    access_token: String,
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterBody>,
) -> MockResult<(StatusCode, Json<Data<Profile>>)> {
    let mut issues = Vec::new();
    let name = input.name.trim();
    if name.is_empty() {
        issues.push(FieldIssue::new("Name is required", "name"));
    } else if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        issues.push(FieldIssue::new(
            "Name can only use letters, numbers and underscores",
            "name",
        ));
    }
    if !input.email.contains('@') {
        issues.push(FieldIssue::new("Email must be a valid email address", "email"));
    }
    if input.password.chars().count() < 8 {
        issues.push(FieldIssue::new(
            "Password must be at least 8 characters",
            "password",
        ));
    }
    if !issues.is_empty() {
        return Err(MockError::Validation(issues));
    }

    let mut store = db.write().await;
    let email_taken = store
        .accounts
        .values()
        .any(|account| account.profile.email.eq_ignore_ascii_case(&input.email));
    if store.accounts.contains_key(name) || email_taken {
        return Err(MockError::Conflict("Profile already exists"));
    }
    let profile = Profile {
        name: name.to_string(),
        email: input.email.clone(),
        bio: input.bio,
        avatar: input.avatar,
        banner: input.banner,
        venue_manager: input.venue_manager,
    };
    store.accounts.insert(
        profile.name.clone(),
        Account {
            profile: profile.clone(),
            password: input.password,
        },
    );
    info!(profile = %profile.name, venue_manager = profile.venue_manager, "registered");
    Ok((StatusCode::CREATED, data(profile)))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginBody>,
) -> MockResult<Json<Data<LoginView>>> {
    let mut store = db.write().await;
    let profile = store
        .accounts
        .values()
        .find(|account| {
            account.profile.email.eq_ignore_ascii_case(&input.email)
                && account.password == input.password
        })
        .map(|account| account.profile.clone())
        .ok_or(MockError::InvalidCredentials)?;
    let token = Uuid::new_v4().to_string();
    store.tokens.insert(token.clone(), profile.name.clone());
    info!(profile = %profile.name, "logged in");
    Ok(data(LoginView {
        profile,
        access_token: token,
    }))
}

async fn me(State(db): State<Db>, Caller(name): Caller) -> MockResult<Json<Data<Profile>>> {
    let store = db.read().await;
    store
        .profile(&name)
        .cloned()
        .map(data)
        .ok_or(MockError::NotFound("No profile with this name"))
}

async fn update_profile(
    State(db): State<Db>,
    Caller(caller): Caller,
    Path(name): Path<String>,
    Json(input): Json<ProfileBody>,
) -> MockResult<Json<Data<Profile>>> {
    let mut store = db.write().await;
    let account = store
        .accounts
        .get_mut(&name)
        .ok_or(MockError::NotFound("No profile with this name"))?;
    if caller != name {
        return Err(MockError::Forbidden("You can only update your own profile"));
    }
    let profile = &mut account.profile;
    if let Some(bio) = input.bio {
        profile.bio = Some(bio);
    }
    if let Some(avatar) = input.avatar {
        profile.avatar = Some(avatar);
    }
    if let Some(banner) = input.banner {
        profile.banner = Some(banner);
    }
    if let Some(venue_manager) = input.venue_manager {
        profile.venue_manager = venue_manager;
    }
    Ok(data(profile.clone()))
}

/// Answers a bare array, unlike the other list endpoints.
async fn profile_venues(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(expand): Query<Expand>,
) -> MockResult<Json<Vec<VenueView>>> {
    let store = db.read().await;
    if store.profile(&name).is_none() {
        return Err(MockError::NotFound("No profile with this name"));
    }
    Ok(Json(
        store
            .venues
            .iter()
            .filter(|venue| venue.owner == name)
            .map(|venue| store.venue_view(venue, expand))
            .collect(),
    ))
}

async fn profile_bookings(
    State(db): State<Db>,
    Caller(_): Caller,
    Path(name): Path<String>,
    Query(expand): Query<Expand>,
) -> MockResult<Json<Data<Vec<BookingView>>>> {
    let store = db.read().await;
    if store.profile(&name).is_none() {
        return Err(MockError::NotFound("No profile with this name"));
    }
    Ok(data(
        store
            .bookings
            .iter()
            .filter(|booking| booking.customer == name)
            .map(|booking| store.booking_view(booking, expand))
            .collect(),
    ))
}

fn sort_venues(venues: &mut [Venue], query: &ListQuery) {
    let field = query.sort.as_deref().unwrap_or("created");
    venues.sort_by(|a, b| match field {
        "name" => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        "price" => a.price.total_cmp(&b.price),
        "maxGuests" => a.max_guests.cmp(&b.max_guests),
        "rating" => a.rating.total_cmp(&b.rating),
        _ => a.created.cmp(&b.created),
    });
    if query.sort_order.as_deref() != Some("asc") {
        venues.reverse();
    }
}

async fn list_venues(
    State(db): State<Db>,
    Query(query): Query<ListQuery>,
    Query(expand): Query<Expand>,
) -> Json<Paged<VenueView>> {
    let store = db.read().await;
    let mut venues = store.venues.clone();
    sort_venues(&mut venues, &query);
    let views = venues
        .iter()
        .map(|venue| store.venue_view(venue, expand))
        .collect();
    Json(paginate(views, &query))
}

async fn search_venues(
    State(db): State<Db>,
    Query(query): Query<SearchQuery>,
) -> Json<Data<Vec<Venue>>> {
    let needle = query.q.trim().to_lowercase();
    let store = db.read().await;
    data(
        store
            .venues
            .iter()
            .filter(|venue| {
                venue.name.to_lowercase().contains(&needle)
                    || venue.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect(),
    )
}

async fn get_venue(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Query(expand): Query<Expand>,
) -> MockResult<Json<Data<VenueView>>> {
    let store = db.read().await;
    let venue = store
        .venue(id)
        .ok_or(MockError::NotFound("No venue with such ID"))?;
    Ok(data(store.venue_view(venue, expand)))
}

/// Check the fields present in `input`; `create` additionally requires the
/// mandatory ones.
fn check_venue(input: &VenueBody, create: bool) -> MockResult<()> {
    let mut issues = Vec::new();
    let blank = |value: &Option<String>| value.as_deref().is_some_and(|v| v.trim().is_empty());
    if blank(&input.name) || (create && input.name.is_none()) {
        issues.push(FieldIssue::new("Name is required", "name"));
    }
    if blank(&input.description) || (create && input.description.is_none()) {
        issues.push(FieldIssue::new("Description is required", "description"));
    }
    match input.price {
        Some(price) if price <= 0.0 => {
            issues.push(FieldIssue::new("Price must be a positive number", "price"))
        }
        None if create => issues.push(FieldIssue::new("Price is required", "price")),
        _ => {}
    }
    match input.max_guests {
        Some(guests) if guests < 1.0 || guests.fract() != 0.0 => issues.push(FieldIssue::new(
            "Max guests must be a positive integer",
            "maxGuests",
        )),
        None if create => issues.push(FieldIssue::new("Max guests is required", "maxGuests")),
        _ => {}
    }
    if input.rating.is_some_and(|rating| !(0.0..=5.0).contains(&rating)) {
        issues.push(FieldIssue::new("Rating must be between 0 and 5", "rating"));
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(MockError::Validation(issues))
    }
}

async fn create_venue(
    State(db): State<Db>,
    Caller(caller): Caller,
    Json(input): Json<VenueBody>,
) -> MockResult<(StatusCode, Json<Data<Venue>>)> {
    let mut store = db.write().await;
    if !store.profile(&caller).is_some_and(|p| p.venue_manager) {
        return Err(MockError::Forbidden("Only venue managers can create venues"));
    }
    check_venue(&input, true)?;
    let now = Utc::now();
    let venue = Venue {
        id: Uuid::new_v4(),
        name: input.name.unwrap_or_default(),
        description: input.description.unwrap_or_default(),
        media: input.media.unwrap_or_default(),
        price: input.price.unwrap_or_default(),
        max_guests: input.max_guests.unwrap_or_default() as u32,
        rating: input.rating.unwrap_or_default(),
        created: now,
        updated: now,
        meta: input.meta.unwrap_or_default(),
        location: input.location.unwrap_or_default(),
        owner: caller,
    };
    store.venues.push(venue.clone());
    info!(venue = %venue.id, owner = %venue.owner, "venue created");
    Ok((StatusCode::CREATED, data(venue)))
}

async fn update_venue(
    State(db): State<Db>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(input): Json<VenueBody>,
) -> MockResult<Json<Data<Venue>>> {
    let mut store = db.write().await;
    let venue = store
        .venues
        .iter_mut()
        .find(|venue| venue.id == id)
        .ok_or(MockError::NotFound("No venue with such ID"))?;
    if venue.owner != caller {
        return Err(MockError::Forbidden("You can only update your own venues"));
    }
    check_venue(&input, false)?;
    if let Some(name) = input.name {
        venue.name = name;
    }
    if let Some(description) = input.description {
        venue.description = description;
    }
    if let Some(price) = input.price {
        venue.price = price;
    }
    if let Some(max_guests) = input.max_guests {
        venue.max_guests = max_guests as u32;
    }
    if let Some(rating) = input.rating {
        venue.rating = rating;
    }
    if let Some(media) = input.media {
        venue.media = media;
    }
    if let Some(meta) = input.meta {
        venue.meta = meta;
    }
    if let Some(location) = input.location {
        venue.location = location;
    }
    venue.updated = Utc::now();
    Ok(data(venue.clone()))
}

async fn delete_venue(
    State(db): State<Db>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> MockResult<StatusCode> {
    let mut store = db.write().await;
    let venue = store
        .venue(id)
        .ok_or(MockError::NotFound("No venue with such ID"))?;
    if venue.owner != caller {
        return Err(MockError::Forbidden("You can only delete your own venues"));
    }
    store.venues.retain(|venue| venue.id != id);
    store.bookings.retain(|booking| booking.venue_id != id);
    info!(venue = %id, "venue deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_bookings(
    State(db): State<Db>,
    Caller(_): Caller,
    Query(expand): Query<Expand>,
) -> Json<Data<Vec<BookingView>>> {
    let store = db.read().await;
    data(
        store
            .bookings
            .iter()
            .map(|booking| store.booking_view(booking, expand))
            .collect(),
    )
}

async fn get_booking(
    State(db): State<Db>,
    Caller(_): Caller,
    Path(id): Path<Uuid>,
    Query(expand): Query<Expand>,
) -> MockResult<Json<Data<BookingView>>> {
    let store = db.read().await;
    let booking = store
        .booking(id)
        .ok_or(MockError::NotFound("No booking with such ID"))?;
    Ok(data(store.booking_view(booking, expand)))
}

/// Validate a stay against its venue and the venue's other bookings.
fn check_stay(store: &Store, stay: &Booking) -> MockResult<()> {
    let venue = store
        .venue(stay.venue_id)
        .ok_or(MockError::NotFound("No venue with such ID"))?;
    let mut issues = Vec::new();
    if stay.date_to < stay.date_from {
        issues.push(FieldIssue::new("dateTo must be after dateFrom", "dateTo"));
    }
    if stay.guests < 1 || stay.guests > venue.max_guests {
        issues.push(FieldIssue::new(
            "Guests must be between 1 and the venue's maximum",
            "guests",
        ));
    }
    if !issues.is_empty() {
        return Err(MockError::Validation(issues));
    }
    let overlaps = store.bookings.iter().any(|other| {
        other.id != stay.id
            && other.venue_id == stay.venue_id
            && other.date_from < stay.date_to
            && stay.date_from < other.date_to
    });
    if overlaps {
        return Err(MockError::Conflict(
            "The venue is already booked for the selected dates",
        ));
    }
    Ok(())
}

fn required_instant(
    value: Option<&str>,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<DateTime<Utc>> {
    let instant = value.and_then(parse_instant);
    if instant.is_none() {
        issues.push(FieldIssue::new("A valid date is required", path));
    }
    instant
}

async fn create_booking(
    State(db): State<Db>,
    Caller(caller): Caller,
    Json(input): Json<BookingBody>,
) -> MockResult<(StatusCode, Json<Data<Booking>>)> {
    let mut issues = Vec::new();
    let date_from = required_instant(input.date_from.as_deref(), "dateFrom", &mut issues);
    let date_to = required_instant(input.date_to.as_deref(), "dateTo", &mut issues);
    if input.venue_id.is_none() {
        issues.push(FieldIssue::new("Venue ID is required", "venueId"));
    }
    if input.guests.is_none() {
        issues.push(FieldIssue::new("Guests is required", "guests"));
    }
    let (Some(date_from), Some(date_to), Some(venue_id), Some(guests)) =
        (date_from, date_to, input.venue_id, input.guests)
    else {
        return Err(MockError::Validation(issues));
    };

    let mut store = db.write().await;
    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        date_from,
        date_to,
        guests,
        created: now,
        updated: now,
        venue_id,
        customer: caller,
    };
    check_stay(&store, &booking)?;
    store.bookings.push(booking.clone());
    info!(booking = %booking.id, venue = %venue_id, "booking created");
    Ok((StatusCode::CREATED, data(booking)))
}

async fn update_booking(
    State(db): State<Db>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(input): Json<BookingBody>,
) -> MockResult<Json<Data<Booking>>> {
    let mut store = db.write().await;
    let mut booking = store
        .booking(id)
        .cloned()
        .ok_or(MockError::NotFound("No booking with such ID"))?;
    if booking.customer != caller {
        return Err(MockError::Forbidden("You can only update your own bookings"));
    }
    let mut issues = Vec::new();
    if let Some(text) = input.date_from.as_deref() {
        if let Some(date_from) = required_instant(Some(text), "dateFrom", &mut issues) {
            booking.date_from = date_from;
        }
    }
    if let Some(text) = input.date_to.as_deref() {
        if let Some(date_to) = required_instant(Some(text), "dateTo", &mut issues) {
            booking.date_to = date_to;
        }
    }
    if !issues.is_empty() {
        return Err(MockError::Validation(issues));
    }
    if let Some(guests) = input.guests {
        booking.guests = guests;
    }
    check_stay(&store, &booking)?;
    booking.updated = Utc::now();
    if let Some(stored) = store.bookings.iter_mut().find(|b| b.id == id) {
        *stored = booking.clone();
    }
    Ok(data(booking))
}

async fn delete_booking(
    State(db): State<Db>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> MockResult<StatusCode> {
    let mut store = db.write().await;
    let booking = store
        .booking(id)
        .ok_or(MockError::NotFound("No booking with such ID"))?;
    if booking.customer != caller {
        return Err(MockError::Forbidden("You can only delete your own bookings"));
    }
    store.bookings.retain(|booking| booking.id != id);
    info!(booking = %id, "booking deleted");
    Ok(StatusCode::NO_CONTENT)
}
