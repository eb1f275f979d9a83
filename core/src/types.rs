//! Domain DTOs for the Holidaze API.
//!
//! # Design
//! These types mirror the upstream wire schema (camelCase) but are defined
//! independently from the mock-server crate; integration tests catch schema
//! drift. Optional server fields default instead of failing, so a sparse venue
//! still deserializes, while `id`, `name`, `price` and `maxGuests` stay
//! required: a body missing those is treated as an unrecognized shape by the
//! normalizer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An image reference. Older API versions sent media as bare URL strings;
/// both forms deserialize into this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "MediaRepr")]
pub struct Media {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alt: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MediaRepr {
    Url(String),
    Full {
        url: String,
        #[serde(default)]
        alt: Option<String>,
    },
}

impl From<MediaRepr> for Media {
    fn from(repr: MediaRepr) -> Self {
        match repr {
            MediaRepr::Url(url) => Media {
                url,
                alt: String::new(),
            },
            MediaRepr::Full { url, alt } => Media {
                url,
                alt: alt.unwrap_or_default(),
            },
        }
    }
}

/// Amenity flags offered by a venue.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VenueMeta {
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub pets: bool,
}

/// One of the four amenity flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Amenity {
    Wifi,
    Parking,
    Breakfast,
    Pets,
}

impl Amenity {
    pub const ALL: [Amenity; 4] = [
        Amenity::Wifi,
        Amenity::Parking,
        Amenity::Breakfast,
        Amenity::Pets,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wifi" => Some(Amenity::Wifi),
            "parking" => Some(Amenity::Parking),
            "breakfast" => Some(Amenity::Breakfast),
            "pets" => Some(Amenity::Pets),
            _ => None,
        }
    }
}

impl VenueMeta {
    pub fn has(&self, amenity: Amenity) -> bool {
        match amenity {
            Amenity::Wifi => self.wifi,
            Amenity::Parking => self.parking,
            Amenity::Breakfast => self.breakfast,
            Amenity::Pets => self.pets,
        }
    }

    #[must_use]
    pub fn with(mut self, amenity: Amenity, enabled: bool) -> Self {
        match amenity {
            Amenity::Wifi => self.wifi = enabled,
            Amenity::Parking => self.parking = enabled,
            Amenity::Breakfast => self.breakfast = enabled,
            Amenity::Pets => self.pets = enabled,
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VenueLocation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

/// A user profile. `name` is unique and doubles as the API path key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
    #[serde(default)]
    pub venue_manager: bool,
}

/// A bookable venue as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub max_guests: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub meta: VenueMeta,
    #[serde(default)]
    pub location: VenueLocation,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<Booking>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Venue {
    /// Embedded bookings starting at or after `now`, earliest first.
    pub fn upcoming_bookings(&self, now: DateTime<Utc>) -> Vec<&Booking> {
        let mut upcoming: Vec<&Booking> = self
            .bookings
            .iter()
            .flatten()
            .filter(|booking| booking.date_from >= now)
            .collect();
        upcoming.sort_by_key(|booking| booking.date_from);
        upcoming
    }

    /// True when `profile` is a venue manager and owns this venue.
    pub fn is_managed_by(&self, profile: &Profile) -> bool {
        profile.venue_manager
            && self
                .owner
                .as_ref()
                .is_some_and(|owner| owner.name == profile.name)
    }
}

/// A reservation of a venue by a customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub guests: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// Pagination metadata in the client's canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u32,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Request payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`: the profile plus its bearer token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Request payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
    pub venue_manager: bool,
}

/// Request payload for `PUT /profiles/{name}`. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_manager: Option<bool>,
}

/// Location block of a venue payload; empty strings never reach the wire.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LocationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Coerced payload for `POST /venues` and `PUT /venues/{id}`.
///
/// Only [`crate::venues::VenueInput::from_draft`] builds these, so a value of
/// this type has already passed local validation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VenueInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub max_guests: u32,
    pub rating: f64,
    pub meta: VenueMeta,
    pub location: LocationInput,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Media>,
}

/// Request payload for `POST /bookings`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub guests: u32,
    pub venue_id: Uuid,
}

/// Request payload for `PUT /bookings/{id}`. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
}
