//! Wire and storage types of the mock Holidaze API.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub pets: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
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

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default)]
    pub banner: Option<Media>,
    #[serde(default)]
    pub venue_manager: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub media: Vec<Media>,
    pub price: f64,
    pub max_guests: u32,
    pub rating: f64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub meta: Meta,
    pub location: Location,
    /// Name of the owning profile.
    #[serde(skip)]
    pub owner: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub guests: u32,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(skip)]
    pub venue_id: Uuid,
    #[serde(skip)]
    pub customer: String,
}

/// A venue as returned by the API, with the requested expansions.
#[derive(Serialize)]
pub struct VenueView {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<BookingView>>,
}

#[derive(Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Profile>,
}

/// A registered profile together with its password.
#[derive(Clone, Debug)]
pub struct Account {
    pub profile: Profile,
    pub password: String,
}

/// Everything the mock server keeps in memory.
#[derive(Debug, Default)]
pub struct Store {
    pub accounts: HashMap<String, Account>,
    /// Access token to profile name.
    pub tokens: HashMap<String, String>,
    pub venues: Vec<Venue>,
    pub bookings: Vec<Booking>,
}

impl Store {
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.accounts.get(name).map(|account| &account.profile)
    }

    pub fn venue(&self, id: Uuid) -> Option<&Venue> {
        self.venues.iter().find(|venue| venue.id == id)
    }

    pub fn booking(&self, id: Uuid) -> Option<&Booking> {
        self.bookings.iter().find(|booking| booking.id == id)
    }

    pub fn venue_view(&self, venue: &Venue, expand: Expand) -> VenueView {
        VenueView {
            venue: venue.clone(),
            owner: expand
                .owner
                .then(|| self.profile(&venue.owner).cloned())
                .flatten(),
            bookings: expand.bookings.then(|| {
                self.bookings
                    .iter()
                    .filter(|booking| booking.venue_id == venue.id)
                    .map(|booking| {
                        self.booking_view(
                            booking,
                            Expand {
                                customer: expand.customer,
                                ..Expand::default()
                            },
                        )
                    })
                    .collect()
            }),
        }
    }

    pub fn booking_view(&self, booking: &Booking, expand: Expand) -> BookingView {
        BookingView {
            booking: booking.clone(),
            venue: expand
                .venue
                .then(|| self.venue(booking.venue_id).cloned())
                .flatten(),
            customer: expand
                .customer
                .then(|| self.profile(&booking.customer).cloned())
                .flatten(),
        }
    }
}

/// The `_owner`, `_bookings`, `_customer` and `_venue` query flags.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Expand {
    #[serde(default, rename = "_owner")]
    pub owner: bool,
    #[serde(default, rename = "_bookings")]
    pub bookings: bool,
    #[serde(default, rename = "_customer")]
    pub customer: bool,
    #[serde(default, rename = "_venue")]
    pub venue: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub bio: Option<String>,
    pub avatar: Option<Media>,
    pub banner: Option<Media>,
    #[serde(default)]
    pub venue_manager: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    pub bio: Option<String>,
    pub avatar: Option<Media>,
    pub banner: Option<Media>,
    pub venue_manager: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub max_guests: Option<f64>,
    pub rating: Option<f64>,
    pub media: Option<Vec<Media>>,
    pub meta: Option<Meta>,
    pub location: Option<Location>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingBody {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub guests: Option<u32>,
    pub venue_id: Option<Uuid>,
}

/// Accept either a full timestamp or a plain calendar date (midnight UTC).
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
