//! Client core for the Holidaze venue-booking API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! venue, booking, profile and auth endpoints, and holds the client-side state
//! of the listing screen and the edit forms. The core never needs the network:
//! a host can execute requests itself, or use [`Holidaze`] with the bundled
//! [`UreqTransport`].
//!
//! # Design
//! - `HolidazeClient` is stateless. Each operation is a `build_*` / `parse_*`
//!   pair, so the I/O boundary is explicit and testable without a server.
//! - The caller's [`Session`] is passed into every request builder; the
//!   bearer token is never looked up from shared state.
//! - Response bodies go through [`normalize`] once, at the boundary, so bare
//!   and `{data: ...}` envelopes produce the same typed values.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod bookings;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod listing;
pub mod normalize;
pub mod profiles;
pub mod session;
pub mod transport;
pub mod types;
pub mod venues;

pub use api::Holidaze;
pub use client::HolidazeClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use forms::{BookingDraft, FieldValue, FormError, ProfileDraft, RegisterDraft, VenueDraft};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use listing::{FetchPlan, Filters, ListingMode, ListingStatus, VenueListing};
pub use session::{MemoryStore, Session, SessionStore};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Amenity, Booking, BookingInput, BookingUpdate, Media, Page, PageMeta, Profile, ProfileUpdate,
    Venue, VenueInput, VenueLocation, VenueMeta,
};
pub use venues::{SortField, SortOrder, VenueListParams};

pub type Result<T> = std::result::Result<T, ApiError>;
