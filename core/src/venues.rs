//! Venue endpoints: list, search, detail, create, update, delete and the
//! per-profile venue list.
//!
//! Create and update coerce a [`VenueDraft`] into a [`VenueInput`] first; a
//! draft that fails coercion never becomes an `HttpRequest`.

use uuid::Uuid;

use crate::client::{check_status, parse_item, parse_list, parse_written, segment, HolidazeClient};
use crate::error::ApiError;
use crate::forms::VenueDraft;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize;
use crate::session::Session;
use crate::types::{LocationInput, Page, Venue, VenueInput};

/// Server-side sort keys offered by the listing screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Created,
    Name,
    Price,
    MaxGuests,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Created => "created",
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::MaxGuests => "maxGuests",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query for `GET /venues`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueListParams {
    pub page: u32,
    pub limit: u32,
    pub sort: SortField,
    pub sort_order: SortOrder,
}

impl Default for VenueListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 12,
            sort: SortField::Created,
            sort_order: SortOrder::Desc,
        }
    }
}

const REQUIRED_FIELDS: [&str; 4] = ["name", "description", "price", "maxGuests"];

/// Lenient numeric parse for optional fields: blank or invalid text is 0.
fn number_or_zero(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

fn optional_text(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl VenueInput {
    /// Coerce a form draft into the wire payload.
    ///
    /// Fails when a required field is blank, when the price is not a positive
    /// number, or when max guests is not a positive whole number. Optional
    /// numbers fall back to 0 and the rating is clamped to `0..=5`.
    pub fn from_draft(draft: &VenueDraft) -> Result<Self, ApiError> {
        let values = [
            draft.name.trim(),
            draft.description.trim(),
            draft.price.trim(),
            draft.max_guests.trim(),
        ];
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        let [name, description, price, max_guests] = values;

        let price = price
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price > 0.0)
            .ok_or_else(|| ApiError::validation("Price must be a positive number"))?;

        let max_guests = max_guests
            .parse::<f64>()
            .ok()
            .filter(|guests| *guests >= 1.0 && guests.fract() == 0.0 && *guests <= f64::from(u32::MAX))
            .map(|guests| guests as u32)
            .ok_or_else(|| ApiError::validation("Max guests must be a positive whole number"))?;

        let location = &draft.location;
        let media = draft
            .filled_media()
            .map(|mut media| {
                if media.alt.is_empty() {
                    media.alt = name.to_string();
                }
                media
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            price,
            max_guests,
            rating: number_or_zero(&draft.rating).clamp(0.0, 5.0),
            meta: *draft.meta,
            location: LocationInput {
                address: optional_text(&location.address),
                city: optional_text(&location.city),
                zip: optional_text(&location.zip),
                country: optional_text(&location.country),
                continent: optional_text(&location.continent),
                lat: number_or_zero(&location.lat),
                lng: number_or_zero(&location.lng),
            },
            media,
        })
    }
}

impl HolidazeClient {
    pub fn build_list_venues(&self, session: &Session, params: &VenueListParams) -> HttpRequest {
        self.request(
            session,
            HttpMethod::Get,
            "/venues",
            &[
                ("page", params.page.to_string()),
                ("limit", params.limit.to_string()),
                ("sort", params.sort.as_str().to_string()),
                ("sortOrder", params.sort_order.as_str().to_string()),
            ],
            None,
        )
    }

    pub fn parse_list_venues(&self, response: HttpResponse) -> Result<Page<Venue>, ApiError> {
        check_status(&response, "Failed to fetch venues")?;
        Ok(normalize::page(&response.body))
    }

    pub fn build_get_venue(&self, session: &Session, id: Uuid) -> HttpRequest {
        self.request(
            session,
            HttpMethod::Get,
            &format!("/venues/{id}"),
            &[
                ("_owner", "true".to_string()),
                ("_bookings", "true".to_string()),
                ("_customer", "true".to_string()),
            ],
            None,
        )
    }

    pub fn parse_get_venue(&self, response: HttpResponse) -> Result<Venue, ApiError> {
        parse_item(&response, "Failed to fetch venue details")
    }

    pub fn build_create_venue(
        &self,
        session: &Session,
        draft: &VenueDraft,
    ) -> Result<HttpRequest, ApiError> {
        let input = VenueInput::from_draft(draft)?;
        self.request_with_body(session, HttpMethod::Post, "/venues", &input)
    }

    pub fn parse_create_venue(&self, response: HttpResponse) -> Result<Venue, ApiError> {
        parse_written(
            &response,
            "Failed to create venue. Please check your input and try again.",
        )
    }

    pub fn build_update_venue(
        &self,
        session: &Session,
        id: Uuid,
        draft: &VenueDraft,
    ) -> Result<HttpRequest, ApiError> {
        let input = VenueInput::from_draft(draft)?;
        self.request_with_body(session, HttpMethod::Put, &format!("/venues/{id}"), &input)
    }

    pub fn parse_update_venue(&self, response: HttpResponse) -> Result<Venue, ApiError> {
        parse_written(&response, "Failed to update venue")
    }

    pub fn build_delete_venue(&self, session: &Session, id: Uuid) -> HttpRequest {
        self.request(session, HttpMethod::Delete, &format!("/venues/{id}"), &[], None)
    }

    pub fn parse_delete_venue(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, "Failed to delete venue")
    }

    pub fn build_search_venues(&self, session: &Session, query: &str) -> HttpRequest {
        self.request(
            session,
            HttpMethod::Get,
            "/venues/search",
            &[("q", query.to_string())],
            None,
        )
    }

    pub fn parse_search_venues(&self, response: HttpResponse) -> Result<Vec<Venue>, ApiError> {
        parse_list(&response, "Failed to search venues")
    }

    pub fn build_list_profile_venues(&self, session: &Session, profile: &str) -> HttpRequest {
        self.request(
            session,
            HttpMethod::Get,
            &format!("/profiles/{}/venues", segment(profile)),
            &[],
            None,
        )
    }

    pub fn parse_list_profile_venues(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Venue>, ApiError> {
        parse_list(&response, "Failed to fetch profile venues")
    }
}
