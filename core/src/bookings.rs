//! Booking endpoints.

use uuid::Uuid;

use crate::client::{check_status, parse_item, parse_list, parse_written, segment, HolidazeClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::types::{Booking, BookingInput, BookingUpdate};

/// Expansion flags sent with every booking list request.
const LIST_EXPANSIONS: [(&str, &str); 2] = [("_customer", "true"), ("_venue", "true")];

impl HolidazeClient {
    /// `GET /bookings` with customer and venue expanded. Caller parameters are
    /// appended; a caller key that repeats an expansion flag replaces it.
    pub fn build_list_bookings(&self, session: &Session, params: &[(&str, String)]) -> HttpRequest {
        let mut query: Vec<(&str, String)> = LIST_EXPANSIONS
            .iter()
            .filter(|(key, _)| !params.iter().any(|(k, _)| k == key))
            .map(|(key, value)| (*key, value.to_string()))
            .collect();
        query.extend(params.iter().cloned());
        self.request(session, HttpMethod::Get, "/bookings", &query, None)
    }

    pub fn parse_list_bookings(&self, response: HttpResponse) -> Result<Vec<Booking>, ApiError> {
        parse_list(&response, "Failed to fetch bookings")
    }

    pub fn build_get_booking(&self, session: &Session, id: Uuid) -> HttpRequest {
        self.request(
            session,
            HttpMethod::Get,
            &format!("/bookings/{id}"),
            &[
                ("_customer", "true".to_string()),
                ("_venue", "true".to_string()),
            ],
            None,
        )
    }

    pub fn parse_get_booking(&self, response: HttpResponse) -> Result<Booking, ApiError> {
        parse_item(&response, "Failed to fetch booking details")
    }

    pub fn build_create_booking(
        &self,
        session: &Session,
        input: &BookingInput,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(session, HttpMethod::Post, "/bookings", input)
    }

    pub fn parse_create_booking(&self, response: HttpResponse) -> Result<Booking, ApiError> {
        parse_written(&response, "Failed to create booking")
    }

    pub fn build_update_booking(
        &self,
        session: &Session,
        id: Uuid,
        update: &BookingUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(session, HttpMethod::Put, &format!("/bookings/{id}"), update)
    }

    pub fn parse_update_booking(&self, response: HttpResponse) -> Result<Booking, ApiError> {
        parse_written(&response, "Failed to update booking")
    }

    pub fn build_delete_booking(&self, session: &Session, id: Uuid) -> HttpRequest {
        self.request(session, HttpMethod::Delete, &format!("/bookings/{id}"), &[], None)
    }

    pub fn parse_delete_booking(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, "Failed to delete booking")
    }

    /// `GET /profiles/{name}/bookings`, with the booked venue expanded.
    pub fn build_list_profile_bookings(&self, session: &Session, profile: &str) -> HttpRequest {
        self.request(
            session,
            HttpMethod::Get,
            &format!("/profiles/{}/bookings", segment(profile)),
            &[("_venue", "true".to_string())],
            None,
        )
    }

    pub fn parse_list_profile_bookings(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Booking>, ApiError> {
        parse_list(&response, "Failed to fetch profile bookings")
    }
}
