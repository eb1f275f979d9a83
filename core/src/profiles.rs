//! Authentication and profile endpoints.
//!
//! Login is the only call that creates a [`Session`]; the token never leaves
//! the returned value except through [`Session::persist`].

use tracing::{info, warn};

use crate::client::{check_status, parse_item, parse_written, segment, HolidazeClient};
use crate::error::ApiError;
use crate::forms::RegisterDraft;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize;
use crate::session::Session;
use crate::types::{LoginRequest, LoginResponse, Profile, ProfileUpdate};

impl HolidazeClient {
    pub fn build_login(&self, email: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let input = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.request_with_body(&Session::anonymous(), HttpMethod::Post, "/auth/login", &input)
    }

    /// Turn a login response into a new session. A success without an
    /// `accessToken` is treated as a malformed response.
    pub fn parse_login(&self, response: HttpResponse) -> Result<Session, ApiError> {
        check_status(&response, "Login failed")?;
        let login: LoginResponse = normalize::single(&response.body).ok_or_else(|| {
            ApiError::Deserialization("login response has no profile".to_string())
        })?;
        let Some(token) = login.access_token.filter(|token| !token.is_empty()) else {
            warn!("login succeeded without an access token");
            return Err(ApiError::Deserialization(
                "Invalid response format from server".to_string(),
            ));
        };
        info!(profile = %login.profile.name, "logged in");
        Ok(Session::establish(token, login.profile))
    }

    pub fn build_register(&self, draft: &RegisterDraft) -> Result<HttpRequest, ApiError> {
        let input = draft.to_request()?;
        self.request_with_body(
            &Session::anonymous(),
            HttpMethod::Post,
            "/auth/register",
            &input,
        )
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<Profile, ApiError> {
        parse_written(&response, "Registration failed")
    }

    pub fn build_get_me(&self, session: &Session) -> HttpRequest {
        self.request(session, HttpMethod::Get, "/profiles/me", &[], None)
    }

    pub fn parse_get_me(&self, response: HttpResponse) -> Result<Profile, ApiError> {
        parse_item(&response, "Failed to fetch profile")
    }

    pub fn build_update_profile(
        &self,
        session: &Session,
        name: &str,
        update: &ProfileUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(
            session,
            HttpMethod::Put,
            &format!("/profiles/{}", segment(name)),
            update,
        )
    }

    pub fn parse_update_profile(&self, response: HttpResponse) -> Result<Profile, ApiError> {
        parse_written(&response, "Failed to update profile")
    }
}
