//! Executing facade over [`HolidazeClient`] and a [`Transport`].
//!
//! Every method builds the request, sends it once and parses the response.
//! Validation errors surface before the transport is touched.

use uuid::Uuid;

use crate::client::HolidazeClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::forms::{RegisterDraft, VenueDraft};
use crate::listing::{FetchPlan, VenueListing};
use crate::session::{Session, SessionStore};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Booking, BookingInput, BookingUpdate, Page, Profile, ProfileUpdate, Venue};
use crate::venues::VenueListParams;
use crate::Result;

pub struct Holidaze<T: Transport> {
    client: HolidazeClient,
    transport: T,
    config: ClientConfig,
}

impl Holidaze<UreqTransport> {
    /// Validate `config` and pair it with the blocking transport.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> Holidaze<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: HolidazeClient::from_config(&config),
            transport,
            config,
        })
    }

    pub fn client(&self) -> &HolidazeClient {
        &self.client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A listing controller sized from this client's configuration.
    pub fn listing(&self) -> VenueListing {
        VenueListing::from_config(&self.config)
    }

    /// Log in and persist the new session to `store`.
    pub fn login(&self, store: &dyn SessionStore, email: &str, password: &str) -> Result<Session> {
        let response = self.transport.execute(self.client.build_login(email, password)?)?;
        let session = self.client.parse_login(response)?;
        session.persist(store);
        Ok(session)
    }

    pub fn logout(&self, store: &dyn SessionStore, session: Session) -> Session {
        session.end(store)
    }

    pub fn register(&self, draft: &RegisterDraft) -> Result<Profile> {
        let response = self.transport.execute(self.client.build_register(draft)?)?;
        self.client.parse_register(response)
    }

    /// Fetch the signed-in profile and refresh the session's cached copy.
    pub fn me(&self, session: &mut Session, store: &dyn SessionStore) -> Result<Profile> {
        let response = self.transport.execute(self.client.build_get_me(session))?;
        let profile = self.client.parse_get_me(response)?;
        session.update_profile(profile.clone());
        session.persist(store);
        Ok(profile)
    }

    pub fn update_profile(
        &self,
        session: &mut Session,
        store: &dyn SessionStore,
        update: &ProfileUpdate,
    ) -> Result<Profile> {
        let name = session
            .profile()
            .map(|profile| profile.name.clone())
            .ok_or_else(|| ApiError::validation("You must be logged in to edit your profile"))?;
        let request = self.client.build_update_profile(session, &name, update)?;
        let profile = self.client.parse_update_profile(self.transport.execute(request)?)?;
        session.update_profile(profile.clone());
        session.persist(store);
        Ok(profile)
    }

    pub fn list_venues(&self, session: &Session, params: &VenueListParams) -> Result<Page<Venue>> {
        let response = self
            .transport
            .execute(self.client.build_list_venues(session, params))?;
        self.client.parse_list_venues(response)
    }

    pub fn get_venue(&self, session: &Session, id: Uuid) -> Result<Venue> {
        let response = self.transport.execute(self.client.build_get_venue(session, id))?;
        self.client.parse_get_venue(response)
    }

    pub fn create_venue(&self, session: &Session, draft: &VenueDraft) -> Result<Venue> {
        let request = self.client.build_create_venue(session, draft)?;
        self.client.parse_create_venue(self.transport.execute(request)?)
    }

    pub fn update_venue(&self, session: &Session, id: Uuid, draft: &VenueDraft) -> Result<Venue> {
        let request = self.client.build_update_venue(session, id, draft)?;
        self.client.parse_update_venue(self.transport.execute(request)?)
    }

    pub fn delete_venue(&self, session: &Session, id: Uuid) -> Result<()> {
        let response = self.transport.execute(self.client.build_delete_venue(session, id))?;
        self.client.parse_delete_venue(response)
    }

    pub fn search_venues(&self, session: &Session, query: &str) -> Result<Vec<Venue>> {
        let response = self
            .transport
            .execute(self.client.build_search_venues(session, query))?;
        self.client.parse_search_venues(response)
    }

    pub fn list_profile_venues(&self, session: &Session, profile: &str) -> Result<Vec<Venue>> {
        let response = self
            .transport
            .execute(self.client.build_list_profile_venues(session, profile))?;
        self.client.parse_list_profile_venues(response)
    }

    /// Run a listing plan and hand the outcome back to `listing`. Returns
    /// whether the outcome was applied.
    pub fn refresh_listing(
        &self,
        session: &Session,
        listing: &mut VenueListing,
        plan: FetchPlan,
    ) -> bool {
        let outcome = self.list_venues(session, &plan.params);
        listing.settle(plan.token, outcome)
    }

    pub fn list_bookings(
        &self,
        session: &Session,
        params: &[(&str, String)],
    ) -> Result<Vec<Booking>> {
        let response = self
            .transport
            .execute(self.client.build_list_bookings(session, params))?;
        self.client.parse_list_bookings(response)
    }

    pub fn get_booking(&self, session: &Session, id: Uuid) -> Result<Booking> {
        let response = self.transport.execute(self.client.build_get_booking(session, id))?;
        self.client.parse_get_booking(response)
    }

    pub fn create_booking(&self, session: &Session, input: &BookingInput) -> Result<Booking> {
        let request = self.client.build_create_booking(session, input)?;
        self.client.parse_create_booking(self.transport.execute(request)?)
    }

    pub fn update_booking(
        &self,
        session: &Session,
        id: Uuid,
        update: &BookingUpdate,
    ) -> Result<Booking> {
        let request = self.client.build_update_booking(session, id, update)?;
        self.client.parse_update_booking(self.transport.execute(request)?)
    }

    pub fn delete_booking(&self, session: &Session, id: Uuid) -> Result<()> {
        let response = self
            .transport
            .execute(self.client.build_delete_booking(session, id))?;
        self.client.parse_delete_booking(response)
    }

    pub fn list_profile_bookings(&self, session: &Session, profile: &str) -> Result<Vec<Booking>> {
        let response = self
            .transport
            .execute(self.client.build_list_profile_bookings(session, profile))?;
        self.client.parse_list_profile_bookings(response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::session::MemoryStore;

    /// Records requests and answers each with the next canned response.
    struct Canned {
        sent: RefCell<Vec<HttpRequest>>,
        replies: RefCell<Vec<HttpResponse>>,
    }

    impl Canned {
        fn new(replies: Vec<(u16, &str)>) -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                replies: RefCell::new(
                    replies
                        .into_iter()
                        .rev()
                        .map(|(status, body)| HttpResponse {
                            status,
                            headers: Vec::new(),
                            body: body.to_string(),
                        })
                        .collect(),
                ),
            }
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.sent.borrow_mut().push(request);
            self.replies
                .borrow_mut()
                .pop()
                .ok_or_else(|| ApiError::Transport("no reply".to_string()))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:3000", "key")
    }

    #[test]
    fn missing_api_key_is_rejected_up_front() {
        let result = Holidaze::with_transport(
            ClientConfig::new("http://localhost:3000", ""),
            Canned::new(vec![]),
        );
        assert!(matches!(result, Err(ApiError::Config { .. })));
    }

    #[test]
    fn login_then_list_sends_bearer_token() {
        let transport = Canned::new(vec![
            (200, r#"{"data":{"name":"kari","email":"k@x.no","accessToken":"tok"}}"#),
            (200, r#"{"data":[],"meta":{"currentPage":1,"pageCount":1,"totalCount":0}}"#),
        ]);
        let api = Holidaze::with_transport(config(), &transport).unwrap();
        let store = MemoryStore::default();

        let session = api.login(&store, "k@x.no", "pw").unwrap();
        assert_eq!(store.get(crate::session::TOKEN_KEY).as_deref(), Some("tok"));
        assert!(store.get(crate::session::PROFILE_KEY).is_some());

        api.list_venues(&session, &VenueListParams::default()).unwrap();
        let sent = transport.sent.borrow();
        assert_eq!(sent[1].header("Authorization"), Some("Bearer tok"));
    }

    #[test]
    fn invalid_venue_never_reaches_transport() {
        let transport = Canned::new(vec![]);
        let api = Holidaze::with_transport(config(), &transport).unwrap();
        let draft = VenueDraft {
            name: "Cabin".to_string(),
            description: "Quiet cabin".to_string(),
            price: "0".to_string(),
            max_guests: "2".to_string(),
            ..VenueDraft::default()
        };
        let err = api.create_venue(&Session::anonymous(), &draft).unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn update_profile_requires_signed_in_profile() {
        let transport = Canned::new(vec![]);
        let api = Holidaze::with_transport(config(), &transport).unwrap();
        let mut session = Session::anonymous();
        let err = api
            .update_profile(&mut session, &MemoryStore::default(), &ProfileUpdate::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[test]
    fn refresh_listing_applies_outcome() {
        let transport = Canned::new(vec![(
            200,
            r#"[{"id":"00000000-0000-0000-0000-000000000001","name":"Cabin","price":90,"maxGuests":2}]"#,
        )]);
        let api = Holidaze::with_transport(config(), &transport).unwrap();
        let mut listing = api.listing();
        let plan = listing.load();
        assert!(api.refresh_listing(&Session::anonymous(), &mut listing, plan));
        assert_eq!(listing.results().len(), 1);
        assert_eq!(listing.total_pages(), 1);
    }

    #[test]
    fn transport_failure_keeps_listing_results() {
        let transport = Canned::new(vec![(
            200,
            r#"[{"id":"00000000-0000-0000-0000-000000000001","name":"Cabin","price":90,"maxGuests":2}]"#,
        )]);
        let api = Holidaze::with_transport(config(), &transport).unwrap();
        let mut listing = api.listing();
        let plan = listing.load();
        api.refresh_listing(&Session::anonymous(), &mut listing, plan);

        let plan = listing.load();
        assert!(api.refresh_listing(&Session::anonymous(), &mut listing, plan));
        assert_eq!(listing.results().len(), 1);
        assert_eq!(listing.message(), Some("No response received from server"));
    }
}
