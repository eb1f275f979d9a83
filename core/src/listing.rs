//! State holder behind the venue listing screen.
//!
//! # Design
//! `VenueListing` never performs I/O. Every user action that needs data
//! returns a [`FetchPlan`]; the host executes it (see
//! [`crate::Holidaze::refresh_listing`]) and hands the outcome back together
//! with the plan's [`RequestToken`]. Only the most recently issued token is
//! accepted, so a slow response for page 2 cannot overwrite page 3.
//!
//! Two retrieval modes exist. Paged mode asks the server for one page at a
//! time and trusts its page count. Search mode fetches one large batch and
//! matches the query against name and description locally; the page count is
//! then derived from the number of matches.
//!
//! Page and sort changes are only requested by a plan. They become the
//! listing's own page and sort once that plan's response is applied, so a
//! failed fetch leaves the previous page, sort and results together.
//!
//! Filters only narrow what [`VenueListing::visible`] returns from the held
//! results and never cause a fetch.

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::forms::{expect_checked, expect_text, FieldValue, FormError};
use crate::types::{Amenity, Page, Venue, VenueMeta};
use crate::venues::{SortField, SortOrder, VenueListParams};

pub const NO_MATCHES_MESSAGE: &str = "No venues found matching your search.";
const SEARCH_FAILED_MESSAGE: &str = "Failed to search venues. Please try again.";

/// Identifies one issued fetch. Tokens increase monotonically per listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKind {
    Paged,
    Search { query: String },
}

/// A fetch the host should run, always `GET /venues` with `params`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub token: RequestToken,
    pub params: VenueListParams,
    pub kind: FetchKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListingMode {
    #[default]
    Paged,
    Search(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListingStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
    NoMatches,
}

/// Client-side filters. A ceiling or minimum of 0 counts as unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters {
    pub price_ceiling: Option<u32>,
    pub min_guests: Option<u32>,
    pub amenities: VenueMeta,
}

impl Filters {
    pub fn is_active(&self) -> bool {
        active(self.price_ceiling).is_some()
            || active(self.min_guests).is_some()
            || Amenity::ALL.iter().any(|a| self.amenities.has(*a))
    }

    /// Price ceiling first, then minimum guests, then every selected amenity.
    pub fn matches(&self, venue: &Venue) -> bool {
        if let Some(ceiling) = active(self.price_ceiling) {
            if venue.price > f64::from(ceiling) {
                return false;
            }
        }
        if let Some(min_guests) = active(self.min_guests) {
            if venue.max_guests < min_guests {
                return false;
            }
        }
        Amenity::ALL
            .iter()
            .filter(|amenity| self.amenities.has(**amenity))
            .all(|amenity| venue.meta.has(*amenity))
    }
}

fn active(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

/// Read a numeric filter input: blank is unset, anything else is the leading
/// integer of the text, with negatives and garbage reading as 0.
pub fn parse_filter_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (negative, digits) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if negative || digits.is_empty() {
        return Some(0);
    }
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

fn matches_query(venue: &Venue, needle: &str) -> bool {
    venue.name.to_lowercase().contains(needle) || venue.description.to_lowercase().contains(needle)
}

#[derive(Debug, Clone)]
pub struct VenueListing {
    results: Vec<Venue>,
    page: u32,
    page_size: u32,
    total_pages: u32,
    total_items: u32,
    sort: SortField,
    sort_order: SortOrder,
    filters: Filters,
    mode: ListingMode,
    status: ListingStatus,
    search_batch_size: u32,
    issued: u64,
    pending: Option<FetchPlan>,
}

impl Default for VenueListing {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl VenueListing {
    pub fn new(page_size: u32, search_batch_size: u32) -> Self {
        Self {
            results: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            total_pages: 1,
            total_items: 0,
            sort: SortField::default(),
            sort_order: SortOrder::default(),
            filters: Filters::default(),
            mode: ListingMode::Paged,
            status: ListingStatus::Idle,
            search_batch_size: search_batch_size.max(1),
            issued: 0,
            pending: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.page_size, config.search_batch_size)
    }

    pub fn results(&self) -> &[Venue] {
        &self.results
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    pub fn sort(&self) -> SortField {
        self.sort
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn mode(&self) -> &ListingMode {
        &self.mode
    }

    pub fn status(&self) -> &ListingStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListingStatus::Loading
    }

    /// Banner text for the current status, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            ListingStatus::Failed(message) => Some(message),
            ListingStatus::NoMatches => Some(NO_MATCHES_MESSAGE),
            _ => None,
        }
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    fn issue(&mut self, params: VenueListParams, kind: FetchKind) -> FetchPlan {
        self.issued += 1;
        self.status = ListingStatus::Loading;
        let token = RequestToken(self.issued);
        debug!(token = token.0, page = params.page, ?kind, "listing fetch issued");
        let plan = FetchPlan {
            token,
            params,
            kind,
        };
        self.pending = Some(plan.clone());
        plan
    }

    /// Paged parameters the next plan starts from: those of the paged fetch
    /// still in flight, else the applied page and sort.
    fn requested(&self) -> VenueListParams {
        match &self.pending {
            Some(plan) if plan.kind == FetchKind::Paged => plan.params,
            _ => VenueListParams {
                page: self.page,
                limit: self.page_size,
                sort: self.sort,
                sort_order: self.sort_order,
            },
        }
    }

    fn paged_plan(&mut self, params: VenueListParams) -> FetchPlan {
        self.issue(params, FetchKind::Paged)
    }

    /// Fetch the current page in paged mode.
    pub fn load(&mut self) -> FetchPlan {
        let params = self.requested();
        self.paged_plan(params)
    }

    /// Start a search. A blank query falls back to the current page.
    pub fn search(&mut self, query: &str) -> FetchPlan {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.load();
        }
        let params = VenueListParams {
            page: 1,
            limit: self.search_batch_size,
            ..VenueListParams::default()
        };
        self.issue(params, FetchKind::Search { query })
    }

    /// Move to `page`. Out of range or unchanged pages do nothing.
    pub fn go_to_page(&mut self, page: u32) -> Option<FetchPlan> {
        let requested = self.requested();
        if page < 1 || page > self.total_pages || page == requested.page {
            return None;
        }
        Some(self.paged_plan(VenueListParams { page, ..requested }))
    }

    pub fn next_page(&mut self) -> Option<FetchPlan> {
        self.go_to_page(self.requested().page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Option<FetchPlan> {
        self.go_to_page(self.requested().page.saturating_sub(1))
    }

    pub fn set_sort(&mut self, sort: SortField) -> Option<FetchPlan> {
        let requested = self.requested();
        if sort == requested.sort {
            return None;
        }
        Some(self.paged_plan(VenueListParams { sort, ..requested }))
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) -> Option<FetchPlan> {
        let requested = self.requested();
        if sort_order == requested.sort_order {
            return None;
        }
        Some(self.paged_plan(VenueListParams {
            sort_order,
            ..requested
        }))
    }

    fn accept(&mut self, token: RequestToken) -> Option<FetchPlan> {
        if token.0 != self.issued {
            warn!(token = token.0, latest = self.issued, "ignoring stale listing response");
            return None;
        }
        self.pending.take()
    }

    /// Apply a successful fetch. Returns false when the token is stale.
    pub fn apply_page(&mut self, token: RequestToken, page: Page<Venue>) -> bool {
        let Some(plan) = self.accept(token) else {
            return false;
        };
        match plan.kind {
            FetchKind::Paged => {
                self.mode = ListingMode::Paged;
                self.page = plan.params.page;
                self.sort = plan.params.sort;
                self.sort_order = plan.params.sort_order;
                self.total_pages = page.meta.total_pages.max(1);
                self.total_items = page.meta.total_items;
                self.results = page.items;
                self.status = ListingStatus::Ready;
            }
            FetchKind::Search { query } => {
                let matches: Vec<Venue> = page
                    .items
                    .into_iter()
                    .filter(|venue| matches_query(venue, &query))
                    .collect();
                let count = u32::try_from(matches.len()).unwrap_or(u32::MAX);
                self.page = 1;
                self.total_items = count;
                self.total_pages = count.div_ceil(self.page_size).max(1);
                self.status = if matches.is_empty() {
                    ListingStatus::NoMatches
                } else {
                    ListingStatus::Ready
                };
                self.results = matches;
                self.mode = ListingMode::Search(query);
            }
        }
        true
    }

    /// Record a failed fetch. Held results stay as they were.
    pub fn apply_error(&mut self, token: RequestToken, error: &ApiError) -> bool {
        let Some(plan) = self.accept(token) else {
            return false;
        };
        let message = match plan.kind {
            FetchKind::Paged => error.user_message(),
            FetchKind::Search { .. } => SEARCH_FAILED_MESSAGE.to_string(),
        };
        warn!(%error, "listing fetch failed");
        self.status = ListingStatus::Failed(message);
        true
    }

    pub fn settle(&mut self, token: RequestToken, outcome: Result<Page<Venue>, ApiError>) -> bool {
        match outcome {
            Ok(page) => self.apply_page(token, page),
            Err(error) => self.apply_error(token, &error),
        }
    }

    pub fn set_price_ceiling(&mut self, ceiling: Option<u32>) {
        self.filters.price_ceiling = ceiling;
    }

    pub fn set_min_guests(&mut self, min_guests: Option<u32>) {
        self.filters.min_guests = min_guests;
    }

    pub fn set_amenity(&mut self, amenity: Amenity, enabled: bool) {
        self.filters.amenities = self.filters.amenities.with(amenity, enabled);
    }

    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
    }

    /// Update a filter from a form input: `price` and `guests` take text,
    /// amenity names take a checkbox state.
    pub fn set_filter(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        match name {
            "price" => self.set_price_ceiling(parse_filter_number(&expect_text(name, value)?)),
            "guests" => self.set_min_guests(parse_filter_number(&expect_text(name, value)?)),
            _ => {
                let amenity = Amenity::from_name(name)
                    .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
                self.set_amenity(amenity, expect_checked(name, value)?);
            }
        }
        Ok(())
    }

    /// The held results that pass the current filters, in server order.
    pub fn visible(&self) -> Vec<&Venue> {
        self.results
            .iter()
            .filter(|venue| self.filters.matches(venue))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::types::PageMeta;

    fn venue(name: &str, price: f64, max_guests: u32, meta: VenueMeta) -> Venue {
        Venue {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            max_guests,
            rating: 0.0,
            meta,
            location: Default::default(),
            media: Vec::new(),
            owner: None,
            bookings: None,
            created: None,
            updated: None,
        }
    }

    fn plain(name: &str) -> Venue {
        venue(name, 100.0, 2, VenueMeta::default())
    }

    fn page(items: Vec<Venue>, total_pages: u32) -> Page<Venue> {
        let total_items = items.len() as u32;
        Page {
            items,
            meta: PageMeta {
                current_page: 1,
                total_pages,
                total_items,
            },
        }
    }

    fn wifi() -> VenueMeta {
        VenueMeta::default().with(Amenity::Wifi, true)
    }

    #[test]
    fn load_requests_current_page_with_sorting() {
        let mut listing = VenueListing::default();
        let plan = listing.load();
        assert_eq!(plan.params, VenueListParams::default());
        assert_eq!(plan.kind, FetchKind::Paged);
        assert!(listing.is_loading());
    }

    #[test]
    fn paged_response_takes_server_page_count() {
        let mut listing = VenueListing::default();
        let plan = listing.load();
        assert!(listing.apply_page(plan.token, page(vec![plain("A")], 7)));
        assert_eq!(listing.total_pages(), 7);
        assert_eq!(listing.status(), &ListingStatus::Ready);
        assert_eq!(listing.results().len(), 1);
    }

    #[test]
    fn search_of_25_matches_yields_3_pages_and_page_4_is_a_noop() {
        let mut listing = VenueListing::new(12, 100);
        let plan = listing.search("  Cabin ");
        assert_eq!(plan.params.limit, 100);
        assert_eq!(plan.params.page, 1);
        assert_eq!(
            plan.kind,
            FetchKind::Search {
                query: "cabin".to_string()
            }
        );

        let mut batch: Vec<Venue> = (0..25).map(|i| plain(&format!("Cabin {i}"))).collect();
        batch.extend((0..10).map(|i| plain(&format!("Loft {i}"))));
        assert!(listing.apply_page(plan.token, page(batch, 1)));

        assert_eq!(listing.total_pages(), 3);
        assert_eq!(listing.total_items(), 25);
        assert_eq!(listing.results().len(), 25);
        assert_eq!(listing.mode(), &ListingMode::Search("cabin".to_string()));
        assert!(listing.go_to_page(4).is_none());
        assert_eq!(listing.page(), 1);
    }

    #[test]
    fn search_matches_description_case_insensitively() {
        let mut listing = VenueListing::default();
        let plan = listing.search("SAUNA");
        let mut with_sauna = plain("Lake house");
        with_sauna.description = "Has a wood-fired Sauna".to_string();
        listing.apply_page(plan.token, page(vec![with_sauna, plain("Flat")], 1));
        assert_eq!(listing.results().len(), 1);
        assert_eq!(listing.results()[0].name, "Lake house");
    }

    #[test]
    fn empty_search_reports_no_matches() {
        let mut listing = VenueListing::default();
        let plan = listing.search("castle");
        listing.apply_page(plan.token, page(vec![plain("Flat")], 1));
        assert_eq!(listing.status(), &ListingStatus::NoMatches);
        assert_eq!(listing.message(), Some(NO_MATCHES_MESSAGE));
        assert!(listing.results().is_empty());
    }

    #[test]
    fn blank_search_falls_back_to_paged_fetch() {
        let mut listing = VenueListing::default();
        let plan = listing.search("   ");
        assert_eq!(plan.kind, FetchKind::Paged);
        assert_eq!(plan.params.limit, 12);
    }

    #[test]
    fn page_change_leaves_search_mode() {
        let mut listing = VenueListing::new(12, 100);
        let plan = listing.search("cabin");
        let batch = (0..13).map(|i| plain(&format!("Cabin {i}"))).collect();
        listing.apply_page(plan.token, page(batch, 1));

        let plan = listing.go_to_page(2).unwrap();
        assert_eq!(plan.kind, FetchKind::Paged);
        assert_eq!(plan.params.page, 2);
        assert_eq!(plan.params.limit, 12);
        listing.apply_page(plan.token, page(vec![plain("Loft")], 4));
        assert_eq!(listing.mode(), &ListingMode::Paged);
        assert_eq!(listing.total_pages(), 4);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut listing = VenueListing::default();
        let plan = listing.load();
        listing.apply_page(plan.token, page(vec![plain("A")], 2));

        assert!(listing.previous_page().is_none());
        assert!(listing.go_to_page(0).is_none());
        assert!(listing.go_to_page(1).is_none());
        let plan = listing.next_page().unwrap();
        assert_eq!(plan.params.page, 2);
        listing.apply_page(plan.token, page(vec![plain("B")], 2));
        assert!(listing.next_page().is_none());
        assert!(listing.previous_page().is_some());
    }

    #[test]
    fn sort_changes_trigger_paged_fetch_only_when_changed() {
        let mut listing = VenueListing::default();
        assert!(listing.set_sort(SortField::Created).is_none());
        let plan = listing.set_sort(SortField::Price).unwrap();
        assert_eq!(plan.params.sort, SortField::Price);
        let plan = listing.set_sort_order(SortOrder::Asc).unwrap();
        assert_eq!(plan.params.sort_order, SortOrder::Asc);
        assert!(listing.set_sort_order(SortOrder::Asc).is_none());
    }

    #[test]
    fn stale_responses_are_ignored() {
        let mut listing = VenueListing::default();
        let first = listing.load();
        let second = listing.set_sort(SortField::Name).unwrap();
        assert!(first.token < second.token);

        assert!(listing.apply_page(second.token, page(vec![plain("Fresh")], 1)));
        assert!(!listing.apply_page(first.token, page(vec![plain("Stale")], 9)));
        assert_eq!(listing.results()[0].name, "Fresh");
        assert_eq!(listing.total_pages(), 1);
    }

    #[test]
    fn a_response_is_applied_only_once() {
        let mut listing = VenueListing::default();
        let plan = listing.load();
        assert!(listing.apply_page(plan.token, page(vec![plain("A")], 1)));
        assert!(!listing.apply_error(plan.token, &ApiError::NotFound));
        assert_eq!(listing.status(), &ListingStatus::Ready);
    }

    #[test]
    fn failure_keeps_previous_results() {
        let mut listing = VenueListing::default();
        let plan = listing.load();
        listing.apply_page(plan.token, page(vec![plain("Kept")], 1));

        let plan = listing.load();
        listing.settle(plan.token, Err(ApiError::Transport("refused".to_string())));
        assert_eq!(listing.results()[0].name, "Kept");
        assert_eq!(listing.message(), Some("No response received from server"));
    }

    #[test]
    fn failed_page_change_keeps_page_and_can_be_retried() {
        let mut listing = VenueListing::default();
        let plan = listing.load();
        listing.apply_page(plan.token, page(vec![plain("Page one")], 3));

        let plan = listing.go_to_page(2).unwrap();
        assert_eq!(listing.page(), 1);
        listing.apply_error(plan.token, &ApiError::Transport("refused".to_string()));
        assert_eq!(listing.page(), 1);
        assert_eq!(listing.results()[0].name, "Page one");
        assert!(!listing.has_previous_page());

        assert_eq!(listing.next_page().map(|plan| plan.params.page), Some(2));
        let retry = listing.go_to_page(2).unwrap();
        assert_eq!(retry.params.page, 2);
        listing.apply_page(retry.token, page(vec![plain("Page two")], 3));
        assert_eq!(listing.page(), 2);
        assert_eq!(listing.results()[0].name, "Page two");
    }

    #[test]
    fn failed_sort_change_keeps_previous_sort() {
        let mut listing = VenueListing::default();
        listing.set_sort(SortField::Price).unwrap();
        let plan = listing.set_sort_order(SortOrder::Asc).unwrap();
        assert_eq!(plan.params.sort, SortField::Price);
        assert_eq!(plan.params.sort_order, SortOrder::Asc);

        listing.apply_error(plan.token, &ApiError::NotFound);
        assert_eq!(listing.sort(), SortField::Created);
        assert_eq!(listing.sort_order(), SortOrder::Desc);
        assert!(listing.set_sort(SortField::Price).is_some());
    }

    #[test]
    fn applied_page_commits_requested_sort() {
        let mut listing = VenueListing::default();
        let plan = listing.set_sort(SortField::Name).unwrap();
        listing.apply_page(plan.token, page(vec![plain("A")], 1));
        assert_eq!(listing.sort(), SortField::Name);
        assert!(listing.set_sort(SortField::Name).is_none());
    }

    #[test]
    fn failed_search_uses_search_message() {
        let mut listing = VenueListing::default();
        let plan = listing.search("cabin");
        listing.apply_error(plan.token, &ApiError::Transport("refused".to_string()));
        assert_eq!(
            listing.status(),
            &ListingStatus::Failed(SEARCH_FAILED_MESSAGE.to_string())
        );
    }

    #[test]
    fn wifi_filter_keeps_only_wifi_venues_whatever_the_other_filters() {
        let mut listing = VenueListing::default();
        let plan = listing.load();
        listing.apply_page(
            plan.token,
            page(
                vec![
                    venue("Cheap wifi", 50.0, 2, wifi()),
                    venue("Cheap", 50.0, 2, VenueMeta::default()),
                    venue("Pricey wifi", 500.0, 8, wifi()),
                ],
                1,
            ),
        );

        listing.set_amenity(Amenity::Wifi, true);
        let names: Vec<&str> = listing.visible().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Cheap wifi", "Pricey wifi"]);

        listing.set_price_ceiling(Some(100));
        listing.set_min_guests(Some(2));
        let visible = listing.visible();
        assert!(visible.iter().all(|v| v.meta.wifi));
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn filters_do_not_issue_fetches() {
        let mut listing = VenueListing::default();
        let plan = listing.load();
        listing.apply_page(plan.token, page(vec![plain("A")], 1));
        listing.set_filter("price", FieldValue::text("80")).unwrap();
        listing.set_filter("parking", FieldValue::Checked(true)).unwrap();
        assert_eq!(listing.status(), &ListingStatus::Ready);
        assert!(listing.visible().is_empty());
        listing.clear_filters();
        assert_eq!(listing.visible().len(), 1);
    }

    #[test]
    fn zero_ceiling_is_inactive() {
        let filters = Filters {
            price_ceiling: Some(0),
            ..Filters::default()
        };
        assert!(!filters.is_active());
        assert!(filters.matches(&plain("A")));
    }

    #[test]
    fn set_filter_rejects_unknown_and_mismatched_inputs() {
        let mut listing = VenueListing::default();
        assert_eq!(
            listing.set_filter("sauna", FieldValue::Checked(true)),
            Err(FormError::UnknownField("sauna".to_string()))
        );
        assert_eq!(
            listing.set_filter("wifi", FieldValue::text("yes")),
            Err(FormError::ExpectedChecked("wifi".to_string()))
        );
    }

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case("150", Some(150))]
    #[case(" 42 ", Some(42))]
    #[case("12abc", Some(12))]
    #[case("7.9", Some(7))]
    #[case("-5", Some(0))]
    #[case("abc", Some(0))]
    fn filter_numbers_follow_input_rules(#[case] text: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_filter_number(text), expected);
    }
}
