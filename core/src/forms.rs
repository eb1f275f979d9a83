//! Form-state controllers for the venue, profile, register and booking forms.
//!
//! # Design
//! Each form is an explicit draft record holding the raw text the user typed;
//! numbers are only coerced at submit time, so half-typed values such as `"1."`
//! are tolerated while editing. Inputs arrive as a field name plus a
//! [`FieldValue`], where nested groups use dotted names (`"meta.wifi"`,
//! `"location.city"`, `"avatar.url"`). `apply` never mutates: it returns a new
//! draft in which only the touched group is copied. Untouched groups are
//! shared `Arc`s, so `Arc::ptr_eq` holds for them across updates.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::ApiError;
use crate::types::{
    Amenity, BookingInput, Media, Profile, ProfileUpdate, RegisterRequest, Venue, VenueInput,
    VenueMeta,
};

/// The value carried by an input event. Checkboxes report `Checked`, every
/// other input reports its raw text verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

impl FieldValue {
    pub fn text<S: Into<String>>(value: S) -> Self {
        FieldValue::Text(value.into())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field {0} is a checkbox")]
    ExpectedChecked(String),
    #[error("field {0} takes text")]
    ExpectedText(String),
}

pub(crate) fn expect_text(name: &str, value: FieldValue) -> Result<String, FormError> {
    match value {
        FieldValue::Text(text) => Ok(text),
        FieldValue::Checked(_) => Err(FormError::ExpectedText(name.to_string())),
    }
}

pub(crate) fn expect_checked(name: &str, value: FieldValue) -> Result<bool, FormError> {
    match value {
        FieldValue::Checked(checked) => Ok(checked),
        FieldValue::Text(_) => Err(FormError::ExpectedChecked(name.to_string())),
    }
}

/// Format a stored number for an edit form (`120.0` becomes `"120"`).
fn number_text(value: f64) -> String {
    value.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationField {
    Address,
    City,
    Zip,
    Country,
    Continent,
    Lat,
    Lng,
}

impl LocationField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "address" => Some(LocationField::Address),
            "city" => Some(LocationField::City),
            "zip" => Some(LocationField::Zip),
            "country" => Some(LocationField::Country),
            "continent" => Some(LocationField::Continent),
            "lat" => Some(LocationField::Lat),
            "lng" => Some(LocationField::Lng),
            _ => None,
        }
    }
}

/// Raw text of the location group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationDraft {
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub continent: String,
    pub lat: String,
    pub lng: String,
}

impl LocationDraft {
    #[must_use]
    pub fn with(&self, field: LocationField, value: String) -> Self {
        let mut next = self.clone();
        let slot = match field {
            LocationField::Address => &mut next.address,
            LocationField::City => &mut next.city,
            LocationField::Zip => &mut next.zip,
            LocationField::Country => &mut next.country,
            LocationField::Continent => &mut next.continent,
            LocationField::Lat => &mut next.lat,
            LocationField::Lng => &mut next.lng,
        };
        *slot = value;
        next
    }
}

/// Raw text of one image entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDraft {
    pub url: String,
    pub alt: String,
}

impl MediaDraft {
    fn from_media(media: &Media) -> Self {
        Self {
            url: media.url.clone(),
            alt: media.alt.clone(),
        }
    }

    /// `None` when no URL was entered.
    fn to_media(&self) -> Option<Media> {
        let url = self.url.trim();
        if url.is_empty() {
            return None;
        }
        Some(Media {
            url: url.to_string(),
            alt: self.alt.trim().to_string(),
        })
    }
}

/// A resolved venue form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueField {
    Name,
    Description,
    Price,
    MaxGuests,
    Rating,
    Meta(Amenity),
    Location(LocationField),
    MediaUrl(usize),
    MediaAlt(usize),
}

impl FromStr for VenueField {
    type Err = FormError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let unknown = || FormError::UnknownField(name.to_string());
        let field = match name.split_once('.') {
            None => match name {
                "name" => VenueField::Name,
                "description" => VenueField::Description,
                "price" => VenueField::Price,
                "maxGuests" => VenueField::MaxGuests,
                "rating" => VenueField::Rating,
                _ => return Err(unknown()),
            },
            Some(("meta", rest)) => {
                VenueField::Meta(Amenity::from_name(rest).ok_or_else(unknown)?)
            }
            Some(("location", rest)) => {
                VenueField::Location(LocationField::from_name(rest).ok_or_else(unknown)?)
            }
            Some(("media", rest)) => {
                let (index, part) = rest.split_once('.').ok_or_else(unknown)?;
                let index: usize = index.parse().map_err(|_| unknown())?;
                match part {
                    "url" => VenueField::MediaUrl(index),
                    "alt" => VenueField::MediaAlt(index),
                    _ => return Err(unknown()),
                }
            }
            Some(_) => return Err(unknown()),
        };
        Ok(field)
    }
}

/// State of the create-venue and edit-venue forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub max_guests: String,
    pub rating: String,
    pub meta: Arc<VenueMeta>,
    pub location: Arc<LocationDraft>,
    pub media: Arc<Vec<MediaDraft>>,
}

impl VenueDraft {
    /// Pre-fill the edit form from a fetched venue.
    pub fn from_venue(venue: &Venue) -> Self {
        let location = &venue.location;
        Self {
            name: venue.name.clone(),
            description: venue.description.clone(),
            price: number_text(venue.price),
            max_guests: venue.max_guests.to_string(),
            rating: number_text(venue.rating),
            meta: Arc::new(venue.meta),
            location: Arc::new(LocationDraft {
                address: location.address.clone().unwrap_or_default(),
                city: location.city.clone().unwrap_or_default(),
                zip: location.zip.clone().unwrap_or_default(),
                country: location.country.clone().unwrap_or_default(),
                continent: location.continent.clone().unwrap_or_default(),
                lat: number_text(location.lat),
                lng: number_text(location.lng),
            }),
            media: Arc::new(venue.media.iter().map(MediaDraft::from_media).collect()),
        }
    }

    /// Return a new draft with `name` set to `value`.
    pub fn apply(&self, name: &str, value: FieldValue) -> Result<Self, FormError> {
        let field: VenueField = name.parse()?;
        let mut next = self.clone();
        match field {
            VenueField::Meta(amenity) => {
                let checked = expect_checked(name, value)?;
                next.meta = Arc::new(self.meta.with(amenity, checked));
            }
            VenueField::Location(location_field) => {
                let text = expect_text(name, value)?;
                next.location = Arc::new(self.location.with(location_field, text));
            }
            VenueField::MediaUrl(index) | VenueField::MediaAlt(index) => {
                let text = expect_text(name, value)?;
                let mut media = self.media.as_ref().clone();
                let entry = media
                    .get_mut(index)
                    .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
                if matches!(field, VenueField::MediaUrl(_)) {
                    entry.url = text;
                } else {
                    entry.alt = text;
                }
                next.media = Arc::new(media);
            }
            VenueField::Name => next.name = expect_text(name, value)?,
            VenueField::Description => next.description = expect_text(name, value)?,
            VenueField::Price => next.price = expect_text(name, value)?,
            VenueField::MaxGuests => next.max_guests = expect_text(name, value)?,
            VenueField::Rating => next.rating = expect_text(name, value)?,
        }
        Ok(next)
    }

    /// Append an empty image row.
    #[must_use]
    pub fn add_media(&self) -> Self {
        let mut media = self.media.as_ref().clone();
        media.push(MediaDraft::default());
        Self {
            media: Arc::new(media),
            ..self.clone()
        }
    }

    /// Drop the image row at `index`; out-of-range indexes change nothing.
    #[must_use]
    pub fn remove_media(&self, index: usize) -> Self {
        if index >= self.media.len() {
            return self.clone();
        }
        let mut media = self.media.as_ref().clone();
        media.remove(index);
        Self {
            media: Arc::new(media),
            ..self.clone()
        }
    }

    /// Media entries that have a URL.
    pub(crate) fn filled_media(&self) -> impl Iterator<Item = Media> + '_ {
        self.media.iter().filter_map(MediaDraft::to_media)
    }

    /// Create-form checks shown inline before submitting.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().chars().count() < 3 {
            return Err(ApiError::validation(
                "Venue name must be at least 3 characters long",
            ));
        }
        if self.description.trim().chars().count() < 10 {
            return Err(ApiError::validation(
                "Description must be at least 10 characters long",
            ));
        }
        if !self
            .price
            .trim()
            .parse::<f64>()
            .is_ok_and(|price| price.is_finite() && price > 0.0)
        {
            return Err(ApiError::validation("Please enter a valid price"));
        }
        if !self
            .max_guests
            .trim()
            .parse::<u32>()
            .is_ok_and(|guests| guests > 0)
        {
            return Err(ApiError::validation("Please enter a valid number of guests"));
        }
        Ok(())
    }

    /// Run the form checks, then coerce into the request payload.
    pub fn submit(&self) -> Result<VenueInput, ApiError> {
        self.validate()?;
        VenueInput::from_draft(self)
    }
}

/// State of the profile edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: Arc<MediaDraft>,
    pub banner: Arc<MediaDraft>,
}

impl ProfileDraft {
    pub fn from_profile(profile: &Profile) -> Self {
        let media = |m: &Option<Media>| {
            Arc::new(m.as_ref().map(MediaDraft::from_media).unwrap_or_default())
        };
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            bio: profile.bio.clone().unwrap_or_default(),
            avatar: media(&profile.avatar),
            banner: media(&profile.banner),
        }
    }

    pub fn apply(&self, name: &str, value: FieldValue) -> Result<Self, FormError> {
        let text = expect_text(name, value)?;
        let mut next = self.clone();
        match name.split_once('.') {
            None => match name {
                "name" => next.name = text,
                "email" => next.email = text,
                "bio" => next.bio = text,
                _ => return Err(FormError::UnknownField(name.to_string())),
            },
            Some((group @ ("avatar" | "banner"), part)) => {
                let current = if group == "avatar" { &self.avatar } else { &self.banner };
                let mut media = current.as_ref().clone();
                match part {
                    "url" => media.url = text,
                    "alt" => media.alt = text,
                    _ => return Err(FormError::UnknownField(name.to_string())),
                }
                if group == "avatar" {
                    next.avatar = Arc::new(media);
                } else {
                    next.banner = Arc::new(media);
                }
            }
            Some(_) => return Err(FormError::UnknownField(name.to_string())),
        }
        Ok(next)
    }

    /// The `PUT /profiles/{name}` body. Empty fields are left out.
    pub fn to_update(&self) -> ProfileUpdate {
        let bio = self.bio.trim();
        ProfileUpdate {
            bio: (!bio.is_empty()).then(|| bio.to_string()),
            avatar: self.avatar.to_media(),
            banner: self.banner.to_media(),
            venue_manager: None,
        }
    }
}

/// State of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: String,
    pub avatar: String,
    pub banner: String,
    pub venue_manager: bool,
}

impl RegisterDraft {
    pub fn apply(&self, name: &str, value: FieldValue) -> Result<Self, FormError> {
        let mut next = self.clone();
        if name == "venueManager" {
            next.venue_manager = expect_checked(name, value)?;
            return Ok(next);
        }
        let text = expect_text(name, value)?;
        let slot = match name {
            "name" => &mut next.name,
            "email" => &mut next.email,
            "password" => &mut next.password,
            "bio" => &mut next.bio,
            "avatar" => &mut next.avatar,
            "banner" => &mut next.banner,
            _ => return Err(FormError::UnknownField(name.to_string())),
        };
        *slot = text;
        Ok(next)
    }

    /// The `POST /auth/register` body; blank optional fields are omitted.
    pub fn to_request(&self) -> Result<RegisterRequest, ApiError> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(ApiError::validation(
                "Name, email and password are required",
            ));
        }
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        let image = |url: &str| {
            optional(url).map(|url| Media {
                url,
                alt: String::new(),
            })
        };
        Ok(RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            bio: optional(&self.bio),
            avatar: image(&self.avatar),
            banner: image(&self.banner),
            venue_manager: self.venue_manager,
        })
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// State of the booking form on the venue page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub date_from: String,
    pub date_to: String,
    pub guests: String,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            date_from: String::new(),
            date_to: String::new(),
            guests: "1".to_string(),
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

impl BookingDraft {
    pub fn apply(&self, name: &str, value: FieldValue) -> Result<Self, FormError> {
        let text = expect_text(name, value)?;
        let mut next = self.clone();
        match name {
            "dateFrom" => next.date_from = text,
            "dateTo" => next.date_to = text,
            "guests" => next.guests = text,
            _ => return Err(FormError::UnknownField(name.to_string())),
        }
        Ok(next)
    }

    /// Earliest selectable check-in date.
    pub fn min_check_in(&self, today: NaiveDate) -> NaiveDate {
        today
    }

    /// Earliest selectable check-out date: the check-in date once chosen.
    pub fn min_check_out(&self, today: NaiveDate) -> NaiveDate {
        parse_date(&self.date_from).unwrap_or(today)
    }

    /// Check the draft against `venue` and build the booking payload.
    pub fn validate(&self, venue: &Venue, today: NaiveDate) -> Result<BookingInput, ApiError> {
        let date_from = parse_date(&self.date_from)
            .ok_or_else(|| ApiError::validation("Please choose a check-in date"))?;
        if date_from < self.min_check_in(today) {
            return Err(ApiError::validation("Check-in cannot be in the past"));
        }
        let date_to = parse_date(&self.date_to)
            .ok_or_else(|| ApiError::validation("Please choose a check-out date"))?;
        if date_to < self.min_check_out(today) {
            return Err(ApiError::validation(
                "Check-out cannot be before check-in",
            ));
        }
        let guests = self
            .guests
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|guests| (1..=venue.max_guests).contains(guests))
            .ok_or_else(|| {
                ApiError::validation(format!(
                    "Guests must be between 1 and {}",
                    venue.max_guests
                ))
            })?;
        Ok(BookingInput {
            date_from,
            date_to,
            guests,
            venue_id: venue.id,
        })
    }
}
