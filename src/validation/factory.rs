//! Pre-built strategies
//!
//! `full_user` and `full_response` are fixed recipes for this service's
//! records, not a general mechanism: build a [`Composite`] directly for
//! anything else.

use super::{
    AtPath, Composite, CoordinatesFormat, DateFormat, EachItem, EmailFormat, ResponseStructure,
    UrlFormat, UserStructure, UuidFormat,
};

pub fn email() -> EmailFormat {
    EmailFormat
}

pub fn uuid() -> UuidFormat {
    UuidFormat
}

pub fn url() -> UrlFormat {
    UrlFormat
}

pub fn date() -> DateFormat {
    DateFormat
}

pub fn coordinates() -> CoordinatesFormat {
    CoordinatesFormat
}

pub fn user_structure() -> UserStructure {
    UserStructure::new()
}

pub fn response_structure() -> ResponseStructure {
    ResponseStructure
}

/// Structure, then `email` format, then `login.uuid` format
pub fn full_user() -> Composite {
    Composite::new()
        .with(UserStructure::new())
        .with(AtPath::new("/email", EmailFormat))
        .with(AtPath::new("/login/uuid", UuidFormat))
}

/// Envelope structure, then [`full_user`] for each record
pub fn full_response() -> Composite {
    Composite::new()
        .with(ResponseStructure)
        .with(EachItem::new("/results", full_user()))
}

/// Envelope structure, then a field-restricted structure for each record
pub fn restricted_response<S: AsRef<str>>(fields: &[S]) -> Composite {
    Composite::new()
        .with(ResponseStructure)
        .with(EachItem::new("/results", UserStructure::with_fields(fields)))
}
