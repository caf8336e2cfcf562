//! Canonical station types.

mod bounds;
mod locale;
mod station;

pub use bounds::BoundingBox;
pub use locale::{InvalidLocale, Locale, LocaleText};
pub use station::{Station, StationId};
