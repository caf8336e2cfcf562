//! Display locales for station text.

use std::fmt;

/// Error returned when parsing an unsupported locale code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {code} (expected \"fr\" or \"nl\")")]
pub struct InvalidLocale {
    code: String,
}

/// A supported display locale.
///
/// The Villo deployment serves Brussels, so the closed set is French
/// and Dutch. Any `Locale` value is valid by construction.
///
/// # Examples
///
/// ```
/// use villo_server::domain::Locale;
///
/// let nl = Locale::parse("nl").unwrap();
/// assert_eq!(nl.as_str(), "nl");
///
/// assert!(Locale::parse("de").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    Fr,
    Nl,
}

impl Locale {
    /// Parse a locale code. Accepts `"fr"` and `"nl"`, case-insensitive.
    pub fn parse(code: &str) -> Result<Self, InvalidLocale> {
        match code.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Locale::Fr),
            "nl" => Ok(Locale::Nl),
            _ => Err(InvalidLocale {
                code: code.to_string(),
            }),
        }
    }

    /// Returns the locale code as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::Nl => "nl",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of station text carried in every supported locale.
///
/// Normalization fills both locales up front (applying the per-locale
/// field fallback chains); the web layer picks one when building the
/// response for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleText {
    pub fr: String,
    pub nl: String,
}

impl LocaleText {
    /// Build from per-locale candidates, substituting `placeholder`
    /// where a locale has no usable value. The stored text is never
    /// empty.
    pub fn new(fr: Option<String>, nl: Option<String>, placeholder: &str) -> Self {
        let fill = |text: Option<String>| {
            text.filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| placeholder.to_string())
        };
        Self {
            fr: fill(fr),
            nl: fill(nl),
        }
    }

    /// The text for one locale.
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Fr => &self.fr,
            Locale::Nl => &self.nl,
        }
    }
}
