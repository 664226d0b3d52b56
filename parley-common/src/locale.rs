//! Display locale for query text
//!
//! Only the boolean yes/no tokens depend on the locale here; every other
//! string a query shows is supplied by the caller. The locale is passed into
//! each query explicitly so a query is reproducible from its builder alone.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
    De,
    Es,
}

impl Locale {
    /// Parse a locale code such as `en`, `fr_FR` or `de-DE`
    pub fn from_code(code: &str) -> Option<Self> {
        let lang = code
            .split(['_', '-', '.'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match lang.as_str() {
            "en" => Some(Locale::En),
            "fr" => Some(Locale::Fr),
            "de" => Some(Locale::De),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::De => "de",
            Locale::Es => "es",
        }
    }

    /// Default (yes, no) answer tokens for boolean queries
    pub fn yes_no(&self) -> (&'static str, &'static str) {
        match self {
            Locale::En => ("y", "n"),
            Locale::Fr => ("o", "n"),
            Locale::De => ("j", "n"),
            Locale::Es => ("s", "n"),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_variants() {
        assert_eq!(Locale::from_code("en"), Some(Locale::En));
        assert_eq!(Locale::from_code("fr_FR"), Some(Locale::Fr));
        assert_eq!(Locale::from_code("de-DE"), Some(Locale::De));
        assert_eq!(Locale::from_code("ES.UTF-8"), Some(Locale::Es));
        assert_eq!(Locale::from_code("jp"), None);
        assert_eq!(Locale::from_code(""), None);
    }

    #[test]
    fn test_yes_no_tokens() {
        assert_eq!(Locale::En.yes_no(), ("y", "n"));
        assert_eq!(Locale::Fr.yes_no(), ("o", "n"));
        assert_eq!(Locale::default(), Locale::En);
    }
}
