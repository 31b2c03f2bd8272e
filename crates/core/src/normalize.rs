//! Locale-aware lowercase folding of raw keys.
//!
//! Every raw key and search prefix is folded to lowercase before matching,
//! so that `Über` and `über` select the same entry. Folding is tailored by
//! locale (Turkish `I` lowers to dotless `ı`, for example), which is why the
//! fold goes through ICU case mapping rather than `str::to_lowercase`.
//!
//! Three locale choices exist per request: the process default (configured
//! at startup), the root locale (no language tailoring, selected by an empty
//! locale string), or a named tag. Tags are accepted in both `en_US` and
//! `en-US` spellings.
//!
//! Stored keys are already folded; the snapshot loader never re-normalizes.

use icu_casemap::CaseMapper;
use icu_locid::LanguageIdentifier;

use crate::error::{Error, Result};

/// Which locale a single request wants the fold performed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleSpec<'a> {
    /// The process-default locale.
    Default,
    /// Root locale: Unicode default mappings, no language tailoring.
    Root,
    /// A named tag such as `de` or `tr_TR`.
    Named(&'a str),
}

impl<'a> LocaleSpec<'a> {
    /// Interpret an optional query parameter: absent means the process
    /// default, the empty string means root.
    pub fn from_param(param: Option<&'a str>) -> Self {
        match param {
            None => LocaleSpec::Default,
            Some("") => LocaleSpec::Root,
            Some(tag) => LocaleSpec::Named(tag),
        }
    }
}

/// Locale-aware lowercase folder shared by all request handlers.
///
/// Construction parses the process-default locale once; per-request named
/// tags are parsed on use and surface as `BadInput` when malformed.
pub struct Normalizer {
    mapper: CaseMapper,
    default_langid: LanguageIdentifier,
}

impl Normalizer {
    /// Build a normalizer whose `Default` spec folds under `default_locale`.
    pub fn new(default_locale: &str) -> Result<Self> {
        Ok(Normalizer {
            mapper: CaseMapper::new(),
            default_langid: parse_langid(default_locale)?,
        })
    }

    /// Fold `raw` to lowercase under the requested locale.
    pub fn lowercase(&self, raw: &str, locale: LocaleSpec<'_>) -> Result<String> {
        let folded = match locale {
            LocaleSpec::Default => self.mapper.lowercase_to_string(raw, &self.default_langid),
            LocaleSpec::Root => self
                .mapper
                .lowercase_to_string(raw, &LanguageIdentifier::UND),
            LocaleSpec::Named(tag) => {
                let langid = parse_langid(tag)?;
                self.mapper.lowercase_to_string(raw, &langid)
            }
        };
        Ok(folded)
    }
}

/// Parse a locale tag, accepting underscore spellings like `en_US`.
/// The empty tag is the root locale.
fn parse_langid(tag: &str) -> Result<LanguageIdentifier> {
    if tag.is_empty() {
        return Ok(LanguageIdentifier::UND);
    }
    let bcp47 = tag.replace('_', "-");
    bcp47
        .parse()
        .map_err(|_| Error::bad_input(format!("unrecognized locale tag: {tag}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new("en_US").unwrap()
    }

    #[test]
    fn folds_ascii_under_default_locale() {
        let n = normalizer();
        assert_eq!(n.lowercase("Star Wars", LocaleSpec::Default).unwrap(), "star wars");
    }

    #[test]
    fn folds_umlauts() {
        let n = normalizer();
        assert_eq!(
            n.lowercase("Über", LocaleSpec::Named("de")).unwrap(),
            "über"
        );
        // Already-lowercase input is a fixed point.
        assert_eq!(
            n.lowercase("über", LocaleSpec::Named("de")).unwrap(),
            "über"
        );
    }

    #[test]
    fn turkish_tailoring_applies_for_named_tag_only() {
        let n = normalizer();
        assert_eq!(n.lowercase("I", LocaleSpec::Named("tr")).unwrap(), "ı");
        assert_eq!(n.lowercase("I", LocaleSpec::Root).unwrap(), "i");
        assert_eq!(n.lowercase("I", LocaleSpec::Default).unwrap(), "i");
    }

    #[test]
    fn accepts_underscore_and_hyphen_tags() {
        let n = normalizer();
        assert_eq!(
            n.lowercase("A", LocaleSpec::Named("en_US")).unwrap(),
            n.lowercase("A", LocaleSpec::Named("en-US")).unwrap(),
        );
    }

    #[test]
    fn rejects_malformed_tags() {
        let n = normalizer();
        let err = n
            .lowercase("A", LocaleSpec::Named("not a locale"))
            .unwrap_err();
        assert!(matches!(err, Error::BadInput(_)));
        assert!(Normalizer::new("!!").is_err());
    }

    #[test]
    fn locale_spec_from_param() {
        assert_eq!(LocaleSpec::from_param(None), LocaleSpec::Default);
        assert_eq!(LocaleSpec::from_param(Some("")), LocaleSpec::Root);
        assert_eq!(LocaleSpec::from_param(Some("de")), LocaleSpec::Named("de"));
    }
}
