use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use crate::rich_text::RichDocument;

/// The languages the site is published in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    strum::Display,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LocaleCode {
    En,
    Es,
    Fr,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl LocaleCode {
    pub const ALL: [LocaleCode; 3] = [LocaleCode::En, LocaleCode::Es, LocaleCode::Fr];

    /// Used whenever a value is missing in the requested locale.
    pub const FALLBACK: LocaleCode = LocaleCode::En;

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// The locale tag the document-query CMS (Contentful) expects.
    pub fn wire_tag(self) -> &'static str {
        match self {
            LocaleCode::En => "en-US",
            LocaleCode::Es => "es",
            LocaleCode::Fr => "fr",
        }
    }

    /// Name of the language in that language, for the language switcher.
    pub fn native_name(self) -> &'static str {
        match self {
            LocaleCode::En => "English",
            LocaleCode::Es => "Español",
            LocaleCode::Fr => "Français",
        }
    }

    /// Prefix a site path with this locale.
    ///
    /// The fallback locale uses bare paths; the others live under `/{code}`.
    /// `path` must start with `/`.
    pub fn localize_path(self, path: &str) -> String {
        if self == Self::FALLBACK {
            path.to_owned()
        } else if path == "/" {
            format!("/{}", self)
        } else {
            format!("/{}{}", self, path)
        }
    }

    /// Matches a URL prefix segment, which must be the exact lowercase code.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == segment)
    }
}

impl FromStr for LocaleCode {
    type Err = UnknownLocale;

    /// Accepts bare codes and region-qualified tags such as `en-US` or `fr_FR`.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == language)
            .ok_or_else(|| UnknownLocale(tag.to_owned()))
    }
}

/// A displayable value: what a localizable field looks like once a locale is chosen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    Plain(String),
    Rich(RichDocument),
}

impl Default for Resolved {
    fn default() -> Self {
        Resolved::Plain(String::new())
    }
}

impl Resolved {
    pub fn to_plain_text(&self) -> String {
        match self {
            Resolved::Plain(text) => text.clone(),
            Resolved::Rich(doc) => doc.plain_text(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Resolved::Plain(text) => text.trim().is_empty(),
            Resolved::Rich(doc) => doc.is_empty(),
        }
    }
}

/// A localizable text field as it arrives from a CMS.
#[derive(Debug, Clone, PartialEq)]
pub enum Text {
    /// Single-locale content.
    Plain(String),
    /// Single-locale structured content.
    Rich(RichDocument),
    /// One value per locale.
    Localized(BTreeMap<LocaleCode, Resolved>),
}

impl Default for Text {
    fn default() -> Self {
        Text::Plain(String::new())
    }
}

impl From<Resolved> for Text {
    fn from(value: Resolved) -> Self {
        match value {
            Resolved::Plain(text) => Text::Plain(text),
            Resolved::Rich(doc) => Text::Rich(doc),
        }
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Text::Plain(value.to_owned())
    }
}

impl Text {
    pub fn resolve(&self, locale: LocaleCode) -> Resolved {
        resolve(self, locale)
    }
}

/// Pick the value of `field` for `locale`.
///
/// Single-locale values are returned as they are. A locale map yields the requested
/// locale, then the fallback locale, then whichever value it has first. An empty map
/// resolves to empty text.
pub fn resolve(field: &Text, locale: LocaleCode) -> Resolved {
    match field {
        Text::Plain(text) => Resolved::Plain(text.clone()),
        Text::Rich(doc) => Resolved::Rich(doc.clone()),
        Text::Localized(values) => values
            .get(&locale)
            .or_else(|| values.get(&LocaleCode::FALLBACK))
            .or_else(|| values.values().next())
            .cloned()
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::{Block, Span};

    fn localized(pairs: &[(LocaleCode, &str)]) -> Text {
        Text::Localized(
            pairs
                .iter()
                .map(|(l, v)| (*l, Resolved::Plain(v.to_string())))
                .collect(),
        )
    }

    fn doc() -> RichDocument {
        RichDocument::new(vec![Block::Paragraph {
            spans: vec![Span::plain("Boil the water.")],
        }])
    }

    #[test]
    fn parses_bare_and_regional_tags() {
        assert_eq!("en".parse::<LocaleCode>(), Ok(LocaleCode::En));
        assert_eq!("en-US".parse::<LocaleCode>(), Ok(LocaleCode::En));
        assert_eq!("ES".parse::<LocaleCode>(), Ok(LocaleCode::Es));
        assert_eq!("fr_FR".parse::<LocaleCode>(), Ok(LocaleCode::Fr));
        assert_eq!(
            "de".parse::<LocaleCode>(),
            Err(UnknownLocale("de".to_string()))
        );
    }

    #[test]
    fn path_segments_must_be_exact() {
        assert_eq!(LocaleCode::from_path_segment("es"), Some(LocaleCode::Es));
        assert_eq!(LocaleCode::from_path_segment("ES"), None);
        assert_eq!(LocaleCode::from_path_segment("recipes"), None);
    }

    #[test]
    fn localizes_paths() {
        assert_eq!(LocaleCode::En.localize_path("/"), "/");
        assert_eq!(LocaleCode::Es.localize_path("/"), "/es");
        assert_eq!(LocaleCode::Fr.localize_path("/recipes"), "/fr/recipes");
        assert_eq!(LocaleCode::En.localize_path("/recipes/pasta"), "/recipes/pasta");
    }

    #[test]
    fn single_locale_values_pass_through() {
        for locale in LocaleCode::ALL {
            assert_eq!(
                resolve(&Text::from("Paella"), locale),
                Resolved::Plain("Paella".into())
            );
            assert_eq!(resolve(&Text::Rich(doc()), locale), Resolved::Rich(doc()));
        }
    }

    #[test]
    fn requested_locale_wins() {
        let title = localized(&[
            (LocaleCode::En, "Chicken"),
            (LocaleCode::Es, "Pollo"),
            (LocaleCode::Fr, "Poulet"),
        ]);
        assert_eq!(resolve(&title, LocaleCode::Es), Resolved::Plain("Pollo".into()));
        assert_eq!(resolve(&title, LocaleCode::Fr), Resolved::Plain("Poulet".into()));
    }

    #[test]
    fn falls_back_to_english() {
        let title = localized(&[(LocaleCode::En, "Chicken"), (LocaleCode::Es, "Pollo")]);
        assert_eq!(resolve(&title, LocaleCode::Fr), Resolved::Plain("Chicken".into()));
    }

    #[test]
    fn falls_back_to_any_value_rather_than_the_map() {
        let title = localized(&[(LocaleCode::Fr, "Poulet")]);
        assert_eq!(resolve(&title, LocaleCode::Es), Resolved::Plain("Poulet".into()));
        assert_eq!(
            resolve(&Text::Localized(BTreeMap::new()), LocaleCode::Es),
            Resolved::default()
        );
    }

    #[test]
    fn resolving_is_idempotent() {
        let fields = [
            localized(&[(LocaleCode::Es, "Pollo")]),
            Text::Rich(doc()),
            Text::from("Soup"),
        ];
        for field in &fields {
            for locale in LocaleCode::ALL {
                let once = resolve(field, locale);
                let twice = resolve(&Text::from(once.clone()), locale);
                assert_eq!(once, twice);
            }
        }
    }
}
