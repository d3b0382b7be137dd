//! Deciding which recipe pages are rendered ahead of time and how long they stay fresh.

use std::collections::BTreeSet;
use std::num::NonZeroU64;
use std::time::Duration;

use itertools::Itertools;
use strum::{Display, EnumString};

use crate::cms::RecipeSource;
use crate::locale::LocaleCode;

/// Window for the home and list pages, whatever the detail strategy.
pub const LISTING_REVALIDATE: Revalidate = Revalidate(match NonZeroU64::new(60) {
    Some(secs) => secs,
    None => unreachable!(),
});

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PlanError {
    #[error("Revalidation window must be a positive number of seconds")]
    ZeroRevalidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PathStrategy {
    /// Enumerate every (slug, locale) up front; anything else is missing.
    Eager,
    /// Declare nothing up front and render each page on first request.
    Lazy,
}

/// What happens to a detail request outside the planned paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    NotFound,
    /// Render on demand, holding the request until the CMS answers.
    Blocking,
}

/// Seconds after which a rendered page may be regenerated in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Revalidate(NonZeroU64);

impl Revalidate {
    pub fn from_secs(secs: u64) -> Result<Self, PlanError> {
        NonZeroU64::new(secs)
            .map(Self)
            .ok_or(PlanError::ZeroRevalidate)
    }

    pub fn secs(self) -> u64 {
        self.0.get()
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.secs())
    }
}

impl std::str::FromStr for Revalidate {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_secs(s.trim().parse().map_err(|_| PlanError::ZeroRevalidate)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PagePath {
    pub slug: String,
    pub locale: LocaleCode,
}

impl PagePath {
    pub fn new(slug: impl Into<String>, locale: LocaleCode) -> Self {
        Self {
            slug: slug.into(),
            locale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPlan {
    pub paths: BTreeSet<PagePath>,
    pub fallback: Fallback,
    pub revalidate: Revalidate,
}

impl DetailPlan {
    /// Whether a request for this page may go to the CMS at all.
    pub fn admits(&self, slug: &str, locale: LocaleCode) -> bool {
        match self.fallback {
            Fallback::Blocking => true,
            Fallback::NotFound => self.paths.contains(&PagePath::new(slug, locale)),
        }
    }
}

/// Every (slug, locale) pair, slug-major, without repeats.
pub fn enumerate_paths(slugs: &[String], locales: &[LocaleCode]) -> Vec<PagePath> {
    slugs
        .iter()
        .cartesian_product(locales.iter())
        .map(|(slug, &locale)| PagePath::new(slug.as_str(), locale))
        .unique()
        .collect()
}

pub async fn plan_detail_pages(
    source: &dyn RecipeSource,
    strategy: PathStrategy,
    revalidate: Revalidate,
) -> DetailPlan {
    match strategy {
        PathStrategy::Eager => {
            let slugs = source.list_slugs().await;
            if slugs.is_empty() {
                tracing::warn!("No recipe slugs known, every detail page will be missing");
            }
            let paths: BTreeSet<PagePath> =
                enumerate_paths(&slugs, &LocaleCode::ALL).into_iter().collect();
            tracing::info!(paths = paths.len(), "Planned detail pages");
            DetailPlan {
                paths,
                fallback: Fallback::NotFound,
                revalidate,
            }
        }
        PathStrategy::Lazy => DetailPlan {
            paths: BTreeSet::new(),
            fallback: Fallback::Blocking,
            revalidate,
        },
    }
}
