//! Recipe sources backed by a headless CMS.
//!
//! Every source honours the same contract: calls never fail. Transport, auth, decoding
//! and configuration problems are logged and turned into an empty result, so page
//! generation degrades to empty lists and "not found" pages instead of errors. A
//! consequence is that callers cannot tell "no such recipe" from "CMS unreachable".

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{CmsConfig, CmsProvider};
use crate::locale::{LocaleCode, Resolved, Text};
use crate::models::RawRecord;

pub mod contentful;
pub mod memory;
pub mod sanity;

pub use contentful::ContentfulSource;
pub use memory::MemorySource;
pub use sanity::SanitySource;

pub type CmsResult<T> = Result<T, CmsError>;

#[derive(thiserror::Error, Debug)]
pub enum CmsError {
    #[error("CMS request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("CMS responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Malformed CMS response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Every known recipe slug, without duplicates.
    async fn list_slugs(&self) -> Vec<String>;

    async fn fetch_all(&self, locale: LocaleCode) -> Vec<RawRecord>;

    /// Up to `limit` recipes flagged as featured.
    async fn fetch_featured(&self, locale: LocaleCode, limit: usize) -> Vec<RawRecord>;

    /// `None` both when the slug is unknown and when the CMS could not be reached.
    async fn fetch_by_slug(&self, slug: &str, locale: LocaleCode) -> Option<RawRecord>;
}

/// Build the source selected by `config.provider`.
pub fn connect(config: &CmsConfig) -> Arc<dyn RecipeSource> {
    tracing::info!(provider = %config.provider, "Connecting to CMS");
    let client = reqwest::Client::new();
    match config.provider {
        CmsProvider::Sanity => Arc::new(SanitySource::new(client, config.sanity.clone())),
        CmsProvider::Contentful => {
            Arc::new(ContentfulSource::new(client, config.contentful.clone()))
        }
    }
}

/// Collapse a failed CMS call into an empty result, logging the reason.
pub(crate) fn fail_open<T: Default>(operation: &'static str, result: CmsResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(CmsError::NotConfigured(what)) => {
            tracing::warn!(operation, "{what} is not configured, returning no recipes");
            T::default()
        }
        Err(err) => {
            tracing::error!(operation, error = %err, "Error fetching from CMS");
            T::default()
        }
    }
}

/// Drop empty and repeated slugs, keeping first occurrences in order.
pub(crate) fn unique_slugs(slugs: impl IntoIterator<Item = String>) -> Vec<String> {
    slugs
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .unique()
        .collect()
}

/// Build a locale map from a JSON object keyed by locale tags.
///
/// Keys that are not supported locales (including `_type` and friends) are skipped, as are
/// values `parse` cannot make sense of.
pub(crate) fn locale_map(
    values: &serde_json::Map<String, Value>,
    parse: impl Fn(&Value) -> Option<Resolved>,
) -> Text {
    Text::Localized(
        values
            .iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .filter_map(|(key, value)| {
                let locale = key.parse::<LocaleCode>().ok()?;
                Some((locale, parse(value)?))
            })
            .collect(),
    )
}

/// Check the status of a CMS response and decode its JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> CmsResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(CmsError::Status { status, body });
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_deduplicated_in_order() {
        let slugs = unique_slugs(
            ["pasta", "paella", "pasta", "", " paella ", "curry"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(slugs, vec!["pasta", "paella", "curry"]);
    }

    #[test]
    fn failures_become_empty_values() {
        let records: Vec<RawRecord> =
            fail_open("fetch_all", Err(CmsError::NotConfigured("Sanity project id")));
        assert!(records.is_empty());

        let record: Option<RawRecord> = fail_open(
            "fetch_by_slug",
            Err(CmsError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: "nope".into(),
            }),
        );
        assert!(record.is_none());
    }
}
