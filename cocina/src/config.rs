use strum::{Display, EnumString};

/// Which headless CMS backs the site. Exactly one is used per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CmsProvider {
    Sanity,
    Contentful,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct CmsConfig {
    pub provider: CmsProvider,
    pub sanity: SanityConfig,
    pub contentful: ContentfulConfig,
}

#[derive(Clone, Debug)]
pub struct SanityConfig {
    pub project_id: Option<String>,
    pub dataset: Option<String>,
    pub api_version: String,
    /// Read token; when present the live API is used instead of the CDN.
    pub token: Option<String>,
    /// Override for the API origin, e.g. a local stand-in.
    pub api_base: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ContentfulConfig {
    pub space_id: Option<String>,
    pub access_token: Option<String>,
    pub environment: String,
    pub api_base: String,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: None,
            api_version: "2024-01-01".into(),
            token: None,
            api_base: None,
        }
    }
}

impl Default for ContentfulConfig {
    fn default() -> Self {
        Self {
            space_id: None,
            access_token: None,
            environment: "master".into(),
            api_base: "https://cdn.contentful.com".into(),
        }
    }
}

/// Read a variable from the environment (or `.env`), treating blank values as unset.
pub fn env_var(name: &str) -> Option<String> {
    dotenvy::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Read and parse a variable, falling back to `default` when it is unset.
pub fn env_parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env_var(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

impl CmsConfig {
    /// Load the CMS settings from the environment.
    ///
    /// Missing credentials are not an error here: the adapters notice them and serve
    /// empty results. Only values that cannot be parsed are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let sanity_defaults = SanityConfig::default();
        let contentful_defaults = ContentfulConfig::default();
        Ok(Self {
            provider: env_parse("CMS_PROVIDER", CmsProvider::Sanity)?,
            sanity: SanityConfig {
                project_id: env_var("SANITY_PROJECT_ID"),
                dataset: env_var("SANITY_DATASET"),
                api_version: env_var("SANITY_API_VERSION").unwrap_or(sanity_defaults.api_version),
                token: env_var("SANITY_TOKEN"),
                api_base: env_var("SANITY_API_BASE"),
            },
            contentful: ContentfulConfig {
                space_id: env_var("CONTENTFUL_SPACE_ID"),
                access_token: env_var("CONTENTFUL_ACCESS_TOKEN"),
                environment: env_var("CONTENTFUL_ENVIRONMENT")
                    .unwrap_or(contentful_defaults.environment),
                api_base: env_var("CONTENTFUL_API_BASE").unwrap_or(contentful_defaults.api_base),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_parse() {
        assert_eq!("sanity".parse::<CmsProvider>().ok(), Some(CmsProvider::Sanity));
        assert_eq!(
            "Contentful".parse::<CmsProvider>().ok(),
            Some(CmsProvider::Contentful)
        );
        assert!("wordpress".parse::<CmsProvider>().is_err());
    }

    #[test]
    fn unset_variables_use_the_default() {
        let value: u64 = env_parse("COCINA_TEST_SURELY_UNSET_VARIABLE", 60).unwrap();
        assert_eq!(value, 60);
    }
}
