//! Rendering pages and keeping them in the page cache.

use std::sync::Arc;
use std::time::Instant;

use cocina::cms::RecipeSource;
use cocina::plan::{DetailPlan, LISTING_REVALIDATE};
use cocina::view::{categories, RecipeView};
use cocina::LocaleCode;
use minijinja::context;
use serde::Serialize;
use tokio::task::JoinSet;

use crate::cache::{CachedPage, PageCache, PageKey, RegenerationClaim};
use crate::errors::{WebError, WebResult};
use crate::i18n;

/// Featured recipes shown on the home page.
pub const FEATURED_LIMIT: usize = 3;

const CARD_IMAGE_WIDTH: u32 = 800;
const DETAIL_IMAGE_WIDTH: u32 = 1200;

const TWEET_INTENT: &str = "https://twitter.com/intent/tweet";

lazy_static::lazy_static! {
    static ref TEMPLATES: minijinja::Environment<'static> = {
        let mut env = minijinja::Environment::new();
        for (name, template) in &[
            ("base.html.jinja", include_str!("../templates/base.html.jinja")),
            ("macros.html.jinja", include_str!("../templates/macros.html.jinja")),
            ("index.html.jinja", include_str!("../templates/index.html.jinja")),
            ("recipes.html.jinja", include_str!("../templates/recipes.html.jinja")),
            ("recipe.html.jinja", include_str!("../templates/recipe.html.jinja")),
        ] {
            env.add_template(name, template)
                .expect("Failed to register template");
        }
        env
    };
}

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn RecipeSource>,
    pub plan: Arc<DetailPlan>,
    pub cache: PageCache,
    /// Absolute origin, without a trailing slash.
    pub site_url: Arc<str>,
    pub started: Instant,
}

impl AppState {
    pub fn new(source: Arc<dyn RecipeSource>, plan: DetailPlan, site_url: &str) -> Self {
        Self {
            source,
            plan: Arc::new(plan),
            cache: PageCache::new(),
            site_url: site_url.trim_end_matches('/').into(),
            started: Instant::now(),
        }
    }

    /// Render every planned detail page into the cache, concurrently.
    ///
    /// Pages whose recipe has disappeared since planning are skipped.
    pub async fn prerender(&self) -> WebResult<usize> {
        let mut renders = JoinSet::new();
        for path in &self.plan.paths {
            let state = self.clone();
            let key = PageKey::Detail {
                slug: path.slug.clone(),
                locale: path.locale,
            };
            renders.spawn(async move {
                let page = state.render(&key).await;
                (key, page)
            });
        }

        let mut rendered = 0;
        while let Some(joined) = renders.join_next().await {
            let (key, page) = joined.map_err(anyhow::Error::from)?;
            match page {
                Ok(page) => {
                    self.cache.insert(key, page);
                    rendered += 1;
                }
                Err(WebError::NotFound) => {
                    tracing::warn!(?key, "Planned recipe was not returned by the CMS")
                }
                Err(err) => return Err(err),
            }
        }
        tracing::info!(rendered, "Prerendered detail pages");
        Ok(rendered)
    }

    /// Serve a page from the cache, rendering it on a miss.
    ///
    /// Stale pages are returned as they are while one background task renders a fresh copy.
    pub async fn page(&self, key: PageKey) -> WebResult<Arc<str>> {
        if let PageKey::Detail { slug, locale } = &key {
            if !self.plan.admits(slug, *locale) {
                return Err(WebError::NotFound);
            }
        }

        let page = self
            .cache
            .pages
            .get_or_insert_async(&key, self.render(&key))
            .await?;
        if page.is_stale() {
            if let Some(claim) = self.cache.claim_regeneration(&key) {
                tokio::spawn(self.clone().regenerate(key, claim));
            }
        }
        Ok(page.html)
    }

    async fn regenerate(self, key: PageKey, _claim: RegenerationClaim) {
        tracing::debug!(?key, "Regenerating stale page");
        match self.render(&key).await {
            Ok(page) => self.cache.insert(key, page),
            Err(WebError::NotFound) => {
                tracing::info!(?key, "Recipe is gone, evicting its page");
                self.cache.remove(&key);
            }
            Err(err) => tracing::error!(?key, error = %err, "Regeneration failed, keeping stale page"),
        }
    }

    pub async fn render(&self, key: &PageKey) -> WebResult<CachedPage> {
        let locale = key.locale();
        let alternates = i18n::alternates(&key.base_path(), locale);
        let common = context! {
            locale => locale,
            t => i18n::strings(locale),
            alternates => alternates,
            home_href => locale.localize_path("/"),
            list_href => locale.localize_path("/recipes"),
            site_url => self.site_url.as_ref(),
        };

        match key {
            PageKey::Home(_) => {
                let featured = self.source.fetch_featured(locale, FEATURED_LIMIT).await;
                let featured = RecipeView::build_all(&featured, locale);
                let html = TEMPLATES.get_template("index.html.jinja")?.render(context! {
                    recipes => cards(&featured, locale, CARD_IMAGE_WIDTH),
                    ..common
                })?;
                Ok(CachedPage::new(html, LISTING_REVALIDATE))
            }
            PageKey::List(_) => {
                let recipes = self.source.fetch_all(locale).await;
                let recipes = RecipeView::build_all(&recipes, locale);
                let html = TEMPLATES.get_template("recipes.html.jinja")?.render(context! {
                    categories => categories(&recipes),
                    recipes => cards(&recipes, locale, CARD_IMAGE_WIDTH),
                    ..common
                })?;
                Ok(CachedPage::new(html, LISTING_REVALIDATE))
            }
            PageKey::Detail { slug, .. } => {
                let raw = self
                    .source
                    .fetch_by_slug(slug, locale)
                    .await
                    .ok_or(WebError::NotFound)?;
                let recipe = RecipeView::build(&raw, locale);
                let card = Card::new(&recipe, locale, DETAIL_IMAGE_WIDTH);
                let share_url =
                    tweet_url(&format!("{}{}", self.site_url, card.href), &recipe.title);
                let html = TEMPLATES.get_template("recipe.html.jinja")?.render(context! {
                    recipe => card,
                    share_url => share_url,
                    ..common
                })?;
                Ok(CachedPage::new(html, self.plan.revalidate))
            }
        }
    }
}

/// A recipe plus what the templates cannot work out themselves.
#[derive(Serialize)]
struct Card<'a> {
    #[serde(flatten)]
    recipe: &'a RecipeView,
    href: String,
    image_url: Option<String>,
}

impl<'a> Card<'a> {
    fn new(recipe: &'a RecipeView, locale: LocaleCode, image_width: u32) -> Self {
        let path = format!("/recipes/{}", url_escape::encode_component(&recipe.slug));
        Self {
            recipe,
            href: locale.localize_path(&path),
            image_url: recipe
                .image
                .as_ref()
                .and_then(|image| image.url(Some(image_width))),
        }
    }
}

fn cards(recipes: &[RecipeView], locale: LocaleCode, image_width: u32) -> Vec<Card<'_>> {
    recipes
        .iter()
        .map(|recipe| Card::new(recipe, locale, image_width))
        .collect()
}

/// Twitter intent link sharing `page_url` with `text` as the tweet body.
pub fn tweet_url(page_url: &str, text: &str) -> String {
    format!(
        "{TWEET_INTENT}?url={}&text={}",
        url_escape::encode_component(page_url),
        url_escape::encode_component(text)
    )
}
