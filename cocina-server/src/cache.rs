//! Rendered pages, served stale while a fresh copy is rendered in the background.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use cocina::plan::Revalidate;
use cocina::LocaleCode;
use quick_cache::sync::Cache;
use quick_cache::Weighter;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageKey {
    Home(LocaleCode),
    List(LocaleCode),
    Detail { slug: String, locale: LocaleCode },
}

impl PageKey {
    pub fn locale(&self) -> LocaleCode {
        match self {
            PageKey::Home(locale) | PageKey::List(locale) => *locale,
            PageKey::Detail { locale, .. } => *locale,
        }
    }

    /// Site path of the page in the fallback locale.
    pub fn base_path(&self) -> String {
        match self {
            PageKey::Home(_) => "/".into(),
            PageKey::List(_) => "/recipes".into(),
            PageKey::Detail { slug, .. } => {
                format!("/recipes/{}", url_escape::encode_component(slug))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedPage {
    pub html: Arc<str>,
    pub rendered_at: Instant,
    pub revalidate: Revalidate,
}

impl CachedPage {
    pub fn new(html: String, revalidate: Revalidate) -> Self {
        Self {
            html: html.into(),
            rendered_at: Instant::now(),
            revalidate,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.rendered_at.elapsed() >= self.revalidate.as_duration()
    }
}

#[derive(Clone)]
pub struct PageWeighter;

impl Weighter<PageKey, CachedPage> for PageWeighter {
    fn weight(&self, _key: &PageKey, page: &CachedPage) -> u64 {
        page.html.len() as u64
    }
}

#[derive(Clone)]
pub struct PageCache {
    pub pages: Arc<Cache<PageKey, CachedPage, PageWeighter>>,
    regenerating: Arc<Mutex<HashSet<PageKey>>>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCache {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Cache::with_weighter(1000, 50 << 20, PageWeighter)),
            regenerating: Arc::default(),
        }
    }

    pub fn get(&self, key: &PageKey) -> Option<CachedPage> {
        self.pages.get(key)
    }

    pub fn insert(&self, key: PageKey, page: CachedPage) {
        self.pages.insert(key, page);
    }

    pub fn remove(&self, key: &PageKey) {
        self.pages.remove(key);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Claim the background regeneration of `key`.
    ///
    /// Returns `None` while another regeneration of the same page is still running.
    pub fn claim_regeneration(&self, key: &PageKey) -> Option<RegenerationClaim> {
        let mut regenerating = self.regenerating.lock().unwrap_or_else(|e| e.into_inner());
        regenerating.insert(key.clone()).then(|| RegenerationClaim {
            key: key.clone(),
            regenerating: self.regenerating.clone(),
        })
    }
}

/// Released when dropped, whether the regeneration succeeded or not.
pub struct RegenerationClaim {
    key: PageKey,
    regenerating: Arc<Mutex<HashSet<PageKey>>>,
}

impl Drop for RegenerationClaim {
    fn drop(&mut self) {
        let mut regenerating = self.regenerating.lock().unwrap_or_else(|e| e.into_inner());
        regenerating.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn detail(slug: &str) -> PageKey {
        PageKey::Detail {
            slug: slug.into(),
            locale: LocaleCode::Es,
        }
    }

    #[test]
    fn one_regeneration_per_page() {
        let cache = PageCache::new();
        let claim = cache.claim_regeneration(&detail("pasta"));
        assert!(claim.is_some());
        assert!(cache.claim_regeneration(&detail("pasta")).is_none());
        assert!(cache.claim_regeneration(&detail("paella")).is_some());

        drop(claim);
        assert!(cache.claim_regeneration(&detail("pasta")).is_some());
    }

    #[test]
    fn pages_go_stale_after_their_window() {
        let mut page = CachedPage::new("<p>hi</p>".into(), Revalidate::from_secs(60).unwrap());
        assert!(!page.is_stale());
        page.rendered_at -= Duration::from_secs(61);
        assert!(page.is_stale());
    }

    #[test]
    fn paths_per_page() {
        assert_eq!(PageKey::Home(LocaleCode::Fr).base_path(), "/");
        assert_eq!(PageKey::List(LocaleCode::Fr).base_path(), "/recipes");
        assert_eq!(detail("crème brûlée").base_path(), "/recipes/cr%C3%A8me%20br%C3%BBl%C3%A9e");
        assert_eq!(detail("pasta").locale(), LocaleCode::Es);
    }
}
