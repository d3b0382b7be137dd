use async_trait::async_trait;

use super::{unique_slugs, RecipeSource};
use crate::locale::LocaleCode;
use crate::models::RawRecord;

/// A fixed set of recipes held in memory, for local previews and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    recipes: Vec<RawRecord>,
}

impl MemorySource {
    pub fn new(recipes: Vec<RawRecord>) -> Self {
        Self { recipes }
    }
}

#[async_trait]
impl RecipeSource for MemorySource {
    async fn list_slugs(&self) -> Vec<String> {
        unique_slugs(self.recipes.iter().map(|r| r.slug.clone()))
    }

    async fn fetch_all(&self, _locale: LocaleCode) -> Vec<RawRecord> {
        self.recipes.clone()
    }

    async fn fetch_featured(&self, _locale: LocaleCode, limit: usize) -> Vec<RawRecord> {
        self.recipes
            .iter()
            .filter(|r| r.is_featured)
            .take(limit)
            .cloned()
            .collect()
    }

    async fn fetch_by_slug(&self, slug: &str, _locale: LocaleCode) -> Option<RawRecord> {
        self.recipes.iter().find(|r| r.slug == slug).cloned()
    }
}
