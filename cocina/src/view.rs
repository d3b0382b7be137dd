use itertools::Itertools;
use serde::Serialize;

use crate::locale::{LocaleCode, Resolved, Text};
use crate::models::{Difficulty, ImageRef, RawRecord};

/// A recipe ready for the templates: every text field resolved for one locale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeView {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<Resolved>,
    pub ingredients: Option<Resolved>,
    pub instructions: Option<Resolved>,
    pub image: Option<ImageRef>,
    pub category: Option<String>,
    pub difficulty: Difficulty,
    pub cooking_time: u32,
    pub is_featured: bool,
}

impl RecipeView {
    pub fn build(raw: &RawRecord, locale: LocaleCode) -> Self {
        let resolve = |field: &Option<Text>| field.as_ref().map(|t| t.resolve(locale));
        Self {
            id: raw.id.clone(),
            slug: raw.slug.clone(),
            title: raw.title.resolve(locale).to_plain_text(),
            description: resolve(&raw.description),
            ingredients: resolve(&raw.ingredients),
            instructions: resolve(&raw.instructions),
            image: raw.image.clone(),
            category: raw
                .category
                .as_ref()
                .map(|c| c.resolve(locale).to_plain_text())
                .filter(|c| !c.trim().is_empty()),
            difficulty: Difficulty::normalize(&raw.difficulty),
            cooking_time: raw.cooking_time,
            is_featured: raw.is_featured,
        }
    }

    pub fn build_all(raws: &[RawRecord], locale: LocaleCode) -> Vec<Self> {
        raws.iter().map(|raw| Self::build(raw, locale)).collect()
    }
}

/// Distinct category titles, sorted, for the list page's filter.
pub fn categories(recipes: &[RecipeView]) -> Vec<String> {
    recipes
        .iter()
        .filter_map(|r| r.category.clone())
        .sorted()
        .dedup()
        .collect()
}
