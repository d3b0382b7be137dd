pub mod cms;
pub mod config;
pub mod locale;
pub mod models;
pub mod plan;
pub mod rich_text;
pub mod sitemap;
pub mod view;

pub use locale::{LocaleCode, Resolved, Text};
pub use models::{Difficulty, ImageRef, RawRecord};
pub use view::RecipeView;
