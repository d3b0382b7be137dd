use std::fmt;

use serde::{Serialize, Serializer};
use strum::EnumString;

use crate::locale::Text;

/// A recipe as a CMS returned it, before any locale has been chosen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub id: String,
    pub slug: String,
    pub title: Text,
    pub description: Option<Text>,
    pub ingredients: Option<Text>,
    pub instructions: Option<Text>,
    pub image: Option<ImageRef>,
    /// Title of the linked category, if any.
    pub category: Option<Text>,
    /// The difficulty label in the source system's own vocabulary.
    pub difficulty: String,
    /// Minutes.
    pub cooking_time: u32,
    pub is_featured: bool,
}

/// Where a recipe's featured image lives, and how to ask for a given size of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// A Sanity asset reference such as `image-Tb9Ew8CX-2000x3000-jpg`.
    SanityAsset {
        project_id: String,
        dataset: String,
        asset_ref: String,
    },
    /// A direct asset URL, possibly protocol-relative.
    Url { url: String },
}

impl ImageRef {
    /// Absolute URL of the image, scaled to `width` pixels when given.
    ///
    /// Returns `None` for asset references that do not follow the `image-<id>-<format>` shape.
    pub fn url(&self, width: Option<u32>) -> Option<String> {
        let base = match self {
            ImageRef::SanityAsset {
                project_id,
                dataset,
                asset_ref,
            } => {
                let (id, format) = asset_ref.strip_prefix("image-")?.rsplit_once('-')?;
                if id.is_empty() || format.is_empty() {
                    return None;
                }
                format!("https://cdn.sanity.io/images/{project_id}/{dataset}/{id}.{format}")
            }
            ImageRef::Url { url } if url.starts_with("//") => format!("https:{url}"),
            ImageRef::Url { url } => url.clone(),
        };
        Some(match width {
            Some(w) if base.contains('?') => format!("{base}&w={w}"),
            Some(w) => format!("{base}?w={w}"),
            None => base,
        })
    }
}

/// Recipe difficulty in the vocabulary the site uses.
///
/// The two CMSes label the same three levels differently (Beginner/Intermediate/Advanced
/// and Easy/Medium/Hard). Labels outside both sets are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum Difficulty {
    #[strum(serialize = "Easy", serialize = "Beginner")]
    Easy,
    #[strum(serialize = "Medium", serialize = "Intermediate")]
    Medium,
    #[strum(serialize = "Hard", serialize = "Advanced")]
    Hard,
    #[strum(default)]
    Other(String),
}

impl Difficulty {
    pub fn normalize(label: &str) -> Self {
        label
            .parse()
            .unwrap_or_else(|_| Difficulty::Other(label.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Other(label) => label,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
