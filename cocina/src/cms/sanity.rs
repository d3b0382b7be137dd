//! The structured-query provider: Sanity's GROQ HTTP API.
//!
//! Sanity keeps every translation inside the document, so localizable fields arrive as
//! plain strings, Portable Text arrays, or objects keyed by locale.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{fail_open, locale_map, read_json, unique_slugs, CmsError, CmsResult, RecipeSource};
use crate::config::SanityConfig;
use crate::locale::{LocaleCode, Resolved, Text};
use crate::models::{ImageRef, RawRecord};
use crate::rich_text::{Block, RichDocument, Span};

/// Left in `.env.example`; treated the same as no project id at all.
const PLACEHOLDER_PROJECT_ID: &str = "your_sanity_project_id";

const RECIPE_PROJECTION: &str = r#"{
  _id,
  title,
  slug,
  description,
  ingredients,
  instructions,
  featuredImage,
  "category": category->{title},
  difficulty,
  cookingTime,
  isFeatured
}"#;

const SLUGS_QUERY: &str =
    r#"*[_type == "recipe" && defined(slug.current)]{ "slug": slug.current }"#;

lazy_static::lazy_static! {
    static ref PROJECT_ID_FORMAT: regex::Regex =
        regex::Regex::new("^[a-z0-9-]+$").expect("Invalid project id pattern");
}

fn recipe_query(filter: &str, slice: &str) -> String {
    format!(r#"*[_type == "recipe"{filter}]{slice}{RECIPE_PROJECTION}"#)
}

#[derive(Clone)]
pub struct SanitySource {
    client: reqwest::Client,
    config: SanityConfig,
}

#[derive(Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Deserialize)]
struct SlugRow {
    slug: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SanityRecipe {
    #[serde(rename = "_id")]
    id: String,
    title: Option<Value>,
    slug: Option<Value>,
    description: Option<Value>,
    ingredients: Option<Value>,
    instructions: Option<Value>,
    featured_image: Option<SanityImage>,
    category: Option<SanityCategory>,
    difficulty: Option<String>,
    cooking_time: Option<f64>,
    is_featured: Option<bool>,
}

#[derive(Deserialize)]
struct SanityImage {
    asset: Option<SanityAsset>,
}

#[derive(Deserialize)]
struct SanityAsset {
    #[serde(rename = "_ref")]
    reference: Option<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct SanityCategory {
    title: Option<Value>,
}

impl SanitySource {
    pub fn new(client: reqwest::Client, config: SanityConfig) -> Self {
        if let Some(project_id) = &config.project_id {
            if !PROJECT_ID_FORMAT.is_match(project_id) {
                tracing::warn!(
                    project_id,
                    "Invalid Sanity project ID format, check SANITY_PROJECT_ID"
                );
            }
        }
        Self { client, config }
    }

    fn project(&self) -> CmsResult<(&str, &str)> {
        let project_id = self
            .config
            .project_id
            .as_deref()
            .filter(|id| *id != PLACEHOLDER_PROJECT_ID)
            .ok_or(CmsError::NotConfigured("Sanity project id (SANITY_PROJECT_ID)"))?;
        let dataset = self
            .config
            .dataset
            .as_deref()
            .ok_or(CmsError::NotConfigured("Sanity dataset (SANITY_DATASET)"))?;
        Ok((project_id, dataset))
    }

    fn query_url(&self) -> CmsResult<String> {
        let (project_id, dataset) = self.project()?;
        let base = match &self.config.api_base {
            Some(base) => base.trim_end_matches('/').to_owned(),
            // The CDN only serves public data; authenticated reads go to the live API.
            None if self.config.token.is_some() => format!("https://{project_id}.api.sanity.io"),
            None => format!("https://{project_id}.apicdn.sanity.io"),
        };
        Ok(format!(
            "{base}/v{}/data/query/{}",
            self.config.api_version.trim_start_matches('v'),
            url_escape::encode_component(dataset)
        ))
    }

    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, String)],
    ) -> CmsResult<T> {
        let mut request = self.client.get(self.query_url()?).query(&[("query", groq)]);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        let response: QueryResponse<T> = read_json(request.send().await?).await?;
        Ok(response.result)
    }

    async fn query_recipes(&self, groq: &str) -> CmsResult<Vec<RawRecord>> {
        let docs: Vec<SanityRecipe> = self.query(groq, &[]).await?;
        Ok(docs.into_iter().filter_map(|doc| self.record(doc)).collect())
    }

    /// Records without a slug cannot be routed to and are dropped.
    fn record(&self, doc: SanityRecipe) -> Option<RawRecord> {
        let Some(slug) = doc.slug.as_ref().and_then(slug_of) else {
            tracing::debug!(id = doc.id.as_str(), "Skipping recipe without slug");
            return None;
        };
        let (project_id, dataset) = self.project().unwrap_or_default();
        Some(RawRecord {
            slug,
            title: doc.title.as_ref().and_then(parse_text).unwrap_or_default(),
            description: doc.description.as_ref().and_then(parse_text),
            ingredients: doc.ingredients.as_ref().and_then(parse_text),
            instructions: doc.instructions.as_ref().and_then(parse_text),
            image: doc
                .featured_image
                .and_then(|image| image.asset)
                .and_then(|asset| match (asset.reference, asset.url) {
                    (_, Some(url)) => Some(ImageRef::Url { url }),
                    (Some(asset_ref), None) => Some(ImageRef::SanityAsset {
                        project_id: project_id.to_owned(),
                        dataset: dataset.to_owned(),
                        asset_ref,
                    }),
                    (None, None) => None,
                }),
            category: doc
                .category
                .and_then(|c| c.title)
                .as_ref()
                .and_then(parse_text),
            difficulty: doc.difficulty.unwrap_or_default(),
            cooking_time: doc.cooking_time.map_or(0, |t| t.max(0.0).round() as u32),
            is_featured: doc.is_featured.unwrap_or(false),
            id: doc.id,
        })
    }
}

#[async_trait]
impl RecipeSource for SanitySource {
    async fn list_slugs(&self) -> Vec<String> {
        let rows = self.query::<Vec<SlugRow>>(SLUGS_QUERY, &[]).await;
        fail_open(
            "list_slugs",
            rows.map(|rows| unique_slugs(rows.into_iter().filter_map(|r| r.slug))),
        )
    }

    async fn fetch_all(&self, locale: LocaleCode) -> Vec<RawRecord> {
        tracing::debug!(%locale, "Fetching all recipes from Sanity");
        fail_open("fetch_all", self.query_recipes(&recipe_query("", "")).await)
    }

    async fn fetch_featured(&self, locale: LocaleCode, limit: usize) -> Vec<RawRecord> {
        tracing::debug!(%locale, limit, "Fetching featured recipes from Sanity");
        let groq = recipe_query(" && isFeatured == true", &format!("[0...{limit}]"));
        let mut recipes = fail_open("fetch_featured", self.query_recipes(&groq).await);
        recipes.truncate(limit);
        recipes
    }

    async fn fetch_by_slug(&self, slug: &str, locale: LocaleCode) -> Option<RawRecord> {
        tracing::debug!(%locale, slug, "Fetching recipe from Sanity");
        let groq = recipe_query(" && slug.current == $slug", "[0]");
        let result: CmsResult<Option<RawRecord>> = async {
            let param = serde_json::to_string(slug)?;
            let doc: Option<SanityRecipe> = self.query(&groq, &[("$slug", param)]).await?;
            Ok(doc.and_then(|doc| self.record(doc)))
        }
        .await;
        fail_open("fetch_by_slug", result)
    }
}

fn slug_of(value: &Value) -> Option<String> {
    let slug = match value {
        Value::String(slug) => slug.as_str(),
        Value::Object(fields) => fields.get("current")?.as_str()?,
        _ => return None,
    };
    Some(slug.trim().to_owned()).filter(|s| !s.is_empty())
}

/// Interpret a localizable Sanity field.
fn parse_text(value: &Value) -> Option<Text> {
    match value {
        Value::Null => None,
        Value::Object(fields) => Some(locale_map(fields, parse_resolved)),
        Value::Bool(_) | Value::Number(_) => Some(Text::Plain(value.to_string())),
        Value::String(_) | Value::Array(_) => parse_resolved(value).map(Text::from),
    }
}

fn parse_resolved(value: &Value) -> Option<Resolved> {
    match value {
        Value::String(text) => Some(Resolved::Plain(text.clone())),
        Value::Array(blocks) => Some(Resolved::Rich(portable_text(blocks))),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PtBlock {
    #[serde(rename = "_type")]
    kind: String,
    style: Option<String>,
    list_item: Option<String>,
    #[serde(default)]
    children: Vec<PtSpan>,
    #[serde(default)]
    mark_defs: Vec<PtMarkDef>,
}

#[derive(Deserialize)]
struct PtSpan {
    #[serde(default)]
    text: String,
    #[serde(default)]
    marks: Vec<String>,
}

#[derive(Deserialize)]
struct PtMarkDef {
    #[serde(rename = "_key")]
    key: String,
    #[serde(rename = "_type")]
    kind: String,
    href: Option<String>,
}

/// Convert Portable Text blocks into a rich document.
///
/// Non-text blocks (images, embeds) are skipped; list items are regrouped into lists.
fn portable_text(blocks: &[Value]) -> RichDocument {
    let mut doc = RichDocument::default();
    for value in blocks {
        let block = match PtBlock::deserialize(value) {
            Ok(block) if block.kind == "block" => block,
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(error = %err, "Skipping unreadable Portable Text block");
                continue;
            }
        };
        let spans = block
            .children
            .iter()
            .map(|child| portable_span(child, &block.mark_defs))
            .collect::<Vec<_>>();
        match (block.list_item.as_deref(), block.style.as_deref()) {
            (Some("number"), _) => doc.push_list_item(true, spans),
            (Some(_), _) => doc.push_list_item(false, spans),
            (None, Some("blockquote")) => doc.push(Block::Quote { spans }),
            (None, Some(style)) if style.len() == 2 && style.starts_with('h') => {
                let level = style[1..].parse().unwrap_or(3);
                doc.push(Block::heading(level, spans));
            }
            (None, _) => doc.push(Block::Paragraph { spans }),
        }
    }
    doc
}

fn portable_span(child: &PtSpan, mark_defs: &[PtMarkDef]) -> Span {
    let mut span = Span::plain(child.text.clone());
    for mark in &child.marks {
        match mark.as_str() {
            "strong" => span.bold = true,
            "em" => span.italic = true,
            "underline" => span.underline = true,
            key => {
                span.link = mark_defs
                    .iter()
                    .find(|def| def.key == key && def.kind == "link")
                    .and_then(|def| def.href.clone())
                    .or(span.link.take());
            }
        }
    }
    span
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn portable_text_blocks() {
        let blocks = json!([
            {"_type": "block", "style": "h2", "children": [{"_type": "span", "text": "Sauce"}]},
            {
                "_type": "block",
                "style": "normal",
                "markDefs": [{"_key": "abc", "_type": "link", "href": "https://example.com"}],
                "children": [
                    {"_type": "span", "text": "Use ", "marks": []},
                    {"_type": "span", "text": "good", "marks": ["strong", "em"]},
                    {"_type": "span", "text": " tomatoes", "marks": ["abc"]}
                ]
            },
            {"_type": "image", "asset": {"_ref": "image-x-1x1-png"}},
            {"_type": "block", "listItem": "bullet", "children": [{"_type": "span", "text": "salt"}]},
            {"_type": "block", "listItem": "bullet", "children": [{"_type": "span", "text": "oil"}]},
            {"_type": "block", "style": "blockquote", "children": [{"_type": "span", "text": "Grandma"}]}
        ]);
        let doc = portable_text(blocks.as_array().unwrap());

        assert_eq!(doc.blocks.len(), 4);
        assert_eq!(doc.blocks[0], Block::heading(2, vec![Span::plain("Sauce")]));
        let Block::Paragraph { spans } = &doc.blocks[1] else {
            panic!("expected paragraph, got {:?}", doc.blocks[1]);
        };
        assert!(spans[1].bold && spans[1].italic && !spans[1].underline);
        assert_eq!(spans[2].link.as_deref(), Some("https://example.com"));
        assert_eq!(
            doc.blocks[2],
            Block::List {
                ordered: false,
                items: vec![vec![Span::plain("salt")], vec![Span::plain("oil")]],
            }
        );
        assert_eq!(
            doc.blocks[3],
            Block::Quote {
                spans: vec![Span::plain("Grandma")]
            }
        );
    }

    #[test]
    fn field_shapes() {
        assert_eq!(parse_text(&json!("Pasta")), Some(Text::from("Pasta")));
        assert_eq!(parse_text(&Value::Null), None);
        assert!(matches!(parse_text(&json!([])), Some(Text::Rich(_))));

        let Some(Text::Localized(map)) = parse_text(&json!({
            "_type": "localeString",
            "en": "Chicken",
            "es": "Pollo",
            "de": "Hähnchen"
        })) else {
            panic!("expected a locale map");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map[&LocaleCode::Es], Resolved::Plain("Pollo".into()));
    }

    #[test]
    fn slugs_come_in_two_shapes() {
        assert_eq!(slug_of(&json!({"current": "pasta"})).as_deref(), Some("pasta"));
        assert_eq!(slug_of(&json!("paella")).as_deref(), Some("paella"));
        assert_eq!(slug_of(&json!({"current": ""})), None);
        assert_eq!(slug_of(&json!(3)), None);
    }

    #[test]
    fn query_url_prefers_cdn_without_token() {
        let config = SanityConfig {
            project_id: Some("abc123".into()),
            dataset: Some("production".into()),
            ..Default::default()
        };
        let source = SanitySource::new(reqwest::Client::new(), config.clone());
        assert_eq!(
            source.query_url().unwrap(),
            "https://abc123.apicdn.sanity.io/v2024-01-01/data/query/production"
        );

        let source = SanitySource::new(
            reqwest::Client::new(),
            SanityConfig {
                token: Some("secret".into()),
                ..config
            },
        );
        assert!(source.query_url().unwrap().starts_with("https://abc123.api.sanity.io/"));
    }

    #[test]
    fn placeholder_project_is_not_configured() {
        let source = SanitySource::new(
            reqwest::Client::new(),
            SanityConfig {
                project_id: Some(PLACEHOLDER_PROJECT_ID.into()),
                dataset: Some("production".into()),
                ..Default::default()
            },
        );
        assert!(matches!(
            source.query_url(),
            Err(CmsError::NotConfigured(_))
        ));
    }
}
