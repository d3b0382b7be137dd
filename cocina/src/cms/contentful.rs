//! The document-query provider: Contentful's Content Delivery API.
//!
//! Entries are fetched one locale at a time, so fields usually arrive as single-locale
//! strings or rich text documents. Linked assets and categories come back in the
//! response's `includes` block and are resolved here.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{fail_open, locale_map, read_json, unique_slugs, CmsError, CmsResult, RecipeSource};
use crate::config::ContentfulConfig;
use crate::locale::{LocaleCode, Resolved, Text};
use crate::models::{ImageRef, RawRecord};
use crate::rich_text::{Block, RichDocument, Span};

const RECIPE_CONTENT_TYPE: &str = "recipe";

/// The largest page the delivery API will return.
const MAX_PAGE_SIZE: usize = 1000;

#[derive(Clone)]
pub struct ContentfulSource {
    client: reqwest::Client,
    config: ContentfulConfig,
}

#[derive(Deserialize, Default)]
struct EntryCollection {
    #[serde(default)]
    items: Vec<Entry>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Deserialize, Default)]
struct Includes {
    #[serde(default, rename = "Entry")]
    entries: Vec<Entry>,
    #[serde(default, rename = "Asset")]
    assets: Vec<Asset>,
}

#[derive(Deserialize)]
struct Entry {
    sys: Sys,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct Asset {
    sys: Sys,
    #[serde(default)]
    fields: AssetFields,
}

#[derive(Deserialize, Default)]
struct AssetFields {
    file: Option<AssetFile>,
}

#[derive(Deserialize)]
struct AssetFile {
    url: String,
}

#[derive(Deserialize)]
struct Sys {
    id: String,
}

impl Includes {
    fn asset(&self, link: Option<&Value>) -> Option<&Asset> {
        let id = link_id(link?)?;
        self.assets.iter().find(|a| a.sys.id == id)
    }

    fn entry(&self, link: Option<&Value>) -> Option<&Entry> {
        let id = link_id(link?)?;
        self.entries.iter().find(|e| e.sys.id == id)
    }
}

fn link_id(link: &Value) -> Option<&str> {
    link.pointer("/sys/id")?.as_str()
}

impl ContentfulSource {
    pub fn new(client: reqwest::Client, config: ContentfulConfig) -> Self {
        Self { client, config }
    }

    fn entries_url(&self) -> CmsResult<String> {
        let space_id = self
            .config
            .space_id
            .as_deref()
            .ok_or(CmsError::NotConfigured("Contentful space (CONTENTFUL_SPACE_ID)"))?;
        Ok(format!(
            "{}/spaces/{}/environments/{}/entries",
            self.config.api_base.trim_end_matches('/'),
            url_escape::encode_component(space_id),
            url_escape::encode_component(&self.config.environment),
        ))
    }

    async fn entries(&self, params: &[(&str, String)]) -> CmsResult<EntryCollection> {
        let url = self.entries_url()?;
        let token = self.config.access_token.as_deref().ok_or(CmsError::NotConfigured(
            "Contentful access token (CONTENTFUL_ACCESS_TOKEN)",
        ))?;
        let response = self
            .client
            .get(url)
            .query(&[("content_type", RECIPE_CONTENT_TYPE)])
            .query(params)
            .bearer_auth(token)
            .send()
            .await?;
        read_json(response).await
    }

    async fn recipes(&self, locale: LocaleCode, params: &[(&str, String)]) -> CmsResult<Vec<RawRecord>> {
        let mut query = vec![("locale", locale.wire_tag().to_owned())];
        query.extend(params.iter().cloned());
        let collection = self.entries(&query).await?;
        Ok(collection
            .items
            .iter()
            .filter_map(|entry| record(entry, &collection.includes))
            .collect())
    }
}

#[async_trait]
impl RecipeSource for ContentfulSource {
    async fn list_slugs(&self) -> Vec<String> {
        let collection = self
            .entries(&[
                ("select", "fields.slug".to_owned()),
                ("limit", MAX_PAGE_SIZE.to_string()),
            ])
            .await;
        fail_open(
            "list_slugs",
            collection.map(|c| {
                unique_slugs(c.items.iter().filter_map(|item| {
                    item.fields.get("slug")?.as_str().map(str::to_owned)
                }))
            }),
        )
    }

    async fn fetch_all(&self, locale: LocaleCode) -> Vec<RawRecord> {
        let params = [("limit", MAX_PAGE_SIZE.to_string())];
        fail_open("fetch_all", self.recipes(locale, &params).await)
    }

    async fn fetch_featured(&self, locale: LocaleCode, limit: usize) -> Vec<RawRecord> {
        let params = [
            ("fields.isFeatured", "true".to_owned()),
            ("limit", limit.min(MAX_PAGE_SIZE).to_string()),
        ];
        let mut recipes = fail_open("fetch_featured", self.recipes(locale, &params).await);
        recipes.truncate(limit);
        recipes
    }

    async fn fetch_by_slug(&self, slug: &str, locale: LocaleCode) -> Option<RawRecord> {
        let params = [("fields.slug", slug.to_owned()), ("limit", "1".to_owned())];
        fail_open("fetch_by_slug", self.recipes(locale, &params).await)
            .into_iter()
            .next()
    }
}

/// Entries without a slug cannot be routed to and are dropped.
fn record(entry: &Entry, includes: &Includes) -> Option<RawRecord> {
    let fields = &entry.fields;
    let Some(slug) = fields
        .get("slug")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        tracing::debug!(id = entry.sys.id.as_str(), "Skipping entry without slug");
        return None;
    };
    Some(RawRecord {
        id: entry.sys.id.clone(),
        slug: slug.to_owned(),
        title: fields.get("title").and_then(parse_text).unwrap_or_default(),
        description: fields.get("description").and_then(parse_text),
        ingredients: fields.get("ingredients").and_then(parse_text),
        instructions: fields.get("instructions").and_then(parse_text),
        image: includes
            .asset(fields.get("featuredImage"))
            .and_then(|asset| asset.fields.file.as_ref())
            .map(|file| ImageRef::Url {
                url: file.url.clone(),
            }),
        category: includes
            .entry(fields.get("category"))
            .and_then(|category| category.fields.get("title"))
            .and_then(parse_text),
        difficulty: fields
            .get("difficulty")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        cooking_time: fields
            .get("cookingTime")
            .and_then(Value::as_f64)
            .map_or(0, |t| t.max(0.0).round() as u32),
        is_featured: fields
            .get("isFeatured")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// Interpret a localizable Contentful field.
fn parse_text(value: &Value) -> Option<Text> {
    match value {
        Value::Null => None,
        Value::Object(fields) if fields.contains_key("nodeType") => {
            parse_resolved(value).map(Text::from)
        }
        // Fetched with `locale=*`, every field is keyed by locale tag.
        Value::Object(fields) => Some(locale_map(fields, parse_resolved)),
        Value::String(text) => Some(Text::Plain(text.clone())),
        other => Some(Text::Plain(other.to_string())),
    }
}

fn parse_resolved(value: &Value) -> Option<Resolved> {
    match value {
        Value::String(text) => Some(Resolved::Plain(text.clone())),
        Value::Object(_) => {
            let node = Node::deserialize(value).ok()?;
            (node.node_type == "document").then(|| Resolved::Rich(rich_text(&node)))
        }
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Node {
    node_type: String,
    #[serde(default)]
    content: Vec<Node>,
    value: Option<String>,
    #[serde(default)]
    marks: Vec<Mark>,
    #[serde(default)]
    data: NodeData,
}

#[derive(Deserialize)]
struct Mark {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize, Default)]
struct NodeData {
    uri: Option<String>,
}

/// Convert a Contentful rich text document into a rich document.
///
/// Embedded entries, assets and horizontal rules have no counterpart and are skipped.
fn rich_text(document: &Node) -> RichDocument {
    let mut doc = RichDocument::default();
    for node in &document.content {
        let kind = node.node_type.as_str();
        match kind {
            "paragraph" => doc.push(Block::Paragraph {
                spans: inline_spans(&node.content, None),
            }),
            "blockquote" => doc.push(Block::Quote {
                spans: inline_spans(&node.content, None),
            }),
            "unordered-list" | "ordered-list" => {
                for item in node.content.iter().filter(|n| n.node_type == "list-item") {
                    doc.push_list_item(kind == "ordered-list", inline_spans(&item.content, None));
                }
            }
            _ => match kind.strip_prefix("heading-").and_then(|l| l.parse().ok()) {
                Some(level) => doc.push(Block::heading(level, inline_spans(&node.content, None))),
                None => tracing::debug!(node_type = kind, "Skipping rich text node"),
            },
        }
    }
    doc
}

/// Flatten inline nodes (and paragraphs nested in quotes or list items) into spans.
fn inline_spans(nodes: &[Node], link: Option<&str>) -> Vec<Span> {
    let mut spans = Vec::new();
    for node in nodes {
        match node.node_type.as_str() {
            "text" => {
                let mut span = Span::plain(node.value.clone().unwrap_or_default());
                for mark in &node.marks {
                    match mark.kind.as_str() {
                        "bold" => span.bold = true,
                        "italic" => span.italic = true,
                        "underline" => span.underline = true,
                        _ => {}
                    }
                }
                span.link = link.map(str::to_owned);
                spans.push(span);
            }
            "hyperlink" => spans.extend(inline_spans(&node.content, node.data.uri.as_deref())),
            _ => spans.extend(inline_spans(&node.content, link)),
        }
    }
    spans
}
