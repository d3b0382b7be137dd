mod cms_stub;

use cms_stub::{CmsStub, UNREACHABLE};
use cocina::cms::{RecipeSource, SanitySource};
use cocina::config::SanityConfig;
use cocina::{LocaleCode, Resolved, Text};
use serde_json::json;

fn recipe(slug: &str, featured: bool) -> serde_json::Value {
    json!({
        "_id": format!("recipe-{slug}"),
        "title": {"_type": "localeString", "en": format!("{slug} (en)"), "es": format!("{slug} (es)")},
        "slug": {"_type": "slug", "current": slug},
        "description": "A weeknight favourite",
        "ingredients": [
            {"_type": "block", "style": "normal", "listItem": "bullet", "markDefs": [],
             "children": [{"_type": "span", "text": "Rice", "marks": []}]}
        ],
        "featuredImage": {"asset": {"_ref": "image-Tb9Ew8CX-2000x3000-jpg"}},
        "category": {"title": "Spanish"},
        "difficulty": "Intermediate",
        "cookingTime": 45,
        "isFeatured": featured
    })
}

fn sanity_stub() -> CmsStub {
    CmsStub::spawn(|url| {
        let result = if url.contains(r#"defined(slug.current)"#) {
            json!([{"slug": "paella"}, {"slug": "curry"}, {"slug": "paella"}, {"slug": null}])
        } else if url.contains("isFeatured == true") {
            // Ignores the requested slice on purpose.
            json!([recipe("a", true), recipe("b", true), recipe("c", true), recipe("d", true)])
        } else if url.contains(r#"$slug="paella""#) {
            recipe("paella", false)
        } else if url.contains("$slug=") {
            json!(null)
        } else {
            json!([recipe("paella", false), {"_id": "draft", "title": "No slug yet"}])
        };
        (200, json!({"ms": 3, "query": "", "result": result}).to_string())
    })
}

fn source(api_base: &str, token: Option<&str>) -> SanitySource {
    SanitySource::new(
        reqwest::Client::new(),
        SanityConfig {
            project_id: Some("abc123".into()),
            dataset: Some("production".into()),
            token: token.map(String::from),
            api_base: Some(api_base.into()),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn slugs_are_unique() {
    let stub = sanity_stub();
    let mut slugs = source(&stub.base_url, None).list_slugs().await;
    slugs.sort();
    assert_eq!(slugs, vec!["curry", "paella"]);

    let requests = stub.requests();
    assert!(requests[0]
        .url
        .starts_with("/v2024-01-01/data/query/production?query="));
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn fetch_all_maps_records() {
    let stub = sanity_stub();
    let recipes = source(&stub.base_url, Some("secret")).fetch_all(LocaleCode::Es).await;

    assert_eq!(recipes.len(), 1, "records without a slug are dropped");
    let paella = &recipes[0];
    assert_eq!(paella.id, "recipe-paella");
    assert_eq!(paella.title.resolve(LocaleCode::Es), Resolved::Plain("paella (es)".into()));
    assert_eq!(paella.title.resolve(LocaleCode::Fr), Resolved::Plain("paella (en)".into()));
    assert_eq!(paella.description, Some(Text::from("A weeknight favourite")));
    assert!(matches!(paella.ingredients, Some(Text::Rich(_))));
    assert_eq!(paella.category, Some(Text::from("Spanish")));
    assert_eq!(paella.difficulty, "Intermediate");
    assert_eq!(paella.cooking_time, 45);
    assert_eq!(
        paella.image.as_ref().and_then(|i| i.url(None)).as_deref(),
        Some("https://cdn.sanity.io/images/abc123/production/Tb9Ew8CX-2000x3000.jpg")
    );

    assert_eq!(
        stub.requests()[0].authorization.as_deref(),
        Some("Bearer secret")
    );
}

#[tokio::test]
async fn featured_respects_limit() {
    let stub = sanity_stub();
    let featured = source(&stub.base_url, None)
        .fetch_featured(LocaleCode::En, 3)
        .await;
    assert_eq!(featured.len(), 3);
    assert!(featured.iter().all(|r| r.is_featured));
    assert!(stub.requests()[0].url.contains("[0...3]"));
}

#[tokio::test]
async fn fetch_by_slug_passes_a_parameter() {
    let stub = sanity_stub();
    let sanity = source(&stub.base_url, None);

    let found = sanity.fetch_by_slug("paella", LocaleCode::Fr).await;
    assert_eq!(found.map(|r| r.slug).as_deref(), Some("paella"));
    assert!(sanity.fetch_by_slug("ramen", LocaleCode::Fr).await.is_none());
}

#[tokio::test]
async fn error_statuses_fail_open() {
    let stub = CmsStub::spawn(|_| (401, json!({"error": "Unauthorized"}).to_string()));
    let sanity = source(&stub.base_url, None);

    assert!(sanity.list_slugs().await.is_empty());
    assert!(sanity.fetch_all(LocaleCode::En).await.is_empty());
    assert!(sanity.fetch_featured(LocaleCode::En, 3).await.is_empty());
    assert!(sanity.fetch_by_slug("paella", LocaleCode::En).await.is_none());
}

#[tokio::test]
async fn unreachable_backend_fails_open() {
    let sanity = source(UNREACHABLE, None);
    assert!(sanity.fetch_all(LocaleCode::En).await.is_empty());
    assert!(sanity.list_slugs().await.is_empty());
}

#[tokio::test]
async fn missing_project_skips_the_network() {
    let stub = sanity_stub();
    let sanity = SanitySource::new(
        reqwest::Client::new(),
        SanityConfig {
            dataset: Some("production".into()),
            api_base: Some(stub.base_url.clone()),
            ..Default::default()
        },
    );
    assert!(sanity.fetch_all(LocaleCode::En).await.is_empty());
    assert!(stub.requests().is_empty());
}
