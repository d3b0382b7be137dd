use chrono::{DateTime, SecondsFormat, Utc};
use minijinja::context;
use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::locale::LocaleCode;
use crate::plan::enumerate_paths;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Slugs used when the sitemap is generated without asking the CMS.
pub const SAMPLE_SLUGS: [&str; 3] = [
    "indian-butter-chicken",
    "classic-spanish-paella",
    "italian-pasta-carbonara",
];

const HOME_PRIORITY: f32 = 1.0;
const LIST_PRIORITY: f32 = 0.8;
const DETAIL_PRIORITY: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ChangeFrequency {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: DateTime<Utc>,
    pub changefreq: ChangeFrequency,
    pub priority: f32,
}

lazy_static::lazy_static! {
    static ref TEMPLATES: minijinja::Environment<'static> = {
        let mut env = minijinja::Environment::new();
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        env.add_template("sitemap.xml.jinja", include_str!("../templates/sitemap.xml.jinja"))
            .expect("Failed to register template");
        env.add_filter("xml", xml_escape);
        env
    };
}

fn xml_escape(value: String) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Every page of the site: home and list per locale, then each recipe in each locale.
///
/// All entries share `now` as their modification time.
pub fn build(
    base_url: &str,
    slugs: &[String],
    locales: &[LocaleCode],
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let base_url = base_url.trim().trim_end_matches('/');
    let entry = |path: String, changefreq, priority| SitemapEntry {
        loc: format!("{base_url}{path}"),
        lastmod: now,
        changefreq,
        priority,
    };

    let mut entries = Vec::with_capacity(locales.len() * (2 + slugs.len()));
    for &locale in locales {
        entries.push(entry(
            locale.localize_path("/"),
            ChangeFrequency::Daily,
            HOME_PRIORITY,
        ));
        entries.push(entry(
            locale.localize_path("/recipes"),
            ChangeFrequency::Daily,
            LIST_PRIORITY,
        ));
    }
    for page in enumerate_paths(slugs, locales) {
        let path = format!("/recipes/{}", url_escape::encode_component(&page.slug));
        entries.push(entry(
            page.locale.localize_path(&path),
            ChangeFrequency::Weekly,
            DETAIL_PRIORITY,
        ));
    }
    entries
}

#[derive(Serialize)]
struct UrlRow<'a> {
    loc: &'a str,
    lastmod: String,
    changefreq: &'static str,
    priority: String,
}

/// Render entries as a sitemap document.
pub fn to_xml(entries: &[SitemapEntry]) -> Result<String, minijinja::Error> {
    let urls = entries
        .iter()
        .map(|e| UrlRow {
            loc: &e.loc,
            lastmod: e.lastmod.to_rfc3339_opts(SecondsFormat::Millis, true),
            changefreq: e.changefreq.into(),
            priority: format!("{:.1}", e.priority),
        })
        .collect::<Vec<_>>();
    TEMPLATES.get_template("sitemap.xml.jinja")?.render(context! {
        namespace => SITEMAP_NAMESPACE,
        urls => urls,
    })
}
