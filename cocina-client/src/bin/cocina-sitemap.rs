use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cocina::config::{env_var, CmsConfig};
use cocina::{sitemap, LocaleCode};

/// Write the sitemap for every page of the site
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Where to write the sitemap
    #[arg(long, default_value = "public/sitemap.xml")]
    out: PathBuf,
    /// Absolute site URL; defaults to SITE_URL, then http://localhost:3002
    #[arg(long)]
    base_url: Option<String>,
    /// Use a fixed list of sample recipes instead of asking the CMS
    #[arg(long)]
    sample: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let base_url = args
        .base_url
        .or_else(|| env_var("SITE_URL"))
        .unwrap_or_else(|| "http://localhost:3002".into());

    let slugs: Vec<String> = if args.sample {
        sitemap::SAMPLE_SLUGS.iter().map(|s| s.to_string()).collect()
    } else {
        let config = CmsConfig::from_env().context("Reading CMS settings")?;
        cocina::cms::connect(&config).list_slugs().await
    };
    tracing::info!(slugs = slugs.len(), sample = args.sample, "Collected recipe slugs");
    if slugs.is_empty() {
        eprintln!("Warning: no recipes found, only the fixed pages will be listed");
    }

    println!("Generating sitemap URLs for {base_url}...");
    let entries = sitemap::build(&base_url, &slugs, &LocaleCode::ALL, chrono::Utc::now());
    println!("Generated {} URLs", entries.len());

    let xml = sitemap::to_xml(&entries).context("Rendering sitemap")?;
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating {}", parent.display()))?;
    }
    std::fs::write(&args.out, xml).with_context(|| format!("Writing {}", args.out.display()))?;
    println!("Sitemap written to {}", args.out.display());
    Ok(())
}
