//! Seed harvesting: extract chapter links from a locally saved index-page
//! snapshot and persist them as a crawl seed list.
//!
//! This is a sequential, single-pass utility feeding the crawler; it never
//! touches the network itself.

use crate::config::HarvestConfig;
use crate::error::{Error, Result};
use scraper::{Html, Selector};
use serde::Serialize;
use std::path::Path;
use url::Url;

/// One chapter link pulled off the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestedLink {
    /// Absolute page address
    pub url: String,
    /// Link text (usually the chapter title)
    pub title: String,
}

/// Extract chapter links from index-page markup.
///
/// Matches `profile.link_selector`, keeps hrefs that pass the optional path
/// prefix filter, and absolutizes relative hrefs against `base_url`. Order
/// follows document order, which on chapter indexes is reading order.
pub fn harvest_links(
    markup: &str,
    base_url: &Url,
    profile: &HarvestConfig,
) -> Result<Vec<HarvestedLink>> {
    let selector = Selector::parse(&profile.link_selector).map_err(|e| Error::Selector {
        selector: profile.link_selector.clone(),
        reason: e.to_string(),
    })?;

    let document = Html::parse_document(markup);
    let mut links = Vec::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(prefix) = &profile.path_prefix
            && !href.starts_with(prefix)
        {
            continue;
        }
        let Ok(absolute) = base_url.join(href) else {
            tracing::warn!(href, "skipping unparseable link");
            continue;
        };
        let title = anchor.text().collect::<String>().trim().to_string();
        links.push(HarvestedLink {
            url: absolute.to_string(),
            title,
        });
    }
    Ok(links)
}

/// Write harvested links as a seed-list JSON document.
///
/// The output (`{"seeds": [...]}`) is a complete crawler configuration file:
/// every other setting defaults.
pub fn write_seed_list(links: &[HarvestedLink], path: &Path) -> Result<()> {
    #[derive(Serialize)]
    struct SeedList<'a> {
        seeds: Vec<&'a str>,
    }

    let document = SeedList {
        seeds: links.iter().map(|link| link.url.as_str()).collect(),
    };
    std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
    Ok(())
}

/// Harvest a saved index-page file into a seed-list file; returns the number
/// of links found.
pub fn harvest_file(
    input: &Path,
    output: &Path,
    base_url: &Url,
    profile: &HarvestConfig,
) -> Result<usize> {
    let markup = std::fs::read_to_string(input)?;
    let links = harvest_links(&markup, base_url, profile)?;
    write_seed_list(&links, output)?;
    tracing::info!(
        count = links.len(),
        output = %output.display(),
        "seed list written"
    );
    Ok(links.len())
}
