//! Markup cleaning: raw page markup -> (title, body) record.
//!
//! The cleaner is a pure, ordered pipeline over a parsed document tree:
//! structural removal first (pagination blocks, attribution paragraphs,
//! scripts, tracker containers), then comment-delimited ad blocks, then text
//! normalization. Each stage operates on the output of the previous one, and
//! the whole pipeline works on an isolated re-parse of the content container
//! so the input document is never mutated.
//!
//! `clean` never fails: a missing heading degrades to a sentinel title, a
//! missing content container or an implausibly short extraction degrades to a
//! diagnostic body. The caller still writes the file either way.

use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use crate::types::ExtractedRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Title used when the expected heading element is absent
pub const UNKNOWN_TITLE: &str = "unknown chapter";

/// Body used when the primary content container is absent
pub const CONTENT_NOT_FOUND: &str = "content not found";

/// Compiled extraction pipeline.
///
/// Selectors and patterns are compiled once from an [`ExtractConfig`];
/// [`Cleaner::clean`] itself is infallible.
pub struct Cleaner {
    title: Selector,
    content: Selector,
    pagination: Selector,
    paragraph: Selector,
    script: Selector,
    container: Selector,
    ad_block: Regex,
    horizontal_ws: Regex,
    attribution_phrase: String,
    tracker_token: String,
    min_content_chars: usize,
}

impl Cleaner {
    /// Compile the extraction profile.
    pub fn new(profile: &ExtractConfig) -> Result<Self> {
        let ad_block = Regex::new(&format!(
            "(?s){}.*?{}",
            regex::escape(&profile.ad_start_marker),
            regex::escape(&profile.ad_end_marker)
        ))?;
        Ok(Self {
            title: parse_selector(&profile.title_selector)?,
            content: parse_selector(&profile.content_selector)?,
            pagination: parse_selector(&profile.pagination_selector)?,
            paragraph: parse_selector("p")?,
            script: parse_selector("script")?,
            container: parse_selector("div")?,
            ad_block,
            horizontal_ws: Regex::new(r"[ \t]+")?,
            attribution_phrase: profile.attribution_phrase.clone(),
            tracker_token: profile.tracker_token.clone(),
            min_content_chars: profile.min_content_chars,
        })
    }

    /// Extract a (title, body) record from raw page markup.
    pub fn clean(&self, markup: &str) -> ExtractedRecord {
        let document = Html::parse_document(markup);

        let title = document
            .select(&self.title)
            .next()
            .map(element_text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let Some(container) = document.select(&self.content).next() else {
            return ExtractedRecord {
                title,
                body: CONTENT_NOT_FOUND.to_string(),
            };
        };

        // Isolated copy of the container; all removal passes run on this
        // fragment, never on the input document.
        let mut fragment = Html::parse_fragment(&container.html());

        self.strip_pagination(&mut fragment);
        self.strip_attribution(&mut fragment);
        self.strip_scripts(&mut fragment);
        self.strip_tracker_containers(&mut fragment);
        let without_ads = self
            .ad_block
            .replace_all(&fragment.root_element().html(), "")
            .into_owned();

        let body = self.normalize_text(&without_ads);
        ExtractedRecord { title, body }
    }

    fn strip_pagination(&self, fragment: &mut Html) {
        detach_matching(fragment, &self.pagination, |_| true);
    }

    fn strip_attribution(&self, fragment: &mut Html) {
        let phrase = self.attribution_phrase.clone();
        detach_matching(fragment, &self.paragraph, |el| {
            !phrase.is_empty() && element_text(el).contains(&phrase)
        });
    }

    fn strip_scripts(&self, fragment: &mut Html) {
        detach_matching(fragment, &self.script, |_| true);
    }

    /// Remove container elements that embed a script or mention the tracker
    /// token. The outermost element (the content container itself) is exempt;
    /// only nested containers are candidates.
    fn strip_tracker_containers(&self, fragment: &mut Html) {
        let content_root = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .map(|el| el.id());
        let script = self.script.clone();
        let token = self.tracker_token.clone();
        detach_matching(fragment, &self.container, move |el| {
            if content_root == Some(el.id()) {
                return false;
            }
            el.select(&script).next().is_some()
                || (!token.is_empty() && el.html().contains(&token))
        });
    }

    /// Stages 9-12: text-only re-parse, entity translation, line cleanup,
    /// low-confidence flagging.
    fn normalize_text(&self, cleaned_markup: &str) -> String {
        let reparsed = Html::parse_fragment(cleaned_markup);
        let raw_text = reparsed
            .root_element()
            .text()
            .collect::<String>()
            .replace("&nbsp;", " ")
            .replace('\u{a0}', " ");

        // Character count before line normalization; reported when the
        // extraction comes out implausibly short.
        let raw_len = raw_text.chars().count();

        let lines: Vec<String> = raw_text
            .lines()
            .filter_map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(self.horizontal_ws.replace_all(trimmed, " ").into_owned())
                }
            })
            .collect();
        let body = lines.join("\n\n").trim().to_string();

        if body.chars().count() < self.min_content_chars {
            format!("extraction may be incomplete, raw length: {raw_len}\n\n{body}")
        } else {
            body
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Collect the ids of all elements matching `selector` that satisfy the
/// predicate, then detach them from the tree. Ids are collected up front so
/// the immutable selection borrow ends before mutation begins.
fn detach_matching<F>(fragment: &mut Html, selector: &Selector, predicate: F)
where
    F: Fn(ElementRef<'_>) -> bool,
{
    let ids: Vec<_> = fragment
        .select(selector)
        .filter(|el| predicate(*el))
        .map(|el| el.id())
        .collect();
    for id in ids {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }
}
