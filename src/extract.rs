// src/extract.rs

//! Heuristic DOM extraction of event records.
//!
//! The source page carries no stable card classes, so extraction is
//! title-first: every heading is a potential event, and the link, image,
//! date and description are hunted down from the heading's surroundings.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, ScrapedEvent};

/// Substrings marking an image URL as a tracking pixel or junk.
const JUNK_IMAGE_MARKERS: &[&str] = &["1x1", "pixel", "tracking", "data:image", "blank.gif"];

/// Link targets that are never event detail pages.
const SOCIAL_LINK_MARKERS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "mailto:",
];

/// Heuristic event extractor with pre-parsed selectors.
pub struct Extractor {
    heading_sel: Selector,
    anchor_sel: Selector,
    img_sel: Selector,
    date_sel: Selector,
    desc_sel: Selector,
    city: String,
    source_name: String,
    placeholder_image: String,
    description_limit: usize,
}

impl Extractor {
    /// Build an extractor from the application config, parsing all
    /// selectors up front.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            heading_sel: parse_selector(&config.extraction.heading_selector)?,
            anchor_sel: parse_selector("a")?,
            img_sel: parse_selector("img")?,
            date_sel: parse_selector(".date, time, [datetime], [class*=date]")?,
            desc_sel: parse_selector("p, .description, .summary, [class*=desc]")?,
            city: config.source.city.clone(),
            source_name: config.source.name.clone(),
            placeholder_image: config.extraction.placeholder_image.clone(),
            description_limit: config.extraction.description_limit,
        })
    }

    /// Extract every recognizable event from rendered page HTML.
    ///
    /// Headings that yield no usable title or link are skipped silently;
    /// extraction never fails the pass.
    pub fn extract(&self, html: &str, base_url: &Url) -> Vec<ScrapedEvent> {
        let doc = Html::parse_document(html);
        doc.select(&self.heading_sel)
            .filter_map(|heading| self.extract_one(heading, base_url))
            .collect()
    }

    fn extract_one(&self, heading: ElementRef<'_>, base_url: &Url) -> Option<ScrapedEvent> {
        let title = normalize_text(&heading.text().collect::<String>());
        if title.chars().count() < 3 {
            return None;
        }

        let anchor = self.find_anchor(heading)?;
        let source_url = self.resolve_href(anchor, base_url)?;

        let card = closest_card(heading);
        let context = card
            .or_else(|| closest_block(heading))
            .unwrap_or(heading);

        let image = self.resolve_image(anchor, context, base_url);
        let date = self.resolve_date(context);
        let description = self.resolve_description(context, heading);

        Some(ScrapedEvent {
            title,
            date,
            venue: self.city.clone(),
            city: self.city.clone(),
            description,
            image,
            source_url,
            source_name: self.source_name.clone(),
        })
    }

    /// Locate the detail link for a heading: an enclosing anchor first,
    /// then an anchor inside the heading, then one among its siblings.
    fn find_anchor<'a>(&self, heading: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if let Some(anchor) = ancestors(heading).find(|el| el.value().name() == "a") {
            return Some(anchor);
        }
        if let Some(anchor) = heading.select(&self.anchor_sel).next() {
            return Some(anchor);
        }
        let parent = heading.parent().and_then(ElementRef::wrap)?;
        parent.select(&self.anchor_sel).next()
    }

    /// Turn an anchor into an absolute event URL, rejecting stubs and
    /// social links.
    fn resolve_href(&self, anchor: ElementRef<'_>, base_url: &Url) -> Option<String> {
        let href = anchor.value().attr("href")?.trim();
        if href.is_empty() || href == "#" || href.starts_with("javascript:") {
            return None;
        }
        let lower = href.to_ascii_lowercase();
        if SOCIAL_LINK_MARKERS.iter().any(|m| lower.contains(m)) {
            return None;
        }
        let resolved = base_url.join(href).ok()?;
        let resolved = resolved.to_string();
        if resolved.len() < 10 {
            return None;
        }
        Some(resolved)
    }

    /// Find a usable image near the event, preferring the link subtree,
    /// falling back to the card, then to the placeholder.
    fn resolve_image(
        &self,
        anchor: ElementRef<'_>,
        context: ElementRef<'_>,
        base_url: &Url,
    ) -> String {
        for scope in [anchor, context] {
            for img in scope.select(&self.img_sel) {
                if let Some(src) = image_source(img) {
                    if let Some(url) = self.absolutize_image(&src, base_url) {
                        return url;
                    }
                }
            }
        }
        self.placeholder_image.clone()
    }

    fn absolutize_image(&self, src: &str, base_url: &Url) -> Option<String> {
        if is_junk_image(src) {
            return None;
        }
        let resolved = base_url.join(src).ok()?.to_string();
        if is_junk_image(&resolved) {
            return None;
        }
        Some(resolved)
    }

    fn resolve_date(&self, context: ElementRef<'_>) -> String {
        for el in context.select(&self.date_sel) {
            let text = normalize_text(&el.text().collect::<String>());
            if !text.is_empty() {
                return text;
            }
            if let Some(attr) = el.value().attr("datetime") {
                let attr = attr.trim();
                if !attr.is_empty() {
                    return attr.to_string();
                }
            }
        }
        "Date TBA".to_string()
    }

    fn resolve_description(&self, context: ElementRef<'_>, heading: ElementRef<'_>) -> String {
        for el in context.select(&self.desc_sel) {
            if el.id() == heading.id() {
                continue;
            }
            let text = normalize_text(&el.text().collect::<String>());
            if !text.is_empty() {
                return text.chars().take(self.description_limit).collect();
            }
        }
        String::new()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::selector(selector, e))
}

/// Walk from an element up through its element ancestors.
fn ancestors(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    std::iter::successors(Some(el), |e| e.parent().and_then(ElementRef::wrap)).skip(1)
}

/// Nearest ancestor that looks like an event card.
fn closest_card(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    ancestors(el).find(|e| is_cardish(*e))
}

/// Nearest block-level ancestor, used when no card is recognizable.
fn closest_block(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    ancestors(el).find(|e| {
        let name = e.value().name();
        name == "div" || name == "li" || name == "section"
    })
}

fn is_cardish(el: ElementRef<'_>) -> bool {
    if el.value().name() == "article" {
        return true;
    }
    el.value()
        .attr("class")
        .map(|c| {
            let c = c.to_ascii_lowercase();
            c.contains("card") || c.contains("event")
        })
        .unwrap_or(false)
}

/// Pick the best source URL an img element offers, checking lazy-load
/// attributes before src and falling back to the largest srcset entry.
fn image_source(img: ElementRef<'_>) -> Option<String> {
    for attr in ["data-src", "data-lazy-src", "data-original", "src"] {
        if let Some(value) = img.value().attr(attr) {
            let value = value.trim();
            if !value.is_empty() && !is_junk_image(value) {
                return Some(value.to_string());
            }
        }
    }
    let srcset = img.value().attr("srcset")?;
    let candidate = srcset.split(',').last()?.trim();
    let url = candidate.split_whitespace().next()?;
    if url.is_empty() || is_junk_image(url) {
        return None;
    }
    Some(url.to_string())
}

fn is_junk_image(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    if JUNK_IMAGE_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }
    src.len() < 20
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
