//! Search results page parsing
//!
//! Turns a results page into [`FeedItem`]s, finds the next-page link and
//! lists the category filters offered by the page. Items are extracted per
//! result card, so a card missing its image or description cannot shift the
//! fields of its neighbours.

pub mod selectors;

use scraper::{ElementRef, Html, Selector};

use crate::models::FeedItem;
use crate::utils::normalize_whitespace;
use self::selectors::{
    CARD_DESCRIPTION, CARD_IMAGE, CARD_TIMESTAMP, CARD_TITLE, CATEGORY_ENTRY, CATEGORY_INPUT,
    CATEGORY_LABEL, NEXT_PAGE_LINK, RESULT_CARD,
};

/// A category checkbox from the search filter menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Visible label, e.g. "World & Nation"
    pub label: String,
    /// Query parameter name of the checkbox
    pub param: String,
    /// Query parameter value of the checkbox
    pub value: String,
}

impl CategoryFilter {
    /// Case-insensitive substring match of `wanted` against the label
    pub fn matches(&self, wanted: &str) -> bool {
        let wanted = wanted.trim().to_lowercase();
        !wanted.is_empty() && self.label.to_lowercase().contains(&wanted)
    }
}

/// Parser for search results pages
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchResultsParser;

impl SearchResultsParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract the result cards of a page in document order
    ///
    /// Cards without a usable timestamp are dropped: they cannot be checked
    /// against the recency window.
    pub fn parse_items(&self, html: &str) -> Vec<FeedItem> {
        let document = Html::parse_document(html);

        let cards: Vec<ElementRef> = RESULT_CARD
            .iter()
            .map(|sel| document.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        let mut items = Vec::with_capacity(cards.len());
        for (position, card) in cards.into_iter().enumerate() {
            let raw_timestamp = select_first(card, &CARD_TIMESTAMP)
                .and_then(|el| el.value().attr("data-timestamp"));

            let Some(timestamp_ms) = raw_timestamp.and_then(Self::parse_timestamp) else {
                tracing::warn!(
                    position,
                    raw = ?raw_timestamp,
                    "Dropping result card without a valid timestamp"
                );
                continue;
            };

            let title = select_first(card, &CARD_TITLE)
                .map(element_text)
                .unwrap_or_default();

            let description = select_first(card, &CARD_DESCRIPTION)
                .map(element_text)
                .unwrap_or_default();

            let image_url = select_first(card, &CARD_IMAGE)
                .and_then(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
                .map(|src| src.trim().to_string())
                .unwrap_or_default();

            items.push(FeedItem {
                timestamp_ms,
                title,
                description,
                image_url,
            });
        }

        tracing::trace!(items = items.len(), "Parsed result cards");
        items
    }

    /// Link target of the "next page" control, if present
    pub fn next_page_href(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        NEXT_PAGE_LINK.iter().find_map(|sel| {
            document
                .select(sel)
                .filter_map(|a| a.value().attr("href"))
                .map(str::trim)
                .find(|href| !href.is_empty())
                .map(str::to_string)
        })
    }

    /// Category filters offered by the page
    pub fn category_filters(&self, html: &str) -> Vec<CategoryFilter> {
        let document = Html::parse_document(html);

        document
            .select(&CATEGORY_ENTRY)
            .filter_map(|entry| {
                let input = entry.select(&CATEGORY_INPUT).next()?;
                let label = select_first(entry, &CATEGORY_LABEL).map(element_text)?;
                Some(CategoryFilter {
                    label,
                    param: input.value().attr("name")?.to_string(),
                    value: input.value().attr("value")?.to_string(),
                })
            })
            .collect()
    }

    /// Parse a `data-timestamp` attribute as epoch milliseconds
    ///
    /// Accepts integer or floating point notation; rejects negative and
    /// non-finite values.
    pub fn parse_timestamp(raw: &str) -> Option<i64> {
        let raw = raw.trim();
        if let Ok(ms) = raw.parse::<i64>() {
            return (ms >= 0).then_some(ms);
        }

        let ms = raw.parse::<f64>().ok()?;
        if !ms.is_finite() || ms < 0.0 || ms > i64::MAX as f64 {
            return None;
        }
        Some(ms.round() as i64)
    }
}

fn select_first<'a>(element: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|sel| element.select(sel).next())
}

fn element_text(element: ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}
