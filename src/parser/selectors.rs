//! CSS selectors for the search results page
//!
//! Each selector list is tried in order; the first one that matches wins.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// One element per result card
    pub static ref RESULT_CARD: Vec<Selector> = vec![
        parse_selector!(".search-results-module-results-menu > li"),
        parse_selector!("ps-promo"),
        parse_selector!("div.promo"),
    ];

    pub static ref CARD_TIMESTAMP: Vec<Selector> = vec![
        parse_selector!(".promo-timestamp[data-timestamp]"),
        parse_selector!("[data-timestamp]"),
    ];

    pub static ref CARD_TITLE: Vec<Selector> = vec![
        parse_selector!(".promo-title"),
        parse_selector!("h3"),
    ];

    pub static ref CARD_DESCRIPTION: Vec<Selector> = vec![
        parse_selector!(".promo-description"),
    ];

    pub static ref CARD_IMAGE: Vec<Selector> = vec![
        parse_selector!(".promo-media > a > picture > img"),
        parse_selector!(".promo-media picture img"),
        parse_selector!(".promo-media img"),
    ];

    pub static ref NEXT_PAGE_LINK: Vec<Selector> = vec![
        parse_selector!(".search-results-module-next-page a[href]"),
        parse_selector!("a.search-results-module-next-page[href]"),
    ];

    /// Checkbox block of one category filter entry
    pub static ref CATEGORY_ENTRY: Selector =
        parse_selector!(".search-filter-menu > li div.checkbox-input");

    pub static ref CATEGORY_INPUT: Selector = parse_selector!("input[name][value]");

    pub static ref CATEGORY_LABEL: Vec<Selector> = vec![
        parse_selector!("label > span"),
        parse_selector!("label"),
    ];
}
