//! Common test utilities

use chrono::{DateTime, Duration, TimeZone, Utc};
use newsharvest::models::FeedItem;

/// Fixed reference time for window calculations
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Feed item published `days_ago` days before [`reference_now`]
#[allow(dead_code)]
pub fn feed_item(days_ago: i64, title: &str, description: &str, image_url: &str) -> FeedItem {
    FeedItem {
        timestamp_ms: (reference_now() - Duration::days(days_ago)).timestamp_millis(),
        title: title.to_string(),
        description: description.to_string(),
        image_url: image_url.to_string(),
    }
}

/// Minimal results page with one card per `(timestamp_ms, title, image_src)`
#[allow(dead_code)]
pub fn results_page(cards: &[(i64, &str, &str)], next_href: Option<&str>) -> String {
    let mut html = String::from(
        r#"<html><body>
<ul class="search-filter-menu">
  <li><div><div class="checkbox-input">
    <input type="checkbox" name="f0" value="00000168-8694">
    <label><span>Politics</span></label>
  </div></div></li>
  <li><div><div class="checkbox-input">
    <input type="checkbox" name="f0" value="00000163-01e2">
    <label><span>World &amp; Nation</span></label>
  </div></div></li>
</ul>
<ul class="search-results-module-results-menu">
"#,
    );

    for (timestamp_ms, title, image_src) in cards {
        html.push_str(&format!(
            r#"<li><ps-promo class="promo">
  <div class="promo-media"><a href="/story"><picture><img src="{image_src}"></picture></a></div>
  <h3 class="promo-title"><a href="/story">{title}</a></h3>
  <p class="promo-description">About {title}</p>
  <p class="promo-timestamp" data-timestamp="{timestamp_ms}">date</p>
</ps-promo></li>
"#
        ));
    }
    html.push_str("</ul>\n");

    if let Some(href) = next_href {
        html.push_str(&format!(
            r#"<div class="search-results-module-next-page"><a href="{}">Next</a></div>"#,
            href.replace('&', "&amp;")
        ));
    }
    html.push_str("</body></html>");
    html
}
