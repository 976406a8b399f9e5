//! Integration tests for SearchFeedCursor against a mock search site

mod common;

use common::{reference_now, results_page};
use newsharvest::crawler::fetcher::WebFetcher;
use newsharvest::crawler::list::SearchFeedCursor;
use newsharvest::crawler::FeedCursor;
use newsharvest::error::{FetchError, NavigationError};
use newsharvest::models::SearchCriteria;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ts(days_ago: i64) -> i64 {
    (reference_now() - chrono::Duration::days(days_ago)).timestamp_millis()
}

fn fetcher(server: &MockServer) -> Arc<WebFetcher> {
    Arc::new(WebFetcher::new(&server.uri(), 100).unwrap())
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body)
}

#[tokio::test]
async fn test_open_loads_first_page_newest_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "election"))
        .and(query_param("s", "1"))
        .respond_with(html(results_page(
            &[(ts(1), "First", "/a.jpg"), (ts(2), "Second", "/b.jpg")],
            Some("/search?q=election&s=1&p=2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("Election", None, 1).unwrap();
    let cursor = SearchFeedCursor::open(fetcher(&server), &criteria)
        .await
        .unwrap();

    assert_eq!(cursor.page_number(), 1);
    assert!(cursor.applied_filter().is_none());

    let titles: Vec<&str> = cursor
        .current_batch()
        .iter()
        .map(|item| item.title.as_str())
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(cursor.current_batch()[0].image_url, "/a.jpg");
}

#[tokio::test]
async fn test_category_filter_applied() {
    let server = MockServer::start().await;

    // Mounted first so it wins over the unfiltered search
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("f0", "00000168-8694"))
        .respond_with(html(results_page(&[(ts(1), "Filtered", "/f.jpg")], None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_page(&[(ts(1), "Unfiltered", "/u.jpg")], None)))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("election", Some("POLITICS"), 1).unwrap();
    let cursor = SearchFeedCursor::open(fetcher(&server), &criteria)
        .await
        .unwrap();

    assert_eq!(cursor.applied_filter().map(|f| f.label.as_str()), Some("Politics"));
    assert_eq!(cursor.current_batch()[0].title, "Filtered");
    assert!(cursor
        .current_url()
        .query()
        .unwrap_or_default()
        .contains("f0=00000168-8694"));
}

#[tokio::test]
async fn test_unmatched_category_does_not_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("f0", "00000168-8694"))
        .respond_with(html(results_page(&[(ts(1), "Filtered", "/f.jpg")], None)))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_page(&[(ts(1), "Unfiltered", "/u.jpg")], None)))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("election", Some("sports"), 1).unwrap();
    let cursor = SearchFeedCursor::open(fetcher(&server), &criteria)
        .await
        .unwrap();

    assert!(cursor.applied_filter().is_none());
    assert_eq!(cursor.current_batch()[0].title, "Unfiltered");
}

#[tokio::test]
async fn test_pagination_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("p", "2"))
        .respond_with(html(results_page(&[(ts(5), "Older", "/c.jpg")], None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_page(
            &[(ts(1), "Newer", "/a.jpg")],
            Some("/search?q=election&s=1&p=2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("election", None, 1).unwrap();
    let mut cursor = SearchFeedCursor::open(fetcher(&server), &criteria)
        .await
        .unwrap();

    assert!(cursor.advance().await.unwrap());
    assert_eq!(cursor.page_number(), 2);
    assert_eq!(cursor.current_batch()[0].title, "Older");

    assert!(!cursor.advance().await.unwrap());
    assert!(cursor.current_batch().is_empty());
    assert!(!cursor.advance().await.unwrap(), "stays exhausted");
    assert_eq!(cursor.page_number(), 2);
}

#[tokio::test]
async fn test_first_page_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("election", None, 1).unwrap();
    let result = SearchFeedCursor::open(fetcher(&server), &criteria).await;

    assert!(matches!(
        result,
        Err(NavigationError::PageLoad {
            source: FetchError::Status(500),
            ..
        })
    ));
}

#[tokio::test]
async fn test_next_page_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_page(
            &[(ts(1), "Newer", "/a.jpg")],
            Some("/search?q=election&s=1&p=2"),
        )))
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("election", None, 1).unwrap();
    let mut cursor = SearchFeedCursor::open(fetcher(&server), &criteria)
        .await
        .unwrap();

    assert!(matches!(
        cursor.advance().await,
        Err(NavigationError::PageLoad { .. })
    ));
}

#[tokio::test]
async fn test_next_link_to_same_page_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_page(
            &[(ts(1), "Only", "/a.jpg")],
            Some("/search?q=election&s=1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("election", None, 1).unwrap();
    let mut cursor = SearchFeedCursor::open(fetcher(&server), &criteria)
        .await
        .unwrap();

    assert!(matches!(
        cursor.advance().await,
        Err(NavigationError::UnexpectedLayout(_))
    ));
}

#[tokio::test]
async fn test_next_link_cycle_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("p", "2"))
        .respond_with(html(results_page(
            &[(ts(2), "Second", "/b.jpg")],
            Some("/search?q=election&s=1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_page(
            &[(ts(1), "First", "/a.jpg")],
            Some("/search?q=election&s=1&p=2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria::new("election", None, 1).unwrap();
    let mut cursor = SearchFeedCursor::open(fetcher(&server), &criteria)
        .await
        .unwrap();

    assert!(cursor.advance().await.unwrap());
    assert_eq!(cursor.page_number(), 2);
    assert!(matches!(
        cursor.advance().await,
        Err(NavigationError::UnexpectedLayout(_))
    ));
    assert_eq!(cursor.page_number(), 2);
}
