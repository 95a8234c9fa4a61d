//! Integration tests for the headlines client using wiremock.

use briefing_core::{Category, FetchError, HeadlinesQuery, NewsClient, news::FEATURED_CATEGORIES};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> NewsClient {
    NewsClient::new("NEWS_KEY").unwrap().with_base_url(server.uri())
}

fn article(title: &str, url: Option<&str>) -> serde_json::Value {
    json!({
        "source": { "id": null, "name": "Example Times" },
        "author": "A. Writer",
        "title": title,
        "description": "Something happened.",
        "url": url,
        "urlToImage": "https://example.com/img.jpg",
        "publishedAt": "2026-03-01T08:30:00Z",
        "content": null
    })
}

#[tokio::test]
async fn test_top_headlines_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("country", "gb"))
        .and(query_param("category", "technology"))
        .and(query_param("pageSize", "12"))
        .and(query_param("page", "2"))
        .and(query_param("apiKey", "NEWS_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 30,
            "articles": [
                article("Chips get faster", Some("https://example.com/a")),
                article("No link here", None),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = HeadlinesQuery {
        country: "gb".into(),
        category: Some(Category::Technology),
        page: 2,
        ..Default::default()
    };
    let page = client(&server).top_headlines(&query).await.unwrap();

    assert_eq!(page.total_results, 30);
    assert_eq!(page.articles.len(), 1);
    assert_eq!(page.articles[0].title, "Chips get faster");
    assert_eq!(page.articles[0].source_name.as_deref(), Some("Example Times"));
    assert!(page.articles[0].published_at.is_some());
    assert_eq!(page.total_pages(), 3);
    assert!(page.has_previous());
    assert!(page.has_next());
}

#[tokio::test]
async fn test_top_headlines_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid or incorrect."
        })))
        .mount(&server)
        .await;

    let err = client(&server).top_headlines(&HeadlinesQuery::default()).await.unwrap_err();

    match err {
        FetchError::Upstream { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("API key is invalid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_top_headlines_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "status": "error",
            "code": "rateLimited",
            "message": "You have made too many requests recently."
        })))
        .mount(&server)
        .await;

    let err = client(&server).top_headlines(&HeadlinesQuery::default()).await.unwrap_err();
    assert!(matches!(err, FetchError::RateLimited));
}

#[tokio::test]
async fn test_error_status_in_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "country is not supported"
        })))
        .mount(&server)
        .await;

    let err = client(&server).top_headlines(&HeadlinesQuery::default()).await.unwrap_err();
    assert!(matches!(err, FetchError::Upstream { status: 200, .. }));
}

#[tokio::test]
async fn test_top_stories_omit_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("country", "ca"))
        .and(query_param("pageSize", "3"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 70,
            "articles": [
                article("One", Some("https://example.com/1")),
                article("Two", Some("https://example.com/2")),
                article("Three", Some("https://example.com/3")),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .top_headlines(&HeadlinesQuery::top_stories("ca"))
        .await
        .unwrap();

    let titles: Vec<_> = page.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["One", "Two", "Three"]);
}

#[tokio::test]
async fn test_featured_takes_one_story_per_category() {
    let server = MockServer::start().await;

    for category in FEATURED_CATEGORIES {
        // sports has nothing today
        let articles = if category == Category::Sports {
            json!([])
        } else {
            json!([article(&format!("{category} lead"), Some("https://example.com/lead"))])
        };

        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("country", "us"))
            .and(query_param("category", category.as_str()))
            .and(query_param("pageSize", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "totalResults": 1,
                "articles": articles
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let featured = client(&server).featured("us").await.unwrap();

    let categories: Vec<_> = featured.iter().map(|f| f.category).collect();
    assert_eq!(
        categories,
        [
            Category::Technology,
            Category::Business,
            Category::Health,
            Category::Science,
            Category::Entertainment,
        ]
    );
    assert_eq!(featured[0].article.title, "technology lead");
}

#[tokio::test]
async fn test_featured_fails_when_any_category_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("category", "health"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 1,
            "articles": [article("Fine", Some("https://example.com/fine"))]
        })))
        .mount(&server)
        .await;

    let err = client(&server).featured("us").await.unwrap_err();
    assert!(matches!(err, FetchError::Upstream { status: 500, .. }));
}
