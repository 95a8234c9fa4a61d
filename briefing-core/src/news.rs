//! Top-headlines client for a NewsAPI-compatible aggregator.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::{
    error::FetchError,
    provider::{ProviderId, read_body, require_api_key, truncate_body},
};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const TOP_STORIES_PAGE_SIZE: u32 = 3;

/// One lead story is shown for each of these, in this order.
pub const FEATURED_CATEGORIES: [Category; 6] = [
    Category::Technology,
    Category::Business,
    Category::Sports,
    Category::Health,
    Category::Science,
    Category::Entertainment,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Business => "business",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Science => "science",
            Self::Sports => "sports",
            Self::Technology => "technology",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::General => "📰",
            Self::Business => "💼",
            Self::Entertainment => "🎬",
            Self::Health => "❤️",
            Self::Science => "🔬",
            Self::Sports => "⚽",
            Self::Technology => "💻",
        }
    }

    pub const fn all() -> &'static [Category] {
        &[
            Self::General,
            Self::Business,
            Self::Entertainment,
            Self::Health,
            Self::Science,
            Self::Sports,
            Self::Technology,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| {
                let names: Vec<_> = Self::all().iter().map(Category::as_str).collect();
                format!("Unknown category '{s}'. Expected one of: {}", names.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlinesQuery {
    pub country: String,
    /// `None` asks for headlines across all categories.
    pub category: Option<Category>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl Default for HeadlinesQuery {
    fn default() -> Self {
        Self {
            country: "us".to_string(),
            category: Some(Category::General),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl HeadlinesQuery {
    /// The few headlines shown on the landing view, not tied to a category.
    pub fn top_stories(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            category: None,
            page: 1,
            page_size: TOP_STORIES_PAGE_SIZE,
        }
    }

    fn lead_story(country: &str, category: Category) -> Self {
        Self {
            country: country.to_string(),
            category: Some(category),
            page: 1,
            page_size: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub source_name: Option<String>,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlinesPage {
    pub articles: Vec<Article>,
    pub total_results: u32,
    pub page: u32,
    pub page_size: u32,
}

/// The lead story of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedArticle {
    pub category: Category,
    pub article: Article,
}

impl HeadlinesPage {
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_results.div_ceil(self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NaResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    total_results: u32,
    #[serde(default)]
    articles: Vec<NaArticle>,
}

#[derive(Debug, Deserialize)]
struct NaSource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NaArticle {
    source: Option<NaSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

impl NaArticle {
    /// Entries without a title or link cannot be shown as a card.
    fn into_article(self) -> Option<Article> {
        Some(Article {
            source_name: self.source.and_then(|s| s.name),
            author: self.author,
            title: self.title.filter(|t| !t.is_empty())?,
            description: self.description,
            url: self.url.filter(|u| !u.is_empty())?,
            image_url: self.url_to_image,
            published_at: self.published_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewsClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl NewsClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            api_key: require_api_key(ProviderId::NewsApi, api_key.into())?,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_config(config: &crate::Config) -> Result<Self, FetchError> {
        let id = ProviderId::NewsApi;
        let api_key = config.provider_api_key(id).ok_or_else(|| {
            FetchError::Config(format!(
                "No API key configured for provider '{id}'.\n\
                 Hint: run `briefing configure {id}` or set NEWS_API_KEY."
            ))
        })?;
        Self::new(api_key)
    }

    pub async fn top_headlines(&self, query: &HeadlinesQuery) -> Result<HeadlinesPage, FetchError> {
        if query.page == 0 {
            return Err(FetchError::InvalidRequest("Page numbers start at 1".to_string()));
        }
        if query.page_size == 0 {
            return Err(FetchError::InvalidRequest("Page size must be positive".to_string()));
        }

        let url = format!("{}/v2/top-headlines", self.base_url);
        let category = query.category.map(|c| c.as_str());
        debug!(%url, country = %query.country, category = category.unwrap_or("all"), page = query.page, "News request");

        let page_size = query.page_size.to_string();
        let page = query.page.to_string();

        let mut params = vec![("country", query.country.as_str())];
        if let Some(category) = category {
            params.push(("category", category));
        }
        params.extend([
            ("pageSize", page_size.as_str()),
            ("page", page.as_str()),
            ("apiKey", self.api_key.as_str()),
        ]);

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status().as_u16();
        let body = read_body(res).await?;

        let parsed: NaResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::InvalidResponse(format!(
                "Failed to parse headlines JSON: {e} (body: {})",
                truncate_body(&body)
            ))
        })?;

        if parsed.status.as_deref() == Some("error") {
            return Err(FetchError::Upstream {
                status,
                message: parsed.message.unwrap_or_else(|| "Failed to fetch headlines".into()),
            });
        }

        Ok(HeadlinesPage {
            articles: parsed.articles.into_iter().filter_map(NaArticle::into_article).collect(),
            total_results: parsed.total_results,
            page: query.page,
            page_size: query.page_size,
        })
    }

    /// Lead story of each of [`FEATURED_CATEGORIES`], requested concurrently.
    ///
    /// Categories with no story are left out; any failed request fails the
    /// whole call.
    pub async fn featured(&self, country: &str) -> Result<Vec<FeaturedArticle>, FetchError> {
        let queries: Vec<_> = FEATURED_CATEGORIES
            .iter()
            .map(|&category| HeadlinesQuery::lead_story(country, category))
            .collect();

        let pages = try_join_all(queries.iter().map(|q| self.top_headlines(q))).await?;

        let featured: Vec<_> = FEATURED_CATEGORIES
            .iter()
            .zip(pages)
            .filter_map(|(&category, page)| {
                let article = page.articles.into_iter().next()?;
                Some(FeaturedArticle { category, article })
            })
            .collect();

        debug!(count = featured.len(), "Featured stories received");
        Ok(featured)
    }
}
