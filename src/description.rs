//! Destination descriptions from Wikipedia
//!
//! [`DescriptionClient`] owns the lookup policy: a direct hit returns the
//! page text, a disambiguation page gets one retry with its first candidate.
//! The page source itself is the [`Encyclopedia`] trait; production uses
//! [`WikipediaClient`] against the MediaWiki action API.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::EncyclopediaConfig;
use crate::error::ToolError;

/// Candidates quoted back when a disambiguation cannot be resolved
pub const MAX_LISTED_CANDIDATES: usize = 5;

// Target of a `[[Target|label]]` link, section anchor excluded
static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|#]+)").expect("wiki link pattern is valid"));

/// Why a page lookup failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("page '{0}' does not exist")]
    NotFound(String),

    #[error("'{title}' may refer to several pages")]
    Ambiguous { title: String, options: Vec<String> },

    #[error("{0}")]
    Other(String),
}

/// A source of full-text pages addressed by (approximate) title
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Full plain-text content of the page best matching `title`
    async fn page_content(&self, title: &str) -> std::result::Result<String, LookupError>;
}

pub struct DescriptionClient {
    encyclopedia: Arc<dyn Encyclopedia>,
}

impl DescriptionClient {
    /// Create a client reading from Wikipedia
    pub fn new(config: &EncyclopediaConfig) -> Result<Self> {
        Ok(Self::with_encyclopedia(Arc::new(WikipediaClient::new(config)?)))
    }

    pub fn with_encyclopedia(encyclopedia: Arc<dyn Encyclopedia>) -> Self {
        Self { encyclopedia }
    }

    /// Fetch the full page text describing `query`
    #[instrument(skip(self))]
    pub async fn get_description(&self, query: &str) -> std::result::Result<String, ToolError> {
        if query.trim().is_empty() {
            return Err(ToolError::missing(
                "A destination name is required to look up a description.",
            ));
        }

        match self.encyclopedia.page_content(query).await {
            Ok(content) => Ok(content),
            Err(LookupError::NotFound(title)) => {
                warn!("No page found for {:?} (looked up as {:?})", query, title);
                Err(ToolError::NotFound {
                    query: query.to_string(),
                })
            }
            Err(LookupError::Ambiguous { options, .. }) => {
                self.resolve_ambiguous(query, options).await
            }
            Err(LookupError::Other(cause)) => {
                warn!("Description lookup for {:?} failed: {}", query, cause);
                Err(ToolError::Unexpected(cause))
            }
        }
    }

    async fn resolve_ambiguous(
        &self,
        query: &str,
        options: Vec<String>,
    ) -> std::result::Result<String, ToolError> {
        let Some(first) = options.first() else {
            return Err(ToolError::Ambiguous {
                query: query.to_string(),
                candidates: Vec::new(),
            });
        };

        info!("{:?} is ambiguous, retrying with {:?}", query, first);
        match self.encyclopedia.page_content(first).await {
            Ok(content) => Ok(content),
            Err(e) => {
                warn!("Fallback lookup of {:?} failed: {}", first, e);
                Err(ToolError::Ambiguous {
                    query: query.to_string(),
                    candidates: options.into_iter().take(MAX_LISTED_CANDIDATES).collect(),
                })
            }
        }
    }
}

/// MediaWiki action API client.
///
/// Lookups go through search first (the top hit or the spelling suggestion
/// becomes the title), then the page is fetched with redirects followed.
pub struct WikipediaClient {
    client: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    query: Option<T>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
    searchinfo: Option<SearchInfo>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SearchInfo {
    suggestion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    pageprops: Option<PageProps>,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: RevisionSlots,
}

#[derive(Debug, Deserialize)]
struct RevisionSlots {
    main: SlotContent,
}

#[derive(Debug, Deserialize)]
struct SlotContent {
    #[serde(default)]
    content: String,
}

impl WikipediaClient {
    pub fn new(config: &EncyclopediaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("travel-agent-tools/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Title to fetch for a free-text query: the suggestion if any, else the top hit
    async fn suggest_title(&self, query: &str) -> std::result::Result<String, LookupError> {
        let search: SearchQuery = self
            .query(&[
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", "1"),
                ("srinfo", "suggestion"),
                ("srprop", ""),
            ])
            .await?;

        search
            .searchinfo
            .and_then(|info| info.suggestion)
            .or_else(|| search.search.into_iter().next().map(|hit| hit.title))
            .ok_or_else(|| LookupError::NotFound(query.to_string()))
    }

    async fn fetch_page(&self, title: &str) -> std::result::Result<WikiPage, LookupError> {
        let pages: PagesQuery = self
            .query(&[
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        let page = pages
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(title.to_string()))?;

        if page.missing || page.invalid {
            return Err(LookupError::NotFound(title.to_string()));
        }
        Ok(page)
    }

    /// Candidates of a disambiguation page, in the order the page lists them
    async fn disambiguation_options(&self, title: &str) -> std::result::Result<Vec<String>, LookupError> {
        let pages: PagesQuery = self
            .query(&[
                ("prop", "revisions"),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        let wikitext = pages
            .pages
            .into_iter()
            .flat_map(|page| page.revisions)
            .next()
            .map(|revision| revision.slots.main.content)
            .unwrap_or_default();

        Ok(list_entries(&wikitext))
    }

    async fn query<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> std::result::Result<T, LookupError> {
        debug!("MediaWiki query {:?}", params);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LookupError::Other(e.to_string()))?;

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| LookupError::Other(format!("Failed to parse MediaWiki response: {e}")))?;

        if let Some(error) = body.error {
            return Err(LookupError::Other(format!("{}: {}", error.code, error.info)));
        }
        body.query
            .ok_or_else(|| LookupError::Other("MediaWiki response has no query result".to_string()))
    }
}

/// First link target of every bulleted line, without duplicates
fn list_entries(wikitext: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for line in wikitext.lines().filter(|l| l.trim_start().starts_with('*')) {
        let Some(target) = WIKI_LINK.captures(line).and_then(|c| c.get(1)) else {
            continue;
        };
        let title = target.as_str().trim().replace('_', " ");
        if !title.is_empty() && !entries.contains(&title) {
            entries.push(title);
        }
    }
    entries
}

#[async_trait]
impl Encyclopedia for WikipediaClient {
    #[instrument(skip(self))]
    async fn page_content(&self, title: &str) -> std::result::Result<String, LookupError> {
        let resolved = self.suggest_title(title).await?;
        let page = self.fetch_page(&resolved).await?;

        if page.pageprops.is_some_and(|props| props.disambiguation.is_some()) {
            let options = self.disambiguation_options(&page.title).await?;
            return Err(LookupError::Ambiguous {
                title: page.title,
                options,
            });
        }

        Ok(page.extract.unwrap_or_default())
    }
}
