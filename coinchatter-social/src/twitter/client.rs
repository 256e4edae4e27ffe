//! Thin wrapper around the Twitter/X v2 search API.
//!
//! Shapes request parameters (expansions, field lists, RFC 3339 window bounds),
//! delegates to the shared HTTP client, and exposes a lazily paginated stream
//! that only requests the next page once the caller has drained the current one.
use crate::twitter::extract::hydrate_page;
use crate::twitter::types::{HydratedTweet, SearchResponse};
use anyhow::{Context, Result};
use async_stream::try_stream;
use coinchatter_http::{HttpClient, RequestOpts};
use futures::Stream;
use std::borrow::Cow;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const FULL_ARCHIVE_SEARCH: &str = "2/tweets/search/all";

const TWEET_FIELDS: &str = "created_at,lang,public_metrics,source,author_id";
const USER_FIELDS: &str = "verified,created_at,public_metrics";

/// One search: a query string bounded to `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
    search_path: String,
    page_size: u32,
}

impl TwitterApi {
    pub fn with_base_url(base_url: &str, bearer_token: String) -> Result<Self> {
        let http = HttpClient::new(base_url).context("twitter base url")?;
        Ok(Self {
            http,
            bearer: bearer_token,
            search_path: FULL_ARCHIVE_SEARCH.to_string(),
            page_size: 100,
        })
    }

    /// Point at another search endpoint, e.g. `2/tweets/search/recent`.
    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = path.into();
        self
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.http = self.http.with_timeout(dur);
        self
    }

    pub fn with_page_size(mut self, n: u32) -> Self {
        self.page_size = n.clamp(10, 100);
        self
    }

    /// Fetch a single page of results.
    pub async fn search_page(
        &self,
        req: &SearchRequest,
        next_token: Option<&str>,
    ) -> Result<SearchResponse> {
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("query", req.query.as_str().into()),
            ("max_results", self.page_size.to_string().into()),
            ("start_time", req.start_time.format(&Rfc3339)?.into()),
            ("end_time", req.end_time.format(&Rfc3339)?.into()),
            ("expansions", "author_id".into()),
            ("tweet.fields", TWEET_FIELDS.into()),
            ("user.fields", USER_FIELDS.into()),
        ];
        if let Some(token) = next_token {
            params.push(("next_token", token.into()));
        }

        let resp: SearchResponse = self
            .http
            .get_json(
                &self.search_path,
                RequestOpts {
                    bearer: Some(&self.bearer),
                    query: Some(params),
                },
            )
            .await
            .with_context(|| format!("twitter search failed for query {:?}", req.query))?;

        tracing::debug!(
            query = %req.query,
            result_count = ?resp.meta.as_ref().and_then(|m| m.result_count),
            has_next = resp.meta.as_ref().is_some_and(|m| m.next_token.is_some()),
            "twitter.search.page"
        );
        Ok(resp)
    }

    /// Stream author-joined tweets across every page of a search.
    pub fn search_stream<'a>(
        &'a self,
        req: &'a SearchRequest,
    ) -> impl Stream<Item = Result<HydratedTweet>> + Send + 'a {
        try_stream! {
            let mut next_token: Option<String> = None;
            loop {
                let page = self.search_page(req, next_token.as_deref()).await?;
                next_token = page.meta.as_ref().and_then(|m| m.next_token.clone());
                for hit in hydrate_page(page) {
                    yield hit;
                }
                if next_token.is_none() {
                    break;
                }
            }
        }
    }
}
