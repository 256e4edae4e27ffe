//! Helpers that turn raw search pages into author-joined tweets.
use std::collections::HashMap;

use url::Url;

use crate::twitter::types::{HydratedTweet, SearchResponse, User};

/// Join every tweet in a page with its author from `includes.users`.
///
/// Tweets whose author is missing from the expansion (suspended or protected
/// accounts) cannot be classified and are dropped.
pub fn hydrate_page(page: SearchResponse) -> Vec<HydratedTweet> {
    let SearchResponse { data, includes, .. } = page;

    let users: HashMap<String, User> = includes
        .and_then(|inc| inc.users)
        .unwrap_or_default()
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect();

    let tweets = data.unwrap_or_default();
    let mut out = Vec::with_capacity(tweets.len());
    for tweet in tweets {
        let author = tweet.author_id.as_ref().and_then(|id| users.get(id));
        match author {
            Some(author) => out.push(HydratedTweet {
                author: author.clone(),
                tweet,
            }),
            None => tracing::warn!(
                tweet_id = %tweet.id,
                author_id = ?tweet.author_id,
                "dropping tweet without expanded author"
            ),
        }
    }
    out
}

/// Build a canonical X status URL if we know the handle; otherwise /i/web/status/{id}.
pub fn make_status_url(handle: Option<&str>, id: &str) -> Option<Url> {
    match handle {
        Some(h) => Url::parse(&format!("https://x.com/{}/status/{}", h, id)).ok(),
        None => Url::parse(&format!("https://x.com/i/web/status/{}", id)).ok(),
    }
}
