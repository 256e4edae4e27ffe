//! Pull tweets for one query until a cap is hit or the provider runs dry.
use chrono::{DateTime, Utc};
use coinchatter_common::Result;
use coinchatter_social::twitter::{HydratedTweet, SearchRequest, TwitterApi};
use futures::TryStreamExt;
use futures::stream::{BoxStream, StreamExt};

use crate::spam::{AuthorProfile, is_spam};

/// Anything that can answer a bounded search with author-joined tweets.
pub trait TweetSource {
    fn search<'a>(
        &'a self,
        req: &'a SearchRequest,
    ) -> BoxStream<'a, anyhow::Result<HydratedTweet>>;
}

impl TweetSource for TwitterApi {
    fn search<'a>(
        &'a self,
        req: &'a SearchRequest,
    ) -> BoxStream<'a, anyhow::Result<HydratedTweet>> {
        self.search_stream(req).boxed()
    }
}

/// Outcome of one bounded search.
#[derive(Debug, Default)]
pub struct Collected {
    pub kept: Vec<HydratedTweet>,
    pub spam: usize,
}

/// Keep up to `max` non-spam tweets, counting (and discarding) spam on the way.
/// Stops pulling from the source as soon as the cap is reached.
pub async fn collect<S>(
    source: &S,
    req: &SearchRequest,
    max: usize,
    now: DateTime<Utc>,
) -> Result<Collected>
where
    S: TweetSource + ?Sized,
{
    let mut stream = source.search(req);
    let mut out = Collected::default();

    while out.kept.len() < max {
        let Some(hit) = stream.try_next().await? else {
            break;
        };
        if is_spam(&AuthorProfile::from(&hit.author), now) {
            out.spam += 1;
        } else {
            out.kept.push(hit);
        }
    }

    Ok(out)
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeSource, hit};
    use super::*;
    use chrono::TimeZone;
    use coinchatter_common::CoinchatterError;
    use std::sync::atomic::Ordering;
    use time::macros::datetime;

    fn req() -> SearchRequest {
        SearchRequest {
            query: "(Monero OR XMR) lang:en".into(),
            start_time: datetime!(2022-01-01 00:00 UTC),
            end_time: datetime!(2022-01-01 01:00 UTC),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn partitions_spam_from_kept() {
        let source = FakeSource {
            hits: vec![hit("1", "a", false), hit("2", "b", true), hit("3", "c", false)],
            ..Default::default()
        };
        let got = collect(&source, &req(), 10, now()).await.unwrap();
        let ids: Vec<_> = got.kept.iter().map(|h| h.tweet.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(got.spam, 1);
    }

    #[tokio::test]
    async fn stops_pulling_once_the_cap_is_reached() {
        let source = FakeSource {
            hits: (0..50).map(|i| hit(&i.to_string(), "a", false)).collect(),
            ..Default::default()
        };
        let got = collect(&source, &req(), 5, now()).await.unwrap();
        assert_eq!(got.kept.len(), 5);
        assert_eq!(source.pulled.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn spam_does_not_count_toward_the_cap() {
        let source = FakeSource {
            hits: vec![
                hit("1", "s", true),
                hit("2", "s", true),
                hit("3", "a", false),
                hit("4", "b", false),
            ],
            ..Default::default()
        };
        let got = collect(&source, &req(), 1, now()).await.unwrap();
        assert_eq!(got.kept.len(), 1);
        assert_eq!(got.kept[0].tweet.id, "3");
        assert_eq!(got.spam, 2);
    }

    #[tokio::test]
    async fn zero_cap_pulls_nothing() {
        let source = FakeSource {
            hits: vec![hit("1", "a", false)],
            ..Default::default()
        };
        let got = collect(&source, &req(), 0, now()).await.unwrap();
        assert!(got.kept.is_empty());
        assert_eq!(source.pulled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let source = FakeSource {
            fail: true,
            ..Default::default()
        };
        let err = collect(&source, &req(), 10, now()).await.unwrap_err();
        assert!(matches!(err, CoinchatterError::Provider(_)));
    }
}
