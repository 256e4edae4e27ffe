//! Walks segments × hourly windows × coins and writes one snapshot per segment.
use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use coinchatter_common::DateRange;
use coinchatter_social::twitter::{HydratedTweet, SearchRequest};

use crate::coins::{COINS, Coin};
use crate::collector::{TweetSource, collect};
use crate::table::{TweetRow, TweetTable};
use crate::window::{HourWindow, hourly_windows, segments};

const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone)]
pub struct CollectSettings {
    pub language: String,
    pub max_tweets_per_coin_per_hour: usize,
    pub segment_days: u32,
    pub output_dir: PathBuf,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            language: "en".into(),
            max_tweets_per_coin_per_hour: 100,
            segment_days: 10,
            output_dir: PathBuf::from("."),
        }
    }
}

/// What one segment run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentReport {
    pub range: DateRange,
    pub path: PathBuf,
    pub rows: usize,
    pub spam: usize,
}

pub struct BatchDriver<S> {
    source: S,
    settings: CollectSettings,
    coins: Vec<Coin>,
}

impl<S: TweetSource> BatchDriver<S> {
    pub fn new(source: S, settings: CollectSettings) -> Self {
        Self {
            source,
            settings,
            coins: COINS.to_vec(),
        }
    }

    /// Restrict the run to a subset of coins.
    pub fn with_coins(mut self, coins: Vec<Coin>) -> Self {
        self.coins = coins;
        self
    }

    fn search_request(&self, coin: &Coin, window: &HourWindow) -> Result<SearchRequest> {
        Ok(SearchRequest {
            query: format!("{} lang:{}", coin.keyword(), self.settings.language),
            start_time: window.since_offset()?,
            end_time: window.until_offset()?,
        })
    }

    /// Split `range` into segments and run each in turn.
    pub async fn run(&self, range: DateRange) -> Result<Vec<SegmentReport>> {
        let segs = segments(range, self.settings.segment_days);
        if segs.len() == 1 {
            tracing::info!(%range, "scraping 1 date range");
        } else {
            tracing::info!(
                %range,
                segments = segs.len(),
                segment_days = self.settings.segment_days,
                "breaking date range into segments"
            );
            for (i, seg) in segs.iter().enumerate() {
                tracing::info!(
                    "{}: start date (inclusive): {}, end date (exclusive): {}",
                    i + 1,
                    seg.start,
                    seg.end
                );
            }
        }

        let mut reports = Vec::with_capacity(segs.len());
        for seg in segs {
            reports.push(self.run_segment(seg).await?);
        }
        Ok(reports)
    }

    /// Collect every hourly window × coin of `range` into one snapshot file.
    pub async fn run_segment(&self, range: DateRange) -> Result<SegmentReport> {
        let windows = hourly_windows(range);
        let total = windows.len();
        tracing::info!(%range, hourly_intervals = total, "scraping segment");

        let mut table = TweetTable::new();
        let mut spam = 0usize;

        for (done, window) in windows.iter().enumerate() {
            for coin in &self.coins {
                let req = self.search_request(coin, window)?;
                let collected = collect(
                    &self.source,
                    &req,
                    self.settings.max_tweets_per_coin_per_hour,
                    Utc::now(),
                )
                .await
                .with_context(|| format!("collecting {} for window {window}", coin.ticker))?;

                tracing::debug!(
                    coin = coin.ticker,
                    %window,
                    kept = collected.kept.len(),
                    spam = collected.spam,
                    "window collected"
                );
                spam += collected.spam;
                table.extend(
                    dedup_by_id(collected.kept)
                        .into_iter()
                        .map(|hit| TweetRow::from_hit(hit, coin)),
                );
            }

            let left = total - done - 1;
            if (done + 1) % PROGRESS_EVERY == 0 {
                tracing::info!("{left}/{total} hourly intervals left");
            }
        }

        let path = table
            .write_to_dir(&self.settings.output_dir, &range)
            .with_context(|| format!("writing snapshot for {range}"))?;
        tracing::info!(rows = table.len(), spam, path = %path.display(), "file created");

        Ok(SegmentReport {
            range,
            path,
            rows: table.len(),
            spam,
        })
    }
}

/// Drop repeated tweet ids, keeping the first occurrence.
pub fn dedup_by_id(hits: Vec<HydratedTweet>) -> Vec<HydratedTweet> {
    let mut seen = HashSet::with_capacity(hits.len());
    hits.into_iter()
        .filter(|h| seen.insert(h.tweet.id.clone()))
        .collect()
}
