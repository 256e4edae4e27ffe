//! Column-oriented snapshot table written once per segment.
//!
//! On disk the table is a JSON object:
//! `{"columns": [<names in order>], "data": {"<name>": [...], ...}}`, every
//! column array the same length.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use coinchatter_common::{CoinchatterError, DateRange, Result};
use coinchatter_social::twitter::HydratedTweet;
use coinchatter_social::twitter::extract::make_status_url;
use serde::{Deserialize, Serialize};

use crate::coins::Coin;

pub const COLUMNS: [&str; 14] = [
    "tweetUrl",
    "date",
    "content",
    "tweetId",
    "user",
    "replyCount",
    "retweetCount",
    "likeCount",
    "quoteCount",
    "machineType",
    "coinName",
    "coinTicker",
    "followersCount",
    "friendsCount",
];

/// One flattened tweet, tagged with the coin whose query matched it.
#[derive(Debug, Clone, PartialEq)]
pub struct TweetRow {
    pub tweet_url: String,
    pub date: Option<DateTime<Utc>>,
    pub content: String,
    pub tweet_id: String,
    pub user: String,
    pub reply_count: u64,
    pub retweet_count: u64,
    pub like_count: u64,
    pub quote_count: u64,
    pub machine_type: Option<String>,
    pub coin_name: String,
    pub coin_ticker: String,
    pub followers_count: u64,
    pub friends_count: u64,
}

impl TweetRow {
    pub fn from_hit(hit: HydratedTweet, coin: &Coin) -> Self {
        let HydratedTweet { tweet, author } = hit;
        let metrics = tweet.public_metrics.unwrap_or_default();
        let author_metrics = author.public_metrics.unwrap_or_default();
        let tweet_url = make_status_url(Some(&author.username), &tweet.id)
            .map(String::from)
            .unwrap_or_default();

        Self {
            tweet_url,
            date: tweet
                .created_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            content: tweet.text,
            tweet_id: tweet.id,
            user: author.username,
            reply_count: metrics.reply_count.unwrap_or(0),
            retweet_count: metrics.retweet_count.unwrap_or(0),
            like_count: metrics.like_count.unwrap_or(0),
            quote_count: metrics.quote_count.unwrap_or(0),
            machine_type: tweet.source,
            coin_name: coin.name.to_string(),
            coin_ticker: coin.ticker.to_string(),
            followers_count: author_metrics.followers_count,
            friends_count: author_metrics.following_count,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Columns {
    tweet_url: Vec<String>,
    date: Vec<Option<DateTime<Utc>>>,
    content: Vec<String>,
    tweet_id: Vec<String>,
    user: Vec<String>,
    reply_count: Vec<u64>,
    retweet_count: Vec<u64>,
    like_count: Vec<u64>,
    quote_count: Vec<u64>,
    machine_type: Vec<Option<String>>,
    coin_name: Vec<String>,
    coin_ticker: Vec<String>,
    followers_count: Vec<u64>,
    friends_count: Vec<u64>,
}

impl Columns {
    fn lengths(&self) -> [usize; 14] {
        [
            self.tweet_url.len(),
            self.date.len(),
            self.content.len(),
            self.tweet_id.len(),
            self.user.len(),
            self.reply_count.len(),
            self.retweet_count.len(),
            self.like_count.len(),
            self.quote_count.len(),
            self.machine_type.len(),
            self.coin_name.len(),
            self.coin_ticker.len(),
            self.followers_count.len(),
            self.friends_count.len(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetTable {
    columns: Vec<String>,
    data: Columns,
}

impl Default for TweetTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetTable {
    pub fn new() -> Self {
        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            data: Columns::default(),
        }
    }

    /// `<start>:<end>--tweets.plk`
    pub fn file_name(range: &DateRange) -> String {
        format!("{}:{}--tweets.plk", range.start, range.end)
    }

    pub fn len(&self) -> usize {
        self.data.tweet_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, row: TweetRow) {
        let d = &mut self.data;
        d.tweet_url.push(row.tweet_url);
        d.date.push(row.date);
        d.content.push(row.content);
        d.tweet_id.push(row.tweet_id);
        d.user.push(row.user);
        d.reply_count.push(row.reply_count);
        d.retweet_count.push(row.retweet_count);
        d.like_count.push(row.like_count);
        d.quote_count.push(row.quote_count);
        d.machine_type.push(row.machine_type);
        d.coin_name.push(row.coin_name);
        d.coin_ticker.push(row.coin_ticker);
        d.followers_count.push(row.followers_count);
        d.friends_count.push(row.friends_count);
    }

    /// Reassemble row `i`.
    pub fn row(&self, i: usize) -> Option<TweetRow> {
        let d = &self.data;
        Some(TweetRow {
            tweet_url: d.tweet_url.get(i)?.clone(),
            date: *d.date.get(i)?,
            content: d.content.get(i)?.clone(),
            tweet_id: d.tweet_id.get(i)?.clone(),
            user: d.user.get(i)?.clone(),
            reply_count: *d.reply_count.get(i)?,
            retweet_count: *d.retweet_count.get(i)?,
            like_count: *d.like_count.get(i)?,
            quote_count: *d.quote_count.get(i)?,
            machine_type: d.machine_type.get(i)?.clone(),
            coin_name: d.coin_name.get(i)?.clone(),
            coin_ticker: d.coin_ticker.get(i)?.clone(),
            followers_count: *d.followers_count.get(i)?,
            friends_count: *d.friends_count.get(i)?,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = TweetRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }

    /// Write into `dir` under [`TweetTable::file_name`], creating `dir` if needed.
    pub fn write_to_dir(&self, dir: &Path, range: &DateRange) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::file_name(range));
        let mut out = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(path)
    }

    /// Read a snapshot back, rejecting unknown column layouts and ragged columns.
    pub fn load(path: &Path) -> Result<Self> {
        let table: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        if !table.columns.iter().map(String::as_str).eq(COLUMNS) {
            return Err(invalid_snapshot(format!(
                "unexpected snapshot columns in {}: {:?}",
                path.display(),
                table.columns
            )));
        }
        let lens = table.data.lengths();
        if lens.iter().any(|&l| l != lens[0]) {
            return Err(invalid_snapshot(format!(
                "ragged snapshot columns in {}: {lens:?}",
                path.display()
            )));
        }
        Ok(table)
    }
}

fn invalid_snapshot(msg: String) -> CoinchatterError {
    CoinchatterError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, msg))
}

impl Extend<TweetRow> for TweetTable {
    fn extend<I: IntoIterator<Item = TweetRow>>(&mut self, iter: I) {
        for row in iter {
            self.push(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coins::COINS;
    use crate::collector::fake::hit;

    #[test]
    fn flattens_author_fields_and_tags_coin() {
        let row = TweetRow::from_hit(hit("42", "alice", false), &COINS[5]);
        assert_eq!(row.tweet_url, "https://x.com/alice/status/42");
        assert_eq!(row.user, "alice");
        assert_eq!(row.followers_count, 300);
        assert_eq!(row.friends_count, 250);
        assert_eq!((row.coin_name.as_str(), row.coin_ticker.as_str()), ("Ethereum", "ETH"));
        assert_eq!(row.machine_type.as_deref(), Some("Twitter Web App"));
        assert_eq!(row.date.unwrap().to_rfc3339(), "2022-01-01T00:30:00+00:00");
        assert_eq!(row.retweet_count, 0);
    }

    #[test]
    fn serializes_in_column_order_with_camel_case_names() {
        let mut table = TweetTable::new();
        table.push(TweetRow::from_hit(hit("1", "a", false), &COINS[0]));
        let v = serde_json::to_value(&table).unwrap();

        let names: Vec<_> = v["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c.as_str().unwrap())
            .collect();
        assert_eq!(names, COLUMNS);
        for name in COLUMNS {
            assert_eq!(v["data"][name].as_array().map(Vec::len), Some(1), "{name}");
        }
        assert_eq!(v["data"]["tweetId"][0], "1");
        assert_eq!(v["data"]["coinTicker"][0], "BTC");
    }

    #[test]
    fn writes_and_reloads_snapshot_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let range = DateRange::parse("2022-01-01", "2022-01-11").unwrap();
        let mut table = TweetTable::new();
        table.extend([
            TweetRow::from_hit(hit("1", "a", false), &COINS[0]),
            TweetRow::from_hit(hit("2", "b", false), &COINS[13]),
        ]);

        let path = table.write_to_dir(&tmp.path().join("out"), &range).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str(),
            Some("2022-01-01:2022-01-11--tweets.plk")
        );

        let back = TweetTable::load(&path).unwrap();
        assert_eq!(back, table);
        let tickers: Vec<_> = back.rows().map(|r| r.coin_ticker).collect();
        assert_eq!(tickers, ["BTC", "DOGE"]);
    }

    #[test]
    fn ragged_files_are_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut v = serde_json::to_value(TweetTable::new()).unwrap();
        v["data"]["user"] = serde_json::json!(["orphan"]);
        let path = tmp.path().join("bad.plk");
        std::fs::write(&path, v.to_string()).unwrap();
        assert!(TweetTable::load(&path).is_err());
    }

    #[test]
    fn renamed_or_reordered_columns_are_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cols.plk");

        let mut v = serde_json::to_value(TweetTable::new()).unwrap();
        v["columns"][0] = serde_json::json!("url");
        std::fs::write(&path, v.to_string()).unwrap();
        let err = TweetTable::load(&path).unwrap_err();
        assert!(err.to_string().contains("unexpected snapshot columns"), "{err}");

        let mut v = serde_json::to_value(TweetTable::new()).unwrap();
        v["columns"].as_array_mut().unwrap().swap(0, 1);
        std::fs::write(&path, v.to_string()).unwrap();
        assert!(TweetTable::load(&path).is_err());
    }
}
