//! Coin-mention collection pipeline.
//!
//! [`BatchDriver::run`] splits a date range into segments, walks each
//! segment's hourly windows newest-first, and for every tracked [`Coin`] pulls
//! up to a capped number of non-spam tweets through a [`TweetSource`]. Each
//! segment ends up as one column-oriented [`TweetTable`] on disk.
pub mod coins;
pub mod collector;
pub mod driver;
pub mod spam;
pub mod table;
pub mod window;

pub use coins::{COINS, Coin};
pub use collector::{Collected, TweetSource, collect};
pub use driver::{BatchDriver, CollectSettings, SegmentReport, dedup_by_id};
pub use spam::{AuthorProfile, is_spam};
pub use table::{TweetRow, TweetTable};
pub use window::{HourWindow, hourly_windows, segments};
