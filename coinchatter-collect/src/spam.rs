//! Heuristic spam classification over an author's public profile.
use chrono::{DateTime, Utc};
use coinchatter_social::twitter::User;

/// Platform hard cap on accounts followed (before follower-based lifts).
pub const FOLLOW_LIMIT: u64 = 5000;
/// Following fewer than this share of one's followers looks like a bought audience.
pub const MIN_FOLLOWING_RATIO: f64 = 0.1;
pub const MAX_DAILY_POSTS: f64 = 200.0;

/// The slice of an author's profile the classifier looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorProfile {
    pub verified: bool,
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl AuthorProfile {
    /// Lifetime posts per whole day of account age. Accounts younger than a day
    /// count as one day old; `None` when the creation time is unknown.
    pub fn daily_post_rate(&self, now: DateTime<Utc>) -> Option<f64> {
        let created = self.created_at?;
        let days = (now - created).num_days().max(1);
        Some(self.posts as f64 / days as f64)
    }
}

impl From<&User> for AuthorProfile {
    fn from(user: &User) -> Self {
        let metrics = user.public_metrics.clone().unwrap_or_default();
        Self {
            verified: user.verified.unwrap_or(false),
            followers: metrics.followers_count,
            following: metrics.following_count,
            posts: metrics.tweet_count,
            created_at: user
                .created_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Verified authors are never spam. Anyone else is if they sit at the follow
/// cap with fewer followers than followees, follow under 10% of their follower
/// count, or average more than 200 posts a day.
pub fn is_spam(profile: &AuthorProfile, now: DateTime<Utc>) -> bool {
    if profile.verified {
        return false;
    }

    let maxed_out_follows =
        profile.following == FOLLOW_LIMIT && profile.followers < profile.following;
    let lopsided = (profile.following as f64) < profile.followers as f64 * MIN_FOLLOWING_RATIO;
    let hyperactive = profile
        .daily_post_rate(now)
        .is_some_and(|rate| rate > MAX_DAILY_POSTS);

    maxed_out_follows || lopsided || hyperactive
}
