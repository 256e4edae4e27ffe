//! Twitter/X search surface: HTTP wrapper, response types, and the helpers that
//! join tweets with their expanded authors.
pub mod client;
pub mod extract;
pub mod types;

pub use client::{SearchRequest, TwitterApi};
pub use types::{HydratedTweet, Tweet, User};
