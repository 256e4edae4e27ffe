//! Social network search clients used by coinchatter.
//!
//! Only the Twitter/X v2 search API is implemented.
pub mod twitter;
