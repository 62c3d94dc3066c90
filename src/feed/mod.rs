pub mod client;
pub mod normalizer;
pub mod parser;

pub use client::{FeedClient, HttpTransport};
