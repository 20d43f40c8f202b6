//! Cache module for storing API responses to disk
//!
//! Responses are stored verbatim, one file per request URL, named by the SHA-1
//! of that URL. Entries are permanent: a URL fetched once is never requested
//! from the network again while its file exists.

mod manager;

pub use manager::{default_cache_dir, ResponseCache};
