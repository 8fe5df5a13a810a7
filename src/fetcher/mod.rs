pub mod http_fetcher;
pub mod items;
pub mod parallel;

pub use items::ItemFetcher;

use async_trait::async_trait;

use crate::app::Result;

/// Raw GET against the upstream API. `path` is relative to the API base,
/// e.g. `item/8863.json`.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}
