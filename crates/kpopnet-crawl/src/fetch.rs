//! The fetch seam between the pipeline and the network.
//!
//! The crawl driver is generic over [`Fetch`] so tests can run the whole
//! pipeline against an in-memory page map. The real implementation wraps a
//! shared `reqwest` client; retry and politeness policy live here, opaque
//! to the pipeline.

use std::{future::Future, time::Duration};

use crate::Result;

/// Abstraction over HTTP document and asset retrieval.
///
/// All methods return `Send` futures so fetches can run on multi-threaded
/// tokio workers.
pub trait Fetch: Send + Sync + 'static {
  /// Fetch a page body as UTF-8 text.
  fn get_text<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;

  /// Fetch raw bytes (thumbnail images).
  fn get_bytes<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<Vec<u8>>> + Send + 'a;
}

/// Production fetcher backed by `reqwest`.
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new(user_agent: &str) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(user_agent)
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client })
  }

  async fn get(&self, url: &str) -> Result<reqwest::Response> {
    tracing::debug!(%url, "fetching");
    Ok(self.client.get(url).send().await?.error_for_status()?)
  }
}

impl Fetch for HttpFetcher {
  async fn get_text(&self, url: &str) -> Result<String> {
    Ok(self.get(url).await?.text().await?)
  }

  async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
    Ok(self.get(url).await?.bytes().await?.to_vec())
  }
}
