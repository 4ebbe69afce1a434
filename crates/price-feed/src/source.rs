use crate::error::FeedError;
use crate::types::MarketChartResponse;
use async_trait::async_trait;
use common::{AssetPair, PricePoint};
use config_lib::FeedConfig;
use reqwest::Client;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

const USER_AGENT: &str = "spread-scanner/0.1";
const MAX_BACKOFF_MS: u64 = 30_000;

/// Abstracts where price history comes from, so the scanner can run against
/// the live API or a stub.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Price history of `pair` over the last `lookback_days`, in feed order.
    async fn fetch(&self, pair: &AssetPair, lookback_days: u32)
        -> Result<Vec<PricePoint>, FeedError>;
}

/// `market_chart` client for CoinGecko-compatible APIs.
pub struct CoinGeckoSource {
    client: Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    initial_backoff: Duration,
}

impl CoinGeckoSource {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        })
    }

    /// `{base}/coins/{base_asset}/market_chart?vs_currency={quote}&days={days}`
    pub fn market_chart_url(&self, pair: &AssetPair, lookback_days: u32) -> String {
        format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}",
            self.base_url,
            pair.base.as_lowercase(),
            pair.quote.as_lowercase(),
            lookback_days
        )
    }

    async fn get_once(&self, url: &str) -> Result<Vec<PricePoint>, FeedError> {
        let response = timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| FeedError::Timeout(self.timeout))??;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chart: MarketChartResponse = serde_json::from_str(&body)?;
        let prices = chart.prices.ok_or(FeedError::MissingPrices)?;
        Ok(prices.into_iter().map(PricePoint::from).collect())
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    async fn fetch(
        &self,
        pair: &AssetPair,
        lookback_days: u32,
    ) -> Result<Vec<PricePoint>, FeedError> {
        if lookback_days == 0 {
            return Err(FeedError::InvalidRequest(
                "lookback days must be positive".to_string(),
            ));
        }

        let url = self.market_chart_url(pair, lookback_days);
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            debug!(%url, attempt = attempt + 1, "Requesting price history");
            match self.get_once(&url).await {
                Ok(points) => {
                    info!(pair = %pair, points = points.len(), "Fetched price history");
                    return Ok(points);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    warn!(pair = %pair, attempt = attempt + 1, error = %e, "Fetch failed, retrying in {:?}", backoff);
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(Duration::from_millis(MAX_BACKOFF_MS));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Price;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves canned `(status, body)` responses in order, repeating the last
    /// one, and counts requests.
    async fn spawn_server(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[n.min(responses.len() - 1)];

                let mut buf = vec![0u8; 4096];
                let mut request = Vec::new();
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let read = socket.read(&mut buf).await.unwrap_or(0);
                    if read == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..read]);
                }

                let response = format!(
                    "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/api/v3", addr), hits)
    }

    fn source_for(base_url: &str, max_retries: u32) -> CoinGeckoSource {
        CoinGeckoSource::new(&FeedConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            max_retries,
            initial_backoff_ms: 1,
            max_concurrency: 1,
        })
        .unwrap()
    }

    fn btc_usd() -> AssetPair {
        "btc-usd".parse().unwrap()
    }

    const CHART: &str = r#"{"prices":[[1704067200000,42000.5],[1704067500000,42010.0]]}"#;

    #[test]
    fn test_market_chart_url() {
        let source = source_for("https://api.coingecko.com/api/v3/", 0);
        assert_eq!(
            source.market_chart_url(&btc_usd(), 1),
            "https://api.coingecko.com/api/v3/coins/btc/market_chart?vs_currency=usd&days=1"
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let (base_url, hits) = spawn_server(vec![(200, CHART)]).await;
        let source = source_for(&base_url, 0);

        let points = source.fetch(&btc_usd(), 1).await.unwrap();
        assert_eq!(
            points,
            vec![
                PricePoint::new(1704067200000, Price(dec!(42000.5))),
                PricePoint::new(1704067500000, Price(dec!(42010))),
            ]
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_retries_transient_status() {
        let (base_url, hits) = spawn_server(vec![(503, "busy"), (429, "slow down"), (200, CHART)]).await;
        let source = source_for(&base_url, 3);

        let points = source.fetch(&btc_usd(), 1).await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_gives_up_after_max_retries() {
        let (base_url, hits) = spawn_server(vec![(500, "down")]).await;
        let source = source_for(&base_url, 2);

        let err = source.fetch(&btc_usd(), 1).await.unwrap_err();
        assert!(matches!(err, FeedError::Status { status: 500, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_client_error() {
        let (base_url, hits) = spawn_server(vec![(404, r#"{"error":"coin not found"}"#)]).await;
        let source = source_for(&base_url, 3);

        let err = source.fetch(&btc_usd(), 1).await.unwrap_err();
        assert!(matches!(err, FeedError::Status { status: 404, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_missing_prices() {
        let (base_url, _) = spawn_server(vec![(200, r#"{"market_caps":[]}"#)]).await;
        let source = source_for(&base_url, 3);

        let err = source.fetch(&btc_usd(), 1).await.unwrap_err();
        assert!(matches!(err, FeedError::MissingPrices));
    }

    #[tokio::test]
    async fn test_fetch_unparsable_body() {
        let (base_url, _) = spawn_server(vec![(200, "<html>oops</html>")]).await;
        let source = source_for(&base_url, 3);

        let err = source.fetch(&btc_usd(), 1).await.unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_zero_days() {
        let source = source_for("http://127.0.0.1:9/api/v3", 0);
        let err = source.fetch(&btc_usd(), 0).await.unwrap_err();
        assert!(matches!(err, FeedError::InvalidRequest(_)));
    }
}
