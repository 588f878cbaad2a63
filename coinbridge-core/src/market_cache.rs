//! Session-scoped market/currency cache.
//!
//! Markets and currencies are loaded once per adapter session and reused
//! by every subsequent call ("load once, reuse many"). The cache only
//! changes on an explicit, caller-triggered reload; there is no
//! automatic invalidation. Concurrent `load_markets` callers are
//! de-duplicated: a loading mutex serializes them, so exactly one fetch
//! hits the venue and the rest observe the filled cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{Currency, Market};

#[derive(Debug, Default)]
struct CacheInner {
    markets: HashMap<String, Arc<Market>>,
    markets_by_id: HashMap<String, Arc<Market>>,
    currencies: HashMap<String, Arc<Currency>>,
    currencies_by_id: HashMap<String, Arc<Currency>>,
    symbols: Vec<String>,
    loaded: bool,
}

/// Thread-safe market/currency cache with de-duplicated loading.
#[derive(Debug, Clone, Default)]
pub struct MarketCache {
    inner: Arc<RwLock<CacheInner>>,
    loading: Arc<Mutex<()>>,
}

impl MarketCache {
    /// Creates an empty, unloaded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a market set has been loaded.
    pub async fn is_loaded(&self) -> bool {
        self.inner.read().await.loaded
    }

    /// Loads markets through `loader`, serializing concurrent callers.
    ///
    /// Only the first caller executes the loader; callers that were
    /// waiting on the lock observe the freshly filled cache and return
    /// it without a second venue round-trip. `reload` forces a fetch
    /// even when the cache is already populated.
    pub async fn load_with<F, Fut>(
        &self,
        venue: &str,
        reload: bool,
        loader: F,
    ) -> Result<HashMap<String, Arc<Market>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(Vec<Market>, Option<Vec<Currency>>)>>,
    {
        let _load_guard = self.loading.lock().await;

        {
            let cache = self.inner.read().await;
            if cache.loaded && !reload {
                debug!(venue, markets = cache.markets.len(), "markets cache hit");
                return Ok(cache.markets.clone());
            }
        }

        info!(venue, reload, "loading markets");
        let (markets, currencies) = loader().await?;
        self.set_markets(venue, markets, currencies).await;

        Ok(self.inner.read().await.markets.clone())
    }

    /// Replaces the cached market/currency set.
    pub async fn set_markets(
        &self,
        venue: &str,
        markets: Vec<Market>,
        currencies: Option<Vec<Currency>>,
    ) {
        let mut cache = self.inner.write().await;

        cache.markets.clear();
        cache.markets_by_id.clear();
        cache.symbols.clear();
        for market in markets {
            cache.symbols.push(market.symbol.clone());
            let market = Arc::new(market);
            cache
                .markets_by_id
                .insert(market.id.clone(), Arc::clone(&market));
            cache.markets.insert(market.symbol.clone(), market);
        }

        if let Some(currencies) = currencies {
            cache.currencies.clear();
            cache.currencies_by_id.clear();
            for currency in currencies {
                let currency = Arc::new(currency);
                cache
                    .currencies_by_id
                    .insert(currency.id.clone(), Arc::clone(&currency));
                cache
                    .currencies
                    .insert(currency.code.clone(), currency);
            }
        }

        cache.loaded = true;
        info!(
            venue,
            markets = cache.markets.len(),
            currencies = cache.currencies.len(),
            "markets cached"
        );
    }

    /// Resolves a unified symbol to its market.
    ///
    /// # Errors
    ///
    /// Fails with an explicit "markets not loaded" error before any load,
    /// and with `BadSymbol` for a symbol the venue does not list, never
    /// a silently wrong market id.
    pub async fn market(&self, symbol: &str) -> Result<Arc<Market>> {
        let cache = self.inner.read().await;
        if !cache.loaded {
            return Err(Error::exchange(
                "markets not loaded, call load_markets() first",
            ));
        }
        cache
            .markets
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::bad_symbol(format!("unknown symbol {symbol}")))
    }

    /// Resolves a venue market id to its market, if listed.
    pub async fn market_by_id(&self, id: &str) -> Option<Arc<Market>> {
        self.inner.read().await.markets_by_id.get(id).cloned()
    }

    /// Resolves a unified currency code, if listed.
    pub async fn currency(&self, code: &str) -> Option<Arc<Currency>> {
        self.inner.read().await.currencies.get(code).cloned()
    }

    /// Resolves a venue currency id, if listed.
    pub async fn currency_by_id(&self, id: &str) -> Option<Arc<Currency>> {
        self.inner.read().await.currencies_by_id.get(id).cloned()
    }

    /// All cached unified symbols.
    pub async fn symbols(&self) -> Vec<String> {
        self.inner.read().await.symbols.clone()
    }

    /// Snapshot of the markets-by-id index, the form the normalizers
    /// consume.
    pub async fn markets_by_id(&self) -> HashMap<String, Arc<Market>> {
        self.inner.read().await.markets_by_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn sample_markets() -> Vec<Market> {
        vec![
            Market::new_spot("BTCUSDT", "BTC/USDT", "BTC", "USDT"),
            Market::new_spot("ETHUSDT", "ETH/USDT", "ETH", "USDT"),
        ]
    }

    #[tokio::test]
    async fn test_load_and_resolve() {
        let cache = MarketCache::new();
        cache
            .load_with("test", false, || async { Ok((sample_markets(), None)) })
            .await
            .unwrap();

        let market = cache.market("BTC/USDT").await.unwrap();
        assert_eq!(market.id, "BTCUSDT");
        assert!(cache.market_by_id("ETHUSDT").await.is_some());
        assert!(matches!(
            cache.market("DOGE/USDT").await,
            Err(Error::BadSymbol(_))
        ));
    }

    #[tokio::test]
    async fn test_unloaded_resolution_fails() {
        let cache = MarketCache::new();
        assert!(cache.market("BTC/USDT").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_loads_deduplicated() {
        let cache = MarketCache::new();
        let fetches = Arc::new(AtomicU32::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let fetches = Arc::clone(&fetches);
                tokio::spawn(async move {
                    cache
                        .load_with("test", false, || async {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                            Ok((sample_markets(), None))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reload_forces_fetch() {
        let cache = MarketCache::new();
        cache
            .load_with("test", false, || async { Ok((sample_markets(), None)) })
            .await
            .unwrap();
        let fetched = cache
            .load_with("test", true, || async {
                Ok((vec![Market::new_spot("X", "X/Y", "X", "Y")], None))
            })
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(cache.market("X/Y").await.is_ok());
    }
}
