//! HTTP server for the news API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::{NewsError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, app_state: Arc<AppState>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                NewsError::Config(format!(
                    "invalid server address {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        Ok(Self {
            addr,
            app_state,
            cors_origins: config.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(self) -> (SocketAddr, Router) {
        let router =
            create_router(self.app_state, &self.cors_origins).merge(create_health_router());
        (self.addr, router)
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let (addr, router) = self.router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let (addr, router) = self.router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, RefreshConfig, TranslationConfig};
    use crate::news::{
        FeedClient, FeedError, NewsAggregator, RawNewsItem, TranslationError, Translator,
    };
    use async_trait::async_trait;

    struct EmptyFeed;

    #[async_trait]
    impl FeedClient for EmptyFeed {
        async fn fetch_raw(&self) -> std::result::Result<Vec<RawNewsItem>, FeedError> {
            Ok(Vec::new())
        }
    }

    struct Echo;

    #[async_trait]
    impl Translator for Echo {
        async fn translate(
            &self,
            text: &str,
            _target: &str,
        ) -> std::result::Result<String, TranslationError> {
            Ok(text.to_string())
        }
    }

    fn create_test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Use random port
            cors_origins: vec![],
        }
    }

    fn create_state() -> Arc<AppState> {
        let aggregator = Arc::new(NewsAggregator::new(
            Arc::new(EmptyFeed),
            Arc::new(Echo),
            &TranslationConfig::default(),
            &CacheConfig::default(),
        ));
        Arc::new(AppState::new(aggregator, &RefreshConfig::default()))
    }

    #[test]
    fn test_web_server_new() {
        let server = WebServer::new(&create_test_config(), create_state()).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_web_server_invalid_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..create_test_config()
        };
        let err = WebServer::new(&config, create_state()).err().unwrap();
        assert!(err.to_string().contains("invalid server address"));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let server = WebServer::new(&create_test_config(), create_state()).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");

        let resp = client
            .get(format!("http://{}/api/news", addr))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "[]");
    }
}
