//! HTTP server for the same-origin proxy

use crate::config::Config;
use crate::routes;
use anyhow::Result;
use axum::Router;
use reqwest::Client;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use url::Url;

/// Application state shared across handlers
pub struct AppState {
    pub http: Client,
    pub upstream: Url,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.upstream_timeout())
            .build()?;

        Ok(Self {
            http,
            upstream: config.upstream_url()?,
        })
    }

    pub fn with_upstream(upstream: Url) -> Self {
        Self {
            http: Client::new(),
            upstream,
        }
    }

    /// Upstream URL for `path`, appended after any prefix in the base URL
    pub(crate) fn upstream_url(&self, path: &str) -> Result<Url> {
        let mut url = self.upstream.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Upstream URL cannot carry a path: {}", self.upstream))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::proxy_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(config: Config) -> Result<()> {
    let state = Arc::new(AppState::new(&config)?);
    let app = router(state);

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(upstream = %config.upstream.base_url, "Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_url_keeps_base_path() {
        let state = AppState::with_upstream(Url::parse("http://flask:5001/backend").unwrap());
        let url = state.upstream_url("/api/business-data").unwrap();
        assert_eq!(url.as_str(), "http://flask:5001/backend/api/business-data");

        let state = AppState::with_upstream(Url::parse("http://flask:5001").unwrap());
        let url = state.upstream_url("/user_login").unwrap();
        assert_eq!(url.as_str(), "http://flask:5001/user_login");
    }
}
