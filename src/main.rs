use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use yiwugo_proxy::{
    api::http::axum::app,
    config::Config,
    core::Core,
    yiwugo::{
        self,
        auth::{client_credentials::ClientCredentials, token_manager::TokenManager},
        cache::ResponseCache,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    if !config.has_credentials() {
        warn!("YIWUGO_CLIENT_ID / YIWUGO_CLIENT_SECRET are not set, upstream calls will fail");
    }

    let reqwest_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let auth_provider = ClientCredentials {
        client: reqwest_client.clone(),
        client_id: config.client_id.clone(),
        client_secret: config.client_secret.clone(),
        token_url: config.token_url(),
        mode: config.auth_mode,
    };

    let auth_provider = TokenManager::with_margin(auth_provider, config.token_margin);

    let gateway = yiwugo::Gateway {
        client: reqwest_client,
        base_url: config.api_base.clone(),
        referer: config.referer.clone(),
        endpoints: config.endpoints.clone(),
        auth_token_provider: auth_provider,
        cache: ResponseCache::new(config.cache_ttl, config.cache_capacity),
    };

    let core = Arc::new(Core::new(gateway));
    let app = app(core);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(message = "YiwuGo proxy listening", %addr, api_base = %config.api_base, auth_mode = ?config.auth_mode);

    axum::serve(listener, app).await?;
    Ok(())
}
