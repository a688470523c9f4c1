//! Webhook receiver binary.

use std::error::Error;
use std::sync::Arc;

use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use storefront_payments::adapters::http::{webhook_router, WebhookAppState};
use storefront_payments::adapters::paypal::{
    CachingCertificateFetcher, ConfiguredWebhookId, HttpCertificateFetcher, PayPalApiClient,
    PayPalCredentials, PostbackSignatureVerifier, RetryPolicy,
};
use storefront_payments::adapters::postgres::PostgresWebhookAuditLog;
use storefront_payments::adapters::redis::RedisTokenStore;
use storefront_payments::adapters::{SystemClock, TracingPaymentEventSink};
use storefront_payments::application::{default_registry, WebhookListenerChain};
use storefront_payments::config::{AppConfig, PayPalConfig, ServerConfig};
use storefront_payments::domain::token::{TokenCacheFactory, TokenCipher};
use storefront_payments::domain::webhook::{
    CertificateUrlPolicy, WebhookProcessor, WebhookVerifier,
};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server)?;
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting storefront payments"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn = tokio::time::timeout(
        config.redis.timeout(),
        redis_client.get_multiplexed_async_connection(),
    )
    .await??;
    let token_store =
        RedisTokenStore::new(redis_conn).with_key_prefix(config.token_cache.key_prefix.clone());
    let token_caches = TokenCacheFactory::new(
        TokenCipher::from_secret(&SecretString::new(config.token_cache.secret.clone())),
        Arc::new(token_store),
        Arc::new(SystemClock),
    );

    let verifier = build_verifier(&config.paypal, &token_caches)?;
    let processor = WebhookProcessor::new(
        Arc::new(verifier),
        Arc::new(PostgresWebhookAuditLog::new(pool)),
        Arc::new(default_registry(Arc::new(TracingPaymentEventSink))),
    );
    let chain = WebhookListenerChain::new().with_listener("paypal", Arc::new(processor));

    let app = webhook_router()
        .with_state(WebhookAppState::new(Arc::new(chain)))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.server.request_timeout()));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening for webhooks");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&server.log_level))?;

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_target(true))
            .try_init()?;
    }
    Ok(())
}

fn build_verifier(
    paypal: &PayPalConfig,
    token_caches: &TokenCacheFactory,
) -> Result<WebhookVerifier, BoxError> {
    let fetcher = CachingCertificateFetcher::new(
        Arc::new(HttpCertificateFetcher::new(paypal.network_timeout())?),
        paypal.cert_cache_ttl(),
    );

    let mut verifier = WebhookVerifier::new(
        Arc::new(ConfiguredWebhookId::new(paypal.webhook_id.clone())),
        Arc::new(fetcher),
    )
    .with_url_policy(CertificateUrlPolicy::new(paypal.cert_hosts_list()))
    .with_network_timeout(paypal.network_timeout());

    match paypal.credentials() {
        Some((client_id, client_secret)) => {
            let credentials = PayPalCredentials::new(client_id, client_secret)
                .with_base_url(paypal.api_base_url.clone())
                .with_request_timeout(paypal.network_timeout());
            let client = PayPalApiClient::new(credentials, token_caches)?;
            let postback = PostbackSignatureVerifier::new(Arc::new(client)).with_retry_policy(
                RetryPolicy {
                    max_attempts: paypal.postback_max_attempts,
                    backoff: paypal.postback_backoff(),
                },
            );
            verifier = verifier.with_fallback(Arc::new(postback));
        }
        None => tracing::warn!("No PayPal REST credentials; postback verification disabled"),
    }

    if paypal.webhook_id.is_none() {
        tracing::warn!("No webhook id configured; every delivery will be indeterminate");
    }

    Ok(verifier)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Could not listen for shutdown signal");
    }
}
