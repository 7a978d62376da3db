//! intake-gate server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use intake_gate::adapters::account::{AccountDirectoryConfig, HttpAccountDirectory};
use intake_gate::adapters::http::{build_router, AppState, RouterSettings};
use intake_gate::adapters::memory::{
    InMemoryAccountDirectory, InMemoryPaymentLedger, InMemoryPendingSubmissionRepository,
    InMemorySubmissionRepository,
};
use intake_gate::adapters::postgres::{
    PostgresPaymentLedger, PostgresPendingSubmissionRepository, PostgresSubmissionRepository,
};
use intake_gate::adapters::rate_limiter::{InMemoryRateLimiter, RedisRateLimiter};
use intake_gate::adapters::storage::FileClientStore;
use intake_gate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use intake_gate::application::handlers::{
    CheckoutSettings, SweepReport, SweepSubmissionsCommand, SweepSubmissionsHandler,
};
use intake_gate::config::{AppConfig, LogFormat, ServerConfig};
use intake_gate::domain::foundation::{Currency, Timestamp};
use intake_gate::domain::payment::DEFAULT_PAYMENT_TYPE;
use intake_gate::ports::{
    AccountDirectory, PaymentLedger, PendingSubmissionRepository, RateLimiter,
    SubmissionRepository,
};

struct Stores {
    ledger: Arc<dyn PaymentLedger>,
    submissions: Arc<dyn SubmissionRepository>,
    pending: Arc<dyn PendingSubmissionRepository>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.server);
    config.validate().context("validating configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "starting intake-gate"
    );

    let stores = build_stores(&config).await?;
    let accounts = build_account_directory(&config)?;
    let rate_limiter = build_rate_limiter(&config).await;

    let provider = Arc::new(StripePaymentAdapter::new(StripeConfig::from_payment_config(
        &config.payment,
    )));
    let client_store = Arc::new(FileClientStore::new(&config.client_store.data_dir));

    let checkout_settings = CheckoutSettings {
        product_name: config.payment.product_name.clone(),
        payment_type: DEFAULT_PAYMENT_TYPE.to_string(),
        currency: Currency::new(&config.payment.currency)?,
        success_url: config.payment.success_url(),
        cancel_url: config.payment.cancel_url(),
    };

    spawn_sweeper(&stores, &config);

    let state = AppState {
        provider,
        ledger: stores.ledger,
        submissions: stores.submissions,
        pending: stores.pending,
        accounts,
        client_store,
        rate_limiter,
        checkout_settings,
    };

    let router_settings = RouterSettings {
        cors_origins: config.server.cors_origins_list(),
        request_timeout: config.server.request_timeout(),
        trust_proxy: config.server.trust_proxy,
    };
    let app = build_router(state, &router_settings);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("shut down");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    match server.log_format() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }
}

async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    let Some(database) = &config.database else {
        warn!("no database configured, using in-memory stores");
        return Ok(Stores {
            ledger: Arc::new(InMemoryPaymentLedger::new()),
            submissions: Arc::new(InMemorySubmissionRepository::new()),
            pending: Arc::new(InMemoryPendingSubmissionRepository::new()),
        });
    };

    let pool = database.connect().await.context("connecting to database")?;
    if database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("running migrations")?;
        info!("migrations applied");
    }

    Ok(Stores {
        ledger: Arc::new(PostgresPaymentLedger::new(pool.clone())),
        submissions: Arc::new(PostgresSubmissionRepository::new(pool.clone())),
        pending: Arc::new(PostgresPendingSubmissionRepository::new(pool)),
    })
}

fn build_account_directory(config: &AppConfig) -> anyhow::Result<Arc<dyn AccountDirectory>> {
    match &config.accounts.service_url {
        Some(url) => {
            let mut directory = AccountDirectoryConfig::new(url.clone());
            if let Some(token) = &config.accounts.api_token {
                directory = directory.with_api_token(token.clone());
            }
            Ok(Arc::new(HttpAccountDirectory::new(directory)?))
        }
        None => {
            warn!("no account service configured, using in-memory directory");
            Ok(Arc::new(InMemoryAccountDirectory::new()))
        }
    }
}

async fn build_rate_limiter(config: &AppConfig) -> Arc<dyn RateLimiter> {
    let limits = config.rate_limit.limits();
    if let Some(url) = &config.rate_limit.redis_url {
        match RedisRateLimiter::connect(url, limits.clone()).await {
            Ok(limiter) => return Arc::new(limiter),
            Err(e) => warn!(error = %e, "redis unavailable, falling back to in-memory rate limiting"),
        }
    }
    Arc::new(InMemoryRateLimiter::new(limits))
}

fn spawn_sweeper(stores: &Stores, config: &AppConfig) {
    let handler = SweepSubmissionsHandler::new(
        stores.submissions.clone(),
        stores.pending.clone(),
        stores.ledger.clone(),
        config.retention.pending_payment_ttl_hours,
    );
    let period = config.retention.sweep_interval();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match handler.handle(SweepSubmissionsCommand { now: Timestamp::now() }).await {
                Ok(report) if report != SweepReport::default() => {
                    info!(
                        promoted = report.promoted,
                        expired = report.expired,
                        purged_pending = report.purged_pending,
                        "sweep completed"
                    );
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
