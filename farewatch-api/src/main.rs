use std::net::SocketAddr;
use std::sync::Arc;

use farewatch_api::{
    app,
    state::{AppState, AuthSettings, CurationSettings},
};
use farewatch_archive::ArchivePolicy;
use farewatch_core::ReferenceTables;
use farewatch_curate::HttpClassifier;
use farewatch_dispatch::{FixedDelayPacer, HttpNotifier};
use farewatch_store::{
    PgArchive, PgCuratedDeals, PgDealFeed, PgDeliveryLedger, PgRecipientDirectory,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farewatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = farewatch_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting farewatch API on port {}", config.server.port);

    let db = farewatch_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let classifier = HttpClassifier::new(
        config.classifier.url.clone(),
        config.classifier.api_key.clone(),
        config.classifier.timeout_seconds,
    )
    .expect("Failed to build classifier client");

    let notifier = HttpNotifier::new(
        config.dispatch.notifier_url.clone(),
        config.dispatch.notifier_timeout_seconds,
    )
    .expect("Failed to build notifier client");

    let app_state = AppState {
        feed: Arc::new(PgDealFeed::new(
            db.pool.clone(),
            config.dispatch.feed_freshness_hours,
        )),
        curated: Arc::new(PgCuratedDeals::new(db.pool.clone())),
        ledger: Arc::new(PgDeliveryLedger::new(db.pool.clone())),
        directory: Arc::new(PgRecipientDirectory::new(db.pool.clone())),
        notifier: Arc::new(notifier),
        classifier: Arc::new(classifier),
        archive: Arc::new(PgArchive::new(db.pool.clone())),
        pacer: Arc::new(FixedDelayPacer::new(config.dispatch.send_delay_ms)),
        tables: Arc::new(ReferenceTables::builtin()),
        curation: CurationSettings {
            min_score: config.curation.min_score,
            max_candidates: config.curation.max_candidates,
        },
        archive_policy: ArchivePolicy {
            delay_hours: config.archive.delay_hours,
            publish_percentage: config.archive.publish_percentage,
            min_deals_per_locale_per_week: config.archive.min_deals_per_locale_per_week,
        },
        auth: AuthSettings {
            trigger_token: config.auth.trigger_token.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
