use std::{net::TcpListener, sync::Arc, time::Duration};

use actix_web::web::Data;
use anyhow::Context;
use env_logger::Env;
use lead_intel::{
    configuration::get_configuration,
    dal::{PgStore, ResearchStore},
    domain::lead_search::SearchEvent,
    services::{
        lead_search_dispatch_handler, schedule_runner_handler, DropboxRefresher,
        HttpWebhookClient, IntelBridge, LeadSearchService, LeadSearchSettings, SearchJob,
        SearchJobSender, StorageNotConfigured, TokenStatusSource, TokenStore, WebhookClient,
    },
    startup::{run, AppState},
};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::{broadcast, mpsc};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration")?;

    let pool_options = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(15 * 60)) // 15 minutes
        .max_lifetime(None);

    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .context("Failed to run database migrations")?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener =
        TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    let base_url = Url::parse(&configuration.application.base_url)
        .context("application.base_url is not a valid url")?;

    let store: Arc<dyn ResearchStore> = Arc::new(PgStore::new(connection_pool));
    let webhook_client: Arc<dyn WebhookClient> = Arc::new(
        HttpWebhookClient::new(configuration.webhooks.timeout())
            .context("Failed to build webhook http client")?,
    );

    let (search_job_sender, search_job_receiver) = mpsc::unbounded_channel::<SearchJob>();
    let (search_event_sender, search_event_receiver) = broadcast::channel::<SearchEvent>(1_000);
    drop(search_event_receiver);

    if configuration.webhooks.lead_search_url().is_none() {
        log::warn!("webhooks.lead_search_url is not set, lead searches will stay pending");
    }
    let lead_search = Arc::new(LeadSearchService::new(
        store.clone(),
        LeadSearchSettings {
            webhook_url: configuration.webhooks.lead_search_url().map(str::to_string),
            base_url: base_url.clone(),
            webapp: configuration.application.name.clone(),
        },
        SearchJobSender {
            sender: search_job_sender,
        },
        search_event_sender.clone(),
    ));
    let intel = IntelBridge::new(
        store.clone(),
        webhook_client.clone(),
        configuration.webhooks.intel_url.clone(),
        base_url.as_str(),
    );
    let tokens: Arc<dyn TokenStatusSource> =
        match DropboxRefresher::from_settings(&configuration.storage)
            .context("Failed to build storage http client")?
        {
            Some(refresher) => Arc::new(TokenStore::new(refresher)),
            None => {
                log::info!("Dropbox credentials not configured");
                Arc::new(StorageNotConfigured)
            }
        };

    // Spawn background tasks
    let store_clone = store.clone();
    tokio::spawn(async move {
        lead_search_dispatch_handler(
            search_job_receiver,
            store_clone,
            webhook_client,
            search_event_sender,
        )
        .await
    });

    let lead_search_clone = lead_search.clone();
    let store_clone = store.clone();
    let poll_interval = Duration::from_secs(configuration.schedules.poll_interval_seconds.max(1));
    tokio::spawn(async move {
        schedule_runner_handler(lead_search_clone, store_clone, poll_interval).await
    });

    let state = AppState {
        store: Data::from(store),
        lead_search: Data::from(lead_search),
        intel: Data::new(intel),
        tokens: Data::from(tokens),
    };

    log::info!("Listening on {}", address);
    run(listener, state)?.await?;
    Ok(())
}
