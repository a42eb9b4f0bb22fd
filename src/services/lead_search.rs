use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{
    broadcast,
    mpsc::{UnboundedReceiver, UnboundedSender},
};
use url::Url;
use uuid::Uuid;

use crate::{
    dal::Store,
    domain::{
        lead::Lead,
        lead_search::{
            LeadSearch, NewLeadSearch, SearchEvent, SearchHandle, SearchStatus, SearchType,
            TriggerSource,
        },
    },
    error::{ResearchError, Result},
};

use super::{map_results, WebhookClient};

/// One dispatched search waiting for its outbound webhook call.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub search_id: Uuid,
    pub client_business_id: Uuid,
    pub user_id: String,
    pub webhook_url: String,
    pub payload: Value,
}

pub struct SearchJobSender {
    pub sender: UnboundedSender<SearchJob>,
}

#[derive(Serialize)]
struct LeadSearchPayload<'a> {
    domain: &'a str,
    webapp: &'a str,
    client: &'a str,
    client_business_id: Uuid,
    search_id: Uuid,
    keyword: &'a str,
    geo: &'a str,
    search_types: &'a [SearchType],
    verify_emails: bool,
    callback_url: String,
}

/// Shapes the lead webhook may answer with.
#[derive(Debug, PartialEq)]
pub enum WebhookReply {
    Results(Vec<Value>),
    /// The automation accepted the job and will call back later.
    Deferred { external_id: String },
}

pub fn parse_webhook_reply(body: Value) -> Result<WebhookReply> {
    match body {
        Value::Array(items) => Ok(WebhookReply::Results(items)),
        Value::Object(mut fields) => {
            if let Some(Value::Array(items)) = fields.remove("results") {
                return Ok(WebhookReply::Results(items));
            }
            let accepted = fields.get("success").and_then(Value::as_bool) == Some(true);
            let external_id = fields
                .get("search_id")
                .or_else(|| fields.get("searchId"))
                .map(|id| match id {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            match (accepted, external_id) {
                (true, Some(external_id)) => Ok(WebhookReply::Deferred { external_id }),
                _ => Err(ResearchError::UpstreamFailure(
                    "webhook response has neither results nor an accepted search id".to_string(),
                )),
            }
        }
        other => Err(ResearchError::UpstreamFailure(format!(
            "unexpected webhook response: {}",
            other
        ))),
    }
}

pub struct LeadSearchSettings {
    pub webhook_url: Option<String>,
    pub base_url: Url,
    pub webapp: String,
}

pub struct LeadSearchService {
    store: Store,
    settings: LeadSearchSettings,
    jobs: SearchJobSender,
    events: broadcast::Sender<SearchEvent>,
}

impl LeadSearchService {
    pub fn new(
        store: Store,
        settings: LeadSearchSettings,
        jobs: SearchJobSender,
        events: broadcast::Sender<SearchEvent>,
    ) -> Self {
        LeadSearchService {
            store,
            settings,
            jobs,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.events.subscribe()
    }

    pub fn callback_url(&self, search_id: Uuid) -> String {
        format!(
            "{}/api/lead-searches/{}/callback",
            self.settings.base_url.as_str().trim_end_matches('/'),
            search_id
        )
    }

    /// Creates the search row and hands the webhook call to the dispatch queue.
    /// The returned handle reflects the state before any webhook outcome.
    pub async fn execute_lead_search(
        &self,
        client_business_id: Uuid,
        user_id: &str,
        search_types: Vec<SearchType>,
        verify_emails: bool,
        triggered_by: TriggerSource,
    ) -> Result<SearchHandle> {
        let client = self
            .store
            .get_client(client_business_id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| {
                ResearchError::NotFound(format!("client business {}", client_business_id))
            })?;

        let geo = client.resolve_geo().ok_or_else(|| {
            ResearchError::InvalidState(format!(
                "client business {} has no zip code, city or address",
                client.id
            ))
        })?;

        let search_types = if search_types.is_empty() {
            vec![
                SearchType::IdealCustomer,
                SearchType::Competitor,
                SearchType::Partner,
            ]
        } else {
            search_types
        };

        let search = self
            .store
            .insert_search(NewLeadSearch {
                client_business_id: client.id,
                user_id: user_id.to_string(),
                keyword: client.keyword.clone(),
                geo,
                search_types,
                verify_emails,
                triggered_by,
            })
            .await?;
        log::info!(
            "Created lead search {} for client {} ({} in {})",
            search.id,
            client.id,
            search.keyword,
            search.geo
        );
        publish(&self.events, search.id, SearchStatus::Pending);

        let Some(webhook_url) = self.settings.webhook_url.clone() else {
            log::warn!(
                "No lead search webhook configured, search {} stays pending",
                search.id
            );
            return Ok(SearchHandle {
                search_id: search.id,
                status: SearchStatus::Pending,
            });
        };

        self.store.mark_search_running(search.id).await?;
        publish(&self.events, search.id, SearchStatus::Running);

        let domain = self.settings.base_url.host_str().unwrap_or_default();
        let payload = serde_json::to_value(LeadSearchPayload {
            domain,
            webapp: &self.settings.webapp,
            client: &client.name,
            client_business_id: client.id,
            search_id: search.id,
            keyword: &search.keyword,
            geo: &search.geo,
            search_types: &search.search_types,
            verify_emails: search.verify_emails,
            callback_url: self.callback_url(search.id),
        })
        .map_err(|e| ResearchError::InvalidInput(e.to_string()))?;

        let job = SearchJob {
            search_id: search.id,
            client_business_id: client.id,
            user_id: user_id.to_string(),
            webhook_url,
            payload,
        };

        if let Err(e) = self.jobs.sender.send(job) {
            log::error!("Lead search dispatch queue is closed: {:?}", e);
            fail_search(&self.store, &self.events, search.id, "dispatch queue unavailable")
                .await;
            return Ok(SearchHandle {
                search_id: search.id,
                status: SearchStatus::Error,
            });
        }

        Ok(SearchHandle {
            search_id: search.id,
            status: SearchStatus::Running,
        })
    }

    /// Completes (or fails) a search the webhook accepted for later delivery.
    pub async fn ingest_search_callback(&self, search_id: Uuid, body: Value) -> Result<LeadSearch> {
        let search = self
            .store
            .get_search(search_id)
            .await?
            .ok_or_else(|| ResearchError::NotFound(format!("lead search {}", search_id)))?;

        if search.status != SearchStatus::Running {
            return Err(ResearchError::InvalidState(format!(
                "lead search {} is {}, not running",
                search_id,
                search.status.as_str()
            )));
        }

        let reported_error = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|_| body.get("results").is_none())
            .map(|e| e.to_string());

        if let Some(message) = reported_error {
            fail_search(&self.store, &self.events, search_id, &message).await;
        } else {
            match parse_webhook_reply(body) {
                Ok(WebhookReply::Results(raw)) => {
                    complete_search(
                        &self.store,
                        &self.events,
                        search_id,
                        search.client_business_id,
                        &search.user_id,
                        &raw,
                    )
                    .await?;
                }
                Ok(WebhookReply::Deferred { .. }) | Err(_) => {
                    return Err(ResearchError::InvalidInput(
                        "callback carried no results".to_string(),
                    ));
                }
            }
        }

        self.store
            .get_search(search_id)
            .await?
            .ok_or_else(|| ResearchError::NotFound(format!("lead search {}", search_id)))
    }
}

pub async fn lead_search_dispatch_handler(
    mut job_receiver: UnboundedReceiver<SearchJob>,
    store: Store,
    webhook_client: Arc<dyn WebhookClient>,
    events: broadcast::Sender<SearchEvent>,
) {
    log::info!("Started lead search dispatch handler");

    while let Some(job) = job_receiver.recv().await {
        log::info!(
            "Lead search dispatch handler has {} queued jobs",
            job_receiver.len()
        );
        tokio::spawn(dispatch_search(
            job,
            store.clone(),
            webhook_client.clone(),
            events.clone(),
        ));
    }

    log::warn!("Lead search dispatch queue closed, handler exiting");
}

pub async fn dispatch_search(
    job: SearchJob,
    store: Store,
    webhook_client: Arc<dyn WebhookClient>,
    events: broadcast::Sender<SearchEvent>,
) {
    log::info!("Dispatching lead search {} to webhook", job.search_id);

    let outcome = match webhook_client.post_json(&job.webhook_url, &job.payload).await {
        Ok(body) => parse_webhook_reply(body),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(WebhookReply::Results(raw)) => {
            if let Err(e) = complete_search(
                &store,
                &events,
                job.search_id,
                job.client_business_id,
                &job.user_id,
                &raw,
            )
            .await
            {
                log::error!("Could not complete lead search {}: {:?}", job.search_id, e);
                fail_search(&store, &events, job.search_id, &e.to_string()).await;
            }
        }
        Ok(WebhookReply::Deferred { external_id }) => {
            log::info!(
                "Lead search {} accepted by webhook as {}, awaiting callback",
                job.search_id,
                external_id
            );
        }
        Err(e) => {
            log::error!("Lead search {} webhook failed: {}", job.search_id, e);
            fail_search(&store, &events, job.search_id, &e.to_string()).await;
        }
    }
}

async fn complete_search(
    store: &Store,
    events: &broadcast::Sender<SearchEvent>,
    search_id: Uuid,
    client_business_id: Uuid,
    user_id: &str,
    raw: &[Value],
) -> Result<()> {
    let results = map_results(raw);

    if !store.complete_search(search_id, &results).await? {
        log::warn!(
            "Lead search {} is no longer running, dropping {} results",
            search_id,
            results.len()
        );
        return Ok(());
    }
    log::info!(
        "Lead search {} completed with {} results",
        search_id,
        results.len()
    );

    for business in results.iter() {
        let lead = Lead::from_business(business, client_business_id, Some(search_id), user_id);
        if let Err(e) = store.upsert_lead(&lead).await {
            log::error!(
                "Error storing lead {:?} from search {}: {:?}",
                business.place_id,
                search_id,
                e
            );
        }
    }

    // Published once leads are readable.
    publish(events, search_id, SearchStatus::Completed);
    Ok(())
}

async fn fail_search(
    store: &Store,
    events: &broadcast::Sender<SearchEvent>,
    search_id: Uuid,
    message: &str,
) {
    match store.fail_search(search_id, message).await {
        Ok(true) => publish(events, search_id, SearchStatus::Error),
        Ok(false) => log::warn!("Lead search {} already terminal, error not recorded", search_id),
        Err(e) => log::error!("Error marking lead search {} failed: {:?}", search_id, e),
    }
}

fn publish(events: &broadcast::Sender<SearchEvent>, search_id: Uuid, status: SearchStatus) {
    // No subscribers is fine.
    _ = events.send(SearchEvent { search_id, status });
}
