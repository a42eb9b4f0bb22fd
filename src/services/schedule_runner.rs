use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::time;

use crate::{
    dal::Store,
    domain::{lead_search::TriggerSource, schedule::SearchSchedule},
    error::Result,
};

use super::LeadSearchService;

const MAX_DUE_PER_TICK: i64 = 25;

pub async fn schedule_runner_handler(
    service: Arc<LeadSearchService>,
    store: Store,
    poll_interval: Duration,
) {
    log::info!(
        "Started schedule runner, polling every {}s",
        poll_interval.as_secs()
    );

    let mut interval = time::interval(poll_interval);

    loop {
        interval.tick().await;

        match run_due_schedules(&service, &store, Utc::now()).await {
            Ok(0) => {}
            Ok(triggered) => log::info!("Schedule runner triggered {} searches", triggered),
            Err(e) => log::error!("Schedule runner could not load due schedules: {:?}", e),
        }
    }
}

/// Triggers every due schedule once and returns how many searches were created.
pub async fn run_due_schedules(
    service: &LeadSearchService,
    store: &Store,
    now: DateTime<Utc>,
) -> Result<usize> {
    let due = store.due_schedules(now, MAX_DUE_PER_TICK).await?;
    let mut triggered = 0;

    for schedule in due {
        match run_schedule(service, store, &schedule, now).await {
            Ok(true) => triggered += 1,
            Ok(false) => {}
            Err(e) => log::error!("Error running schedule {}: {:?}", schedule.id, e),
        }
    }

    Ok(triggered)
}

async fn run_schedule(
    service: &LeadSearchService,
    store: &Store,
    schedule: &SearchSchedule,
    now: DateTime<Utc>,
) -> Result<bool> {
    let client = store.get_client(schedule.client_business_id).await?;
    if !client.is_some_and(|c| c.is_active) {
        log::warn!(
            "Client {} is gone or inactive, deactivating schedule {}",
            schedule.client_business_id,
            schedule.id
        );
        store.deactivate_schedule(schedule.id).await?;
        return Ok(false);
    }

    let outcome = service
        .execute_lead_search(
            schedule.client_business_id,
            &schedule.user_id,
            schedule.search_types.clone(),
            schedule.verify_emails,
            TriggerSource::Schedule,
        )
        .await;

    // Advance even on failure so a broken client doesn't retrigger every tick.
    let search_id = match &outcome {
        Ok(handle) => Some(handle.search_id),
        Err(e) => {
            log::error!("Scheduled search {} failed to start: {}", schedule.id, e);
            None
        }
    };
    store
        .record_schedule_run(schedule.id, search_id, now, schedule.following_run(now))
        .await?;

    Ok(search_id.is_some())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use tokio::sync::{broadcast, mpsc};
    use url::Url;

    use super::run_due_schedules;
    use crate::{
        dal::{memory_store::MemoryStore, ResearchStore, Store},
        domain::{
            client_business::client_fixture,
            lead_search::{SearchStatus, SearchType, TriggerSource},
            schedule::NewSearchSchedule,
        },
        services::{LeadSearchService, LeadSearchSettings, SearchJobSender},
    };

    fn service(store: Store) -> LeadSearchService {
        let (sender, _receiver) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(8);
        LeadSearchService::new(
            store,
            LeadSearchSettings {
                webhook_url: None,
                base_url: Url::parse("https://leads.example.com").unwrap(),
                webapp: "lead-intel".to_string(),
            },
            SearchJobSender { sender },
            events,
        )
    }

    fn weekly(first_run_at: chrono::DateTime<Utc>) -> NewSearchSchedule {
        NewSearchSchedule {
            search_types: vec![SearchType::Competitor],
            verify_emails: true,
            interval_days: 7,
            first_run_at: Some(first_run_at),
        }
    }

    #[tokio::test]
    async fn due_schedule_triggers_search_and_advances() {
        let client = client_fixture(None, Some("Austin"), "");
        let client_id = client.id;
        let memory = Arc::new(MemoryStore::with_client(client));
        let store: Store = memory.clone();
        let service = service(store.clone());
        let now = Utc::now();

        let due = store
            .insert_schedule(client_id, "user_1", weekly(now - Duration::hours(1)))
            .await
            .unwrap();
        store
            .insert_schedule(client_id, "user_1", weekly(now + Duration::days(2)))
            .await
            .unwrap();

        assert_eq!(run_due_schedules(&service, &store, now).await.unwrap(), 1);

        let searches = store.list_searches(client_id).await.unwrap();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].triggered_by, TriggerSource::Schedule);
        assert_eq!(searches[0].search_types, vec![SearchType::Competitor]);
        assert!(searches[0].verify_emails);
        assert_eq!(searches[0].geo, "Austin");
        assert_eq!(searches[0].status, SearchStatus::Pending);

        let schedules = store.list_schedules(client_id).await.unwrap();
        let advanced = schedules.iter().find(|s| s.id == due.id).unwrap();
        assert_eq!(advanced.next_run_at, now + Duration::days(7));
        assert_eq!(advanced.last_search_id, Some(searches[0].id));

        // Nothing due on the same tick again.
        assert_eq!(run_due_schedules(&service, &store, now).await.unwrap(), 0);
        assert_eq!(memory.search_count(), 1);
    }

    #[tokio::test]
    async fn failing_client_still_advances_schedule() {
        let client = client_fixture(None, None, "  ");
        let client_id = client.id;
        let store: Store = Arc::new(MemoryStore::with_client(client));
        let service = service(store.clone());
        let now = Utc::now();

        let schedule = store
            .insert_schedule(client_id, "user_1", weekly(now))
            .await
            .unwrap();

        assert_eq!(run_due_schedules(&service, &store, now).await.unwrap(), 0);

        let stored = store.list_schedules(client_id).await.unwrap();
        assert_eq!(stored[0].id, schedule.id);
        assert_eq!(stored[0].last_run_at, Some(now));
        assert_eq!(stored[0].last_search_id, None);
        assert!(stored[0].next_run_at > now);
    }

    #[tokio::test]
    async fn inactive_client_deactivates_schedule() {
        let mut client = client_fixture(Some("10001"), None, "");
        client.is_active = false;
        let client_id = client.id;
        let store: Store = Arc::new(MemoryStore::with_client(client));
        let service = service(store.clone());
        let now = Utc::now();

        store
            .insert_schedule(client_id, "user_1", weekly(now))
            .await
            .unwrap();

        assert_eq!(run_due_schedules(&service, &store, now).await.unwrap(), 0);
        assert!(!store.list_schedules(client_id).await.unwrap()[0].is_active);
        assert!(store.list_searches(client_id).await.unwrap().is_empty());
    }
}
