//! In-process `ResearchStore` used by unit and route tests.

use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::{
    client_business::{ClientBusiness, NewClientBusiness},
    intel::{AnalysisType, IntelAnalysis, PartnerBusiness, PartnerCandidate},
    lead::{Lead, LeadFilter, LeadStatus},
    lead_business::LeadBusiness,
    lead_search::{LeadSearch, NewLeadSearch, SearchStatus},
    schedule::{NewSearchSchedule, SearchSchedule},
    swot::{SwotAnalysis, SwotStatus, SwotUpdate},
};

use super::ResearchStore;

#[derive(Default)]
struct State {
    clients: Vec<ClientBusiness>,
    searches: Vec<LeadSearch>,
    leads: Vec<Lead>,
    schedules: Vec<SearchSchedule>,
    swots: Vec<SwotAnalysis>,
    analyses: Vec<IntelAnalysis>,
    partners: Vec<PartnerBusiness>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing_place_ids: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: ClientBusiness) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().clients.push(client);
        store
    }

    /// Makes `upsert_partner` fail for this place id.
    pub fn fail_partner(&self, place_id: &str) {
        self.failing_place_ids
            .lock()
            .unwrap()
            .insert(place_id.to_string());
    }

    pub fn search_count(&self) -> usize {
        self.state.lock().unwrap().searches.len()
    }

    pub fn analyses(&self) -> Vec<IntelAnalysis> {
        self.state.lock().unwrap().analyses.clone()
    }

    pub fn partners(&self) -> Vec<PartnerBusiness> {
        self.state.lock().unwrap().partners.clone()
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.state.lock().unwrap().leads.clone()
    }

    fn transition_search(
        &self,
        id: Uuid,
        next: SearchStatus,
        apply: impl FnOnce(&mut LeadSearch),
    ) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.searches.iter_mut().find(|s| s.id == id) {
            Some(search) if search.status.can_transition_to(next) => {
                search.status = next;
                apply(search);
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ResearchStore for MemoryStore {
    async fn insert_client(
        &self,
        user_id: &str,
        client: NewClientBusiness,
    ) -> Result<ClientBusiness, sqlx::Error> {
        let now = Utc::now();
        let row = ClientBusiness {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: client.name,
            address: client.address,
            google_business_url: client.google_business_url,
            keyword: client.keyword,
            business_type: client.business_type,
            zip_code: client.zip_code,
            city: client.city,
            state: client.state,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().clients.push(row.clone());
        Ok(row)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<ClientBusiness>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn list_clients(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> Result<Vec<ClientBusiness>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .clients
            .iter()
            .filter(|c| c.user_id == user_id && (c.is_active || include_inactive))
            .cloned()
            .collect())
    }

    async fn update_client(&self, client: &ClientBusiness) -> Result<ClientBusiness, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .clients
            .iter_mut()
            .find(|c| c.id == client.id)
            .ok_or(sqlx::Error::RowNotFound)?;
        *stored = client.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn insert_search(&self, search: NewLeadSearch) -> Result<LeadSearch, sqlx::Error> {
        let row = LeadSearch {
            id: Uuid::new_v4(),
            client_business_id: search.client_business_id,
            user_id: search.user_id,
            keyword: search.keyword,
            geo: search.geo,
            search_types: search.search_types,
            verify_emails: search.verify_emails,
            status: SearchStatus::Pending,
            results: None,
            total_found: None,
            error_message: None,
            triggered_by: search.triggered_by,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.state.lock().unwrap().searches.push(row.clone());
        Ok(row)
    }

    async fn get_search(&self, id: Uuid) -> Result<Option<LeadSearch>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state.searches.iter().find(|s| s.id == id).cloned())
    }

    async fn list_searches(
        &self,
        client_business_id: Uuid,
    ) -> Result<Vec<LeadSearch>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .searches
            .iter()
            .rev()
            .filter(|s| s.client_business_id == client_business_id)
            .cloned()
            .collect())
    }

    async fn mark_search_running(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.transition_search(id, SearchStatus::Running, |_| {}))
    }

    async fn complete_search(
        &self,
        id: Uuid,
        results: &[LeadBusiness],
    ) -> Result<bool, sqlx::Error> {
        Ok(self.transition_search(id, SearchStatus::Completed, |s| {
            s.results = Some(Json(results.to_vec()));
            s.total_found = Some(results.len() as i32);
            s.completed_at = Some(Utc::now());
        }))
    }

    async fn fail_search(&self, id: Uuid, message: &str) -> Result<bool, sqlx::Error> {
        Ok(self.transition_search(id, SearchStatus::Error, |s| {
            s.error_message = Some(message.to_string());
            s.completed_at = Some(Utc::now());
        }))
    }

    async fn upsert_lead(&self, lead: &Lead) -> Result<Lead, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let existing = lead.place_id.as_ref().and_then(|place_id| {
            state
                .leads
                .iter()
                .position(|l| {
                    l.client_business_id == lead.client_business_id
                        && l.place_id.as_ref() == Some(place_id)
                })
        });
        match existing {
            Some(index) => {
                let stored = &mut state.leads[index];
                let (id, status, created_at) = (stored.id, stored.status, stored.created_at);
                *stored = lead.clone();
                stored.id = id;
                stored.status = status;
                stored.created_at = created_at;
                stored.updated_at = Utc::now();
                Ok(stored.clone())
            }
            None => {
                state.leads.push(lead.clone());
                Ok(lead.clone())
            }
        }
    }

    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state.leads.iter().find(|l| l.id == id).cloned())
    }

    async fn list_leads(
        &self,
        client_business_id: Uuid,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .leads
            .iter()
            .filter(|l| l.client_business_id == client_business_id && filter.matches(l))
            .cloned()
            .collect())
    }

    async fn set_lead_status(
        &self,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let Some(lead) = state
            .leads
            .iter_mut()
            .find(|l| l.id == id && l.status.can_transition_to(status))
        else {
            return Ok(None);
        };
        lead.status = status;
        lead.updated_at = Utc::now();
        Ok(Some(lead.clone()))
    }

    async fn insert_schedule(
        &self,
        client_business_id: Uuid,
        user_id: &str,
        schedule: NewSearchSchedule,
    ) -> Result<SearchSchedule, sqlx::Error> {
        let now = Utc::now();
        let row = SearchSchedule {
            id: Uuid::new_v4(),
            client_business_id,
            user_id: user_id.to_string(),
            search_types: schedule.search_types,
            verify_emails: schedule.verify_emails,
            interval_days: schedule.interval_days,
            next_run_at: schedule.first_run_at.unwrap_or(now),
            last_run_at: None,
            last_search_id: None,
            is_active: true,
            created_at: now,
        };
        self.state.lock().unwrap().schedules.push(row.clone());
        Ok(row)
    }

    async fn get_schedule(&self, id: Uuid) -> Result<Option<SearchSchedule>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state.schedules.iter().find(|s| s.id == id).cloned())
    }

    async fn list_schedules(
        &self,
        client_business_id: Uuid,
    ) -> Result<Vec<SearchSchedule>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .schedules
            .iter()
            .filter(|s| s.client_business_id == client_business_id)
            .cloned()
            .collect())
    }

    async fn due_schedules(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<SearchSchedule>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .schedules
            .iter()
            .filter(|s| s.is_due(now))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn record_schedule_run(
        &self,
        id: Uuid,
        search_id: Option<Uuid>,
        ran_at: DateTime<Utc>,
        next_run_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if let Some(schedule) = state.schedules.iter_mut().find(|s| s.id == id) {
            schedule.last_run_at = Some(ran_at);
            schedule.last_search_id = search_id.or(schedule.last_search_id);
            schedule.next_run_at = next_run_at;
        }
        Ok(())
    }

    async fn deactivate_schedule(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        match state.schedules.iter_mut().find(|s| s.id == id) {
            Some(schedule) => {
                schedule.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_swot(
        &self,
        client_business_id: Uuid,
        user_id: &str,
    ) -> Result<SwotAnalysis, sqlx::Error> {
        let row = SwotAnalysis {
            id: Uuid::new_v4(),
            client_business_id,
            user_id: user_id.to_string(),
            status: SwotStatus::Pending,
            strengths: Json(vec![]),
            weaknesses: Json(vec![]),
            opportunities: Json(vec![]),
            threats: Json(vec![]),
            summary: None,
            model: None,
            leads_analyzed: 0,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.state.lock().unwrap().swots.push(row.clone());
        Ok(row)
    }

    async fn get_swot(&self, id: Uuid) -> Result<Option<SwotAnalysis>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state.swots.iter().find(|s| s.id == id).cloned())
    }

    async fn latest_swot(
        &self,
        client_business_id: Uuid,
    ) -> Result<Option<SwotAnalysis>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .swots
            .iter()
            .rev()
            .find(|s| s.client_business_id == client_business_id)
            .cloned())
    }

    async fn update_swot(&self, id: Uuid, update: &SwotUpdate) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let Some(swot) = state.swots.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        let target = update.target_status();
        if !swot.status.can_transition_to(target) {
            return Ok(false);
        }
        swot.status = target;
        match update {
            SwotUpdate::Generating => {}
            SwotUpdate::Completed(report) => {
                swot.strengths = Json(report.strengths.clone());
                swot.weaknesses = Json(report.weaknesses.clone());
                swot.opportunities = Json(report.opportunities.clone());
                swot.threats = Json(report.threats.clone());
                swot.summary = report.summary.clone();
                swot.model = report.model.clone();
                swot.leads_analyzed = report.leads_analyzed;
                swot.completed_at = Some(Utc::now());
            }
            SwotUpdate::Error { message } => {
                swot.error_message = Some(message.clone());
                swot.completed_at = Some(Utc::now());
            }
        }
        Ok(true)
    }

    async fn insert_analysis(
        &self,
        client_business_id: Uuid,
        analysis_type: AnalysisType,
        payload: &Value,
        failed_records: i32,
    ) -> Result<IntelAnalysis, sqlx::Error> {
        let row = IntelAnalysis {
            id: Uuid::new_v4(),
            client_business_id,
            analysis_type,
            payload: Json(payload.clone()),
            failed_records,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().analyses.push(row.clone());
        Ok(row)
    }

    async fn latest_analysis(
        &self,
        client_business_id: Uuid,
        analysis_type: AnalysisType,
    ) -> Result<Option<IntelAnalysis>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .analyses
            .iter()
            .rev()
            .find(|a| {
                a.client_business_id == client_business_id && a.analysis_type == analysis_type
            })
            .cloned())
    }

    async fn upsert_partner(
        &self,
        client_business_id: Uuid,
        place_id: &str,
        partner: &PartnerCandidate,
    ) -> Result<PartnerBusiness, sqlx::Error> {
        if self.failing_place_ids.lock().unwrap().contains(place_id) {
            return Err(sqlx::Error::Protocol(format!(
                "simulated write failure for {}",
                place_id
            )));
        }

        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        if let Some(stored) = state
            .partners
            .iter_mut()
            .find(|p| p.client_business_id == client_business_id && p.place_id == place_id)
        {
            stored.partnership_score = partner.partnership_score;
            stored.updated_at = now;
            return Ok(stored.clone());
        }

        let row = PartnerBusiness {
            id: Uuid::new_v4(),
            client_business_id,
            place_id: place_id.to_string(),
            name: partner.name.clone(),
            address: partner.address.clone(),
            phone: partner.phone.clone(),
            website: partner.website.clone(),
            category: partner.category.clone(),
            rating: partner.rating,
            partnership_score: partner.partnership_score,
            referral_trigger: partner.referral_trigger.clone(),
            suggested_approach: partner.suggested_approach.clone(),
            potential_value: partner.potential_value.clone(),
            created_at: now,
            updated_at: now,
        };
        state.partners.push(row.clone());
        Ok(row)
    }

    async fn list_partners(
        &self,
        client_business_id: Uuid,
    ) -> Result<Vec<PartnerBusiness>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        let mut partners: Vec<PartnerBusiness> = state
            .partners
            .iter()
            .filter(|p| p.client_business_id == client_business_id)
            .cloned()
            .collect();
        partners.sort_by(|a, b| {
            b.partnership_score
                .unwrap_or(f64::MIN)
                .total_cmp(&a.partnership_score.unwrap_or(f64::MIN))
        });
        Ok(partners)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::MemoryStore;
    use crate::{
        dal::ResearchStore,
        domain::{
            intel::PartnerCandidate,
            lead::{Lead, LeadFilter, LeadStatus},
            lead_business::LeadBusiness,
        },
    };

    fn business(title: &str) -> LeadBusiness {
        LeadBusiness {
            title: Some(title.into()),
            place_id: Some("p1".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn same_place_found_for_two_clients_keeps_both_leads() {
        let store = MemoryStore::new();
        let (client_1, client_2) = (Uuid::new_v4(), Uuid::new_v4());
        let (search_1, search_2) = (Uuid::new_v4(), Uuid::new_v4());

        let first = store
            .upsert_lead(&Lead::from_business(
                &business("Acme Plumbing"),
                client_1,
                Some(search_1),
                "user_1",
            ))
            .await
            .unwrap();
        store
            .set_lead_status(first.id, LeadStatus::Contacted)
            .await
            .unwrap();
        store
            .upsert_lead(&Lead::from_business(
                &business("Acme Plumbing Co"),
                client_2,
                Some(search_2),
                "user_2",
            ))
            .await
            .unwrap();

        let filter = LeadFilter::default();
        let user_1_leads = store.list_leads(client_1, &filter).await.unwrap();
        assert_eq!(user_1_leads.len(), 1);
        assert_eq!(user_1_leads[0].user_id, "user_1");
        assert_eq!(user_1_leads[0].lead_search_id, Some(search_1));
        assert_eq!(user_1_leads[0].title.as_deref(), Some("Acme Plumbing"));
        assert_eq!(user_1_leads[0].status, LeadStatus::Contacted);

        let user_2_leads = store.list_leads(client_2, &filter).await.unwrap();
        assert_eq!(user_2_leads.len(), 1);
        assert_eq!(user_2_leads[0].user_id, "user_2");
        assert_eq!(user_2_leads[0].status, LeadStatus::New);
    }

    #[tokio::test]
    async fn repeated_place_for_one_client_refreshes_in_place() {
        let store = MemoryStore::new();
        let client = Uuid::new_v4();
        let first = store
            .upsert_lead(&Lead::from_business(&business("Acme"), client, None, "user_1"))
            .await
            .unwrap();
        let later_search = Uuid::new_v4();
        let second = store
            .upsert_lead(&Lead::from_business(
                &business("Acme Plumbing"),
                client,
                Some(later_search),
                "user_1",
            ))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.lead_search_id, Some(later_search));
        assert_eq!(store.leads().len(), 1);
    }

    #[tokio::test]
    async fn partners_are_kept_per_client() {
        let store = MemoryStore::new();
        let (client_1, client_2) = (Uuid::new_v4(), Uuid::new_v4());
        let partner = |score| PartnerCandidate {
            place_id: Some("p1".into()),
            partnership_score: Some(score),
            ..Default::default()
        };

        store.upsert_partner(client_1, "p1", &partner(60.0)).await.unwrap();
        store.upsert_partner(client_2, "p1", &partner(90.0)).await.unwrap();

        let partners_1 = store.list_partners(client_1).await.unwrap();
        assert_eq!(partners_1.len(), 1);
        assert_eq!(partners_1[0].partnership_score, Some(60.0));
        assert_eq!(store.list_partners(client_2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_write_checks_the_current_status() {
        let store = MemoryStore::new();
        let lead = store
            .upsert_lead(&Lead::from_business(&business("Acme"), Uuid::new_v4(), None, "user_1"))
            .await
            .unwrap();

        let skipped = store
            .set_lead_status(lead.id, LeadStatus::Qualified)
            .await
            .unwrap();
        assert!(skipped.is_none());
        assert_eq!(store.leads()[0].status, LeadStatus::New);

        let moved = store
            .set_lead_status(lead.id, LeadStatus::Contacted)
            .await
            .unwrap();
        assert_eq!(moved.unwrap().status, LeadStatus::Contacted);
        assert!(store
            .set_lead_status(Uuid::new_v4(), LeadStatus::Lost)
            .await
            .unwrap()
            .is_none());
    }
}
