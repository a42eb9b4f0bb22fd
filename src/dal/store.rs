use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    client_business::{ClientBusiness, NewClientBusiness},
    intel::{AnalysisType, IntelAnalysis, PartnerBusiness, PartnerCandidate},
    lead::{Lead, LeadFilter, LeadStatus},
    lead_business::LeadBusiness,
    lead_search::{LeadSearch, NewLeadSearch},
    schedule::{NewSearchSchedule, SearchSchedule},
    swot::{SwotAnalysis, SwotUpdate},
};

use super::{client_business_db, intel_db, lead_db, lead_search_db, schedule_db, swot_db};

pub type Store = Arc<dyn ResearchStore>;

/// Persistence used by the services. Status transitions return `false` when the
/// stored row was not in a state that allows the move.
#[async_trait]
pub trait ResearchStore: Send + Sync + 'static {
    async fn insert_client(
        &self,
        user_id: &str,
        client: NewClientBusiness,
    ) -> Result<ClientBusiness, sqlx::Error>;
    async fn get_client(&self, id: Uuid) -> Result<Option<ClientBusiness>, sqlx::Error>;
    async fn list_clients(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> Result<Vec<ClientBusiness>, sqlx::Error>;
    async fn update_client(&self, client: &ClientBusiness) -> Result<ClientBusiness, sqlx::Error>;

    async fn insert_search(&self, search: NewLeadSearch) -> Result<LeadSearch, sqlx::Error>;
    async fn get_search(&self, id: Uuid) -> Result<Option<LeadSearch>, sqlx::Error>;
    async fn list_searches(&self, client_business_id: Uuid)
        -> Result<Vec<LeadSearch>, sqlx::Error>;
    async fn mark_search_running(&self, id: Uuid) -> Result<bool, sqlx::Error>;
    async fn complete_search(&self, id: Uuid, results: &[LeadBusiness])
        -> Result<bool, sqlx::Error>;
    async fn fail_search(&self, id: Uuid, message: &str) -> Result<bool, sqlx::Error>;

    async fn upsert_lead(&self, lead: &Lead) -> Result<Lead, sqlx::Error>;
    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, sqlx::Error>;
    async fn list_leads(
        &self,
        client_business_id: Uuid,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, sqlx::Error>;
    /// `None` unless the lead's current status allows moving to `status`.
    async fn set_lead_status(
        &self,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<Option<Lead>, sqlx::Error>;

    async fn insert_schedule(
        &self,
        client_business_id: Uuid,
        user_id: &str,
        schedule: NewSearchSchedule,
    ) -> Result<SearchSchedule, sqlx::Error>;
    async fn get_schedule(&self, id: Uuid) -> Result<Option<SearchSchedule>, sqlx::Error>;
    async fn list_schedules(
        &self,
        client_business_id: Uuid,
    ) -> Result<Vec<SearchSchedule>, sqlx::Error>;
    async fn due_schedules(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<SearchSchedule>, sqlx::Error>;
    async fn record_schedule_run(
        &self,
        id: Uuid,
        search_id: Option<Uuid>,
        ran_at: DateTime<Utc>,
        next_run_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;
    async fn deactivate_schedule(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    async fn insert_swot(
        &self,
        client_business_id: Uuid,
        user_id: &str,
    ) -> Result<SwotAnalysis, sqlx::Error>;
    async fn get_swot(&self, id: Uuid) -> Result<Option<SwotAnalysis>, sqlx::Error>;
    async fn latest_swot(
        &self,
        client_business_id: Uuid,
    ) -> Result<Option<SwotAnalysis>, sqlx::Error>;
    async fn update_swot(&self, id: Uuid, update: &SwotUpdate) -> Result<bool, sqlx::Error>;

    async fn insert_analysis(
        &self,
        client_business_id: Uuid,
        analysis_type: AnalysisType,
        payload: &Value,
        failed_records: i32,
    ) -> Result<IntelAnalysis, sqlx::Error>;
    async fn latest_analysis(
        &self,
        client_business_id: Uuid,
        analysis_type: AnalysisType,
    ) -> Result<Option<IntelAnalysis>, sqlx::Error>;
    async fn upsert_partner(
        &self,
        client_business_id: Uuid,
        place_id: &str,
        partner: &PartnerCandidate,
    ) -> Result<PartnerBusiness, sqlx::Error>;
    async fn list_partners(
        &self,
        client_business_id: Uuid,
    ) -> Result<Vec<PartnerBusiness>, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl ResearchStore for PgStore {
    async fn insert_client(
        &self,
        user_id: &str,
        client: NewClientBusiness,
    ) -> Result<ClientBusiness, sqlx::Error> {
        client_business_db::insert_client_business(&self.pool, user_id, client).await
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<ClientBusiness>, sqlx::Error> {
        client_business_db::get_client_business(&self.pool, id).await
    }

    async fn list_clients(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> Result<Vec<ClientBusiness>, sqlx::Error> {
        client_business_db::list_client_businesses(&self.pool, user_id, include_inactive).await
    }

    async fn update_client(&self, client: &ClientBusiness) -> Result<ClientBusiness, sqlx::Error> {
        client_business_db::update_client_business(&self.pool, client).await
    }

    async fn insert_search(&self, search: NewLeadSearch) -> Result<LeadSearch, sqlx::Error> {
        lead_search_db::insert_lead_search(&self.pool, search).await
    }

    async fn get_search(&self, id: Uuid) -> Result<Option<LeadSearch>, sqlx::Error> {
        lead_search_db::get_lead_search(&self.pool, id).await
    }

    async fn list_searches(
        &self,
        client_business_id: Uuid,
    ) -> Result<Vec<LeadSearch>, sqlx::Error> {
        lead_search_db::list_lead_searches(&self.pool, client_business_id).await
    }

    async fn mark_search_running(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        lead_search_db::mark_running(&self.pool, id).await
    }

    async fn complete_search(
        &self,
        id: Uuid,
        results: &[LeadBusiness],
    ) -> Result<bool, sqlx::Error> {
        lead_search_db::mark_completed(&self.pool, id, results).await
    }

    async fn fail_search(&self, id: Uuid, message: &str) -> Result<bool, sqlx::Error> {
        lead_search_db::mark_error(&self.pool, id, message).await
    }

    async fn upsert_lead(&self, lead: &Lead) -> Result<Lead, sqlx::Error> {
        lead_db::upsert_lead(&self.pool, lead).await
    }

    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, sqlx::Error> {
        lead_db::get_lead(&self.pool, id).await
    }

    async fn list_leads(
        &self,
        client_business_id: Uuid,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, sqlx::Error> {
        lead_db::list_leads(&self.pool, client_business_id, filter).await
    }

    async fn set_lead_status(
        &self,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<Option<Lead>, sqlx::Error> {
        lead_db::update_lead_status(&self.pool, id, status).await
    }

    async fn insert_schedule(
        &self,
        client_business_id: Uuid,
        user_id: &str,
        schedule: NewSearchSchedule,
    ) -> Result<SearchSchedule, sqlx::Error> {
        schedule_db::insert_schedule(&self.pool, client_business_id, user_id, schedule).await
    }

    async fn get_schedule(&self, id: Uuid) -> Result<Option<SearchSchedule>, sqlx::Error> {
        schedule_db::get_schedule(&self.pool, id).await
    }

    async fn list_schedules(
        &self,
        client_business_id: Uuid,
    ) -> Result<Vec<SearchSchedule>, sqlx::Error> {
        schedule_db::list_schedules(&self.pool, client_business_id).await
    }

    async fn due_schedules(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<SearchSchedule>, sqlx::Error> {
        schedule_db::get_due_schedules(&self.pool, now, limit).await
    }

    async fn record_schedule_run(
        &self,
        id: Uuid,
        search_id: Option<Uuid>,
        ran_at: DateTime<Utc>,
        next_run_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        schedule_db::record_schedule_run(&self.pool, id, search_id, ran_at, next_run_at).await
    }

    async fn deactivate_schedule(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        schedule_db::deactivate_schedule(&self.pool, id).await
    }

    async fn insert_swot(
        &self,
        client_business_id: Uuid,
        user_id: &str,
    ) -> Result<SwotAnalysis, sqlx::Error> {
        swot_db::insert_swot_analysis(&self.pool, client_business_id, user_id).await
    }

    async fn get_swot(&self, id: Uuid) -> Result<Option<SwotAnalysis>, sqlx::Error> {
        swot_db::get_swot_analysis(&self.pool, id).await
    }

    async fn latest_swot(
        &self,
        client_business_id: Uuid,
    ) -> Result<Option<SwotAnalysis>, sqlx::Error> {
        swot_db::get_latest_swot_analysis(&self.pool, client_business_id).await
    }

    async fn update_swot(&self, id: Uuid, update: &SwotUpdate) -> Result<bool, sqlx::Error> {
        swot_db::update_swot_analysis(&self.pool, id, update).await
    }

    async fn insert_analysis(
        &self,
        client_business_id: Uuid,
        analysis_type: AnalysisType,
        payload: &Value,
        failed_records: i32,
    ) -> Result<IntelAnalysis, sqlx::Error> {
        intel_db::insert_analysis(
            &self.pool,
            client_business_id,
            analysis_type,
            payload,
            failed_records,
        )
        .await
    }

    async fn latest_analysis(
        &self,
        client_business_id: Uuid,
        analysis_type: AnalysisType,
    ) -> Result<Option<IntelAnalysis>, sqlx::Error> {
        intel_db::get_latest_analysis(&self.pool, client_business_id, analysis_type).await
    }

    async fn upsert_partner(
        &self,
        client_business_id: Uuid,
        place_id: &str,
        partner: &PartnerCandidate,
    ) -> Result<PartnerBusiness, sqlx::Error> {
        intel_db::upsert_partner(&self.pool, client_business_id, place_id, partner).await
    }

    async fn list_partners(
        &self,
        client_business_id: Uuid,
    ) -> Result<Vec<PartnerBusiness>, sqlx::Error> {
        intel_db::list_partners(&self.pool, client_business_id).await
    }
}
