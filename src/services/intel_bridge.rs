use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dal::Store,
    domain::intel::{
        AnalysisType, IngestSummary, IntelAcknowledgement, IntelCallback, IntelRequest,
        IntelResults, PartnershipResults,
    },
    error::{ResearchError, Result},
};

use super::{map_partner, WebhookClient};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntelPayload<'a> {
    #[serde(flatten)]
    request: &'a IntelRequest,
    callback_url: &'a str,
}

/// Outbound request and inbound callback for business intelligence analysis.
pub struct IntelBridge {
    store: Store,
    client: Arc<dyn WebhookClient>,
    intel_url: String,
    callback_url: String,
}

impl IntelBridge {
    pub fn new(
        store: Store,
        client: Arc<dyn WebhookClient>,
        intel_url: String,
        base_url: &str,
    ) -> Self {
        IntelBridge {
            store,
            client,
            intel_url,
            callback_url: format!("{}/api/intel/callback", base_url.trim_end_matches('/')),
        }
    }

    pub async fn request_business_intelligence(
        &self,
        request: &IntelRequest,
    ) -> Result<IntelAcknowledgement> {
        let payload = serde_json::to_value(IntelPayload {
            request,
            callback_url: &self.callback_url,
        })
        .map_err(|e| ResearchError::InvalidInput(e.to_string()))?;

        log::info!(
            "Requesting business intelligence {:?} for client {}",
            request.actions,
            request.client_business_id
        );
        let reply = self.client.post_json(&self.intel_url, &payload).await?;

        let job_id = reply
            .get("jobId")
            .or_else(|| reply.get("job_id"))
            .and_then(|id| match id {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| format!("intel_{}", Utc::now().timestamp_millis()));

        Ok(IntelAcknowledgement {
            status: "processing",
            job_id,
            message: format!(
                "Analysis started for {}. Results will arrive via callback.",
                request.business_name
            ),
        })
    }

    /// Appends one analysis row per type present. Partners are upserted one by
    /// one; a failed partner is logged, counted and skipped.
    pub async fn store_intel_results(&self, callback: IntelCallback) -> Result<IngestSummary> {
        let client_id = callback.client_business_id;
        self.store
            .get_client(client_id)
            .await?
            .ok_or_else(|| ResearchError::NotFound(format!("client business {}", client_id)))?;

        log::info!(
            "Storing intel results for client {} (actions completed: {:?})",
            client_id,
            callback.actions_completed
        );
        let mut summary = IngestSummary::default();

        if let Some(reviews) = &callback.reviews_analysis {
            self.store
                .insert_analysis(client_id, AnalysisType::Reviews, reviews, 0)
                .await?;
            summary.analyses_stored += 1;
        }

        if let Some(competitors) = &callback.competitor_analysis {
            self.store
                .insert_analysis(client_id, AnalysisType::Competitors, competitors, 0)
                .await?;
            summary.analyses_stored += 1;
        }

        if let Some(partnerships) = &callback.partnership_analysis {
            for entry in partnerships.top_partners.iter() {
                match self.upsert_partner_entry(client_id, entry).await {
                    Ok(()) => summary.partners_upserted += 1,
                    Err(e) => {
                        log::error!("Skipping partner for client {}: {}", client_id, e);
                        summary.partners_failed += 1;
                    }
                }
            }

            let payload = serde_json::to_value(partnerships)
                .map_err(|e| ResearchError::InvalidInput(e.to_string()))?;
            self.store
                .insert_analysis(
                    client_id,
                    AnalysisType::Partnerships,
                    &payload,
                    summary.partners_failed as i32,
                )
                .await?;
            summary.analyses_stored += 1;
        }

        if summary.partners_failed > 0 {
            log::warn!(
                "Intel ingestion for client {} skipped {} of {} partners",
                client_id,
                summary.partners_failed,
                summary.partners_failed + summary.partners_upserted
            );
        }

        Ok(summary)
    }

    async fn upsert_partner_entry(&self, client_id: Uuid, entry: &Value) -> Result<()> {
        let partner = map_partner(entry).ok_or_else(|| {
            ResearchError::PartialIngestFailure(format!(
                "partner entry is not an object: {}",
                entry
            ))
        })?;
        let place_id = partner.place_id.as_deref().ok_or_else(|| {
            ResearchError::PartialIngestFailure(format!(
                "partner {:?} has no place id",
                partner.name
            ))
        })?;

        self.store
            .upsert_partner(client_id, place_id, &partner)
            .await
            .map_err(|e| ResearchError::PartialIngestFailure(format!("{}: {}", place_id, e)))?;
        Ok(())
    }

    /// Latest analysis per requested type; every type when `only` is `None`.
    pub async fn get_intel_results(
        &self,
        client_business_id: Uuid,
        only: Option<AnalysisType>,
    ) -> Result<IntelResults> {
        let types = match only {
            Some(analysis_type) => vec![analysis_type],
            None => AnalysisType::ALL.to_vec(),
        };

        let mut results = IntelResults {
            client_business_id,
            ..Default::default()
        };

        for analysis_type in types {
            let latest = self
                .store
                .latest_analysis(client_business_id, analysis_type)
                .await?;
            match analysis_type {
                AnalysisType::Reviews => results.reviews = latest,
                AnalysisType::Competitors => results.competitors = latest,
                AnalysisType::Partnerships => {
                    results.partnerships = Some(PartnershipResults {
                        analysis: latest,
                        partners: self.store.list_partners(client_business_id).await?,
                    })
                }
            }
        }

        Ok(results)
    }
}
