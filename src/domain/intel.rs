use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "intel_analysis_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Reviews,
    Competitors,
    Partnerships,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 3] = [
        AnalysisType::Reviews,
        AnalysisType::Competitors,
        AnalysisType::Partnerships,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelRequest {
    pub client_business_id: Uuid,
    pub business_name: String,
    pub address: Option<String>,
    pub keyword: Option<String>,
    pub website: Option<String>,
    pub google_business_url: Option<String>,
    pub actions: Vec<AnalysisType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelAcknowledgement {
    pub status: &'static str,
    pub job_id: String,
    pub message: String,
}

/// A partner suggested by the automation, keyed by its external place id.
/// Built from one raw `topPartners` entry by the result mapper.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartnerCandidate {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub partnership_score: Option<f64>,
    pub referral_trigger: Option<String>,
    pub suggested_approach: Option<String>,
    pub potential_value: Option<String>,
}

/// Partner entries stay raw until ingestion so that one malformed entry is
/// skipped on its own instead of rejecting the whole callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnershipAnalysis {
    #[serde(default, alias = "top_partners")]
    pub top_partners: Vec<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Payload the automation posts back once analysis has finished.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelCallback {
    pub client_business_id: Uuid,
    #[serde(default)]
    pub actions_completed: Vec<String>,
    pub timestamp: Option<String>,
    pub reviews_analysis: Option<Value>,
    pub competitor_analysis: Option<Value>,
    pub partnership_analysis: Option<PartnershipAnalysis>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IntelAnalysis {
    pub id: Uuid,
    pub client_business_id: Uuid,
    pub analysis_type: AnalysisType,
    pub payload: Json<Value>,
    pub failed_records: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PartnerBusiness {
    pub id: Uuid,
    pub client_business_id: Uuid,
    pub place_id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub partnership_score: Option<f64>,
    pub referral_trigger: Option<String>,
    pub suggested_approach: Option<String>,
    pub potential_value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnershipResults {
    pub analysis: Option<IntelAnalysis>,
    pub partners: Vec<PartnerBusiness>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelResults {
    pub client_business_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<IntelAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitors: Option<IntelAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partnerships: Option<PartnershipResults>,
}

/// Outcome of ingesting one callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub analyses_stored: usize,
    pub partners_upserted: usize,
    pub partners_failed: usize,
}
