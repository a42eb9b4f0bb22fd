use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swot_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SwotStatus {
    Pending,
    Generating,
    Completed,
    Error,
}

impl SwotStatus {
    fn rank(self) -> u8 {
        match self {
            SwotStatus::Pending => 0,
            SwotStatus::Generating => 1,
            SwotStatus::Completed | SwotStatus::Error => 2,
        }
    }

    /// Strictly forward; terminal states are final.
    pub fn can_transition_to(self, next: SwotStatus) -> bool {
        self.rank() < 2 && next.rank() > self.rank()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwotItem {
    pub text: String,
    pub source: Option<String>,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SwotAnalysis {
    pub id: Uuid,
    pub client_business_id: Uuid,
    pub user_id: String,
    pub status: SwotStatus,
    pub strengths: Json<Vec<SwotItem>>,
    pub weaknesses: Json<Vec<SwotItem>>,
    pub opportunities: Json<Vec<SwotItem>>,
    pub threats: Json<Vec<SwotItem>>,
    pub summary: Option<String>,
    pub model: Option<String>,
    pub leads_analyzed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwotReport {
    #[serde(default)]
    pub strengths: Vec<SwotItem>,
    #[serde(default)]
    pub weaknesses: Vec<SwotItem>,
    #[serde(default)]
    pub opportunities: Vec<SwotItem>,
    #[serde(default)]
    pub threats: Vec<SwotItem>,
    pub summary: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub leads_analyzed: i32,
}

/// Body of `PUT /api/swot/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SwotUpdate {
    Generating,
    Completed(SwotReport),
    Error { message: String },
}

impl SwotUpdate {
    pub fn target_status(&self) -> SwotStatus {
        match self {
            SwotUpdate::Generating => SwotStatus::Generating,
            SwotUpdate::Completed(_) => SwotStatus::Completed,
            SwotUpdate::Error { .. } => SwotStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SwotStatus::*, SwotUpdate};

    #[test]
    fn swot_status_moves_forward_only() {
        assert!(Pending.can_transition_to(Generating));
        assert!(Pending.can_transition_to(Error));
        assert!(Generating.can_transition_to(Completed));
        assert!(!Generating.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Error));
        assert!(!Error.can_transition_to(Completed));
    }

    #[test]
    fn completed_update_parses_report() {
        let update: SwotUpdate = serde_json::from_value(serde_json::json!({
            "status": "completed",
            "strengths": [{"text": "Fast response", "source": "reviews", "confidence": "high"}],
            "summary": "Solid local position",
            "model": "gpt-4o-mini",
            "leadsAnalyzed": 12
        }))
        .unwrap();

        match update {
            SwotUpdate::Completed(report) => {
                assert_eq!(report.strengths.len(), 1);
                assert!(report.threats.is_empty());
                assert_eq!(report.leads_analyzed, 12);
            }
            other => panic!("unexpected update {:?}", other),
        }
    }
}
