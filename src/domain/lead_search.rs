use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::lead_business::LeadBusiness;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "search_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchStatus::Completed | SearchStatus::Error)
    }

    /// pending -> running -> {completed | error}. A pending search may also fail
    /// directly when it could not be dispatched.
    pub fn can_transition_to(self, next: SearchStatus) -> bool {
        matches!(
            (self, next),
            (SearchStatus::Pending, SearchStatus::Running)
                | (SearchStatus::Pending, SearchStatus::Error)
                | (SearchStatus::Running, SearchStatus::Completed)
                | (SearchStatus::Running, SearchStatus::Error)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchStatus::Pending => "pending",
            SearchStatus::Running => "running",
            SearchStatus::Completed => "completed",
            SearchStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "search_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    IdealCustomer,
    Competitor,
    Partner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "trigger_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    Manual,
    Schedule,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeadSearch {
    pub id: Uuid,
    pub client_business_id: Uuid,
    pub user_id: String,
    pub keyword: String,
    pub geo: String,
    pub search_types: Vec<SearchType>,
    pub verify_emails: bool,
    pub status: SearchStatus,
    pub results: Option<Json<Vec<LeadBusiness>>>,
    pub total_found: Option<i32>,
    pub error_message: Option<String>,
    pub triggered_by: TriggerSource,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewLeadSearch {
    pub client_business_id: Uuid,
    pub user_id: String,
    pub keyword: String,
    pub geo: String,
    pub search_types: Vec<SearchType>,
    pub verify_emails: bool,
    pub triggered_by: TriggerSource,
}

/// What `execute_lead_search` hands back to the caller before any webhook outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHandle {
    pub search_id: Uuid,
    pub status: SearchStatus,
}

/// Published on every status write.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEvent {
    pub search_id: Uuid,
    pub status: SearchStatus,
}

#[cfg(test)]
mod tests {
    use super::SearchStatus::{self, *};

    const ALL: [SearchStatus; 4] = [Pending, Running, Completed, Error];

    #[test]
    fn terminal_states_never_move() {
        for terminal in [Completed, Error] {
            for next in ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn nothing_goes_back_to_pending() {
        for from in ALL {
            assert!(!from.can_transition_to(Pending));
        }
        assert!(!Running.can_transition_to(Running));
    }

    #[test]
    fn forward_transitions() {
        assert!(Pending.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Error));
        assert!(!Pending.can_transition_to(Completed));
    }
}
