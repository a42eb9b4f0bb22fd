use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lead_search::SearchType;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SearchSchedule {
    pub id: Uuid,
    pub client_business_id: Uuid,
    pub user_id: String,
    pub search_types: Vec<SearchType>,
    pub verify_emails: bool,
    pub interval_days: i32,
    pub next_run_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_search_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl SearchSchedule {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.next_run_at <= now
    }

    /// Next run measured from `now`, so a runner that was down doesn't fire a backlog.
    pub fn following_run(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(i64::from(self.interval_days.max(1)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSearchSchedule {
    pub search_types: Vec<SearchType>,
    #[serde(default)]
    pub verify_emails: bool,
    pub interval_days: i32,
    pub first_run_at: Option<DateTime<Utc>>,
}
