use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::lead_business::{EmailStatus, LeadBusiness, LeadBusinessType, PartnershipScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    /// Statuses from which a move to `self` is legal.
    pub fn allowed_from(self) -> Vec<LeadStatus> {
        LeadStatus::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(self))
            .collect()
    }

    pub fn can_transition_to(self, next: LeadStatus) -> bool {
        use LeadStatus::*;
        matches!(
            (self, next),
            (New, Contacted)
                | (Contacted, Qualified)
                | (Qualified, Converted)
                | (New, Lost)
                | (Contacted, Lost)
                | (Qualified, Lost)
        )
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub client_business_id: Uuid,
    pub lead_search_id: Option<Uuid>,
    pub user_id: String,
    pub place_id: Option<String>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub email_status: Option<EmailStatus>,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub business_type: Option<LeadBusinessType>,
    pub industry: Option<String>,
    pub category: Option<String>,
    pub partnership: Option<Json<PartnershipScore>>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn from_business(
        business: &LeadBusiness,
        client_business_id: Uuid,
        lead_search_id: Option<Uuid>,
        user_id: &str,
    ) -> Self {
        let now = Utc::now();
        Lead {
            id: Uuid::new_v4(),
            client_business_id,
            lead_search_id,
            user_id: user_id.to_string(),
            place_id: business.place_id.clone(),
            title: business.title.clone(),
            address: business.address.clone(),
            city: business.city.clone(),
            state: business.state.clone(),
            zip: business.zip.clone(),
            phone: business.phone.clone(),
            website: business.website.clone(),
            email: business.email.clone(),
            email_status: business.email_status,
            rating: business.rating,
            review_count: business.review_count,
            business_type: business.business_type,
            industry: business.industry.clone(),
            category: business.category.clone(),
            partnership: business.partnership.clone().map(Json),
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFilter {
    pub lead_search_id: Option<Uuid>,
    pub business_type: Option<LeadBusinessType>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        self.lead_search_id
            .map_or(true, |id| lead.lead_search_id == Some(id))
            && self
                .business_type
                .map_or(true, |t| lead.business_type == Some(t))
    }
}
