use serde::{Deserialize, Serialize};

/// Classification of a discovered business, distinct from `ClientBusinessType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_business_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadBusinessType {
    IdealCustomer,
    Competitor,
    Partner,
    Lead,
}

impl LeadBusinessType {
    /// Lower-cases the free text, drops separators and matches synonyms.
    /// Blank input stays unclassified, anything unrecognised becomes `Lead`.
    pub fn coerce(raw: Option<&str>) -> Option<Self> {
        let normalized: String = raw?
            .chars()
            .filter(|c| !(c.is_whitespace() || matches!(c, '_' | '-' | '.' | '/')))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "" => None,
            "idealcustomer" | "lead" | "user" => Some(Self::IdealCustomer),
            "competitor" => Some(Self::Competitor),
            "partner" | "partneringprospect" => Some(Self::Partner),
            _ => Some(Self::Lead),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "email_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Unknown,
    Unverified,
    Valid,
    Invalid,
    CatchAll,
    Disposable,
}

impl EmailStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "unverified" => Self::Unverified,
            "valid" | "verified" => Self::Valid,
            "invalid" => Self::Invalid,
            "catch_all" | "catchall" => Self::CatchAll,
            "disposable" => Self::Disposable,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialValue {
    High,
    Medium,
    Low,
}

impl PotentialValue {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnershipScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub factors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_approach: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_value: Option<PotentialValue>,
}

impl PartnershipScore {
    pub fn is_empty(&self) -> bool {
        self.score.is_none()
            && self.factors.is_empty()
            && self.referral_trigger.is_none()
            && self.suggested_approach.is_none()
            && self.potential_value.is_none()
    }
}

/// One discovered business as returned by a lead search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadBusiness {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_status: Option<EmailStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<LeadBusinessType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partnership: Option<PartnershipScore>,
}
