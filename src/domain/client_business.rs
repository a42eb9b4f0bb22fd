use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "client_business_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientBusinessType {
    IdealCustomer,
    Competitor,
    PartneringProspect,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClientBusiness {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub address: String,
    pub google_business_url: Option<String>,
    pub keyword: String,
    pub business_type: ClientBusinessType,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientBusiness {
    /// Geography sent to lead discovery: zip code, else city, else street address.
    pub fn resolve_geo(&self) -> Option<String> {
        [
            self.zip_code.as_deref(),
            self.city.as_deref(),
            Some(self.address.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(|v| v.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClientBusiness {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub google_business_url: Option<String>,
    pub keyword: String,
    pub business_type: ClientBusinessType,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Partial update, absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBusinessUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub google_business_url: Option<String>,
    pub keyword: Option<String>,
    pub business_type: Option<ClientBusinessType>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_active: Option<bool>,
}

impl ClientBusinessUpdate {
    pub fn apply(self, client: &mut ClientBusiness) {
        if let Some(name) = self.name {
            client.name = name;
        }
        if let Some(address) = self.address {
            client.address = address;
        }
        if self.google_business_url.is_some() {
            client.google_business_url = self.google_business_url;
        }
        if let Some(keyword) = self.keyword {
            client.keyword = keyword;
        }
        if let Some(business_type) = self.business_type {
            client.business_type = business_type;
        }
        if self.zip_code.is_some() {
            client.zip_code = self.zip_code;
        }
        if self.city.is_some() {
            client.city = self.city;
        }
        if self.state.is_some() {
            client.state = self.state;
        }
        if let Some(is_active) = self.is_active {
            client.is_active = is_active;
        }
    }
}

#[cfg(test)]
pub(crate) fn client_fixture(
    zip_code: Option<&str>,
    city: Option<&str>,
    address: &str,
) -> ClientBusiness {
    ClientBusiness {
        id: Uuid::new_v4(),
        user_id: "user_1".to_string(),
        name: "Rapid Rooter".to_string(),
        address: address.to_string(),
        google_business_url: None,
        keyword: "plumber".to_string(),
        business_type: ClientBusinessType::IdealCustomer,
        zip_code: zip_code.map(|z| z.to_string()),
        city: city.map(|c| c.to_string()),
        state: Some("NY".to_string()),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
