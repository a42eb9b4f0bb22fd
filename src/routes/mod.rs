pub mod client_route;
pub mod health_route;
pub mod intel_route;
pub mod lead_route;
pub mod lead_search_route;
pub mod schedule_route;
pub mod storage_route;
pub mod swot_route;

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::{
    dal::ResearchStore,
    domain::client_business::ClientBusiness,
    error::{ResearchError, Result},
};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Acting user, set by the authenticating proxy in front of this service.
#[derive(Debug, Clone, PartialEq)]
pub struct UserId(pub String);

impl FromRequest for UserId {
    type Error = ResearchError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        ready(match user {
            Some(user) => Ok(UserId(user.to_string())),
            None => Err(ResearchError::Unauthorized(format!(
                "missing {} header",
                USER_ID_HEADER
            ))),
        })
    }
}

/// Someone else's client is reported as missing.
pub async fn owned_client(
    store: &dyn ResearchStore,
    id: Uuid,
    user: &UserId,
) -> Result<ClientBusiness> {
    store
        .get_client(id)
        .await?
        .filter(|c| c.user_id == user.0)
        .ok_or_else(|| ResearchError::NotFound(format!("client business {}", id)))
}
