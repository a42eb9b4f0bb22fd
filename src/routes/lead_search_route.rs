use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dal::ResearchStore,
    domain::lead_search::{SearchType, TriggerSource},
    error::{ResearchError, Result},
    services::LeadSearchService,
};

use super::{owned_client, UserId};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ExecuteLeadSearchBody {
    #[serde(default)]
    search_types: Vec<SearchType>,
    #[serde(default)]
    verify_emails: bool,
}

/// Returns as soon as the search row exists; poll `GET /lead-searches/{id}` for the outcome.
#[post("/clients/{id}/lead-searches")]
async fn execute_lead_search(
    user: UserId,
    path: web::Path<Uuid>,
    body: Option<web::Json<ExecuteLeadSearchBody>>,
    service: web::Data<LeadSearchService>,
) -> Result<HttpResponse> {
    let body = body.map(|b| b.into_inner()).unwrap_or_default();

    let handle = service
        .execute_lead_search(
            path.into_inner(),
            &user.0,
            body.search_types,
            body.verify_emails,
            TriggerSource::Manual,
        )
        .await?;

    Ok(HttpResponse::Accepted().json(handle))
}

#[get("/clients/{id}/lead-searches")]
async fn list_lead_searches(
    user: UserId,
    path: web::Path<Uuid>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    let searches = store.list_searches(client.id).await?;
    Ok(HttpResponse::Ok().json(searches))
}

#[get("/lead-searches/{id}")]
async fn get_lead_search(
    user: UserId,
    path: web::Path<Uuid>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let search = store
        .get_search(id)
        .await?
        .filter(|s| s.user_id == user.0)
        .ok_or_else(|| ResearchError::NotFound(format!("lead search {}", id)))?;
    Ok(HttpResponse::Ok().json(search))
}

/// Called by the automation, so no user header.
#[post("/lead-searches/{id}/callback")]
async fn lead_search_callback(
    path: web::Path<Uuid>,
    body: web::Json<Value>,
    service: web::Data<LeadSearchService>,
) -> Result<HttpResponse> {
    let search = service
        .ingest_search_callback(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(search))
}
