use actix_web::{get, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dal::ResearchStore,
    domain::lead::{LeadFilter, LeadStatus},
    error::{ResearchError, Result},
};

use super::{owned_client, UserId};

#[derive(Deserialize)]
struct UpdateLeadStatusBody {
    status: LeadStatus,
}

#[get("/clients/{id}/leads")]
async fn list_leads(
    user: UserId,
    path: web::Path<Uuid>,
    filter: web::Query<LeadFilter>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    let leads = store.list_leads(client.id, &filter).await?;
    Ok(HttpResponse::Ok().json(leads))
}

#[put("/leads/{id}/status")]
async fn update_lead_status(
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<UpdateLeadStatusBody>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let lead = store
        .get_lead(id)
        .await?
        .filter(|l| l.user_id == user.0)
        .ok_or_else(|| ResearchError::NotFound(format!("lead {}", id)))?;

    let updated = store
        .set_lead_status(id, body.status)
        .await?
        .ok_or_else(|| {
            ResearchError::InvalidState(format!(
                "lead {} cannot move from {:?} to {:?}",
                id, lead.status, body.status
            ))
        })?;
    Ok(HttpResponse::Ok().json(updated))
}
