use actix_web::{get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::{
    dal::ResearchStore,
    domain::swot::SwotUpdate,
    error::{ResearchError, Result},
};

use super::{owned_client, UserId};

#[post("/clients/{id}/swot")]
async fn create_swot(
    user: UserId,
    path: web::Path<Uuid>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    let swot = store.insert_swot(client.id, &user.0).await?;
    Ok(HttpResponse::Created().json(swot))
}

#[get("/clients/{id}/swot")]
async fn get_latest_swot(
    user: UserId,
    path: web::Path<Uuid>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    let swot = store
        .latest_swot(client.id)
        .await?
        .ok_or_else(|| ResearchError::NotFound(format!("swot analysis for {}", client.id)))?;
    Ok(HttpResponse::Ok().json(swot))
}

#[put("/swot/{id}")]
async fn update_swot(
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<SwotUpdate>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let not_found = || ResearchError::NotFound(format!("swot analysis {}", id));

    let current = store
        .get_swot(id)
        .await?
        .filter(|s| s.user_id == user.0)
        .ok_or_else(not_found)?;

    if !store.update_swot(id, &body).await? {
        return Err(ResearchError::InvalidState(format!(
            "swot analysis {} cannot move from {:?} to {:?}",
            id,
            current.status,
            body.target_status()
        )));
    }

    let swot = store.get_swot(id).await?.ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(swot))
}
