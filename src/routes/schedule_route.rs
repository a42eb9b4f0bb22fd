use actix_web::{delete, get, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    dal::ResearchStore,
    domain::schedule::NewSearchSchedule,
    error::{ResearchError, Result},
};

use super::{owned_client, UserId};

const MAX_INTERVAL_DAYS: i32 = 365;

#[post("/clients/{id}/schedules")]
async fn create_schedule(
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<NewSearchSchedule>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    let body = body.into_inner();

    if !(1..=MAX_INTERVAL_DAYS).contains(&body.interval_days) {
        return Err(ResearchError::InvalidInput(format!(
            "intervalDays must be between 1 and {}",
            MAX_INTERVAL_DAYS
        )));
    }
    if client.resolve_geo().is_none() {
        return Err(ResearchError::InvalidState(format!(
            "client business {} has no zip code, city or address",
            client.id
        )));
    }

    let schedule = store.insert_schedule(client.id, &user.0, body).await?;
    log::info!(
        "Scheduled lead search every {} days for client {}",
        schedule.interval_days,
        client.id
    );

    Ok(HttpResponse::Created().json(schedule))
}

#[get("/clients/{id}/schedules")]
async fn list_schedules(
    user: UserId,
    path: web::Path<Uuid>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    let schedules = store.list_schedules(client.id).await?;
    Ok(HttpResponse::Ok().json(schedules))
}

#[delete("/schedules/{id}")]
async fn deactivate_schedule(
    user: UserId,
    path: web::Path<Uuid>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    store
        .get_schedule(id)
        .await?
        .filter(|s| s.user_id == user.0)
        .ok_or_else(|| ResearchError::NotFound(format!("schedule {}", id)))?;

    store.deactivate_schedule(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
