use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dal::ResearchStore,
    domain::client_business::{ClientBusinessUpdate, NewClientBusiness},
    error::{ResearchError, Result},
};

use super::{owned_client, UserId};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListClientsQuery {
    #[serde(default)]
    include_inactive: bool,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ResearchError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[post("/clients")]
async fn create_client(
    user: UserId,
    body: web::Json<NewClientBusiness>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    require("name", &body.name)?;
    require("keyword", &body.keyword)?;

    let client = store.insert_client(&user.0, body).await?;
    log::info!("Created client business {} for {}", client.id, user.0);

    Ok(HttpResponse::Created().json(client))
}

#[get("/clients")]
async fn list_clients(
    user: UserId,
    query: web::Query<ListClientsQuery>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let clients = store.list_clients(&user.0, query.include_inactive).await?;
    Ok(HttpResponse::Ok().json(clients))
}

#[get("/clients/{id}")]
async fn get_client(
    user: UserId,
    path: web::Path<Uuid>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(client))
}

#[put("/clients/{id}")]
async fn update_client(
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<ClientBusinessUpdate>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let mut client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    body.into_inner().apply(&mut client);
    require("name", &client.name)?;
    require("keyword", &client.keyword)?;
    client.updated_at = Utc::now();

    let client = store.update_client(&client).await?;
    Ok(HttpResponse::Ok().json(client))
}

/// Soft delete; searches and leads stay readable.
#[delete("/clients/{id}")]
async fn deactivate_client(
    user: UserId,
    path: web::Path<Uuid>,
    store: web::Data<dyn ResearchStore>,
) -> Result<HttpResponse> {
    let mut client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    client.is_active = false;
    client.updated_at = Utc::now();
    store.update_client(&client).await?;
    log::info!("Deactivated client business {}", client.id);

    Ok(HttpResponse::NoContent().finish())
}
