use actix_web::{get, web, HttpResponse};

use crate::{error::Result, services::TokenStatusSource};

use super::UserId;

/// Reports whether a storage token can be obtained. The token itself is never returned.
#[get("/storage/status")]
async fn storage_status(
    _user: UserId,
    tokens: web::Data<dyn TokenStatusSource>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(tokens.status().await))
}
