use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dal::ResearchStore,
    domain::intel::{AnalysisType, IntelCallback, IntelRequest},
    error::Result,
    services::IntelBridge,
};

use super::{owned_client, UserId};

#[derive(Deserialize)]
struct IntelQuery {
    #[serde(rename = "type")]
    analysis_type: Option<AnalysisType>,
}

#[post("/intel/request")]
async fn request_intel(
    user: UserId,
    body: web::Json<IntelRequest>,
    store: web::Data<dyn ResearchStore>,
    intel: web::Data<IntelBridge>,
) -> Result<HttpResponse> {
    owned_client(store.get_ref(), body.client_business_id, &user).await?;
    let ack = intel.request_business_intelligence(&body).await?;
    Ok(HttpResponse::Accepted().json(ack))
}

#[post("/intel/callback")]
async fn intel_callback(
    body: web::Json<IntelCallback>,
    intel: web::Data<IntelBridge>,
) -> Result<HttpResponse> {
    let summary = intel.store_intel_results(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/clients/{id}/intel")]
async fn get_intel(
    user: UserId,
    path: web::Path<Uuid>,
    query: web::Query<IntelQuery>,
    store: web::Data<dyn ResearchStore>,
    intel: web::Data<IntelBridge>,
) -> Result<HttpResponse> {
    let client = owned_client(store.get_ref(), path.into_inner(), &user).await?;
    let results = intel
        .get_intel_results(client.id, query.analysis_type)
        .await?;
    Ok(HttpResponse::Ok().json(results))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::routes::test_app::fixture;

    #[actix_web::test]
    async fn request_acknowledges_with_job_id() {
        let f = fixture();
        let app = test::init_service(App::new().configure(|cfg| f.state.configure(cfg))).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/intel/request")
                .insert_header(("x-user-id", "user_1"))
                .set_json(json!({
                    "clientBusinessId": f.client.id,
                    "businessName": "Rapid Rooter",
                    "actions": ["reviews"]
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let ack: Value = test::read_body_json(resp).await;
        assert_eq!(ack["status"], "processing");
        assert_eq!(ack["jobId"], "job-1");
    }

    #[actix_web::test]
    async fn callback_then_read_partnerships() {
        let f = fixture();
        let app = test::init_service(App::new().configure(|cfg| f.state.configure(cfg))).await;

        let summary: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/intel/callback")
                .set_json(json!({
                    "clientBusinessId": f.client.id,
                    "actionsCompleted": ["partnerships"],
                    "partnershipAnalysis": {"topPartners": [
                        {"placeId": "p1", "name": "Acme HVAC", "partnershipScore": 82}
                    ]}
                }))
                .to_request(),
        )
        .await;
        assert_eq!(summary["partnersUpserted"], 1);
        assert_eq!(summary["partnersFailed"], 0);

        let results: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/clients/{}/intel?type=partnerships", f.client.id))
                .insert_header(("x-user-id", "user_1"))
                .to_request(),
        )
        .await;
        assert_eq!(results["partnerships"]["partners"][0]["placeId"], "p1");
        assert_eq!(
            results["partnerships"]["analysis"]["failedRecords"],
            0
        );
        assert!(results.get("reviews").is_none());
    }

    #[actix_web::test]
    async fn callback_with_one_malformed_partner_keeps_the_rest() {
        let f = fixture();
        let app = test::init_service(App::new().configure(|cfg| f.state.configure(cfg))).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/intel/callback")
                .set_json(json!({
                    "clientBusinessId": f.client.id,
                    "partnershipAnalysis": {"topPartners": [
                        {"placeId": "p1", "partnershipScore": 82},
                        {"placeId": "p2", "partnershipScore": "75"},
                        42
                    ]}
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let summary: Value = test::read_body_json(resp).await;
        assert_eq!(summary["partnersUpserted"], 2);
        assert_eq!(summary["partnersFailed"], 1);
        assert_eq!(f.store.partners().len(), 2);
        assert_eq!(f.store.analyses()[0].failed_records, 1);
    }
}
