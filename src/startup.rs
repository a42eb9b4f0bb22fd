use std::net::TcpListener;

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};

use crate::{
    dal::ResearchStore,
    routes::{
        client_route, health_route, intel_route, lead_route, lead_search_route, schedule_route,
        storage_route, swot_route,
    },
    services::{IntelBridge, LeadSearchService, TokenStatusSource},
};

/// Shared handles injected into every worker.
#[derive(Clone)]
pub struct AppState {
    pub store: Data<dyn ResearchStore>,
    pub lead_search: Data<LeadSearchService>,
    pub intel: Data<IntelBridge>,
    pub tokens: Data<dyn TokenStatusSource>,
}

impl AppState {
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.lead_search.clone())
            .app_data(self.intel.clone())
            .app_data(self.tokens.clone())
            .app_data(web::JsonConfig::default().limit(8 * 1024 * 1024))
            .service(health_route::health)
            .service(
                web::scope("/api")
                    .service(client_route::create_client)
                    .service(client_route::list_clients)
                    .service(client_route::get_client)
                    .service(client_route::update_client)
                    .service(client_route::deactivate_client)
                    .service(lead_search_route::execute_lead_search)
                    .service(lead_search_route::list_lead_searches)
                    .service(lead_search_route::get_lead_search)
                    .service(lead_search_route::lead_search_callback)
                    .service(lead_route::list_leads)
                    .service(lead_route::update_lead_status)
                    .service(schedule_route::create_schedule)
                    .service(schedule_route::list_schedules)
                    .service(schedule_route::deactivate_schedule)
                    .service(intel_route::request_intel)
                    .service(intel_route::intel_callback)
                    .service(intel_route::get_intel)
                    .service(swot_route::create_swot)
                    .service(swot_route::get_latest_swot)
                    .service(swot_route::update_swot)
                    .service(storage_route::storage_status),
            );
    }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
