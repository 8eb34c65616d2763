use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::routing::RouteInfo;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub base_url: String,
    pub routes: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        routes: state.routes.len(),
    })
}

pub async fn get_routes(State(state): State<AdminState>) -> Json<Vec<RouteInfo>> {
    Json(state.routes.routes())
}

pub async fn get_services(State(state): State<AdminState>) -> Json<Vec<ServiceStatus>> {
    let routes = state.routes.routes();
    let services = state
        .services
        .iter()
        .map(|(name, base_url)| ServiceStatus {
            name: name.to_string(),
            base_url: base_url.to_string(),
            routes: routes.iter().filter(|r| r.service == name).count(),
        })
        .collect();
    Json(services)
}
