pub mod intake;
pub mod polling;

use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME")
    }))
}

pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(health_check)))
        .service(web::resource("/health").route(web::get().to(health_check)));
}
