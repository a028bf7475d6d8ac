pub mod health;
pub mod search;
pub mod stocks;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(stocks::config)
            .configure(search::config),
    );
}
