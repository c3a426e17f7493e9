//! HTTP handlers and route configuration.

mod health;
mod platform;
mod posts;
mod publish;
mod schedule;
mod settings;
mod upload;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(posts::list))
                            .route(web::post().to(posts::create)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(posts::get))
                            .route(web::patch().to(posts::update))
                            .route(web::delete().to(posts::delete)),
                    )
                    .route("/{id}/retry", web::post().to(posts::retry)),
            )
            .service(
                web::resource("/settings")
                    .route(web::get().to(settings::get))
                    .route(web::patch().to(settings::update)),
            )
            .route("/schedule/preview", web::get().to(schedule::preview))
            .service(
                web::resource("/upload")
                    .app_data(web::PayloadConfig::new(upload::MAX_UPLOAD_BYTES))
                    .route(web::post().to(upload::upload)),
            )
            // Sweep triggers, guarded by CronAuth
            .service(
                web::resource("/publish")
                    .route(web::get().to(publish::sweep))
                    .route(web::post().to(publish::sweep)),
            )
            .route("/cron/publish", web::get().to(publish::sweep))
            .route("/platform/account", web::get().to(platform::account)),
    )
    .route("/uploads/{key:.*}", web::get().to(upload::serve));
}
