use std::net::TcpListener;

use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use tracing_actix_web::TracingLogger;

use crate::infrastructure::persistence::DeliveryStore;

use super::{
    routes::{deliveries, health_check, webhooks},
    SinkSettings,
};

pub fn run(
    listener: TcpListener,
    store: web::Data<dyn DeliveryStore>,
    sink_settings: SinkSettings,
) -> Result<Server, std::io::Error> {
    let sink_settings = web::Data::new(sink_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route(
                "/kyc-webhook-public",
                web::post().to(webhooks::receive_kyc_public),
            )
            .route(
                "/kyc-webhook-simple",
                web::post().to(webhooks::receive_kyc_simple),
            )
            .route("/f/{form_id}", web::post().to(webhooks::receive_contact_form))
            .service(
                web::scope("/api").service(
                    web::scope("/deliveries")
                        .route("", web::get().to(deliveries::list_deliveries))
                        .route("/{delivery_id}", web::get().to(deliveries::get_delivery)),
                ),
            )
            .app_data(store.clone())
            .app_data(Data::clone(&sink_settings))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
