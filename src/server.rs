use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::docs::ApiDoc;
use crate::routes;
use crate::store::RecordStore;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance tracker"
}

/// Builds the HTTP server on an already bound listener.
///
/// The returned [`Server`] must be awaited (or spawned) to start accepting.
pub fn run(listener: TcpListener, store: RecordStore, config: Config) -> std::io::Result<Server> {
    let store = Data::new(store);
    let config = Data::new(config);

    let server = HttpServer::new(move || {
        let config_data = config.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(config.clone())
            .service(index)
            .configure(move |cfg| routes::configure(cfg, &config_data))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
