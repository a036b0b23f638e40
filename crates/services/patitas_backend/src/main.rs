// File: services/patitas_backend/src/main.rs
use patitas_backend::{build_router, PatitasServiceFactory};
use patitas_common::logging;
use patitas_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let factory =
        PatitasServiceFactory::new(&config).expect("Failed to initialize service factory");

    let app = build_router(&config, &factory);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    println!("Starting server at http://{}", addr);
    println!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
