//! Router assembly for the backend service.

use axum::{routing::get, Router};
use patitas_adoption::AdoptionWorkflow;
use patitas_common::services::ServiceFactory;
use patitas_config::AppConfig;
use patitas_pins::PinWorkflow;
use patitas_social::LikeWorkflow;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build the full application router from a service factory.
///
/// Adoption and social routes are always mounted; pin routes need object
/// storage and are skipped (with a warning) when it is not configured.
pub fn build_router(config: &Arc<AppConfig>, factory: &dyn ServiceFactory) -> Router {
    let store = factory.document_store();

    let adoption = Arc::new(AdoptionWorkflow::new(
        store.clone(),
        factory.push_sender(),
        config.limits.adoption_requests_per_day,
    ));
    let social = Arc::new(LikeWorkflow::new(store.clone()));

    let mut api = Router::new()
        .route("/", get(|| async { "Welcome to the Patitas API!" }))
        .merge(patitas_adoption::routes(adoption))
        .merge(patitas_social::routes(social));

    match factory.object_storage() {
        Some(storage) => {
            let pins = Arc::new(PinWorkflow::new(
                store,
                storage,
                config.limits.pins_per_day,
            ));
            api = api.merge(patitas_pins::routes(pins));
        }
        None => {
            warn!("Object storage not configured; pin routes are disabled");
        }
    }

    #[allow(unused_mut)] // reassigned only when the openapi feature is on
    let mut app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http());

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use patitas_adoption::doc::AdoptionApiDoc;
        use patitas_pins::doc::PinsApiDoc;
        use patitas_social::doc::SocialApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Patitas API",
                version = "0.1.0",
                description = "Lost/found pet reports, adoption requests, and likes",
            ),
            components(),
            tags((name = "Patitas", description = "Core service endpoints")),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(AdoptionApiDoc::openapi());
        openapi_doc.merge(SocialApiDoc::openapi());
        openapi_doc.merge(PinsApiDoc::openapi());

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    app
}
