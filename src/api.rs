use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::envelope::{send_response, Envelope};
use crate::fetcher::Fetcher;
use crate::model::{ConsiderationItem, Location, ProductRecord};
use crate::walmart;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Fetcher,
    pub retailer_base_url: String,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fetcher: Fetcher::with_location_cookies(config.fetch.clone()),
            retailer_base_url: config.retailer_base_url.clone(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(get_product),
    components(schemas(ProductRecord, ConsiderationItem, Location)),
    tags((name = "products", description = "Localised product scraping"))
)]
pub struct ApiDoc;

/// Scrape a product page as seen from the shopper's location
#[utoipa::path(
    get,
    path = "/api/walmart/products/{id}",
    params(
        ("id" = String, Path, description = "Retailer product id"),
        Location
    ),
    responses(
        (status = 200, description = "`{status: \"success\", data}` with the scraped product", body = ProductRecord),
        (status = 400, description = "`{status: \"failure\", code: 400, message: \"Request failed.\"}` for a malformed query"),
        (status = 404, description = "`{status: \"failure\", code: 404, message: \"Not found.\"}`"),
        (status = 500, description = "`{status: \"failure\", code, message: \"Request failed.\"}`")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    location: Result<Query<Location>, QueryRejection>,
) -> Envelope<ProductRecord> {
    let location = match location {
        Ok(Query(location)) => location,
        Err(rejection) => {
            warn!(error = %rejection, "rejected location query");
            return Envelope::from_status(rejection.status().as_u16());
        }
    };
    send_response(walmart::fetch_product_details(
        &state.fetcher,
        &state.retailer_base_url,
        &id,
        location,
    ))
    .await
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/scraper-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/walmart/products/:id", get(get_product))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
