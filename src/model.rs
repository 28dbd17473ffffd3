use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Shopper location used to localise prices and fulfillment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Location {
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

impl Location {
    pub fn new(zip: impl Into<String>, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            zip: zip.into(),
            city: city.into(),
            state: state.into(),
        }
    }
}

/// Structured product data scraped from a product page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: Option<String>,
    pub price: Option<String>,
    pub delivery_status: Option<String>,
    pub pickup_status: Option<String>,
    pub about_html: Option<String>,
    pub considerations: Vec<ConsiderationItem>,
}

/// A related product shown next to the main one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsiderationItem {
    pub name: Option<String>,
    pub href: Option<String>,
    pub image_url: Option<String>,
}
