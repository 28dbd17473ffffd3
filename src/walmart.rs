//! Product page scraping for walmart.com.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::compose::compose_async;
use crate::error::ScrapeError;
use crate::extract::{
    attribute, extract_from_elems, find, find_all, inner_html, inner_text, joined_text,
    ParsedDocument,
};
use crate::fetcher::Fetcher;
use crate::model::{ConsiderationItem, Location, ProductRecord};
use crate::sanitize::enforce_https_opt;

pub const BASE_URL: &str = "https://www.walmart.com";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid product page selector")
}

static PRODUCT_NAME: Lazy<Selector> = Lazy::new(|| selector(r#"h1[itemprop="name"]"#));
static PRICE: Lazy<Selector> = Lazy::new(|| selector(r#"span[itemprop="price"]"#));
static FULFILLMENT_BOX: Lazy<Selector> = Lazy::new(|| selector("div.fulfillment-buy-box-update"));
static DELIVERY_STATUS: Lazy<Selector> = Lazy::new(|| {
    selector(".prod-fulfillment div:nth-child(1) .fulfillment-shipping-text")
});
static PICKUP_STATUS: Lazy<Selector> =
    Lazy::new(|| selector(".prod-fulfillment div:nth-child(2) div.fulfillment-text"));
static ABOUT_ITEM: Lazy<Selector> = Lazy::new(|| selector("div.AboutThisItem"));
static CONSIDERATION_LIST: Lazy<Selector> = Lazy::new(|| {
    selector(r#"div[data-tl-id="contentZoneMiddle3-DefaultItemCarousel-PersonalizationModule"] > ul"#)
});
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("li"));
static ITEM_LINK: Lazy<Selector> = Lazy::new(|| selector("a.tile-link-overlay"));
static ITEM_TITLE: Lazy<Selector> = Lazy::new(|| selector("div.TempoItemTile-Title"));
static ITEM_IMAGE: Lazy<Selector> = Lazy::new(|| selector("img"));

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("valid scheme pattern"));

/// Joins a site-relative path onto `base`. Absolute and protocol-relative
/// URLs are returned unchanged.
pub fn retailer_relative_url(base: &str, url: &str) -> String {
    if url.starts_with("//") || SCHEME.is_match(url) {
        return url.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

pub fn product_url(base: &str, id: &str) -> String {
    retailer_relative_url(base, &format!("/ip/{}", urlencoding::encode(id)))
}

fn url_attribute(node: Option<ElementRef<'_>>, name: &str, base: &str) -> Option<String> {
    let resolved = attribute(name)(node).map(|url| retailer_relative_url(base, &url));
    enforce_https_opt(resolved.as_deref())
}

/// One related-product tile.
pub fn extract_customer_consideration(elem: ElementRef<'_>, base: &str) -> ConsiderationItem {
    let elem = Some(elem);
    ConsiderationItem {
        name: inner_text(find(elem, &ITEM_TITLE)),
        href: url_attribute(find(elem, &ITEM_LINK), "href", base),
        image_url: url_attribute(find(elem, &ITEM_IMAGE), "src", base),
    }
}

/// Pulls every product field out of a parsed product page. Each field is an
/// independent lookup; one that matches nothing is `None` and does not affect
/// the others.
pub fn extract_product_details(doc: &ParsedDocument, base: &str) -> ProductRecord {
    let fulfillment = doc.select_first(&FULFILLMENT_BOX);
    let list = doc.select_first(&CONSIDERATION_LIST);
    let extract_considerations =
        extract_from_elems(|elem| extract_customer_consideration(elem, base));

    let record = ProductRecord {
        name: inner_text(doc.select_first(&PRODUCT_NAME)),
        price: attribute("content")(doc.select_first(&PRICE)),
        delivery_status: joined_text(find_all(fulfillment, &DELIVERY_STATUS)),
        pickup_status: joined_text(find_all(fulfillment, &PICKUP_STATUS)),
        about_html: inner_html(doc.select_first(&ABOUT_ITEM)),
        considerations: extract_considerations(find_all(list, &LIST_ITEM)),
    };
    debug!(
        name = ?record.name,
        considerations = record.considerations.len(),
        "extracted product details"
    );
    record
}

/// Fetches the product page for `id` as seen from `location` and extracts
/// its details.
pub async fn fetch_product_details(
    fetcher: &Fetcher,
    base: &str,
    id: &str,
    location: Location,
) -> Result<ProductRecord, ScrapeError> {
    let fetcher = fetcher.clone();
    let parse_base = base.to_string();
    let pipeline = compose_async(
        move |body: Result<String, ScrapeError>| {
            let base = parse_base.clone();
            async move {
                body.map(|markup| extract_product_details(&ParsedDocument::parse(&markup), &base))
            }
        },
        move |(url, location): (String, Location)| {
            let fetcher = fetcher.clone();
            async move { fetcher.fetch_html(&url, &location).await }
        },
    );
    pipeline((product_url(base, id), location)).await
}
