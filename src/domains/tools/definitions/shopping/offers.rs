//! Store offers, price comparison, nearby stores and coupons.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

use super::ShoppingManager;
use crate::core::store::Query;
use crate::core::store::query::{text_contains, text_eq};
use crate::domains::tools::{DomainError, ToolResult, ToolSpec, round2, to_payload};

pub const GET_STORE_OFFERS: ToolSpec = ToolSpec::new(
    "get_store_offers",
    "Get current offers from Vienna supermarkets (Spar, Billa, Hofer). Filter by store and product category.",
);

pub const COMPARE_PRICES: ToolSpec = ToolSpec::new(
    "compare_prices",
    "Compare prices for an item across stores, cheapest effective price first. An empty store list compares all stores.",
);

pub const FIND_STORES_NEARBY: ToolSpec = ToolSpec::new(
    "find_stores_nearby",
    "Find supermarkets near a location within a radius, optionally for one store chain.",
);

pub const FIND_COUPONS: ToolSpec = ToolSpec::new(
    "find_coupons",
    "Find available coupons and discount codes by store and category.",
);

// ============================================================================
// Catalogue
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct Offer {
    store: &'static str,
    item: &'static str,
    category: &'static str,
    price: f64,
    discount: f64,
    valid_until: &'static str,
}

impl Offer {
    fn effective_price(&self) -> f64 {
        round2(self.price - self.discount)
    }
}

const fn offer(
    store: &'static str,
    item: &'static str,
    category: &'static str,
    price: f64,
    discount: f64,
    valid_until: &'static str,
) -> Offer {
    Offer {
        store,
        item,
        category,
        price,
        discount,
        valid_until,
    }
}

static OFFERS: &[Offer] = &[
    offer("Spar", "Bananas", "Fruits", 1.99, 0.50, "2025-12-20"),
    offer("Spar", "Milk", "Dairy", 1.29, 0.20, "2025-12-18"),
    offer("Spar", "Coffee Beans", "Beverages", 8.99, 1.50, "2025-12-22"),
    offer("Billa", "Apples", "Fruits", 2.49, 0.30, "2025-12-19"),
    offer("Billa", "Bread", "Bakery", 1.89, 0.40, "2025-12-17"),
    offer("Billa", "Milk", "Dairy", 1.39, 0.10, "2025-12-21"),
    offer("Hofer", "Bananas", "Fruits", 1.79, 0.20, "2025-12-18"),
    offer("Hofer", "Bread", "Bakery", 1.69, 0.00, "2025-12-20"),
    offer("Hofer", "Milk", "Dairy", 1.19, 0.00, "2025-12-31"),
];

#[derive(Debug, Clone, Serialize)]
struct Store {
    name: &'static str,
    chain: &'static str,
    address: &'static str,
    distance_km: f64,
    opening_hours: &'static str,
    phone: &'static str,
}

static STORES: &[Store] = &[
    Store {
        name: "Spar City",
        chain: "Spar",
        address: "Stephansplatz 1, 1010 Vienna",
        distance_km: 0.5,
        opening_hours: "06:00-22:00",
        phone: "+43 1 1234567",
    },
    Store {
        name: "Billa Plus",
        chain: "Billa",
        address: "Kärntner Straße 12, 1010 Vienna",
        distance_km: 0.8,
        opening_hours: "07:00-20:00",
        phone: "+43 1 2345678",
    },
    Store {
        name: "Hofer Landstraße",
        chain: "Hofer",
        address: "Landstraßer Hauptstraße 33, 1030 Vienna",
        distance_km: 1.6,
        opening_hours: "07:30-20:00",
        phone: "+43 1 3456789",
    },
    Store {
        name: "Spar Gourmet",
        chain: "Spar",
        address: "Mariahilfer Straße 85, 1060 Vienna",
        distance_km: 2.4,
        opening_hours: "07:00-21:00",
        phone: "+43 1 4567890",
    },
];

#[derive(Debug, Clone, Serialize)]
struct Coupon {
    store: &'static str,
    code: &'static str,
    discount: &'static str,
    category: &'static str,
    expiry_date: &'static str,
    description: &'static str,
}

static COUPONS: &[Coupon] = &[
    Coupon {
        store: "Spar",
        code: "SPAR10",
        discount: "10% off",
        category: "All items",
        expiry_date: "2025-12-31",
        description: "Valid on all purchases over €20",
    },
    Coupon {
        store: "Billa",
        code: "BILLA5",
        discount: "€5 off",
        category: "Fruits & Vegetables",
        expiry_date: "2025-12-25",
        description: "Valid on seasonal produce",
    },
    Coupon {
        store: "Hofer",
        code: "HOFERDAIRY",
        discount: "20% off",
        category: "Dairy",
        expiry_date: "2025-12-28",
        description: "Valid on the Zurück zum Ursprung dairy range",
    },
];

// ============================================================================
// Tool Parameters
// ============================================================================

fn default_offer_limit() -> usize {
    10
}

fn default_radius() -> f64 {
    2.0
}

/// Parameters for `get_store_offers`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OffersParams {
    /// Store to check (case-insensitive). All stores when omitted.
    pub store_name: Option<String>,

    /// Product category (case-insensitive exact match).
    pub category: Option<String>,

    /// Maximum offers to return.
    #[serde(default = "default_offer_limit")]
    pub limit: usize,
}

/// Parameters for `compare_prices`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompareParams {
    /// Item to compare (case-insensitive substring).
    pub item_name: String,

    /// Stores to compare. Empty or omitted means every known store.
    #[serde(default)]
    pub stores: Vec<String>,
}

/// Parameters for `find_stores_nearby`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NearbyParams {
    /// Address or location name.
    pub location: String,

    /// Store chain to find (optional).
    pub store_chain: Option<String>,

    /// Search radius in kilometers.
    #[serde(default = "default_radius")]
    pub radius_km: f64,
}

/// Parameters for `find_coupons`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CouponParams {
    /// Store (case-insensitive).
    pub store_name: Option<String>,

    /// Category (case-insensitive substring).
    pub category: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

impl ShoppingManager {
    #[instrument(skip_all)]
    pub async fn get_store_offers(self: Arc<Self>, params: OffersParams) -> ToolResult {
        let offers = Query::new()
            .filter_opt(params.store_name, |o: &Offer, store| text_eq(o.store, store))
            .filter_opt(params.category, |o: &Offer, category| text_eq(o.category, category))
            .limit(params.limit)
            .apply(OFFERS);

        info!("Retrieved {} store offers", offers.len());
        to_payload(&offers)
    }

    #[instrument(skip_all, fields(item = %params.item_name))]
    pub async fn compare_prices(self: Arc<Self>, params: CompareParams) -> ToolResult {
        let stores = params.stores;
        let mut matches = Query::new()
            .filter(|o: &Offer| text_contains(o.item, &params.item_name))
            .filter(|o: &Offer| stores.is_empty() || stores.iter().any(|s| text_eq(o.store, s)))
            .order_by(|a: &Offer, b: &Offer| a.effective_price().total_cmp(&b.effective_price()))
            .apply(OFFERS);

        // one entry per store: the cheapest matching offer
        let mut seen = Vec::new();
        matches.retain(|o| {
            let first = !seen.contains(&o.store);
            seen.push(o.store);
            first
        });

        let best_price = matches.first().map(Offer::effective_price);
        let worst_price = matches.last().map(Offer::effective_price);
        let potential_savings = match (best_price, worst_price) {
            (Some(best), Some(worst)) => round2(worst - best),
            _ => 0.0,
        };

        let comparisons: Vec<_> = matches
            .iter()
            .enumerate()
            .map(|(rank, o)| {
                json!({
                    "store": o.store,
                    "item": o.item,
                    "price": o.price,
                    "discount": o.discount,
                    "effective_price": o.effective_price(),
                    "valid_until": o.valid_until,
                    "best_deal": rank == 0,
                })
            })
            .collect();

        info!("Price comparison for '{}' across {} stores", params.item_name, comparisons.len());
        Ok(json!({
            "item": params.item_name,
            "comparisons": comparisons,
            "best_price": best_price,
            "potential_savings": potential_savings,
            "last_updated": self.clock.utc().to_rfc3339(),
        }))
    }

    #[instrument(skip_all, fields(location = %params.location))]
    pub async fn find_stores_nearby(self: Arc<Self>, params: NearbyParams) -> ToolResult {
        if !params.radius_km.is_finite() || params.radius_km <= 0.0 {
            return Err(DomainError::validation("radius_km must be a positive number"));
        }

        let radius = params.radius_km;
        let stores = Query::new()
            .filter_opt(params.store_chain, |s: &Store, chain| text_eq(s.chain, chain))
            .filter(move |s: &Store| s.distance_km <= radius)
            .order_by(|a: &Store, b: &Store| a.distance_km.total_cmp(&b.distance_km))
            .apply(STORES);

        info!("Found {} stores near {}", stores.len(), params.location);
        to_payload(&stores)
    }

    #[instrument(skip_all)]
    pub async fn find_coupons(self: Arc<Self>, params: CouponParams) -> ToolResult {
        let coupons = Query::new()
            .filter_opt(params.store_name, |c: &Coupon, store| text_eq(c.store, store))
            .filter_opt(params.category, |c: &Coupon, category| text_contains(c.category, category))
            .apply(COUPONS);

        info!("Found {} available coupons", coupons.len());
        to_payload(&coupons)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::manager;
    use super::*;

    fn compare(item: &str, stores: &[&str]) -> CompareParams {
        CompareParams {
            item_name: item.to_string(),
            stores: stores.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_offers_filter_by_store_and_category() {
        let params = OffersParams {
            store_name: Some("SPAR".into()),
            category: Some("dairy".into()),
            limit: 10,
        };
        let offers = manager().get_store_offers(params).await.unwrap();
        let offers = offers.as_array().unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0]["item"], "Milk");
    }

    #[tokio::test]
    async fn test_offers_limit_truncates() {
        let params = OffersParams {
            store_name: None,
            category: None,
            limit: 2,
        };
        let offers = manager().get_store_offers(params).await.unwrap();
        assert_eq!(offers.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_compare_prices_with_empty_stores_uses_all_stores() {
        let result = manager().compare_prices(compare("milk", &[])).await.unwrap();
        let comparisons = result["comparisons"].as_array().unwrap();
        assert_eq!(comparisons.len(), 3);
        assert_eq!(comparisons[0]["store"], "Spar");
        assert_eq!(comparisons[2]["store"], "Billa");
        assert_eq!(comparisons[0]["best_deal"], true);
        assert_eq!(result["best_price"], 1.09);
        assert_eq!(result["potential_savings"], 0.2);
    }

    #[tokio::test]
    async fn test_compare_prices_restricted_to_listed_stores() {
        let result = manager()
            .compare_prices(compare("bananas", &["spar"]))
            .await
            .unwrap();
        let comparisons = result["comparisons"].as_array().unwrap();
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0]["store"], "Spar");
        assert_eq!(result["potential_savings"], 0.0);
    }

    #[tokio::test]
    async fn test_compare_prices_unknown_item_is_empty() {
        let result = manager().compare_prices(compare("caviar", &[])).await.unwrap();
        assert!(result["comparisons"].as_array().unwrap().is_empty());
        assert!(result["best_price"].is_null());
    }

    #[tokio::test]
    async fn test_nearby_stores_respect_radius_and_chain() {
        let params = NearbyParams {
            location: "Stephansplatz".into(),
            store_chain: Some("spar".into()),
            radius_km: 2.0,
        };
        let stores = manager().find_stores_nearby(params).await.unwrap();
        let stores = stores.as_array().unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0]["name"], "Spar City");
    }

    #[tokio::test]
    async fn test_nearby_rejects_non_positive_radius() {
        let params = NearbyParams {
            location: "Stephansplatz".into(),
            store_chain: None,
            radius_km: 0.0,
        };
        assert!(manager().find_stores_nearby(params).await.is_err());
    }

    #[tokio::test]
    async fn test_coupon_category_is_substring() {
        let params = CouponParams {
            store_name: None,
            category: Some("vegetables".into()),
        };
        let coupons = manager().find_coupons(params).await.unwrap();
        let coupons = coupons.as_array().unwrap();
        assert_eq!(coupons.len(), 1);
        assert_eq!(coupons[0]["code"], "BILLA5");
    }
}
