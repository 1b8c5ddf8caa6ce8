//! City guides for trips out of Vienna.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::TravelManager;
use crate::core::store::query::text_eq;
use crate::domains::tools::{DomainError, ToolResult, ToolSpec};

pub const GET_TRAVEL_INFO: ToolSpec = ToolSpec::new(
    "get_travel_info",
    "Get travel information for a city near Vienna: transport, attractions, accommodation or costs.",
);

/// Section of a city guide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InfoType {
    #[default]
    Transport,
    Attractions,
    Accommodation,
    Costs,
}

#[derive(Debug, Serialize)]
struct Connection {
    duration: &'static str,
    cost: &'static str,
    frequency: &'static str,
}

#[derive(Debug, Serialize)]
struct Transport {
    from_vienna_train: Connection,
    from_vienna_bus: Connection,
    from_vienna_car: Connection,
    local_single_ride: &'static str,
    local_day_pass: &'static str,
}

#[derive(Debug, Serialize)]
struct Attraction {
    name: &'static str,
    cost: &'static str,
    time_needed: &'static str,
}

#[derive(Debug, Serialize)]
struct Accommodation {
    budget: &'static str,
    mid_range: &'static str,
    luxury: &'static str,
}

#[derive(Debug, Serialize)]
struct Costs {
    currency: &'static str,
    meal_budget: &'static str,
    meal_mid_range: &'static str,
    beer_local: &'static str,
    coffee: &'static str,
    daily_cost_estimate: &'static str,
}

struct CityGuide {
    names: &'static [&'static str],
    country: &'static str,
    transport: Transport,
    attractions: &'static [Attraction],
    accommodation: Accommodation,
    costs: Costs,
}

const fn conn(duration: &'static str, cost: &'static str, frequency: &'static str) -> Connection {
    Connection { duration, cost, frequency }
}

const fn sight(name: &'static str, cost: &'static str, time_needed: &'static str) -> Attraction {
    Attraction { name, cost, time_needed }
}

static GUIDES: &[CityGuide] = &[
    CityGuide {
        names: &["Salzburg"],
        country: "Austria",
        transport: Transport {
            from_vienna_train: conn("2h 22min", "€25-60", "Every 30 min"),
            from_vienna_bus: conn("3h 15min", "€12-20", "Several daily"),
            from_vienna_car: conn("3h", "Vignette + fuel ~€40", "Any time"),
            local_single_ride: "€2.30",
            local_day_pass: "€4.40",
        },
        attractions: &[
            sight("Hohensalzburg Fortress", "€18.70", "2-3 hours"),
            sight("Mirabell Gardens", "Free", "1 hour"),
            sight("Mozart's Birthplace", "€15", "1-2 hours"),
        ],
        accommodation: Accommodation {
            budget: "€45-80 per night, hostel or guesthouse",
            mid_range: "€90-150 per night, 3-star hotel",
            luxury: "€200+ per night, 4-5 star hotel",
        },
        costs: Costs {
            currency: "EUR",
            meal_budget: "€14-20",
            meal_mid_range: "€25-45",
            beer_local: "€4.50-5.50",
            coffee: "€3-4.50",
            daily_cost_estimate: "€80-140 per person",
        },
    },
    CityGuide {
        names: &["Graz"],
        country: "Austria",
        transport: Transport {
            from_vienna_train: conn("2h 35min", "€20-45", "Hourly"),
            from_vienna_bus: conn("2h 30min", "€10-18", "Several daily"),
            from_vienna_car: conn("2h", "Vignette + fuel ~€30", "Any time"),
            local_single_ride: "€3.00",
            local_day_pass: "€6.60",
        },
        attractions: &[
            sight("Schlossberg", "Free", "1-2 hours"),
            sight("Kunsthaus Graz", "€15", "1-2 hours"),
            sight("Eggenberg Palace", "€17", "2-3 hours"),
        ],
        accommodation: Accommodation {
            budget: "€40-70 per night, hostel or guesthouse",
            mid_range: "€80-130 per night, 3-star hotel",
            luxury: "€160+ per night, 4-5 star hotel",
        },
        costs: Costs {
            currency: "EUR",
            meal_budget: "€12-18",
            meal_mid_range: "€22-40",
            beer_local: "€4-5",
            coffee: "€3-4",
            daily_cost_estimate: "€70-120 per person",
        },
    },
    CityGuide {
        names: &["Bratislava", "Pressburg"],
        country: "Slovakia",
        transport: Transport {
            from_vienna_train: conn("1h", "€11-14", "Every 30 min"),
            from_vienna_bus: conn("1h 15min", "€5-10", "Hourly"),
            from_vienna_car: conn("1h", "Slovak vignette + fuel ~€15", "Any time"),
            local_single_ride: "€1.10",
            local_day_pass: "€4.50",
        },
        attractions: &[
            sight("Bratislava Castle", "Free grounds, €10 museum", "1-2 hours"),
            sight("Old Town", "Free", "2-3 hours"),
            sight("Devín Castle", "€6", "2 hours"),
        ],
        accommodation: Accommodation {
            budget: "€25-50 per night, hostel or guesthouse",
            mid_range: "€60-100 per night, 3-star hotel",
            luxury: "€130+ per night, 4-5 star hotel",
        },
        costs: Costs {
            currency: "EUR",
            meal_budget: "€8-14",
            meal_mid_range: "€18-30",
            beer_local: "€2.50-3.50",
            coffee: "€2-3",
            daily_cost_estimate: "€50-90 per person",
        },
    },
    CityGuide {
        names: &["Budapest"],
        country: "Hungary",
        transport: Transport {
            from_vienna_train: conn("2h 40min", "€19-35", "Every 2 hours"),
            from_vienna_bus: conn("3h", "€12-20", "Several daily"),
            from_vienna_car: conn("2h 45min", "Hungarian vignette + fuel ~€35", "Any time"),
            local_single_ride: "450 HUF",
            local_day_pass: "2500 HUF",
        },
        attractions: &[
            sight("Hungarian Parliament", "€30", "1 hour"),
            sight("Széchenyi Thermal Bath", "€35", "3-4 hours"),
            sight("Buda Castle", "Free", "2-3 hours"),
        ],
        accommodation: Accommodation {
            budget: "€25-50 per night, hostel or guesthouse",
            mid_range: "€60-110 per night, 3-star hotel",
            luxury: "€150+ per night, 4-5 star hotel",
        },
        costs: Costs {
            currency: "HUF",
            meal_budget: "€8-14",
            meal_mid_range: "€18-35",
            beer_local: "€2-3.50",
            coffee: "€2-3",
            daily_cost_estimate: "€50-100 per person",
        },
    },
    CityGuide {
        names: &["Prague", "Praha", "Prag"],
        country: "Czechia",
        transport: Transport {
            from_vienna_train: conn("4h", "€20-40", "Every 2 hours"),
            from_vienna_bus: conn("4h 30min", "€15-25", "Several daily"),
            from_vienna_car: conn("3h 45min", "Czech vignette + fuel ~€45", "Any time"),
            local_single_ride: "30 CZK",
            local_day_pass: "120 CZK",
        },
        attractions: &[
            sight("Prague Castle", "€18", "2-3 hours"),
            sight("Charles Bridge", "Free", "1 hour"),
            sight("Old Town Square", "Free", "1-2 hours"),
        ],
        accommodation: Accommodation {
            budget: "€30-60 per night, hostel or guesthouse",
            mid_range: "€70-120 per night, 3-star hotel",
            luxury: "€170+ per night, 4-5 star hotel",
        },
        costs: Costs {
            currency: "CZK",
            meal_budget: "€9-15",
            meal_mid_range: "€20-35",
            beer_local: "€2-3",
            coffee: "€2.50-3.50",
            daily_cost_estimate: "€55-100 per person",
        },
    },
];

/// Parameters for `get_travel_info`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TravelInfoParams {
    /// Destination city.
    pub city_name: String,

    /// Guide section.
    #[serde(default)]
    pub info_type: InfoType,
}

impl TravelManager {
    pub async fn get_travel_info(self: Arc<Self>, params: TravelInfoParams) -> ToolResult {
        let city = params.city_name.trim();
        let guide = GUIDES
            .iter()
            .find(|g| g.names.iter().any(|name| text_eq(name, city)))
            .ok_or_else(|| DomainError::not_found(format!("No travel guide for {}", city)))?;

        let section = match params.info_type {
            InfoType::Transport => json!(guide.transport),
            InfoType::Attractions => json!(guide.attractions),
            InfoType::Accommodation => json!(guide.accommodation),
            InfoType::Costs => json!(guide.costs),
        };

        info!("Retrieved {:?} information for {}", params.info_type, guide.names[0]);
        Ok(json!({
            "city": guide.names[0],
            "country": guide.country,
            "info_type": params.info_type,
            "details": section,
            "last_updated": self.clock.utc().to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::manager;
    use super::*;

    #[tokio::test]
    async fn test_transport_is_the_default_section() {
        let params: TravelInfoParams = serde_json::from_value(json!({ "city_name": "salzburg" })).unwrap();
        let info = manager().get_travel_info(params).await.unwrap();
        assert_eq!(info["city"], "Salzburg");
        assert_eq!(info["info_type"], "transport");
        assert_eq!(info["details"]["from_vienna_train"]["duration"], "2h 22min");
    }

    #[tokio::test]
    async fn test_alias_resolves_and_sections_switch() {
        let params = TravelInfoParams {
            city_name: "Praha".into(),
            info_type: InfoType::Costs,
        };
        let info = manager().get_travel_info(params).await.unwrap();
        assert_eq!(info["city"], "Prague");
        assert_eq!(info["details"]["currency"], "CZK");

        let params = TravelInfoParams {
            city_name: "Bratislava".into(),
            info_type: InfoType::Attractions,
        };
        let info = manager().get_travel_info(params).await.unwrap();
        assert_eq!(info["details"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_city_is_not_found() {
        let params = TravelInfoParams {
            city_name: "Atlantis".into(),
            info_type: InfoType::Transport,
        };
        let result = manager().get_travel_info(params).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }
}
