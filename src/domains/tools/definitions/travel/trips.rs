//! Trip planning helpers: currency, visas, cost breakdowns and weather.

use chrono::Duration;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::info;

use super::TravelManager;
use crate::core::clock::today;
use crate::domains::tools::{DomainError, ToolResult, ToolSpec, round2};

pub const GET_CURRENCY_EXCHANGE: ToolSpec = ToolSpec::new(
    "get_currency_exchange",
    "Get the exchange rate between two currencies and optionally convert an amount.",
);

pub const GET_VISA_REQUIREMENTS: ToolSpec = ToolSpec::new(
    "get_visa_requirements",
    "Get visa requirements for travelling from Austria to a destination country.",
);

pub const CALCULATE_TRAVEL_COST: ToolSpec = ToolSpec::new(
    "calculate_travel_cost",
    "Calculate total travel cost with a breakdown, estimates for missing parts and budget bands.",
);

pub const GET_WEATHER: ToolSpec = ToolSpec::new(
    "get_weather_for_travel",
    "Get a travel-oriented weather forecast for up to 7 days.",
);

/// (from, to, rate)
static RATES: &[(&str, &str, f64)] = &[
    ("EUR", "USD", 1.0847),
    ("EUR", "GBP", 0.8523),
    ("EUR", "CHF", 0.9372),
    ("USD", "EUR", 0.9221),
    ("USD", "GBP", 0.7859),
    ("USD", "CHF", 0.8637),
    ("GBP", "EUR", 1.1732),
    ("GBP", "USD", 1.2723),
    ("GBP", "CHF", 1.0987),
];

static SCHENGEN: &[&str] = &[
    "austria", "belgium", "bulgaria", "croatia", "czech republic", "czechia", "denmark",
    "estonia", "finland", "france", "germany", "greece", "hungary", "iceland", "italy",
    "latvia", "liechtenstein", "lithuania", "luxembourg", "malta", "netherlands", "norway",
    "poland", "portugal", "romania", "slovakia", "slovenia", "spain", "sweden", "switzerland",
];

const MAX_FORECAST_DAYS: u32 = 7;

const CONDITIONS: [&str; 4] = ["Sunny", "Partly Cloudy", "Cloudy", "Light Rain"];

fn default_from_currency() -> String {
    "EUR".to_string()
}

fn default_to_currency() -> String {
    "USD".to_string()
}

fn default_days_ahead() -> u32 {
    3
}

/// Parameters for `get_currency_exchange`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CurrencyParams {
    /// Source currency code.
    #[serde(default = "default_from_currency")]
    pub from_currency: String,

    /// Target currency code.
    #[serde(default = "default_to_currency")]
    pub to_currency: String,

    /// Amount to convert.
    pub amount: Option<f64>,
}

/// Parameters for `get_visa_requirements`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct VisaParams {
    /// Passport country.
    pub citizenship: String,

    /// Travel destination.
    pub destination_country: String,
}

/// Parameters for `calculate_travel_cost`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TravelCostParams {
    /// Cost of transportation.
    pub transport_cost: f64,

    /// Cost of accommodation.
    pub accommodation_cost: Option<f64>,

    /// Cost of food and dining.
    pub food_cost: Option<f64>,

    /// Cost of activities and attractions.
    pub activities_cost: Option<f64>,
}

/// Parameters for `get_weather_for_travel`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherParams {
    /// Location name.
    pub location: String,

    /// Days to forecast (at most 7).
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,
}

impl TravelManager {
    pub async fn get_currency_exchange(self: Arc<Self>, params: CurrencyParams) -> ToolResult {
        let from = params.from_currency.trim().to_uppercase();
        let to = params.to_currency.trim().to_uppercase();

        let rate = RATES
            .iter()
            .find(|(f, t, _)| *f == from && *t == to)
            .map(|&(_, _, rate)| rate)
            .ok_or_else(|| {
                DomainError::not_found(format!("Exchange rate not available for {} to {}", from, to))
            })?;

        let mut result = json!({
            "from_currency": from,
            "to_currency": to,
            "exchange_rate": rate,
            "last_updated": self.clock.utc().to_rfc3339(),
            "source": "European Central Bank",
        });

        if let Some(amount) = params.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(DomainError::validation("amount must be zero or more"));
            }
            result["original_amount"] = json!(amount);
            result["converted_amount"] = json!(round2(amount * rate));
        }

        info!("Retrieved exchange rate {} to {}: {}", from, to, rate);
        Ok(result)
    }

    pub async fn get_visa_requirements(self: Arc<Self>, params: VisaParams) -> ToolResult {
        let destination = params.destination_country.trim().to_lowercase();
        let schengen = SCHENGEN.contains(&destination.as_str());

        let mut info = json!({
            "citizenship": params.citizenship,
            "destination": params.destination_country,
            "visa_required": !schengen,
            "last_updated": self.clock.utc().to_rfc3339(),
        });

        if schengen {
            info["max_stay"] = json!("90 days in 180-day period");
            info["notes"] = json!("Schengen area: no visa required for stays up to 90 days");
        } else {
            info["visa_type"] = json!("Tourist Visa");
            info["processing_time"] = json!("2-4 weeks");
            info["cost"] = json!("€60-120");
            info["application_url"] = json!(format!(
                "https://www.{}-embassy.at",
                destination.replace(' ', "-")
            ));
            info["requirements"] = json!([
                "Valid passport (6+ months validity)",
                "Application form",
                "Recent passport photo",
                "Flight itinerary",
                "Hotel booking confirmation",
                "Bank statements",
                "Employment letter",
            ]);
        }

        info!(
            "Retrieved visa requirements for {} citizen travelling to {}",
            params.citizenship, params.destination_country
        );
        Ok(info)
    }

    pub async fn calculate_travel_cost(self: Arc<Self>, params: TravelCostParams) -> ToolResult {
        let parts = [
            ("transport", Some(params.transport_cost)),
            ("accommodation", params.accommodation_cost),
            ("food", params.food_cost),
            ("activities", params.activities_cost),
        ];

        for (name, cost) in parts {
            if let Some(cost) = cost
                && (!cost.is_finite() || cost < 0.0)
            {
                return Err(DomainError::validation(format!(
                    "{}_cost must be zero or more",
                    name
                )));
            }
        }

        let total: f64 = parts.iter().filter_map(|(_, cost)| *cost).sum();

        let breakdown: Map<String, Value> = parts
            .iter()
            .map(|(name, cost)| (name.to_string(), json!(round2(cost.unwrap_or(0.0)))))
            .collect();

        // omitted (or zero) parts get a share of the known total
        let shares = [("accommodation", 0.4), ("food", 0.3), ("activities", 0.2)];
        let estimates: Map<String, Value> = parts[1..]
            .iter()
            .zip(shares)
            .filter(|((_, cost), _)| cost.is_none_or(|c| c == 0.0))
            .map(|(_, (name, share))| (format!("{}_estimate", name), json!(round2(total * share))))
            .collect();

        info!("Calculated travel cost breakdown: €{:.2}", total);
        Ok(json!({
            "cost_breakdown": breakdown,
            "total_cost": round2(total),
            "per_person_cost": round2(total),
            "estimates": estimates,
            "budget_categories": {
                "low_budget": round2(total * 0.7),
                "comfortable": round2(total),
                "luxury": round2(total * 1.5),
            },
            "tips": [
                "Add 10-15% buffer for unexpected expenses",
                "Consider travel insurance (5-10% of total cost)",
                "Check for discounts with travel cards/clubs",
            ],
        }))
    }

    pub async fn get_weather_for_travel(self: Arc<Self>, params: WeatherParams) -> ToolResult {
        let start = today(self.clock.as_ref());
        let days = params.days_ahead.min(MAX_FORECAST_DAYS);

        let forecast: Vec<_> = (0..days)
            .map(|i| {
                let date = start + Duration::days(i64::from(i));
                json!({
                    "date": date,
                    "day": date.format("%A").to_string(),
                    "temperature_max": 15 + i,
                    "temperature_min": 5 + i,
                    "precipitation_chance": 20 + i * 10,
                    "precipitation_amount": format!("{}mm", i * 2),
                    "wind_speed": 10 + i,
                    "conditions": CONDITIONS[i as usize % CONDITIONS.len()],
                    "travel_advice": if i < 2 {
                        "Good weather for outdoor activities"
                    } else {
                        "Check weather before outdoor plans"
                    },
                    "clothing_advice": if i < 3 {
                        "Light jacket recommended"
                    } else {
                        "Bring umbrella and waterproof jacket"
                    },
                })
            })
            .collect();

        info!("Retrieved {}-day weather forecast for {}", forecast.len(), params.location);
        Ok(json!(forecast))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::manager;
    use super::*;

    fn cost(transport: f64, accommodation: Option<f64>) -> TravelCostParams {
        TravelCostParams {
            transport_cost: transport,
            accommodation_cost: accommodation,
            food_cost: None,
            activities_cost: None,
        }
    }

    #[tokio::test]
    async fn test_currency_conversion_rounds_to_cents() {
        let params = CurrencyParams {
            from_currency: "eur".into(),
            to_currency: "USD".into(),
            amount: Some(100.0),
        };
        let result = manager().get_currency_exchange(params).await.unwrap();
        assert_eq!(result["exchange_rate"], 1.0847);
        assert_eq!(result["converted_amount"], 108.47);
    }

    #[tokio::test]
    async fn test_unknown_currency_pair_is_an_error() {
        let params = CurrencyParams {
            from_currency: "EUR".into(),
            to_currency: "JPY".into(),
            amount: None,
        };
        let err = manager().get_currency_exchange(params).await.unwrap_err();
        assert_eq!(err.to_string(), "Exchange rate not available for EUR to JPY");
    }

    #[tokio::test]
    async fn test_schengen_destinations_need_no_visa() {
        let params = VisaParams {
            citizenship: "Austria".into(),
            destination_country: "Croatia".into(),
        };
        let result = manager().get_visa_requirements(params).await.unwrap();
        assert_eq!(result["visa_required"], false);

        let params = VisaParams {
            citizenship: "Austria".into(),
            destination_country: "Japan".into(),
        };
        let result = manager().get_visa_requirements(params).await.unwrap();
        assert_eq!(result["visa_required"], true);
        assert!(result["requirements"].as_array().is_some());
    }

    #[tokio::test]
    async fn test_travel_cost_estimates_missing_parts() {
        let result = manager().calculate_travel_cost(cost(100.0, Some(200.0))).await.unwrap();
        assert_eq!(result["total_cost"], 300.0);
        assert_eq!(result["cost_breakdown"]["food"], 0.0);
        assert!(result["estimates"].get("accommodation_estimate").is_none());
        assert_eq!(result["estimates"]["food_estimate"], 90.0);
        assert_eq!(result["estimates"]["activities_estimate"], 60.0);
        assert_eq!(result["budget_categories"]["luxury"], 450.0);
    }

    #[tokio::test]
    async fn test_negative_costs_are_rejected() {
        let result = manager().calculate_travel_cost(cost(-1.0, None)).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_weather_is_capped_at_seven_days() {
        let params = WeatherParams {
            location: "Salzburg".into(),
            days_ahead: 14,
        };
        let forecast = manager().get_weather_for_travel(params).await.unwrap();
        let forecast = forecast.as_array().unwrap();
        assert_eq!(forecast.len(), 7);
        assert_eq!(forecast[0]["date"], "2025-01-10");
        assert_eq!(forecast[0]["day"], "Friday");
    }
}
