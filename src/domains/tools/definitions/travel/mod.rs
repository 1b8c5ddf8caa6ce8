//! Travel manager portmanteau.
//!
//! Static reference data only; nothing here touches an entity store.
//!
//! - `transit.rs` - Wiener Linien departures, timetables and disruptions, ÖBB trains
//! - `routes.rs` - long-distance buses, flights, Nightjets, road traffic
//! - `guides.rs` - city guides for trips out of Vienna
//! - `trips.rs` - currency exchange, visa rules, cost planning, weather

mod guides;
mod routes;
mod transit;
mod trips;

pub use guides::{InfoType, TravelInfoParams};
pub use routes::{BusParams, FlightParams, SleeperParams, TrafficParams, TransportMode};
pub use transit::{DisruptionParams, TrainScheduleParams, TramParams, TransportScheduleParams};
pub use trips::{CurrencyParams, TravelCostParams, VisaParams, WeatherParams};

use std::sync::Arc;

use crate::core::clock::SharedClock;
use crate::domains::tools::{Portmanteau, ToolError, ToolRegistry};

pub static TRAVEL: Portmanteau = Portmanteau {
    name: "travel_manager",
    description: "Vienna public transport, trains, buses, flights, Nightjets, traffic, city guides, currency exchange, visa rules, travel costs and weather",
    categories: &[
        "public_transport", "trains", "buses", "flights", "traffic", "guides", "currency", "visa", "costs", "weather",
    ],
};

/// Handlers for the travel tools.
pub struct TravelManager {
    clock: SharedClock,
}

impl TravelManager {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }
}

/// Register every travel tool.
pub fn register_travel_tools(registry: &mut ToolRegistry, manager: Arc<TravelManager>) -> Result<(), ToolError> {
    registry
        .portmanteau(&TRAVEL)
        .register(transit::GET_NEXT_TRAM, manager.clone(), TravelManager::get_next_tram)?
        .register(transit::GET_DISRUPTIONS, manager.clone(), TravelManager::get_transport_disruptions)?
        .register(transit::GET_TRANSPORT_SCHEDULE, manager.clone(), TravelManager::get_transport_schedule)?
        .register(transit::GET_TRAIN_SCHEDULE, manager.clone(), TravelManager::get_train_schedule)?
        .register(routes::GET_BUS_SCHEDULE, manager.clone(), TravelManager::get_bus_schedule)?
        .register(routes::GET_FLIGHT_INFO, manager.clone(), TravelManager::get_flight_info)?
        .register(routes::GET_SLEEPER_TRAINS, manager.clone(), TravelManager::get_sleeper_train_schedule)?
        .register(routes::GET_TRAFFIC_INFO, manager.clone(), TravelManager::get_traffic_info)?
        .register(guides::GET_TRAVEL_INFO, manager.clone(), TravelManager::get_travel_info)?
        .register(trips::GET_CURRENCY_EXCHANGE, manager.clone(), TravelManager::get_currency_exchange)?
        .register(trips::GET_VISA_REQUIREMENTS, manager.clone(), TravelManager::get_visa_requirements)?
        .register(trips::CALCULATE_TRAVEL_COST, manager.clone(), TravelManager::calculate_travel_cost)?
        .register(trips::GET_WEATHER, manager, TravelManager::get_weather_for_travel)?;
    Ok(())
}
