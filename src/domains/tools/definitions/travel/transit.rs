//! Public transport departures, line timetables, disruptions and train connections.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::TravelManager;
use crate::core::clock::today;
use crate::core::store::Query;
use crate::core::store::query::{text_contains, text_eq};
use crate::domains::tools::{DomainError, ToolResult, ToolSpec, to_payload};

pub const GET_NEXT_TRAM: ToolSpec = ToolSpec::new(
    "get_next_tram",
    "Get the next tram, bus or metro departures from a Wiener Linien station.",
);

pub const GET_DISRUPTIONS: ToolSpec = ToolSpec::new(
    "get_transport_disruptions",
    "Get current Wiener Linien disruptions and delays, optionally for one line or area.",
);

pub const GET_TRAIN_SCHEDULE: ToolSpec = ToolSpec::new(
    "get_train_schedule",
    "Get ÖBB train connections between two stations for a date (default: today).",
);

pub const GET_TRANSPORT_SCHEDULE: ToolSpec = ToolSpec::new(
    "get_transport_schedule",
    "Get the full day's timetable for a Wiener Linien line at a station (default: today).",
);

/// Minutes until each of the next departures.
const DEPARTURE_OFFSETS: [i64; 3] = [2, 7, 12];

#[derive(Debug, Clone, Serialize)]
struct Disruption {
    line: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    description: &'static str,
    delay_minutes: u32,
    affected_stations: &'static [&'static str],
    start_time: &'static str,
    estimated_end: &'static str,
    alternative_routes: &'static [&'static str],
}

static DISRUPTIONS: &[Disruption] = &[
    Disruption {
        line: "U1",
        kind: "Delay",
        description: "Signal failure at Karlsplatz",
        delay_minutes: 5,
        affected_stations: &["Karlsplatz", "Stephansplatz", "Schwedenplatz"],
        start_time: "08:30",
        estimated_end: "09:15",
        alternative_routes: &["Use U4 from Karlsplatz to Schwedenplatz"],
    },
    Disruption {
        line: "74A",
        kind: "Detour",
        description: "Road construction on Favoritenstraße",
        delay_minutes: 10,
        affected_stations: &["Favoritenstraße", "Gudrunstraße"],
        start_time: "07:00",
        estimated_end: "18:00",
        alternative_routes: &["Use 6 tram to reach destination"],
    },
];

/// Weekday rush hours as minutes after midnight, end exclusive.
const PEAK_HOURS: [(u32, u32); 2] = [(6 * 60 + 30, 9 * 60), (16 * 60, 19 * 60)];

struct Timetable {
    line: &'static str,
    termini: [&'static str; 2],
    first: u32,
    last: u32,
    peak_headway: u32,
    offpeak_headway: u32,
}

const fn hm(hour: u32, minute: u32) -> u32 {
    hour * 60 + minute
}

static TIMETABLES: &[Timetable] = &[
    Timetable { line: "U1", termini: ["Leopoldau", "Oberlaa"], first: hm(5, 0), last: hm(23, 55), peak_headway: 4, offpeak_headway: 7 },
    Timetable { line: "U2", termini: ["Seestadt", "Schottentor"], first: hm(5, 0), last: hm(23, 55), peak_headway: 5, offpeak_headway: 8 },
    Timetable { line: "U3", termini: ["Ottakring", "Simmering"], first: hm(5, 0), last: hm(23, 55), peak_headway: 4, offpeak_headway: 7 },
    Timetable { line: "U4", termini: ["Heiligenstadt", "Hütteldorf"], first: hm(5, 0), last: hm(23, 55), peak_headway: 4, offpeak_headway: 7 },
    Timetable { line: "U6", termini: ["Floridsdorf", "Siebenhirten"], first: hm(5, 0), last: hm(23, 55), peak_headway: 5, offpeak_headway: 8 },
    Timetable { line: "1", termini: ["Prater Hauptallee", "Stefan-Fadinger-Platz"], first: hm(5, 15), last: hm(23, 45), peak_headway: 8, offpeak_headway: 10 },
    Timetable { line: "13A", termini: ["Hauptbahnhof", "Alser Straße"], first: hm(5, 30), last: hm(23, 30), peak_headway: 5, offpeak_headway: 8 },
    Timetable { line: "74A", termini: ["Landstraße", "St. Marx"], first: hm(5, 30), last: hm(23, 30), peak_headway: 7, offpeak_headway: 10 },
];

impl Timetable {
    fn headway(&self, minute: u32, weekday: bool) -> u32 {
        let peak = weekday && PEAK_HOURS.iter().any(|&(from, to)| (from..to).contains(&minute));
        if peak { self.peak_headway } else { self.offpeak_headway }
    }

    /// Departure times from first to last service for one day.
    fn departures(&self, weekday: bool) -> Vec<String> {
        let mut times = Vec::new();
        let mut minute = self.first;
        while minute <= self.last {
            times.push(format!("{:02}:{:02}", minute / 60, minute % 60));
            minute += self.headway(minute, weekday);
        }
        times
    }
}

fn default_departures() -> usize {
    3
}

/// Parameters for `get_next_tram`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TramParams {
    /// Name of the station or stop.
    pub station_name: String,

    /// Line number, e.g. "U6" or "13A".
    pub line: Option<String>,

    /// Travel direction (terminus).
    pub direction: Option<String>,

    /// Maximum departures to return.
    #[serde(default = "default_departures")]
    pub limit: usize,
}

/// Parameters for `get_transport_schedule`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TransportScheduleParams {
    /// Line number, e.g. "U6", "1" or "74A".
    pub line_number: String,

    /// Station on the line.
    pub station_name: String,

    /// Service date (YYYY-MM-DD). Defaults to today.
    #[schemars(with = "Option<String>")]
    pub date: Option<NaiveDate>,
}

/// Parameters for `get_transport_disruptions`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DisruptionParams {
    /// Line to check (exact match).
    pub line: Option<String>,

    /// Station or area name (case-insensitive substring of affected stations).
    pub area: Option<String>,
}

/// Parameters for `get_train_schedule`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TrainScheduleParams {
    /// Departure station.
    pub from_station: String,

    /// Arrival station.
    pub to_station: String,

    /// Travel date (YYYY-MM-DD). Defaults to today.
    #[schemars(with = "Option<String>")]
    pub date: Option<NaiveDate>,
}

impl TravelManager {
    pub async fn get_next_tram(self: Arc<Self>, params: TramParams) -> ToolResult {
        let now = self.clock.local();
        let line = params.line.unwrap_or_else(|| "U6".to_string());
        let direction = params.direction.unwrap_or_else(|| "Floridsdorf".to_string());

        let departures: Vec<_> = DEPARTURE_OFFSETS
            .iter()
            .take(params.limit)
            .map(|&minutes| {
                json!({
                    "line": line,
                    "direction": direction,
                    "station": params.station_name,
                    "departure_time": (now + Duration::minutes(minutes)).format("%H:%M").to_string(),
                    "minutes_until": minutes,
                    "platform": "A",
                    "delay_minutes": 0,
                    "is_realtime": false,
                })
            })
            .collect();

        info!("Retrieved {} departures from {}", departures.len(), params.station_name);
        Ok(json!(departures))
    }

    pub async fn get_transport_schedule(self: Arc<Self>, params: TransportScheduleParams) -> ToolResult {
        let timetable = TIMETABLES
            .iter()
            .find(|t| text_eq(t.line, params.line_number.trim()))
            .ok_or_else(|| DomainError::not_found(format!("No timetable for line {}", params.line_number)))?;

        let date = params.date.unwrap_or_else(|| today(self.clock.as_ref()));
        let weekday = !matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let departures = timetable.departures(weekday);

        let frequency = if weekday {
            format!(
                "Every {} minutes (peak), every {} minutes (off-peak)",
                timetable.peak_headway, timetable.offpeak_headway
            )
        } else {
            format!("Every {} minutes", timetable.offpeak_headway)
        };
        let directions: Vec<_> = timetable
            .termini
            .iter()
            .map(|terminus| json!({ "direction": terminus, "departures": departures }))
            .collect();

        info!(
            "Retrieved {} departures per direction for {} at {}",
            departures.len(),
            timetable.line,
            params.station_name
        );
        Ok(json!({
            "line": timetable.line,
            "station": params.station_name,
            "date": date,
            "day_type": if weekday { "weekday" } else { "weekend" },
            "first_departure": departures.first(),
            "last_departure": departures.last(),
            "frequency": frequency,
            "directions": directions,
        }))
    }

    pub async fn get_transport_disruptions(self: Arc<Self>, params: DisruptionParams) -> ToolResult {
        let disruptions = Query::new()
            .filter_opt(params.line, |d: &Disruption, line| d.line == line.as_str())
            .filter_opt(params.area, |d: &Disruption, area| {
                d.affected_stations.iter().any(|s| text_contains(s, area))
            })
            .apply(DISRUPTIONS);

        info!("Retrieved {} transport disruptions", disruptions.len());
        to_payload(&disruptions)
    }

    pub async fn get_train_schedule(self: Arc<Self>, params: TrainScheduleParams) -> ToolResult {
        if params.from_station.trim().eq_ignore_ascii_case(params.to_station.trim()) {
            return Err(DomainError::validation(
                "from_station and to_station must be different",
            ));
        }

        let date = params.date.unwrap_or_else(|| today(self.clock.as_ref()));
        let connections = json!([
            {
                "type": "Railjet",
                "date": date,
                "departure": { "station": params.from_station, "time": "08:30", "platform": "3" },
                "arrival": { "station": params.to_station, "time": "10:45", "platform": "2" },
                "duration": "2h 15min",
                "changes": 0,
                "price": 42.50,
                "class": "Economy",
                "amenities": ["WiFi", "Power outlets", "Restaurant"],
            },
            {
                "type": "Regional Express",
                "date": date,
                "departure": { "station": params.from_station, "time": "09:15", "platform": "7" },
                "arrival": { "station": params.to_station, "time": "11:42", "platform": "1" },
                "duration": "2h 27min",
                "changes": 1,
                "price": 28.90,
                "class": "Economy",
                "amenities": ["WiFi"],
            },
        ]);

        info!(
            "Retrieved train connections from {} to {}",
            params.from_station, params.to_station
        );
        Ok(connections)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::manager;
    use super::*;

    #[tokio::test]
    async fn test_departures_follow_the_clock() {
        let params = TramParams {
            station_name: "Westbahnhof".into(),
            line: Some("U3".into()),
            direction: None,
            limit: 2,
        };
        let departures = manager().get_next_tram(params).await.unwrap();
        let departures = departures.as_array().unwrap();
        assert_eq!(departures.len(), 2);
        assert_eq!(departures[0]["line"], "U3");
        assert_eq!(departures[0]["minutes_until"], 2);
        assert_eq!(departures[1]["minutes_until"], 7);
    }

    #[tokio::test]
    async fn test_weekday_schedule_tightens_in_rush_hour() {
        let params = TransportScheduleParams {
            line_number: "u6".into(),
            station_name: "Westbahnhof".into(),
            date: None,
        };
        let schedule = manager().get_transport_schedule(params).await.unwrap();
        assert_eq!(schedule["line"], "U6");
        assert_eq!(schedule["date"], "2025-01-10");
        assert_eq!(schedule["day_type"], "weekday");
        assert_eq!(schedule["first_departure"], "05:00");
        assert_eq!(schedule["directions"][0]["direction"], "Floridsdorf");

        let times = schedule["directions"][1]["departures"].as_array().unwrap();
        assert_eq!(times[1], "05:08");
        assert_eq!(times[12], "06:36");
        assert_eq!(times[13], "06:41");
        assert!(times.last().unwrap().as_str().unwrap() <= "23:55");
    }

    #[tokio::test]
    async fn test_weekend_schedule_uses_offpeak_headway() {
        let params = TransportScheduleParams {
            line_number: "U6".into(),
            station_name: "Westbahnhof".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 11),
        };
        let schedule = manager().get_transport_schedule(params).await.unwrap();
        assert_eq!(schedule["day_type"], "weekend");
        assert_eq!(schedule["frequency"], "Every 8 minutes");
        assert_eq!(schedule["directions"][0]["departures"][13], "06:44");
    }

    #[tokio::test]
    async fn test_unknown_line_has_no_timetable() {
        let params = TransportScheduleParams {
            line_number: "U5".into(),
            station_name: "Karlsplatz".into(),
            date: None,
        };
        let result = manager().get_transport_schedule(params).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_disruptions_filter_by_exact_line() {
        let params = DisruptionParams {
            line: Some("74A".into()),
            area: None,
        };
        let found = manager().get_transport_disruptions(params).await.unwrap();
        assert_eq!(found.as_array().unwrap().len(), 1);

        let params = DisruptionParams {
            line: Some("74a".into()),
            area: None,
        };
        let none = manager().get_transport_disruptions(params).await.unwrap();
        assert!(none.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disruptions_filter_by_area() {
        let params = DisruptionParams {
            line: None,
            area: Some("karlsplatz".into()),
        };
        let found = manager().get_transport_disruptions(params).await.unwrap();
        assert_eq!(found[0]["line"], "U1");
    }

    #[tokio::test]
    async fn test_train_schedule_defaults_to_today() {
        let params = TrainScheduleParams {
            from_station: "Wien Hbf".into(),
            to_station: "Salzburg Hbf".into(),
            date: None,
        };
        let trains = manager().get_train_schedule(params).await.unwrap();
        assert_eq!(trains[0]["date"], "2025-01-10");
        assert_eq!(trains[1]["changes"], 1);
    }
}
