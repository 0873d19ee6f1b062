// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{AggregatedRoute, Error, ErrorKind, RouteCalculator,
    TravelTimeConfig};
use serde_derive::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Case-insensitive route name filter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteFilter {
    /// Keep only routes whose name contains this.
    pub include: Option<String>,
    /// Drop routes whose name contains this.
    pub exclude: Option<String>,
}

impl RouteFilter {
    pub fn apply(&self, routes: BTreeMap<String, AggregatedRoute>)
        -> BTreeMap<String, AggregatedRoute>
    {
        let include = self.include.as_ref().map(|s| s.to_lowercase());
        let exclude = self.exclude.as_ref().map(|s| s.to_lowercase());
        routes.into_iter()
            .filter(|(name, _)| {
                let name = name.to_lowercase();
                include.as_ref().map_or(true, |inc| name.contains(inc.as_str()))
                    && exclude.as_ref()
                        .map_or(true, |exc| !name.contains(exc.as_str()))
            })
            .collect()
    }
}

/// Undoes the Latin-1 decoding the backend applies to UTF-8 route names.
///
/// Names that do not round-trip are returned unchanged.
pub fn repair_route_name(name: &str) -> String {
    let bytes = name.chars()
        .map(|c| if (c as u32) <= 0xff { Some(c as u8) } else { None })
        .collect::<Option<Vec<u8>>>();
    bytes
        .and_then(|b| String::from_utf8(b).ok())
        .unwrap_or_else(|| name.to_string())
}

/// Fastest route found by the last successful update.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TravelTime {
    /// Minutes.
    pub duration: f64,
    /// Kilometers.
    pub distance: f64,
    pub route: String,
}

impl TravelTime {
    /// Route with the smallest time. Ties go to the name that sorts first.
    pub fn fastest(routes: &BTreeMap<String, AggregatedRoute>)
        -> Option<TravelTime>
    {
        routes.iter()
            .min_by(|(_, a), (_, b)| {
                a.time_minutes.partial_cmp(&b.time_minutes)
                    .unwrap_or(Ordering::Equal)
            })
            .map(|(name, info)| TravelTime {
                duration: info.time_minutes,
                distance: info.distance_km,
                route: repair_route_name(name),
            })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TravelTimeAttributes {
    pub attribution: &'static str,
    pub duration: f64,
    pub distance: f64,
    pub route: String,
}

fn round_half_even(v: f64) -> f64 {
    let r = v.round();
    if (v - v.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
        r - v.signum()
    } else {
        r
    }
}

const ATTRIBUTION: &str = "Data provided by the Waze.com";

/// Periodically refreshed travel time between two places.
#[derive(Debug)]
pub struct TravelTimeSensor {
    config: TravelTimeConfig,
    state: Option<TravelTime>,
    last_update: Option<Instant>,
}

impl TravelTimeSensor {
    /// Minimum delay between two backend queries.
    pub const SCAN_INTERVAL: Duration = Duration::from_secs(5 * 60);

    pub fn new(config: TravelTimeConfig) -> Self {
        TravelTimeSensor {config, state: None, last_update: None}
    }

    pub fn name(&self) -> &str {&self.config.name}
    pub fn unit_of_measurement(&self) -> &'static str {"min"}
    pub fn icon(&self) -> &'static str {"mdi:car"}
    pub fn travel_time(&self) -> Option<&TravelTime> {self.state.as_ref()}

    /// Duration of the fastest route, rounded to whole minutes, halves to
    /// even.
    pub fn state(&self) -> Option<i64> {
        self.state.as_ref().map(|s| round_half_even(s.duration) as i64)
    }

    pub fn attributes(&self) -> Option<TravelTimeAttributes> {
        self.state.as_ref().map(|s| TravelTimeAttributes {
            attribution: ATTRIBUTION,
            duration: s.duration,
            distance: s.distance,
            route: s.route.clone(),
        })
    }

    /// Refreshes the state unless the last refresh is more recent than
    /// [`SCAN_INTERVAL`](Self::SCAN_INTERVAL).
    pub fn update(&mut self) -> Result<(), Error> {
        match self.last_update {
            Some(t) if t.elapsed() < Self::SCAN_INTERVAL => Ok(()),
            _ => self.force_update(),
        }
    }

    /// Refreshes the state now. A failed refresh keeps the previous state.
    pub fn force_update(&mut self) -> Result<(), Error> {
        self.last_update = Some(Instant::now());
        match self.fetch() {
            Ok(travel_time) => {
                self.state = Some(travel_time);
                Ok(())
            }
            Err(e) => {
                log::error!("Error on retrieving data: {}", e);
                Err(e)
            }
        }
    }

    fn fetch(&self) -> Result<TravelTime, Error> {
        let config = &self.config;
        let mut builder = RouteCalculator::builder(&config.origin,
            &config.destination)
            .region(config.region);
        if let Some(url) = &config.base_url {
            builder = builder.base_url(url);
        }
        let routes = builder.build()?.calc_all_routes_info(3, true, false, 0)?;
        let routes = config.filter().apply(routes);
        TravelTime::fastest(&routes)
            .ok_or_else(|| ErrorKind::RoutingFailure(
                "No route matches the configured filters".to_string()).into())
    }
}
