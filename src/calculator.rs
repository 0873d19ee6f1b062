// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{AggregatedRoute, Client, Coordinates, Error, ErrorKind,
    ProtocolRouting, ProtocolSearch, Region, RouteQuery, RouteResponse, Routes,
    fold};
use log::{Level, LevelFilter};
use std::collections::BTreeMap;
use url::Url;

/// Geocodes `address`, biasing the search towards `region`.
pub fn resolve(address: &str, region: Region) -> Result<Coordinates, Error> {
    let base = Url::parse(CalculatorBuilder::DEFAULT_BASE_URL)?;
    resolve_with(&base, address, region)
}

fn resolve_with(base: &Url, address: &str, region: Region)
    -> Result<Coordinates, Error>
{
    if address.trim().is_empty() {
        return Err(Error::new(ErrorKind::BadRequest, "Empty address"));
    }
    let client = Client::new(ProtocolSearch::new(base.clone(), region));
    client.fetch_blocking(address.to_string())
        .map_err(Error::into_resolution)
}

#[derive(Clone, Debug)]
pub struct CalculatorBuilder {
    start: String,
    end: String,
    region: Region,
    base_url: String,
    log_level: LevelFilter,
}

impl CalculatorBuilder {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.waze.com/";

    pub fn new(start: &str, end: &str) -> Self {
        CalculatorBuilder {
            start: start.to_string(),
            end: end.to_string(),
            region: Region::default(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            log_level: LevelFilter::Info,
        }
    }

    pub fn region(mut self, r: Region) -> Self {
        self.region = r;
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Most verbose level this calculator logs at. `None` keeps only
    /// warnings and errors.
    pub fn log_level(mut self, level: Option<Level>) -> Self {
        self.log_level = level.map_or(LevelFilter::Warn, |l| l.to_level_filter());
        self
    }

    /// Resolves both addresses and returns a calculator bound to them.
    pub fn build(self) -> Result<RouteCalculator, Error> {
        let mut base_url = self.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)?;
        let calc_log = self.log_level;
        if Level::Info <= calc_log {
            log::info!("From: {} - to: {}", self.start, self.end);
        }
        let start = resolve_with(&base, &self.start, self.region)?;
        if Level::Debug <= calc_log {
            log::debug!("Start coords: ({}, {})", start.longitude,
                start.latitude);
        }
        let end = resolve_with(&base, &self.end, self.region)?;
        if Level::Debug <= calc_log {
            log::debug!("End coords: ({}, {})", end.longitude, end.latitude);
        }
        Ok(RouteCalculator {
            routing: Client::new(ProtocolRouting::new(base, self.region)),
            region: self.region,
            start,
            end,
            log_level: calc_log,
        })
    }
}

/// Route calculator between two addresses resolved once, at build time.
#[derive(Debug)]
pub struct RouteCalculator {
    routing: Client<ProtocolRouting>,
    region: Region,
    start: Coordinates,
    end: Coordinates,
    log_level: LevelFilter,
}

impl RouteCalculator {
    pub fn builder(start: &str, end: &str) -> CalculatorBuilder {
        CalculatorBuilder::new(start, end)
    }

    pub fn new(start: &str, end: &str, region: Region) -> Result<Self, Error> {
        Self::builder(start, end).region(region).build()
    }

    pub fn region(&self) -> Region {self.region}
    pub fn start(&self) -> &Coordinates {&self.start}
    pub fn end(&self) -> &Coordinates {&self.end}

    /// Asks the backend for up to `n_paths` routes departing `time_delta`
    /// from now.
    pub fn get_routes(&self, n_paths: u32, time_delta: i64)
        -> Result<Routes, Error>
    {
        let query = RouteQuery {
            from: self.start,
            to: self.end,
            n_paths,
            time_delta,
        };
        self.routing.fetch_blocking(query)
    }

    /// Time and distance of the best route.
    pub fn calc_route_info(
        &self,
        use_real_time: bool,
        stop_at_bounds: bool,
        time_delta: i64,
    ) -> Result<AggregatedRoute, Error> {
        let route = match self.get_routes(1, time_delta)? {
            Routes::Single(route) => route,
            Routes::Alternatives(routes) => routes.into_iter().next()
                .ok_or_else(|| Error::new(ErrorKind::BackendFailure,
                    "Routing reply has no route"))?,
        };
        let info = self.fold_route(&route, use_real_time, stop_at_bounds)?;
        if Level::Info <= self.log_level {
            log::info!("Time {:.2} minutes, distance {:.2} km.",
                info.time_minutes, info.distance_km);
        }
        Ok(info)
    }

    /// Time and distance of every alternative route, keyed by route name.
    ///
    /// Alternatives sharing a name overwrite each other, the last one wins.
    pub fn calc_all_routes_info(
        &self,
        n_paths: u32,
        use_real_time: bool,
        stop_at_bounds: bool,
        time_delta: i64,
    ) -> Result<BTreeMap<String, AggregatedRoute>, Error> {
        let routes = self.get_routes(n_paths, time_delta)?;
        let mut infos = BTreeMap::new();
        for route in routes.into_vec() {
            let info = self.fold_route(&route, use_real_time, stop_at_bounds)?;
            infos.insert(route.route_name, info);
        }
        if Level::Info <= self.log_level && !infos.is_empty() {
            let (t_min, t_max) = range(infos.values().map(|r| r.time_minutes));
            let (d_min, d_max) = range(infos.values().map(|r| r.distance_km));
            log::info!("Time {:.2} - {:.2} minutes, distance {:.2} - {:.2} km.",
                t_min, t_max, d_min, d_max);
        }
        Ok(infos)
    }

    fn fold_route(
        &self,
        route: &RouteResponse,
        use_real_time: bool,
        stop_at_bounds: bool,
    ) -> Result<AggregatedRoute, Error> {
        fold(&route.results, use_real_time, stop_at_bounds,
            self.start.bounds.as_ref(), self.end.bounds.as_ref())
    }
}

fn range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), v| (lo.min(v), hi.max(v)))
}
