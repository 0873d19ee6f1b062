// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{BoundingBox, Error, ErrorKind};
use serde_derive::{Deserialize, Serialize};

/// One leg of a route as reported by the routing backend.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    /// Seconds to cross the leg given current traffic.
    pub cross_time: Option<f64>,
    /// Seconds to cross the leg ignoring current traffic.
    pub cross_time_without_real_time: Option<f64>,
    /// Meters.
    pub length: Option<f64>,
    pub path: Option<PathPoint>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RouteResponse {
    #[serde(rename = "routeName", default)]
    pub route_name: String,
    pub results: Vec<PathSegment>,
}

/// Routes returned by one routing request.
///
/// The backend answers a single-path request with a lone route and a
/// multi-path request with a list, even when that list holds only one route.
#[derive(Clone, Debug, PartialEq)]
pub enum Routes {
    Single(RouteResponse),
    Alternatives(Vec<RouteResponse>),
}

impl Routes {
    pub fn into_vec(self) -> Vec<RouteResponse> {
        match self {
            Routes::Single(route) => vec![route],
            Routes::Alternatives(routes) => routes,
        }
    }
}

/// Total time and distance of a route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AggregatedRoute {
    pub time_minutes: f64,
    pub distance_km: f64,
}

/// Adds up the crossing times and lengths of `segments`.
///
/// With `exclude_bounded`, segments whose path point lies strictly inside the
/// start or end box are left out. A missing box excludes nothing.
/// Each box is tested on its own: x inside the start box and y inside the end
/// box does not exclude a segment.
pub fn fold(
    segments: &[PathSegment],
    use_real_time: bool,
    exclude_bounded: bool,
    start_bounds: Option<&BoundingBox>,
    end_bounds: Option<&BoundingBox>,
) -> Result<AggregatedRoute, Error> {
    let mut time = 0.0;
    let mut distance = 0.0;
    for segment in segments {
        if exclude_bounded {
            if let Some(p) = segment.path {
                let inside = start_bounds.into_iter().chain(end_bounds)
                    .any(|b| b.strictly_contains(p.x, p.y));
                if inside {
                    continue;
                }
            }
        }
        let cross_time = if use_real_time {
            segment.cross_time.ok_or_else(|| missing("crossTime"))?
        } else {
            segment.cross_time_without_real_time
                .ok_or_else(|| missing("crossTimeWithoutRealTime"))?
        };
        time += cross_time;
        distance += segment.length.ok_or_else(|| missing("length"))?;
    }
    Ok(AggregatedRoute {
        time_minutes: time / 60.0,
        distance_km: distance / 1000.0,
    })
}

fn missing(field: &str) -> Error {
    Error::new(ErrorKind::BackendFailure,
        format!("Route segment has no {}", field))
}
