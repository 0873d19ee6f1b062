// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

//! Route time and distance from the Waze live map endpoints.
//!
//! A [`RouteCalculator`] resolves its start and end addresses once, when it
//! is built, and then asks the routing backend for one or more routes between
//! them. Every call blocks until the backend has answered.

#![deny(warnings)]

mod calculator;
mod client;
mod config;
mod err;
mod protocol;
mod region;
mod route;
mod travel_time;

pub use crate::calculator::{CalculatorBuilder, RouteCalculator, resolve};
use crate::client::Client;
pub use crate::config::TravelTimeConfig;
pub use crate::err::{Error, ErrorKind};
use crate::protocol::{Protocol, ProtocolRouting, ProtocolSearch, RouteQuery};
pub use crate::region::{Anchor, Region};
pub use crate::route::{AggregatedRoute, PathPoint, PathSegment, RouteResponse,
    Routes, fold};
pub use crate::travel_time::{RouteFilter, TravelTime, TravelTimeAttributes,
    TravelTimeSensor, repair_route_name};

use serde_derive::{Deserialize, Serialize};

/// Longitude and latitude in degrees, with the extent of the matched place
/// when the geocoder reports one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
    pub bounds: Option<BoundingBox>,
}

/// Rectangle in longitude/latitude space.
///
/// Boxes built through [`BoundingBox::normalized`] always satisfy
/// `top >= bottom` and `left <= right`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct BoundingBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl BoundingBox {
    /// Reorders the edges, the geocoder sometimes reports them swapped.
    pub fn normalized(self) -> Self {
        BoundingBox {
            top: self.top.max(self.bottom),
            bottom: self.top.min(self.bottom),
            left: self.left.min(self.right),
            right: self.left.max(self.right),
        }
    }

    /// Whether the point lies strictly inside the box on both axes.
    pub fn strictly_contains(&self, x: f64, y: f64) -> bool {
        between(x, self.left, self.right) && between(y, self.bottom, self.top)
    }
}

fn between(target: f64, min: f64, max: f64) -> bool {
    target > min && target < max
}
