// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{Error, ErrorKind};
use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, self};
use std::str::FromStr;

/// Routing backend and geocoding bias selector.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "String")]
pub enum Region {
    US = 0,
    EU = 1,
    IL = 2,
}

/// Point a region's address searches are biased towards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub lon: f64,
    pub lat: f64,
}

// Both tables are indexed by the `Region` discriminant.
const ANCHORS: [Anchor; 3] = [
    Anchor {lon: -74.006, lat: 40.713},
    Anchor {lon: 19.040, lat: 47.498},
    Anchor {lon: 35.214, lat: 31.768},
];

const ROUTING_PATHS: [&str; 3] = [
    "RoutingManager/routingRequest",
    "row-RoutingManager/routingRequest",
    "il-RoutingManager/routingRequest",
];

impl Region {
    pub fn anchor(self) -> Anchor {
        ANCHORS[self as usize]
    }

    /// Path of the routing endpoint, relative to the base host.
    pub fn routing_path(self) -> &'static str {
        ROUTING_PATHS[self as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::US => "US",
            Region::EU => "EU",
            Region::IL => "IL",
        }
    }
}

impl Default for Region {
    fn default() -> Self {Region::EU}
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_uppercase().as_str() {
            "US" | "NA" => Ok(Region::US),
            "EU" => Ok(Region::EU),
            "IL" => Ok(Region::IL),
            _ => Err(Error::new(ErrorKind::BadRequest,
                format!("Unknown region {:?}", s))),
        }
    }
}

impl TryFrom<String> for Region {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}
