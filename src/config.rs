// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{Region, RouteFilter};
use serde_derive::{Deserialize, Serialize};
use std::io::Read;

/// Settings of a [`TravelTimeSensor`](crate::TravelTimeSensor).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TravelTimeConfig {
    pub origin: String,
    pub destination: String,
    pub region: Region,
    #[serde(default = "TravelTimeConfig::default_name")]
    pub name: String,
    #[serde(default)]
    pub incl_filter: Option<String>,
    #[serde(default)]
    pub excl_filter: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl TravelTimeConfig {
    pub const DEFAULT_NAME: &'static str = "Waze Travel Time";

    fn default_name() -> String {
        Self::DEFAULT_NAME.to_string()
    }

    pub fn new(origin: &str, destination: &str, region: Region) -> Self {
        TravelTimeConfig {
            origin: origin.to_string(),
            destination: destination.to_string(),
            region,
            name: Self::default_name(),
            incl_filter: None,
            excl_filter: None,
            base_url: None,
        }
    }

    pub fn from_config<R: Read>(config: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(config)
    }

    pub fn filter(&self) -> RouteFilter {
        RouteFilter {
            include: self.incl_filter.clone(),
            exclude: self.excl_filter.clone(),
        }
    }
}
