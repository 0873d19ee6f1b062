// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{BoundingBox, Coordinates, Error, ErrorKind, Protocol, Region};
use hyper::{Body, Request};
use serde_derive::Deserialize;
use url::Url;

#[derive(Clone, Debug)]
pub(crate) struct ProtocolSearch {
    base: Url,
    region: Region,
}

const SEARCH_PATH: &str = "SearchServer/mozi";

impl ProtocolSearch {
    pub(crate) fn new(base: Url, region: Region) -> Self {
        ProtocolSearch {base, region}
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    location: Option<Location>,
    #[serde(default)]
    bounds: Option<BoundingBox>,
}

#[derive(Debug, Deserialize)]
struct Location {
    lon: f64,
    lat: f64,
}

impl Protocol for ProtocolSearch {
    type Query = String;
    type Output = Coordinates;

    fn request(&self, address: &String) -> Result<Request<Body>, Error> {
        let anchor = self.region.anchor();
        let mut url = self.base.join(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("lang", "eng")
            .append_pair("origin", "livemap")
            .append_pair("lon", &anchor.lon.to_string())
            .append_pair("lat", &anchor.lat.to_string());
        Request::builder().uri(url.as_str()).body(Body::empty())
            .map_err(|e| Error::new(ErrorKind::BadRequest, e))
    }

    fn parse(&self, address: &String, body: &[u8])
        -> Result<Coordinates, Error>
    {
        let results = serde_json::from_slice::<Vec<SearchResult>>(body)?;
        let first = results.into_iter().next()
            .ok_or_else(|| Error::new(ErrorKind::LocationNotFound,
                format!("No search result for {:?}", address)))?;
        let location = first.location
            .ok_or_else(|| Error::new(ErrorKind::LocationNotFound,
                format!("Search result for {:?} has no location", address)))?;
        Ok(Coordinates {
            longitude: location.lon,
            latitude: location.lat,
            bounds: first.bounds.map(BoundingBox::normalized),
        })
    }
}
