// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{Coordinates, Error, ErrorKind, Protocol, Region, RouteResponse,
    Routes};
use hyper::{Body, Request};
use serde_derive::Deserialize;
use url::Url;

#[derive(Clone, Debug)]
pub(crate) struct ProtocolRouting {
    base: Url,
    region: Region,
}

/// Server-side timeout hint, in milliseconds. Not enforced locally.
const TIMEOUT_HINT_MS: u32 = 60_000;
const REFERER: &str = "https://www.waze.com";

#[derive(Clone, Copy, Debug)]
pub(crate) struct RouteQuery {
    pub(crate) from: Coordinates,
    pub(crate) to: Coordinates,
    pub(crate) n_paths: u32,
    pub(crate) time_delta: i64,
}

impl ProtocolRouting {
    pub(crate) fn new(base: Url, region: Region) -> Self {
        ProtocolRouting {base, region}
    }
}

#[derive(Debug, Deserialize)]
struct RoutingReply {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    alternatives: Option<Vec<Alternative>>,
    #[serde(default)]
    response: Option<RouteResponse>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    response: RouteResponse,
}

fn waypoint(c: &Coordinates) -> String {
    format!("x:{} y:{}", c.longitude, c.latitude)
}

impl Protocol for ProtocolRouting {
    type Query = RouteQuery;
    type Output = Routes;

    fn request(&self, query: &RouteQuery) -> Result<Request<Body>, Error> {
        let mut url = self.base.join(self.region.routing_path())?;
        url.query_pairs_mut()
            .append_pair("from", &waypoint(&query.from))
            .append_pair("to", &waypoint(&query.to))
            .append_pair("at", &query.time_delta.to_string())
            .append_pair("returnJSON", "true")
            .append_pair("returnGeometries", "true")
            .append_pair("returnInstructions", "true")
            .append_pair("timeout", &TIMEOUT_HINT_MS.to_string())
            .append_pair("nPaths", &query.n_paths.to_string())
            .append_pair("options", "AVOID_TRAILS:t");
        Request::builder()
            .uri(url.as_str())
            .header(hyper::header::REFERER, REFERER)
            .body(Body::empty())
            .map_err(|e| Error::new(ErrorKind::BadRequest, e))
    }

    fn parse(&self, query: &RouteQuery, body: &[u8]) -> Result<Routes, Error> {
        decode_routes(body, query.n_paths)
    }
}

/// Whether a reply field counts as present. Null, false, zero and empty
/// values do not.
fn is_set(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Reads a routing reply.
///
/// Alternatives win whenever the backend sends any, whatever was asked for.
/// Otherwise the lone response is wrapped in a list only if several paths
/// were requested.
fn decode_routes(body: &[u8], n_paths: u32) -> Result<Routes, Error> {
    let reply = serde_json::from_slice::<RoutingReply>(body)?;
    if let Some(error) = reply.error.filter(is_set) {
        let msg = match error {
            serde_json::Value::String(msg) => msg,
            other => other.to_string(),
        };
        return Err(ErrorKind::RoutingFailure(msg).into());
    }
    if let Some(alternatives) = reply.alternatives
        .filter(|alts| !alts.is_empty())
    {
        let routes = alternatives.into_iter().map(|alt| alt.response).collect();
        return Ok(Routes::Alternatives(routes));
    }
    let response = reply.response
        .ok_or_else(|| Error::new(ErrorKind::BackendFailure,
            "Routing reply has no response"))?;
    if n_paths > 1 {
        Ok(Routes::Alternatives(vec![response]))
    } else {
        Ok(Routes::Single(response))
    }
}
