// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use futures::Future;
use hyper::service::service_fn_ok;
use hyper::{Body, Request, Response, Server, StatusCode};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use waze_route::{AggregatedRoute, BoundingBox, ErrorKind, Region,
    RouteCalculator, Routes, TravelTimeConfig, TravelTimeSensor};

/// Fake live map backend. Records every request it receives.
#[derive(Clone, Default)]
struct Stub {
    searches: Arc<AtomicUsize>,
    routings: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

const BUDAPEST: &str = r#"[{
    "name": "Budapest",
    "location": {"lon": 19.04, "lat": 47.5},
    "bounds": {"top": 47.4, "bottom": 47.6, "left": 19.2, "right": 18.9}
}]"#;

const VIENNA: &str = r#"[{
    "name": "Vienna",
    "location": {"lon": 16.37, "lat": 48.21},
    "bounds": null
}]"#;

const SINGLE_ROUTE: &str = r#"{
    "response": {
        "routeName": "M1",
        "results": [
            {"crossTime": 120, "crossTimeWithoutRealTime": 60, "length": 1000,
             "path": {"x": 19.0, "y": 47.5}},
            {"crossTime": 180, "crossTimeWithoutRealTime": 120, "length": 2000,
             "path": {"x": 18.0, "y": 47.9}}
        ]
    }
}"#;

const ALTERNATIVES: &str = r#"{
    "alternatives": [
        {"response": {"routeName": "M1", "results": [
            {"crossTime": 600, "crossTimeWithoutRealTime": 540,
             "length": 10000}
        ]}},
        {"response": {"routeName": "M7 StraÃ\u009fe", "results": [
            {"crossTime": 540, "crossTimeWithoutRealTime": 600,
             "length": 12000}
        ]}}
    ]
}"#;

const DUPLICATE_NAMES: &str = r#"{
    "alternatives": [
        {"response": {"routeName": "M1", "results": [
            {"crossTime": 600, "crossTimeWithoutRealTime": 540,
             "length": 10000}
        ]}},
        {"response": {"routeName": "M1", "results": [
            {"crossTime": 900, "crossTimeWithoutRealTime": 840,
             "length": 15000}
        ]}}
    ]
}"#;

impl Stub {
    fn start(self) -> SocketAddr {
        let addr: SocketAddr = ([127, 0, 0, 1], 0).into();
        let stub = self.clone();
        let server = Server::bind(&addr)
            .serve(move || {
                let stub = stub.clone();
                service_fn_ok(move |req: Request<Body>| stub.reply(req))
            });
        let local = server.local_addr();
        std::thread::spawn(move || {
            hyper::rt::run(server.map_err(|e| eprintln!("Stub error: {}", e)));
        });
        local
    }

    fn reply(&self, req: Request<Body>) -> Response<Body> {
        let query = url::form_urlencoded::parse(
            req.uri().query().unwrap_or("").as_bytes())
            .into_owned()
            .collect::<HashMap<_, _>>();
        let path = req.uri().path().to_string();
        let body = match path.as_str() {
            "/SearchServer/mozi" => {
                self.searches.fetch_add(1, Ordering::SeqCst);
                match query.get("q").map(|q| q.as_str()) {
                    Some("Budapest") => BUDAPEST,
                    Some("Vienna") => VIENNA,
                    Some("Broken") => return status(StatusCode::BAD_GATEWAY),
                    _ => "[]",
                }
            }
            _ => {
                let referer = req.headers().get(hyper::header::REFERER)
                    .and_then(|r| r.to_str().ok())
                    .map(str::to_string)
                    .unwrap_or_default();
                let mut query = query;
                query.insert("referer".to_string(), referer);
                let n_paths = query.get("nPaths").cloned().unwrap_or_default();
                let at = query.get("at").cloned().unwrap_or_default();
                self.routings.lock().unwrap().push((path.clone(), query));
                match (n_paths.as_str(), at.as_str()) {
                    (_, "999") => r#"{"error": "Internal routing error"}"#,
                    ("1", _) | ("4", _) => SINGLE_ROUTE,
                    ("5", _) => DUPLICATE_NAMES,
                    _ => ALTERNATIVES,
                }
            }
        };
        Response::new(Body::from(body))
    }
}

fn status(code: StatusCode) -> Response<Body> {
    let mut resp = Response::new(Body::from("upstream down"));
    *resp.status_mut() = code;
    resp
}

fn calculator(stub: &Stub, region: Region) -> RouteCalculator {
    let addr = stub.clone().start();
    RouteCalculator::builder("Budapest", "Vienna")
        .region(region)
        .base_url(&format!("http://{}", addr))
        .build()
        .unwrap()
}

#[test]
fn resolves_both_addresses_once() {
    let stub = Stub::default();
    let calc = calculator(&stub, Region::EU);
    assert_eq!(calc.start().longitude, 19.04);
    assert_eq!(calc.start().bounds, Some(BoundingBox {
        top: 47.6,
        bottom: 47.4,
        left: 18.9,
        right: 19.2,
    }));
    assert_eq!(calc.end().bounds, None);
    calc.calc_route_info(true, false, 0).unwrap();
    calc.calc_all_routes_info(3, true, false, 0).unwrap();
    assert_eq!(stub.searches.load(Ordering::SeqCst), 2);
}

#[test]
fn route_info_sums_single_route() {
    let stub = Stub::default();
    let calc = calculator(&stub, Region::EU);
    let info = calc.calc_route_info(true, false, 0).unwrap();
    assert_eq!(info, AggregatedRoute {time_minutes: 5.0, distance_km: 3.0});
    let scheduled = calc.calc_route_info(false, false, 0).unwrap();
    assert_eq!(scheduled.time_minutes, 3.0);
}

#[test]
fn route_info_can_skip_segments_inside_start_area() {
    let stub = Stub::default();
    let calc = calculator(&stub, Region::EU);
    let info = calc.calc_route_info(true, true, 0).unwrap();
    assert_eq!(info, AggregatedRoute {time_minutes: 3.0, distance_km: 2.0});
}

#[test]
fn routing_request_carries_expected_parameters() {
    let stub = Stub::default();
    let calc = calculator(&stub, Region::US);
    calc.calc_route_info(true, false, 30).unwrap();
    let requests = stub.routings.lock().unwrap();
    let (path, query) = &requests[0];
    assert_eq!(path, "/RoutingManager/routingRequest");
    assert_eq!(query["from"], "x:19.04 y:47.5");
    assert_eq!(query["to"], "x:16.37 y:48.21");
    assert_eq!(query["at"], "30");
    assert_eq!(query["nPaths"], "1");
    assert_eq!(query["timeout"], "60000");
    assert_eq!(query["options"], "AVOID_TRAILS:t");
    assert_eq!(query["referer"], "https://www.waze.com");
}

#[test]
fn get_routes_shape_follows_reply() {
    let stub = Stub::default();
    let calc = calculator(&stub, Region::IL);
    match calc.get_routes(1, 0).unwrap() {
        Routes::Single(route) => assert_eq!(route.route_name, "M1"),
        other => panic!("unexpected shape {:?}", other),
    }
    match calc.get_routes(4, 0).unwrap() {
        Routes::Alternatives(routes) => assert_eq!(routes.len(), 1),
        other => panic!("unexpected shape {:?}", other),
    }
    match calc.get_routes(3, 0).unwrap() {
        Routes::Alternatives(routes) => assert_eq!(routes.len(), 2),
        other => panic!("unexpected shape {:?}", other),
    }
    let paths = stub.routings.lock().unwrap().iter()
        .map(|(path, _)| path.clone())
        .collect::<Vec<_>>();
    assert!(paths.iter().all(|p| p == "/il-RoutingManager/routingRequest"));
}

#[test]
fn all_routes_are_keyed_by_name() {
    let stub = Stub::default();
    let calc = calculator(&stub, Region::EU);
    let routes = calc.calc_all_routes_info(3, true, false, 0).unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes["M1"], AggregatedRoute {time_minutes: 10.0,
        distance_km: 10.0});
    assert_eq!(routes["M7 Stra\u{c3}\u{9f}e"], AggregatedRoute {
        time_minutes: 9.0,
        distance_km: 12.0,
    });
}

#[test]
fn later_route_with_same_name_wins() {
    let stub = Stub::default();
    let calc = calculator(&stub, Region::EU);
    let routes = calc.calc_all_routes_info(5, true, false, 0).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes["M1"], AggregatedRoute {time_minutes: 15.0,
        distance_km: 15.0});
}

#[test]
fn routing_error_is_passed_through() {
    let stub = Stub::default();
    let calc = calculator(&stub, Region::EU);
    let e = calc.calc_route_info(true, false, 999).unwrap_err();
    assert_eq!(e.kind(),
        &ErrorKind::RoutingFailure("Internal routing error".to_string()));
}

#[test]
fn unknown_address_fails_resolution() {
    let addr = Stub::default().start();
    let e = RouteCalculator::builder("Budapest", "Atlantis")
        .base_url(&format!("http://{}/", addr))
        .build()
        .unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::LocationNotFound);
}

#[test]
fn backend_status_error_fails_resolution() {
    let addr = Stub::default().start();
    let e = RouteCalculator::builder("Broken", "Vienna")
        .base_url(&format!("http://{}/", addr))
        .build()
        .unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::LocationNotFound);
    assert!(std::error::Error::source(&e).is_some());
}

#[test]
fn sensor_reports_fastest_route() {
    let addr = Stub::default().start();
    let mut config = TravelTimeConfig::new("Budapest", "Vienna", Region::EU);
    config.base_url = Some(format!("http://{}/", addr));
    let mut sensor = TravelTimeSensor::new(config);
    sensor.update().unwrap();
    assert_eq!(sensor.state(), Some(9));
    let attributes = sensor.attributes().unwrap();
    assert_eq!(attributes.route, "M7 Straße");
    assert_eq!(attributes.distance, 12.0);
    assert_eq!(attributes.attribution, "Data provided by the Waze.com");
    assert_eq!(sensor.icon(), "mdi:car");
}

#[test]
fn sensor_filters_routes_by_name() {
    let addr = Stub::default().start();
    let mut config = TravelTimeConfig::new("Budapest", "Vienna", Region::EU);
    config.base_url = Some(format!("http://{}/", addr));
    config.excl_filter = Some("m7".to_string());
    let mut sensor = TravelTimeSensor::new(config.clone());
    sensor.update().unwrap();
    assert_eq!(sensor.travel_time().map(|t| t.route.as_str()), Some("M1"));

    config.incl_filter = Some("A4".to_string());
    let mut sensor = TravelTimeSensor::new(config);
    let e = sensor.update().unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::RoutingFailure(_)));
    assert_eq!(sensor.state(), None);
}
