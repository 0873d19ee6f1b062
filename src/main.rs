// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

#![deny(warnings)]

use clap::{App, Arg, ArgMatches};
use env_logger::{Builder, Env};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, self};
use std::fs::File;
use std::io;
use std::num::ParseIntError;
use std::path::Path;
use waze_route::{RouteCalculator, RouteFilter, TravelTime, TravelTimeConfig,
    TravelTimeSensor};

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn app() -> App<'static, 'static> {
    App::new(APP_NAME)
        .version(APP_VERSION)
        .author(APP_AUTHORS)
        .about("Route time and distance between two addresses")
        .arg(
            Arg::with_name("ORIGIN")
                .required_unless("CONFIG")
                .help("Start address")
        )
        .arg(
            Arg::with_name("DESTINATION")
                .required_unless("CONFIG")
                .help("End address")
        )
        .arg(
            Arg::with_name("CONFIG")
                .short("c")
                .long("config")
                .takes_value(true)
                .conflicts_with_all(&["ORIGIN", "DESTINATION"])
                .help("Path to a travel time sensor configuration file")
        )
        .arg(
            Arg::with_name("REGION")
                .short("r")
                .long("region")
                .takes_value(true)
                .help("US, NA, EU or IL (default: EU)")
        )
        .arg(
            Arg::with_name("INCLUDE")
                .long("include")
                .takes_value(true)
                .help("Only consider routes whose name contains this")
        )
        .arg(
            Arg::with_name("EXCLUDE")
                .long("exclude")
                .takes_value(true)
                .help("Ignore routes whose name contains this")
        )
        .arg(
            Arg::with_name("ALL")
                .short("a")
                .long("all")
                .help("Report every alternative route")
        )
        .arg(
            Arg::with_name("PATHS")
                .short("n")
                .long("paths")
                .takes_value(true)
                .help("Number of alternative routes to request (default: 3)")
        )
        .arg(
            Arg::with_name("NO_REAL_TIME")
                .long("no-real-time")
                .help("Ignore current traffic")
        )
        .arg(
            Arg::with_name("STOP_AT_BOUNDS")
                .long("stop-at-bounds")
                .help("Leave out the parts of the route inside the start and \
                    end areas")
        )
        .arg(
            Arg::with_name("TIME_DELTA")
                .short("t")
                .long("time-delta")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Departure offset from now (default: 0)")
        )
        .arg(
            Arg::with_name("JSON")
                .long("json")
                .help("Print the result as JSON")
        )
        .arg(
            Arg::with_name("VERBOSE")
                .short("v")
                .multiple(true)
                .help("Log more (repeat for more detail)")
        )
}

fn init_logging(verbosity: u64) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}

fn run() -> Result<(), AppError> {
    let matches = app().get_matches();
    let verbosity = matches.occurrences_of("VERBOSE");
    init_logging(verbosity);
    let json = matches.is_present("JSON");
    let outcome = match matches.value_of("CONFIG") {
        Some(path) => run_sensor(Path::new(path)),
        None => run_calculator(&matches),
    };
    match outcome {
        Ok(report) => {
            report.print(json);
            Ok(())
        }
        Err(e) => {
            if json {
                print_json(&e.as_json());
            }
            Err(e)
        }
    }
}

fn run_sensor(path: &Path) -> Result<Report, AppError> {
    let config_file = File::open(path)
        .map_err(AppError::FailedToOpenConfigFile)?;
    let config = TravelTimeConfig::from_config(config_file)
        .map_err(AppError::BadConfigFile)?;
    let mut sensor = TravelTimeSensor::new(config);
    sensor.update().map_err(AppError::RouteError)?;
    let state = sensor.travel_time().cloned();
    state.map(Report::Best).ok_or(AppError::NoRoute)
}

fn run_calculator(matches: &ArgMatches) -> Result<Report, AppError> {
    // Both are required unless a config file was given.
    let origin = matches.value_of("ORIGIN").unwrap_or_default();
    let destination = matches.value_of("DESTINATION").unwrap_or_default();
    let region = match matches.value_of("REGION") {
        Some(r) => r.parse().map_err(AppError::BadRegion)?,
        None => Default::default(),
    };
    let n_paths = match matches.value_of("PATHS") {
        Some(n) => n.parse().map_err(AppError::BadPaths)?,
        None => 3,
    };
    let time_delta = match matches.value_of("TIME_DELTA") {
        Some(t) => t.parse().map_err(AppError::BadTimeDelta)?,
        None => 0,
    };
    let real_time = !matches.is_present("NO_REAL_TIME");
    let stop_at_bounds = matches.is_present("STOP_AT_BOUNDS");
    let filter = RouteFilter {
        include: matches.value_of("INCLUDE").map(str::to_string),
        exclude: matches.value_of("EXCLUDE").map(str::to_string),
    };
    let level = match matches.occurrences_of("VERBOSE") {
        0 => None,
        1 => Some(log::Level::Info),
        _ => Some(log::Level::Debug),
    };
    let calc = RouteCalculator::builder(origin, destination)
        .region(region)
        .log_level(level)
        .build()
        .map_err(AppError::RouteError)?;
    let routes = calc
        .calc_all_routes_info(n_paths, real_time, stop_at_bounds, time_delta)
        .map_err(AppError::RouteError)?;
    let routes = filter.apply(routes);
    if matches.is_present("ALL") {
        let all = routes.into_iter()
            .map(|(name, info)| TravelTime {
                duration: info.time_minutes,
                distance: info.distance_km,
                route: waze_route::repair_route_name(&name),
            })
            .collect();
        Ok(Report::All(all))
    } else {
        TravelTime::fastest(&routes).map(Report::Best).ok_or(AppError::NoRoute)
    }
}

enum Report {
    Best(TravelTime),
    All(Vec<TravelTime>),
}

impl Report {
    fn print(&self, json: bool) {
        match (self, json) {
            (Report::Best(t), true) => print_json(t),
            (Report::All(all), true) => print_json(all),
            (Report::Best(t), false) => print_travel_time(t),
            (Report::All(all), false) => all.iter().for_each(print_travel_time),
        }
    }
}

fn print_travel_time(t: &TravelTime) {
    println!("{}: {:.2} minutes, {:.2} km", t.route, t.duration, t.distance);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn main() {
    let code = if let Err(e) = run() {
        print_error(e);
        1
    } else {
        0
    };
    std::process::exit(code)
}

fn print_error(e: AppError) {
    eprintln!("Error: {}", e);
    let mut e: &dyn Error = &e;
    while let Some(cause) = e.source() {
        eprintln!("Because: {}", cause);
        e = cause;
    }
}

#[derive(Debug)]
enum AppError {
    BadConfigFile(serde_json::Error),
    BadPaths(ParseIntError),
    BadRegion(waze_route::Error),
    BadTimeDelta(ParseIntError),
    FailedToOpenConfigFile(io::Error),
    NoRoute,
    RouteError(waze_route::Error),
}

impl AppError {
    fn as_json(&self) -> serde_json::Value {
        match self {
            AppError::BadRegion(e) | AppError::RouteError(e) => {
                serde_json::to_value(e).unwrap_or(serde_json::Value::Null)
            }
            other => serde_json::json!({"error": other.to_string()}),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadConfigFile(_) => f.write_str("Bad configuration file"),
            AppError::BadPaths(_) => f.write_str("Bad number of paths"),
            AppError::BadRegion(_) => f.write_str("Bad region"),
            AppError::BadTimeDelta(_) => f.write_str("Bad time delta"),
            AppError::FailedToOpenConfigFile(_) =>
                f.write_str("Failed to open configuration file"),
            AppError::NoRoute => f.write_str("No route matches the filters"),
            AppError::RouteError(_) => f.write_str("Route error"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::BadConfigFile(e) => Some(e),
            AppError::BadPaths(e) => Some(e),
            AppError::BadRegion(e) => Some(e),
            AppError::BadTimeDelta(e) => Some(e),
            AppError::FailedToOpenConfigFile(e) => Some(e),
            AppError::NoRoute => None,
            AppError::RouteError(e) => Some(e),
        }
    }
}
