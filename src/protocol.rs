// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

mod routing;
mod search;

pub(crate) use self::routing::{ProtocolRouting, RouteQuery};
pub(crate) use self::search::ProtocolSearch;

use crate::Error;
use hyper::{Body, Request};

/// One backend endpoint: how to ask it something and how to read the answer.
pub(crate) trait Protocol {
    type Query: Send + 'static;
    type Output: Send + 'static;

    fn request(&self, query: &Self::Query) -> Result<Request<Body>, Error>;
    fn parse(&self, query: &Self::Query, body: &[u8])
        -> Result<Self::Output, Error>;
}
