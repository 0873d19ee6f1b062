// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use crate::{Error, ErrorKind, Protocol};
use futures::{Future, Stream};
use hyper_tls::HttpsConnector;
use std::sync::Arc;
use tokio::runtime::current_thread::Runtime;

#[derive(Debug)]
pub(crate) struct Client<P> {
    protocol: Arc<P>,
}

impl<P: Protocol + Send + Sync + 'static> Client<P> {
    pub(crate) fn new(protocol: P) -> Self {
        let protocol = Arc::new(protocol);
        Client {protocol}
    }

    pub(crate) fn fetch(&self, query: P::Query)
        -> Box<dyn Future<Item = P::Output, Error = Error> + Send>
    {
        let request = match self.protocol.request(&query) {
            Ok(request) => request,
            Err(e) => return Box::new(futures::future::err(e)),
        };
        let connector = match HttpsConnector::new(1) {
            Ok(connector) => connector,
            Err(e) => return Box::new(futures::future::err(e.into())),
        };
        let client = hyper::Client::builder()
            .build::<_, hyper::Body>(connector);
        log::debug!("GET {}", request.uri());
        let response = client.request(request);
        let proto = self.protocol.clone();
        let output = response
            .from_err::<Error>()
            .and_then(|resp| {
                let status = resp.status();
                resp.into_body()
                    .concat2()
                    .from_err::<Error>()
                    .and_then(move |body| {
                        if status.is_success() {
                            Ok(body)
                        } else {
                            Err(Error::new(ErrorKind::BackendFailure,
                                format!("Unexpected HTTP status {}", status)))
                        }
                    })
            })
            .and_then(move |body| proto.parse(&query, &body));
        Box::new(output)
    }

    /// Sends the request and blocks until the response has been parsed.
    pub(crate) fn fetch_blocking(&self, query: P::Query)
        -> Result<P::Output, Error>
    {
        let mut runtime = Runtime::new()
            .map_err(|e| Error::new(ErrorKind::BackendFailure, e))?;
        runtime.block_on(self.fetch(query))
    }
}
