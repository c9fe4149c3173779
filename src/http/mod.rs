//! HTTP middlewares and an asset handler over [`ReadOnlyFs`].
//!
//! Handlers work on `http::Request`/`http::Response` values with an
//! in-memory body and chain by owning their `next` handler. No listener is
//! provided; hosts adapt [`Handler`] to the server of their choice.
//!
//! [`ReadOnlyFs`]: crate::fs::ReadOnlyFs

#![allow(missing_docs)]

use http::{Request, Response};

pub mod cache;
pub mod deep_link;
pub mod file_server;

pub use cache::{MaxAgeCacheHandler, NoStoreCacheHandler};
pub use deep_link::DeepLink;
pub use file_server::FileServer;

/// Request and response body.
pub type Body = Vec<u8>;

/// A request handler. Middlewares mutate the request or the response and
/// then delegate to the handler they wrap.
pub trait Handler: Send + Sync {
    fn serve(&self, req: &mut Request<Body>, res: &mut Response<Body>);
}

impl<F> Handler for F
where
    F: Fn(&mut Request<Body>, &mut Response<Body>) + Send + Sync,
{
    fn serve(&self, req: &mut Request<Body>, res: &mut Response<Body>) {
        self(req, res);
    }
}

/// Run `handler` against a fresh `200 OK` response with an empty body.
pub fn respond<H: Handler + ?Sized>(handler: &H, req: &mut Request<Body>) -> Response<Body> {
    let mut res = Response::new(Body::new());
    handler.serve(req, &mut res);
    res
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[test]
    fn closures_are_handlers() {
        let teapot = |_: &mut Request<Body>, res: &mut Response<Body>| {
            *res.status_mut() = StatusCode::IM_A_TEAPOT;
        };
        let mut req = Request::new(Body::new());
        assert_eq!(respond(&teapot, &mut req).status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn respond_defaults_to_ok() {
        let noop = |_: &mut Request<Body>, _: &mut Response<Body>| {};
        let mut req = Request::new(Body::new());
        let res = respond(&noop, &mut req);
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.body().is_empty());
    }
}
