//! `Cache-control` stamping by path prefix.
//!
//! Both handlers share one matcher: `path.starts_with(prefix) == include`,
//! applied to the percent-decoded request path.
//! An empty prefix matches every path, so `include = true` stamps everything
//! and `include = false` stamps nothing. The header is set before `next`
//! runs, so `next` may still override it.

use http::header::{CACHE_CONTROL, HeaderValue};
use http::{Request, Response};

use super::{Body, Handler};
use crate::core::paths::percent_decode;

fn matches(req: &Request<Body>, include: bool, prefix: &str) -> bool {
    percent_decode(req.uri().path()).starts_with(prefix) == include
}

/// Sets `Cache-control: no-store` on matching requests.
pub struct NoStoreCacheHandler<H> {
    next: H,
    include: bool,
    prefix: String,
}

impl<H: Handler> NoStoreCacheHandler<H> {
    pub fn new(next: H, include: bool, prefix: impl Into<String>) -> Self {
        Self {
            next,
            include,
            prefix: prefix.into(),
        }
    }
}

impl<H: Handler> Handler for NoStoreCacheHandler<H> {
    fn serve(&self, req: &mut Request<Body>, res: &mut Response<Body>) {
        if matches(req, self.include, &self.prefix) {
            res.headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
        self.next.serve(req, res);
    }
}

/// Sets `Cache-control: max-age=<age>` on matching requests.
pub struct MaxAgeCacheHandler<H> {
    next: H,
    value: HeaderValue,
    include: bool,
    prefix: String,
}

impl<H: Handler> MaxAgeCacheHandler<H> {
    /// `age` is in seconds and written verbatim.
    pub fn new(next: H, age: i64, include: bool, prefix: impl Into<String>) -> Self {
        Self {
            next,
            value: header_value(&format!("max-age={age}")),
            include,
            prefix: prefix.into(),
        }
    }
}

impl<H: Handler> Handler for MaxAgeCacheHandler<H> {
    fn serve(&self, req: &mut Request<Body>, res: &mut Response<Body>) {
        if matches(req, self.include, &self.prefix) {
            res.headers_mut().insert(CACHE_CONTROL, self.value.clone());
        }
        self.next.serve(req, res);
    }
}

/// `max-age=` followed by an optional sign and digits is always a valid
/// header value.
fn header_value(text: &str) -> HeaderValue {
    HeaderValue::from_str(text).unwrap_or_else(|_| HeaderValue::from_static("max-age=0"))
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::http::respond;

    fn success(_: &mut Request<Body>, res: &mut Response<Body>) {
        *res.status_mut() = StatusCode::OK;
    }

    fn cache_header(handler: &impl Handler, uri: &str) -> String {
        let mut req = Request::get(uri).body(Body::new()).unwrap();
        let res = respond(handler, &mut req);
        res.headers()
            .get("Cache-Control")
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn max_age_included_prefix() {
        let handler = MaxAgeCacheHandler::new(success, 0, true, "/app");
        assert!(cache_header(&handler, "http://host/app/config.js").contains("max-age=0"));
        assert!(cache_header(&handler, "http://host/config.js").is_empty());
    }

    #[test]
    fn max_age_excluded_prefix() {
        let handler = MaxAgeCacheHandler::new(success, 10, false, "/app");
        assert!(cache_header(&handler, "http://host/app/config.js").is_empty());
        assert!(cache_header(&handler, "http://host/config.js").contains("max-age=10"));
    }

    #[test]
    fn max_age_empty_prefix() {
        let all = MaxAgeCacheHandler::new(success, 0, true, "");
        assert!(cache_header(&all, "http://host/app/config.js").contains("max-age=0"));
        let none = MaxAgeCacheHandler::new(success, 10, false, "");
        assert!(cache_header(&none, "http://host/app/config.js").is_empty());
    }

    #[test]
    fn no_store_included_prefix() {
        let handler = NoStoreCacheHandler::new(success, true, "/app");
        assert!(cache_header(&handler, "http://host/app/config.js").contains("no-store"));
        assert!(cache_header(&handler, "http://host/config.js").is_empty());
    }

    #[test]
    fn no_store_excluded_prefix() {
        let handler = NoStoreCacheHandler::new(success, false, "/app");
        assert!(cache_header(&handler, "http://host/app/config.js").is_empty());
        assert!(cache_header(&handler, "http://host/config.js").contains("no-store"));
    }

    #[test]
    fn no_store_empty_prefix() {
        let all = NoStoreCacheHandler::new(success, true, "");
        assert!(cache_header(&all, "/x").contains("no-store"));
        let none = NoStoreCacheHandler::new(success, false, "");
        assert!(cache_header(&none, "/x").is_empty());
    }

    #[test]
    fn header_is_set_before_next_runs() {
        let seen = |_: &mut Request<Body>, res: &mut Response<Body>| {
            let stamped = res.headers().contains_key(CACHE_CONTROL);
            *res.status_mut() = if stamped {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
        };
        let handler = NoStoreCacheHandler::new(seen, true, "/");
        let mut req = Request::get("/a.js").body(Body::new()).unwrap();
        assert_eq!(respond(&handler, &mut req).status(), StatusCode::OK);
    }

    #[test]
    fn prefix_matches_the_decoded_path() {
        let no_store = NoStoreCacheHandler::new(success, true, "/my app");
        assert_eq!(cache_header(&no_store, "/my%20app/x.js"), "no-store");
        let max_age = MaxAgeCacheHandler::new(success, 60, false, "/my app");
        assert!(cache_header(&max_age, "/my%20app/x.js").is_empty());
        assert_eq!(cache_header(&max_age, "/other%20app/x.js"), "max-age=60");
    }

    #[test]
    fn negative_age_is_written_verbatim() {
        let handler = MaxAgeCacheHandler::new(success, -1, true, "");
        assert_eq!(cache_header(&handler, "/a.js"), "max-age=-1");
    }
}
