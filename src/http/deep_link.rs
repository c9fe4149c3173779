//! Deep-link rewrite for single-page applications.

use http::uri::PathAndQuery;
use http::{Request, Response, Uri};

use super::{Body, Handler};
use crate::core::paths::{percent_decode, percent_encode_path};

/// Rewrites extensionless request paths to the application URL so client-side
/// routes are answered with the shell document. Always delegates to `next`.
///
/// A path has an extension when the last segment of its decoded form (after
/// the final `/`) contains a `.`; `/app/home/` has an empty last segment and
/// is rewritten. `app_url` is a decoded path and is escaped on rewrite.
pub struct DeepLink<H> {
    next: H,
    app_url: String,
}

impl<H: Handler> DeepLink<H> {
    pub fn new(next: H, app_url: impl Into<String>) -> Self {
        Self {
            next,
            app_url: app_url.into(),
        }
    }
}

impl<H: Handler> Handler for DeepLink<H> {
    fn serve(&self, req: &mut Request<Body>, res: &mut Response<Body>) {
        if !has_extension(&percent_decode(req.uri().path())) {
            rewrite_path(req, &self.app_url);
        }
        self.next.serve(req, res);
    }
}

/// Whether the last path segment contains a `.`.
#[must_use]
pub fn has_extension(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

/// Replace the URI path with the escaped form of `path`, keeping scheme,
/// authority and query.
fn rewrite_path(req: &mut Request<Body>, path: &str) {
    let escaped = percent_encode_path(path);
    let target = match req.uri().query() {
        Some(query) => format!("{escaped}?{query}"),
        None => escaped,
    };
    let rewritten = PathAndQuery::try_from(target).map_err(http::Error::from).and_then(|pq| {
        let mut parts = req.uri().clone().into_parts();
        parts.path_and_query = Some(pq);
        Uri::from_parts(parts).map_err(http::Error::from)
    });
    match rewritten {
        Ok(uri) => *req.uri_mut() = uri,
        Err(err) => tracing::warn!(app_url = path, error = %err, "deep-link rewrite skipped"),
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::http::respond;

    fn success(_: &mut Request<Body>, res: &mut Response<Body>) {
        *res.status_mut() = StatusCode::OK;
    }

    fn path_after(handler: &impl Handler, uri: &str) -> String {
        let mut req = Request::get(uri).body(Body::new()).unwrap();
        respond(handler, &mut req);
        req.uri().path().to_string()
    }

    #[test]
    fn file_requests_are_untouched() {
        let handler = DeepLink::new(success, "/app/");
        assert_eq!(path_after(&handler, "http://host/app/config.js"), "/app/config.js");
    }

    #[test]
    fn routes_are_rewritten() {
        let handler = DeepLink::new(success, "/app/");
        assert_eq!(path_after(&handler, "http://host/app/home"), "/app/");
        assert_eq!(path_after(&handler, "http://host/app/home/"), "/app/");
        assert_eq!(path_after(&handler, "/"), "/app/");
    }

    #[test]
    fn dot_in_parent_segment_does_not_count() {
        let handler = DeepLink::new(success, "/index.html");
        assert_eq!(path_after(&handler, "/v1.2/users"), "/index.html");
    }

    #[test]
    fn query_and_authority_survive() {
        let handler = DeepLink::new(success, "/app/");
        let mut req = Request::get("http://host:8080/app/users?id=7")
            .body(Body::new())
            .unwrap();
        respond(&handler, &mut req);
        assert_eq!(req.uri().to_string(), "http://host:8080/app/?id=7");
    }

    #[test]
    fn next_always_runs() {
        let handler = DeepLink::new(
            |_: &mut Request<Body>, res: &mut Response<Body>| {
                *res.status_mut() = StatusCode::ACCEPTED;
            },
            "/app/",
        );
        for uri in ["/a.js", "/route"] {
            let mut req = Request::get(uri).body(Body::new()).unwrap();
            assert_eq!(respond(&handler, &mut req).status(), StatusCode::ACCEPTED);
        }
    }

    #[test]
    fn extension_is_read_from_the_decoded_path() {
        let handler = DeepLink::new(success, "/index.html");
        assert_eq!(path_after(&handler, "/main%2Ejs"), "/main%2Ejs");
        assert_eq!(path_after(&handler, "/v1%2E2/users"), "/index.html");
    }

    #[test]
    fn app_url_is_escaped_rather_than_dropped() {
        let handler = DeepLink::new(success, "/my app.html");
        assert_eq!(path_after(&handler, "/settings"), "/my%20app.html");

        let mut req = Request::get("/settings?tab=2").body(Body::new()).unwrap();
        respond(&DeepLink::new(success, "/100%/shell"), &mut req);
        assert_eq!(req.uri().path(), "/100%25/shell");
        assert_eq!(req.uri().query(), Some("tab=2"));
    }

    #[test]
    fn extension_detection() {
        assert!(has_extension("/a/b.js"));
        assert!(has_extension("/a/.hidden"));
        assert!(!has_extension("/a.d/b"));
        assert!(!has_extension("/a/"));
        assert!(!has_extension(""));
    }
}
