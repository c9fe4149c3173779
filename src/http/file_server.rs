//! Asset handler serving a [`ReadOnlyFs`].
//!
//! Every request goes through `open`, so wrapping a [`FilterDir`] here is what
//! drives observation in dev mode and filtering in prod mode.
//!
//! [`FilterDir`]: crate::fs::FilterDir

use std::fmt::Write as _;
use std::io;

use http::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use http::{Method, Request, Response, StatusCode};

use super::{Body, Handler};
use crate::core::paths::{clean_request_path, join_request_path, percent_decode};
use crate::fs::{ReadOnlyFs, read_all};

const INDEX_FILE: &str = "index.html";
const HTML_UTF8: &str = "text/html; charset=utf-8";
const TEXT_UTF8: &str = "text/plain; charset=utf-8";

pub struct FileServer<F> {
    fs: F,
}

impl<F: ReadOnlyFs> FileServer<F> {
    pub const fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Resolve `path` to a body and its content type.
    fn load(&self, path: &str) -> io::Result<(Vec<u8>, String)> {
        let mut file = self.fs.open(path)?;
        if !file.stat()?.is_dir() {
            return Ok((read_all(file.as_mut())?, content_type(path)));
        }

        let index = join_request_path(path, INDEX_FILE);
        match self.fs.open(&index) {
            Ok(mut page) => Ok((read_all(page.as_mut())?, content_type(&index))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let listing = file.read_dir();
                if let Some(err) = listing.error
                    && listing.entries.is_empty()
                {
                    return Err(err);
                }
                Ok((dir_listing(&listing.entries).into_bytes(), HTML_UTF8.to_string()))
            }
            Err(err) => Err(err),
        }
    }
}

impl<F: ReadOnlyFs> Handler for FileServer<F> {
    fn serve(&self, req: &mut Request<Body>, res: &mut Response<Body>) {
        let head = req.method() == Method::HEAD;
        if req.method() != Method::GET && !head {
            *res.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
            res.headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            return;
        }

        let path = clean_request_path(&percent_decode(req.uri().path()));
        match self.load(&path) {
            Ok((body, mime)) => {
                *res.status_mut() = StatusCode::OK;
                if let Ok(value) = HeaderValue::from_str(&mime) {
                    res.headers_mut().insert(CONTENT_TYPE, value);
                }
                res.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
                *res.body_mut() = if head { Body::new() } else { body };
            }
            Err(err) => {
                let status = status_for(&err);
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::warn!(%path, error = %err, "asset request failed");
                }
                *res.status_mut() = status;
                res.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_UTF8));
                let text = match status {
                    StatusCode::NOT_FOUND => "404 page not found\n".to_string(),
                    StatusCode::FORBIDDEN => "403 Forbidden\n".to_string(),
                    _ => "500 Internal Server Error\n".to_string(),
                };
                *res.body_mut() = if head { Body::new() } else { text.into_bytes() };
            }
        }
    }
}

fn status_for(err: &io::Error) -> StatusCode {
    match err.kind() {
        io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        io::ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn content_type(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn dir_listing(entries: &[crate::fs::FileInfo]) -> String {
    let mut out = String::from("<pre>\n");
    for entry in entries {
        let suffix = if entry.is_dir() { "/" } else { "" };
        let name = html_escape(&entry.name);
        let _ = writeln!(out, "<a href=\"{name}{suffix}\">{name}{suffix}</a>");
    }
    out.push_str("</pre>\n");
    out
}

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::testing::MemFs;
    use crate::http::respond;

    fn get(server: &impl Handler, uri: &str) -> Response<Body> {
        let mut req = Request::get(uri).body(Body::new()).unwrap();
        respond(server, &mut req)
    }

    fn body_text(res: &Response<Body>) -> String {
        String::from_utf8(res.body().clone()).unwrap()
    }

    #[test]
    fn serves_file_with_mime() {
        let server = FileServer::new(MemFs::with_files(&["/app.js", "/index.html"]));
        let res = get(&server, "/app.js");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(&res), "body of /app.js");
        let mime = res.headers()[CONTENT_TYPE].to_str().unwrap();
        assert!(mime.contains("javascript"), "{mime}");
        assert_eq!(res.headers()[CONTENT_LENGTH], "15");
    }

    #[test]
    fn directory_serves_index() {
        let server = FileServer::new(MemFs::with_files(&["/index.html", "/docs/index.html"]));
        assert_eq!(body_text(&get(&server, "/")), "body of /index.html");
        assert_eq!(body_text(&get(&server, "/docs/")), "body of /docs/index.html");
    }

    #[test]
    fn directory_without_index_lists_children() {
        let server = FileServer::new(MemFs::with_files(&["/img/a.png", "/img/sub/b.png"]));
        let res = get(&server, "/img");
        assert_eq!(res.status(), StatusCode::OK);
        let text = body_text(&res);
        assert!(text.contains("<a href=\"a.png\">a.png</a>"), "{text}");
        assert!(text.contains("<a href=\"sub/\">sub/</a>"), "{text}");
    }

    #[test]
    fn missing_file_is_404() {
        let server = FileServer::new(MemFs::with_files(&["/index.html"]));
        let res = get(&server, "/nope.js");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(&res), "404 page not found\n");
    }

    #[test]
    fn only_get_and_head() {
        let server = FileServer::new(MemFs::with_files(&["/a.js"]));
        let mut req = Request::post("/a.js").body(Body::new()).unwrap();
        let res = respond(&server, &mut req);
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "GET, HEAD");

        let mut req = Request::head("/a.js").body(Body::new()).unwrap();
        let res = respond(&server, &mut req);
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.body().is_empty());
        assert_eq!(res.headers()[CONTENT_LENGTH], "13");
    }

    #[test]
    fn request_path_is_cleaned_and_decoded() {
        let mem = MemFs::with_files(&["/my file.js"]);
        let server = FileServer::new(mem);
        let res = get(&server, "/x/../my%20file.js");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(server.fs.opened.lock().as_slice(), &["/my file.js"]);
    }

    #[test]
    fn escapes() {
        assert_eq!(html_escape("<a&'\">"), "&lt;a&amp;&#39;&#34;&gt;");
    }
}
