//! Per-request identity and version resolution.
//!
//! # Responsibilities
//! - Resolve the caller identity: header, then cookie, then query parameter
//! - Derive the numeric identity used for weight bucketing
//! - Expose the request URL and version header to the matchers
//!
//! # Design Decisions
//! - A missing identity is a normal outcome (`None`), not an error
//! - The numeric identity is the plain sum of the identity's bytes. It is
//!   deterministic but skewed across buckets; rule weights in deployed stores
//!   were tuned against exactly this function, so it must not change
//! - Lookups are computed once per request and cached in the context
//! - Header values are read as UTF-8, not visible ASCII only, so non-ASCII
//!   identities keep their raw bytes

use std::cell::OnceCell;

use axum::http::{header, HeaderMap, Request, Uri};

/// Names of the request fields the resolver reads.
#[derive(Debug, Clone, Default)]
pub struct LookupFields {
    pub header_version: String,
    pub header_identify: String,
    pub cookie_identify: String,
    pub query_identify: String,
}

/// Resolve the request identity from header, cookie, then query.
///
/// Each source is consulted only if the previous one is absent or empty.
pub fn resolve(
    headers: &HeaderMap,
    uri: &Uri,
    header_key: &str,
    cookie_key: &str,
    query_key: &str,
) -> Option<String> {
    header_value(headers, header_key)
        .map(str::to_string)
        .or_else(|| cookie_value(headers, cookie_key).map(str::to_string))
        .or_else(|| query_value(uri, query_key))
}

/// Sum of the identity's byte values.
pub fn numeric_identity(identity: &str) -> u64 {
    identity.bytes().map(u64::from).sum()
}

/// Weight bucket for an identity, in `0..100`.
pub fn bucket(identity: &str) -> u64 {
    numeric_identity(identity) % 100
}

fn header_value<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    if key.is_empty() {
        return None;
    }
    headers
        .get(key)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .filter(|v| !v.is_empty())
}

fn cookie_value<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    if key.is_empty() {
        return None;
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| std::str::from_utf8(v.as_bytes()).ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|v| !v.is_empty())
}

fn query_value(uri: &Uri, key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.is_empty())
}

/// Everything the matchers need to know about one request.
///
/// Borrowed from the request for the duration of a single evaluation.
#[derive(Debug)]
pub struct RequestContext<'a> {
    uri: &'a Uri,
    headers: &'a HeaderMap,
    fields: &'a LookupFields,
    identity: OnceCell<Option<String>>,
}

impl<'a> RequestContext<'a> {
    pub fn new(uri: &'a Uri, headers: &'a HeaderMap, fields: &'a LookupFields) -> Self {
        Self {
            uri,
            headers,
            fields,
            identity: OnceCell::new(),
        }
    }

    pub fn from_request<B>(req: &'a Request<B>, fields: &'a LookupFields) -> Self {
        Self::new(req.uri(), req.headers(), fields)
    }

    /// The request URL as received (path and query for origin-form requests).
    pub fn url(&self) -> String {
        self.uri.to_string()
    }

    /// The version header, if present and non-empty.
    pub fn version(&self) -> Option<&str> {
        header_value(self.headers, &self.fields.header_version)
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity
            .get_or_init(|| {
                resolve(
                    self.headers,
                    self.uri,
                    &self.fields.header_identify,
                    &self.fields.cookie_identify,
                    &self.fields.query_identify,
                )
            })
            .as_deref()
    }

    pub fn bucket(&self) -> Option<u64> {
        self.identity().map(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    fn resolve_req(req: &Request<()>) -> Option<String> {
        resolve(req.headers(), req.uri(), "x-user-id", "uid", "uid")
    }

    #[test]
    fn test_header_wins() {
        let req = request(
            "/orders?uid=q1",
            &[("x-user-id", "h1"), ("cookie", "uid=c1")],
        );
        assert_eq!(resolve_req(&req).as_deref(), Some("h1"));
    }

    #[test]
    fn test_non_ascii_header_wins() {
        let mut req = request("/?uid=q1", &[]);
        req.headers_mut().insert(
            "x-user-id",
            HeaderValue::from_bytes("张三".as_bytes()).unwrap(),
        );
        assert_eq!(resolve_req(&req).as_deref(), Some("张三"));
        assert_eq!(numeric_identity("张三"), "张三".bytes().map(u64::from).sum::<u64>());
    }

    #[test]
    fn test_non_ascii_cookie_and_version() {
        let fields = LookupFields {
            header_version: "x-version".into(),
            cookie_identify: "uid".into(),
            ..LookupFields::default()
        };
        let mut req = request("/", &[]);
        req.headers_mut().insert(
            header::COOKIE,
            HeaderValue::from_bytes("uid=ünï".as_bytes()).unwrap(),
        );
        req.headers_mut().insert(
            "x-version",
            HeaderValue::from_bytes("2.0-é".as_bytes()).unwrap(),
        );
        let ctx = RequestContext::from_request(&req, &fields);

        assert_eq!(ctx.identity(), Some("ünï"));
        assert_eq!(ctx.version(), Some("2.0-é"));
    }

    #[test]
    fn test_cookie_when_header_empty() {
        let req = request(
            "/orders?uid=q1",
            &[("x-user-id", ""), ("cookie", "theme=dark; uid=u1")],
        );
        assert_eq!(resolve_req(&req).as_deref(), Some("u1"));
    }

    #[test]
    fn test_query_fallback_is_decoded() {
        let req = request("/orders?a=1&uid=user%201", &[("cookie", "uid=")]);
        assert_eq!(resolve_req(&req).as_deref(), Some("user 1"));
    }

    #[test]
    fn test_missing_identity() {
        let req = request("/orders?uid=", &[("x-user-id", "")]);
        assert_eq!(resolve_req(&req), None);
    }

    #[test]
    fn test_quoted_cookie_value() {
        let req = request("/", &[("cookie", "uid=\"abc\"")]);
        assert_eq!(resolve_req(&req).as_deref(), Some("abc"));
    }

    #[test]
    fn test_bucket_is_byte_sum_mod_100() {
        // 'd' (100) + 'd' (100) + '2' (50) = 250
        assert_eq!(numeric_identity("dd2"), 250);
        assert_eq!(bucket("dd2"), 50);
        assert_eq!(bucket(""), 0);
    }

    #[test]
    fn test_context_caches_identity() {
        let fields = LookupFields {
            header_version: "x-version".into(),
            header_identify: "x-user-id".into(),
            ..LookupFields::default()
        };
        let req = request("/a?b=c", &[("x-user-id", "dd2"), ("x-version", "1.4")]);
        let ctx = RequestContext::from_request(&req, &fields);

        assert_eq!(ctx.url(), "/a?b=c");
        assert_eq!(ctx.version(), Some("1.4"));
        assert_eq!(ctx.identity(), Some("dd2"));
        assert_eq!(ctx.bucket(), Some(50));
    }
}
