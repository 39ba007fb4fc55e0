use super::error::ApiError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_RANGE, RANGE};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("powerstore-agent/", env!("CARGO_PKG_VERSION"), " (Dell PowerStore monitoring)");

/// How the appliance certificate is checked.
#[derive(Debug, Clone, PartialEq)]
pub enum TlsVerify {
    /// Verify against the PEM certificates in this bundle file.
    CaBundle(PathBuf),
    /// Accept any certificate.
    Disabled,
}

/// Everything needed to open a session against one appliance.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub address: String,
    pub port:    u16,
    pub user:    Option<String>,
    pub secret:  Option<String>,
    pub verify:  TlsVerify,
    /// Applies to connect and to each individual request.
    pub timeout: Duration,
}

/// One raw HTTP exchange, before any status interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status:        u16,
    pub content_range: Option<String>,
    pub body:          String,
}

/// The wire underneath a [`Session`]. Implementations hold no per-request
/// state, so the `Range` header travels as an argument.
pub trait Transport {
    fn get(&self, url: &str, range: Option<&str>) -> Result<RawResponse, ApiError>;
    fn post(&self, url: &str, body: &Value) -> Result<RawResponse, ApiError>;
}

/// Blocking reqwest transport with basic auth and the configured TLS policy.
pub struct HttpTransport {
    client: Client,
    auth:   Option<(String, String)>,
}

impl HttpTransport {
    pub fn new(params: &ConnectionParams) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(params.timeout)
            .timeout(params.timeout);

        match &params.verify {
            TlsVerify::Disabled => {
                debug!("certificate verification disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
            TlsVerify::CaBundle(path) => {
                let pem = fs::read(path)
                    .map_err(|e| ApiError::Config(format!("{}: {}", path.display(), e)))?;
                let certs = reqwest::Certificate::from_pem_bundle(&pem)
                    .map_err(|e| ApiError::Config(format!("{}: {}", path.display(), e)))?;
                if certs.is_empty() {
                    return Err(ApiError::Config(format!("{}: no certificates in bundle", path.display())));
                }
                debug!(count = certs.len(), bundle = %path.display(), "loaded CA certificates");
                for cert in certs {
                    builder = builder.add_root_certificate(cert);
                }
            }
        }

        let client = builder.build().map_err(|e| ApiError::Config(e.to_string()))?;
        let auth = match (&params.user, &params.secret) {
            (Some(u), Some(s)) => Some((u.clone(), s.clone())),
            _                  => None,
        };
        Ok(Self { client, auth })
    }

    fn finish(&self, req: reqwest::blocking::RequestBuilder) -> Result<RawResponse, ApiError> {
        let req = match &self.auth {
            Some((user, secret)) => req.basic_auth(user, Some(secret)),
            None                 => req,
        };
        let resp = req.send()?;
        let status = resp.status().as_u16();
        let content_range = resp.headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text()?;
        Ok(RawResponse { status, content_range, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, range: Option<&str>) -> Result<RawResponse, ApiError> {
        let mut req = self.client.get(url);
        if let Some(r) = range {
            req = req.header(RANGE, r);
        }
        self.finish(req)
    }

    fn post(&self, url: &str, body: &Value) -> Result<RawResponse, ApiError> {
        self.finish(self.client.post(url).json(body))
    }
}

/// A REST session against `https://{address}:{port}/api/rest`.
pub struct Session<T: Transport = HttpTransport> {
    transport: T,
    base_url:  String,
}

impl Session<HttpTransport> {
    /// Build the HTTP client and prove the credentials with a
    /// `login_session` query.
    pub fn authenticate(params: &ConnectionParams) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(params)?;
        let session = Session::with_transport(transport, &params.address, params.port);
        session.get("login_session")?;
        info!(address = %params.address, port = params.port, "authenticated");
        Ok(session)
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(transport: T, address: &str, port: u16) -> Self {
        Self { transport, base_url: format!("https://{}:{}/api/rest", address, port) }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET a resource, following `206 Partial Content` continuations until
    /// the collection is complete. Pages are concatenated in response order.
    pub fn get(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        let mut range: Option<String> = None;
        let mut collected: Option<Value> = None;
        let mut requested_from = 0u64;

        loop {
            debug!(url = %url, range = range.as_deref().unwrap_or("-"), "GET");
            let resp = self.transport.get(&url, range.as_deref())?;
            match resp.status {
                200 => {
                    let page = decode(&resp.body)?;
                    return append(collected, page);
                }
                206 => {
                    let page = decode(&resp.body)?;
                    let header = resp.content_range
                        .ok_or_else(|| ApiError::ContentRange("missing on 206 response".into()))?;
                    let (start, end, total) = parse_content_range(&header)?;
                    let merged = append(collected, page)?;
                    let next = end + 1;
                    debug!(start, end, total, "partial content");
                    if next >= total {
                        return Ok(merged);
                    }
                    if next <= requested_from {
                        return Err(ApiError::ContentRange(format!("{} does not advance past {}", header, requested_from)));
                    }
                    requested_from = next;
                    range = Some(format!("{}-", next));
                    collected = Some(merged);
                }
                status => return Err(ApiError::from_status(status)),
            }
        }
    }

    /// POST a JSON body and decode the JSON answer.
    pub fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let resp = self.transport.post(&url, body)?;
        match resp.status {
            200..=299 => decode(&resp.body),
            status    => Err(ApiError::from_status(status)),
        }
    }
}

fn decode(body: &str) -> Result<Value, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn append(collected: Option<Value>, page: Value) -> Result<Value, ApiError> {
    let mut acc = match collected {
        None    => return Ok(page),
        Some(v) => v,
    };
    match (acc.as_array_mut(), page) {
        (Some(items), Value::Array(more)) => {
            items.extend(more);
            Ok(acc)
        }
        _ => Err(ApiError::Decode("partial content page is not a JSON array".into())),
    }
}

/// Parse `start-end/total`, tolerating a leading unit such as `items `.
pub fn parse_content_range(header: &str) -> Result<(u64, u64, u64), ApiError> {
    let bad = || ApiError::ContentRange(header.to_string());
    let spec = header.trim().rsplit(' ').next().ok_or_else(bad)?;
    let (span, total) = spec.split_once('/').ok_or_else(bad)?;
    let (start, end) = span.split_once('-').ok_or_else(bad)?;
    let start: u64 = start.trim().parse().map_err(|_| bad())?;
    let end: u64 = end.trim().parse().map_err(|_| bad())?;
    let total: u64 = total.trim().parse().map_err(|_| bad())?;
    if end < start {
        return Err(bad());
    }
    Ok((start, end, total))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses and records every request it sees.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub responses: RefCell<VecDeque<RawResponse>>,
        pub requests:  RefCell<Vec<(String, Option<String>)>>,
        pub posts:     RefCell<Vec<(String, Value)>>,
    }

    impl ScriptedTransport {
        pub fn new(responses: Vec<RawResponse>) -> Self {
            Self { responses: RefCell::new(responses.into()), ..Default::default() }
        }

        fn next(&self) -> Result<RawResponse, ApiError> {
            self.responses.borrow_mut().pop_front()
                .ok_or_else(|| ApiError::Transport("script exhausted".into()))
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, url: &str, range: Option<&str>) -> Result<RawResponse, ApiError> {
            self.requests.borrow_mut().push((url.to_string(), range.map(str::to_string)));
            self.next()
        }

        fn post(&self, url: &str, body: &Value) -> Result<RawResponse, ApiError> {
            self.posts.borrow_mut().push((url.to_string(), body.clone()));
            self.next()
        }
    }

    impl Session<ScriptedTransport> {
        pub(crate) fn transport_requests(&self) -> usize {
            self.transport.requests.borrow().len()
        }

        pub(crate) fn transport_posts(&self) -> Vec<(String, Value)> {
            self.transport.posts.borrow().clone()
        }
    }

    pub(crate) fn ok(body: Value) -> RawResponse {
        RawResponse { status: 200, content_range: None, body: body.to_string() }
    }

    fn partial(from: u64, to: u64, total: u64) -> RawResponse {
        let items: Vec<Value> = (from..=to).map(|i| json!({ "id": format!("r{}", i) })).collect();
        RawResponse {
            status: 206,
            content_range: Some(format!("{}-{}/{}", from, to, total)),
            body: Value::Array(items).to_string(),
        }
    }

    fn params(verify: TlsVerify) -> ConnectionParams {
        ConnectionParams {
            address: "ps".into(),
            port:    443,
            user:    Some("monitor".into()),
            secret:  Some("pw".into()),
            verify,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn unusable_ca_bundle_is_a_config_error() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "this is not a certificate").unwrap();
        let err = HttpTransport::new(&params(TlsVerify::CaBundle(f.path().to_path_buf()))).err().unwrap();
        assert!(matches!(err, ApiError::Config(_)));

        let dir = tempfile::tempdir().unwrap();
        let err = HttpTransport::new(&params(TlsVerify::CaBundle(dir.path().join("missing.pem")))).err().unwrap();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn disabled_verification_builds_client() {
        let t = HttpTransport::new(&params(TlsVerify::Disabled)).unwrap();
        assert_eq!(t.auth, Some(("monitor".to_string(), "pw".to_string())));
    }

    #[test]
    fn builds_rest_url() {
        let s = Session::with_transport(ScriptedTransport::default(), "10.0.0.5", 443);
        assert_eq!(s.url("volume?select=*"), "https://10.0.0.5:443/api/rest/volume?select=*");
    }

    #[test]
    fn follows_partial_content_in_order() {
        let t = ScriptedTransport::new(vec![partial(0, 9, 25), partial(10, 19, 25), partial(20, 24, 25)]);
        let s = Session::with_transport(t, "ps", 443);
        let v = s.get("hardware?select=*").unwrap();
        let items = v.as_array().unwrap();
        assert_eq!(items.len(), 25);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item["id"], json!(format!("r{}", i)));
        }
        let reqs = s.transport.requests.borrow();
        let ranges: Vec<Option<String>> = reqs.iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(ranges, vec![None, Some("10-".into()), Some("20-".into())]);
    }

    #[test]
    fn complete_partial_response_issues_no_follow_up() {
        let t = ScriptedTransport::new(vec![partial(0, 24, 25)]);
        let s = Session::with_transport(t, "ps", 443);
        let v = s.get("volume?select=*").unwrap();
        assert_eq!(v.as_array().unwrap().len(), 25);
        assert_eq!(s.transport.requests.borrow().len(), 1);
    }

    #[test]
    fn plain_ok_returns_object_body() {
        let t = ScriptedTransport::new(vec![ok(json!({ "info": { "title": "PowerStore", "version": "3.6" } }))]);
        let s = Session::with_transport(t, "ps", 443);
        assert_eq!(s.get("openapi.json").unwrap()["info"]["version"], "3.6");
    }

    #[test]
    fn maps_error_statuses() {
        for (status, expected) in [
            (401, ApiError::Authentication(401)),
            (403, ApiError::Authorization(403)),
            (502, ApiError::Protocol(502)),
        ] {
            let t = ScriptedTransport::new(vec![RawResponse { status, content_range: None, body: "<html>".into() }]);
            let s = Session::with_transport(t, "ps", 443);
            assert_eq!(s.get("appliance?select=*").unwrap_err(), expected);
        }
    }

    #[test]
    fn rejects_non_advancing_range() {
        let t = ScriptedTransport::new(vec![partial(0, 9, 25), partial(0, 9, 25)]);
        let s = Session::with_transport(t, "ps", 443);
        assert!(matches!(s.get("hardware").unwrap_err(), ApiError::ContentRange(_)));
    }

    #[test]
    fn parses_content_range_forms() {
        assert_eq!(parse_content_range("0-9/25").unwrap(), (0, 9, 25));
        assert_eq!(parse_content_range("items 10-19/25").unwrap(), (10, 19, 25));
        assert!(parse_content_range("0-9").is_err());
        assert!(parse_content_range("9-0/25").is_err());
        assert!(parse_content_range("a-b/c").is_err());
    }

    #[test]
    fn post_decodes_created_body() {
        let t = ScriptedTransport::new(vec![RawResponse { status: 201, content_range: None, body: "[]".into() }]);
        let s = Session::with_transport(t, "ps", 443);
        assert_eq!(s.post("metrics/generate", &json!({})).unwrap(), json!([]));
    }
}
