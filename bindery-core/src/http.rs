// HTTP request and response types

use std::collections::HashMap;

/// Content-Type MIME of the most common data formats.
pub mod mime {
    pub const JSON: &str = "application/json";
    pub const HTML: &str = "text/html";
    pub const XML: &str = "application/xml";
    pub const XML2: &str = "text/xml";
    pub const PLAIN: &str = "text/plain";
    pub const FORM: &str = "application/x-www-form-urlencoded";
    pub const MULTIPART_FORM: &str = "multipart/form-data";
    pub const PROTOBUF: &str = "application/x-protobuf";
    pub const MSGPACK: &str = "application/x-msgpack";
    pub const MSGPACK2: &str = "application/msgpack";
    pub const YAML: &str = "application/x-yaml";
}

pub const CONTENT_TYPE: &str = "Content-Type";

/// HTTP request wrapper
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// Query string as received, without the leading `?`. Keeps repeated keys.
    pub raw_query: Option<String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and its content type.
    pub fn with_json(self, body: impl Into<Vec<u8>>) -> Self {
        self.with_header(CONTENT_TYPE, mime::JSON).with_body(body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup_header(&self.headers, name)
    }

    /// Media type without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.header(CONTENT_TYPE).map(|v| {
            v.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Get a path parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Set the query string as received. Decoded pairs also land in
    /// `query_params`, where the last of a repeated key wins.
    pub fn with_raw_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query_params.extend(parse_query_string(&query));
        self.raw_query = Some(query);
        self
    }

    /// The raw query string when one was received, otherwise the query
    /// parameters re-encoded.
    pub fn query_string(&self) -> String {
        if let Some(raw) = self.raw_query.as_deref().filter(|q| !q.is_empty()) {
            return raw.to_string();
        }
        self.query_params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// HTTP response wrapper
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }
}

fn lookup_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .or_else(|| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
}

/// Parse a query string into a map of decoded parameters
pub(crate) fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = decode_component(split.next()?);
            let value = decode_component(split.next().unwrap_or(""));
            Some((key, value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|v| v.into_owned())
        .unwrap_or(plus_decoded)
}
