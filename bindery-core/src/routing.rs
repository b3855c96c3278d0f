// Routing system for bound handlers

use crate::handler::{Adapter, BoxedHandler};
use crate::envelope::Envelope;
use crate::materialize::FromPlan;
use crate::target::Signature;
use crate::{Error, HttpRequest, HttpResponse};
use std::collections::HashMap;

/// HTTP methods accepted by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

/// Route definition with handler
#[derive(Clone, Debug)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: BoxedHandler,
}

/// Router for registering bound handlers and dispatching requests.
///
/// Registration inspects each handler once and fails on unsupported
/// parameter shapes. Dispatch always answers with a response: unmatched
/// requests get an error envelope.
#[derive(Clone, Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    adapter: Adapter,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router whose handlers are bound with `adapter`.
    pub fn with_adapter(adapter: Adapter) -> Self {
        Self {
            routes: Vec::new(),
            adapter,
        }
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Add a route to the router
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Bind `target` and register it for `method` and `path`.
    pub fn on<F, Args>(
        &mut self,
        method: HttpMethod,
        path: impl Into<String>,
        target: F,
    ) -> Result<&mut Self, Error>
    where
        F: Signature<Args>,
        Args: FromPlan,
    {
        let path = path.into();
        let handler = self.adapter.bind(target).map_err(|e| match e {
            Error::InvalidTarget(msg) => {
                Error::InvalidTarget(format!("{} {}: {}", method.as_str(), path, msg))
            }
            other => other,
        })?;
        tracing::debug!(target: "bindery::router", method = method.as_str(), path = %path, "Registered route");
        self.add_route(Route {
            method,
            path,
            handler: BoxedHandler::new(handler),
        });
        Ok(self)
    }

    pub fn get<F, Args>(&mut self, path: impl Into<String>, target: F) -> Result<&mut Self, Error>
    where
        F: Signature<Args>,
        Args: FromPlan,
    {
        self.on(HttpMethod::GET, path, target)
    }

    pub fn post<F, Args>(&mut self, path: impl Into<String>, target: F) -> Result<&mut Self, Error>
    where
        F: Signature<Args>,
        Args: FromPlan,
    {
        self.on(HttpMethod::POST, path, target)
    }

    pub fn put<F, Args>(&mut self, path: impl Into<String>, target: F) -> Result<&mut Self, Error>
    where
        F: Signature<Args>,
        Args: FromPlan,
    {
        self.on(HttpMethod::PUT, path, target)
    }

    pub fn delete<F, Args>(
        &mut self,
        path: impl Into<String>,
        target: F,
    ) -> Result<&mut Self, Error>
    where
        F: Signature<Args>,
        Args: FromPlan,
    {
        self.on(HttpMethod::DELETE, path, target)
    }

    pub fn patch<F, Args>(&mut self, path: impl Into<String>, target: F) -> Result<&mut Self, Error>
    where
        F: Signature<Args>,
        Args: FromPlan,
    {
        self.on(HttpMethod::PATCH, path, target)
    }

    /// Dispatch a request to the matching route.
    pub async fn route(&self, mut request: HttpRequest) -> HttpResponse {
        // Parse query parameters from path
        if let Some(idx) = request.path.find('?') {
            let query = request.path.split_off(idx);
            request = request.with_raw_query(&query[1..]);
        }

        let mut path_matched = false;
        for route in &self.routes {
            let Some(params) = match_path(&route.path, &request.path) else {
                continue;
            };
            path_matched = true;
            if !route.method.as_str().eq_ignore_ascii_case(&request.method) {
                continue;
            }
            request.path_params = params;
            return route.handler.call(request).await;
        }

        let err = if path_matched {
            Error::MethodNotAllowed(format!("{} {}", request.method, request.path))
        } else {
            Error::RouteNotFound(format!("{} {}", request.method, request.path))
        };
        tracing::debug!(target: "bindery::router", error = %err, "No route matched");
        Envelope::from(err).render(self.adapter.config())
    }
}

/// Match a route path pattern against a request path
/// Returns Some(params) if matched, None otherwise
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            let value = urlencoding::decode(path_part)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| path_part.to_string());
            params.insert(param_name.to_string(), value);
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bind, Context, RequestContext};
    use serde_json::{json, Value};

    fn body(response: &HttpResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[test]
    fn test_match_path_static() {
        let result = match_path("/users", "/users");
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn test_match_path_multiple_params() {
        let params = match_path("/users/:user_id/posts/:post_id", "/users/123/posts/456").unwrap();
        assert_eq!(params.get("user_id"), Some(&"123".to_string()));
        assert_eq!(params.get("post_id"), Some(&"456".to_string()));
    }

    #[test]
    fn test_match_path_no_match() {
        assert!(match_path("/users/:id", "/posts/123").is_none());
        assert!(match_path("/users/:id", "/users").is_none());
    }

    #[test]
    fn test_match_path_decodes_params() {
        let params = match_path("/files/:name", "/files/a%20b.txt").unwrap();
        assert_eq!(params.get("name"), Some(&"a b.txt".to_string()));
    }

    #[test]
    fn test_http_method_round_trip() {
        for method in ["get", "POST", "Put", "DELETE", "patch", "HEAD", "options"] {
            let parsed = HttpMethod::from_str(method).unwrap();
            assert!(parsed.as_str().eq_ignore_ascii_case(method));
        }
        assert!(HttpMethod::from_str("TRACE").is_none());
    }

    #[tokio::test]
    async fn test_dispatches_with_path_and_query() {
        let mut router = Router::new();
        router
            .get("/users/:id", |raw: RequestContext| async move {
                format!(
                    "{}:{}",
                    raw.param("id").unwrap_or_default(),
                    raw.query("page").unwrap_or_default()
                )
            })
            .unwrap();

        let response = router.route(HttpRequest::new("GET", "/users/7?page=2")).await;
        assert_eq!(body(&response), json!({"success": true, "data": "7:2"}));
    }

    #[tokio::test]
    async fn test_unmatched_route_is_an_envelope() {
        let router = Router::new();
        let response = router.route(HttpRequest::new("GET", "/missing")).await;
        assert_eq!(response.status, 200);
        assert_eq!(body(&response)["error"]["code"], "ROUTE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_wrong_method_is_an_envelope() {
        let mut router = Router::new();
        router.post("/users", |_: Context| async {}).unwrap();
        let response = router.route(HttpRequest::new("GET", "/users")).await;
        assert_eq!(body(&response)["error"]["code"], "METHOD_NOT_ALLOWED");
    }

    #[test]
    fn test_registration_rejects_unsupported_shapes() {
        let mut router = Router::new();
        let err = router
            .put("/nested", |_: Box<Box<Bind<Value>>>| async {})
            .unwrap_err();
        match err {
            Error::InvalidTarget(msg) => assert!(msg.starts_with("PUT /nested")),
            other => panic!("expected InvalidTarget, got {other:?}"),
        }
        assert!(router.routes().is_empty());
    }
}
