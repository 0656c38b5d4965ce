//! HTTP request/response exchanges

use bytes::Bytes;
use hyper::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::call_site::strip_test_suffix;

/// Captured HTTP request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method (e.g., "GET", "POST")
    pub method: String,
    /// Request path
    pub path: String,
    /// Query parameters, decoded, in request order
    pub query: Vec<(String, String)>,
    /// Headers in request order
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Vec<u8>,
}

/// Captured HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

/// Controller and action that handled a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerAnnotation {
    /// Controller name, test suffix stripped
    pub controller: String,
    /// Action name
    pub action: String,
}

/// A request/response pair issued by a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpExchange {
    /// The request
    pub request: HttpRequest,
    /// The response
    pub response: HttpResponse,
    annotation: Option<ControllerAnnotation>,
}

impl HttpExchange {
    /// Pair a request with its response
    #[must_use]
    pub fn new(request: HttpRequest, response: HttpResponse) -> Self {
        Self {
            request,
            response,
            annotation: None,
        }
    }

    /// Capture an exchange from `http` request/response values
    #[must_use]
    pub fn from_http(request: &Request<Bytes>, response: &Response<Bytes>) -> Self {
        let uri = request.uri();

        let request = HttpRequest {
            method: request.method().as_str().to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(parse_query).unwrap_or_default(),
            headers: collect_headers(request.headers()),
            body: request.body().to_vec(),
        };

        let response = HttpResponse {
            status: response.status().as_u16(),
            headers: collect_headers(response.headers()),
            body: response.body().to_vec(),
        };

        Self::new(request, response)
    }

    /// Record which controller and action served this exchange
    ///
    /// Used when middleware answers before the real controller runs.
    /// `module` may be the test module; its test suffix is stripped.
    #[must_use]
    pub fn annotate_controller(mut self, module: &str, action: impl Into<String>) -> Self {
        self.annotation = Some(ControllerAnnotation {
            controller: strip_test_suffix(module).to_string(),
            action: action.into(),
        });
        self
    }

    /// Controller annotation, if any
    #[must_use]
    pub fn annotation(&self) -> Option<&ControllerAnnotation> {
        self.annotation.as_ref()
    }
}

fn collect_headers<'a>(
    headers: impl IntoIterator<Item = (&'a hyper::header::HeaderName, &'a hyper::header::HeaderValue)>,
) -> Vec<(String, String)> {
    headers
        .into_iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Split and percent-decode a query string
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(component: &str) -> String {
    let component = component.replace('+', " ");
    urlencoding::decode(&component).map_or_else(|_| component.clone(), |decoded| decoded.into_owned())
}

/// Annotate an exchange with the current module as controller
///
/// ```
/// use docket::interaction::{HttpExchange, HttpRequest, HttpResponse};
///
/// let exchange = HttpExchange::new(
///     HttpRequest { method: "GET".into(), path: "/".into(), query: vec![], headers: vec![], body: vec![] },
///     HttpResponse { status: 401, headers: vec![], body: vec![] },
/// );
/// let exchange = docket::annotate_controller!(exchange, "index");
/// assert_eq!(exchange.annotation().unwrap().action, "index");
/// ```
#[macro_export]
macro_rules! annotate_controller {
    ($exchange:expr, $action:expr) => {
        $exchange.annotate_controller(module_path!(), $action)
    };
    ($exchange:expr, $module:expr, $action:expr) => {
        $exchange.annotate_controller($module, $action)
    };
}
