//! Sub-request construction and sub-response harvesting.
//!
//! # Responsibilities
//! - Translate a descriptor into an `http::Request` against the inner app
//! - Forward the outer header set, minus the outer body's Content-Length
//! - Attach the JSON payload for POST/PUT/PATCH
//! - Harvest status, parsed body and Set-Cookie values from a sub-response

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Uri};
use axum::response::Response;
use serde_json::{Map, Value};

use crate::batch::error::SubRequestError;
use crate::batch::types::SubRequest;

/// The harvested pieces of one sub-response: the result-slot fields plus
/// any cookies it set.
#[derive(Debug)]
pub struct SubResponse {
    pub status: u16,
    pub body: Value,
    pub set_cookies: Vec<HeaderValue>,
}

/// Resolve a descriptor method name against the dispatchable set.
///
/// Unrecognized names are an explicit per-item error, never a silent skip.
pub fn parse_method(name: &str) -> Result<Method, SubRequestError> {
    match name {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        other => Err(SubRequestError::UnsupportedMethod(other.to_string())),
    }
}

/// Build the in-process request for one descriptor.
///
/// Every outer header except `Content-Length` is forwarded, so the host
/// handler sees the caller's session (`Cookie` rides along verbatim). The
/// outer Content-Length described the batch body, not any sub-request body,
/// and is dropped.
pub fn build_sub_request(
    sub: &SubRequest,
    outer_headers: &HeaderMap,
) -> Result<Request<Body>, SubRequestError> {
    let method = parse_method(&sub.method)?;
    let uri: Uri = sub.url.parse().map_err(|e: axum::http::uri::InvalidUri| {
        SubRequestError::InvalidUrl {
            url: sub.url.clone(),
            reason: e.to_string(),
        }
    })?;

    let payload = match method {
        Method::POST | Method::PUT | Method::PATCH => sub.body.as_ref(),
        _ => None,
    };

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in outer_headers {
            if *name == header::CONTENT_LENGTH {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
    }

    let body = match payload {
        Some(value) => {
            let bytes =
                serde_json::to_vec(value).map_err(|e| SubRequestError::Invoke(e.to_string()))?;
            if let Some(headers) = builder.headers_mut() {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            Body::from(bytes)
        }
        None => Body::empty(),
    };

    builder
        .body(body)
        .map_err(|e| SubRequestError::Invoke(e.to_string()))
}

/// Harvest the pieces of a sub-response the batch reply needs.
///
/// Empty bodies (204, the default 404) read back as `{}`; non-JSON bodies
/// are preserved as a string.
pub async fn harvest(response: Response) -> Result<SubResponse, SubRequestError> {
    let status = response.status().as_u16();
    let set_cookies: Vec<HeaderValue> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .cloned()
        .collect();

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| SubRequestError::Body(e.to_string()))?;

    let body = if bytes.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Ok(SubResponse {
        status,
        body,
        set_cookies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(method: &str, url: &str) -> SubRequest {
        SubRequest {
            method: method.to_string(),
            url: url.to_string(),
            body: None,
        }
    }

    #[test]
    fn recognizes_the_dispatchable_methods() {
        for name in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
            assert!(parse_method(name).is_ok(), "{name} should be dispatchable");
        }
    }

    #[test]
    fn method_matching_is_strict() {
        assert!(matches!(
            parse_method("get"),
            Err(SubRequestError::UnsupportedMethod(_))
        ));
        assert!(matches!(
            parse_method("HEAD"),
            Err(SubRequestError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn query_strings_survive_the_uri_parse() {
        let request =
            build_sub_request(&descriptor("GET", "/api/one/111?filter=blah"), &HeaderMap::new())
                .unwrap();
        assert_eq!(request.uri().path(), "/api/one/111");
        assert_eq!(request.uri().query(), Some("filter=blah"));
    }

    #[test]
    fn body_is_not_attached_for_get_or_delete() {
        let sub = SubRequest {
            method: "DELETE".to_string(),
            url: "/api/one/1".to_string(),
            body: Some(serde_json::json!({ "ignored": true })),
        };
        let request = build_sub_request(&sub, &HeaderMap::new()).unwrap();
        // No payload means no content-type override either.
        assert!(!request.headers().contains_key(header::CONTENT_TYPE));
    }
}
