//! Authenticated request construction and JSON response handling.

use bar_host::{HttpMethod, HttpRequest, HttpTransport};
use serde_json::{Map, Value};

use crate::{error::StackError, session::Session};

const JSON_MIME: &str = "application/json";

/// Body attached to a [`cozy_fetch_json`] request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON and sent as `application/json`.
    Json(Value),
    /// Sent verbatim with the caller's own content type.
    Raw {
        /// `Content-Type` header value.
        content_type: String,
        /// Pre-serialized body.
        data: String,
    },
}

/// Builds a request carrying the session's credentials.
///
/// Cookies are included even cross-origin, the token goes in `Authorization: Bearer`, and JSON
/// is requested.
pub fn fetch_options(session: &Session, method: HttpMethod, url: impl Into<String>) -> HttpRequest {
    let mut request = HttpRequest::new(method, url);
    request.include_credentials = true;
    request.set_header("Authorization", format!("Bearer {}", session.token));
    request.set_header("Accept", JSON_MIME);
    request
}

/// Sends `request` and decodes the JSON body.
///
/// Statuses listed in [`StackError::from_status`] short-circuit before the body is read.
///
/// # Errors
///
/// Returns the status-mapped error, [`StackError::Transport`] when no response arrived, or
/// [`StackError::Decode`] when the body is not JSON.
pub async fn fetch_json<T: HttpTransport + ?Sized>(
    transport: &T,
    request: HttpRequest,
) -> Result<Value, StackError> {
    let response = transport
        .send(request)
        .await
        .map_err(StackError::Transport)?;
    if let Some(error) = StackError::from_status(response.status) {
        return Err(error);
    }
    serde_json::from_slice(&response.body).map_err(|err| StackError::Decode(err.to_string()))
}

/// Extracts `data` from a JSON:API document, surfacing an `error` field as a failure.
///
/// # Errors
///
/// Returns [`StackError::Server`] when the document carries `error`, or [`StackError::Decode`]
/// when it has no `data`.
pub fn unwrap_data(mut json: Value) -> Result<Value, StackError> {
    if let Some(error) = json.get("error").filter(|error| !error.is_null()) {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(StackError::Server(message));
    }
    match json.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(StackError::Decode("response has no `data` member".to_string())),
    }
}

/// Builds the request issued by [`cozy_fetch_json`].
pub fn build_json_request(
    session: &Session,
    method: HttpMethod,
    path: &str,
    body: Option<RequestBody>,
) -> HttpRequest {
    let mut request = fetch_options(session, method, session.url(path));
    if !method.allows_body() {
        return request;
    }
    match body {
        Some(RequestBody::Json(value)) => {
            request.set_header("Content-Type", JSON_MIME);
            request.body = Some(value.to_string());
        }
        Some(RequestBody::Raw { content_type, data }) => {
            request.set_header("Content-Type", content_type);
            request.body = Some(data);
        }
        None => {}
    }
    request
}

/// Generic JSON request helper shared with the intents library.
///
/// Resolves with the document's `data` object; a truthy `id` is mirrored into `_id` for clients
/// written against the older document shape.
///
/// # Errors
///
/// Propagates [`fetch_json`] errors.
pub async fn cozy_fetch_json<T: HttpTransport + ?Sized>(
    transport: &T,
    session: &Session,
    method: HttpMethod,
    path: &str,
    body: Option<RequestBody>,
) -> Result<Map<String, Value>, StackError> {
    let json = fetch_json(transport, build_json_request(session, method, path, body)).await?;
    Ok(with_legacy_id(json.get("data")))
}

fn with_legacy_id(data: Option<&Value>) -> Map<String, Value> {
    let mut data = match data {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let id = data.get("id").filter(|id| is_truthy(id)).cloned();
    if let Some(id) = id {
        data.insert("_id".to_string(), id);
    }
    data
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use bar_host::{HttpResponse, MemoryHttpTransport};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::session::StackConfig;

    fn session() -> Session {
        Session::from_config(&StackConfig::new("cozy.example", "T"))
    }

    #[test]
    fn fetch_options_carry_credentials_and_token() {
        let request = fetch_options(&session(), HttpMethod::Get, "https://cozy.example/apps/");
        assert!(request.include_credentials);
        assert_eq!(request.header("authorization"), Some("Bearer T"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.body, None);
    }

    #[test]
    fn mapped_statuses_never_decode_the_body() {
        let transport = MemoryHttpTransport::default();
        for status in [401, 403, 404, 405, 500] {
            let url = format!("https://cozy.example/status/{status}");
            transport.respond(
                HttpMethod::Get,
                url.as_str(),
                HttpResponse::json(status, &json!({"data": []})),
            );
            let err = block_on(fetch_json(&transport, HttpRequest::new(HttpMethod::Get, url)))
                .expect_err("mapped status should fail");
            assert_eq!(Some(err), StackError::from_status(status));
        }
    }

    #[test]
    fn not_found_wins_over_garbage_body() {
        let transport = MemoryHttpTransport::default();
        let url = "https://cozy.example/settings/context";
        transport.respond(HttpMethod::Get, url, HttpResponse::new(404, "<html>nope"));
        let err = block_on(fetch_json(&transport, HttpRequest::new(HttpMethod::Get, url)))
            .expect_err("404");
        assert_eq!(err, StackError::NotFound);
    }

    #[test]
    fn unmapped_status_decodes_and_reports_bad_json() {
        let transport = MemoryHttpTransport::default();
        let url = "https://cozy.example/apps/";
        transport.respond(HttpMethod::Get, url, HttpResponse::new(502, "bad gateway"));
        let err = block_on(fetch_json(&transport, HttpRequest::new(HttpMethod::Get, url)))
            .expect_err("502 with text body");
        assert!(matches!(err, StackError::Decode(_)));
    }

    #[test]
    fn transport_failure_is_reported_as_transport_error() {
        let transport = MemoryHttpTransport::default();
        let url = "https://cozy.example/apps/";
        transport.fail(HttpMethod::Get, url, "offline");
        let err = block_on(fetch_json(&transport, HttpRequest::new(HttpMethod::Get, url)))
            .expect_err("offline");
        assert_eq!(err, StackError::Transport("offline".to_string()));
    }

    #[test]
    fn unwrap_data_surfaces_error_member() {
        assert_eq!(
            unwrap_data(json!({"error": "app is not installed"})),
            Err(StackError::Server("app is not installed".to_string()))
        );
        assert_eq!(unwrap_data(json!({"data": [1]})), Ok(json!([1])));
        assert!(matches!(unwrap_data(json!({})), Err(StackError::Decode(_))));
    }

    #[test]
    fn json_body_sets_content_type_only_for_body_verbs() {
        let session = session();
        let post = build_json_request(
            &session,
            HttpMethod::Post,
            "/jobs/queue/thumbnail",
            Some(RequestBody::Json(json!({"data": {"a": 1}}))),
        );
        assert_eq!(post.url, "https://cozy.example/jobs/queue/thumbnail");
        assert_eq!(post.header("content-type"), Some("application/json"));
        assert_eq!(post.body.as_deref(), Some(r#"{"data":{"a":1}}"#));

        let get = build_json_request(
            &session,
            HttpMethod::Get,
            "/apps/",
            Some(RequestBody::Json(json!({"ignored": true}))),
        );
        assert_eq!(get.header("content-type"), None);
        assert_eq!(get.body, None);
    }

    #[test]
    fn raw_body_keeps_caller_content_type() {
        let request = build_json_request(
            &session(),
            HttpMethod::Put,
            "/files/123",
            Some(RequestBody::Raw {
                content_type: "text/plain".to_string(),
                data: "hello".to_string(),
            }),
        );
        assert_eq!(request.header("content-type"), Some("text/plain"));
        assert_eq!(request.body.as_deref(), Some("hello"));
    }

    #[test]
    fn cozy_fetch_json_mirrors_id() {
        let transport = MemoryHttpTransport::default();
        transport.respond_json(
            HttpMethod::Post,
            "https://cozy.example/intents",
            200,
            json!({"data": {"id": "abc", "type": "io.cozy.intents"}}),
        );

        let data = block_on(cozy_fetch_json(
            &transport,
            &session(),
            HttpMethod::Post,
            "/intents",
            Some(RequestBody::Json(json!({"data": {}}))),
        ))
        .expect("cozy fetch");

        assert_eq!(data.get("_id"), Some(&json!("abc")));
        assert_eq!(data.get("id"), Some(&json!("abc")));
        let sent = transport.requests();
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
    }

    #[test]
    fn legacy_id_skips_empty_ids_and_non_objects() {
        assert_eq!(with_legacy_id(Some(&json!({"id": ""}))).get("_id"), None);
        assert!(with_legacy_id(Some(&json!([1, 2]))).is_empty());
        assert!(with_legacy_id(None).is_empty());
    }
}
