//! Shared test utilities: an in-process fake Zulip realm.
//!
//! The fake speaks enough of the REST API for the endpoint wrappers
//! (envelopes, basic auth, form/query parameters) and records every request
//! it receives so tests can assert on exactly what went over the wire.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use base64::Engine;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use zulip_api::ZulipClient;
use zulip_core::config::ServerConfig;

pub const EMAIL: &str = "iago@zulip.com";
pub const API_KEY: &str = "secret-api-key";
pub const USER_ID: u64 = 11;

/// One request as seen by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path with the `/api/v1` prefix removed.
    pub path: String,
    /// Query parameters for GET, form body for everything else.
    pub params: BTreeMap<String, String>,
    pub auth: Option<(String, String)>,
}

#[derive(Default)]
struct Realm {
    requests: Vec<RecordedRequest>,
    streams: BTreeMap<String, u64>,
    subscriptions: BTreeSet<String>,
    messages: Vec<Value>,
    users: Vec<Value>,
    queues: BTreeMap<String, Vec<Value>>,
    next_id: u64,
    /// How long `GET /events` waits before answering.
    events_delay: Option<Duration>,
    /// Make `GET /events` answer with a server error.
    fail_event_polls: bool,
}

impl Realm {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn stream_id(&mut self, name: &str) -> u64 {
        if let Some(id) = self.streams.get(name) {
            return *id;
        }
        let id = self.next_id();
        self.streams.insert(name.to_string(), id);
        id
    }

    fn stream_record(&self, name: &str) -> Value {
        json!({"name": name, "stream_id": self.streams.get(name).copied().unwrap_or_default()})
    }

    fn push_event(&mut self, mut event: Value) {
        for events in self.queues.values_mut() {
            let id = events.len() as i64;
            event["id"] = json!(id);
            events.push(event.clone());
        }
    }
}

type Shared = Arc<Mutex<Realm>>;

/// A running fake realm bound to a random local port.
pub struct FakeZulip {
    pub addr: SocketAddr,
    realm: Shared,
}

impl FakeZulip {
    /// Start the fake server on a random port.
    pub async fn start() -> Self {
        let mut realm = Realm::default();
        realm.stream_id("general");
        realm.users.push(json!({"email": EMAIL, "user_id": USER_ID, "full_name": "Iago"}));
        let realm: Shared = Arc::new(Mutex::new(realm));

        let app = Router::new().fallback(handle).with_state(realm.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake server");
        let addr = listener.local_addr().expect("no local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake server crashed");
        });

        Self { addr, realm }
    }

    pub fn realm_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client authenticated as the fake realm's user.
    pub fn client(&self) -> ZulipClient {
        ZulipClient::new(ServerConfig::new(EMAIL, API_KEY, self.realm_url()))
            .expect("failed to build client")
    }

    /// A client whose base request timeout is `api_timeout_ms`.
    pub fn client_with_timeout(&self, api_timeout_ms: u64) -> ZulipClient {
        let mut config = ServerConfig::new(EMAIL, API_KEY, self.realm_url());
        config.api_timeout_ms = api_timeout_ms;
        ZulipClient::new(config).expect("failed to build client")
    }

    /// A client with the wrong API key.
    pub fn client_with_key(&self, key: &str) -> ZulipClient {
        ZulipClient::new(ServerConfig::new(EMAIL, key, self.realm_url()))
            .expect("failed to build client")
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.realm.lock().expect("realm lock poisoned").requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.realm.lock().expect("realm lock poisoned").requests.len()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no requests recorded")
    }

    /// Hold every `GET /events` for `delay` before answering, like a
    /// server waiting for its heartbeat.
    pub fn delay_events(&self, delay: Duration) {
        self.realm.lock().expect("realm lock poisoned").events_delay = Some(delay);
    }

    /// Make every `GET /events` fail with a 500.
    pub fn fail_event_polls(&self) {
        self.realm.lock().expect("realm lock poisoned").fail_event_polls = true;
    }

    /// Drop a queue on the server side, as garbage collection would.
    pub fn expire_queue(&self, queue_id: &str) {
        self.realm.lock().expect("realm lock poisoned").queues.remove(queue_id);
    }

    /// Ids of the queues the server still holds.
    pub fn open_queues(&self) -> Vec<String> {
        let realm = self.realm.lock().expect("realm lock poisoned");
        realm.queues.keys().cloned().collect()
    }
}

/// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

fn success(mut payload: Value) -> Response {
    payload["result"] = json!("success");
    payload["msg"] = json!("");
    (StatusCode::OK, Json(payload)).into_response()
}

fn error(status: StatusCode, code: &str, msg: String) -> Response {
    (status, Json(json!({"result": "error", "msg": msg, "code": code}))).into_response()
}

fn bad_request(msg: String) -> Response {
    error(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
}

fn parse_pairs(encoded: &str) -> BTreeMap<String, String> {
    let url = reqwest::Url::parse(&format!("http://fake/?{encoded}")).expect("bad encoding");
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn parse_basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, secret) = decoded.split_once(':')?;
    Some((user.to_string(), secret.to_string()))
}

fn json_param(params: &BTreeMap<String, String>, key: &str) -> Option<Value> {
    params.get(key).and_then(|raw| serde_json::from_str(raw).ok())
}

async fn handle(
    State(realm): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/api/v1")
        .unwrap_or(uri.path())
        .to_string();
    let params = if method == Method::GET {
        parse_pairs(uri.query().unwrap_or_default())
    } else {
        parse_pairs(&body)
    };
    let auth = parse_basic_auth(&headers);

    // Sleep outside the lock.
    if method == Method::GET && path == "/events" {
        let delay = realm.lock().expect("realm lock poisoned").events_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    let mut realm = realm.lock().expect("realm lock poisoned");
    realm.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        params: params.clone(),
        auth: auth.clone(),
    });

    // Endpoints that need no account.
    match (method.as_str(), path.as_str()) {
        ("GET", "/server_settings") => {
            return success(json!({"realm_name": "Zulip Dev", "zulip_version": "8.0"}));
        }
        ("GET", "/not_json") => {
            return (StatusCode::BAD_GATEWAY, "<html>upstream error</html>").into_response();
        }
        ("GET", "/array") => return (StatusCode::OK, Json(json!([1, 2, 3]))).into_response(),
        _ => {}
    }

    if auth != Some((EMAIL.to_string(), API_KEY.to_string())) {
        return error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid API key".into());
    }

    route(&mut realm, &method, &path, &params)
}

fn route(
    realm: &mut Realm,
    method: &Method,
    path: &str,
    params: &BTreeMap<String, String>,
) -> Response {
    let param = |key: &str| params.get(key).cloned().unwrap_or_default();

    match (method.as_str(), path) {
        ("POST", "/messages") => {
            let kind = param("type");
            let to = param("to");
            if kind == "stream" && !realm.streams.contains_key(&to) {
                return bad_request(format!("Stream '{to}' does not exist"));
            }
            let id = realm.next_id();
            let message = json!({
                "id": id,
                "type": kind,
                "display_recipient": to,
                "subject": param("subject"),
                "content": param("content"),
                "sender_email": EMAIL,
                "timestamp": 1_700_000_000 + id,
            });
            realm.messages.push(message.clone());
            realm.push_event(json!({"type": "message", "message": message}));
            success(json!({"id": id}))
        }
        ("GET", "/messages") => {
            let narrow = json_param(params, "narrow").unwrap_or(json!([]));
            let stream = narrow
                .as_array()
                .and_then(|terms| terms.iter().find(|t| t[0] == "stream"))
                .and_then(|t| t[1].as_str().map(str::to_string));
            let message_id = narrow
                .as_array()
                .and_then(|terms| terms.iter().find(|t| t[0] == "id"))
                .and_then(|t| t[1].as_u64());
            let messages: Vec<Value> = realm
                .messages
                .iter()
                .filter(|m| match &stream {
                    Some(name) => m["display_recipient"] == name.as_str(),
                    None => true,
                })
                .filter(|m| message_id.map_or(true, |id| m["id"] == id))
                .cloned()
                .collect();
            success(json!({"messages": messages, "anchor": param("anchor")}))
        }
        ("POST", "/messages/render") => {
            success(json!({"rendered": format!("<p>{}</p>", param("content"))}))
        }
        ("GET", "/streams") => {
            let streams: Vec<Value> = realm
                .streams
                .keys()
                .map(|name| realm.stream_record(name))
                .collect();
            success(json!({"streams": streams}))
        }
        ("GET", "/get_stream_id") => {
            let name = param("stream");
            match realm.streams.get(&name) {
                Some(id) => success(json!({"stream_id": id})),
                None => bad_request(format!("Invalid stream name '{name}'")),
            }
        }
        ("GET", "/users/me/subscriptions") => {
            let subs: Vec<Value> = realm
                .subscriptions
                .iter()
                .map(|name| realm.stream_record(name))
                .collect();
            success(json!({"subscriptions": subs}))
        }
        ("POST", "/users/me/subscriptions") => {
            let Some(Value::Array(specs)) = json_param(params, "subscriptions") else {
                return bad_request("Missing 'subscriptions' argument".into());
            };
            let principals: Vec<String> = json_param(params, "principals")
                .and_then(|p| serde_json::from_value(p).ok())
                .unwrap_or_else(|| vec![EMAIL.to_string()]);

            let mut subscribed: BTreeMap<String, Vec<String>> = BTreeMap::new();
            let mut already: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for spec in specs {
                let Some(name) = spec["name"].as_str() else {
                    return bad_request("Invalid subscriptions".into());
                };
                realm.stream_id(name);
                for principal in &principals {
                    let is_me = principal == EMAIL;
                    if is_me && realm.subscriptions.contains(name) {
                        already.entry(principal.clone()).or_default().push(name.into());
                    } else {
                        if is_me {
                            realm.subscriptions.insert(name.to_string());
                        }
                        subscribed.entry(principal.clone()).or_default().push(name.into());
                    }
                }
            }
            success(json!({"subscribed": subscribed, "already_subscribed": already}))
        }
        ("DELETE", "/users/me/subscriptions") => {
            let names: Vec<String> = json_param(params, "subscriptions")
                .and_then(|p| serde_json::from_value(p).ok())
                .unwrap_or_default();
            let (removed, not_subscribed): (Vec<String>, Vec<String>) = names
                .into_iter()
                .partition(|name| realm.subscriptions.contains(name));
            for name in &removed {
                realm.subscriptions.remove(name);
            }
            success(json!({"removed": removed, "not_subscribed": not_subscribed}))
        }
        ("GET", "/users") => success(json!({"members": realm.users.clone()})),
        ("GET", "/users/me") => {
            let avatar_url = if param("client_gravatar") == "true" {
                Value::Null
            } else {
                json!("https://secure.gravatar.com/avatar/x")
            };
            success(json!({
                "email": EMAIL,
                "user_id": USER_ID,
                "full_name": "Iago",
                "is_admin": true,
                "avatar_url": avatar_url,
            }))
        }
        ("POST", "/users") => {
            let email = param("email");
            for key in ["email", "password", "full_name", "short_name"] {
                if param(key).is_empty() {
                    return bad_request(format!("Missing '{key}' argument"));
                }
            }
            if realm.users.iter().any(|u| u["email"] == email.as_str()) {
                return bad_request(format!("Email '{email}' already in use"));
            }
            let user_id = realm.next_id();
            realm.users.push(json!({
                "email": email,
                "user_id": user_id,
                "full_name": param("full_name"),
            }));
            success(json!({}))
        }
        ("POST", "/register") => {
            if json_param(params, "narrow").is_none() {
                return bad_request("Invalid narrow".into());
            }
            let queue_id = format!("1700000000:{}", realm.next_id());
            realm.queues.insert(queue_id.clone(), Vec::new());
            success(json!({
                "queue_id": queue_id,
                "last_event_id": -1,
                "zulip_version": "8.0",
                "event_types": json_param(params, "event_types"),
            }))
        }
        ("GET", "/events") if realm.fail_event_polls => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "Internal server error".into(),
        ),
        ("GET", "/events") => {
            let queue_id = param("queue_id");
            let last: i64 = param("last_event_id").parse().unwrap_or(-1);
            match realm.queues.get(&queue_id) {
                Some(events) => {
                    let newer: Vec<Value> = events
                        .iter()
                        .filter(|e| e["id"].as_i64().unwrap_or(-1) > last)
                        .cloned()
                        .collect();
                    success(json!({"events": newer, "queue_id": queue_id}))
                }
                None => error(
                    StatusCode::BAD_REQUEST,
                    "BAD_EVENT_QUEUE_ID",
                    format!("Bad event queue id: {queue_id}"),
                ),
            }
        }
        ("DELETE", "/events") => {
            let queue_id = param("queue_id");
            match realm.queues.remove(&queue_id) {
                Some(_) => success(json!({})),
                None => error(
                    StatusCode::BAD_REQUEST,
                    "BAD_EVENT_QUEUE_ID",
                    format!("Bad event queue id: {queue_id}"),
                ),
            }
        }
        ("PATCH", p) if p.starts_with("/messages/") => {
            let id: u64 = p.trim_start_matches("/messages/").parse().unwrap_or(0);
            let content = param("content");
            match realm.messages.iter_mut().find(|m| m["id"] == id) {
                Some(message) => {
                    message["content"] = json!(content);
                    success(json!({}))
                }
                None => bad_request("Invalid message(s)".into()),
            }
        }
        _ => error(
            StatusCode::NOT_FOUND,
            "BAD_REQUEST",
            "Endpoint does not exist.".into(),
        ),
    }
}
