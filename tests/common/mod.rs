//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use hearken::infrastructure::adapters::{NexmoDriver, SlackDriver, TelegramDriver};
use hearken::infrastructure::storage::MemoryCache;
use hearken::{BotError, ConversationStore, Dispatcher, HttpClient, HttpResponse, Request};
use serde_json::{json, Value};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One outbound call seen by [`RecordingClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub url: String,
    pub fields: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl Call {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }
}

/// HttpClient fake that records every call and answers with a canned response
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    response: Result<HttpResponse, String>,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Self::responding(HttpResponse::ok(r#"{"ok":true}"#))
    }

    pub fn responding(response: HttpResponse) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            response: Ok(response),
        })
    }

    /// Every call fails at the transport level
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            response: Err("connection refused".to_string()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<HttpResponse, BotError> {
        self.calls.lock().unwrap().push(call);
        self.response
            .clone()
            .map_err(|reason| BotError::send("http", reason))
    }
}

impl HttpClient for RecordingClient {
    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<HttpResponse, BotError> {
        self.record(Call {
            url: url.to_string(),
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            json: None,
        })
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, BotError> {
        self.record(Call {
            url: url.to_string(),
            fields: Vec::new(),
            json: Some(body.clone()),
        })
    }
}

pub fn memory_store() -> ConversationStore {
    ConversationStore::new(Arc::new(MemoryCache::new()))
}

/// Dispatcher with Slack, Nexmo and Telegram drivers over one recording client
pub fn dispatcher(http: Arc<RecordingClient>) -> Dispatcher {
    ensure_init();
    Dispatcher::new(memory_store())
        .with_driver(SlackDriver::new(http.clone()))
        .with_driver(NexmoDriver::new(http.clone(), "key", "secret"))
        .with_driver(TelegramDriver::new(http, "123:ABC"))
}

pub fn slack_event(event: Value) -> Request {
    Request::from_json(json!({ "token": "foo", "event": event }))
}

pub fn slack_message(user: &str, channel: &str, text: &str) -> Request {
    slack_event(json!({ "user": user, "channel": channel, "text": text }))
}

/// Interactive button callback as Slack posts it: form field `payload` holding JSON
pub fn slack_interactive() -> Request {
    Request::from_form([("payload", include_str!("../fixtures/slack_interactive.json"))])
}

/// Interactive callback for an arbitrary user, channel and selected value
pub fn slack_button(user: &str, channel: &str, value: &str) -> Request {
    let payload = json!({
        "actions": [{ "name": value, "value": value, "type": "button" }],
        "callback_id": "question",
        "user": { "id": user },
        "channel": { "id": channel },
        "token": "foo"
    });
    Request::from_form([("payload", payload.to_string())])
}

pub fn nexmo_sms(text: &str) -> Request {
    Request::from_form([
        ("msisdn", "491762012309022505"),
        ("to", "4176260130298"),
        ("messageId", "0C000000075069C7"),
        ("text", text),
        ("type", "text"),
        ("keyword", "HEY"),
        ("message-timestamp", "2016-11-30 19:27:46"),
    ])
}
