#![allow(dead_code)]

use async_trait::async_trait;
use lifedesk_core::controller::ControllerContext;
use lifedesk_core::notify::{Notification, NotificationLevel, Notifier};
use lifedesk_core::session::{SessionReader, SessionState};
use lifedesk_core::transport::{ApiClient, ApiError, ApiRequest, ApiResult, Transport};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};

pub const TEST_TOKEN: &str = "test-token";

struct Reply {
    result: ApiResult<Value>,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Reply>>,
    sticky: HashMap<String, ApiResult<Value>>,
    requests: Vec<ApiRequest>,
}

/// Scripted transport keyed by `ApiRequest::route_key`.
///
/// Queued replies are consumed in order; sticky replies answer every
/// request once the queue for that route is empty.
#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<Script>,
    sent: Notify,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, route: &str, body: Value) {
        self.push(route, Ok(body), None);
    }

    pub fn fail(&self, route: &str, err: ApiError) {
        self.push(route, Err(err), None);
    }

    /// Queues a reply that is held back until the returned sender fires.
    pub fn gated_reply(&self, route: &str, body: Value) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.push(route, Ok(body), Some(gate));
        release
    }

    pub fn always(&self, route: &str, body: Value) {
        self.script
            .lock()
            .unwrap()
            .sticky
            .insert(route.to_string(), Ok(body));
    }

    fn push(&self, route: &str, result: ApiResult<Value>, gate: Option<oneshot::Receiver<()>>) {
        self.script
            .lock()
            .unwrap()
            .queued
            .entry(route.to_string())
            .or_default()
            .push_back(Reply { result, gate });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn routes(&self) -> Vec<String> {
        self.requests().iter().map(ApiRequest::route_key).collect()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    pub async fn wait_for_requests(&self, count: usize) {
        loop {
            let sent = self.sent.notified();
            if self.request_count() >= count {
                return;
            }
            sent.await;
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let route = request.route_key();
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.requests.push(request);
            match script.queued.get_mut(&route).and_then(VecDeque::pop_front) {
                Some(reply) => reply,
                None => Reply {
                    result: script.sticky.get(&route).cloned().unwrap_or_else(|| {
                        Err(ApiError::transport(format!("no scripted reply for {route}")))
                    }),
                    gate: None,
                },
            }
        };
        self.sent.notify_waiters();

        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }
        reply.result
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<Notification> {
        self.by_level(NotificationLevel::Error)
    }

    pub fn successes(&self) -> Vec<Notification> {
        self.by_level(NotificationLevel::Success)
    }

    fn by_level(&self, level: NotificationLevel) -> Vec<Notification> {
        self.all()
            .into_iter()
            .filter(|notification| notification.level == level)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub ctx: ControllerContext,
}

pub fn harness_with(state: SessionState) -> Harness {
    let transport = FakeTransport::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = ControllerContext::new(
        ApiClient::new(transport.clone()),
        SessionReader::fixed(state),
        notifier.clone(),
    );
    Harness {
        transport,
        notifier,
        ctx,
    }
}

pub fn signed_in() -> Harness {
    harness_with(SessionState::Authenticated {
        token: TEST_TOKEN.to_string(),
        profile: None,
    })
}

pub fn accept(_prompt: &str) -> bool {
    true
}

pub fn decline(_prompt: &str) -> bool {
    false
}
