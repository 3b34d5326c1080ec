//! Scripted in-memory Telegram sessions for unit tests
//!
//! [`ScriptedFactory`] hands out [`ScriptedSession`]s whose behaviour is set
//! up front and whose calls are recorded in a shared [`CallLog`]. A session
//! is treated as the "new" one when its file stem ends in `_new`.

use crate::{
    Error, Result,
    session::client::{
        ListenerId, Notification, NotificationSink, SelfIdentity, SessionFactory, SessionSpec,
        SignInOutcome, TelegramSession,
    },
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const ACCOUNT_ID: i64 = 424242;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Old,
    New,
}

#[derive(Debug, Clone)]
pub enum ScriptedError {
    Connection,
    FloodWait(u64),
    Internal,
}

impl ScriptedError {
    fn to_error(&self) -> Error {
        match self {
            Self::Connection => Error::connection("proxy refused connection"),
            Self::FloodWait(secs) => Error::flood_wait(*secs),
            Self::Internal => Error::internal("unexpected transport state"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScriptedSignIn {
    SignedIn,
    PasswordRequired,
    Rejected,
}

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    FloodWait(u64),
    Fail,
    /// Never answers
    Silent,
}

#[derive(Debug, Clone)]
struct Script {
    connect_failures: HashMap<String, ScriptedError>,
    request_code_failures: HashMap<String, ScriptedError>,
    old_authorized: bool,
    new_authorized: bool,
    identity: SelfIdentity,
    new_identity: Option<SelfIdentity>,
    code_message: Option<(i64, String)>,
    sign_in: ScriptedSignIn,
    password_accepted: bool,
    reply: ScriptedReply,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            connect_failures: HashMap::new(),
            request_code_failures: HashMap::new(),
            old_authorized: true,
            new_authorized: false,
            identity: SelfIdentity {
                id: ACCOUNT_ID,
                first_name: Some("Test".to_string()),
                is_self: true,
            },
            new_identity: None,
            code_message: Some((777000, "Login code: 12345. Do not give this code to anyone".to_string())),
            sign_in: ScriptedSignIn::SignedIn,
            password_accepted: true,
            reply: ScriptedReply::Text(
                "Good news, no limits are currently applied to your account. You're free as a bird!"
                    .to_string(),
            ),
        }
    }
}

/// Everything the scripted sessions were asked to do
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    pub opened: Vec<(Role, String)>,
    pub connects: Vec<(Role, String)>,
    pub disconnects: Vec<(Role, String)>,
    pub listeners_added: usize,
    pub listeners_removed: usize,
    pub live_listeners: usize,
    pub code_requests: Vec<String>,
    pub sign_ins: Vec<String>,
    pub password_submissions: Vec<String>,
    pub conversations: Vec<(String, String)>,
}

impl CallLog {
    pub fn opened_by(&self, role: Role) -> usize {
        self.opened.iter().filter(|(r, _)| *r == role).count()
    }

    pub fn disconnected_by(&self, role: Role) -> usize {
        self.disconnects.iter().filter(|(r, _)| *r == role).count()
    }

    /// Distinct proxy hosts any old session was opened with
    pub fn proxies_tried(&self) -> HashSet<String> {
        self.opened
            .iter()
            .filter(|(r, _)| *r == Role::Old)
            .map(|(_, host)| host.clone())
            .collect()
    }
}

#[derive(Debug, Default)]
struct Shared {
    script: Mutex<Script>,
    log: Mutex<CallLog>,
    listeners: Mutex<HashMap<u64, NotificationSink>>,
    next_listener: AtomicU64,
}

impl Shared {
    fn script(&self) -> Script {
        self.script.lock().unwrap().clone()
    }

    fn record<T>(&self, f: impl FnOnce(&mut CallLog) -> T) -> T {
        f(&mut self.log.lock().unwrap())
    }

    fn deliver(&self, notification: Notification) -> usize {
        let listeners = self.listeners.lock().unwrap();
        listeners
            .values()
            .filter(|sink| sink.send(notification.clone()).is_ok())
            .count()
    }
}

/// Factory producing scripted sessions that share one script and log
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    shared: Arc<Shared>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn edit(self, f: impl FnOnce(&mut Script)) -> Self {
        f(&mut self.shared.script.lock().unwrap());
        self
    }

    pub fn fail_connect(self, host: &str, error: ScriptedError) -> Self {
        let host = host.to_string();
        self.edit(|s| {
            s.connect_failures.insert(host, error);
        })
    }

    /// Make the code request of a new session behind `host` fail
    pub fn fail_request_code(self, host: &str, error: ScriptedError) -> Self {
        let host = host.to_string();
        self.edit(|s| {
            s.request_code_failures.insert(host, error);
        })
    }

    pub fn old_authorized(self, authorized: bool) -> Self {
        self.edit(|s| s.old_authorized = authorized)
    }

    pub fn new_authorized(self, authorized: bool) -> Self {
        self.edit(|s| s.new_authorized = authorized)
    }

    pub fn new_identity(self, identity: SelfIdentity) -> Self {
        self.edit(|s| s.new_identity = Some(identity))
    }

    pub fn code_message(self, message: Option<(i64, &str)>) -> Self {
        let message = message.map(|(sender, text)| (sender, text.to_string()));
        self.edit(|s| s.code_message = message)
    }

    pub fn sign_in(self, outcome: ScriptedSignIn) -> Self {
        self.edit(|s| s.sign_in = outcome)
    }

    pub fn password_accepted(self, accepted: bool) -> Self {
        self.edit(|s| s.password_accepted = accepted)
    }

    pub fn reply(self, reply: ScriptedReply) -> Self {
        self.edit(|s| s.reply = reply)
    }

    pub fn log(&self) -> CallLog {
        self.shared.log.lock().unwrap().clone()
    }

    /// Push a message to every live listener; returns how many received it
    pub fn notify(&self, sender_id: i64, text: &str) -> usize {
        self.shared.deliver(Notification {
            sender_id,
            text: text.to_string(),
        })
    }
}

impl SessionFactory for ScriptedFactory {
    type Session = ScriptedSession;

    fn open(&self, spec: SessionSpec) -> Result<ScriptedSession> {
        let is_new = spec
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with("_new"));
        let role = if is_new { Role::New } else { Role::Old };
        let host = spec.proxy.host.clone();

        self.shared.record(|log| log.opened.push((role, host.clone())));

        Ok(ScriptedSession {
            role,
            host,
            signed_in: AtomicBool::new(false),
            shared: Arc::clone(&self.shared),
        })
    }
}

#[derive(Debug)]
pub struct ScriptedSession {
    role: Role,
    host: String,
    signed_in: AtomicBool,
    shared: Arc<Shared>,
}

#[async_trait]
impl TelegramSession for ScriptedSession {
    async fn connect(&self) -> Result<()> {
        self.shared
            .record(|log| log.connects.push((self.role, self.host.clone())));
        let script = self.shared.script();
        if self.role == Role::Old
            && let Some(err) = script.connect_failures.get(&self.host)
        {
            return Err(err.to_error());
        }
        Ok(())
    }

    async fn is_authorized(&self) -> Result<bool> {
        let script = self.shared.script();
        Ok(match self.role {
            Role::Old => script.old_authorized,
            Role::New => script.new_authorized || self.signed_in.load(Ordering::SeqCst),
        })
    }

    async fn get_self(&self) -> Result<SelfIdentity> {
        let script = self.shared.script();
        Ok(match self.role {
            Role::Old => script.identity,
            Role::New => script.new_identity.unwrap_or(script.identity),
        })
    }

    async fn request_code(&self, phone: &str) -> Result<()> {
        self.shared
            .record(|log| log.code_requests.push(phone.to_string()));
        let script = self.shared.script();
        if let Some(err) = script.request_code_failures.get(&self.host) {
            return Err(err.to_error());
        }
        if let Some((sender_id, text)) = script.code_message {
            self.shared.deliver(Notification { sender_id, text });
        }
        Ok(())
    }

    async fn sign_in(&self, _phone: &str, code: &str) -> Result<SignInOutcome> {
        self.shared.record(|log| log.sign_ins.push(code.to_string()));
        match self.shared.script().sign_in {
            ScriptedSignIn::SignedIn => {
                self.signed_in.store(true, Ordering::SeqCst);
                Ok(SignInOutcome::SignedIn)
            }
            ScriptedSignIn::PasswordRequired => Ok(SignInOutcome::PasswordRequired),
            ScriptedSignIn::Rejected => Err(Error::sign_in_rejected("PHONE_CODE_INVALID")),
        }
    }

    async fn sign_in_with_password(&self, password: &str) -> Result<()> {
        self.shared
            .record(|log| log.password_submissions.push(password.to_string()));
        if self.shared.script().password_accepted {
            self.signed_in.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            Err(Error::sign_in_rejected("PASSWORD_HASH_INVALID"))
        }
    }

    fn add_notification_listener(&self, sink: NotificationSink) -> ListenerId {
        let id = self.shared.next_listener.fetch_add(1, Ordering::SeqCst);
        self.shared.listeners.lock().unwrap().insert(id, sink);
        self.shared.record(|log| {
            log.listeners_added += 1;
            log.live_listeners += 1;
        });
        ListenerId(id)
    }

    fn remove_notification_listener(&self, id: ListenerId) {
        if self.shared.listeners.lock().unwrap().remove(&id.0).is_some() {
            self.shared.record(|log| {
                log.listeners_removed += 1;
                log.live_listeners -= 1;
            });
        }
    }

    async fn converse(&self, peer: &str, message: &str) -> Result<String> {
        self.shared
            .record(|log| log.conversations.push((peer.to_string(), message.to_string())));
        match self.shared.script().reply {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::FloodWait(secs) => Err(Error::flood_wait(secs)),
            ScriptedReply::Fail => Err(Error::probe("peer not found")),
            ScriptedReply::Silent => std::future::pending().await,
        }
    }

    async fn disconnect(&self) {
        self.shared
            .record(|log| log.disconnects.push((self.role, self.host.clone())));
    }
}
