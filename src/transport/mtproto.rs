//! MTProto sessions over `layer-client`
//!
//! Every session tunnels through its SOCKS5 relay and persists to a binary
//! session file. Incoming messages are pumped from the client's update
//! stream into whatever notification listeners are registered.

use crate::{
    Error, Result,
    session::client::{
        ListenerGuard, ListenerId, Notification, NotificationSink, SelfIdentity, SessionFactory,
        SessionSpec, SignInOutcome, TelegramSession,
    },
};
use async_trait::async_trait;
use layer_client::{
    BinaryFileBackend, Client, Config, InvocationError, LoginToken, NoRetries, PasswordToken,
    SessionBackend, SignInError, Socks5Config, Update, update::IncomingMessage,
};
use layer_tl_types as tl;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type Listeners = Arc<Mutex<HashMap<u64, NotificationSink>>>;

/// Opens [`MtprotoSession`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct MtprotoSessionFactory;

impl SessionFactory for MtprotoSessionFactory {
    type Session = MtprotoSession;

    fn open(&self, spec: SessionSpec) -> Result<MtprotoSession> {
        if !spec.device.is_empty() {
            tracing::debug!(
                "Device fingerprint {:?} is not configurable on this transport",
                spec.device
            );
        }
        Ok(MtprotoSession {
            spec,
            client: Mutex::new(None),
            pump: Mutex::new(None),
            login: Mutex::new(None),
            password: Mutex::new(None),
            listeners: Listeners::default(),
            next_listener: AtomicU64::new(0),
        })
    }
}

pub struct MtprotoSession {
    spec: SessionSpec,
    client: Mutex<Option<Client>>,
    pump: Mutex<Option<JoinHandle<()>>>,
    login: Mutex<Option<LoginToken>>,
    password: Mutex<Option<PasswordToken>>,
    listeners: Listeners,
    next_listener: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn map_invocation(err: InvocationError) -> Error {
    if let Some(seconds) = err.flood_wait_seconds() {
        return Error::flood_wait(seconds);
    }
    match err {
        InvocationError::Rpc(rpc) => Error::rpc(rpc.code, rpc.name),
        InvocationError::Io(e) => Error::connection(e.to_string()),
        InvocationError::Dropped => Error::connection("request dropped"),
        other => Error::internal(other.to_string()),
    }
}

/// A missing file is a fresh session; a damaged one is a local failure
fn check_session_file(path: &Path) -> Result<()> {
    BinaryFileBackend::new(path)
        .load()
        .map(drop)
        .map_err(|e| Error::parse(path, format!("unreadable session file: {}", e)))
}

/// Private chats carry no `from_id`; the chat peer is then the sender
fn sender_of(message: &IncomingMessage) -> Option<i64> {
    match message.sender_id().or_else(|| message.peer_id())? {
        tl::enums::Peer::User(user) => Some(user.user_id),
        _ => None,
    }
}

fn deliver(listeners: &Listeners, notification: Notification) {
    let mut listeners = lock(listeners);
    listeners.retain(|_, sink| sink.send(notification.clone()).is_ok());
}

impl MtprotoSession {
    fn client(&self) -> Result<Client> {
        lock(&self.client)
            .clone()
            .ok_or_else(|| Error::connection("session is not connected"))
    }

    fn config(&self) -> Config {
        let proxy = &self.spec.proxy;
        Config {
            api_id: self.spec.api_id,
            api_hash: self.spec.api_hash.clone(),
            socks5: Some(Socks5Config::with_auth(
                proxy.address(),
                proxy.username.clone(),
                proxy.password.clone(),
            )),
            retry_policy: Arc::new(NoRetries),
            session_backend: Arc::new(BinaryFileBackend::new(self.spec.path.clone())),
            ..Config::default()
        }
    }
}

#[async_trait]
impl TelegramSession for MtprotoSession {
    async fn connect(&self) -> Result<()> {
        tracing::debug!("Connecting {:?} via {}", self.spec.path, self.spec.proxy);
        check_session_file(&self.spec.path)?;
        let client = Client::connect(self.config()).await.map_err(map_invocation)?;

        let mut updates = client.stream_updates();
        let listeners = Arc::clone(&self.listeners);
        let pump = tokio::spawn(async move {
            while let Some(update) = updates.next().await {
                let Update::NewMessage(message) = update else {
                    continue;
                };
                if message.outgoing() {
                    continue;
                }
                let Some(sender_id) = sender_of(&message) else {
                    continue;
                };
                let text = message.text().unwrap_or_default().to_string();
                deliver(&listeners, Notification { sender_id, text });
            }
        });

        *lock(&self.client) = Some(client);
        if let Some(old) = lock(&self.pump).replace(pump) {
            old.abort();
        }
        Ok(())
    }

    async fn is_authorized(&self) -> Result<bool> {
        self.client()?.is_authorized().await.map_err(map_invocation)
    }

    async fn get_self(&self) -> Result<SelfIdentity> {
        let user = self.client()?.get_me().await.map_err(map_invocation)?;
        Ok(SelfIdentity {
            id: user.id,
            first_name: user.first_name,
            is_self: user.is_self,
        })
    }

    async fn request_code(&self, phone: &str) -> Result<()> {
        let token = self
            .client()?
            .request_login_code(phone)
            .await
            .map_err(map_invocation)?;
        *lock(&self.login) = Some(token);
        Ok(())
    }

    async fn sign_in(&self, _phone: &str, code: &str) -> Result<SignInOutcome> {
        let client = self.client()?;
        let token = lock(&self.login)
            .take()
            .ok_or_else(|| Error::internal("no login code was requested"))?;

        match client.sign_in(&token, code).await {
            Ok(_) => Ok(SignInOutcome::SignedIn),
            Err(SignInError::PasswordRequired(challenge)) => {
                *lock(&self.password) = Some(challenge);
                Ok(SignInOutcome::PasswordRequired)
            }
            Err(SignInError::InvalidCode) => {
                Err(Error::sign_in_rejected("invalid or expired code"))
            }
            Err(SignInError::SignUpRequired) => {
                Err(Error::sign_in_rejected("phone is not registered"))
            }
            Err(SignInError::Other(err)) => Err(map_invocation(err)),
        }
    }

    async fn sign_in_with_password(&self, password: &str) -> Result<()> {
        let client = self.client()?;
        let challenge = lock(&self.password)
            .take()
            .ok_or_else(|| Error::internal("no password challenge pending"))?;

        match client.check_password(challenge, password).await {
            Ok(_) => Ok(()),
            Err(err) if err.is("PASSWORD_HASH_INVALID") => {
                Err(Error::sign_in_rejected("PASSWORD_HASH_INVALID"))
            }
            Err(err) => Err(map_invocation(err)),
        }
    }

    fn add_notification_listener(&self, sink: NotificationSink) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).insert(id, sink);
        ListenerId(id)
    }

    fn remove_notification_listener(&self, id: ListenerId) {
        lock(&self.listeners).remove(&id.0);
    }

    async fn converse(&self, peer: &str, message: &str) -> Result<String> {
        let client = self.client()?;
        let bot_id = match client
            .resolve_peer(&format!("@{}", peer))
            .await
            .map_err(map_invocation)?
        {
            tl::enums::Peer::User(user) => user.user_id,
            _ => return Err(Error::probe(format!("{} is not a user", peer))),
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _listener = ListenerGuard::register(self, tx);

        let bot = tl::enums::Peer::User(tl::types::PeerUser { user_id: bot_id });
        client
            .send_message_to_peer(bot, message)
            .await
            .map_err(map_invocation)?;

        while let Some(notification) = rx.recv().await {
            if notification.sender_id == bot_id {
                return Ok(notification.text);
            }
        }
        Err(Error::connection("update stream closed"))
    }

    async fn disconnect(&self) {
        if let Some(pump) = lock(&self.pump).take() {
            pump.abort();
        }
        let client = lock(&self.client).take();
        if let Some(client) = client {
            if let Err(err) = client.save_session().await {
                tracing::warn!("Failed to save session {:?}: {}", self.spec.path, err);
            }
            tracing::debug!("Disconnected {:?}", self.spec.path);
        }
    }
}
