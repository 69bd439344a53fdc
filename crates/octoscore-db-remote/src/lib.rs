//! Resilient TCP [`ScoreStore`] backend.
//!
//! Speaks a minimal call protocol against the remote engine: one JSON object
//! per line, `{"call": <name>, "args": [...]}` answered by `{"ok": <value>}`
//! or `{"error": <message>}`. A missing record answers `{"ok": null}`.
//!
//! Resilience rules:
//!
//! - `connect` tries up to the configured attempt count and never errors;
//!   an absent handle after the loop is the only failure signal.
//! - Every operation pings the live connection first and lazily reconnects
//!   on any failure.
//! - The authoritative `get` fails with `Unavailable` when no handle could
//!   be established; the cache operations degrade to `None` instead.
//!
//! The connection handle lives behind a `tokio::sync::Mutex`: access is
//! serialized by construction, which is the assumption the reconnect logic
//! depends on.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio::time::timeout;

use octoscore_storage::{ScoreStore, StorageError};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 7333;
const DEFAULT_TIMEOUT_MS: u64 = 1000;
const DEFAULT_RECONNECT_ATTEMPTS: u32 = 2;

/// Connection settings for the remote store.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteStoreConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Socket timeout applied to connect, write and read, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Bounded reconnect attempt count; attempts are immediate, no backoff.
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_reconnect_attempts() -> u32 {
    DEFAULT_RECONNECT_ATTEMPTS
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            reconnect_attempts: default_reconnect_attempts(),
        }
    }
}

impl RemoteStoreConfig {
    fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    socket_timeout: Duration,
}

impl Connection {
    async fn open(config: &RemoteStoreConfig) -> io::Result<Self> {
        let stream = timeout(config.socket_timeout(), TcpStream::connect(config.endpoint()))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            socket_timeout: config.socket_timeout(),
        })
    }

    /// Issues one call frame and reads one reply line.
    async fn call(&mut self, call: &str, args: &[Value]) -> Result<Value, StorageError> {
        let mut frame = serde_json::to_string(&json!({"call": call, "args": args}))
            .map_err(|err| StorageError::protocol(err.to_string()))?;
        frame.push('\n');

        timeout(self.socket_timeout, self.writer.write_all(frame.as_bytes()))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "write timed out"))??;

        let mut line = String::new();
        let read = timeout(self.socket_timeout, self.reader.read_line(&mut line))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "read timed out"))??;
        if read == 0 {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by remote",
            )));
        }

        let reply: Value = serde_json::from_str(line.trim())
            .map_err(|err| StorageError::protocol(format!("unreadable reply: {err}")))?;
        if let Some(message) = reply.get("error").and_then(Value::as_str) {
            return Err(StorageError::protocol(message));
        }
        reply
            .get("ok")
            .cloned()
            .ok_or_else(|| StorageError::protocol("reply carries neither ok nor error"))
    }

    async fn ping(&mut self) -> Result<(), StorageError> {
        self.call("ping", &[]).await.map(|_| ())
    }
}

/// TCP-backed store with bounded reconnects and a liveness ping before use.
pub struct RemoteStore {
    config: RemoteStoreConfig,
    conn: Mutex<Option<Connection>>,
}

impl RemoteStore {
    /// Creates the store without touching the network; the first operation
    /// (or an explicit [`connect`](Self::connect)) establishes the handle.
    pub fn new(config: RemoteStoreConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    /// Attempts to establish the connection up to the configured attempt
    /// count. Never errors; an absent handle afterwards means failure.
    pub async fn connect(&self) {
        let mut slot = self.conn.lock().await;
        self.connect_locked(&mut slot).await;
    }

    /// True if a connection handle is currently held.
    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    async fn connect_locked(&self, slot: &mut Option<Connection>) {
        for attempt in 1..=self.config.reconnect_attempts.max(1) {
            match Connection::open(&self.config).await {
                Ok(conn) => {
                    tracing::debug!(endpoint = %self.config.endpoint(), "store connected");
                    *slot = Some(conn);
                    return;
                }
                Err(err) => {
                    tracing::warn!(
                        endpoint = %self.config.endpoint(),
                        attempt,
                        error = %err,
                        "store connect attempt failed"
                    );
                    *slot = None;
                }
            }
        }
    }

    /// Pings the held connection and lazily reconnects on any failure.
    async fn ensure_live(&self, slot: &mut Option<Connection>) {
        if let Some(conn) = slot.as_mut() {
            if conn.ping().await.is_ok() {
                return;
            }
            *slot = None;
        }
        self.connect_locked(slot).await;
    }

    fn drop_if_broken(slot: &mut Option<Connection>, err: &StorageError) {
        if matches!(err, StorageError::Io(_)) {
            *slot = None;
        }
    }
}

#[async_trait]
impl ScoreStore for RemoteStore {
    async fn get(&self, key: &str) -> Result<String, StorageError> {
        let mut slot = self.conn.lock().await;
        self.ensure_live(&mut slot).await;
        let Some(conn) = slot.as_mut() else {
            return Err(StorageError::unavailable(format!(
                "{} not reachable",
                self.config.endpoint()
            )));
        };
        match conn.call("get_interests", &[json!(key)]).await {
            Ok(Value::Null) => Err(StorageError::not_found(key)),
            Ok(Value::String(record)) => Ok(record),
            Ok(other) => Err(StorageError::protocol(format!(
                "expected a serialized record, got {other}"
            ))),
            Err(err) => {
                Self::drop_if_broken(&mut slot, &err);
                Err(err)
            }
        }
    }

    async fn cache_get(&self, key: &str) -> Option<f64> {
        let mut slot = self.conn.lock().await;
        self.ensure_live(&mut slot).await;
        let conn = slot.as_mut()?;
        match conn.call("cache_get_score", &[json!(key)]).await {
            Ok(value) => value.as_f64(),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "score cache read failed");
                Self::drop_if_broken(&mut slot, &err);
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, value: f64, ttl: Duration) -> Option<f64> {
        let mut slot = self.conn.lock().await;
        self.ensure_live(&mut slot).await;
        let Some(conn) = slot.as_mut() else {
            tracing::warn!(key = %key, "score cache write skipped, store not connected");
            return None;
        };
        let write = conn
            .call(
                "cache_set_score",
                &[json!(key), json!(value), json!(ttl.as_secs())],
            )
            .await;
        match write {
            // Confirming re-read of the written value.
            Ok(_) => match conn.call("cache_get_score", &[json!(key)]).await {
                Ok(stored) => stored.as_f64(),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "score cache re-read failed");
                    Self::drop_if_broken(&mut slot, &err);
                    None
                }
            },
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "score cache write failed");
                Self::drop_if_broken(&mut slot, &err);
                None
            }
        }
    }

    async fn cache_delete(&self, key: &str) -> Result<(), StorageError> {
        let mut slot = self.conn.lock().await;
        self.ensure_live(&mut slot).await;
        let Some(conn) = slot.as_mut() else {
            // Nothing to delete from.
            return Ok(());
        };
        match conn.call("delete", &[json!("score"), json!(key)]).await {
            Ok(_) => Ok(()),
            Err(err) => {
                Self::drop_if_broken(&mut slot, &err);
                Err(err)
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}
