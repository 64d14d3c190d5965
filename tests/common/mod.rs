//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use request_mark::refresh::{RuleSource, StoreError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock upstream that answers every request with the value of its
/// `x-mark` header, or `none` when the header is absent.
pub async fn start_mark_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&buf);
                let mark = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("x-mark"))
                    .map(|(_, value)| value.trim().to_string())
                    .unwrap_or_else(|| "none".to_string());

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    mark.len(),
                    mark
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Canned reply for one `rule_keys` call.
pub enum KeysReply {
    Keys(Vec<&'static str>),
    Down,
}

/// In-memory [`RuleSource`] with scripted key-list replies.
///
/// Each `rule_keys` call pops the next scripted reply; once the script runs
/// out the last key list repeats. Records are looked up in `records`.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    inner: Arc<Mutex<ScriptState>>,
}

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<KeysReply>,
    last: Option<Vec<&'static str>>,
    records: HashMap<String, Vec<String>>,
    keys_calls: usize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: KeysReply) -> Self {
        self.inner.lock().unwrap().replies.push_back(reply);
        self
    }

    pub fn record(self, key: &str, fields: &[&str]) -> Self {
        self.inner
            .lock()
            .unwrap()
            .records
            .insert(key.to_string(), fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn keys_calls(&self) -> usize {
        self.inner.lock().unwrap().keys_calls
    }
}

impl RuleSource for ScriptedSource {
    async fn connect(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn rule_keys(&mut self, _list_key: &str, _max_len: i64) -> Result<Vec<String>, StoreError> {
        let mut state = self.inner.lock().unwrap();
        state.keys_calls += 1;

        let reply = match state.replies.pop_front() {
            Some(KeysReply::Keys(keys)) => {
                state.last = Some(keys.clone());
                Some(keys)
            }
            Some(KeysReply::Down) => None,
            None => state.last.clone(),
        };

        reply
            .map(|keys| keys.into_iter().map(String::from).collect())
            .ok_or_else(|| StoreError::Disconnected("scripted".into()))
    }

    async fn rule_fields(&mut self, rule_key: &str) -> Result<Vec<String>, StoreError> {
        let state = self.inner.lock().unwrap();
        state
            .records
            .get(rule_key)
            .cloned()
            .ok_or_else(|| StoreError::Disconnected(format!("no record {}", rule_key)))
    }
}

/// [`RuleSource`] whose calls never complete, like a store that accepted the
/// connection and then went silent.
pub struct HangingSource {
    hang_connect: bool,
}

impl HangingSource {
    /// Connects, then never answers the key list.
    pub fn on_keys() -> Self {
        Self { hang_connect: false }
    }

    /// Never finishes connecting.
    pub fn on_connect() -> Self {
        Self { hang_connect: true }
    }
}

impl RuleSource for HangingSource {
    async fn connect(&mut self) -> Result<(), StoreError> {
        if self.hang_connect {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn rule_keys(&mut self, _list_key: &str, _max_len: i64) -> Result<Vec<String>, StoreError> {
        std::future::pending().await
    }

    async fn rule_fields(&mut self, _rule_key: &str) -> Result<Vec<String>, StoreError> {
        std::future::pending().await
    }
}

/// Store fields for an enabled `path` rule of service `orders`.
pub fn path_record(name: &'static str, priority: &'static str, path: &'static str) -> Vec<&'static str> {
    vec![
        "service_name", "orders",
        "name", name,
        "enable", "1",
        "priority", priority,
        "type", "path",
        "tag_value", name,
        "path", path,
    ]
}
