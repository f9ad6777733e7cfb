//! Realtime subscription for INSERTs on the `predictions` table.
//!
//! Supabase realtime speaks the Phoenix channel protocol over a websocket.
//! A worker thread owns the socket, re-joins after disconnects with jittered
//! backoff, and forwards decoded rows to the UI over the event channel.

use anyhow::{Context, Result};
use rand::{thread_rng, Rng};
use serde_json::json;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};
use url::Url;

use super::FeedEvent;
use crate::prediction::Prediction;

const TOPIC: &str = "realtime:predictions";
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Handle owning the subscription worker. Dropping it stops the thread.
pub struct RealtimeHandle {
    shutdown: Arc<AtomicBool>,
    join: Option<std::thread::JoinHandle<()>>,
}

impl RealtimeHandle {
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for RealtimeHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Open the subscription on a worker thread.
///
/// `repaint` is invoked after every delivered row so the UI redraws without
/// waiting for user input.
pub fn subscribe_inserts(
    base_url: &str,
    anon_key: &str,
    tx: Sender<FeedEvent>,
    repaint: impl Fn() + Send + 'static,
) -> RealtimeHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    let base_url = base_url.to_string();
    let anon_key = anon_key.to_string();

    let join = std::thread::spawn(move || {
        let mut attempt: u32 = 0;
        while !flag.load(Ordering::SeqCst) {
            match run_socket(&base_url, &anon_key, &tx, &flag, &repaint) {
                Ok(()) => attempt = 0,
                Err(err) => {
                    tracing::warn!("realtime connection lost: {err:#}");
                    attempt = attempt.saturating_add(1);
                }
            }
            if flag.load(Ordering::SeqCst) {
                break;
            }
            sleep_with_backoff(attempt, &flag);
        }
        tracing::debug!("realtime worker stopped");
    });

    RealtimeHandle {
        shutdown,
        join: Some(join),
    }
}

fn sleep_with_backoff(attempt: u32, flag: &AtomicBool) {
    let base = 2u64.pow(attempt.min(5));
    let secs = thread_rng().gen_range(base..=base * 2);
    let deadline = Instant::now() + Duration::from_secs(secs);
    while Instant::now() < deadline {
        if flag.load(Ordering::SeqCst) {
            return;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

/// Build the websocket endpoint from the project URL.
pub fn websocket_url(base_url: &str, anon_key: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).context("parse supabase url")?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| anyhow::anyhow!("cannot set websocket scheme"))?;
    url.set_path("/realtime/v1/websocket");
    url.query_pairs_mut()
        .append_pair("apikey", anon_key)
        .append_pair("vsn", "1.0.0");
    Ok(url)
}

/// The `phx_join` message requesting INSERT notifications on the table.
pub fn join_message(join_ref: u64) -> String {
    json!({
        "topic": TOPIC,
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [
                    {"event": "INSERT", "schema": "public", "table": "predictions"}
                ]
            }
        },
        "ref": join_ref.to_string(),
    })
    .to_string()
}

fn heartbeat_message(msg_ref: u64) -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref.to_string(),
    })
    .to_string()
}

/// Decode an inbound frame into a prediction, if it carries an INSERT.
///
/// Handles the current `postgres_changes` envelope as well as the legacy
/// per-event shape where the record sits directly in the payload. Anything
/// else (joins, heartbeat replies, UPDATE/DELETE) yields `None`.
pub fn parse_insert(text: &str) -> Option<Prediction> {
    let msg: serde_json::Value = serde_json::from_str(text).ok()?;
    let event = msg.get("event")?.as_str()?;
    let record = match event {
        "postgres_changes" => {
            let data = msg.get("payload")?.get("data")?;
            if data.get("type")?.as_str()? != "INSERT" {
                return None;
            }
            data.get("record")?
        }
        "INSERT" => msg.get("payload")?.get("record")?,
        _ => return None,
    };
    match serde_json::from_value::<Prediction>(record.clone()) {
        Ok(p) => Some(p),
        Err(err) => {
            tracing::debug!("skipping malformed realtime row: {err}");
            None
        }
    }
}

fn run_socket(
    base_url: &str,
    anon_key: &str,
    tx: &Sender<FeedEvent>,
    flag: &AtomicBool,
    repaint: &(impl Fn() + Send),
) -> Result<()> {
    let url = websocket_url(base_url, anon_key)?;
    let (mut socket, _resp) = tungstenite::connect(url.as_str()).context("websocket connect")?;
    set_read_timeout(&mut socket)?;

    let mut msg_ref: u64 = 1;
    socket
        .send(Message::Text(join_message(msg_ref)))
        .context("send phx_join")?;
    tracing::info!("realtime channel joined: {TOPIC}");

    let mut last_heartbeat = Instant::now();
    loop {
        if flag.load(Ordering::SeqCst) {
            let _ = socket.close(None);
            return Ok(());
        }
        if last_heartbeat.elapsed() >= HEARTBEAT_INTERVAL {
            msg_ref += 1;
            socket
                .send(Message::Text(heartbeat_message(msg_ref)))
                .context("send heartbeat")?;
            last_heartbeat = Instant::now();
        }
        match socket.read() {
            Ok(Message::Text(text)) => {
                if let Some(row) = parse_insert(&text) {
                    if tx.send(FeedEvent::Insert(row)).is_err() {
                        let _ = socket.close(None);
                        return Ok(());
                    }
                    repaint();
                }
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Binary(_)) => {}
            Ok(Message::Close(_)) => anyhow::bail!("server closed the channel"),
            Ok(Message::Frame(_)) => {}
            Err(tungstenite::Error::Io(err))
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                // Read timeout; loop again so shutdown and heartbeats run.
            }
            Err(err) => return Err(err).context("websocket read"),
        }
    }
}

fn set_read_timeout(socket: &mut WebSocket<MaybeTlsStream<TcpStream>>) -> Result<()> {
    let stream = match socket.get_mut() {
        MaybeTlsStream::Plain(s) => s,
        MaybeTlsStream::Rustls(s) => s.get_mut(),
        _ => anyhow::bail!("unsupported stream type"),
    };
    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .context("set read timeout")?;
    Ok(())
}
