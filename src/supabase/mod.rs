use anyhow::{Context, Result};
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::prediction::Prediction;

pub mod realtime;

/// Message flowing from the worker threads to the UI.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Result of the one-shot snapshot fetch.
    Snapshot(Vec<Prediction>),
    /// A single freshly inserted row from the realtime channel.
    Insert(Prediction),
}

/// Thin PostgREST client for the `predictions` table.
///
/// Read-only by construction: the anon key has no write grants and this
/// client only issues GETs.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    http: reqwest::blocking::Client,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("veye dashboard")
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Fetch the latest rows, highest final score first.
    ///
    /// Ties are broken by scoring time so a freshly scored clip outranks an
    /// old one with the same score.
    pub fn fetch_snapshot(&self) -> Result<Vec<Prediction>> {
        let url = format!("{}/rest/v1/predictions", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("select", "*"),
                ("order", "final_score.desc,scored_at.desc"),
                ("limit", "100"),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .context("snapshot request")?;
        if !resp.status().is_success() {
            anyhow::bail!("snapshot http status {}", resp.status());
        }
        let raw: Vec<serde_json::Value> = resp.json().context("decode snapshot body")?;
        Ok(decode_rows(raw))
    }
}

/// Decode rows leniently: a row that fails to decode is skipped, never
/// surfaced to the user.
pub fn decode_rows(raw: Vec<serde_json::Value>) -> Vec<Prediction> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Prediction>(value) {
            Ok(p) => Some(p),
            Err(err) => {
                tracing::debug!("skipping malformed prediction row: {err}");
                None
            }
        })
        .collect()
}

/// Run the snapshot fetch on a worker thread and hand the result to the UI.
///
/// Transport errors collapse to an empty snapshot; the UI shows the empty
/// state instead of an error.
pub fn spawn_snapshot_fetch(
    client: SupabaseClient,
    tx: Sender<FeedEvent>,
    repaint: impl Fn() + Send + 'static,
) {
    std::thread::spawn(move || {
        let rows = match client.fetch_snapshot() {
            Ok(rows) => {
                tracing::info!("snapshot loaded: {} rows", rows.len());
                rows
            }
            Err(err) => {
                tracing::warn!("snapshot fetch failed: {err:#}");
                Vec::new()
            }
        };
        if tx.send(FeedEvent::Snapshot(rows)).is_ok() {
            repaint();
        }
    });
}
