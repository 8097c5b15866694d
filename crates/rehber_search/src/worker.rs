//! Worker-thread search engine.
//!
//! The worker receives the folded rows once (`seed`) and answers each
//! `query` with a `result` carrying the query id and matched indices.
//! Replies are admitted through a ledger keyed by monotonically
//! increasing ids: a reply whose id is unknown or older than the
//! newest applied one is dropped, so late answers to superseded
//! queries never clobber the current result set.

use std::collections::HashMap;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rehber_catalog::fold::{matches_tokens, tokenize};
use rehber_catalog::HighlightMeta;

use crate::apply::{MatchApplier, RowView};
use crate::dataset::SearchDataset;
use crate::engine::SearchEngine;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEntry {
    pub index: usize,
    pub folded: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub id: u64,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub id: u64,
    pub matches: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum WorkerRequest {
    Seed(Vec<SeedEntry>),
    Query(QueryRequest),
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum WorkerReply {
    Result(QueryResult),
}

/// Pending-query bookkeeping shared by every reply path.
#[derive(Debug, Default)]
pub struct QueryLedger {
    pending: HashMap<u64, HighlightMeta>,
    last_query_id: u64,
    latest_applied: u64,
}

impl QueryLedger {
    /// Assigns the next id to an outgoing query.
    pub fn register(&mut self, meta: HighlightMeta) -> u64 {
        self.last_query_id += 1;
        self.pending.insert(self.last_query_id, meta);
        self.last_query_id
    }

    /// Admits a reply. Unknown ids and ids older than the newest
    /// applied one yield `None` and the reply must be discarded.
    pub fn admit(&mut self, id: u64) -> Option<HighlightMeta> {
        let meta = self.pending.remove(&id)?;
        if id < self.latest_applied {
            return None;
        }
        self.latest_applied = id;
        Some(meta)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn latest_applied(&self) -> u64 {
        self.latest_applied
    }
}

pub struct OffloadedEngine {
    dataset: Arc<SearchDataset>,
    applier: MatchApplier,
    ledger: QueryLedger,
    requests: Sender<WorkerRequest>,
    replies: Receiver<WorkerReply>,
    worker: Option<JoinHandle<()>>,
}

impl OffloadedEngine {
    /// Spawns the worker thread and seeds it with the snapshot. Spawn
    /// failure is the caller's cue to fall back in-process.
    pub fn spawn(dataset: Arc<SearchDataset>) -> io::Result<Self> {
        let (requests, request_rx) = mpsc::channel();
        let (reply_tx, replies) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("rehber-search-worker".to_string())
            .spawn(move || worker_loop(request_rx, reply_tx))?;

        let seed = dataset
            .rows()
            .iter()
            .map(|row| SeedEntry {
                index: row.index,
                folded: row.folded.clone(),
            })
            .collect();
        let applier = MatchApplier::new(dataset.clone());
        let engine = Self {
            dataset,
            applier,
            ledger: QueryLedger::default(),
            requests,
            replies,
            worker: Some(worker),
        };
        let _ = engine.requests.send(WorkerRequest::Seed(seed));
        Ok(engine)
    }

    fn apply_reply(&mut self, view: &mut dyn RowView, reply: WorkerReply) -> bool {
        let WorkerReply::Result(result) = reply;
        let Some(meta) = self.ledger.admit(result.id) else {
            return false;
        };
        self.applier.apply(view, &meta, &result.matches);
        true
    }
}

impl SearchEngine for OffloadedEngine {
    fn run(&mut self, view: &mut dyn RowView, query: &str) {
        let meta = HighlightMeta::new(query);
        let tokens = tokenize(query);
        if tokens.is_empty() {
            // clearing must not wait on the worker
            let matches = self.dataset.all_indices();
            self.applier.apply(view, &meta, &matches);
            return;
        }
        let id = self.ledger.register(meta);
        let _ = self.requests.send(WorkerRequest::Query(QueryRequest {
            id,
            value: query.to_string(),
        }));
    }

    fn pump(&mut self, view: &mut dyn RowView) -> usize {
        let mut applied = 0;
        while let Ok(reply) = self.replies.try_recv() {
            if self.apply_reply(view, reply) {
                applied += 1;
            }
        }
        applied
    }

    fn settle(&mut self, view: &mut dyn RowView) {
        while self.ledger.pending_len() > 0 {
            match self.replies.recv_timeout(SETTLE_TIMEOUT) {
                Ok(reply) => {
                    self.apply_reply(view, reply);
                }
                Err(_) => break,
            }
        }
    }
}

impl Drop for OffloadedEngine {
    fn drop(&mut self) {
        let _ = self.requests.send(WorkerRequest::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(requests: Receiver<WorkerRequest>, replies: Sender<WorkerReply>) {
    let mut entries: Vec<SeedEntry> = Vec::new();
    loop {
        match requests.recv() {
            Ok(WorkerRequest::Seed(seed)) => entries = seed,
            Ok(WorkerRequest::Query(query)) => {
                let tokens = tokenize(&query.value);
                let matches = if tokens.is_empty() {
                    entries.iter().map(|entry| entry.index).collect()
                } else {
                    entries
                        .iter()
                        .filter(|entry| matches_tokens(&entry.folded, &tokens))
                        .map(|entry| entry.index)
                        .collect()
                };
                let result = QueryResult {
                    id: query.id,
                    matches,
                };
                if replies.send(WorkerReply::Result(result)).is_err() {
                    break;
                }
            }
            Ok(WorkerRequest::Shutdown) | Err(_) => break,
        }
    }
}
