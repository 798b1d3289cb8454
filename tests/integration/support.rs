//! Shared test support: scripted transports and frame builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;

use kora_studio::services::engine::SseRecord;
use kora_studio::services::viewer::subscriber::RawRecordStream;
use kora_studio::{AppError, AppResult, RunTransport};

/// One scripted stream item.
#[derive(Clone)]
pub enum ScriptItem {
    Record(&'static str, String),
    Fail(&'static str),
}

pub fn station(data: &str) -> ScriptItem {
    ScriptItem::Record("station", data.to_string())
}

pub fn summary(data: &str) -> ScriptItem {
    ScriptItem::Record("summary", data.to_string())
}

pub fn done() -> ScriptItem {
    ScriptItem::Record("done", String::new())
}

pub fn stage(name: &str, time_ms: u64) -> ScriptItem {
    station(&format!(
        r#"{{"stage":"{}","status":"ok","time_ms":{}}}"#,
        name, time_ms
    ))
}

/// Transport that replays a fixed script per run id and counts opens.
pub struct ScriptedTransport {
    scripts: HashMap<String, Vec<ScriptItem>>,
    opens: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<(&str, Vec<ScriptItem>)>) -> Arc<Self> {
        Arc::new(Self {
            scripts: scripts
                .into_iter()
                .map(|(id, items)| (id.to_string(), items))
                .collect(),
            opens: AtomicUsize::new(0),
        })
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RunTransport for ScriptedTransport {
    async fn open(&self, run_id: &str) -> AppResult<RawRecordStream> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .get(run_id)
            .cloned()
            .ok_or_else(|| AppError::network(format!("no script for run {}", run_id)))?;

        let items: Vec<Result<SseRecord, AppError>> = script
            .into_iter()
            .map(|item| match item {
                ScriptItem::Record(event, data) => Ok(SseRecord {
                    event: event.to_string(),
                    data,
                }),
                ScriptItem::Fail(message) => Err(AppError::stream(message)),
            })
            .collect();
        Ok(futures_util::stream::iter(items).boxed())
    }
}

/// Transport whose streams never produce anything, for cancellation tests.
pub struct StalledTransport;

#[async_trait]
impl RunTransport for StalledTransport {
    async fn open(&self, _run_id: &str) -> AppResult<RawRecordStream> {
        Ok(futures_util::stream::pending().boxed())
    }
}
