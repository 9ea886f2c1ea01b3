use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use gocart_api::audit::{AuditEvent, AuditLog, AuditSink, BatchConfig};

#[derive(Clone, Default)]
struct MemorySink {
    batches: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn write_batch(&self, events: Vec<AuditEvent>) -> anyhow::Result<()> {
        self.batches.lock().unwrap().push(events.len());
        Ok(())
    }
}

fn record(log: &AuditLog, n: usize) {
    for i in 0..n {
        log.record(None, "test_event", Some("tests"), Some(serde_json::json!({ "i": i })));
    }
}

#[tokio::test(start_paused = true)]
async fn full_batches_flush_without_waiting() {
    let sink = MemorySink::default();
    let (log, _task) = AuditLog::spawn(sink.clone(), BatchConfig::default());

    record(&log, 30);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(*sink.batches.lock().unwrap(), vec![25]);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(*sink.batches.lock().unwrap(), vec![25, 5]);
}

#[tokio::test(start_paused = true)]
async fn partial_batch_flushes_after_timeout() {
    let sink = MemorySink::default();
    let (log, _task) = AuditLog::spawn(sink.clone(), BatchConfig::default());

    record(&log, 3);
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(sink.batches.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(*sink.batches.lock().unwrap(), vec![3]);

    record(&log, 2);
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(*sink.batches.lock().unwrap(), vec![3, 2]);
}

#[tokio::test]
async fn disabled_log_drops_events() {
    let log = AuditLog::disabled();
    record(&log, 100);
}
