use semcache_core::errors::{ProviderError, StoreError};
use semcache_core::on_error::{report_provider_error, Phase};
use semcache_core::storage::ErrorSink;
use std::sync::{Arc, Mutex};

struct DeadSink;

impl ErrorSink for DeadSink {
    fn record_error(&self, _: Option<i64>, _: &str, _: &str) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("disk full".into()))
    }
}

#[test]
fn failure_emits_structured_log() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let buffer_clone = buffer.clone();

    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(move || MockWriter(buffer_clone.clone()))
        .finish();

    let err = ProviderError::rate_limited("openai", "HTTP 429");
    let id = tracing::subscriber::with_default(subscriber, || {
        report_provider_error(&DeadSink, Phase::Embedding, &err)
    });
    assert_eq!(id, None);

    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();

    assert!(output.contains("\"event\":\"semcache.failure\""));
    assert!(output.contains("\"phase\":\"embedding\""));
    assert!(output.contains("\"error_type\":\"RateLimited\""));
    assert!(output.contains("\"event\":\"semcache.error_sink_unavailable\""));
    assert!(output.contains("disk full"));
    assert!(output.contains("\"timestamp\""));
}

struct MockWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
