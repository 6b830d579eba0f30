// on_error.rs - failure reporting for remote model calls
//
// Every failed embedding or generation call is logged and written to the
// error sink. Writing to the sink is best-effort: a sink failure is logged
// and swallowed so the caller still sees the original provider error.

use crate::errors::ProviderError;
use crate::storage::ErrorSink;

/// Which remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Embedding,
    Generation,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Embedding => "embedding",
            Phase::Generation => "generation",
        }
    }
}

/// Logs `err` and appends it to `sink`. Returns the error record id when
/// the sink accepted it.
pub fn report_provider_error(sink: &dyn ErrorSink, phase: Phase, err: &ProviderError) -> Option<i64> {
    tracing::warn!(
        event = "semcache.failure",
        phase = phase.as_str(),
        error_type = err.kind(),
        error = %err,
        "{} call failed: {}", phase.as_str(), err
    );

    match sink.record_error(None, err.kind(), &err.to_string()) {
        Ok(id) => Some(id),
        Err(sink_err) => {
            tracing::warn!(
                event = "semcache.error_sink_unavailable",
                phase = phase.as_str(),
                error = %sink_err,
                "could not record {} failure", phase.as_str()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecSink(Mutex<Vec<(String, String)>>);

    impl ErrorSink for VecSink {
        fn record_error(
            &self,
            _inference_id: Option<i64>,
            error_type: &str,
            error_message: &str,
        ) -> Result<i64, StoreError> {
            let mut v = self.0.lock().unwrap();
            v.push((error_type.to_string(), error_message.to_string()));
            Ok(v.len() as i64)
        }
    }

    struct DeadSink;

    impl ErrorSink for DeadSink {
        fn record_error(&self, _: Option<i64>, _: &str, _: &str) -> Result<i64, StoreError> {
            Err(StoreError::Unavailable("disk gone".into()))
        }
    }

    #[test]
    fn writes_kind_and_message() {
        let sink = VecSink::default();
        let err = ProviderError::rate_limited("openai", "HTTP 429");
        assert_eq!(report_provider_error(&sink, Phase::Embedding, &err), Some(1));

        let rows = sink.0.lock().unwrap();
        assert_eq!(rows[0].0, "RateLimited");
        assert!(rows[0].1.contains("HTTP 429"));
    }

    #[test]
    fn dead_sink_is_tolerated() {
        let err = ProviderError::connection("openai", "refused");
        assert_eq!(report_provider_error(&DeadSink, Phase::Generation, &err), None);
    }
}
