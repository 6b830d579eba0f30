use serde::{Deserialize, Serialize};

/// A vector produced by an embedding model.
///
/// The model name travels with the values so the store never compares
/// vectors from different embedding spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub model: String,
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(model: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            model: model.into(),
            values,
        }
    }

    pub fn dims(&self) -> usize {
        self.values.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
}

/// Text returned by the generator plus how long the call took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub model: String,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: i64,
    pub user_id: Option<String>,
    pub input_text: String,
    pub output_text: String,
    pub model_name: String,
    pub latency_ms: u64,
    pub success: bool,
    pub created_at: String,
}

/// Everything `append` needs to persist a record and its embedding.
#[derive(Debug, Clone)]
pub struct NewRecord<'a> {
    pub user_id: Option<&'a str>,
    pub input_text: &'a str,
    pub model_name: &'a str,
    pub output_text: &'a str,
    pub embedding: &'a Embedding,
    pub latency_ms: u64,
}

/// Closest stored record to a query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestMatch {
    pub record_id: i64,
    pub input_text: String,
    pub output_text: String,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: i64,
    pub inference_id: Option<i64>,
    pub error_type: String,
    pub error_message: String,
    pub created_at: String,
}

/// Successful end of a cache cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CacheOutcome {
    Hit {
        record_id: i64,
        matched_input: String,
        output: String,
        distance: f64,
    },
    Miss {
        record_id: i64,
        output: String,
        latency_ms: u64,
    },
}

impl CacheOutcome {
    pub fn output(&self) -> &str {
        match self {
            CacheOutcome::Hit { output, .. } | CacheOutcome::Miss { output, .. } => output,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::Hit { .. })
    }

    pub fn record_id(&self) -> i64 {
        match self {
            CacheOutcome::Hit { record_id, .. } | CacheOutcome::Miss { record_id, .. } => {
                *record_id
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub records: u64,
    pub embeddings: u64,
    pub errors: u64,
    pub last_record_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_tag() {
        let hit = CacheOutcome::Hit {
            record_id: 7,
            matched_input: "q".into(),
            output: "a".into(),
            distance: 0.0,
        };
        let v = serde_json::to_value(&hit).unwrap();
        assert_eq!(v["outcome"], "hit");
        assert_eq!(v["record_id"], 7);
        assert!(hit.is_hit());
        assert_eq!(hit.output(), "a");
    }
}
