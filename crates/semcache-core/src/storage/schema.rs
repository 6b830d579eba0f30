pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS inference_logs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id TEXT,
  model_name TEXT NOT NULL,
  input_text TEXT NOT NULL,
  output_text TEXT NOT NULL,
  latency_ms INTEGER NOT NULL,
  success INTEGER NOT NULL DEFAULT 1,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS embeddings (
  inference_id INTEGER PRIMARY KEY REFERENCES inference_logs(id),
  model TEXT NOT NULL,
  dims INTEGER NOT NULL,
  vec BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS error_logs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  inference_id INTEGER REFERENCES inference_logs(id),
  error_type TEXT NOT NULL,
  error_message TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_embeddings_model_dims ON embeddings(model, dims);
"#;
