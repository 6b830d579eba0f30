use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn semcache(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("semcache").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("SEMCACHE_CONFIG")
        .env_remove("SEMCACHE_DB")
        .env_remove("SEMCACHE_THRESHOLD")
        .env("SEMCACHE_LOG", "off");
    cmd
}

#[test]
fn init_writes_sample_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("semcache.yaml");

    semcache(&dir)
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("created semcache.yaml"));
    let first = std::fs::read_to_string(&path).unwrap();
    assert!(first.contains("threshold"));

    std::fs::write(&path, "version: 1\n").unwrap();
    semcache(&dir)
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 1\n");
}

#[test]
fn init_and_ask_follow_config_env() {
    let dir = TempDir::new().unwrap();

    semcache(&dir)
        .env("SEMCACHE_CONFIG", "conf/cache.yaml")
        .arg("init")
        .assert()
        .success();
    let path = dir.path().join("conf/cache.yaml");
    assert!(path.exists());
    assert!(!dir.path().join("semcache.yaml").exists());

    std::fs::write(
        &path,
        "version: 1\nembedding:\n  provider: fake\ngeneration:\n  provider: fake\ncache:\n  db: env.db\n",
    )
    .unwrap();
    semcache(&dir)
        .env("SEMCACHE_CONFIG", "conf/cache.yaml")
        .args(["ask", "where does this go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("echo: where does this go"));
    assert!(dir.path().join("env.db").exists());
}

#[test]
fn config_file_selects_providers_and_db() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("semcache.yaml"),
        "version: 1\nembedding:\n  provider: fake\ngeneration:\n  provider: fake\ncache:\n  db: data/answers.db\n",
    )
    .unwrap();

    semcache(&dir)
        .args(["ask", "what is rust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("echo: what is rust"));

    assert!(dir.path().join("data/answers.db").exists());
}

#[test]
fn stats_counts_records() {
    let dir = TempDir::new().unwrap();

    for q in ["first question", "first question", "another topic entirely"] {
        semcache(&dir)
            .args([
                "ask",
                "--embedder",
                "fake",
                "--generator",
                "fake",
                "--db",
                "cache.db",
                q,
            ])
            .assert()
            .success();
    }

    let out = semcache(&dir)
        .args(["stats", "--db", "cache.db", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["stats"]["records"], 2);
    assert_eq!(v["stats"]["embeddings"], 2);
    assert_eq!(v["stats"]["errors"], 0);

    semcache(&dir)
        .args(["stats", "--db", "cache.db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("records:     2"));
}
