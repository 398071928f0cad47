//! End-to-end tests driving the `faultline` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const GRAPH: &str = r#"
nodes:
  - name: camera
    loop:
      period: 10
      publish:
        - topic: frame
          value_range: [5, 5]
          delay_range: [0, 0]
  - name: perception
    subscribe:
      - topic: frame
        valid_range: [0, 10]
        watchdog: 20
"#;

const FAULT: &str = r#"
inject_to: camera
inject_at: 40
affect_publish:
  topic: frame
  drop: 2
"#;

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn faultline() -> Command {
    Command::cargo_bin("faultline").unwrap()
}

#[test]
fn writes_all_three_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write(dir.path(), "graph.yaml", GRAPH);
    let fault = write(dir.path(), "fault.yaml", FAULT);
    let features = dir.path().join("node_feature.csv");
    let edges = dir.path().join("edge_index.csv");
    let label = dir.path().join("fault_label.csv");

    faultline()
        .args(["--graph", graph.as_str(), "--fault", fault.as_str(), "--stop", "20"])
        .args(["--inject_at", "7"])
        .arg("--node_feature_output")
        .arg(&features)
        .arg("--edge_index_output")
        .arg(&edges)
        .arg("--fault_label_output")
        .arg(&label)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&edges).unwrap(), "0,1\n");
    // The CLI override wins over the file's inject_at: 40.
    assert_eq!(fs::read_to_string(&label).unwrap(), "0,7\n");

    let rows = fs::read_to_string(&features).unwrap();
    let lines: Vec<&str> = rows.lines().collect();
    assert_eq!(lines.len(), 21); // ticks 0..=20
    for line in &lines {
        assert_eq!(line.split(',').count(), 20); // 2 nodes x (name + 9 features)
        assert!(line.starts_with("camera,"));
    }
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write(dir.path(), "graph.yaml", GRAPH);
    let fault = write(dir.path(), "fault.yaml", FAULT);
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    for out in [&first, &second] {
        faultline()
            .args(["--graph", graph.as_str(), "--fault", fault.as_str(), "--stop", "50"])
            .args(["--seed", "7"])
            .arg("--node_feature_output")
            .arg(out)
            .assert()
            .success();
    }
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn duplicate_publisher_fails_without_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write(
        dir.path(),
        "bad.yaml",
        r#"
nodes:
  - name: a
    loop: { period: 1, publish: [{ topic: t, value_range: [0, 0], delay_range: [0, 0] }] }
  - name: b
    loop: { period: 1, publish: [{ topic: t, value_range: [0, 0], delay_range: [0, 0] }] }
"#,
    );
    let features = dir.path().join("node_feature.csv");

    faultline()
        .args(["--graph", graph.as_str()])
        .arg("--node_feature_output")
        .arg(&features)
        .assert()
        .failure()
        .stderr(predicate::str::contains("two publishers"));

    assert!(!features.exists(), "no partial output on config error");
}

#[test]
fn merged_graph_files_share_one_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let publisher = write(
        dir.path(),
        "pub.yaml",
        "nodes:\n  - name: camera\n    loop:\n      period: 5\n      publish:\n        - { topic: frame, value_range: [1, 1], delay_range: [0, 0] }\n",
    );
    let subscriber = write(
        dir.path(),
        "sub.yaml",
        "nodes:\n  - name: perception\n    subscribe:\n      - { topic: frame, valid_range: [0, 5], watchdog: 10 }\n",
    );
    let edges = dir.path().join("edge_index.csv");

    faultline()
        .args(["--graph", publisher.as_str(), "--graph", subscriber.as_str(), "--stop", "0"])
        .arg("--edge_index_output")
        .arg(&edges)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&edges).unwrap(), "0,1\n");
}

#[test]
fn viz_conflicts_with_tensor_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write(dir.path(), "graph.yaml", GRAPH);

    faultline()
        .args(["--graph", graph.as_str(), "--viz"])
        .arg("--node_feature_output")
        .arg(dir.path().join("out.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn viz_renders_every_tick() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write(dir.path(), "graph.yaml", GRAPH);

    faultline()
        .args(["--graph", graph.as_str(), "--viz", "--stop", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tick 0"))
        .stdout(predicate::str::contains("tick 2"))
        .stdout(predicate::str::contains("done:"));
}

#[test]
fn inject_at_requires_fault() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write(dir.path(), "graph.yaml", GRAPH);

    faultline()
        .args(["--graph", graph.as_str(), "--inject_at", "5"])
        .assert()
        .failure();
}

#[test]
fn missing_graph_file_reports_path() {
    faultline()
        .args(["--graph", "/nonexistent/graph.yaml", "--stop", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/graph.yaml"));
}
