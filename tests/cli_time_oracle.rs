use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "tictac-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

const TRACES: &str = r#"
[
    {
        "dev_stats": [
            {
                "device": "/job:worker/replica:0/task:0/device:CPU:0",
                "node_stats": [
                    { "node_name": "toy-none/mul", "all_start_micros": 20, "all_end_rel_micros": 40 },
                    {
                        "node_name": "RecvTensor",
                        "all_start_micros": 0,
                        "all_end_rel_micros": 10,
                        "timeline_label": "[4B] edge_3_toy-none/w1/read from /job:ps/replica:0/task:0/device:CPU:0 to /job:worker/replica:0/task:0/device:CPU:0"
                    },
                    {
                        "node_name": "RecvTensor",
                        "all_start_micros": 4,
                        "all_end_rel_micros": 16,
                        "timeline_label": "[4B] edge_5_toy-none/w2/read from /job:ps/replica:0/task:0/device:CPU:0 to /job:worker/replica:0/task:0/device:CPU:0"
                    }
                ]
            },
            {
                "device": "/job:ps/replica:0/task:0/device:CPU:0",
                "node_stats": [ { "node_name": "toy-none/w1", "all_start_micros": 0, "all_end_rel_micros": 1 } ]
            }
        ]
    },
    {
        "dev_stats": [
            {
                "device": "/job:worker/replica:0/task:0/device:CPU:0",
                "node_stats": [ { "node_name": "toy-none/mul", "all_start_micros": 0, "op_end_rel_micros": 25 } ]
            }
        ]
    }
]
"#;

#[test]
fn time_oracle_folds_traces_into_sorted_minimum_table() {
    let dir = unique_temp_dir("time-oracle");
    let traces = write_file(&dir, "traces.json", TRACES);
    let out = dir.join("time-oracle.json");

    let output = Command::new(env!("CARGO_BIN_EXE_time_oracle"))
        .args([
            "--trace",
            traces.to_str().unwrap(),
            "--scope",
            "toy-none",
            "--out",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("run time_oracle");
    assert!(
        output.status.success(),
        "time_oracle failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let raw = fs::read_to_string(&out).expect("read oracle");
    let v: Value = serde_json::from_str(&raw).expect("parse oracle");
    let obj = v.as_object().expect("oracle must be a JSON object");
    assert_eq!(obj.len(), 3);
    assert_eq!(obj["/mul"], 25);
    assert_eq!(obj["recv:/w1"], 10);
    // w2 原始区间 [4, 20) 与 w1 重叠，修正后为 [10, 20)
    assert_eq!(obj["recv:/w2"], 10);
    assert!(!obj.contains_key("/w1"), "ps devices must be ignored");

    // 在已有 oracle 上合并：只会变小
    let faster = write_file(
        &dir,
        "faster.json",
        r#"{ "dev_stats": [ { "device": "/job:worker/replica:0/task:1/device:CPU:0", "node_stats": [ { "node_name": "toy-none/mul", "all_start_micros": 0, "all_end_rel_micros": 90 }, { "node_name": "toy-none/add", "all_start_micros": 0, "all_end_rel_micros": 3 } ] } ] }"#,
    );
    let merged = dir.join("merged.json");
    let output = Command::new(env!("CARGO_BIN_EXE_time_oracle"))
        .args([
            "--trace",
            faster.to_str().unwrap(),
            "--scope",
            "toy-none",
            "--merge",
            out.to_str().unwrap(),
            "--out",
            merged.to_str().unwrap(),
        ])
        .output()
        .expect("run time_oracle");
    assert!(output.status.success());
    let v: Value =
        serde_json::from_str(&fs::read_to_string(&merged).expect("read merged")).expect("parse");
    assert_eq!(v["/mul"], 25);
    assert_eq!(v["/add"], 3);
    assert_eq!(v["recv:/w1"], 10);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn efficiency_prints_comm_ratio() {
    let dir = unique_temp_dir("efficiency");
    let traces = write_file(&dir, "traces.json", TRACES);

    let output = Command::new(env!("CARGO_BIN_EXE_efficiency"))
        .args(["--trace", traces.to_str().unwrap()])
        .output()
        .expect("run efficiency");
    assert!(
        output.status.success(),
        "efficiency failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().filter(|l| l.starts_with("step ")).collect();
    assert_eq!(lines.len(), 2, "one line per (step, worker device): {stdout}");
    assert!(stdout.lines().any(|l| l.starts_with("a=")));

    let _ = fs::remove_dir_all(&dir);
}
