use std::path::PathBuf;
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "rollcall-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn tool() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rollcall-tool"))
}

#[test]
fn cli_convert_writes_a_loadable_document() {
    let csv = temp_path("convert.csv");
    let json = temp_path("convert.json");
    std::fs::write(&csv, "姓名,权重\n张三,2\n李四,\n").expect("write csv");

    let status = tool()
        .arg("convert")
        .arg(&csv)
        .arg(&json)
        .args(["--title", "Period 3"])
        .status()
        .expect("run cli");
    assert!(status.success());

    let content = std::fs::read_to_string(&json).expect("read output");
    let document = rollcall_doc(&content);
    assert_eq!(document["title"], "Period 3");
    assert_eq!(document["entries"][0]["name"], "张三");
    assert_eq!(document["entries"][0]["weight"], 2.0);
    assert_eq!(document["entries"][1]["id"], "entry-2");
}

#[test]
fn cli_convert_rejects_csv_without_names() {
    let csv = temp_path("nonames.csv");
    std::fs::write(&csv, "id,weight\n1,2\n").expect("write csv");
    let output = tool()
        .arg("convert")
        .arg(&csv)
        .arg(temp_path("nonames.json"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no name column found"));
}

#[test]
fn cli_encrypt_then_decrypt_restores_the_document() {
    let plain = temp_path("plain.json");
    let sealed = temp_path("sealed.json");
    let body = r#"{"title":"Lab","entries":[{"id":"a","name":"Ann","weight":1}]}"#;
    std::fs::write(&plain, body).expect("write plain");

    let status = tool()
        .arg("encrypt")
        .arg(&plain)
        .arg(&sealed)
        .args(["--passphrase", "s3cret"])
        .status()
        .expect("run cli");
    assert!(status.success());
    let envelope = rollcall_doc(&std::fs::read_to_string(&sealed).expect("read envelope"));
    assert_eq!(envelope["encrypted"], true);
    assert_eq!(envelope["algorithm"], "AES-GCM");

    let output = tool()
        .arg("decrypt")
        .arg(&sealed)
        .args(["--passphrase", "s3cret"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), body);

    let wrong = tool()
        .arg("decrypt")
        .arg(&sealed)
        .args(["--passphrase", "nope"])
        .output()
        .expect("run cli");
    assert!(!wrong.status.success());
    assert!(String::from_utf8_lossy(&wrong.stderr).contains("wrong passphrase"));
}

#[test]
fn cli_simulate_reads_encrypted_configs_and_reports_json() {
    let plain = temp_path("sim-plain.json");
    let sealed = temp_path("sim-sealed.json");
    let report = temp_path("sim-report.json");
    std::fs::write(
        &plain,
        r#"{"entries":[{"id":"a","name":"Ann","weight":1},{"id":"b","name":"Ben","weight":1}]}"#,
    )
    .expect("write plain");
    let status = tool()
        .arg("encrypt")
        .arg(&plain)
        .arg(&sealed)
        .args(["--passphrase", "pw"])
        .status()
        .expect("run cli");
    assert!(status.success());

    let status = tool()
        .arg("simulate")
        .arg(&sealed)
        .args(["--passphrase", "pw", "--picks", "6", "--seed", "3", "--report", "json", "--output"])
        .arg(&report)
        .status()
        .expect("run cli");
    assert!(status.success());

    let summary = rollcall_doc(&std::fs::read_to_string(&report).expect("read report"));
    assert_eq!(summary["picks"], 6);
    assert_eq!(summary["rounds"], 2);
    assert_eq!(summary["entries"][0]["count"], 3);
    assert_eq!(summary["entries"][1]["count"], 3);
}

#[test]
fn cli_simulate_without_passphrase_fails() {
    let plain = temp_path("nopw-plain.json");
    let sealed = temp_path("nopw-sealed.json");
    std::fs::write(&plain, r#"{"entries":[{"id":"a","name":"Ann"}]}"#).expect("write plain");
    assert!(
        tool()
            .arg("encrypt")
            .arg(&plain)
            .arg(&sealed)
            .args(["--passphrase", "pw"])
            .status()
            .expect("run cli")
            .success()
    );

    let output = tool().arg("simulate").arg(&sealed).output().expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("a passphrase is required"));
}

fn rollcall_doc(text: &str) -> serde_json::Value {
    serde_json::from_str(text).expect("valid json")
}

#[test]
fn cli_convert_rejects_csv_without_usable_rows() {
    let csv = temp_path("blank-rows.csv");
    let json = temp_path("blank-rows.json");
    std::fs::write(&csv, "name,weight\n ,2\n,\n").expect("write csv");
    let output = tool().arg("convert").arg(&csv).arg(&json).output().expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no valid entries found"));
    assert!(!json.exists());
}

#[test]
fn cli_convert_creates_missing_output_directories() {
    let csv = temp_path("nested.csv");
    let dir = temp_path("nested-out");
    let json = dir.join("rosters").join("class.json");
    std::fs::write(&csv, "name\nAnn\n").expect("write csv");
    let status = tool().arg("convert").arg(&csv).arg(&json).status().expect("run cli");
    assert!(status.success());
    assert!(json.exists());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn cli_encrypt_prompts_for_a_confirmed_passphrase() {
    use std::io::Write;
    use std::process::Stdio;

    let plain = temp_path("prompt-plain.json");
    let sealed = temp_path("prompt-sealed.json");
    let body = r#"{"entries":[{"id":"a","name":"Ann"}]}"#;
    std::fs::write(&plain, body).expect("write plain");

    let run = |input: &str| {
        let mut child = tool()
            .arg("encrypt")
            .arg(&plain)
            .arg(&sealed)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn cli");
        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(input.as_bytes())
            .expect("write stdin");
        child.wait_with_output().expect("wait cli")
    };

    let mismatch = run("first-pass\nsecond-pass\n");
    assert!(!mismatch.status.success());
    assert!(String::from_utf8_lossy(&mismatch.stderr).contains("passphrases do not match"));

    let short = run("pw\npw\n");
    assert!(short.status.success());
    assert!(String::from_utf8_lossy(&short.stderr).contains("shorter than 6"));

    let output = tool()
        .arg("decrypt")
        .arg(&sealed)
        .args(["--passphrase", "pw"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), body);
}
