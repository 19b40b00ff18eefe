/// Process-level behavior of the `sensorcast` binary
use std::process::Command;

#[test]
fn test_missing_interface_exits_non_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_sensorcast"))
        .args(["--interface", "sensorcast-missing0"])
        .output()
        .expect("failed to run sensorcast");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sensorcast-missing0"), "stderr: {stderr}");
}

#[test]
fn test_interface_flag_is_required() {
    let output = Command::new(env!("CARGO_BIN_EXE_sensorcast"))
        .output()
        .expect("failed to run sensorcast");

    assert!(!output.status.success());
}

#[test]
fn test_invalid_group_exits_non_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_sensorcast"))
        .args(["--interface", "lo", "--group", "10.1.2.3"])
        .output()
        .expect("failed to run sensorcast");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("10.1.2.3"));
}
