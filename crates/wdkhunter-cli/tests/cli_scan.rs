// 端到端：通过构建出的二进制运行 scan 子命令
use std::path::Path;
use std::process::Command;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_wdkhunter");
    let mut c = Command::new(exe);
    c.env("RUST_LOG", "warn");
    c
}

fn scan(args: &[&str], input: &Path) -> std::process::Output {
    cmd()
        .args(["scan", "--input", input.to_str().unwrap(), "--threads", "1"])
        .args(args)
        .output()
        .expect("run wdkhunter")
}

#[test]
fn magic_prefix_prints_single_candidate() {
    let temp = tempfile::tempdir().expect("tempdir");
    let wallet = temp.path().join("wallet.dat");
    std::fs::write(&wallet, [0xFF, 0xA1, 0xB2, 0xC3, 0xD4, 0xE5]).unwrap();

    let out = scan(&["--marker", "a1b2"], &wallet);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "a1b2c3d4e5\n");
}

#[test]
fn window_strategy_over_mapped_file_dedups() {
    let temp = tempfile::tempdir().expect("tempdir");
    let wallet = temp.path().join("zeros.dat");
    std::fs::write(&wallet, [0u8; 6]).unwrap();

    let out = scan(&["--backend", "mmap", "--strategy", "window"], &wallet);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "0000000000\n");
}

#[test]
fn store_backend_spans_record_boundaries() {
    let temp = tempfile::tempdir().expect("tempdir");
    let wallet = temp.path().join("wallet.dat");
    {
        let conn = rusqlite::Connection::open(&wallet).expect("create store");
        conn.execute("CREATE TABLE main (key BLOB PRIMARY KEY, value BLOB)", []).unwrap();
        conn.execute("INSERT INTO main VALUES (?1, ?2)", rusqlite::params![b"v1".to_vec(), vec![1u8, 2, 3, 4, 5]])
            .unwrap();
        conn.execute(
            "INSERT INTO main VALUES (?1, ?2)",
            rusqlite::params![b"v2".to_vec(), vec![0xAAu8, 0xBB, 0xCC, 0xDD, 0xEE]],
        )
        .unwrap();
    }

    let out = scan(&["--backend", "store", "--strategy", "window", "--format", "json"], &wallet);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    for expected in ["0102030405", "02030405aa", "05aabbccdd", "aabbccddee"] {
        assert!(text.contains(expected), "missing {expected} in {text}");
    }
}

#[test]
fn empty_result_is_success_and_failure_is_not() {
    let temp = tempfile::tempdir().expect("tempdir");
    let short = temp.path().join("short.dat");
    std::fs::write(&short, [1u8, 2, 3]).unwrap();

    let out = scan(&["--strategy", "hex"], &short);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());

    let empty = temp.path().join("empty.dat");
    std::fs::write(&empty, b"").unwrap();
    let out = scan(&["--backend", "mmap"], &empty);
    assert!(!out.status.success());
}

#[test]
fn output_file_receives_results() {
    let temp = tempfile::tempdir().expect("tempdir");
    let wallet = temp.path().join("wallet.dat");
    std::fs::write(&wallet, [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11]).unwrap();
    let result = temp.path().join("result.txt");

    let out = scan(&["--strategy", "hex", "--output", result.to_str().unwrap()], &wallet);
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(&result).unwrap(), "deadbeef00\n");
}

#[test]
fn failed_directory_is_not_reported_as_empty() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("a.dat"), b"").unwrap();
    std::fs::write(temp.path().join("b.dat"), b"").unwrap();

    let out = cmd()
        .env("RUST_LOG", "info")
        .args(["scan", "--input", temp.path().to_str().unwrap(), "--threads", "1", "--backend", "mmap"])
        .output()
        .expect("run wdkhunter");
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(!stderr.contains("no candidate found"), "{stderr}");
    assert!(stderr.contains("some sources could not be scanned"), "{stderr}");
}

#[test]
fn clean_empty_directory_scan_is_reported_as_empty() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("short.dat"), [1u8, 2, 3]).unwrap();

    let out = cmd()
        .env("RUST_LOG", "info")
        .args(["scan", "--input", temp.path().to_str().unwrap(), "--threads", "1", "--strategy", "hex"])
        .output()
        .expect("run wdkhunter");
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no candidate found"));
}
