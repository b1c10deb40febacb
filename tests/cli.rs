use std::io::Write;
use std::process::Command;

use flate2::{Compression, GzBuilder};

fn gzscan(path: &std::path::Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_gzscan"))
        .arg(path)
        .output()
        .unwrap()
}

#[test]
fn prints_one_block_per_member() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    for name in ["a.txt", "b.txt"] {
        let mut encoder = GzBuilder::new()
            .filename(name)
            .write(Vec::new(), Compression::default());
        encoder.write_all(name.as_bytes()).unwrap();
        tmp.write_all(&encoder.finish().unwrap()).unwrap();
    }
    tmp.flush().unwrap();

    let output = gzscan(tmp.path());
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert!(output.stderr.is_empty());
    assert!(stdout.contains("GZHeader Name Field is: a.txt\n"));
    assert!(stdout.contains("GZHeader Name Field is: b.txt\n"));
    assert_eq!(stdout.matches("Decompressed size of member is: 5\n").count(), 2);
}

#[test]
fn non_gzip_file_exits_with_data_error() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(b"definitely not gzip").unwrap();
    tmp.flush().unwrap();

    let output = gzscan(tmp.path());
    let stderr = String::from_utf8(output.stderr).unwrap();

    assert!(!output.status.success());
    #[cfg(unix)]
    assert_eq!(output.status.code(), Some(253));
    assert!(stderr.contains("incorrect header check"));
    assert!(!String::from_utf8(output.stdout).unwrap().contains("Decompressed size"));
}

#[test]
fn missing_file_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = gzscan(&dir.path().join("missing.gz"));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr).unwrap().starts_with("ERROR: unable to open file"));
}
