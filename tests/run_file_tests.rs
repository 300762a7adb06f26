//! Run writer/reader tests: framing, checksums, corruption detection, and
//! the shared-ownership deletion protocol.


use std::sync::Arc;

use spillsort_core::error::Error;
use spillsort_core::stream::{collect, SortedStream};
use spillsort_io::{RunReader, RunWriter, ScratchFile};
use test_util::scratch;

type Settings = ((), ());

const SETTINGS: Settings = ((), ());

#[test]
fn round_trip_preserves_order_and_contents() {
    let (_tmp, dir) = scratch();

    let mut writer: RunWriter<u64, String> =
        RunWriter::create(&dir, Default::default(), SETTINGS).expect("create");
    for k in 0..100u64 {
        writer
            .add_already_sorted(&k, &format!("payload-{k}"))
            .expect("add");
    }
    assert_eq!(writer.records(), 100);

    let mut reader = writer.done().expect("seal");
    let out = collect(&mut reader).expect("drain");
    assert_eq!(out.len(), 100);
    for (i, (k, v)) in out.iter().enumerate() {
        assert_eq!(*k, i as u64);
        assert_eq!(v, &format!("payload-{i}"));
    }
    assert!(matches!(reader.next(), Err(Error::InvalidOperation(_))));
}

#[test]
fn empty_run_round_trips() {
    let (_tmp, dir) = scratch();

    let writer: RunWriter<u64, u64> =
        RunWriter::create(&dir, Default::default(), SETTINGS).expect("create");
    let mut reader = writer.done().expect("seal");
    assert!(!reader.more().expect("more"));
}

#[test]
fn file_is_deleted_when_last_owner_drops() {
    let (_tmp, dir) = scratch();

    let mut writer: RunWriter<u64, u64> =
        RunWriter::create(&dir, Default::default(), SETTINGS).expect("create");
    writer.add_already_sorted(&1, &1).expect("add");
    let reader = writer.done().expect("seal");

    let path = reader.file().path().to_path_buf();
    assert!(path.exists());

    // A second owner keeps the file alive past the reader.
    let extra_owner = Arc::clone(reader.file());
    drop(reader);
    assert!(path.exists());

    drop(extra_owner);
    assert!(!path.exists());
    assert_eq!(dir.live_files().expect("count"), 0);
}

#[test]
fn dropping_writer_before_done_removes_file() {
    let (_tmp, dir) = scratch();

    let mut writer: RunWriter<u64, u64> =
        RunWriter::create(&dir, Default::default(), SETTINGS).expect("create");
    writer.add_already_sorted(&1, &1).expect("add");
    assert_eq!(dir.live_files().expect("count"), 1);

    drop(writer);
    assert_eq!(dir.live_files().expect("count"), 0);
}

/// Capture a sealed run's raw bytes, then re-materialize a (possibly
/// mangled) copy under a fresh scratch name with adopted ownership.
fn reseal(
    dir: &spillsort_io::ScratchDir,
    bytes: Vec<u8>,
) -> RunReader<u64, u64> {
    let path = dir.next_path();
    std::fs::write(&path, bytes).expect("write mangled run");
    RunReader::open(ScratchFile::adopt(path), SETTINGS).expect("open")
}

fn sealed_run_bytes(dir: &spillsort_io::ScratchDir, n: u64) -> Vec<u8> {
    let mut writer: RunWriter<u64, u64> =
        RunWriter::create(dir, Default::default(), SETTINGS).expect("create");
    for k in 0..n {
        writer.add_already_sorted(&k, &(k * 2)).expect("add");
    }
    let reader = writer.done().expect("seal");
    let bytes = std::fs::read(reader.file().path()).expect("slurp run file");
    drop(reader);
    bytes
}

#[test]
fn truncated_run_is_detected() {
    let (_tmp, dir) = scratch();
    let mut bytes = sealed_run_bytes(&dir, 50);
    bytes.truncate(bytes.len() - 10);

    let mut reader = reseal(&dir, bytes);
    let err = collect(&mut reader).expect_err("truncation must surface");
    assert!(matches!(err, Error::Deserialization(_)));
}

#[test]
fn corrupted_payload_fails_checksum() {
    let (_tmp, dir) = scratch();
    let mut bytes = sealed_run_bytes(&dir, 50);
    // Flip one bit in the middle of the frame stream.
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x01;

    let mut reader = reseal(&dir, bytes);
    let err = collect(&mut reader).expect_err("corruption must surface");
    assert!(matches!(err, Error::Deserialization(_)));
}

#[test]
fn garbage_file_is_rejected_at_open() {
    let (_tmp, dir) = scratch();
    let path = dir.next_path();
    std::fs::write(&path, b"definitely not a run file").expect("write garbage");

    let result: Result<RunReader<u64, u64>, _> =
        RunReader::open(ScratchFile::adopt(path), SETTINGS);
    assert!(matches!(result, Err(Error::Deserialization(_))));
}

#[test]
fn scratch_paths_are_unique() {
    let (_tmp, dir) = scratch();
    let a = dir.next_path();
    let b = dir.next_path();
    assert_ne!(a, b);
}

#[test]
fn sweep_removes_stale_runs_only() {
    let (_tmp, dir) = scratch();

    std::fs::write(dir.next_path(), b"stale").expect("write stale");
    std::fs::write(dir.next_path(), b"stale").expect("write stale");
    std::fs::write(dir.root().join("unrelated.txt"), b"keep").expect("write other");

    let removed = dir.sweep().expect("sweep");
    assert_eq!(removed, 2);
    assert_eq!(dir.live_files().expect("count"), 0);
    assert!(dir.root().join("unrelated.txt").exists());
}

#[cfg(feature = "lz4")]
#[test]
fn lz4_run_round_trips() {
    use spillsort_io::Codec;

    let (_tmp, dir) = scratch();
    let mut writer: RunWriter<u64, String> =
        RunWriter::create(&dir, Codec::Lz4, SETTINGS).expect("create");
    for k in 0..1_000u64 {
        writer
            .add_already_sorted(&k, &"x".repeat(64))
            .expect("add");
    }
    let mut reader = writer.done().expect("seal");
    let out = collect(&mut reader).expect("drain");
    assert_eq!(out.len(), 1_000);
}

#[cfg(feature = "zstd")]
#[test]
fn zstd_run_round_trips() {
    use spillsort_io::Codec;

    let (_tmp, dir) = scratch();
    let mut writer: RunWriter<u64, String> =
        RunWriter::create(&dir, Codec::Zstd, SETTINGS).expect("create");
    for k in 0..1_000u64 {
        writer
            .add_already_sorted(&k, &"x".repeat(64))
            .expect("add");
    }
    let mut reader = writer.done().expect("seal");
    let out = collect(&mut reader).expect("drain");
    assert_eq!(out.len(), 1_000);
}
