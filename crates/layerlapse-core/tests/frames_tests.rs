#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::fs;

use common::{open_at, visible_stack};
use layerlapse_core::frames::{list_frames, playback_order, remove_frames, FrameIndex, FrameWriter};
use layerlapse_core::host::RasterOptions;
use layerlapse_core::LapseError;

#[test]
fn test_list_frames_sorts_numerically_and_ignores_others() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "psdtemp_00010.png",
        "psdtemp_00002.png",
        "psdtemp_100000.png",
        "psdtemp_00001.png",
        "psdtemp_1.png",
        "other_00003.png",
        "psdtemp_00004.jpg",
        "notes.txt",
    ] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    fs::create_dir(dir.path().join("psdtemp_00005.png")).unwrap();

    let frames = list_frames(dir.path(), "psdtemp_").unwrap();

    let names: Vec<String> = frames
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "psdtemp_00001.png",
            "psdtemp_00002.png",
            "psdtemp_00010.png",
            "psdtemp_100000.png",
        ]
    );
}

#[test]
fn test_remove_frames_only_touches_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("psdtemp_00000.png"), "").unwrap();
    fs::write(dir.path().join("psdtemp_00001.png"), "").unwrap();
    fs::write(dir.path().join("piece.psd"), "").unwrap();

    let removed = remove_frames(dir.path(), "psdtemp_").unwrap();

    assert_eq!(removed, 2);
    assert!(dir.path().join("piece.psd").exists());
    assert!(list_frames(dir.path(), "psdtemp_").unwrap().is_empty());
}

#[test]
fn test_playback_order_starts_from_last_frame() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..3 {
        fs::write(dir.path().join(format!("psdtemp_{i:05}.png")), "").unwrap();
    }

    let order = playback_order(list_frames(dir.path(), "psdtemp_").unwrap());

    assert_eq!(order[0], dir.path().join("psdtemp_00002.png"));
    assert_eq!(order[2], dir.path().join("psdtemp_00000.png"));
}

#[test]
fn test_writer_writes_through_host() {
    let dir = tempfile::tempdir().unwrap();
    let mut host =
        open_at(&dir.path().join("piece.psd"), 10, 10, visible_stack(2)).with_frame_files(true);
    let writer = FrameWriter::new(dir.path(), "psdtemp_", RasterOptions::default());

    let path = writer.write(&mut host, FrameIndex(3)).unwrap();

    assert_eq!(path, dir.path().join("psdtemp_00003.png"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "1\n2\n");
    assert_eq!(host.set_calls(), 0);
}

#[test]
fn test_writer_failure_carries_frame_index() {
    let mut host = common::open(10, 10, visible_stack(1)).fail_rasterize_at(0);
    let writer = FrameWriter::new("/out", "psdtemp_", RasterOptions::default());

    let err = writer.write(&mut host, FrameIndex(7)).unwrap_err();

    assert!(matches!(
        err,
        LapseError::FrameWriteFailed { frame_index: 7, .. }
    ));
}
