//! Tests for TraceStream
//!
//! Both on-disk layouts, format detection, restartability and the
//! empty/malformed edge cases.

use std::io::Write;
use swarm_replay_core::{TraceError, TraceFormat, TraceFrame, TraceStream};
use tempfile::NamedTempFile;

const LINES: &str = r#"{"t":0.0,"agents":[{"id":0,"x":1,"y":2,"alive":true}],"tasks":[{"id":1,"done":false}],"leader":{"id":0,"term":1}}
{"t":0.5,"agents":[{"id":0,"x":2,"y":3}],"tasks":[{"id":1,"done":true}],"leader":null}
{"t":1.0,"agents":[{"id":0,"x":3,"y":4,"alive":false}]}
"#;

const DOCUMENT: &str = r#"{
  "trace": [
    {"t": 0.0, "agents": [{"id": 0, "x": 1, "y": 2, "alive": true}], "leader": {"id": 0, "term": 1}},
    {"t": 0.5, "agents": [{"id": 0, "x": 2, "y": 3}], "leader": {}},
    {"t": 1.0, "agents": [{"id": 0, "x": 3, "y": 4, "alive": false}]}
  ]
}
"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn collect(stream: &TraceStream) -> Vec<TraceFrame> {
    stream
        .frames()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_lines_file() {
    let file = write_temp(LINES);
    let stream = TraceStream::open(file.path()).unwrap();
    assert_eq!(stream.format(), TraceFormat::Lines);

    let frames = collect(&stream);
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].leader_id(), Some(0));
    assert_eq!(frames[0].leader_term(), 1);
    assert_eq!(frames[1].leader_id(), None);
    assert!(frames[1].tasks[0].done);
    assert!(frames[2].tasks.is_empty());
}

#[test]
fn test_document_file() {
    let file = write_temp(DOCUMENT);
    let stream = TraceStream::open(file.path()).unwrap();
    assert_eq!(stream.format(), TraceFormat::Document);

    let frames = collect(&stream);
    let times: Vec<f64> = frames.iter().map(|f| f.t).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0]);
}

#[test]
fn test_both_layouts_yield_same_agents() {
    let lines = collect(&TraceStream::from_text(LINES).unwrap());
    let document = collect(&TraceStream::from_text(DOCUMENT).unwrap());
    for (a, b) in lines.iter().zip(&document) {
        assert_eq!(a.agents, b.agents);
    }
}

#[test]
fn test_missing_alive_reads_as_alive() {
    let frames = collect(&TraceStream::from_text(LINES).unwrap());
    assert!(frames[1].agents[0].alive);
    assert!(!frames[2].agents[0].alive);
}

#[test]
fn test_empty_leader_object_means_no_leader() {
    let frames = collect(&TraceStream::from_text(DOCUMENT).unwrap());
    assert_eq!(frames[1].leader_id(), None);
    assert_eq!(frames[2].leader_id(), None);
}

#[test]
fn test_frames_restart_from_the_beginning() {
    let stream = TraceStream::from_text(LINES).unwrap();
    let first = collect(&stream);
    let second = collect(&stream);
    assert_eq!(first, second);
}

#[test]
fn test_frame_clock_probe_does_not_consume() {
    let file = write_temp(LINES);
    let stream = TraceStream::open(file.path()).unwrap();
    assert_eq!(stream.frame_clock().unwrap().dt(), 0.5);
    assert_eq!(collect(&stream).len(), 3);
}

#[test]
fn test_frames_are_not_resorted() {
    let stream = TraceStream::from_text("{\"t\":2}\n{\"t\":1}\n").unwrap();
    let times: Vec<f64> = collect(&stream).iter().map(|f| f.t).collect();
    assert_eq!(times, vec![2.0, 1.0]);
    // decreasing spacing falls back
    assert!(stream.frame_clock().unwrap().is_fallback());
}

#[test]
fn test_single_frame_clock_falls_back() {
    let stream = TraceStream::from_text("{\"t\":7}\n").unwrap();
    let clock = stream.frame_clock().unwrap();
    assert_eq!(clock.dt(), 0.1);
}

#[test]
fn test_empty_lines_trace() {
    let file = write_temp("");
    let stream = TraceStream::open(file.path()).unwrap();
    assert_eq!(stream.frames().unwrap().count(), 0);
    assert!(matches!(stream.frame_clock(), Err(TraceError::EmptyTrace)));
}

#[test]
fn test_empty_document_trace() {
    let stream = TraceStream::from_text("{\"trace\": []}").unwrap();
    assert_eq!(stream.format(), TraceFormat::Document);
    assert!(matches!(stream.frame_clock(), Err(TraceError::EmptyTrace)));
}

#[test]
fn test_blank_lines_are_skipped() {
    let stream = TraceStream::from_text("\n{\"t\":0}\n\n   \n{\"t\":1}\n").unwrap();
    assert_eq!(collect(&stream).len(), 2);
}

#[test]
fn test_forced_format_overrides_detection() {
    let stream =
        TraceStream::from_text_with_format(DOCUMENT, Some(TraceFormat::Lines)).unwrap();
    assert_eq!(stream.format(), TraceFormat::Lines);
    let first = stream.frames().unwrap().next().unwrap();
    assert!(matches!(first, Err(TraceError::MalformedFrame { line: 1, .. })));
}

#[test]
fn test_malformed_document_is_fatal() {
    let stream = TraceStream::from_text("{\n \"trace\": [ {\"t\": 0}, \n").unwrap();
    assert_eq!(stream.format(), TraceFormat::Document);
    assert!(matches!(
        stream.frames(),
        Err(TraceError::MalformedFrame { .. })
    ));
}

#[test]
fn test_frame_missing_time_is_malformed() {
    let stream = TraceStream::from_text("{\"t\":0}\n{\"agents\":[]}\n").unwrap();
    let results: Vec<_> = stream.frames().unwrap().collect();
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(TraceError::MalformedFrame { line: 2, .. })
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TraceStream::open(dir.path().join("missing.ndjson")).unwrap_err();
    assert!(matches!(err, TraceError::Io { .. }));
}

#[test]
fn test_detect_plain_frame_line() {
    let format = TraceFormat::detect("{\"t\":0,\"agents\":[]}\n".as_bytes()).unwrap();
    assert_eq!(format, TraceFormat::Lines);
}

#[test]
fn test_detect_pretty_printed_document() {
    let format = TraceFormat::detect(DOCUMENT.as_bytes()).unwrap();
    assert_eq!(format, TraceFormat::Document);
}
