//! Tests for the playback driver and its sinks

use std::path::PathBuf;
use swarm_replay_core::{
    FrameSink, FrameView, PlaybackConfig, PlaybackDriver, PlaybackError, PlaybackTiming,
    Scenario, SceneLayout, TaskPhase, TraceError, TraceStream, VideoSink,
};

const SCENARIO: &str = r#"{"name":"demo","area":[0,100,0,100],"num_agents":2,
    "tasks":[
        {"id":1,"x":20,"y":20,"t0":0,"deadline":0.3},
        {"id":2,"x":80,"y":80,"t0":0,"deadline":10},
        {"id":3,"x":50,"y":50,"t0":5,"deadline":10}
    ]}"#;

const TRACE: &str = r#"{"t":0.0,"agents":[{"id":0,"x":10,"y":10},{"id":1,"x":90,"y":90}],"tasks":[{"id":1,"done":false},{"id":2,"done":false}],"leader":{"id":0,"term":1}}
{"t":0.2,"agents":[{"id":0,"x":12,"y":12},{"id":1,"x":88,"y":88}],"tasks":[{"id":1,"done":false},{"id":2,"done":false}]}
{"t":0.4,"agents":[{"id":0,"x":14,"y":14},{"id":1,"x":86,"y":86,"alive":false}],"tasks":[{"id":1,"done":false},{"id":2,"done":true}],"leader":{"id":0,"term":2}}
"#;

/// Sink that records the calls it receives
#[derive(Default)]
struct RecordingSink {
    timing: Option<PlaybackTiming>,
    times: Vec<f64>,
    finished: bool,
}

impl FrameSink for RecordingSink {
    fn begin(&mut self, timing: PlaybackTiming) -> Result<(), PlaybackError> {
        self.timing = Some(timing);
        Ok(())
    }

    fn push(&mut self, view: &FrameView) -> Result<(), PlaybackError> {
        assert!(!self.finished, "push after finish");
        self.times.push(view.t);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PlaybackError> {
        self.finished = true;
        Ok(())
    }
}

fn scenario() -> Scenario {
    Scenario::from_json_str(SCENARIO).unwrap()
}

#[test]
fn test_frames_delivered_in_trace_order() {
    let trace = TraceStream::from_text(TRACE).unwrap();
    let mut sink = RecordingSink::default();
    let summary = PlaybackDriver::new(PlaybackConfig::default())
        .run(&scenario(), &trace, &mut sink)
        .unwrap();

    assert_eq!(sink.times, vec![0.0, 0.2, 0.4]);
    assert!(sink.finished);
    assert_eq!(summary.frames, 3);
    assert_eq!(sink.timing.unwrap().fps, 5);
}

#[test]
fn test_summary_reports_timing_and_phases() {
    let trace = TraceStream::from_text(TRACE).unwrap();
    let mut views: Vec<FrameView> = Vec::new();
    let summary = PlaybackDriver::new(PlaybackConfig::default())
        .run(&scenario(), &trace, &mut views)
        .unwrap();

    assert!((summary.dt - 0.2).abs() < 1e-12);
    assert_eq!(summary.fps, 5);
    assert_eq!(summary.trail_capacity, 300);
    assert_eq!(summary.final_phases.missed, 1);
    assert_eq!(summary.final_phases.completed, 1);
    assert_eq!(summary.final_phases.inactive, 1);

    let last = views.last().unwrap();
    assert_eq!(last.task(1).unwrap().phase, TaskPhase::Missed);
    assert_eq!(last.task(2).unwrap().phase, TaskPhase::Completed);
    assert!(!last.agent(1).unwrap().alive);
    assert_eq!(last.leader_text(), "Current Leader: Agent 0 (Term 2)");
    assert!(views[1].leader.is_reelecting());
}

#[test]
fn test_empty_trace_runs_with_fallback() {
    let trace = TraceStream::from_text("").unwrap();
    let mut sink = RecordingSink::default();
    let summary = PlaybackDriver::new(PlaybackConfig::default())
        .run(&scenario(), &trace, &mut sink)
        .unwrap();

    assert_eq!(summary.frames, 0);
    assert_eq!(summary.dt, 0.1);
    assert_eq!(summary.fps, 10);
    assert_eq!(summary.trail_capacity, 600);
    assert_eq!(summary.final_phases.inactive, 3);
    assert!(sink.times.is_empty());
    assert!(sink.finished);
}

#[test]
fn test_single_frame_runs_with_fallback() {
    let trace = TraceStream::from_text("{\"t\":3.0,\"agents\":[{\"id\":0,\"x\":1,\"y\":1}]}\n")
        .unwrap();
    let mut views: Vec<FrameView> = Vec::new();
    let summary = PlaybackDriver::new(PlaybackConfig::default())
        .run(&scenario(), &trace, &mut views)
        .unwrap();

    assert_eq!(summary.frames, 1);
    assert_eq!(summary.dt, 0.1);
    assert_eq!(views.len(), 1);
}

#[test]
fn test_malformed_frame_aborts_playback() {
    let trace = TraceStream::from_text("{\"t\":0}\n{\"t\":0.1}\n{\"t\":\n").unwrap();
    let mut sink = RecordingSink::default();
    let err = PlaybackDriver::new(PlaybackConfig::default())
        .run(&scenario(), &trace, &mut sink)
        .unwrap_err();

    assert!(matches!(
        err,
        PlaybackError::Trace(TraceError::MalformedFrame { line: 3, .. })
    ));
    assert_eq!(sink.times.len(), 2);
    assert!(!sink.finished);
}

#[test]
fn test_custom_trail_window() {
    let trace = TraceStream::from_text(TRACE).unwrap();
    let config = PlaybackConfig {
        trail_window: 1.0,
        ..PlaybackConfig::default()
    };
    let mut views: Vec<FrameView> = Vec::new();
    let summary = PlaybackDriver::new(config)
        .run(&scenario(), &trace, &mut views)
        .unwrap();
    assert_eq!(summary.trail_capacity, 5);
}

#[test]
fn test_layout_paints_full_frames() {
    let trace = TraceStream::from_text(TRACE).unwrap();
    let scenario = scenario();
    let mut views: Vec<FrameView> = Vec::new();
    PlaybackDriver::new(PlaybackConfig::default())
        .run(&scenario, &trace, &mut views)
        .unwrap();

    let layout = SceneLayout::new(&scenario, 320, 240);
    for view in &views {
        let frame = layout.paint(view).unwrap();
        assert_eq!(frame.len(), 320 * 240 * 3);
        assert_eq!(frame.len(), layout.frame_len());
    }
}

#[test]
fn test_video_sink_without_ffmpeg_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested").join("run.mp4");
    let config = PlaybackConfig {
        output: output.clone(),
        width: 161,
        height: 121,
        ffmpeg: PathBuf::from("/definitely/not/ffmpeg"),
        ..PlaybackConfig::default()
    };
    let scenario = scenario();
    let trace = TraceStream::from_text(TRACE).unwrap();
    let mut sink = VideoSink::new(&scenario, &config);
    assert_eq!(sink.layout().width(), 160);
    assert_eq!(sink.layout().height(), 120);

    let err = PlaybackDriver::new(config)
        .run(&scenario, &trace, &mut sink)
        .unwrap_err();
    assert!(matches!(err, PlaybackError::Encode(_)));
    assert_eq!(sink.frames(), 3);
    // three frames 0.2 apart
    assert!((sink.trace_seconds() - 0.6).abs() < 1e-9);
    assert!(!output.exists());
}

#[test]
fn test_video_sink_skips_empty_trace() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.mp4");
    let config = PlaybackConfig {
        output: output.clone(),
        ffmpeg: PathBuf::from("/definitely/not/ffmpeg"),
        ..PlaybackConfig::default()
    };
    let scenario = scenario();
    let trace = TraceStream::from_text("\n").unwrap();
    let mut sink = VideoSink::new(&scenario, &config);

    let summary = PlaybackDriver::new(config)
        .run(&scenario, &trace, &mut sink)
        .unwrap();
    assert_eq!(summary.frames, 0);
    assert!(!output.exists());
}
