use crate::script::Script;
use crate::sim::{DrawTally, ScriptedDetector, SimulatedScore};
use serde::Serialize;
use std::sync::Arc;
use tma_core::{AppError, Command, Event, PracticeSession, SessionPorts, TeardownWarning};
use tma_domain_eval::{AccuracyStats, PitchSample};
use tma_ports::storage::StoragePort;

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub performance: Vec<PitchSample>,
    pub accuracy: AccuracyStats,
    pub accuracy_ratio: f64,
    pub page_turns: u32,
    pub frames: u64,
    pub drawing: DrawTally,
    /// Set when some resource was still held after the teardown timeout.
    pub teardown_warning: Option<String>,
}

/// Drive a full session through the script: load, practice, stop, tear down.
pub fn run(script: &Script, storage: Option<Box<dyn StoragePort>>) -> Result<ReplayReport, AppError> {
    let score = Arc::new(SimulatedScore::new(script.staff, script.viewport, script.cursor));
    let detector = ScriptedDetector::new();
    let mut session = PracticeSession::init(
        SessionPorts {
            pitch: Box::new(detector.clone()),
            score: score.clone(),
        },
        storage,
    );

    session.handle_command(Command::LoadScore {
        score: script.score.clone(),
    })?;
    session.handle_command(Command::SelectPart { track: script.part })?;
    session.handle_command(Command::StartPractice)?;

    let mut tally = DrawTally::default();
    let mut page_turns = 0;
    let mut frames = 0u64;
    let mut pending = script.detections.iter().peekable();
    let duration = script.duration();

    loop {
        let now = frames as f64 * script.frame_interval;
        if now > duration {
            break;
        }
        while let Some(detection) = pending.next_if(|d| d.time <= now) {
            // The session stamps a reading with the playback time it arrives at.
            score.set_time(detection.time);
            detector.deliver(detection);
        }
        score.set_time(now);
        session.pump();
        session.frame(&mut tally);
        page_turns += count_page_turns(&session.drain_events());
        frames += 1;
    }

    session.handle_command(Command::StopPractice)?;
    let mut performance = Vec::new();
    for event in session.drain_events() {
        match event {
            Event::PerformanceRecorded { samples } => performance = samples,
            Event::PageTurned { .. } => page_turns += 1,
            _ => {}
        }
    }
    let accuracy = session.stats();

    let teardown_warning = session
        .shutdown()
        .err()
        .map(|warning: TeardownWarning| warning.to_string());
    tracing::info!(frames, samples = performance.len(), "replay finished");

    Ok(ReplayReport {
        performance,
        accuracy,
        accuracy_ratio: accuracy.ratio(),
        page_turns,
        frames,
        drawing: tally,
        teardown_warning,
    })
}

fn count_page_turns(events: &[Event]) -> u32 {
    events
        .iter()
        .filter(|e| matches!(e, Event::PageTurned { .. }))
        .count() as u32
}
