use pretty_assertions::assert_eq;
use serde_json::json;
use tma_core::{Command, Event, Resource};
use tma_domain_eval::PitchSample;
use tma_domain_notation::MeasureRange;

#[test]
fn load_score_command_from_front_end_json() {
    let raw = json!({
        "type": "LoadScore",
        "payload": {
            "score": {
                "parts": [{
                    "name": "Soprano",
                    "clefs": ["treble"],
                    "performance_expectation": [69, 1.0, 71, 1.0]
                }],
                "measure_lengths": [2.0, 2.0],
                "measures": { "start": 1, "end": 2 }
            }
        }
    });
    let Command::LoadScore { score } = serde_json::from_value::<Command>(raw).unwrap() else {
        panic!("expected LoadScore");
    };
    assert_eq!(score.measures, MeasureRange { start: 1, end: 2 });
    assert_eq!(score.parts.len(), 1);
    assert_eq!(score.parts[0].expectation.len(), 2);
    assert_eq!(score.parts[0].lower_upper, None);
}

#[test]
fn odd_expectation_is_rejected() {
    let raw = json!({
        "type": "LoadScore",
        "payload": {
            "score": {
                "parts": [{ "name": "Alto", "performance_expectation": [67, 1.0, 69] }],
                "measures": { "start": 1, "end": 1 }
            }
        }
    });
    assert!(serde_json::from_value::<Command>(raw).is_err());
}

#[test]
fn unit_commands_carry_only_the_tag() {
    let value = serde_json::to_value(Command::StartPractice).unwrap();
    assert_eq!(value, json!({ "type": "StartPractice" }));
    assert!(matches!(
        serde_json::from_value::<Command>(json!({ "type": "StopPractice" })).unwrap(),
        Command::StopPractice
    ));
}

#[test]
fn recorded_performance_uses_export_field_names() {
    let event = Event::PerformanceRecorded {
        samples: vec![PitchSample {
            midi: 60.0,
            time: 0.5,
        }],
    };
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({
            "type": "PerformanceRecorded",
            "payload": { "samples": [{ "midival": 60.0, "timepos": 0.5 }] }
        })
    );
}

#[test]
fn teardown_warning_event_lists_pending_resources() {
    let event = Event::TeardownIncomplete {
        pending: vec![Resource::Player],
    };
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({ "type": "TeardownIncomplete", "payload": { "pending": ["Player"] } })
    );
}
