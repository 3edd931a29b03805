use std::sync::Arc;

/// One reading from the external frequency detector. `None` means the detector
/// heard nothing usable. The receiving side stamps it with playback time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchEvent {
    pub frequency_hz: Option<f32>,
}

#[derive(thiserror::Error, Debug)]
pub enum PitchError {
    #[error("microphone unavailable: {0}")]
    MicrophoneUnavailable(String),
    #[error("model failed to load: {0}")]
    ModelLoad(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Detection stream handle. `close` returns once the microphone is released.
pub trait PitchInputStream: Send {
    fn close(self: Box<Self>);
}

pub type PitchEventCallback = Arc<dyn Fn(PitchEvent) + Send + Sync + 'static>;

pub trait PitchInputPort: Send + Sync {
    /// Start detecting: the implementation invokes cb from its own audio thread at
    /// whatever cadence the detector runs.
    fn open_input(&self, cb: PitchEventCallback) -> Result<Box<dyn PitchInputStream>, PitchError>;
}
