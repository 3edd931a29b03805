pub mod accuracy;
pub mod expected;
pub mod recorder;
pub mod smoothing;

pub use accuracy::*;
pub use expected::*;
pub use recorder::*;
pub use smoothing::*;
