pub mod pitch;
pub mod score;
pub mod storage;
pub mod surface;
pub mod types;

pub use pitch::*;
pub use score::*;
pub use storage::*;
pub use surface::*;
pub use types::*;
