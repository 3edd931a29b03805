pub mod clef;
pub mod ledger;
pub mod note;
pub mod pitch;
pub mod sections;
pub mod staff;
pub mod tracks;

pub use clef::*;
pub use ledger::*;
pub use note::*;
pub use pitch::*;
pub use sections::*;
pub use staff::*;
pub use tracks::*;
