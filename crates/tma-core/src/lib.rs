pub mod highlight;
pub mod ipc;
pub mod page_watch;
pub mod render_loop;
pub mod session;
pub mod teardown;

pub use highlight::*;
pub use ipc::*;
pub use page_watch::*;
pub use render_loop::*;
pub use session::*;
pub use teardown::*;
