pub mod human;
pub mod scheduler;
pub mod trace;

pub use human::{status_line, HumanMode};
pub use scheduler::{Scheduler, ShellInput};
pub use trace::SnapshotTrace;
