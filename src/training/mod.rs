//! The per-worker training loop and the in-process multi-worker session driving it.

mod session;
mod worker;

pub use session::{ModelFactory, Session};
pub use worker::{TOTAL_LOSS, WorkerLoop};
