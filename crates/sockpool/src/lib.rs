#![doc = include_str!("../README.md")]

mod config;
mod error;
mod io;
mod pool;
mod record;
mod registry;

pub use config::{DEFAULT_SUBMIT_BUDGET, PoolConfig};
pub use error::{Error, Result};
pub use io::{Transfer, read_exact_timed, write_exact_timed};
pub use pool::{Pool, WorkerExit};
pub use record::TaskRecord;
pub use registry::{OpCode, TaskRegistry};
