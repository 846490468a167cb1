#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod output;
pub mod task;

pub use crate::error::{Result, TdError};
pub use crate::task::model::{Task, TaskState};
pub use crate::task::tracker::{NewTask, TaskEdit, Tracker};
