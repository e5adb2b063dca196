mod job;

pub mod handler;
pub mod tasks;
pub mod worker;

pub use job::*;
