pub mod app_bus;
pub mod command_handlers;
pub mod config;
pub mod cqrs;
pub mod events;
pub mod job_handlers;
pub mod job_registry;
pub mod jobs;
pub mod locks;
pub mod queries_handlers;
pub mod repository;
pub mod scheduler;
pub mod uow;

pub mod test_utils;
