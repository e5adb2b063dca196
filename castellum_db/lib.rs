pub mod mapping;
pub mod uow;

mod bootstrap;
mod models;
mod repository;
mod store;

pub use bootstrap::bootstrap_world;
pub use repository::*;
pub use store::InMemoryStore;
