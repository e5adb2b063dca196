pub mod battle;
pub mod events;
pub mod models;
pub mod production;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
