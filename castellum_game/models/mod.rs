pub mod player;
pub mod troops;
pub mod village;
