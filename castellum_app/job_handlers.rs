pub mod army_return;
pub mod attack;
pub mod game_tick;
pub mod training_queue;
