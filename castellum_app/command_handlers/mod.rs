mod attack_village;
mod helpers;
mod train_units;
mod upgrade_resource_field;

pub use attack_village::AttackVillageCommandHandler;
pub use train_units::TrainUnitsCommandHandler;
pub use upgrade_resource_field::UpgradeResourceFieldCommandHandler;
