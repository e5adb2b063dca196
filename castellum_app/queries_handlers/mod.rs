mod get_battle_reports;
mod get_player_stats;
mod get_village;

pub use get_battle_reports::GetBattleReportsHandler;
pub use get_player_stats::GetPlayerStatsHandler;
pub use get_village::GetVillageHandler;
