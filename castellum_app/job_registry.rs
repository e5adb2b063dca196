use serde_json::Value;

use castellum_types::errors::{AppError, ApplicationError};

use crate::{
    job_handlers::{
        army_return::ArmyReturnJobHandler, attack::AttackJobHandler,
        game_tick::GameTickJobHandler, training_queue::TrainingQueueJobHandler,
    },
    jobs::{
        handler::{JobHandler, JobRegistry},
        tasks::*,
    },
};

/// Every task type the worker knows how to run.
enum AppTaskType {
    GameTick,
    ProcessTrainingQueue,
    Attack,
    ArmyReturn,
}

impl AppTaskType {
    fn from_str(task_type: &str) -> Option<Self> {
        match task_type {
            GameTickTask::TASK_TYPE => Some(Self::GameTick),
            TrainingQueueTask::TASK_TYPE => Some(Self::ProcessTrainingQueue),
            AttackTask::TASK_TYPE => Some(Self::Attack),
            ArmyReturnTask::TASK_TYPE => Some(Self::ArmyReturn),
            _ => None,
        }
    }
}

/// Maps `task_type` strings to concrete handlers, decoding their payload.
#[derive(Default)]
pub struct AppJobRegistry;

impl AppJobRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl JobRegistry for AppJobRegistry {
    fn get_handler(
        &self,
        task_type: &str,
        data: &Value,
    ) -> Result<Box<dyn JobHandler>, ApplicationError> {
        let task = AppTaskType::from_str(task_type)
            .ok_or_else(|| ApplicationError::App(AppError::NoJobHandler(task_type.to_string())))?;

        match task {
            AppTaskType::GameTick => {
                let payload: GameTickTask = serde_json::from_value(data.clone())?;
                Ok(Box::new(GameTickJobHandler::new(payload)))
            }
            AppTaskType::ProcessTrainingQueue => {
                let payload: TrainingQueueTask = serde_json::from_value(data.clone())?;
                Ok(Box::new(TrainingQueueJobHandler::new(payload)))
            }
            AppTaskType::Attack => {
                let payload: AttackTask = serde_json::from_value(data.clone())?;
                Ok(Box::new(AttackJobHandler::new(payload)))
            }
            AppTaskType::ArmyReturn => {
                let payload: ArmyReturnTask = serde_json::from_value(data.clone())?;
                Ok(Box::new(ArmyReturnJobHandler::new(payload)))
            }
        }
    }
}
