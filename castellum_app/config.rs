use dotenvy::dotenv;
use std::env;

pub struct Config {
    pub world_size: i32,
    pub speed: u8,
    pub tick_interval_secs: u64,
    pub training_interval_secs: u64,
    pub worker_batch_size: usize,
    pub job_max_retries: u32,
    pub retry_backoff_secs: u64,
    pub seed_villages: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let world_size = match env::var("CASTELLUM_WORLD_SIZE") {
            Ok(val) => val.parse::<i32>().unwrap_or(100),
            Err(_) => 100,
        };

        let speed = match env::var("CASTELLUM_SERVER_SPEED") {
            Ok(val) => val.parse::<u8>().unwrap_or(1).clamp(1, 5),
            Err(_) => 1,
        };

        let tick_interval_secs = match env::var("CASTELLUM_TICK_INTERVAL_SECS") {
            Ok(val) => val.parse::<u64>().unwrap_or(60).max(1),
            Err(_) => 60,
        };

        let training_interval_secs = match env::var("CASTELLUM_TRAINING_INTERVAL_SECS") {
            Ok(val) => val.parse::<u64>().unwrap_or(300).max(1),
            Err(_) => 300,
        };

        let worker_batch_size = match env::var("CASTELLUM_WORKER_BATCH_SIZE") {
            Ok(val) => val.parse::<usize>().unwrap_or(10).max(1),
            Err(_) => 10,
        };

        let job_max_retries = match env::var("CASTELLUM_JOB_MAX_RETRIES") {
            Ok(val) => val.parse::<u32>().unwrap_or(5),
            Err(_) => 5,
        };

        let retry_backoff_secs = match env::var("CASTELLUM_RETRY_BACKOFF_SECS") {
            Ok(val) => val.parse::<u64>().unwrap_or(5),
            Err(_) => 5,
        };

        let seed_villages = match env::var("CASTELLUM_SEED_VILLAGES") {
            Ok(val) => val.parse::<u32>().unwrap_or(0),
            Err(_) => 0,
        };

        Self {
            world_size,
            speed,
            tick_interval_secs,
            training_interval_secs,
            worker_batch_size,
            job_max_retries,
            retry_backoff_secs,
            seed_villages,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world_size: 100,
            speed: 1,
            tick_interval_secs: 60,
            training_interval_secs: 300,
            worker_batch_size: 10,
            job_max_retries: 5,
            retry_backoff_secs: 5,
            seed_villages: 0,
        }
    }
}
