use canteen_common::redis_client::RedisHandle;

use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub redis: RedisHandle,
    pub settings: Settings,
}
