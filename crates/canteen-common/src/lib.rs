//! Shared types and infrastructure glue for the canteen order platform.
//!
//! # Modules
//!
//! - [`error`] - HTTP error taxonomy shared by every service
//! - [`config`] - env-sourced configuration primitives
//! - [`jwt`] - Token Authority (issue/verify access & refresh tokens)
//! - [`redis_client`] - shared Redis connection handle
//! - [`models`] - cross-service domain types
//! - [`logging`] - tracing bootstrap

pub mod config;
pub mod error;
pub mod jwt;
pub mod logging;
pub mod models;
pub mod redis_client;

pub use error::{ApiError, ApiResult};
pub use jwt::{Claims, TokenAuthority, TokenType};
pub use models::{OrderItem, OrderStatus, OrderStatusEvent};
pub use redis_client::RedisHandle;
