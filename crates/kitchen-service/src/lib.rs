//! Shared order-store, outbox, and state-machine plumbing used by both
//! `kitchen-api` (HTTP surface) and `kitchen-worker` (durable task runner).

pub mod config;
pub mod db;
pub mod handlers;
pub mod state;
pub mod state_machine;
