//! Worker Pool (spec.md §4.H) — at-least-once, late-ack, prefetch=1.
//! Runs as a process separate from `kitchen-api`, claiming rows from
//! `kitchen_outbox` via `FOR UPDATE SKIP LOCKED`.

use std::time::Duration;

use canteen_common::logging;
use canteen_common::redis_client::RedisHandle;
use kitchen_service::config::Settings;
use kitchen_service::db;
use kitchen_service::state_machine::StateMachine;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    logging::init_tracing(&settings.service_name);

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.postgres.url())
        .await?;
    db::migrate(&db_pool).await?;

    let redis = RedisHandle::connect(&settings.redis.url()).await?;
    let machine = StateMachine::new(db_pool.clone(), redis);
    let worker_id = format!("kitchen-worker-{}", Uuid::new_v4());

    tracing::info!(%worker_id, "kitchen-worker starting claim loop");
    run_claim_loop(&db_pool, &machine, &worker_id, &settings).await
}

/// Prefetch = 1: claim exactly one row per poll, process it fully
/// (late-ack: the row is only marked DONE after the state machine
/// completes), then poll again.
async fn run_claim_loop(
    db_pool: &PgPool,
    machine: &StateMachine,
    worker_id: &str,
    settings: &Settings,
) -> anyhow::Result<()> {
    loop {
        let claimed = db::outbox_claim_batch(db_pool, 1, worker_id).await?;
        let Some(row) = claimed.into_iter().next() else {
            tokio::time::sleep(Duration::from_secs(settings.worker_poll_interval_secs)).await;
            continue;
        };

        process_with_retry(db_pool, machine, row, settings).await;
    }
}

async fn process_with_retry(
    db_pool: &PgPool,
    machine: &StateMachine,
    row: db::OutboxRow,
    settings: &Settings,
) {
    let mut attempt = row.attempts;
    loop {
        match machine.run_to_completion(row.order_id).await {
            Ok(()) => {
                if let Err(err) = db::outbox_mark_done(db_pool, row.outbox_id).await {
                    tracing::error!(order_id = %row.order_id, error = %err, "failed to mark outbox row done");
                }
                return;
            }
            Err(err) => {
                attempt += 1;
                tracing::warn!(order_id = %row.order_id, attempt, error = %err, "order processing failed");

                if attempt > settings.worker_max_retries as i32 {
                    if let Err(publish_err) = fail_order(db_pool, machine, row.order_id).await {
                        tracing::error!(order_id = %row.order_id, error = %publish_err, "failed to transition order to FAILED");
                    }
                    let _ = db::outbox_mark_failed(db_pool, row.outbox_id, &err.to_string()).await;
                    return;
                }

                if let Err(release_err) =
                    db::outbox_release_for_retry(db_pool, row.outbox_id, &err.to_string()).await
                {
                    tracing::error!(order_id = %row.order_id, error = %release_err, "failed to release outbox row for retry");
                    return;
                }

                tokio::time::sleep(Duration::from_secs(settings.worker_retry_delay_secs)).await;

                // Re-claim before retrying; another worker may have raced us,
                // in which case we step aside.
                let reclaimed = match db::outbox_claim_batch(db_pool, 1, "retry-self").await {
                    Ok(rows) => rows.into_iter().find(|r| r.order_id == row.order_id),
                    Err(err) => {
                        tracing::error!(error = %err, "failed to reclaim row for retry");
                        return;
                    }
                };
                if reclaimed.is_none() {
                    return;
                }
            }
        }
    }
}

async fn fail_order(db_pool: &PgPool, machine: &StateMachine, order_id: Uuid) -> anyhow::Result<()> {
    let order = db::find_order(db_pool, order_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("order {order_id} vanished before FAILED transition"))?;
    if order.parsed_status().is_terminal() {
        return Ok(());
    }
    machine.fail(order_id, &order.principal_id).await
}
