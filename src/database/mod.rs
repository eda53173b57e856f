#[cfg(test)]
pub mod memory;
pub mod store;

use crate::DbPool;
use actix_web::web;
use anyhow::{anyhow, Context};
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use r2d2::PooledConnection;

pub use self::store::{AppointmentStore, MysqlStore};

pub fn get_db_conn(
    pool: &DbPool,
) -> anyhow::Result<PooledConnection<ConnectionManager<MysqlConnection>>> {
    pool.get().context("DB connection")
}

/// Runs a diesel query on actix's blocking thread pool with a pooled
/// connection.
pub async fn run_blocking<F, T>(pool: &DbPool, query: F) -> anyhow::Result<T>
where
    F: FnOnce(&MysqlConnection) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let conn = get_db_conn(pool)?;
    web::block(move || query(&*conn))
        .await
        .map_err(|err| anyhow!("blocking task failed: {}", err))?
}
