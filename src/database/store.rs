use anyhow::Context;
use async_trait::async_trait;
use diesel::{mysql::Mysql, prelude::*};

use super::run_blocking;
use crate::{
    models::appointments::{Appointment, NewAppointment},
    schema::appointments,
    DbPool,
};

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>
);

/// Storage for appointment records.
///
/// `date` is stored as zero-padded `YYYY-MM-DD` text, so the range lookup
/// compares strings and still yields chronological order.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Appointment>>;

    async fn insert(&self, data: NewAppointment) -> anyhow::Result<Appointment>;

    async fn get(&self, id: u64) -> anyhow::Result<Option<Appointment>>;

    /// Replaces every column of an existing record. `None` if there is no
    /// record with this id.
    async fn update(&self, id: u64, data: NewAppointment) -> anyhow::Result<Option<Appointment>>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: u64) -> anyhow::Result<bool>;

    async fn find_by_date(&self, date: String) -> anyhow::Result<Vec<Appointment>>;

    /// Inclusive on both ends.
    async fn find_in_range(&self, start: String, end: String) -> anyhow::Result<Vec<Appointment>>;
}

type BoxedAppointments = appointments::BoxedQuery<'static, Mysql>;

fn on_date(date: String) -> BoxedAppointments {
    appointments::table
        .filter(appointments::date.eq(date))
        .order(appointments::id.asc())
        .into_boxed()
}

fn in_range(start: String, end: String) -> BoxedAppointments {
    appointments::table
        .filter(appointments::date.ge(start))
        .filter(appointments::date.le(end))
        .order((appointments::date.asc(), appointments::id.asc()))
        .into_boxed()
}

pub struct MysqlStore {
    pool: DbPool,
}

impl MysqlStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for MysqlStore {
    async fn list(&self) -> anyhow::Result<Vec<Appointment>> {
        run_blocking(&self.pool, |conn| {
            appointments::table
                .order(appointments::id.asc())
                .load::<Appointment>(conn)
                .context("DB error")
        })
        .await
    }

    async fn insert(&self, data: NewAppointment) -> anyhow::Result<Appointment> {
        run_blocking(&self.pool, move |conn| {
            conn.transaction(|| {
                diesel::insert_into(appointments::table)
                    .values(&data)
                    .execute(conn)
                    .context("DB error")?;
                let id = diesel::select(last_insert_id)
                    .first::<u64>(conn)
                    .context("DB error")?;
                Ok(data.with_id(id))
            })
        })
        .await
    }

    async fn get(&self, id: u64) -> anyhow::Result<Option<Appointment>> {
        run_blocking(&self.pool, move |conn| {
            appointments::table
                .find(id)
                .first::<Appointment>(conn)
                .optional()
                .context("DB error")
        })
        .await
    }

    async fn update(&self, id: u64, data: NewAppointment) -> anyhow::Result<Option<Appointment>> {
        run_blocking(&self.pool, move |conn| {
            conn.transaction(|| {
                // MySQL reports changed rows rather than matched rows, so an
                // identical replace would look like a miss
                let exists = appointments::table
                    .find(id)
                    .count()
                    .get_result::<i64>(conn)
                    .context("DB error")?;
                if exists == 0 {
                    return Ok(None);
                }

                diesel::update(appointments::table.find(id))
                    .set(&data)
                    .execute(conn)
                    .context("DB error")?;

                Ok(Some(data.with_id(id)))
            })
        })
        .await
    }

    async fn delete(&self, id: u64) -> anyhow::Result<bool> {
        run_blocking(&self.pool, move |conn| {
            let deleted = diesel::delete(appointments::table.find(id))
                .execute(conn)
                .context("DB error")?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn find_by_date(&self, date: String) -> anyhow::Result<Vec<Appointment>> {
        run_blocking(&self.pool, move |conn| {
            on_date(date).load::<Appointment>(conn).context("DB error")
        })
        .await
    }

    async fn find_in_range(&self, start: String, end: String) -> anyhow::Result<Vec<Appointment>> {
        run_blocking(&self.pool, move |conn| {
            in_range(start, end).load::<Appointment>(conn).context("DB error")
        })
        .await
    }
}
