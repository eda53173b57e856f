use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use super::AppointmentStore;
use crate::models::appointments::{Appointment, NewAppointment};

/// Vec-backed store for tests. Setting `fail` makes every call error.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Appointment>>,
    next_id: Mutex<u64>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn with_records(data: Vec<NewAppointment>) -> Self {
        let store = Self::default();
        {
            let mut records = store.records.lock().unwrap();
            let mut next_id = store.next_id.lock().unwrap();
            for record in data {
                *next_id += 1;
                records.push(record.with_id(*next_id));
            }
        }
        store
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow!("store unavailable"));
        }
        Ok(())
    }

    fn filtered<P: Fn(&Appointment) -> bool>(&self, pred: P) -> Vec<Appointment> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| pred(record))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn list(&self) -> anyhow::Result<Vec<Appointment>> {
        self.check()?;
        Ok(self.filtered(|_| true))
    }

    async fn insert(&self, data: NewAppointment) -> anyhow::Result<Appointment> {
        self.check()?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let record = data.with_id(*next_id);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: u64) -> anyhow::Result<Option<Appointment>> {
        self.check()?;
        Ok(self.filtered(|record| record.id == id).into_iter().next())
    }

    async fn update(&self, id: u64, data: NewAppointment) -> anyhow::Result<Option<Appointment>> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                *record = data.with_id(id);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: u64) -> anyhow::Result<bool> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() < before)
    }

    async fn find_by_date(&self, date: String) -> anyhow::Result<Vec<Appointment>> {
        self.check()?;
        Ok(self.filtered(|record| record.date == date))
    }

    async fn find_in_range(&self, start: String, end: String) -> anyhow::Result<Vec<Appointment>> {
        self.check()?;
        let mut found =
            self.filtered(|record| record.date.as_str() >= start.as_str() && record.date <= end);
        found.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(found)
    }
}
