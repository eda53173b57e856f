use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info};

use super::{
    lifecycle::SheetLifecycle,
    rows::{header_row, project},
    window::{ReportPeriod, ReportWindow},
};
use crate::{
    database::AppointmentStore,
    sheets::{Authenticator, SheetsApi},
};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("SPREADSHEET_ID environment variable not set")]
    NotConfigured,
    #[error("Failed to generate {period} report")]
    Failed {
        period: ReportPeriod,
        #[source]
        source: anyhow::Error,
    },
}

/// Where reports are written and how to get in.
pub struct ReportDestination {
    pub spreadsheet_id: String,
    pub auth: Arc<dyn Authenticator>,
    pub sheets: Arc<dyn SheetsApi>,
}

/// One async lock per sheet name, so two runs of the same period wait for
/// each other instead of racing on delete and create. Entries nobody holds or
/// waits on are dropped on the next acquire.
#[derive(Default)]
struct SheetLocks {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SheetLocks {
    async fn acquire(&self, sheet_name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(sheet_name.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Writes date-windowed appointment reports to sheets of one spreadsheet.
pub struct ReportService {
    destination: Option<ReportDestination>,
    store: Arc<dyn AppointmentStore>,
    locks: SheetLocks,
}

impl ReportService {
    pub fn new(destination: Option<ReportDestination>, store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            destination,
            store,
            locks: SheetLocks::default(),
        }
    }

    /// Rebuilds the sheet for the `period` window containing `today` and
    /// returns a summary of what was written.
    pub async fn generate(&self, period: ReportPeriod, today: NaiveDate) -> Result<String, ReportError> {
        let Some(destination) = self.destination.as_ref() else {
            error!("Cannot generate {} report: no spreadsheet configured", period);
            return Err(ReportError::NotConfigured);
        };

        let window = ReportWindow::new(period, today);
        let _guard = self.locks.acquire(&window.sheet_name()).await;

        match self.write_report(destination, &window).await {
            Ok(rows) => {
                info!("Wrote {} rows to sheet {}", rows, window.sheet_name());
                Ok(window.summary())
            }
            Err(source) => {
                error!("Error generating {} report: {:#}", period, source);
                Err(ReportError::Failed { period, source })
            }
        }
    }

    async fn write_report(
        &self,
        destination: &ReportDestination,
        window: &ReportWindow,
    ) -> anyhow::Result<usize> {
        let token = destination
            .auth
            .access_token()
            .await
            .context("failed to authenticate with the spreadsheet service")?;
        let sheet_name = window.sheet_name();
        let lifecycle = SheetLifecycle::new(
            destination.sheets.as_ref(),
            &token,
            &destination.spreadsheet_id,
        );

        lifecycle.delete_sheet_if_exists(&sheet_name).await;
        if !lifecycle.create_sheet_with_headers(&sheet_name, header_row()).await? {
            bail!("could not create sheet {}", sheet_name);
        }

        let appointments = if window.is_single_day() {
            self.store.find_by_date(window.start_str()).await
        } else {
            self.store
                .find_in_range(window.start_str(), window.end_str())
                .await
        }
        .context("failed to query appointments")?;

        let rows: Vec<_> = appointments
            .iter()
            .map(|appointment| project(appointment).to_vec())
            .collect();
        let count = rows.len();
        if count > 0 {
            lifecycle.append_rows(&sheet_name, rows).await?;
        }
        Ok(count)
    }
}
