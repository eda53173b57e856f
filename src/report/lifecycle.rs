use anyhow::Context;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::sheets::{a1_range, AccessToken, SheetsApi};

const HEADER_CELLS: &str = "A1:H1";
const DATA_CELLS: &str = "A2:H";

/// Prepares named sheets of one spreadsheet for a fresh report.
pub struct SheetLifecycle<'a> {
    sheets: &'a dyn SheetsApi,
    token: &'a AccessToken,
    spreadsheet_id: &'a str,
}

impl<'a> SheetLifecycle<'a> {
    pub fn new(sheets: &'a dyn SheetsApi, token: &'a AccessToken, spreadsheet_id: &'a str) -> Self {
        Self {
            sheets,
            token,
            spreadsheet_id,
        }
    }

    /// Deletes the sheet titled `sheet_name`. Returns whether one was deleted.
    ///
    /// Failures are logged and reported as `false`, so this is only a
    /// best-effort cleanup.
    pub async fn delete_sheet_if_exists(&self, sheet_name: &str) -> bool {
        match self.try_delete(sheet_name).await {
            Ok(deleted) => deleted,
            Err(err) => {
                warn!("Error deleting sheet {}: {:#}", sheet_name, err);
                false
            }
        }
    }

    async fn try_delete(&self, sheet_name: &str) -> anyhow::Result<bool> {
        let existing = self
            .sheets
            .list_sheets(self.token, self.spreadsheet_id)
            .await
            .context("failed to look up sheets")?;
        let Some(sheet) = existing.into_iter().find(|sheet| sheet.title == sheet_name) else {
            debug!("No sheet named {} to delete", sheet_name);
            return Ok(false);
        };

        self.sheets
            .delete_sheet(self.token, self.spreadsheet_id, sheet.sheet_id)
            .await?;
        info!("Deleted sheet {} ({})", sheet_name, sheet.sheet_id);
        Ok(true)
    }

    /// Adds a sheet titled `sheet_name` and writes `headers` as its first row.
    ///
    /// Returns `false` if the sheet could not be added. An error writing the
    /// headers is returned as-is.
    pub async fn create_sheet_with_headers(
        &self,
        sheet_name: &str,
        headers: Vec<Value>,
    ) -> anyhow::Result<bool> {
        if let Err(err) = self
            .sheets
            .add_sheet(self.token, self.spreadsheet_id, sheet_name)
            .await
        {
            error!("Error creating sheet {}: {:#}", sheet_name, err);
            return Ok(false);
        }

        self.sheets
            .update_values(
                self.token,
                self.spreadsheet_id,
                &a1_range(sheet_name, HEADER_CELLS),
                vec![headers],
            )
            .await
            .with_context(|| format!("failed to write headers to sheet {}", sheet_name))?;
        info!("Created sheet {}", sheet_name);
        Ok(true)
    }

    /// Appends `rows` below the header row.
    pub async fn append_rows(&self, sheet_name: &str, rows: Vec<Vec<Value>>) -> anyhow::Result<()> {
        let count = rows.len();
        self.sheets
            .append_values(
                self.token,
                self.spreadsheet_id,
                &a1_range(sheet_name, DATA_CELLS),
                rows,
            )
            .await
            .with_context(|| format!("failed to append rows to sheet {}", sheet_name))?;
        debug!("Appended {} rows to sheet {}", count, sheet_name);
        Ok(())
    }
}
