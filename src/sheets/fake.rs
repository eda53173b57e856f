use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde_json::Value;

use super::{AccessToken, Authenticator, SheetProperties, SheetsApi};

#[derive(Debug, Clone, PartialEq)]
pub struct FakeSheet {
    pub sheet_id: i64,
    pub title: String,
    pub rows: Vec<Vec<Value>>,
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Delete,
    Add,
    Update,
    Append,
}

#[derive(Default)]
struct State {
    sheets: Vec<FakeSheet>,
    next_sheet_id: i64,
    failing: Vec<Op>,
    calls: Vec<String>,
}

/// In-memory spreadsheet with the same observable behavior as the Sheets API
/// for the calls this crate makes.
#[derive(Default)]
pub struct FakeSheets {
    state: Mutex<State>,
    yielding: AtomicBool,
}

impl FakeSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call yield to the runtime once before it takes effect,
    /// the way a network round trip would.
    pub fn yield_on_calls(&self) {
        self.yielding.store(true, Ordering::SeqCst);
    }

    pub fn fail_on(&self, op: Op) {
        self.state.lock().unwrap().failing.push(op);
    }

    pub fn sheets(&self) -> Vec<FakeSheet> {
        self.state.lock().unwrap().sheets.clone()
    }

    pub fn sheet(&self, title: &str) -> Option<FakeSheet> {
        self.sheets().into_iter().find(|sheet| sheet.title == title)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn insert_sheet(&self, title: &str, rows: Vec<Vec<Value>>) {
        let mut state = self.state.lock().unwrap();
        state.next_sheet_id += 1;
        let sheet_id = state.next_sheet_id;
        state.sheets.push(FakeSheet {
            sheet_id,
            title: title.to_string(),
            rows,
        });
    }

    /// Logs `call` and then fails it if `op` was set up to fail. Failed calls
    /// still show up in [`FakeSheets::calls`].
    async fn record(&self, op: Op, call: String) -> anyhow::Result<std::sync::MutexGuard<'_, State>> {
        if self.yielding.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(&op) {
            bail!("injected {:?} failure", op);
        }
        Ok(state)
    }
}

/// Splits `'title'!A2:H` into the title and the 0-based start row.
fn parse_range(range: &str) -> anyhow::Result<(String, usize)> {
    let (title, cells) = range
        .rsplit_once('!')
        .ok_or_else(|| anyhow!("Unable to parse range: {}", range))?;
    let title = title
        .strip_prefix('\'')
        .and_then(|title| title.strip_suffix('\''))
        .unwrap_or(title)
        .replace("''", "'");
    let start = cells.split(':').next().unwrap_or_default();
    let row = start
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse::<usize>()
        .unwrap_or(1);
    Ok((title, row.saturating_sub(1)))
}

#[async_trait]
impl SheetsApi for FakeSheets {
    async fn list_sheets(
        &self,
        _token: &AccessToken,
        _spreadsheet_id: &str,
    ) -> anyhow::Result<Vec<SheetProperties>> {
        let state = self.record(Op::List, "list".to_string()).await?;
        Ok(state
            .sheets
            .iter()
            .map(|sheet| SheetProperties {
                sheet_id: sheet.sheet_id,
                title: sheet.title.clone(),
            })
            .collect())
    }

    async fn delete_sheet(
        &self,
        _token: &AccessToken,
        _spreadsheet_id: &str,
        sheet_id: i64,
    ) -> anyhow::Result<()> {
        let mut state = self.record(Op::Delete, format!("delete {}", sheet_id)).await?;
        let before = state.sheets.len();
        state.sheets.retain(|sheet| sheet.sheet_id != sheet_id);
        if state.sheets.len() == before {
            bail!("No sheet with id: {}", sheet_id);
        }
        Ok(())
    }

    async fn add_sheet(&self, _token: &AccessToken, _spreadsheet_id: &str, title: &str) -> anyhow::Result<()> {
        let mut state = self.record(Op::Add, format!("add {}", title)).await?;
        if state.sheets.iter().any(|sheet| sheet.title == title) {
            bail!("A sheet with the name \"{}\" already exists", title);
        }
        state.next_sheet_id += 1;
        let sheet_id = state.next_sheet_id;
        state.sheets.push(FakeSheet {
            sheet_id,
            title: title.to_string(),
            rows: Vec::new(),
        });
        Ok(())
    }

    async fn update_values(
        &self,
        _token: &AccessToken,
        _spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> anyhow::Result<()> {
        let mut state = self.record(Op::Update, format!("update {}", range)).await?;
        let (title, start_row) = parse_range(range)?;
        let sheet = state
            .sheets
            .iter_mut()
            .find(|sheet| sheet.title == title)
            .ok_or_else(|| anyhow!("Unable to parse range: {}", range))?;
        for (offset, row) in values.into_iter().enumerate() {
            let index = start_row + offset;
            if sheet.rows.len() <= index {
                sheet.rows.resize(index + 1, Vec::new());
            }
            sheet.rows[index] = row;
        }
        Ok(())
    }

    async fn append_values(
        &self,
        _token: &AccessToken,
        _spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> anyhow::Result<()> {
        let mut state = self.record(Op::Append, format!("append {}", range)).await?;
        let (title, _) = parse_range(range)?;
        let sheet = state
            .sheets
            .iter_mut()
            .find(|sheet| sheet.title == title)
            .ok_or_else(|| anyhow!("Unable to parse range: {}", range))?;
        sheet.rows.extend(values);
        Ok(())
    }
}

/// Hands out a fixed token, or fails every time.
pub struct StaticAuth {
    pub fail: bool,
}

#[async_trait]
impl Authenticator for StaticAuth {
    async fn access_token(&self) -> anyhow::Result<AccessToken> {
        if self.fail {
            bail!("invalid_grant");
        }
        Ok(AccessToken::new("test-token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_ranges() {
        assert_eq!(parse_range("'Daily-2024-05-01'!A1:H1").unwrap(), ("Daily-2024-05-01".to_string(), 0));
        assert_eq!(parse_range("'Bob''s'!A2:H").unwrap(), ("Bob's".to_string(), 1));
        assert!(parse_range("A1:H1").is_err());
    }
}
