pub mod auth;
#[cfg(test)]
pub mod fake;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::trace;

pub use self::auth::{AccessToken, Authenticator, ServiceAccount};

const ENDPOINT_SPREADSHEETS: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SheetProperties {
    // the API leaves out a zero sheet id
    #[serde(rename = "sheetId", default)]
    pub sheet_id: i64,
    pub title: String,
}

/// Calls into one Google Sheets document store. Every call is made with a
/// token obtained from an [`Authenticator`] beforehand.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn list_sheets(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
    ) -> anyhow::Result<Vec<SheetProperties>>;

    async fn delete_sheet(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        sheet_id: i64,
    ) -> anyhow::Result<()>;

    async fn add_sheet(&self, token: &AccessToken, spreadsheet_id: &str, title: &str) -> anyhow::Result<()>;

    /// Writes `values` verbatim into `range`.
    async fn update_values(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> anyhow::Result<()>;

    /// Appends rows after the table found in `range`, letting the sheet parse
    /// numbers and dates as if typed by a user.
    async fn append_values(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> anyhow::Result<()>;
}

/// A1 notation for `cells` on the sheet titled `sheet_name`.
pub fn a1_range(sheet_name: &str, cells: &str) -> String {
    format!("'{}'!{}", sheet_name.replace('\'', "''"), cells)
}

// see https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets/request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Request<'a> {
    AddSheet { properties: NewSheet<'a> },
    DeleteSheet {
        #[serde(rename = "sheetId")]
        sheet_id: i64,
    },
}

#[derive(Debug, Serialize)]
struct NewSheet<'a> {
    title: &'a str,
}

/// REST client for the Sheets v4 API.
pub struct GoogleSheets {
    http: reqwest::Client,
}

impl GoogleSheets {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn url(spreadsheet_id: &str, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = Url::parse(ENDPOINT_SPREADSHEETS).context("invalid endpoint")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("endpoint cannot be a base"))?
            .push(spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    async fn batch_update(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        request: Request<'_>,
        action: &str,
    ) -> anyhow::Result<()> {
        let url = Self::url(&format!("{}:batchUpdate", spreadsheet_id), &[])?;
        trace!("Sending batch update to {}: {:?}", action, request);
        let response = self
            .http
            .post(url)
            .bearer_auth(token.secret())
            .json(&json!({ "requests": [request] }))
            .send()
            .await
            .with_context(|| format!("request to {} failed", action))?;
        check_status(response, action).await?;
        Ok(())
    }
}

async fn check_status(response: Response, action: &str) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("request to {} failed with status {}: {}", action, status, body)
}

#[async_trait]
impl SheetsApi for GoogleSheets {
    async fn list_sheets(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
    ) -> anyhow::Result<Vec<SheetProperties>> {
        let url = Self::url(spreadsheet_id, &[])?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await
            .context("request to list sheets failed")?;
        let response = check_status(response, "list sheets").await?;

        #[derive(Deserialize)]
        struct Sheet {
            properties: SheetProperties,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            #[serde(default)]
            sheets: Vec<Sheet>,
        }
        let ApiResponse { sheets } = response.json().await.context("malformed sheet listing")?;
        Ok(sheets.into_iter().map(|sheet| sheet.properties).collect())
    }

    async fn delete_sheet(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        sheet_id: i64,
    ) -> anyhow::Result<()> {
        self.batch_update(
            token,
            spreadsheet_id,
            Request::DeleteSheet { sheet_id },
            "delete sheet",
        )
        .await
    }

    async fn add_sheet(&self, token: &AccessToken, spreadsheet_id: &str, title: &str) -> anyhow::Result<()> {
        self.batch_update(
            token,
            spreadsheet_id,
            Request::AddSheet {
                properties: NewSheet { title },
            },
            "add sheet",
        )
        .await
    }

    async fn update_values(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> anyhow::Result<()> {
        let url = Self::url(spreadsheet_id, &["values", range])?;
        let response = self
            .http
            .put(url)
            .bearer_auth(token.secret())
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": values }))
            .send()
            .await
            .context("request to update values failed")?;
        check_status(response, "update values").await?;
        Ok(())
    }

    async fn append_values(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> anyhow::Result<()> {
        let target = format!("{}:append", range);
        let url = Self::url(spreadsheet_id, &["values", target.as_str()])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token.secret())
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": values }))
            .send()
            .await
            .context("request to append values failed")?;
        check_status(response, "append values").await?;
        Ok(())
    }
}
