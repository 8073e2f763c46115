//! Overwrites a named worksheet with a report's table.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use agile_report::{Cell, Report};
use reqwest::{Client, RequestBuilder, Url};
use serde::{
  Deserialize, Serialize,
  de::{DeserializeOwned, IgnoredAny},
};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
  Error, Result,
  models::{BatchUpdateResponse, SheetProperties, Spreadsheet},
};

/// OAuth scope that allows editing spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_timeout_secs() -> u64 { 30 }

/// Writer settings, as read from the `[sheet]` configuration table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
  /// The id from the spreadsheet's URL.
  pub spreadsheet_id: String,
  /// Service account key file (JSON) with edit access to the spreadsheet.
  pub key_file:       PathBuf,
  #[serde(default = "default_base_url")]
  pub base_url:       String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:   u64,
}

impl SheetConfig {
  pub fn new(spreadsheet_id: impl Into<String>, key_file: impl Into<PathBuf>) -> Self {
    Self {
      spreadsheet_id: spreadsheet_id.into(),
      key_file:       key_file.into(),
      base_url:       default_base_url(),
      timeout_secs:   default_timeout_secs(),
    }
  }
}

/// Exchange a service account key for a bearer token with [`SHEETS_SCOPE`].
pub async fn service_account_token(key_file: &Path) -> Result<String> {
  let key = yup_oauth2::read_service_account_key(key_file)
    .await
    .map_err(|source| Error::KeyFile { path: key_file.to_path_buf(), source })?;
  let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
    .build()
    .await
    .map_err(Error::Authenticator)?;
  let token = auth.token(&[SHEETS_SCOPE]).await?;
  token.token().map(str::to_string).ok_or(Error::MissingToken)
}

/// A1 reference to a whole worksheet. Quotes inside the title are doubled.
fn a1_sheet(title: &str) -> String { format!("'{}'", title.replace('\'', "''")) }

fn cell_value(cell: &Cell) -> Value {
  match cell {
    Cell::Int(n) => Value::from(*n),
    other => Value::String(other.to_string()),
  }
}

/// The report table as Sheets `values`: integers stay numeric, everything
/// else is rendered as text.
pub fn values(report: &Report) -> Vec<Vec<Value>> {
  report
    .table
    .iter()
    .map(|row| row.iter().map(cell_value).collect())
    .collect()
}

/// Writes reports into worksheets of one spreadsheet.
#[derive(Clone)]
pub struct SheetWriter {
  client:         Client,
  base_url:       Url,
  spreadsheet_id: String,
  token:          String,
}

impl SheetWriter {
  /// Build a writer that sends `token` as its bearer credential.
  pub fn new(config: &SheetConfig, token: impl Into<String>) -> Result<Self> {
    let base_url = Url::parse(&config.base_url)
      .ok()
      .filter(|url| !url.cannot_be_a_base())
      .ok_or_else(|| Error::InvalidBaseUrl(config.base_url.clone()))?;
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      base_url,
      spreadsheet_id: config.spreadsheet_id.clone(),
      token: token.into(),
    })
  }

  /// Authenticate with the configured service account key, then build the
  /// writer.
  pub async fn connect(config: &SheetConfig) -> Result<Self> {
    let token = service_account_token(&config.key_file).await?;
    Self::new(config, token)
  }

  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(["v4", "spreadsheets"]).extend(segments);
    }
    url
  }

  async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
    let response = request.bearer_auth(&self.token).send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Http { status, body });
    }
    Ok(response.json().await?)
  }

  async fn batch_update(&self, requests: Value) -> Result<BatchUpdateResponse> {
    let endpoint = format!("{}:batchUpdate", self.spreadsheet_id);
    let url = self.url(&[endpoint.as_str()]);
    self
      .send(self.client.post(url).json(&json!({ "requests": requests })))
      .await
  }

  // ── Worksheets ────────────────────────────────────────────────────────────

  /// Every worksheet in the spreadsheet, in tab order.
  pub async fn worksheets(&self) -> Result<Vec<SheetProperties>> {
    let url = self.url(&[self.spreadsheet_id.as_str()]);
    let doc: Spreadsheet = self
      .send(self.client.get(url).query(&[("fields", "sheets.properties")]))
      .await?;
    Ok(doc.sheets.into_iter().map(|sheet| sheet.properties).collect())
  }

  /// The worksheet titled `title`, added as a 1×1 sheet when missing.
  pub async fn get_or_create_worksheet(&self, title: &str) -> Result<SheetProperties> {
    if let Some(sheet) = self.worksheets().await?.into_iter().find(|s| s.title == title) {
      debug!(title, sheet_id = sheet.sheet_id, "found worksheet");
      return Ok(sheet);
    }

    let response = self
      .batch_update(json!([{
        "addSheet": {
          "properties": {
            "title": title,
            "gridProperties": { "rowCount": 1, "columnCount": 1 }
          }
        }
      }]))
      .await?;
    let sheet = response
      .replies
      .into_iter()
      .find_map(|reply| reply.add_sheet)
      .map(|added| added.properties)
      .ok_or_else(|| Error::MissingAddSheetReply(title.to_string()))?;
    info!(title, sheet_id = sheet.sheet_id, "created worksheet");
    Ok(sheet)
  }

  // ── Contents ──────────────────────────────────────────────────────────────

  /// Resize `sheet` to `rows` × `columns` (at least 1×1) and blank every
  /// remaining cell.
  pub async fn clear_sheet(
    &self,
    sheet: &SheetProperties,
    rows: usize,
    columns: usize,
  ) -> Result<()> {
    let (rows, columns) = (rows.max(1), columns.max(1));
    self
      .batch_update(json!([{
        "updateSheetProperties": {
          "properties": {
            "sheetId": sheet.sheet_id,
            "gridProperties": { "rowCount": rows, "columnCount": columns }
          },
          "fields": "gridProperties(rowCount,columnCount)"
        }
      }]))
      .await?;

    let range = format!("{}:clear", a1_sheet(&sheet.title));
    let url = self.url(&[self.spreadsheet_id.as_str(), "values", range.as_str()]);
    let _: IgnoredAny = self.send(self.client.post(url).json(&json!({}))).await?;
    debug!(title = %sheet.title, rows, columns, "cleared worksheet");
    Ok(())
  }

  /// Replace the contents of `sheet` with `report`'s table, resized to
  /// exactly fit it.
  pub async fn update_sheet(&self, sheet: &SheetProperties, report: &Report) -> Result<()> {
    self.clear_sheet(sheet, report.table.len(), report.width()).await?;
    if report.table.is_empty() {
      return Ok(());
    }

    let range = format!("{}!A1", a1_sheet(&sheet.title));
    let url = self.url(&[self.spreadsheet_id.as_str(), "values", range.as_str()]);
    let body = json!({
      "range": range,
      "majorDimension": "ROWS",
      "values": values(report),
    });
    let _: IgnoredAny = self
      .send(
        self
          .client
          .put(url)
          .query(&[("valueInputOption", "USER_ENTERED")])
          .json(&body),
      )
      .await?;
    Ok(())
  }

  /// Overwrite the worksheet titled `title` with `report`, creating the
  /// worksheet if needed.
  pub async fn write(&self, title: &str, report: &Report) -> Result<()> {
    let sheet = self.get_or_create_worksheet(title).await?;
    self.update_sheet(&sheet, report).await?;
    info!(title, rows = report.table.len(), columns = report.width(), "wrote worksheet");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use agile_report::{Summary, row, window::DateRange};
  use chrono::{NaiveDate, TimeZone, Utc};
  use reqwest::StatusCode;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, path_regex, query_param},
  };

  use super::*;

  const TOKEN: &str = "test-token";

  fn config(uri: &str) -> SheetConfig {
    let mut config = SheetConfig::new("doc-1", "unused.json");
    config.base_url = uri.to_string();
    config.timeout_secs = 5;
    config
  }

  fn writer(server: &MockServer) -> SheetWriter {
    SheetWriter::new(&config(&server.uri()), TOKEN).unwrap()
  }

  fn report(header: bool) -> Report {
    let range = DateRange {
      start: Utc.with_ymd_and_hms(2016, 5, 15, 0, 0, 0).unwrap().fixed_offset(),
      end:   Utc.with_ymd_and_hms(2016, 5, 28, 23, 59, 59).unwrap().fixed_offset(),
    };
    Report::new(Summary::new("Throughput", &range), row!["Week", "Completed"], header)
  }

  fn filled_report() -> Report {
    let mut report = report(true);
    report.push(row![NaiveDate::from_ymd_opt(2016, 5, 15).unwrap(), 4_i64]);
    report.push(row![NaiveDate::from_ymd_opt(2016, 5, 22).unwrap(), 3_i64]);
    report
  }

  fn throughput_sheet() -> SheetProperties {
    SheetProperties {
      sheet_id:        7,
      title:           "Throughput".into(),
      grid_properties: None,
    }
  }

  async fn mount_sheets(server: &MockServer, sheets: Value) {
    Mock::given(method("GET"))
      .and(path("/v4/spreadsheets/doc-1"))
      .and(query_param("fields", "sheets.properties"))
      .and(header("authorization", "Bearer test-token"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sheets": sheets })))
      .mount(server)
      .await;
  }

  async fn mount_contents(server: &MockServer) {
    Mock::given(method("POST"))
      .and(path("/v4/spreadsheets/doc-1:batchUpdate"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "replies": [{}] })))
      .mount(server)
      .await;
    Mock::given(method("POST"))
      .and(path_regex(r"^/v4/spreadsheets/doc-1/values/.*Throughput.*:clear$"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .mount(server)
      .await;
  }

  #[test]
  fn sheet_titles_are_quoted() {
    assert_eq!(a1_sheet("Throughput"), "'Throughput'");
    assert_eq!(a1_sheet("Bob's Bugs"), "'Bob''s Bugs'");
  }

  #[test]
  fn values_keep_integers_numeric() {
    let mut report = filled_report();
    report.push(row!["Total", None::<i64>]);
    assert_eq!(
      values(&report),
      vec![
        vec![json!("Week"), json!("Completed")],
        vec![json!("2016-05-15"), json!(4)],
        vec![json!("2016-05-22"), json!(3)],
        vec![json!("Total"), json!("")],
      ]
    );
  }

  #[test]
  fn config_defaults() {
    let config: SheetConfig =
      serde_json::from_str(r#"{"spreadsheet_id": "doc-1", "key_file": "svc.json"}"#).unwrap();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.key_file, PathBuf::from("svc.json"));
  }

  #[test]
  fn rejects_unusable_base_url() {
    let mut config = SheetConfig::new("doc-1", "svc.json");
    config.base_url = "mailto:someone@example.com".into();
    assert!(matches!(SheetWriter::new(&config, TOKEN), Err(Error::InvalidBaseUrl(_))));
  }

  #[tokio::test]
  async fn missing_key_file_is_reported() {
    let err = service_account_token(Path::new("/nonexistent/agile-flow-key.json"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::KeyFile { .. }));
  }

  #[tokio::test]
  async fn finds_existing_worksheet() {
    let server = MockServer::start().await;
    mount_sheets(
      &server,
      json!([
        {"properties": {"title": "Sheet1"}},
        {"properties": {"sheetId": 7, "title": "Throughput"}}
      ]),
    )
    .await;
    Mock::given(method("POST"))
      .and(path("/v4/spreadsheets/doc-1:batchUpdate"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .expect(0)
      .mount(&server)
      .await;

    let writer = writer(&server);
    let titles: Vec<_> = writer.worksheets().await.unwrap().into_iter().map(|s| s.title).collect();
    assert_eq!(titles, ["Sheet1", "Throughput"]);

    let sheet = writer.get_or_create_worksheet("Throughput").await.unwrap();
    assert_eq!(sheet.sheet_id, 7);
  }

  #[tokio::test]
  async fn creates_missing_worksheet() {
    let server = MockServer::start().await;
    mount_sheets(&server, json!([{"properties": {"title": "Sheet1"}}])).await;
    Mock::given(method("POST"))
      .and(path("/v4/spreadsheets/doc-1:batchUpdate"))
      .and(body_partial_json(json!({
        "requests": [{"addSheet": {"properties": {
          "title": "Throughput",
          "gridProperties": {"rowCount": 1, "columnCount": 1}
        }}}]
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "spreadsheetId": "doc-1",
        "replies": [{"addSheet": {"properties": {"sheetId": 99, "title": "Throughput"}}}]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let sheet = writer(&server).get_or_create_worksheet("Throughput").await.unwrap();
    assert_eq!(sheet.sheet_id, 99);
    assert_eq!(sheet.title, "Throughput");
  }

  #[tokio::test]
  async fn update_resizes_clears_then_writes() {
    let server = MockServer::start().await;
    mount_contents(&server).await;
    Mock::given(method("PUT"))
      .and(path_regex(r"^/v4/spreadsheets/doc-1/values/.*Throughput.*!A1$"))
      .and(query_param("valueInputOption", "USER_ENTERED"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedRows": 3})))
      .expect(1)
      .mount(&server)
      .await;

    writer(&server).update_sheet(&throughput_sheet(), &filled_report()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let calls: Vec<_> = requests.iter().map(|r| r.method.as_str().to_string()).collect();
    assert_eq!(calls, ["POST", "POST", "PUT"]);
    assert!(requests[0].url.path().ends_with(":batchUpdate"));
    assert!(requests[1].url.path().ends_with(":clear"));

    let resize: Value = requests[0].body_json().unwrap();
    let properties = &resize["requests"][0]["updateSheetProperties"]["properties"];
    assert_eq!(properties["sheetId"], json!(7));
    assert_eq!(properties["gridProperties"], json!({"rowCount": 3, "columnCount": 2}));

    let written: Value = requests[2].body_json().unwrap();
    assert_eq!(written["majorDimension"], json!("ROWS"));
    assert_eq!(written["values"], json!(values(&filled_report())));
  }

  #[tokio::test]
  async fn empty_report_only_clears() {
    let server = MockServer::start().await;
    mount_contents(&server).await;
    Mock::given(method("PUT"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .expect(0)
      .mount(&server)
      .await;

    writer(&server).update_sheet(&throughput_sheet(), &report(false)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let resize: Value = requests[0].body_json().unwrap();
    assert_eq!(
      resize["requests"][0]["updateSheetProperties"]["properties"]["gridProperties"],
      json!({"rowCount": 1, "columnCount": 1})
    );
  }

  #[tokio::test]
  async fn write_targets_the_named_worksheet() {
    let server = MockServer::start().await;
    mount_sheets(&server, json!([{"properties": {"sheetId": 7, "title": "Throughput"}}])).await;
    mount_contents(&server).await;
    Mock::given(method("PUT"))
      .and(path_regex(r"^/v4/spreadsheets/doc-1/values/.*Throughput.*!A1$"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .expect(1)
      .mount(&server)
      .await;

    writer(&server).write("Throughput", &filled_report()).await.unwrap();
  }

  #[tokio::test]
  async fn http_errors_surface() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
      .mount(&server)
      .await;

    let err = writer(&server).write("Throughput", &filled_report()).await.unwrap_err();
    assert!(matches!(err, Error::Http { status, .. } if status == StatusCode::FORBIDDEN));
  }
}
