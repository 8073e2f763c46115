//! Serde shapes for the parts of the Sheets v4 API the writer touches.

use serde::Deserialize;

/// `GET /v4/spreadsheets/{id}?fields=sheets.properties`
#[derive(Debug, Clone, Deserialize)]
pub struct Spreadsheet {
  #[serde(default)]
  pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
  pub properties: SheetProperties,
}

/// A worksheet's identity and grid size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
  /// The API leaves out zero values, so the first sheet has no `sheetId`.
  #[serde(default)]
  pub sheet_id:        i64,
  pub title:           String,
  #[serde(default)]
  pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
  #[serde(default)]
  pub row_count:    usize,
  #[serde(default)]
  pub column_count: usize,
}

/// `POST /v4/spreadsheets/{id}:batchUpdate`; one reply per request, empty
/// for requests that return nothing.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchUpdateResponse {
  #[serde(default)]
  pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
  #[serde(default)]
  pub add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddSheetReply {
  pub properties: SheetProperties,
}
