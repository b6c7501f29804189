use crate::error::Res;
use crate::model::mapping::Mapping;
use crate::model::{Amount, Category};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The format dates are written to the worksheet in.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats that are accepted when reading dates back from the worksheet. Dates are read as
/// formatted by the spreadsheet, so the sheet's locale must render them as ISO or as Swiss
/// `DD.MM.YYYY`. Slash dates are rejected because `12/10/2025` means different days in different
/// locales.
const DATE_FORMATS: &[&str] = &[DATE_FORMAT, "%d.%m.%Y"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// The full record set as read from the worksheet, in storage order, along with its header row.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Records {
    mapping: Mapping,
    data: Vec<Record>,
}

impl Records {
    /// Parses worksheet rows. The first row must be the header row. An empty worksheet is an
    /// empty record set with the canonical header row.
    pub fn parse<S, R>(sheet_data: impl IntoIterator<Item = R>) -> Res<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let mut rows = sheet_data.into_iter();
        let mapping = match rows.next() {
            Some(header_row) => Mapping::new(header_row).context("Invalid header row")?,
            None => return Ok(Self::default()),
        };

        let len = mapping.len();
        let mut data = Vec::new();
        for (row_ix, row) in rows.enumerate() {
            // Row numbers as seen in the spreadsheet, the header being row 1
            let row_number = row_ix + 2;
            let values: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            if values.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            if values.len() > len {
                bail!("A row longer than the headers list was encountered at row {row_number}");
            }
            let record = Record::new_with_sheet_headers(mapping.headers(), values)
                .with_context(|| format!("Unable to parse row {row_number}"))?;
            data.push(record);
        }

        Ok(Self { mapping, data })
    }

    /// Creates a record set with the canonical header row.
    pub fn from_data(data: Vec<Record>) -> Self {
        Self {
            mapping: Mapping::default(),
            data,
        }
    }

    /// Renders the header row followed by one row per record, every row as wide as the header.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.data.len() + 1);
        rows.push(self.mapping.headers().to_vec());
        for record in &self.data {
            rows.push(
                self.mapping
                    .headers()
                    .iter()
                    .map(|header| record.get_with_header(header))
                    .collect(),
            );
        }
        rows
    }

    /// Appends a record at the end. The set is append-only.
    pub fn push(&mut self, record: Record) {
        self.data.push(record);
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One expense entry.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Record {
    user: String,
    date: NaiveDate,
    vehicle: String,
    category: Category,
    amount: Amount,
    note: String,
    /// Cells from columns this program does not know about, keyed by header.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    other_fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(
        user: impl Into<String>,
        date: NaiveDate,
        vehicle: impl Into<String>,
        category: Category,
        amount: Amount,
        note: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            date,
            vehicle: vehicle.into(),
            category,
            amount,
            note: note.into(),
            other_fields: BTreeMap::new(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn vehicle(&self) -> &str {
        &self.vehicle
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn other_fields(&self) -> &BTreeMap<String, String> {
        &self.other_fields
    }

    /// Builds a record from one worksheet row. Values are matched to `headers` by position;
    /// missing trailing values are treated as empty cells.
    pub fn new_with_sheet_headers<S1, S2, I>(headers: &[S1], values: I) -> Res<Self>
    where
        S1: AsRef<str>,
        S2: Into<String>,
        I: IntoIterator<Item = S2>,
    {
        let mut values: Vec<String> = values.into_iter().map(|s| s.into()).collect();
        if values.len() > headers.len() {
            bail!(
                "Received {} values for {} headers",
                values.len(),
                headers.len()
            );
        }
        values.resize(headers.len(), String::new());

        let mut cells: BTreeMap<RecordColumn, String> = BTreeMap::new();
        let mut other_fields = BTreeMap::new();
        for (header, value) in headers.iter().zip(values) {
            let header = header.as_ref();
            match RecordColumn::from_header(header) {
                Some(column) => {
                    let _ = cells.insert(column, value);
                }
                None => {
                    let _ = other_fields.insert(header.to_string(), value);
                }
            }
        }

        let mut cell = |column: RecordColumn| cells.remove(&column).unwrap_or_default();
        let date = parse_date(&cell(RecordColumn::Date))?;
        let category_str = cell(RecordColumn::Category);
        let category = Category::from_str(category_str.trim())
            .with_context(|| format!("Unknown category '{category_str}'"))?;
        let amount_str = cell(RecordColumn::Amount);
        let amount = Amount::from_str(&amount_str)
            .with_context(|| format!("Invalid amount '{amount_str}'"))?;

        Ok(Self {
            user: cell(RecordColumn::User),
            date,
            vehicle: cell(RecordColumn::Vehicle),
            category,
            amount,
            note: cell(RecordColumn::Note),
            other_fields,
        })
    }

    /// Returns the cell value, as it is written to the worksheet, for `header`.
    pub fn get_with_header(&self, header: &str) -> String {
        match RecordColumn::from_header(header) {
            Some(RecordColumn::User) => self.user.clone(),
            Some(RecordColumn::Date) => self.date.format(DATE_FORMAT).to_string(),
            Some(RecordColumn::Vehicle) => self.vehicle.clone(),
            Some(RecordColumn::Category) => self.category.to_string(),
            Some(RecordColumn::Amount) => self.amount.to_string(),
            Some(RecordColumn::Note) => self.note.clone(),
            None => self.other_fields.get(header).cloned().unwrap_or_default(),
        }
    }
}

/// Parses a date cell in any of the accepted formats.
fn parse_date(s: &str) -> Res<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        bail!("The date is missing");
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Ok(date);
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|f| chrono::NaiveDateTime::parse_from_str(s, f).ok())
        .map(|dt| dt.date())
        .with_context(|| format!("Unrecognized date '{s}'"))
}

/// The known columns of the worksheet. The serialized names are the persisted headers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum RecordColumn {
    #[serde(rename = "Nutzer")]
    User,
    #[serde(rename = "Datum")]
    Date,
    #[serde(rename = "Fahrzeug")]
    Vehicle,
    #[serde(rename = "Kategorie")]
    Category,
    #[serde(rename = "Betrag_CHF")]
    Amount,
    #[serde(rename = "Notiz")]
    Note,
}

serde_plain::derive_display_from_serialize!(RecordColumn);
serde_plain::derive_fromstr_from_deserialize!(RecordColumn);

impl RecordColumn {
    /// All known columns in canonical order.
    pub const ALL: [RecordColumn; 6] = [
        RecordColumn::User,
        RecordColumn::Date,
        RecordColumn::Vehicle,
        RecordColumn::Category,
        RecordColumn::Amount,
        RecordColumn::Note,
    ];

    pub fn from_header(header: impl AsRef<str>) -> Option<RecordColumn> {
        RecordColumn::from_str(header.as_ref()).ok()
    }
}
