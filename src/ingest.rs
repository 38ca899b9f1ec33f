//! # Row Ingest
//!
//! Pure transformation of spreadsheet rows into typed canonical records.
//!
//! ## Overview
//!
//! An external spreadsheet-parsing collaborator hands this module an ordered
//! header row plus ordered data rows. Headers are resolved against a fixed
//! alias table with case-insensitive substring matching, and each data row is
//! turned into a [`CanonicalRow`]: a fixed set of named optional fields plus
//! the verbatim header-to-value snapshot kept only as an opaque archival
//! payload. Downstream components never re-parse headers.
//!
//! Rows are not guaranteed to match the header width; absent columns resolve
//! to `None`, never to a sentinel index.

use serde_json::{Map, Value};

/// Canonical employee fields recognized in imported sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    FullName,
    EmployeeId,
    BloodGroup,
    Branch,
    EmergencyContact,
    Photo,
    Email,
}

impl CanonicalField {
    /// Header aliases for this field, matched case-insensitively as substrings
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::FullName => &["full name"],
            Self::EmployeeId => &["employee id", "employeeid", "emp id", "id"],
            Self::BloodGroup => &["blood group"],
            Self::Branch => &["branch", "location"],
            Self::EmergencyContact => &["emergency contact", "emergency no"],
            Self::Photo => &["photo (upload)", "image", "photo"],
            Self::Email => &["email address", "email"],
        }
    }
}

/// Photo-column aliases in preference order: an upload column beats a
/// generic image column beats a bare photo column.
const PHOTO_PREFERENCE: &[&str] = &["photo (upload)", "image", "photo"];

/// An in-memory asset handed over by the spreadsheet parser
#[derive(Debug, Clone, PartialEq)]
pub struct InlineAsset {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// A single sheet cell: plain text or an inline asset
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Asset(InlineAsset),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Asset(_) => None,
        }
    }

    /// Text form used in the archival snapshot before any asset rewrite
    pub fn snapshot_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Asset(asset) => asset
                .file_name
                .clone()
                .unwrap_or_else(|| "[inline asset]".to_string()),
        }
    }
}

/// Reference to a card asset: either a durable URL or bytes pending upload
#[derive(Debug, Clone, PartialEq)]
pub enum AssetRef {
    Url(String),
    Inline(InlineAsset),
}

impl AssetRef {
    /// The durable URL, when this reference already has one
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Inline(_) => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }
}

/// Resolved column positions for one header set.
///
/// Absent columns are `None`; a `None` must never be used as an array
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    pub full_name: Option<usize>,
    pub employee_id: Option<usize>,
    pub blood_group: Option<usize>,
    pub branch: Option<usize>,
    pub emergency_contact: Option<usize>,
    pub photo: Option<usize>,
    pub email: Option<usize>,
}

impl HeaderIndex {
    /// Resolve a header set against the alias table.
    ///
    /// For every field except the photo, the first header in data order that
    /// matches any alias wins. The photo column instead follows the fixed
    /// preference order in [`PHOTO_PREFERENCE`].
    pub fn resolve(headers: &[String]) -> Self {
        Self {
            full_name: first_matching(headers, CanonicalField::FullName.aliases()),
            employee_id: first_matching(headers, CanonicalField::EmployeeId.aliases()),
            blood_group: first_matching(headers, CanonicalField::BloodGroup.aliases()),
            branch: first_matching(headers, CanonicalField::Branch.aliases()),
            emergency_contact: first_matching(headers, CanonicalField::EmergencyContact.aliases()),
            photo: resolve_photo_column(headers),
            email: first_matching(headers, CanonicalField::Email.aliases()),
        }
    }
}

/// First header (in data order) containing any of the aliases
fn first_matching(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let normalized = header.to_lowercase();
        aliases.iter().any(|alias| normalized.contains(alias))
    })
}

/// Photo column resolution honors alias preference over data order
fn resolve_photo_column(headers: &[String]) -> Option<usize> {
    PHOTO_PREFERENCE.iter().find_map(|alias| {
        headers
            .iter()
            .position(|header| header.to_lowercase().contains(alias))
    })
}

/// Typed canonical record produced once at ingest
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRow {
    pub full_name: Option<String>,
    pub employee_code: Option<String>,
    pub blood_group: Option<String>,
    pub branch: Option<String>,
    pub emergency_contact: Option<String>,
    pub email: Option<String>,
    pub photo: Option<AssetRef>,
    /// Verbatim header of the photo column, kept so an uploaded photo URL
    /// can be written back into the snapshot
    pub photo_header: Option<String>,
    /// Verbatim header-to-value snapshot, opaque archival payload
    pub snapshot: Map<String, Value>,
}

impl CanonicalRow {
    /// The employee-facing snapshot shape dispatched to vendors
    pub fn employee_details(&self) -> Value {
        serde_json::json!({
            "fullName": self.full_name,
            "employeeId": self.employee_code,
            "bloodGroup": self.blood_group,
            "branch": self.branch,
            "emergencyContact": self.emergency_contact,
            "email": self.email,
            "photo": self.photo.as_ref().and_then(|p| p.url()),
        })
    }

    /// Rehydrate a canonical row from a persisted card snapshot.
    ///
    /// The snapshot's keys are the verbatim headers the row was imported
    /// with; alias resolution happens once more here at the persistence
    /// boundary and nowhere further downstream.
    pub fn from_snapshot(snapshot: &Map<String, Value>) -> CanonicalRow {
        let headers: Vec<String> = snapshot.keys().cloned().collect();
        let row: Vec<CellValue> = snapshot
            .values()
            .map(|value| CellValue::Text(value.as_str().unwrap_or_default().to_string()))
            .collect();
        let index = HeaderIndex::resolve(&headers);
        canonicalize(&headers, &index, &row)
    }
}

/// An imported sheet: ordered headers plus ordered rows
#[derive(Debug, Clone, Default)]
pub struct SheetImport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetImport {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    /// Produce one canonical row per data row. Pure; no side effects.
    pub fn canonical_rows(&self) -> Vec<CanonicalRow> {
        let index = HeaderIndex::resolve(&self.headers);
        self.rows
            .iter()
            .map(|row| canonicalize(&self.headers, &index, row))
            .collect()
    }
}

fn text_at(row: &[CellValue], position: Option<usize>) -> Option<String> {
    let cell = position.and_then(|i| row.get(i))?;
    let text = cell.as_text()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn photo_at(row: &[CellValue], position: Option<usize>) -> Option<AssetRef> {
    match position.and_then(|i| row.get(i))? {
        CellValue::Asset(asset) => Some(AssetRef::Inline(asset.clone())),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(AssetRef::Url(trimmed.to_string()))
            }
        }
    }
}

fn canonicalize(headers: &[String], index: &HeaderIndex, row: &[CellValue]) -> CanonicalRow {
    let mut snapshot = Map::new();
    for (position, header) in headers.iter().enumerate() {
        let text = row
            .get(position)
            .map(CellValue::snapshot_text)
            .unwrap_or_default();
        snapshot.insert(header.clone(), Value::String(text));
    }

    CanonicalRow {
        full_name: text_at(row, index.full_name),
        employee_code: text_at(row, index.employee_id),
        blood_group: text_at(row, index.blood_group),
        branch: text_at(row, index.branch),
        emergency_contact: text_at(row, index.emergency_contact),
        email: text_at(row, index.email),
        photo: photo_at(row, index.photo),
        photo_header: index.photo.and_then(|i| headers.get(i)).cloned(),
        snapshot,
    }
}
