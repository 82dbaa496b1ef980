use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Payroll,
    Contract,
    Other,
    /// Placeholder that keeps an otherwise empty folder alive
    FolderMarker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainDocument {
    pub id: String,
    pub user_id: String,
    pub kind: DocumentKind,
    pub file_name: String,
    pub file_url: String,
    pub month_year: Option<String>,
    pub folder: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub uploaded_by: String,
}

impl DomainDocument {
    pub fn is_folder_marker(&self) -> bool {
        self.kind == DocumentKind::FolderMarker
    }
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub file_name: String,
    pub file_url: String,
    pub month_year: Option<String>,
    pub folder: Option<String>,
    pub uploaded_by: String,
}
