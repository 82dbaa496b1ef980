use log::info;
use std::collections::BTreeSet;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::document::{DocumentKind, DomainDocument, NewDocument};
use crate::domain::session::Session;
use crate::storage::{DocumentRepository, UserRepository};

/// File name given to folder marker documents
pub const FOLDER_MARKER_NAME: &str = ".folder";

#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub kind: DocumentKind,
    pub file_name: String,
    pub file_url: String,
    pub month_year: Option<String>,
    pub folder: Option<String>,
}

/// Documents of one folder plus the folders that exist for the user
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentListing {
    pub documents: Vec<DomainDocument>,
    pub folders: Vec<String>,
}

fn normalize_folder(folder: Option<String>) -> Option<String> {
    folder
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

fn valid_month_year(value: &str) -> bool {
    let Some((year, month)) = value.split_once('-') else {
        return false;
    };
    year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && matches!(month.parse::<u32>(), Ok(1..=12))
        && month.len() == 2
}

/// Service for per-employee document metadata
#[derive(Clone)]
pub struct DocumentService {
    documents: DocumentRepository,
    users: UserRepository,
}

impl DocumentService {
    pub fn new(documents: DocumentRepository, users: UserRepository) -> Self {
        Self { documents, users }
    }

    fn require_user(&self, user_id: &str) -> DomainResult<()> {
        match self.users.get_user(user_id)? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("User", user_id)),
        }
    }

    pub fn upload(&self, session: &Session, user_id: &str, upload: DocumentUpload) -> DomainResult<DomainDocument> {
        session.require_admin()?;
        self.require_user(user_id)?;
        info!("Uploading document {} for {}", upload.file_name, user_id);

        let file_name = upload.file_name.trim();
        if file_name.is_empty() {
            return Err(DomainError::validation("File name cannot be empty"));
        }
        if upload.kind == DocumentKind::FolderMarker {
            return Err(DomainError::validation("Use folder creation for folders"));
        }
        let month_year = upload
            .month_year
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if let Some(value) = &month_year {
            if !valid_month_year(value) {
                return Err(DomainError::validation(format!(
                    "Period '{}' must be in YYYY-MM format",
                    value
                )));
            }
        }

        let document = self.documents.create_document(
            user_id,
            &NewDocument {
                kind: upload.kind,
                file_name: file_name.to_string(),
                file_url: upload.file_url.trim().to_string(),
                month_year,
                folder: normalize_folder(upload.folder),
                uploaded_by: session.user_id.clone(),
            },
        )?;
        Ok(document)
    }

    /// Materialise an empty folder with a marker document
    pub fn create_folder(&self, session: &Session, user_id: &str, name: &str) -> DomainResult<Vec<String>> {
        session.require_admin()?;
        self.require_user(user_id)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Folder name cannot be empty"));
        }
        if name.contains('/') {
            return Err(DomainError::validation("Folder name cannot contain '/'"));
        }

        let folders = self.folder_names(user_id)?;
        if folders.iter().any(|existing| existing == name) {
            return Err(DomainError::Conflict(format!("Folder '{}' already exists", name)));
        }

        self.documents.create_document(
            user_id,
            &NewDocument {
                kind: DocumentKind::FolderMarker,
                file_name: FOLDER_MARKER_NAME.to_string(),
                file_url: String::new(),
                month_year: None,
                folder: Some(name.to_string()),
                uploaded_by: session.user_id.clone(),
            },
        )?;
        info!("Created folder '{}' for {}", name, user_id);
        self.folder_names(user_id)
    }

    /// Documents in `folder`, or those outside any folder when `None`.
    /// Folder markers are never listed.
    pub fn list_documents(
        &self,
        session: &Session,
        user_id: &str,
        folder: Option<String>,
    ) -> DomainResult<DocumentListing> {
        session.require_self_or_admin(user_id)?;

        let folder = normalize_folder(folder);
        let all = self.documents.list_documents(user_id)?;
        let folders = Self::collect_folders(&all);

        let documents = all
            .into_iter()
            .filter(|document| !document.is_folder_marker())
            .filter(|document| document.folder == folder)
            .collect();

        Ok(DocumentListing { documents, folders })
    }

    pub fn list_folders(&self, session: &Session, user_id: &str) -> DomainResult<Vec<String>> {
        session.require_self_or_admin(user_id)?;
        self.folder_names(user_id)
    }

    fn folder_names(&self, user_id: &str) -> DomainResult<Vec<String>> {
        Ok(Self::collect_folders(&self.documents.list_documents(user_id)?))
    }

    fn collect_folders(documents: &[DomainDocument]) -> Vec<String> {
        documents
            .iter()
            .filter_map(|document| document.folder.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn delete(&self, session: &Session, user_id: &str, document_id: &str) -> DomainResult<DomainDocument> {
        session.require_admin()?;

        let document = self
            .documents
            .get_document(user_id, document_id)?
            .ok_or_else(|| DomainError::not_found("Document", document_id))?;
        self.documents.delete_document(user_id, document_id)?;

        info!("Deleted document {} ({}) of {}", document.id, document.file_name, user_id);
        Ok(document)
    }
}
