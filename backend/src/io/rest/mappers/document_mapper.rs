use shared::{Document, DocumentType};

use crate::domain::models::document::{DocumentKind, DomainDocument};

pub struct DocumentMapper;

impl DocumentMapper {
    pub fn kind_to_domain(document_type: DocumentType) -> DocumentKind {
        match document_type {
            DocumentType::Payroll => DocumentKind::Payroll,
            DocumentType::Contract => DocumentKind::Contract,
            DocumentType::Other => DocumentKind::Other,
        }
    }

    /// Folder markers never reach the API; map them to `Other` if one does
    pub fn kind_to_dto(kind: DocumentKind) -> DocumentType {
        match kind {
            DocumentKind::Payroll => DocumentType::Payroll,
            DocumentKind::Contract => DocumentType::Contract,
            DocumentKind::Other | DocumentKind::FolderMarker => DocumentType::Other,
        }
    }

    pub fn to_dto(document: DomainDocument) -> Document {
        Document {
            id: document.id,
            user_id: document.user_id,
            document_type: Self::kind_to_dto(document.kind),
            file_name: document.file_name,
            file_url: document.file_url,
            month_year: document.month_year,
            folder: document.folder,
            upload_date: document.upload_date,
            uploaded_by: document.uploaded_by,
        }
    }

    pub fn to_dto_list(documents: Vec<DomainDocument>) -> Vec<Document> {
        documents.into_iter().map(Self::to_dto).collect()
    }
}
