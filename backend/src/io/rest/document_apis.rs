//! # REST API for employee documents

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use tracing::{info, warn};

use crate::domain::document_service::DocumentUpload;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::DocumentMapper;
use crate::io::rest::session::CurrentSession;
use crate::AppState;
use shared::{
    CreateFolderRequest, DeleteDocumentResponse, DocumentListQuery, DocumentListResponse,
    FolderListResponse, UploadDocumentRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:user_id", get(list_documents).post(upload_document))
        .route("/:user_id/folders", get(list_folders).post(create_folder))
        .route("/:user_id/:id", delete(delete_document))
}

pub async fn list_documents(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(user_id): Path<String>,
    Query(query): Query<DocumentListQuery>,
) -> impl IntoResponse {
    info!("GET /api/documents/{} - folder: {:?}", user_id, query.folder);

    match state
        .document_service
        .list_documents(&session, &user_id, query.folder)
    {
        Ok(listing) => {
            let response = DocumentListResponse {
                documents: DocumentMapper::to_dto_list(listing.documents),
                folders: listing.folders,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn upload_document(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(user_id): Path<String>,
    Json(request): Json<UploadDocumentRequest>,
) -> impl IntoResponse {
    info!("POST /api/documents/{} - file: {}", user_id, request.file_name);

    let upload = DocumentUpload {
        kind: DocumentMapper::kind_to_domain(request.document_type),
        file_name: request.file_name,
        file_url: request.file_url,
        month_year: request.month_year,
        folder: request.folder,
    };

    match state.document_service.upload(&session, &user_id, upload) {
        Ok(document) => (StatusCode::CREATED, Json(DocumentMapper::to_dto(document))).into_response(),
        Err(e) => {
            warn!("Document upload rejected: {}", e);
            ApiError(e).into_response()
        }
    }
}

pub async fn list_folders(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match state.document_service.list_folders(&session, &user_id) {
        Ok(folders) => (StatusCode::OK, Json(FolderListResponse { folders })).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn create_folder(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(user_id): Path<String>,
    Json(request): Json<CreateFolderRequest>,
) -> impl IntoResponse {
    info!("POST /api/documents/{}/folders - name: {}", user_id, request.name);

    match state
        .document_service
        .create_folder(&session, &user_id, &request.name)
    {
        Ok(folders) => (StatusCode::CREATED, Json(FolderListResponse { folders })).into_response(),
        Err(e) => {
            warn!("Folder creation rejected: {}", e);
            ApiError(e).into_response()
        }
    }
}

pub async fn delete_document(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((user_id, id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/documents/{}/{}", user_id, id);

    match state.document_service.delete(&session, &user_id, &id) {
        Ok(document) => {
            let response = DeleteDocumentResponse {
                success_message: format!("Document {} deleted", document.file_name),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}
