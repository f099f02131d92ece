//! # Documents API
//!
//! The student side uploads into their active enrollment's registry; the
//! manager side accepts. Acceptance of the final missing type is the one
//! and only event that advances an enrollment to `pending_approval`, and it
//! commits atomically with the registry mutation under the enrollment's
//! `try_update` closure.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use autoecole_core::{DocumentId, DocumentType, EnrollmentId};
use autoecole_enrollment::{Document, EnrollmentStatus, TransitionEvidence};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Public view of an uploaded document.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentView {
    #[schema(value_type = String)]
    pub id: DocumentId,
    #[schema(value_type = String)]
    pub document_type: DocumentType,
    pub file_name: String,
    pub accepted: bool,
    pub uploaded_at: String,
}

impl From<&Document> for DocumentView {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            document_type: doc.document_type,
            file_name: doc.file_name.clone(),
            accepted: doc.accepted,
            uploaded_at: doc.uploaded_at.to_rfc3339(),
        }
    }
}

/// Student document listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentView>,
    #[schema(value_type = Vec<String>)]
    pub required_documents: Vec<DocumentType>,
    /// Required types that do not yet have an accepted upload.
    #[schema(value_type = Vec<String>)]
    pub missing_documents: Vec<DocumentType>,
}

/// Upload request. The file body itself goes to the file store collaborator;
/// the workflow only needs the type and display name.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadDocumentRequest {
    #[schema(value_type = String)]
    pub document_type: DocumentType,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Validate for UploadDocumentRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.file_name {
            if name.len() > 255 {
                return Err("file_name must not exceed 255 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Upload response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadDocumentResponse {
    pub document: DocumentView,
    #[schema(value_type = String)]
    pub enrollment_status: EnrollmentStatus,
}

/// Acceptance response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AcceptDocumentResponse {
    /// Whether every required type now has an accepted document.
    pub documents_complete: bool,
    #[schema(value_type = String)]
    pub enrollment_status: EnrollmentStatus,
}

/// Build the documents router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/documents", get(list_documents))
        .route("/api/documents/upload", post(upload_document))
        .route("/api/documents/accept/:id", post(accept_document))
}

/// GET /api/documents — The caller's documents and what is still missing.
///
/// Reads the most recent enrollment's registry. Before any enrollment
/// exists the listing is empty with the full required set missing, so the
/// client can render the checklist either way.
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Document listing", body = DocumentsResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub(crate) async fn list_documents(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<DocumentsResponse> {
    match state.enrollments_of(user.id).into_iter().next() {
        Some(record) => Json(DocumentsResponse {
            documents: record.documents.documents().iter().map(DocumentView::from).collect(),
            required_documents: record.documents.list_required().to_vec(),
            missing_documents: record.documents.missing_types(),
        }),
        None => Json(DocumentsResponse {
            documents: Vec::new(),
            required_documents: autoecole_core::REQUIRED_DOCUMENTS.to_vec(),
            missing_documents: autoecole_core::REQUIRED_DOCUMENTS.to_vec(),
        }),
    }
}

/// POST /api/documents/upload — Upload a document into the active enrollment.
///
/// Uploading never changes the enrollment status; the response carries the
/// status so clients can observe exactly that.
#[utoipa::path(
    post,
    path = "/api/documents/upload",
    request_body = UploadDocumentRequest,
    responses(
        (status = 201, description = "Document recorded", body = UploadDocumentResponse),
        (status = 409, description = "No active enrollment", body = crate::error::ErrorBody),
        (status = 422, description = "Document type not required", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub(crate) async fn upload_document(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<UploadDocumentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UploadDocumentResponse>), AppError> {
    let req = extract_validated_json(body)?;

    let record = state.active_enrollment_of(user.id).ok_or_else(|| {
        AppError::Conflict("no active enrollment to attach documents to".to_string())
    })?;
    let enrollment_id = record.enrollment.id;

    let file_name = req
        .file_name
        .unwrap_or_else(|| format!("{}.jpg", req.document_type));

    let (document, status) = state
        .enrollments
        .try_update(&enrollment_id, |rec| {
            let doc = rec.documents.upload(user.id, req.document_type, file_name.clone())?;
            Ok::<_, AppError>((doc, rec.enrollment.status))
        })
        .ok_or_else(|| AppError::NotFound(format!("enrollment {enrollment_id} not found")))??;

    tracing::info!(%enrollment_id, document_type = %req.document_type, "document uploaded");
    Ok((
        StatusCode::CREATED,
        Json(UploadDocumentResponse {
            document: DocumentView::from(&document),
            enrollment_status: status,
        }),
    ))
}

/// POST /api/documents/accept/:id — Manager accepts a document.
///
/// Idempotent on an already-accepted document. When this acceptance
/// completes the required set, the enrollment advances to
/// `pending_approval` in the same atomic update.
#[utoipa::path(
    post,
    path = "/api/documents/accept/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document accepted", body = AcceptDocumentResponse),
        (status = 403, description = "Not the managing school's manager", body = crate::error::ErrorBody),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub(crate) async fn accept_document(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AcceptDocumentResponse>, AppError> {
    current_user.require_manager()?;
    let manager = &current_user.0;
    let document_id = DocumentId::from_uuid(id);

    // Locate the enrollment holding this document.
    let enrollment_id: EnrollmentId = state
        .enrollments
        .list()
        .into_iter()
        .find(|r| r.documents.get(document_id).is_some())
        .map(|r| r.enrollment.id)
        .ok_or_else(|| AppError::NotFound(format!("document {document_id} not found")))?;

    let manager_id = manager.id;
    let result = state
        .enrollments
        .try_update(&enrollment_id, |rec| {
            if !state.user_manages_school(manager_id, rec.enrollment.school_id) {
                return Err(AppError::Forbidden(
                    "not the manager of this enrollment's school".to_string(),
                ));
            }

            let outcome = rec.documents.accept(document_id)?;

            // The completeness event fires here and only here. A re-accept
            // on an already complete registry leaves a non-pending status
            // untouched.
            if outcome.all_required_accepted
                && rec.enrollment.status == EnrollmentStatus::PendingDocuments
            {
                rec.enrollment.mark_documents_complete(TransitionEvidence::by(
                    manager_id,
                    "all required documents accepted",
                ))?;
            }

            Ok::<_, AppError>((outcome, rec.enrollment.status))
        })
        .ok_or_else(|| AppError::NotFound(format!("enrollment {enrollment_id} not found")))?;

    let (outcome, status) = result?;
    tracing::info!(
        %enrollment_id,
        %document_id,
        documents_complete = outcome.all_required_accepted,
        "document accepted"
    );

    Ok(Json(AcceptDocumentResponse {
        documents_complete: outcome.all_required_accepted,
        enrollment_status: status,
    }))
}
