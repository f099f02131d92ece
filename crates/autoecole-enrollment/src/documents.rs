//! # Document Registry
//!
//! Per-enrollment tracking of required document types and their acceptance
//! state. The registry is the single source of truth for the completeness
//! verdict that drives the `PendingDocuments -> PendingApproval` transition.
//!
//! Two rules shape this module:
//!
//! - Uploading a document records it with `accepted = false` and has no
//!   effect on the enrollment status. Only a manager's acceptance can
//!   complete the set.
//! - With multiple uploads of the same type, any accepted upload satisfies
//!   that type; the most recently accepted one is the authoritative copy
//!   returned by [`DocumentRegistry::accepted_document`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use autoecole_core::{DocumentId, DocumentType, Timestamp, UserId};

// ─── Document ────────────────────────────────────────────────────────

/// An uploaded document. Content is held by the file store collaborator;
/// the registry only keeps the metadata the workflow decisions need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier.
    pub id: DocumentId,
    /// The uploading user.
    pub owner_id: UserId,
    /// Which required slot this upload is for.
    pub document_type: DocumentType,
    /// Client-provided file name, for display only.
    pub file_name: String,
    /// Whether a manager has accepted this upload.
    pub accepted: bool,
    /// When the document was uploaded.
    pub uploaded_at: Timestamp,
    /// When the document was accepted, if it was.
    pub accepted_at: Option<Timestamp>,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from document registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The uploaded type is not in this enrollment's required set.
    #[error("document type {document_type} is not required for this enrollment")]
    NotRequired {
        /// The offending type.
        document_type: DocumentType,
    },

    /// No document with this id exists in the registry.
    #[error("document {id} not found")]
    NotFound {
        /// The missing id.
        id: DocumentId,
    },
}

// ─── Accept outcome ──────────────────────────────────────────────────

/// Result of accepting a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptOutcome {
    /// False when the document had already been accepted (idempotent call).
    pub newly_accepted: bool,
    /// Whether every required type now has an accepted document.
    pub all_required_accepted: bool,
}

// ─── Registry ────────────────────────────────────────────────────────

/// The documents of a single enrollment and its fixed required set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRegistry {
    required: Vec<DocumentType>,
    documents: Vec<Document>,
}

impl DocumentRegistry {
    /// Create a registry with the given required set, fixed for the
    /// enrollment's lifetime.
    pub fn new(required: &[DocumentType]) -> Self {
        Self {
            required: required.to_vec(),
            documents: Vec::new(),
        }
    }

    /// Record an upload in `accepted = false` state.
    ///
    /// Re-uploading a type that already has documents (accepted or not) is
    /// allowed; the new upload simply joins the pool for that type.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRequired`] when the type is not in the required set.
    pub fn upload(
        &mut self,
        owner_id: UserId,
        document_type: DocumentType,
        file_name: impl Into<String>,
    ) -> Result<Document, RegistryError> {
        if !self.required.contains(&document_type) {
            return Err(RegistryError::NotRequired { document_type });
        }
        let document = Document {
            id: DocumentId::new(),
            owner_id,
            document_type,
            file_name: file_name.into(),
            accepted: false,
            uploaded_at: Timestamp::now(),
            accepted_at: None,
        };
        self.documents.push(document.clone());
        Ok(document)
    }

    /// Accept a document. Idempotent on an already-accepted document.
    ///
    /// The returned outcome reports whether this call completed the required
    /// set, which is the caller's cue to advance the enrollment.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] when no document has this id.
    pub fn accept(&mut self, id: DocumentId) -> Result<AcceptOutcome, RegistryError> {
        let doc = self
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(RegistryError::NotFound { id })?;

        let newly_accepted = !doc.accepted;
        if newly_accepted {
            doc.accepted = true;
            doc.accepted_at = Some(Timestamp::now());
        }

        Ok(AcceptOutcome {
            newly_accepted,
            all_required_accepted: self.is_complete(),
        })
    }

    /// Look up a document by id.
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// All documents, in upload order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The fixed required set.
    pub fn list_required(&self) -> &[DocumentType] {
        &self.required
    }

    /// The authoritative accepted document for a type: the most recently
    /// accepted upload, if any.
    pub fn accepted_document(&self, document_type: DocumentType) -> Option<&Document> {
        self.documents
            .iter()
            .filter(|d| d.document_type == document_type && d.accepted)
            .max_by_key(|d| d.accepted_at)
    }

    /// Required types that do not yet have an accepted document.
    pub fn missing_types(&self) -> Vec<DocumentType> {
        self.required
            .iter()
            .copied()
            .filter(|t| self.accepted_document(*t).is_none())
            .collect()
    }

    /// Whether every required type has at least one accepted document.
    pub fn is_complete(&self) -> bool {
        self.missing_types().is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use autoecole_core::REQUIRED_DOCUMENTS;

    fn make_registry() -> DocumentRegistry {
        DocumentRegistry::new(REQUIRED_DOCUMENTS)
    }

    fn owner() -> UserId {
        UserId::new()
    }

    // ── Upload tests ─────────────────────────────────────────────────

    #[test]
    fn upload_records_unaccepted_document() {
        let mut reg = make_registry();
        let doc = reg
            .upload(owner(), DocumentType::IdCard, "id_card.jpg")
            .unwrap();
        assert!(!doc.accepted);
        assert!(doc.accepted_at.is_none());
        assert_eq!(reg.documents().len(), 1);
    }

    #[test]
    fn upload_alone_never_completes() {
        let mut reg = make_registry();
        for t in REQUIRED_DOCUMENTS {
            reg.upload(owner(), *t, format!("{t}.jpg")).unwrap();
        }
        assert!(!reg.is_complete());
        assert_eq!(reg.missing_types().len(), REQUIRED_DOCUMENTS.len());
    }

    #[test]
    fn upload_restricted_to_required_set() {
        let mut reg = DocumentRegistry::new(&[DocumentType::IdCard]);
        let err = reg
            .upload(owner(), DocumentType::MedicalCertificate, "med.pdf")
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotRequired {
                document_type: DocumentType::MedicalCertificate,
            }
        );
        assert!(reg.documents().is_empty());
    }

    #[test]
    fn reupload_of_same_type_is_allowed() {
        let mut reg = make_registry();
        reg.upload(owner(), DocumentType::IdCard, "first.jpg").unwrap();
        reg.upload(owner(), DocumentType::IdCard, "second.jpg").unwrap();
        assert_eq!(reg.documents().len(), 2);
    }

    // ── Accept tests ─────────────────────────────────────────────────

    #[test]
    fn accept_unknown_document_fails() {
        let mut reg = make_registry();
        let id = DocumentId::new();
        assert_eq!(reg.accept(id).unwrap_err(), RegistryError::NotFound { id });
    }

    #[test]
    fn accept_marks_document() {
        let mut reg = make_registry();
        let doc = reg
            .upload(owner(), DocumentType::ProfilePhoto, "me.jpg")
            .unwrap();
        let outcome = reg.accept(doc.id).unwrap();
        assert!(outcome.newly_accepted);
        assert!(!outcome.all_required_accepted);
        assert!(reg.get(doc.id).unwrap().accepted);
    }

    #[test]
    fn accept_is_idempotent() {
        let mut reg = make_registry();
        let doc = reg
            .upload(owner(), DocumentType::ProfilePhoto, "me.jpg")
            .unwrap();
        reg.accept(doc.id).unwrap();
        let again = reg.accept(doc.id).unwrap();
        assert!(!again.newly_accepted);
    }

    #[test]
    fn three_of_four_accepted_is_not_complete() {
        let mut reg = make_registry();
        let user = owner();
        for t in &REQUIRED_DOCUMENTS[..3] {
            let doc = reg.upload(user, *t, format!("{t}.jpg")).unwrap();
            let outcome = reg.accept(doc.id).unwrap();
            assert!(!outcome.all_required_accepted);
        }
        assert!(!reg.is_complete());
        assert_eq!(reg.missing_types(), vec![REQUIRED_DOCUMENTS[3]]);
    }

    #[test]
    fn final_acceptance_completes_the_set() {
        let mut reg = make_registry();
        let user = owner();
        let mut last_outcome = None;
        for t in REQUIRED_DOCUMENTS {
            let doc = reg.upload(user, *t, format!("{t}.jpg")).unwrap();
            last_outcome = Some(reg.accept(doc.id).unwrap());
        }
        assert!(last_outcome.unwrap().all_required_accepted);
        assert!(reg.is_complete());
        assert!(reg.missing_types().is_empty());
    }

    #[test]
    fn latest_accepted_upload_is_authoritative() {
        let mut reg = make_registry();
        let user = owner();
        let first = reg.upload(user, DocumentType::IdCard, "first.jpg").unwrap();
        let second = reg
            .upload(user, DocumentType::IdCard, "second.jpg")
            .unwrap();
        reg.accept(first.id).unwrap();
        reg.accept(second.id).unwrap();
        // Both accepted in the same second is possible; the later upload wins
        // ties through its position in max_by_key's scan order.
        let authoritative = reg.accepted_document(DocumentType::IdCard).unwrap();
        assert_eq!(authoritative.id, second.id);
    }

    #[test]
    fn accepting_one_type_twice_does_not_complete() {
        let mut reg = make_registry();
        let user = owner();
        let a = reg.upload(user, DocumentType::IdCard, "a.jpg").unwrap();
        let b = reg.upload(user, DocumentType::IdCard, "b.jpg").unwrap();
        reg.accept(a.id).unwrap();
        let outcome = reg.accept(b.id).unwrap();
        assert!(!outcome.all_required_accepted);
    }

    // ── Property: completeness is exactly per-type acceptance ────────

    use proptest::prelude::*;

    fn doc_type_strategy() -> impl Strategy<Value = DocumentType> {
        prop_oneof![
            Just(DocumentType::ProfilePhoto),
            Just(DocumentType::IdCard),
            Just(DocumentType::MedicalCertificate),
            Just(DocumentType::ResidenceCertificate),
        ]
    }

    proptest! {
        /// For any interleaving of uploads and acceptances, the registry is
        /// complete exactly when every required type has an accepted upload.
        #[test]
        fn completeness_matches_per_type_acceptance(
            ops in proptest::collection::vec((doc_type_strategy(), any::<bool>()), 0..32)
        ) {
            let mut reg = make_registry();
            let user = UserId::new();
            let mut accepted_types = std::collections::BTreeSet::new();

            for (doc_type, accept) in ops {
                let doc = reg.upload(user, doc_type, "f.jpg").unwrap();
                if accept {
                    reg.accept(doc.id).unwrap();
                    accepted_types.insert(doc_type);
                }
            }

            let expected = REQUIRED_DOCUMENTS
                .iter()
                .all(|t| accepted_types.contains(t));
            prop_assert_eq!(reg.is_complete(), expected);
        }
    }
}
