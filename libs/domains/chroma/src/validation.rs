//! Structural checks on add/update/upsert batches.
//!
//! Every check runs before any network I/O. Embeddings are generated only once
//! the batch is known to be well formed.

use std::collections::{HashMap, HashSet};

use crate::embedding::{EmbeddingProvider, generate_embeddings};
use crate::error::{BatchField, ChromaError, ChromaResult, FieldLength};
use crate::models::{Embedding, Metadata};

/// Items submitted to a mutation call. Optional fields, when present, hold one
/// entry per id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub ids: Vec<String>,
    pub embeddings: Option<Vec<Embedding>>,
    pub metadatas: Option<Vec<Metadata>>,
    pub documents: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

impl Batch {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_embeddings(mut self, embeddings: Vec<Embedding>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn with_metadatas(mut self, metadatas: Vec<Metadata>) -> Self {
        self.metadatas = Some(metadatas);
        self
    }

    pub fn with_documents<I, S>(mut self, documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents = Some(documents.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = Some(images.into_iter().map(Into::into).collect());
        self
    }
}

/// A batch that passed validation. `embeddings` is always populated and
/// images, being only an embedding source, are gone.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBatch {
    pub ids: Vec<String>,
    pub embeddings: Vec<Embedding>,
    pub metadatas: Option<Vec<Metadata>>,
    pub documents: Option<Vec<String>>,
}

/// Validate `batch` and fill in its embeddings.
///
/// `require_content` is set for add and upsert, where a batch carrying only ids
/// and metadata is meaningless.
pub async fn validate(
    batch: Batch,
    provider: Option<&dyn EmbeddingProvider>,
    require_content: bool,
) -> ChromaResult<ValidatedBatch> {
    check_structure(&batch, require_content)?;

    let embeddings = match batch.embeddings {
        Some(embeddings) => embeddings,
        None => {
            let provider = provider.ok_or(ChromaError::MissingEmbeddingFunction)?;
            let source = batch
                .documents
                .as_ref()
                .or(batch.images.as_ref())
                .ok_or(ChromaError::MissingSourceContent)?;

            generate_embeddings(provider, source).await?
        }
    };

    Ok(ValidatedBatch {
        ids: batch.ids,
        embeddings,
        metadatas: batch.metadatas,
        documents: batch.documents,
    })
}

fn check_structure(batch: &Batch, require_content: bool) -> ChromaResult<()> {
    if batch.ids.is_empty() {
        return Err(ChromaError::EmptyIds);
    }

    if require_content
        && batch.embeddings.is_none()
        && batch.documents.is_none()
        && batch.images.is_none()
    {
        return Err(ChromaError::MissingContent);
    }

    let expected = batch.ids.len();
    let mismatched: Vec<FieldLength> = [
        (BatchField::Embeddings, batch.embeddings.as_ref().map(Vec::len)),
        (BatchField::Metadatas, batch.metadatas.as_ref().map(Vec::len)),
        (BatchField::Documents, batch.documents.as_ref().map(Vec::len)),
        (BatchField::Images, batch.images.as_ref().map(Vec::len)),
    ]
    .into_iter()
    .filter_map(|(field, len)| {
        len.filter(|len| *len != expected)
            .map(|len| FieldLength { field, len })
    })
    .collect();

    if !mismatched.is_empty() {
        return Err(ChromaError::BatchLengthMismatch {
            expected,
            mismatched,
        });
    }

    let duplicates = duplicate_ids(&batch.ids);
    if !duplicates.is_empty() {
        return Err(ChromaError::DuplicateIds(duplicates));
    }

    Ok(())
}

/// Ids occurring more than once, each reported once in first-occurrence order.
fn duplicate_ids(ids: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(ids.len());
    for id in ids {
        *counts.entry(id.as_str()).or_default() += 1;
    }

    let mut reported = HashSet::new();
    ids.iter()
        .filter(|id| counts[id.as_str()] > 1 && reported.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::error::ErrorKind;

    fn unused_provider() -> MockEmbeddingProvider {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_generate().never();
        provider
    }

    fn length_provider() -> MockEmbeddingProvider {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate()
            .times(1)
            .returning(|texts| Ok(texts.iter().map(|t| vec![t.len() as f32]).collect()));
        provider
    }

    #[tokio::test]
    async fn test_valid_batch_preserves_order() {
        let batch = Batch::new(["a", "b", "c"])
            .with_embeddings(vec![vec![1.0], vec![2.0], vec![3.0]])
            .with_documents(["one", "two", "three"]);

        let provider = unused_provider();
        let validated = validate(batch, Some(&provider), true).await.unwrap();

        assert_eq!(validated.ids, vec!["a", "b", "c"]);
        assert_eq!(validated.embeddings, vec![vec![1.0], vec![2.0], vec![3.0]]);
        assert_eq!(
            validated.documents,
            Some(vec!["one".to_string(), "two".to_string(), "three".to_string()])
        );
    }

    #[tokio::test]
    async fn test_empty_ids() {
        let err = validate(Batch::new(Vec::<String>::new()), None, false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyIds);
    }

    #[tokio::test]
    async fn test_add_requires_content() {
        let err = validate(Batch::new(["a"]), None, true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingContent);
    }

    #[tokio::test]
    async fn test_length_mismatch_never_calls_provider() {
        let batch = Batch::new(["a", "b", "c"])
            .with_embeddings(vec![vec![1.0], vec![2.0]])
            .with_documents(["one", "two", "three", "four"]);

        let provider = unused_provider();
        let err = validate(batch, Some(&provider), true).await.unwrap_err();

        match err {
            ChromaError::BatchLengthMismatch {
                expected,
                mismatched,
            } => {
                assert_eq!(expected, 3);
                assert_eq!(
                    mismatched,
                    vec![
                        FieldLength {
                            field: BatchField::Embeddings,
                            len: 2
                        },
                        FieldLength {
                            field: BatchField::Documents,
                            len: 4
                        },
                    ]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_ids() {
        let batch = Batch::new(["a", "a", "b"]).with_embeddings(vec![vec![1.0]; 3]);

        let err = validate(batch, None, true).await.unwrap_err();
        match err {
            ChromaError::DuplicateIds(ids) => assert_eq!(ids, vec!["a"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicates_reported_once_in_first_occurrence_order() {
        let ids: Vec<String> = ["c", "a", "b", "a", "c", "c"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(duplicate_ids(&ids), vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_duplicates_checked_before_embedding() {
        let batch = Batch::new(["a", "a"]).with_documents(["x", "y"]);
        let provider = unused_provider();

        let err = validate(batch, Some(&provider), true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateIds);
    }

    #[tokio::test]
    async fn test_documents_without_provider() {
        let batch = Batch::new(["a"]).with_documents(["hello"]);
        let err = validate(batch, None, true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingEmbeddingFunction);
    }

    #[tokio::test]
    async fn test_update_metadata_only_needs_source() {
        let mut metadata = Metadata::new();
        metadata.insert("k".to_string(), "v".into());
        let batch = Batch::new(["a"]).with_metadatas(vec![metadata]);

        let provider = unused_provider();
        let err = validate(batch, Some(&provider), false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSourceContent);
    }

    #[tokio::test]
    async fn test_embeds_documents_in_preference_to_images() {
        let batch = Batch::new(["a", "b"])
            .with_documents(["xx", "yyy"])
            .with_images(["i", "j"]);

        let provider = length_provider();
        let validated = validate(batch, Some(&provider), true).await.unwrap();
        assert_eq!(validated.embeddings, vec![vec![2.0], vec![3.0]]);
    }

    #[tokio::test]
    async fn test_embeds_images_when_no_documents() {
        let batch = Batch::new(["a"]).with_images(["base64data"]);

        let provider = length_provider();
        let validated = validate(batch, Some(&provider), true).await.unwrap();
        assert_eq!(validated.embeddings, vec![vec![10.0]]);
        assert!(validated.documents.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_embedding_error() {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate()
            .returning(|_| Err(ChromaError::embedding("mock", 401, "invalid api key")));

        let batch = Batch::new(["a"]).with_documents(["hello"]);
        let err = validate(batch, Some(&provider), true).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmbeddingGeneration);
        assert_eq!(err.code(), 401);
    }
}
