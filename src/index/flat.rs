//! Flat-file vector index: brute-force cosine distance over all records,
//! persisted as a single bincode file.
//!
//! Catalogs in this domain run to a few thousand patterns; an exhaustive scan
//! per query is well under the latency of the embedding call that precedes
//! it. The file is written to a temp sibling and renamed into place.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{EmbeddingRecord, IndexManifest, PatternId, RecordMetadata};
use crate::{MedkbError, Result};

use super::{MetadataFilter, QueryHit, VectorIndex};

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    manifest: IndexManifest,
    records: Vec<EmbeddingRecord>,
}

/// Persistent brute-force vector index.
pub struct FlatVectorIndex {
    path: PathBuf,
    file: IndexFile,
    ids: HashSet<PatternId>,
}

impl FlatVectorIndex {
    /// Open an index file, or start an empty one if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = if path.exists() {
            let bytes = fs_err::read(&path)?;
            let (file, _): (IndexFile, usize) =
                bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
            file
        } else {
            IndexFile::default()
        };
        let ids = file
            .records
            .iter()
            .map(|r| r.metadata.id.clone())
            .collect();
        Ok(Self { path, file, ids })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VectorIndex for FlatVectorIndex {
    fn count(&self) -> usize {
        self.file.records.len()
    }

    fn contains(&self, id: &PatternId) -> bool {
        self.ids.contains(id)
    }

    fn add(&mut self, records: Vec<EmbeddingRecord>) -> Result<()> {
        for record in &records {
            let dim = record.vector.len();
            if self.file.manifest.dimension == 0 {
                self.file.manifest.dimension = dim;
            } else if dim != self.file.manifest.dimension {
                return Err(MedkbError::DimensionMismatch {
                    expected: self.file.manifest.dimension,
                    actual: dim,
                });
            }
        }
        self.ids
            .extend(records.iter().map(|r| r.metadata.id.clone()));
        self.file.records.extend(records);
        Ok(())
    }

    fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryHit>> {
        if vector.is_empty() {
            return Err(MedkbError::InvalidQuery {
                reason: "query vector is empty".to_string(),
            });
        }

        let mut hits: Vec<QueryHit> = self
            .file
            .records
            .iter()
            .filter(|r| r.vector.len() == vector.len())
            .filter(|r| filter.is_none_or(|f| f.matches(&r.metadata)))
            .map(|r| QueryHit {
                metadata: r.metadata.clone(),
                document_text: r.document_text.clone(),
                distance: cosine_distance(vector, &r.vector),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    fn drop_and_recreate(&mut self) -> Result<()> {
        self.file = IndexFile::default();
        self.ids.clear();
        if self.path.exists() {
            fs_err::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn all_metadata(&self) -> Vec<RecordMetadata> {
        self.file
            .records
            .iter()
            .map(|r| r.metadata.clone())
            .collect()
    }

    fn manifest(&self) -> &IndexManifest {
        &self.file.manifest
    }

    fn manifest_mut(&mut self) -> &mut IndexManifest {
        &mut self.file.manifest
    }

    fn persist(&self) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(&self.file, bincode::config::standard())?;
        let tmp = self.path.with_extension("tmp");
        fs_err::write(&tmp, &bytes)?;
        fs_err::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentType, Priority};

    fn record(id: &str, domain: &str, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            vector,
            document_text: format!("Question: about {domain}"),
            metadata: RecordMetadata {
                id: PatternId::derive(id, "q", "c"),
                position: 0,
                medical_domain: domain.to_string(),
                section: "General".to_string(),
                content_type: ContentType::InterviewQuestion,
                priority: Priority::Normal,
                tree_path: format!("{domain} > General > x > 1"),
                source: "clinical_text".to_string(),
                tags: String::new(),
                bot_question: format!("about {domain}"),
            },
        }
    }

    #[test]
    fn query_orders_by_distance_and_respects_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = FlatVectorIndex::open(dir.path().join("index.bin")).unwrap();
        index
            .add(vec![
                record("a", "Cardiac", vec![1.0, 0.0]),
                record("b", "Respiratory", vec![0.0, 1.0]),
                record("c", "Cardiac", vec![0.7, 0.7]),
            ])
            .unwrap();

        let hits = index.query(&[1.0, 0.0], 3, None).unwrap();
        assert_eq!(hits[0].metadata.medical_domain, "Cardiac");
        assert!(hits[0].distance < hits[1].distance);

        let filter = MetadataFilter {
            domain_contains: Some("respir".to_string()),
            section_contains: None,
        };
        let hits = index.query(&[1.0, 0.0], 3, Some(&filter)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.medical_domain, "Respiratory");
    }

    #[test]
    fn persist_and_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        {
            let mut index = FlatVectorIndex::open(&path).unwrap();
            index.add(vec![record("a", "Cardiac", vec![1.0, 0.0])]).unwrap();
            index.manifest_mut().model = "hashed-local".to_string();
            index.persist().unwrap();
        }
        let reopened = FlatVectorIndex::open(&path).unwrap();
        assert_eq!(reopened.count(), 1);
        assert_eq!(reopened.manifest().model, "hashed-local");
        assert!(reopened.contains(&PatternId::derive("a", "q", "c")));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = FlatVectorIndex::open(dir.path().join("index.bin")).unwrap();
        index.add(vec![record("a", "Cardiac", vec![1.0, 0.0])]).unwrap();
        let err = index
            .add(vec![record("b", "Cardiac", vec![1.0, 0.0, 0.0])])
            .unwrap_err();
        assert!(matches!(err, MedkbError::DimensionMismatch { .. }));
    }

    #[test]
    fn drop_and_recreate_resets_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        let mut index = FlatVectorIndex::open(&path).unwrap();
        index.add(vec![record("a", "Cardiac", vec![1.0, 0.0])]).unwrap();
        index.persist().unwrap();
        index.drop_and_recreate().unwrap();
        assert_eq!(index.count(), 0);
        assert!(!path.exists());
    }
}
