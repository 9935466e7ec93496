//! Retrieval orchestration for `Medkb`.
//!
//! The semantic path embeds the conversation context and queries the vector
//! index; the keyword path scores word overlap over the catalog. Candidates
//! are reordered so that priority is a hard ordering key and similarity only
//! breaks ties within a tier. Retrieval never surfaces an error: every
//! failure on the semantic path falls through to the keyword path, and an
//! empty result is `None`, not an error.

use crate::catalog::CatalogMode;
use crate::constants::{KEYWORD_MIN_WORD_LEN, SEMANTIC_CANDIDATES};
use crate::index::{MetadataFilter, QueryHit, recover_bot_question};
use crate::types::{
    Pattern, RetrievalEngineKind, RetrievalRequest, RetrievedPattern,
};
use crate::{MedkbError, Result};

use super::lifecycle::Medkb;

impl Medkb {
    /// Return the single most relevant pattern for the given conversation
    /// context, or `None` when nothing matches.
    #[must_use]
    pub fn get_next_question(&self, request: &RetrievalRequest) -> Option<RetrievedPattern> {
        if request.use_semantic && self.index_count() > 0 && self.embedder.is_some() {
            match self.semantic_lookup(request) {
                Ok(Some(hit)) => return Some(hit),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "semantic retrieval failed; falling back to keyword search"
                    );
                }
            }
        }
        self.keyword_lookup(request)
    }

    fn semantic_lookup(&self, request: &RetrievalRequest) -> Result<Option<RetrievedPattern>> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| MedkbError::EmbeddingService {
                reason: "no embedding provider configured".to_string(),
            })?;
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| MedkbError::IndexUnavailable {
                reason: "no vector index attached".to_string(),
            })?;

        let vector = embedder.embed_one(&request.context)?;
        let filter = MetadataFilter {
            domain_contains: request.domain.clone(),
            section_contains: request.section.clone(),
        };
        let filter = (!filter.is_empty()).then_some(filter);
        let hits = index.query(&vector, SEMANTIC_CANDIDATES, filter.as_ref())?;
        if hits.is_empty() {
            return Ok(None);
        }

        let mut candidates: Vec<RetrievedPattern> = hits
            .into_iter()
            .map(|hit| self.resolve_hit(hit))
            .collect();

        if request.prioritize_safety {
            // Stable: equal (priority, distance) keeps index order.
            candidates.sort_by(|a, b| {
                let pa = a.pattern.priority.rank();
                let pb = b.pattern.priority.rank();
                pa.cmp(&pb).then_with(|| {
                    a.similarity
                        .unwrap_or(1.0)
                        .total_cmp(&b.similarity.unwrap_or(1.0))
                })
            });
        }

        let top = candidates.into_iter().next();
        if let Some(ref hit) = top {
            tracing::debug!(
                content_type = %hit.pattern.content_type,
                priority = %hit.pattern.priority,
                distance = hit.similarity,
                "semantic retrieval hit"
            );
        }
        Ok(top)
    }

    /// Resolve an index hit into a full pattern. In full mode the catalog
    /// entry at the hit's position carries everything; in lightweight mode
    /// the question is recovered from the stored metadata or, for records
    /// persisted before it was stored there, from the rendered document text.
    fn resolve_hit(&self, hit: QueryHit) -> RetrievedPattern {
        let QueryHit {
            metadata,
            document_text,
            distance,
        } = hit;

        let pattern = if self.catalog.mode() == CatalogMode::Full {
            self.catalog
                .get(metadata.position)
                .filter(|p| p.id == metadata.id)
                .or_else(|| self.catalog.by_id(&metadata.id))
                .cloned()
        } else {
            None
        };

        let pattern = pattern.unwrap_or_else(|| {
            let bot_question = if metadata.bot_question.is_empty() {
                recover_bot_question(&document_text).unwrap_or_default()
            } else {
                metadata.bot_question.clone()
            };
            Pattern {
                id: metadata.id.clone(),
                medical_domain: metadata.medical_domain.clone(),
                section: metadata.section.clone(),
                content_type: metadata.content_type,
                bot_question,
                clinical_context: String::new(),
                expected_patient_responses: Vec::new(),
                red_flags: Vec::new(),
                differentials: Vec::new(),
                priority: metadata.priority,
                tags: if metadata.tags.is_empty() {
                    Vec::new()
                } else {
                    metadata.tags.split(',').map(str::to_string).collect()
                },
                tree_path: metadata.tree_path.clone(),
                source: metadata.source.clone(),
            }
        });

        RetrievedPattern {
            pattern,
            similarity: Some(distance),
            keyword_score: 0,
            engine: RetrievalEngineKind::Semantic,
        }
    }

    /// Word-overlap fallback over the catalog: count context words longer
    /// than the minimum length that appear in the candidate's searchable
    /// text, drop zero scores, then order by priority and score.
    fn keyword_lookup(&self, request: &RetrievalRequest) -> Option<RetrievedPattern> {
        let context = request.context.to_lowercase();
        let words: Vec<&str> = context
            .split_whitespace()
            .filter(|w| w.len() > KEYWORD_MIN_WORD_LEN)
            .collect();

        let domain_needle = request.domain.as_deref().map(str::to_lowercase);
        let section_needle = request.section.as_deref().map(str::to_lowercase);

        let mut scored: Vec<(&Pattern, usize)> = self
            .catalog
            .patterns()
            .iter()
            .filter(|p| {
                domain_needle
                    .as_ref()
                    .is_none_or(|d| p.medical_domain.to_lowercase().contains(d))
            })
            .filter(|p| {
                section_needle
                    .as_ref()
                    .is_none_or(|s| p.section.to_lowercase().contains(s))
            })
            .filter_map(|p| {
                let searchable = format!(
                    "{} {} {}",
                    p.searchable_text(),
                    p.section.to_lowercase(),
                    p.medical_domain.to_lowercase()
                );
                let score = words.iter().filter(|w| searchable.contains(*w)).count();
                (score > 0).then_some((p, score))
            })
            .collect();

        if request.prioritize_safety {
            scored.sort_by(|(pa, sa), (pb, sb)| {
                pa.priority
                    .rank()
                    .cmp(&pb.priority.rank())
                    .then_with(|| sb.cmp(sa))
            });
        } else {
            scored.sort_by(|(_, sa), (_, sb)| sb.cmp(sa));
        }

        scored.into_iter().next().map(|(pattern, score)| {
            tracing::debug!(
                priority = %pattern.priority,
                score,
                "keyword fallback hit"
            );
            RetrievedPattern {
                pattern: pattern.clone(),
                similarity: None,
                keyword_score: score,
                engine: RetrievalEngineKind::KeywordFallback,
            }
        })
    }
}
