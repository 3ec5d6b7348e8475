use std::sync::Arc;

use canonical::{extract_features, Document, DocumentRole, FeatureConfig, FeatureDocument};
use index::{LshIndex, StoredDocument};
use perceptual::{sign_shingles, HashFamily, MinHashSignature, PerceptualConfig};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::types::{MatchError, MatchOutcome, MatchSession, ScoredCandidate};


/// Turn a raw document into its features and signature.
///
/// Corpus and query documents go through the same path; only `role` differs.
pub fn fingerprint<F>(
    doc: &Document,
    role: DocumentRole,
    features: &FeatureConfig,
    family: &F,
    lsh: &PerceptualConfig,
) -> Result<(FeatureDocument, MinHashSignature), MatchError>
where
    F: HashFamily + ?Sized,
{
    let extracted = extract_features(doc, role, features)?;
    let signature = sign_shingles(extracted.shingles.as_slice(), family, lsh)?;
    Ok((extracted, signature))
}

/// Order candidates best first: LSH estimate descending, then id ascending.
pub fn rank_candidates(scored: &mut [ScoredCandidate]) {
    scored.sort_by(|a, b| {
        b.lsh_similarity
            .total_cmp(&a.lsh_similarity)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Query-side engine over a frozen index.
pub struct Matcher {
    index: Arc<LshIndex>,
    family: Arc<dyn HashFamily>,
    features: FeatureConfig,
    lsh: PerceptualConfig,
}

impl Matcher {
    /// Construct a matcher that takes ownership of a finished index.
    pub fn new(
        index: LshIndex,
        family: Arc<dyn HashFamily>,
        features: FeatureConfig,
        lsh: PerceptualConfig,
    ) -> Result<Self, MatchError> {
        Self::with_index_arc(Arc::new(index), family, features, lsh)
    }

    /// Construct a matcher from a shared index handle.
    ///
    /// The index banding, the LSH config and the family length must agree.
    pub fn with_index_arc(
        index: Arc<LshIndex>,
        family: Arc<dyn HashFamily>,
        features: FeatureConfig,
        lsh: PerceptualConfig,
    ) -> Result<Self, MatchError> {
        features.validate()?;
        lsh.validate()?;
        let banding = index.banding();
        if banding.bands() != lsh.minhash_bands || banding.rows() != lsh.minhash_rows_per_band {
            return Err(MatchError::InvalidConfig(format!(
                "index banding {}x{} differs from config {}x{}",
                banding.bands(),
                banding.rows(),
                lsh.minhash_bands,
                lsh.minhash_rows_per_band
            )));
        }
        if family.len() != banding.signature_len() {
            return Err(MatchError::InvalidConfig(format!(
                "hash family has {} functions, banding needs {}",
                family.len(),
                banding.signature_len()
            )));
        }
        Ok(Self {
            index,
            family,
            features,
            lsh,
        })
    }

    pub fn index(&self) -> &LshIndex {
        &self.index
    }

    /// Accept/reject cutoff for the index's banding.
    pub fn threshold(&self) -> f64 {
        self.index.similarity_threshold()
    }

    /// Match one raw query document.
    ///
    /// The query counts toward `session.stats` whether it matches, is
    /// rejected or fails.
    pub fn match_document(
        &self,
        query: &Document,
        session: &mut MatchSession,
    ) -> Result<MatchOutcome, MatchError> {
        let fingerprinted = fingerprint(
            query,
            DocumentRole::Query,
            &self.features,
            &*self.family,
            &self.lsh,
        );
        match fingerprinted {
            Ok((features, signature)) => self.match_fingerprint(&features, &signature, session),
            Err(err) => {
                session.stats.request_count += 1;
                session.stats.failed += 1;
                Err(err)
            }
        }
    }

    /// Match a query that has already been fingerprinted.
    pub fn match_fingerprint(
        &self,
        query: &FeatureDocument,
        signature: &MinHashSignature,
        session: &mut MatchSession,
    ) -> Result<MatchOutcome, MatchError> {
        session.stats.request_count += 1;
        let outcome = self.decide(query, signature, session);
        match &outcome {
            Ok(MatchOutcome::Matched { .. }) => session.stats.matched += 1,
            Ok(MatchOutcome::BelowThreshold { .. }) => session.stats.unmatched_below_threshold += 1,
            Ok(MatchOutcome::NoCandidates) => session.stats.unmatched_no_candidates += 1,
            Err(_) => session.stats.failed += 1,
        }
        outcome
    }

    fn decide(
        &self,
        query: &FeatureDocument,
        signature: &MinHashSignature,
        session: &mut MatchSession,
    ) -> Result<MatchOutcome, MatchError> {
        let candidates = self.index.candidates(signature)?;
        let threshold = self.threshold();
        if candidates.is_empty() {
            debug!(doc_id = %query.id, candidates = 0, threshold, "no candidates");
            return Ok(MatchOutcome::NoCandidates);
        }

        let mut scored = candidates
            .iter()
            .map(|candidate| score(query, signature, candidate))
            .collect::<Result<Vec<_>, _>>()?;
        for candidate in &scored {
            session
                .scores
                .record(candidate.lsh_similarity, candidate.jaccard_similarity);
        }
        rank_candidates(&mut scored);

        let count = scored.len();
        let best = scored.swap_remove(0);
        let score = best.lsh_similarity;
        debug!(
            doc_id = %query.id,
            candidates = count,
            best_id = %best.id,
            score,
            threshold,
            "match decision"
        );
        if score >= threshold {
            Ok(MatchOutcome::Matched { hit: best })
        } else {
            Ok(MatchOutcome::BelowThreshold { best, threshold })
        }
    }

    /// Score a query against one stored document by id, bypassing the bands.
    pub fn score_against(
        &self,
        query: &FeatureDocument,
        signature: &MinHashSignature,
        id: &str,
    ) -> Result<ScoredCandidate, MatchError> {
        let candidate = self
            .index
            .get(id)
            .ok_or_else(|| MatchError::UnknownCandidate(id.to_string()))?;
        score(query, signature, candidate)
    }

    /// Match many queries and return outcomes in input order.
    ///
    /// With `use_parallel` set, queries run on the rayon pool; each one gets
    /// its own session and the sessions are merged in input order, so the
    /// returned session is identical to a sequential run.
    pub fn match_batch(
        &self,
        queries: &[Document],
    ) -> (Vec<Result<MatchOutcome, MatchError>>, MatchSession) {
        let run = |query: &Document| {
            let mut session = MatchSession::new();
            let outcome = self.match_document(query, &mut session);
            (outcome, session)
        };
        let per_query: Vec<_> = if self.lsh.use_parallel {
            queries.par_iter().map(run).collect()
        } else {
            queries.iter().map(run).collect()
        };

        let mut merged = MatchSession::new();
        let mut outcomes = Vec::with_capacity(per_query.len());
        for (outcome, session) in per_query {
            merged.merge(session);
            outcomes.push(outcome);
        }
        info!(
            queries = merged.stats.request_count,
            matched = merged.stats.matched,
            no_candidates = merged.stats.unmatched_no_candidates,
            below_threshold = merged.stats.unmatched_below_threshold,
            failed = merged.stats.failed,
            "batch matched"
        );
        (outcomes, merged)
    }
}

fn score(
    query: &FeatureDocument,
    signature: &MinHashSignature,
    candidate: &StoredDocument,
) -> Result<ScoredCandidate, MatchError> {
    let lsh_similarity = signature.estimate_jaccard(&candidate.signature).map_err(|_| {
        MatchError::SignatureLengthMismatch {
            query: signature.len(),
            candidate: candidate.signature.len(),
        }
    })?;
    Ok(ScoredCandidate {
        id: candidate.id.clone(),
        title: candidate.title.clone(),
        lsh_similarity,
        jaccard_similarity: query.shingles.jaccard(&candidate.shingles),
    })
}
