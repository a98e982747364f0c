use std::collections::HashSet;

use super::Source;
use crate::llm::provider::{GroundingMetadata, WebReference};

/// A citation as the collaborator reported it; either field may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceCandidate {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl SourceCandidate {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            title: Some(title.into()),
        }
    }
}

impl From<WebReference> for SourceCandidate {
    fn from(web: WebReference) -> Self {
        Self {
            uri: web.uri,
            title: web.title,
        }
    }
}

/// One candidate per grounding chunk; chunks without a web reference yield
/// an empty candidate that [`dedupe`] discards.
pub fn candidates_from_grounding(metadata: GroundingMetadata) -> Vec<SourceCandidate> {
    metadata
        .chunks
        .into_iter()
        .map(|chunk| chunk.web.map(SourceCandidate::from).unwrap_or_default())
        .collect()
}

/// Keeps well-formed candidates, first occurrence per uri, in input order.
pub fn dedupe<I>(candidates: I) -> Vec<Source>
where
    I: IntoIterator<Item = SourceCandidate>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let uri = candidate.uri.filter(|uri| !uri.is_empty())?;
            let title = candidate.title.filter(|title| !title.is_empty())?;
            Some(Source { uri, title })
        })
        .filter(|source| seen.insert(source.uri.clone()))
        .collect()
}
