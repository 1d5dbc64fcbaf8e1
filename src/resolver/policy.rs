use super::lookup::StreamCandidate;

/// Quality tier selection: preferred tier first, then the fallback tier.
/// Anything else (including higher bitrates) is not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityPolicy {
    pub preferred: String,
    pub fallback: String,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            preferred: "160kbps".to_string(),
            fallback: "96kbps".to_string(),
        }
    }
}

impl QualityPolicy {
    pub fn new(preferred: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
            fallback: fallback.into(),
        }
    }

    pub fn select<'a>(&self, candidates: &'a [StreamCandidate]) -> Option<&'a StreamCandidate> {
        candidates
            .iter()
            .find(|c| c.quality_tag == self.preferred)
            .or_else(|| candidates.iter().find(|c| c.quality_tag == self.fallback))
    }
}
