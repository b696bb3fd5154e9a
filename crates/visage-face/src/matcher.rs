use crate::descriptor::{FaceDescriptor, distance};

/// Distance below which two descriptors are the same person.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.4;

/// Result of comparing a probe against one expected descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    pub distance: f32,
    pub matched: bool,
}

/// Threshold decision over descriptor distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMatcher {
    threshold: f32,
}

impl Default for FaceMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl FaceMatcher {
    /// Returns `None` unless `threshold` is finite and positive.
    pub fn new(threshold: f32) -> Option<Self> {
        (threshold.is_finite() && threshold > 0.0).then_some(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_match(&self, a: &FaceDescriptor, b: &FaceDescriptor) -> bool {
        distance(a, b) < self.threshold
    }

    pub fn verify(&self, probe: &FaceDescriptor, expected: &FaceDescriptor) -> MatchOutcome {
        let distance = distance(probe, expected);
        let outcome = MatchOutcome {
            distance,
            matched: distance < self.threshold,
        };
        tracing::debug!(
            distance = outcome.distance,
            threshold = self.threshold,
            matched = outcome.matched,
            "face verified"
        );
        outcome
    }

    /// Closest candidate to `probe` and its distance, or `None` for an empty list.
    ///
    /// The closest candidate is returned even when it is above the threshold;
    /// use [`FaceMatcher::is_match`] on the result to decide.
    pub fn best_match<'a, I>(&self, probe: &FaceDescriptor, candidates: I) -> Option<(usize, f32)>
    where
        I: IntoIterator<Item = &'a FaceDescriptor>,
    {
        let best = candidates
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i, distance(probe, c)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, distance)) = best {
            tracing::debug!(index, distance, "best face match");
        }
        best
    }
}
