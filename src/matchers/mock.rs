/*!
 * Mock entry matchers for testing.
 *
 * This module provides mock matchers that simulate different behaviors:
 * - `MockMatcher::identity()` - Pairs equal indices present on both sides
 * - `MockMatcher::scripted(pairs)` - Returns exactly the scripted pairs visible in the request
 * - `MockMatcher::empty()` - Never finds a correspondence
 * - `MockMatcher::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::MatcherError;
use crate::matchers::{EntryMatcher, MatchPair, MatchRequest};

/// Behavior mode for the mock matcher
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Pair every target tag with the identical reference tag, when both are visible
    Identity,
    /// Return the scripted target->reference pairs that are visible in the request
    Scripted(HashMap<usize, usize>),
    /// Never find a correspondence
    Empty,
    /// Always fail with an API error
    Failing,
    /// Fail intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Simulate a slow response before answering like Identity
    Slow { delay_ms: u64 },
    /// Claim correspondences with indices outside the given windows
    OutOfRange,
}

/// Mock matcher for testing synchronization behavior
#[derive(Debug)]
pub struct MockMatcher {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
}

impl MockMatcher {
    /// Create a new mock matcher with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a matcher pairing identical indices
    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    /// Create a matcher returning the given target->reference pairs
    pub fn scripted(pairs: &[(usize, usize)]) -> Self {
        Self::new(MockBehavior::Scripted(pairs.iter().copied().collect()))
    }

    /// Create a matcher that never finds a correspondence
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a failing matcher that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create an intermittently failing matcher
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a matcher that invents indices outside the request windows
    pub fn out_of_range() -> Self {
        Self::new(MockBehavior::OutOfRange)
    }

    /// Number of match calls received so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Pair target tags with identical reference tags present in the window
    fn identity_pairs(request: &MatchRequest) -> Vec<MatchPair> {
        request
            .targets
            .iter()
            .filter(|t| request.reference.iter().any(|r| r.tag == t.tag))
            .map(|t| MatchPair {
                target_idx: t.tag,
                ref_idx: t.tag,
            })
            .collect()
    }
}

impl Clone for MockMatcher {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
        }
    }
}

#[async_trait]
impl EntryMatcher for MockMatcher {
    async fn match_entries(&self, request: &MatchRequest) -> Result<Vec<MatchPair>, MatcherError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Identity => Ok(Self::identity_pairs(request)),

            MockBehavior::Scripted(pairs) => Ok(request
                .targets
                .iter()
                .filter_map(|t| pairs.get(&t.tag).map(|&ref_idx| (t.tag, ref_idx)))
                .filter(|(_, ref_idx)| request.reference.iter().any(|r| r.tag == *ref_idx))
                .map(|(target_idx, ref_idx)| MatchPair { target_idx, ref_idx })
                .collect()),

            MockBehavior::Empty => Ok(Vec::new()),

            MockBehavior::Failing => Err(MatcherError::ApiError {
                status_code: 500,
                message: "Simulated matcher failure".to_string(),
            }),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(MatcherError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::identity_pairs(request))
                }
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(Self::identity_pairs(request))
            }

            MockBehavior::OutOfRange => Ok(vec![MatchPair {
                target_idx: usize::MAX / 2,
                ref_idx: usize::MAX / 2,
            }]),
        }
    }
}
