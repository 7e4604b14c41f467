/*!
 * Entry matcher implementations.
 *
 * This module contains clients for the external content-matching capability:
 * - OpenAI: OpenAI-compatible chat completions API
 * - Mock: deterministic matcher for testing
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::MatcherError;
use crate::subtitle_processor::SubtitleEntry;

/// One reference entry as presented to the matcher: absolute index tag,
/// formatted timestamp and a truncated text excerpt.
#[derive(Debug, Clone)]
pub struct ReferenceExcerpt {
    /// Absolute index into the reference entry list
    pub tag: usize,
    /// Entry start time, SRT-formatted
    pub timestamp: String,
    /// Truncated entry text
    pub text: String,
}

/// One target entry as presented to the matcher: absolute index tag and a
/// truncated text excerpt. Target timestamps are withheld since they are the
/// quantity under correction.
#[derive(Debug, Clone)]
pub struct TargetExcerpt {
    /// Absolute index into the target entry list
    pub tag: usize,
    /// Truncated entry text
    pub text: String,
}

/// A compact listing of one reference window and one target group
#[derive(Debug, Clone)]
pub struct MatchRequest {
    /// Reference window entries
    pub reference: Vec<ReferenceExcerpt>,
    /// Target group entries
    pub targets: Vec<TargetExcerpt>,
}

impl MatchRequest {
    /// Build a request from entry slices with their absolute starting offsets.
    ///
    /// Text is truncated to `excerpt_chars` characters; only enough text to
    /// disambiguate is needed.
    pub fn from_slices(
        ref_window: &[SubtitleEntry],
        ref_offset: usize,
        target_group: &[SubtitleEntry],
        target_offset: usize,
        excerpt_chars: usize,
    ) -> Self {
        let reference = ref_window
            .iter()
            .enumerate()
            .map(|(i, e)| ReferenceExcerpt {
                tag: ref_offset + i,
                timestamp: e.format_start_time(),
                text: truncate_chars(&e.text, excerpt_chars),
            })
            .collect();

        let targets = target_group
            .iter()
            .enumerate()
            .map(|(i, e)| TargetExcerpt {
                tag: target_offset + i,
                text: truncate_chars(&e.text, excerpt_chars),
            })
            .collect();

        MatchRequest { reference, targets }
    }
}

/// A content correspondence claimed by the matcher, in absolute indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPair {
    /// Absolute index into the target entry list
    pub target_idx: usize,
    /// Absolute index into the reference entry list
    pub ref_idx: usize,
}

/// Common trait for all entry matchers
///
/// The matcher is an injected capability with a single operation, so the sync
/// engine can be exercised with a deterministic stub instead of a live API.
/// Implementations may skip entries they cannot confidently match and must
/// not invent indices outside the ranges they were given; the caller still
/// validates every returned pair.
#[async_trait]
pub trait EntryMatcher: Send + Sync + Debug {
    /// Match target group entries against a reference window
    ///
    /// # Arguments
    /// * `request` - Compact listing of the reference window and target group
    ///
    /// # Returns
    /// * `Result<Vec<MatchPair>, MatcherError>` - Correspondences found, possibly empty
    async fn match_entries(&self, request: &MatchRequest) -> Result<Vec<MatchPair>, MatcherError>;
}

/// Truncate a string to at most `max_chars` characters on a char boundary
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

pub mod mock;
pub mod openai;
