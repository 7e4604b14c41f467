use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::app_config::SyncConfig;
use crate::errors::MatcherError;
use crate::matchers::{EntryMatcher, MatchPair, MatchRequest};
use crate::subtitle_processor::SubtitleEntry;
use crate::sync::anchors::AnchorPoint;
use crate::sync::sampler::SampleGroup;

// @module: Entry matcher adapter - one sampled group in, anchor candidates out

/// Turn one sampled group into zero or more anchor candidates using the
/// external matcher as a black box.
///
/// The matcher call is retried with exponential backoff on transient
/// failure; a group that exhausts its retries contributes no anchors and the
/// run continues with partial coverage. Returned pairs are validated against
/// the full entry lists and anything invalid is dropped.
pub async fn match_group(
    matcher: &Arc<dyn EntryMatcher>,
    group: &SampleGroup,
    target_entries: &[SubtitleEntry],
    ref_entries: &[SubtitleEntry],
    config: &SyncConfig,
) -> Vec<AnchorPoint> {
    let target_slice = &target_entries[group.target_range.clone()];
    let ref_slice = &ref_entries[group.ref_range.clone()];

    // Clipping can only shrink ranges, but guard anyway before spending a call
    if target_slice.is_empty() || ref_slice.is_empty() {
        return Vec::new();
    }

    let request = MatchRequest::from_slices(
        ref_slice,
        group.ref_range.start,
        target_slice,
        group.target_range.start,
        config.excerpt_chars,
    );

    let pairs = match call_with_retry(matcher, &request, config).await {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!("Anchor group {} failed: {}", group.group_idx + 1, e);
            return Vec::new();
        }
    };

    validate_pairs(&pairs, target_entries, ref_entries)
}

/// Call the matcher with bounded retries and exponential backoff
async fn call_with_retry(
    matcher: &Arc<dyn EntryMatcher>,
    request: &MatchRequest,
    config: &SyncConfig,
) -> Result<Vec<MatchPair>, MatcherError> {
    let mut attempt = 0;
    let mut last_error = None;

    while attempt <= config.retry_count {
        match matcher.match_entries(request).await {
            Ok(pairs) => return Ok(pairs),
            Err(e) => {
                let retryable = e.is_retryable();
                debug!(
                    "Matcher call failed: {} - attempt {}/{}",
                    e,
                    attempt + 1,
                    config.retry_count + 1
                );
                last_error = Some(e);
                if !retryable {
                    break;
                }
            }
        }

        attempt += 1;

        // If we have more retries left, wait with exponential backoff
        if attempt <= config.retry_count {
            let backoff_ms = config.retry_backoff_ms * (1u64 << (attempt - 1));
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        }
    }

    Err(last_error.unwrap_or_else(|| {
        MatcherError::RequestFailed(format!(
            "Matcher call failed after {} attempts",
            config.retry_count + 1
        ))
    }))
}

/// Validate matcher pairs and snapshot the matched entries' timestamps.
///
/// Indices outside the valid absolute range are rejected rather than
/// trusted; a pair that fails validation is dropped silently.
fn validate_pairs(
    pairs: &[MatchPair],
    target_entries: &[SubtitleEntry],
    ref_entries: &[SubtitleEntry],
) -> Vec<AnchorPoint> {
    pairs
        .iter()
        .filter_map(|pair| {
            let target = target_entries.get(pair.target_idx)?;
            let reference = ref_entries.get(pair.ref_idx)?;
            Some(AnchorPoint::from_entries(
                pair.target_idx,
                pair.ref_idx,
                target,
                reference,
            ))
        })
        .collect()
}
