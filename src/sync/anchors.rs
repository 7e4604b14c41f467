use log::debug;

use crate::subtitle_processor::SubtitleEntry;

// @module: Anchor points and outlier curation

/// Minimum MAD used in outlier detection, to avoid over-aggressive pruning
/// when anchor offsets are naturally tight.
const MIN_MAD_MS: i64 = 1000;

/// Outlier detection is statistically meaningless below this anchor count.
const MIN_ANCHORS_FOR_FILTERING: usize = 3;

/// A hypothesized correspondence between one target entry and one reference
/// entry. Timestamps are snapshotted at creation - the mapper never re-reads
/// the source entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPoint {
    /// Absolute index into the target entry list
    pub target_idx: usize,
    /// Absolute index into the reference entry list
    pub ref_idx: usize,
    /// Matched target entry start, ms
    pub target_start_ms: u64,
    /// Matched target entry end, ms
    pub target_end_ms: u64,
    /// Matched reference entry start, ms
    pub ref_start_ms: u64,
    /// Matched reference entry end, ms
    pub ref_end_ms: u64,
    /// `ref_start_ms - target_start_ms`; used only for outlier diagnostics
    /// and the summary report, never for the mapping itself
    pub offset_ms: i64,
}

impl AnchorPoint {
    /// Snapshot an anchor from a matched entry pair
    pub fn from_entries(
        target_idx: usize,
        ref_idx: usize,
        target: &SubtitleEntry,
        reference: &SubtitleEntry,
    ) -> Self {
        AnchorPoint {
            target_idx,
            ref_idx,
            target_start_ms: target.start_time_ms,
            target_end_ms: target.end_time_ms,
            ref_start_ms: reference.start_time_ms,
            ref_end_ms: reference.end_time_ms,
            offset_ms: reference.start_time_ms as i64 - target.start_time_ms as i64,
        }
    }
}

/// Sort anchors by target time and remove statistical outliers.
///
/// Uses median absolute deviation rather than standard deviation: the
/// external matcher can fail content matches silently and produce
/// near-random offsets, so a large minority of anchors may themselves be
/// outliers. Fewer than 3 anchors are returned sorted but unfiltered.
pub fn curate_anchors(mut anchors: Vec<AnchorPoint>, max_deviation_factor: f64) -> Vec<AnchorPoint> {
    anchors.sort_by_key(|a| a.target_start_ms);

    if anchors.len() < MIN_ANCHORS_FOR_FILTERING {
        return anchors;
    }

    let median_offset = median(anchors.iter().map(|a| a.offset_ms).collect());
    let mad = median(anchors.iter().map(|a| (a.offset_ms - median_offset).abs()).collect())
        .max(MIN_MAD_MS);

    let threshold = (mad as f64 * max_deviation_factor) as i64;

    anchors
        .into_iter()
        .filter(|anchor| {
            let deviation = (anchor.offset_ms - median_offset).abs();
            if deviation <= threshold {
                true
            } else {
                debug!(
                    "Removing outlier anchor: offset={}ms (median={}ms, deviation={}ms)",
                    anchor.offset_ms, median_offset, deviation
                );
                false
            }
        })
        .collect()
}

/// Middle element of the sorted values (upper median for even counts)
fn median(mut values: Vec<i64>) -> i64 {
    values.sort_unstable();
    values[values.len() / 2]
}
