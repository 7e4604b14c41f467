use std::ops::Range;

use crate::app_config::SyncConfig;

// @module: Anchor group sampling

/// One sampled (target group, reference window) pair, as half-open index
/// ranges into the respective entry lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGroup {
    /// Zero-based group number
    pub group_idx: usize,
    /// Consecutive target entries to match
    pub target_range: Range<usize>,
    /// Consecutive reference entries to search
    pub ref_range: Range<usize>,
}

/// Partition the target track into representative groups and compute a
/// reference search window for each.
///
/// Group centers sit at proportional offsets `(i + 0.5) / G` of the target
/// track; the reference center uses the same proportional offset applied to
/// the reference length. The proportional prior tolerates roughly-constant
/// drift, and degrades when the two tracks have substantially different
/// entry counts (a known approximation, not a guaranteed-correct one). The
/// reference window is wider than the target group to absorb local offset
/// uncertainty before the content match narrows it down.
pub fn sample_groups(target_len: usize, ref_len: usize, config: &SyncConfig) -> Vec<SampleGroup> {
    if target_len == 0 || ref_len == 0 {
        return Vec::new();
    }

    // Fewer groups for very short tracks, capped for very long ones
    let num_groups = config.anchor_groups.min((target_len / 10).max(2));
    let group_size = config.entries_per_group;
    let search_window = config.search_window;

    let mut groups = Vec::with_capacity(num_groups);

    for group_idx in 0..num_groups {
        let center_pos = ((group_idx as f64 + 0.5) / num_groups as f64 * target_len as f64) as usize;
        let start_pos = center_pos.saturating_sub(group_size / 2);
        let end_pos = (start_pos + group_size).min(target_len);

        if start_pos >= end_pos {
            continue;
        }

        let ratio = center_pos as f64 / target_len as f64;
        let ref_center = (ratio * ref_len as f64) as usize;
        let ref_start = ref_center.saturating_sub(search_window / 2);
        let ref_end = (ref_start + search_window).min(ref_len);

        if ref_start >= ref_end {
            continue;
        }

        groups.push(SampleGroup {
            group_idx,
            target_range: start_pos..end_pos,
            ref_range: ref_start..ref_end,
        });
    }

    groups
}
