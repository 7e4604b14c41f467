use crate::sync::anchors::AnchorPoint;

// @module: Piecewise-linear time mapping

/// One linear piece of the time mapping, derived from two consecutive
/// sorted anchors. Evaluates `ref_time = scale * target_time + offset`.
#[derive(Debug, Clone, Copy)]
pub struct MappingSegment {
    /// Domain start (target-track time, ms)
    pub target_start: u64,
    /// Domain end (target-track time, ms)
    pub target_end: u64,
    /// Linear coefficient
    pub scale: f64,
    /// Constant coefficient
    pub offset: f64,
}

impl MappingSegment {
    /// Evaluate the segment's linear function, rounded to integer ms
    fn evaluate(&self, target_ms: u64) -> i64 {
        (self.scale * target_ms as f64 + self.offset).round() as i64
    }
}

/// Piecewise-linear mapping from target-track time to reference-track time.
///
/// Each segment is exact at its two defining anchors, so the overall mapping
/// is continuous at every anchor. Local interpolation (rather than one
/// global regression) lets each segment absorb non-uniform drift, e.g. a few
/// seconds of inserted content partway through a video. Outside the anchor
/// range the nearest segment extrapolates linearly.
#[derive(Debug)]
pub struct TimeMapping {
    /// Curated anchors, sorted by target time
    anchors: Vec<AnchorPoint>,
    /// Pre-computed segments, ascending and contiguous by construction
    segments: Vec<MappingSegment>,
}

impl TimeMapping {
    /// Build the mapping from curated anchors.
    ///
    /// Sorting is idempotent when the curator already ran; it is repeated
    /// here so the mapping is correct for any caller.
    pub fn new(mut anchors: Vec<AnchorPoint>) -> Self {
        anchors.sort_by_key(|a| a.target_start_ms);

        let segments = anchors
            .windows(2)
            .map(|pair| {
                let (a1, a2) = (&pair[0], &pair[1]);
                let target_span = a2.target_start_ms as i64 - a1.target_start_ms as i64;
                let ref_span = a2.ref_start_ms as i64 - a1.ref_start_ms as i64;

                // Degenerate anchors at identical target time keep unit scale
                let scale = if target_span > 0 {
                    ref_span as f64 / target_span as f64
                } else {
                    1.0
                };
                let offset = a1.ref_start_ms as f64 - scale * a1.target_start_ms as f64;

                MappingSegment {
                    target_start: a1.target_start_ms,
                    target_end: a2.target_start_ms,
                    scale,
                    offset,
                }
            })
            .collect();

        TimeMapping { anchors, segments }
    }

    /// Number of anchors backing this mapping
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    /// Map a target timestamp to a reference timestamp.
    ///
    /// With fewer than two anchors the mapping degrades to a constant-offset
    /// shift (or identity with none). The result may be negative near the
    /// extrapolation boundary; callers clamp at write time.
    pub fn map_time(&self, target_ms: u64) -> i64 {
        let Some(first) = self.segments.first() else {
            // Fallback: simple offset from a single anchor, identity with none
            return match self.anchors.first() {
                Some(anchor) => target_ms as i64 + anchor.offset_ms,
                None => target_ms as i64,
            };
        };

        if target_ms <= first.target_start {
            return first.evaluate(target_ms);
        }

        let last = self.segments.last().unwrap_or(first);
        if target_ms >= last.target_end {
            return last.evaluate(target_ms);
        }

        // Domains are contiguous and sorted, so a binary scan suffices
        let idx = self
            .segments
            .partition_point(|seg| seg.target_end < target_ms)
            .min(self.segments.len() - 1);
        self.segments[idx].evaluate(target_ms)
    }
}
