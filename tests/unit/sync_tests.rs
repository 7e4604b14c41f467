/*!
 * Tests for the sampling, curation and time-mapping stages
 */

use anchorsync::app_config::SyncConfig;
use anchorsync::subtitle_processor::SubtitleEntry;
use anchorsync::sync::anchors::{curate_anchors, AnchorPoint};
use anchorsync::sync::sampler::sample_groups;
use anchorsync::sync::TimeMapping;

fn anchor(target_start_ms: u64, ref_start_ms: u64) -> AnchorPoint {
    AnchorPoint {
        target_idx: 0,
        ref_idx: 0,
        target_start_ms,
        target_end_ms: target_start_ms + 1000,
        ref_start_ms,
        ref_end_ms: ref_start_ms + 1000,
        offset_ms: ref_start_ms as i64 - target_start_ms as i64,
    }
}

/// Sampled windows always stay inside both tracks, whatever the length ratio
#[test]
fn test_sample_groups_withAsymmetricTracks_shouldStayInBounds() {
    let config = SyncConfig::default();

    for (target_len, ref_len) in [(1000, 20), (20, 1000), (11, 11), (3, 300)] {
        let groups = sample_groups(target_len, ref_len, &config);
        assert!(!groups.is_empty(), "target_len={} ref_len={}", target_len, ref_len);

        for group in &groups {
            assert!(group.target_range.end <= target_len);
            assert!(group.ref_range.end <= ref_len);
            assert!(group.target_range.start < group.target_range.end);
            assert!(group.ref_range.start < group.ref_range.end);
        }
    }
}

/// Group indices are strictly increasing and groups move forward in the track
#[test]
fn test_sample_groups_shouldProgressThroughTheTrack() {
    let groups = sample_groups(600, 600, &SyncConfig::default());
    assert_eq!(groups.len(), 6);

    for pair in groups.windows(2) {
        assert!(pair[0].group_idx < pair[1].group_idx);
        assert!(pair[0].target_range.start < pair[1].target_range.start);
        assert!(pair[0].ref_range.start <= pair[1].ref_range.start);
    }
}

/// Curation output feeds straight into the mapping: the surviving anchors
/// define a mapping that is exact at each of them
#[test]
fn test_curate_then_map_shouldBeExactAtSurvivingAnchors() {
    let anchors = vec![
        anchor(1000, 3000),
        anchor(10000, 12100),
        anchor(20000, 21950),
        // Bogus match, some 90 seconds off
        anchor(30000, 122000),
        anchor(40000, 42050),
    ];

    let curated = curate_anchors(anchors, 3.0);
    assert_eq!(curated.len(), 4);
    assert!(curated.iter().all(|a| a.offset_ms.abs() < 5000));

    let mapping = TimeMapping::new(curated.clone());
    for a in &curated {
        assert_eq!(mapping.map_time(a.target_start_ms), a.ref_start_ms as i64);
    }
}

/// Monotone anchors produce a monotone mapping
#[test]
fn test_time_mapping_withMonotoneAnchors_shouldMapMonotonically() {
    let mapping = TimeMapping::new(vec![
        anchor(0, 500),
        anchor(30000, 32000),
        anchor(60000, 61000),
        anchor(90000, 93000),
    ]);

    let mut previous = i64::MIN;
    for target_ms in (0..120000).step_by(1500) {
        let mapped = mapping.map_time(target_ms);
        assert!(mapped >= previous, "mapping regressed at {}ms", target_ms);
        previous = mapped;
    }
}

/// Anchors snapshotted from entries reproduce the entries' timing
#[test]
fn test_anchor_snapshot_shouldMatchSourceEntries() {
    let target = SubtitleEntry::new(5, 12000, 14000, "hello".to_string());
    let reference = SubtitleEntry::new(9, 13500, 15500, "hello".to_string());

    let anchor = AnchorPoint::from_entries(4, 8, &target, &reference);
    assert_eq!(anchor.offset_ms, 1500);

    let mapping = TimeMapping::new(vec![anchor]);
    // Single-anchor fallback: constant offset everywhere
    assert_eq!(mapping.map_time(0), 1500);
    assert_eq!(mapping.map_time(12000), 13500);
}
