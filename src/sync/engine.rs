use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use log::{debug, info};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::app_config::SyncConfig;
use crate::errors::SyncError;
use crate::matchers::EntryMatcher;
use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};
use crate::sync::adapter;
use crate::sync::anchors::{curate_anchors, AnchorPoint};
use crate::sync::mapper::TimeMapping;
use crate::sync::sampler::sample_groups;

// @module: Sync orchestration - parse, match, curate, map, apply, write

/// Minimum visible duration substituted when retiming collapses an interval
const MIN_ENTRY_DURATION_MS: u64 = 100;

/// Progress notification: (completed groups, total groups)
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Summary statistics of a successful synchronization run.
///
/// Offset figures are diagnostic only; nothing downstream branches on them.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Number of entries written to the output
    pub entries_synced: usize,
    /// Reference entries parsed
    pub total_ref_entries: usize,
    /// Target entries parsed
    pub total_target_entries: usize,
    /// Anchors surviving curation
    pub anchors_found: usize,
    /// Average surviving anchor offset, ms
    pub avg_offset_ms: i64,
    /// Minimum surviving anchor offset, ms
    pub min_offset_ms: i64,
    /// Maximum surviving anchor offset, ms
    pub max_offset_ms: i64,
    /// Path the retimed subtitle was written to
    pub output_file: String,
}

/// Estimate of a synchronization run, produced without any matcher calls
#[derive(Debug, Clone, Serialize)]
pub struct SyncEstimate {
    /// Reference entries parsed
    pub ref_entries: usize,
    /// Target entries parsed
    pub target_entries: usize,
    /// Matcher calls a run would make
    pub estimated_api_calls: usize,
}

/// Anchor-point based subtitle timing synchronization engine.
///
/// Each run owns its own entry lists, anchors and mapping; nothing is shared
/// across concurrent runs and nothing outlives a single `sync_files` call.
pub struct SyncEngine {
    /// Sampling and mapping parameters
    config: SyncConfig,
    /// Injected content-matching capability
    matcher: Arc<dyn EntryMatcher>,
    /// Optional per-group progress notifications
    progress: Option<ProgressCallback>,
}

impl SyncEngine {
    /// Create an engine with the given configuration and matcher
    pub fn new(config: SyncConfig, matcher: Arc<dyn EntryMatcher>) -> Self {
        SyncEngine {
            config,
            matcher,
            progress: None,
        }
    }

    /// Attach a progress callback invoked after each anchor group completes
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sync target subtitle timing against a reference subtitle.
    ///
    /// # Arguments
    /// * `reference_path` - SRT with trusted timing
    /// * `target_path` - SRT whose text is wanted but whose timing needs correction
    /// * `output_path` - Where the retimed SRT is written
    pub async fn sync_files(
        &self,
        reference_path: &Path,
        target_path: &Path,
        output_path: &Path,
    ) -> Result<SyncReport> {
        info!(
            "Syncing subtitle timing: ref={:?} -> target={:?}",
            reference_path.file_name().unwrap_or_default(),
            target_path.file_name().unwrap_or_default()
        );

        let ref_entries = Arc::new(SubtitleTrack::from_file(reference_path)?.entries);
        let target_entries = Arc::new(SubtitleTrack::from_file(target_path)?.entries);

        if ref_entries.is_empty() {
            return Err(SyncError::EmptyReference.into());
        }
        if target_entries.is_empty() {
            return Err(SyncError::EmptyTarget.into());
        }

        info!(
            "Parsed: {} reference entries, {} target entries",
            ref_entries.len(),
            target_entries.len()
        );

        // Step 1: find anchor points via the matcher, then curate
        let raw_anchors = self.find_anchor_points(&ref_entries, &target_entries).await;
        let anchors = curate_anchors(raw_anchors, self.config.max_deviation_factor);

        if anchors.len() < 2 {
            return Err(SyncError::NotEnoughAnchors { found: anchors.len() }.into());
        }

        info!("Found {} anchor points for time mapping", anchors.len());

        // Step 2: build the time mapping
        let offsets: Vec<i64> = anchors.iter().map(|a| a.offset_ms).collect();
        let mapping = TimeMapping::new(anchors);

        // Step 3: apply the correction to every target entry
        let synced_entries = Self::apply_time_correction(&target_entries, &mapping);

        // Step 4: write output
        SubtitleTrack::write_to_srt(&synced_entries, output_path)?;
        info!("Synced subtitle saved to: {}", output_path.display());

        let avg_offset = offsets.iter().sum::<i64>() as f64 / offsets.len() as f64;

        Ok(SyncReport {
            entries_synced: synced_entries.len(),
            total_ref_entries: ref_entries.len(),
            total_target_entries: target_entries.len(),
            anchors_found: mapping.anchor_count(),
            avg_offset_ms: avg_offset.round() as i64,
            min_offset_ms: offsets.iter().copied().min().unwrap_or(0),
            max_offset_ms: offsets.iter().copied().max().unwrap_or(0),
            output_file: output_path.display().to_string(),
        })
    }

    /// Estimate a sync operation without calling the matcher
    pub fn estimate(&self, reference_path: &Path, target_path: &Path) -> Result<SyncEstimate> {
        let ref_entries = SubtitleTrack::from_file(reference_path)?.entries;
        let target_entries = SubtitleTrack::from_file(target_path)?.entries;

        let groups = sample_groups(target_entries.len(), ref_entries.len(), &self.config);

        Ok(SyncEstimate {
            ref_entries: ref_entries.len(),
            target_entries: target_entries.len(),
            estimated_api_calls: groups.len(),
        })
    }

    /// Fan the sampled groups out to the matcher and gather all anchors.
    ///
    /// Groups read disjoint slices of the immutable entry lists, so they run
    /// concurrently under a semaphore; completion order is irrelevant because
    /// the curator re-sorts by target time.
    async fn find_anchor_points(
        &self,
        ref_entries: &Arc<Vec<SubtitleEntry>>,
        target_entries: &Arc<Vec<SubtitleEntry>>,
    ) -> Vec<AnchorPoint> {
        let groups = sample_groups(target_entries.len(), ref_entries.len(), &self.config);
        let total_groups = groups.len();
        debug!("Sampled {} anchor groups", total_groups);

        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_groups));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::with_capacity(total_groups);
        for group in groups {
            let matcher = Arc::clone(&self.matcher);
            let config = self.config.clone();
            let ref_entries = Arc::clone(ref_entries);
            let target_entries = Arc::clone(target_entries);
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            let progress = self.progress.clone();

            tasks.push(tokio::spawn(async move {
                // Acquire a permit to bound concurrent matcher calls
                let Ok(_permit) = semaphore.acquire().await else {
                    return Vec::new();
                };

                debug!(
                    "Anchor group {}: target[{}..{}] vs ref[{}..{}]",
                    group.group_idx + 1,
                    group.target_range.start,
                    group.target_range.end,
                    group.ref_range.start,
                    group.ref_range.end
                );

                let anchors =
                    adapter::match_group(&matcher, &group, &target_entries, &ref_entries, &config)
                        .await;

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(progress) = progress {
                    progress(done, total_groups);
                }

                anchors
            }));
        }

        // Gather every group result before curation runs
        join_all(tasks)
            .await
            .into_iter()
            .filter_map(|result| result.ok())
            .flatten()
            .collect()
    }

    /// Retime every target entry through the mapping.
    ///
    /// Collapsed or inverted intervals (possible near extrapolation
    /// boundaries) get the original duration back, floored at 100ms, so
    /// every entry stays visible.
    fn apply_time_correction(
        target_entries: &[SubtitleEntry],
        mapping: &TimeMapping,
    ) -> Vec<SubtitleEntry> {
        target_entries
            .iter()
            .map(|entry| {
                let new_start = mapping.map_time(entry.start_time_ms).max(0) as u64;
                let mapped_end = mapping.map_time(entry.end_time_ms);

                let new_end = if mapped_end <= new_start as i64 {
                    let duration = entry.end_time_ms.saturating_sub(entry.start_time_ms);
                    new_start + duration.max(MIN_ENTRY_DURATION_MS)
                } else {
                    mapped_end as u64
                };

                SubtitleEntry::new(entry.seq_num, new_start, new_end, entry.text.clone())
            })
            .collect()
    }
}
