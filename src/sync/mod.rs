/*!
 * Anchor-point based subtitle timing synchronization.
 *
 * The pipeline: sample anchor groups from the target track (`sampler`), ask
 * the entry matcher to pair them with reference entries (`adapter`), curate
 * the resulting anchors with a robust outlier filter (`anchors`), build a
 * piecewise-linear time mapping (`mapper`), and retime every target entry
 * (`engine`).
 */

pub mod adapter;
pub mod anchors;
pub mod engine;
pub mod mapper;
pub mod sampler;

pub use anchors::AnchorPoint;
pub use engine::{SyncEngine, SyncReport};
pub use mapper::TimeMapping;
