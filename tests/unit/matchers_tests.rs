/*!
 * Tests for entry matcher implementations
 */

use std::sync::Arc;

use anchorsync::matchers::mock::MockMatcher;
use anchorsync::matchers::openai::OpenAiMatcher;
use anchorsync::matchers::{EntryMatcher, MatchPair, MatchRequest};
use anchorsync::subtitle_processor::SubtitleEntry;

fn sample_request() -> MatchRequest {
    let reference: Vec<SubtitleEntry> = (0..6)
        .map(|i| SubtitleEntry::new(i + 1, i as u64 * 2000, i as u64 * 2000 + 1500, format!("ref {}", i)))
        .collect();
    let targets: Vec<SubtitleEntry> = (0..3)
        .map(|i| SubtitleEntry::new(i + 1, i as u64 * 2000, i as u64 * 2000 + 1500, format!("tgt {}", i)))
        .collect();

    MatchRequest::from_slices(&reference, 0, &targets, 2, 80)
}

/// Models sometimes wrap the array or decorate it; every accepted shape must
/// yield the same pairs
#[test]
fn test_parse_match_content_withEquivalentShapes_shouldAgree() {
    let expected = vec![
        MatchPair { target_idx: 2, ref_idx: 2 },
        MatchPair { target_idx: 3, ref_idx: 4 },
    ];

    let shapes = [
        r#"[{"tgt": 2, "ref": 2}, {"tgt": 3, "ref": 4}]"#,
        r#"{"matches": [{"tgt": 2, "ref": 2}, {"tgt": 3, "ref": 4}]}"#,
        r#"{"results": [{"tgt": 2, "ref": 2}, {"tgt": 3, "ref": 4}]}"#,
        r#"{"pairs": [{"tgt": 2, "ref": 2}, {"tgt": 3, "ref": 4}]}"#,
    ];

    for shape in shapes {
        assert_eq!(OpenAiMatcher::parse_match_content(shape), expected, "shape: {}", shape);
    }
}

/// Prose, empty bodies and non-object elements all degrade to zero pairs
#[test]
fn test_parse_match_content_withDegenerateBodies_shouldReturnEmpty() {
    for body in ["", "no matches found", "null", "42", "{}", "[1, 2, 3]"] {
        assert!(
            OpenAiMatcher::parse_match_content(body).is_empty(),
            "body: {:?}",
            body
        );
    }
}

/// The mock identity matcher honors the absolute tags of the request
#[tokio::test]
async fn test_mock_identity_withOffsetTargets_shouldPairSharedTags() {
    let matcher = MockMatcher::identity();
    let request = sample_request();

    // Target tags are 2..5; reference tags are 0..6, so 2, 3 and 4 overlap
    let pairs = matcher.match_entries(&request).await.unwrap();
    assert_eq!(pairs.len(), 3);
    assert!(pairs.iter().all(|p| p.target_idx == p.ref_idx));
}

/// Mock matchers can be shared across tasks through the trait object
#[tokio::test]
async fn test_mock_matcher_asTraitObject_shouldCountCalls() {
    let mock = MockMatcher::empty();
    let counter = mock.clone();
    let matcher: Arc<dyn EntryMatcher> = Arc::new(mock);

    let request = sample_request();
    for _ in 0..4 {
        let pairs = matcher.match_entries(&request).await.unwrap();
        assert!(pairs.is_empty());
    }

    assert_eq!(counter.call_count(), 4);
}
