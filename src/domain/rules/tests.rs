// Unit tests for business rules

use super::*;

const TOL: f64 = SEGMENT_TOLERANCE_SECS;

fn freeze(start: f64, end: f64) -> FreezeInterval {
    FreezeInterval::new(start, end)
}

fn media(pix_fmt: &str, profile: &str) -> MediaInfo {
    MediaInfo {
        duration: 120.0,
        audio_duration: 120.0,
        size_bytes: 1_000_000,
        frame_rate: FrameRate::default(),
        codec: "h264".to_string(),
        profile: profile.to_string(),
        pix_fmt: pix_fmt.to_string(),
        audio_codec: Some("aac".to_string()),
        assumed: false,
    }
}

/// Small deterministic generator so the property checks are reproducible
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn assert_segments_well_formed(duration: f64, freezes: &[FreezeInterval], segments: &[Segment]) {
    for pair in segments.windows(2) {
        assert!(pair[0].start < pair[1].start, "segments out of order: {:?}", segments);
        assert!(pair[0].end <= pair[1].start, "segments overlap: {:?}", segments);
    }

    // Union of kept and frozen ranges must leave no gap wider than the tolerance
    let mut ranges: Vec<(f64, f64)> = segments.iter().map(|s| (s.start, s.end)).collect();
    ranges.extend(freezes.iter().map(|f| (f.start, f.end)));
    ranges.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut covered = 0.0_f64;
    for (start, end) in ranges {
        assert!(
            start <= covered + TOL + 1e-9,
            "gap before {} (covered up to {}) for {:?} -> {:?}",
            start,
            covered,
            freezes,
            segments
        );
        covered = covered.max(end);
    }
    assert!(covered >= duration - TOL - 1e-9);
}

#[test]
fn test_no_freezes_yields_whole_duration() {
    let segments = SegmentCalculator::valid_segments(900.0, &[], TOL);
    assert_eq!(segments, vec![Segment::new(0.0, 900.0)]);
}

#[test]
fn test_single_freeze_in_middle() {
    let segments = SegmentCalculator::valid_segments(60.0, &[freeze(20.0, 30.0)], TOL);
    assert_eq!(segments, vec![Segment::new(0.0, 20.0), Segment::new(30.0, 60.0)]);
}

#[test]
fn test_freeze_at_start_and_end() {
    let segments =
        SegmentCalculator::valid_segments(100.0, &[freeze(0.0, 10.0), freeze(95.0, 99.8)], TOL);
    assert_eq!(segments, vec![Segment::new(10.0, 95.0)]);
}

#[test]
fn test_small_gaps_are_not_kept() {
    let segments =
        SegmentCalculator::valid_segments(50.0, &[freeze(0.3, 10.0), freeze(10.4, 20.0)], TOL);
    assert_eq!(segments, vec![Segment::new(20.0, 50.0)]);
}

#[test]
fn test_overlapping_out_of_order_freezes_merge() {
    let segments =
        SegmentCalculator::valid_segments(40.0, &[freeze(15.0, 25.0), freeze(10.0, 20.0)], TOL);
    assert_eq!(segments, vec![Segment::new(0.0, 10.0), Segment::new(25.0, 40.0)]);
}

#[test]
fn test_nested_freeze_does_not_move_cursor_back() {
    let segments =
        SegmentCalculator::valid_segments(60.0, &[freeze(10.0, 40.0), freeze(20.0, 25.0)], TOL);
    assert_eq!(segments, vec![Segment::new(0.0, 10.0), Segment::new(40.0, 60.0)]);
}

#[test]
fn test_fully_frozen_yields_nothing() {
    let segments = SegmentCalculator::valid_segments(30.0, &[freeze(0.0, 30.0)], TOL);
    assert!(segments.is_empty());
}

#[test]
fn test_random_freeze_sets_are_reconciled() {
    let mut rng = Lcg(42);
    for _ in 0..500 {
        let duration = 10.0 + rng.next_f64() * 990.0;
        let count = (rng.next_f64() * 8.0) as usize;
        let freezes: Vec<FreezeInterval> = (0..count)
            .map(|_| {
                let start = rng.next_f64() * duration;
                let end = (start + rng.next_f64() * duration * 0.3).min(duration);
                freeze(start, end)
            })
            .collect();

        let segments = SegmentCalculator::valid_segments(duration, &freezes, TOL);
        assert_segments_well_formed(duration, &freezes, &segments);
    }
}

#[test]
fn test_frozen_coverage_counts_overlap_once() {
    assert_eq!(SegmentCalculator::frozen_coverage(&[]), 0.0);
    assert_eq!(
        SegmentCalculator::frozen_coverage(&[freeze(15.0, 25.0), freeze(10.0, 20.0)]),
        15.0
    );
    assert_eq!(
        SegmentCalculator::frozen_coverage(&[freeze(0.0, 5.0), freeze(10.0, 12.0)]),
        7.0
    );
}

#[test]
fn test_spans_whole() {
    assert!(SegmentCalculator::spans_whole(&[Segment::new(0.0, 100.0)], 100.0, TOL));
    assert!(SegmentCalculator::spans_whole(&[Segment::new(0.2, 99.7)], 100.0, TOL));
    assert!(!SegmentCalculator::spans_whole(&[Segment::new(0.0, 80.0)], 100.0, TOL));
    assert!(!SegmentCalculator::spans_whole(
        &[Segment::new(0.0, 40.0), Segment::new(50.0, 100.0)],
        100.0,
        TOL
    ));
}

#[test]
fn test_strategy_table_covers_all_combinations() {
    let expected = [
        ((false, false, false), RepairStrategy::Light),
        ((false, false, true), RepairStrategy::FixCompatibility),
        ((false, true, false), RepairStrategy::FixCompatibility),
        ((false, true, true), RepairStrategy::FixCompatibility),
        ((true, false, false), RepairStrategy::RemoveFreeze),
        ((true, false, true), RepairStrategy::FullFix),
        ((true, true, false), RepairStrategy::FullFix),
        ((true, true, true), RepairStrategy::FullFix),
    ];

    for ((has_freezes, has_container_issue, needs_reencode), strategy) in expected {
        let flags = IssueFlags { has_freezes, has_container_issue, needs_reencode };
        assert_eq!(StrategySelector::select(flags), strategy, "flags: {:?}", flags);
        // Pure: same input, same answer
        assert_eq!(StrategySelector::select(flags), StrategySelector::select(flags));
    }

    // Every strategy is reachable from some combination of flags
    for strategy in RepairStrategy::ALL {
        assert!(
            expected.iter().any(|(_, s)| *s == strategy),
            "unreachable strategy: {:?}",
            strategy
        );
    }
}

#[test]
fn test_compatibility_accepts_standard_stream() {
    assert!(CompatibilityRules::check(&media("yuv420p", "High")).is_empty());
    assert!(CompatibilityRules::check(&media("yuv420p", "Baseline")).is_empty());
}

#[test]
fn test_compatibility_flags_pixel_format_and_profile() {
    let issues = CompatibilityRules::check(&media("yuv444p", "High 4:4:4 Predictive"));
    assert_eq!(
        issues,
        vec![
            CompatibilityIssue::PixelFormat("yuv444p".to_string()),
            CompatibilityIssue::Profile("High 4:4:4 Predictive".to_string()),
        ]
    );
}

#[test]
fn test_compatibility_skips_assumed_media() {
    assert!(CompatibilityRules::check(&MediaInfo::assumed()).is_empty());
}

#[test]
fn test_freeze_log_parsing() {
    let log = "\
[freezedetect @ 0x55d1] lavfi.freezedetect.freeze_start: 10.01
[freezedetect @ 0x55d1] lavfi.freezedetect.freeze_duration: 5.5
[freezedetect @ 0x55d1] lavfi.freezedetect.freeze_end: 15.51
frame= 1200 fps=300 q=-0.0 size=N/A time=00:00:40.00 bitrate=N/A speed=10x
[freezedetect @ 0x55d1] lavfi.freezedetect.freeze_start: 20
[freezedetect @ 0x55d1] lavfi.freezedetect.freeze_duration: 2.6
[freezedetect @ 0x55d1] lavfi.freezedetect.freeze_end: 22.6
[freezedetect @ 0x55d1] lavfi.freezedetect.freeze_start: 30.5
[freezedetect @ 0x55d1] lavfi.freezedetect.freeze_end: 40.0 extra
";
    let freezes = FreezeLogParser::parse(log, 3.0);
    assert_eq!(freezes, vec![freeze(10.01, 15.51), freeze(30.5, 40.0)]);
}

#[test]
fn test_freeze_log_ignores_unpaired_and_garbage() {
    let log = "\
lavfi.freezedetect.freeze_end: 5.0
lavfi.freezedetect.freeze_start: nope
lavfi.freezedetect.freeze_start: 50.0
";
    assert!(FreezeLogParser::parse(log, 3.0).is_empty());
}

#[test]
fn test_timestamp_anomaly_detection() {
    assert!(!TimestampRules::has_anomalies(""));
    assert!(!TimestampRules::has_anomalies("[h264 @ 0x1] error while decoding MB 3 4"));
    assert!(TimestampRules::has_anomalies(
        "[mp4 @ 0x1] Application provided invalid, non monotonically increasing DTS"
    ));
    assert!(TimestampRules::has_anomalies("Non-monotonic timestamps detected"));
    assert!(TimestampRules::has_anomalies("PTS out of order"));
}

#[test]
fn test_atom_layout_fast_start() {
    let mut header = vec![0u8; 16];
    header.extend_from_slice(b"\0\0\0\x08ftyp\0\0\x01\0moov");
    header.extend_from_slice(&[0u8; 64]);
    header.extend_from_slice(b"\0\0\x10\0mdat");
    let layout = AtomLayout::scan(&header);
    assert!(layout.moov.unwrap() < layout.mdat.unwrap());
    assert!(!layout.is_moov_late());
}

#[test]
fn test_atom_layout_moov_after_mdat() {
    let header = b"\0\0\0\x08ftyp\0\0\x10\0mdat....payload....\0\0\x01\0moov".to_vec();
    assert!(AtomLayout::scan(&header).is_moov_late());
}

#[test]
fn test_atom_layout_moov_missing() {
    let header = b"\0\0\0\x08ftyp\0\0\x10\0mdat".to_vec();
    assert!(AtomLayout::scan(&header).is_moov_late());
    // No payload seen in the header window either: still missing the index
    assert!(AtomLayout::scan(b"ftyp").is_moov_late());
    assert!(!AtomLayout::scan(b"ftypmoov").is_moov_late());
}
