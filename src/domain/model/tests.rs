// Unit tests for domain models

use super::*;

#[test]
fn test_frame_rate_parse_rational() {
    let rate = FrameRate::parse("30000/1001").unwrap();
    assert_eq!(rate.num, 30000);
    assert_eq!(rate.den, 1001);
    assert!((rate.as_f64() - 29.97).abs() < 0.01);
}

#[test]
fn test_frame_rate_parse_integer() {
    assert_eq!(FrameRate::parse("25"), FrameRate::new(25, 1));
}

#[test]
fn test_frame_rate_invalid_falls_back() {
    assert_eq!(FrameRate::parse_or_default("0/0"), FrameRate::default());
    assert_eq!(FrameRate::parse_or_default("30/0"), FrameRate::default());
    assert_eq!(FrameRate::parse_or_default("abc"), FrameRate::default());
    assert_eq!(FrameRate::default().as_f64(), 30.0);
}

#[test]
fn test_frame_rate_display() {
    assert_eq!(FrameRate::new(24, 1).unwrap().to_string(), "24");
    assert_eq!(FrameRate::new(24000, 1001).unwrap().to_string(), "24000/1001");
}

#[test]
fn test_assumed_media_info() {
    let info = MediaInfo::assumed();
    assert!(info.assumed);
    assert_eq!(info.duration, FALLBACK_DURATION_SECS);
    assert_eq!(info.frame_rate.as_f64(), 30.0);
    assert!(info.has_audio());
}

#[test]
fn test_has_audio_follows_probe() {
    let mut info = MediaInfo::assumed();
    info.assumed = false;
    assert!(!info.has_audio());
    info.audio_codec = Some("aac".to_string());
    assert!(info.has_audio());
}

#[test]
fn test_issue_set_flags() {
    let mut issues = IssueSet::default();
    assert_eq!(
        issues.flags(),
        IssueFlags { has_freezes: false, has_container_issue: false, needs_reencode: false }
    );

    issues.timestamp_bad = true;
    assert!(issues.has_container_issue());

    issues.timestamp_bad = false;
    issues.moov_late = true;
    issues.freezes.push(FreezeInterval::new(1.0, 5.0));
    let flags = issues.flags();
    assert!(flags.has_freezes);
    assert!(flags.has_container_issue);
    assert!(!flags.needs_reencode);
}

#[test]
fn test_interval_and_segment_duration() {
    assert_eq!(FreezeInterval::new(10.0, 14.5).duration(), 4.5);
    assert_eq!(Segment::new(2.0, 3.0).duration(), 1.0);
}

#[test]
fn test_strategy_names_and_steps() {
    assert_eq!(RepairStrategy::FullFix.to_string(), "full_fix");
    assert_eq!(RepairStrategy::Light.as_str(), "light");
    assert_eq!(RepairStrategy::FullFix.steps().len(), 3);
    assert_eq!(RepairStrategy::Light.steps(), &["1. Light optimization"]);
}
