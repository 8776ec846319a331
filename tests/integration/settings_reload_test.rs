// Settings are re-read every cycle; bad values fall back to defaults

use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uptime_monitor::core::monitor::{
    Device, FileSettings, FixedSettings, Monitor, MonitorEvent, RawSettings, RawValue,
    SharedSettings,
};

use super::support::{
    advance, capabilities, count_unresponsive, NotifyBehavior, RecordingNotifier, ScriptedProber,
};

fn fallbacks(sink: &uptime_monitor::core::monitor::MemorySink) -> usize {
    sink.count(|e| matches!(e, MonitorEvent::SettingsFallback { .. }))
}

#[tokio::test(start_paused = true)]
async fn test_interval_change_applies_next_cycle() {
    let prober = ScriptedProber::always(true);
    let (caps, sink) = capabilities(prober.clone(), RecordingNotifier::new(NotifyBehavior::Succeed));
    let settings = SharedSettings::new(RawSettings::default());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.1", None)], Arc::new(settings.clone()))
        .unwrap();

    advance(7.0).await;
    assert_eq!(prober.calls(), 3);

    // Sleep already in progress ends at 9s, then cycles every second
    settings.set_poll_interval(1u64);
    advance(5.5).await;
    monitor.stop().await;

    assert_eq!(prober.calls(), 7);
    assert_eq!(fallbacks(&sink), 0);
}

#[tokio::test(start_paused = true)]
async fn test_threshold_change_applies_to_ongoing_outage() {
    let prober = ScriptedProber::always(false);
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(prober, notifier.clone());
    let settings = SharedSettings::new(RawSettings::default());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.1", None)], Arc::new(settings.clone()))
        .unwrap();

    advance(4.0).await;
    settings.set_threshold(5u64);

    // Cycle at 6s sees 6s of downtime against the new 5s threshold
    advance(2.5).await;
    monitor.stop().await;

    assert_eq!(count_unresponsive(&sink), 1);
    assert_eq!(notifier.alerts()[0].threshold, Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_malformed_values_use_both_defaults() {
    let prober = ScriptedProber::always(true);
    let (caps, sink) = capabilities(prober.clone(), RecordingNotifier::new(NotifyBehavior::Succeed));
    let raw = RawSettings {
        poll_interval: RawValue::from("1"),
        threshold: RawValue::from("soon"),
    };

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.1", None)], Arc::new(FixedSettings(raw)))
        .unwrap();

    // The valid 1s interval is ignored too; cycles run every 3s
    advance(7.0).await;
    monitor.stop().await;

    assert_eq!(prober.calls(), 3);
    assert_eq!(fallbacks(&sink), 3);
    assert!(sink
        .lines()
        .iter()
        .any(|l| l.contains("Invalid configuration values - using defaults")));
}

#[tokio::test(start_paused = true)]
async fn test_non_positive_values_fall_back() {
    let prober = ScriptedProber::always(true);
    let (caps, sink) = capabilities(prober.clone(), RecordingNotifier::new(NotifyBehavior::Succeed));
    let settings = SharedSettings::new(RawSettings::default());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.1", None)], Arc::new(settings.clone()))
        .unwrap();

    advance(1.0).await;
    settings.set_poll_interval(RawValue::Number(0.0));
    advance(3.0).await;
    settings.set_poll_interval(RawValue::Number(-2.0));
    advance(3.0).await;
    settings.set_poll_interval(2u64);
    advance(4.5).await;
    monitor.stop().await;

    // Cycles at 3s and 6s fall back; 9s and 11s use the 2s interval
    assert_eq!(fallbacks(&sink), 2);
    assert_eq!(prober.calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_file_settings_follow_edits() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"poll_interval": 3, "threshold": 10}"#).unwrap();

    let prober = ScriptedProber::always(true);
    let (caps, sink) = capabilities(prober.clone(), RecordingNotifier::new(NotifyBehavior::Succeed));

    let mut monitor = Monitor::new(caps);
    monitor
        .start(
            vec![Device::new("10.0.0.1", None)],
            Arc::new(FileSettings::new(&path)),
        )
        .unwrap();

    advance(1.0).await;
    fs::write(&path, r#"{"poll_interval": "fast", "threshold": 10}"#).unwrap();
    advance(3.0).await;
    assert_eq!(fallbacks(&sink), 1);

    fs::remove_file(&path).unwrap();
    advance(3.0).await;
    assert_eq!(fallbacks(&sink), 2);

    fs::write(&path, r#"{"poll_interval": 1, "threshold": 10}"#).unwrap();
    advance(3.5).await;
    monitor.stop().await;

    // Cycles at 0, 3, 6, 9, 10
    assert_eq!(fallbacks(&sink), 2);
    assert_eq!(prober.calls(), 5);
}
