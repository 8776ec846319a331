// End-to-end polling behavior on paused time with scripted probes

use std::sync::Arc;
use std::time::Duration;
use uptime_monitor::core::monitor::{
    Device, FixedSettings, Monitor, MonitorEvent, RawSettings, SettingsSource,
};

use super::support::{
    advance, capabilities, count_recovered, count_unresponsive, ErroringProber, HangingProber,
    NotifyBehavior, PanickingProber, RecordingNotifier, ScriptedProber,
};

fn default_settings() -> Arc<dyn SettingsSource> {
    Arc::new(FixedSettings(RawSettings::default()))
}

#[tokio::test(start_paused = true)]
async fn test_healthy_device_never_alerts() {
    let prober = ScriptedProber::always(true);
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(prober.clone(), notifier.clone());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.1", None)], default_settings())
        .unwrap();

    // Cycles at 0, 3, 6, 9 and 12 seconds
    advance(13.5).await;
    monitor.stop().await;

    assert_eq!(prober.calls(), 5);
    assert_eq!(count_unresponsive(&sink), 0);
    assert_eq!(count_recovered(&sink), 0);
    assert!(notifier.alerts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_down_device_alerts_once_after_threshold() {
    let prober = ScriptedProber::always(false);
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(prober, notifier.clone());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(
            vec![Device::new("10.0.0.2", Some("aa:bb:cc:dd:ee:ff".into()))],
            default_settings(),
        )
        .unwrap();

    advance(10.5).await;
    assert_eq!(count_unresponsive(&sink), 0);
    assert_eq!(
        sink.count(|e| matches!(e, MonitorEvent::StillDown { .. })),
        4
    );

    // Fifth cycle at 12s is the first with downtime above 10s
    advance(2.0).await;
    assert_eq!(count_unresponsive(&sink), 1);
    assert_eq!(
        sink.count(|e| matches!(e, MonitorEvent::NotificationSent { .. })),
        1
    );

    // Still down at 15s and 18s, no further alerts
    advance(7.0).await;
    monitor.stop().await;

    assert_eq!(count_unresponsive(&sink), 1);
    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].address, "10.0.0.2");
    assert_eq!(alerts[0].identifier, "aa:bb:cc:dd:ee:ff");
    assert_eq!(alerts[0].downtime, Duration::from_secs(12));
    assert_eq!(alerts[0].threshold, Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_recovery_resets_latch() {
    let prober = ScriptedProber::new(|_, elapsed| elapsed >= Duration::from_secs(21));
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(prober, notifier.clone());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.2", None)], default_settings())
        .unwrap();
    let snapshots = monitor.snapshots().unwrap();

    advance(19.5).await;
    assert!(snapshots.borrow()[0].notified);

    advance(2.0).await;
    assert_eq!(count_recovered(&sink), 1);
    let recovered = sink
        .events()
        .into_iter()
        .find_map(|e| match e.event {
            MonitorEvent::Recovered { downtime, .. } => Some(downtime),
            _ => None,
        })
        .unwrap();
    assert_eq!(recovered, Duration::from_secs(21));

    let snapshot = snapshots.borrow().clone();
    assert!(!snapshot[0].notified);
    assert_eq!(snapshot[0].unseen_secs, 0.0);

    advance(9.0).await;
    monitor.stop().await;

    assert_eq!(count_recovered(&sink), 1);
    assert_eq!(notifier.alerts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_second_outage_alerts_again() {
    // Down until 21s, up until 30s, then down for good
    let prober = ScriptedProber::new(|_, elapsed| {
        elapsed >= Duration::from_secs(21) && elapsed < Duration::from_secs(30)
    });
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(prober, notifier.clone());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.2", None)], default_settings())
        .unwrap();

    // Last seen at 27s, so the second alert comes at 39s
    advance(40.0).await;
    monitor.stop().await;

    assert_eq!(count_unresponsive(&sink), 2);
    assert_eq!(notifier.alerts().len(), 2);
    assert_eq!(notifier.alerts()[1].downtime, Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_failed_notification_does_not_disturb_polling() {
    let prober = ScriptedProber::always(false);
    let notifier = RecordingNotifier::new(NotifyBehavior::Fail);
    let (caps, sink) = capabilities(prober.clone(), notifier);

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.3", None)], default_settings())
        .unwrap();

    advance(19.5).await;
    monitor.stop().await;

    // Cycles at 0, 3, 6, 9, 12, 15 and 18 seconds
    assert_eq!(prober.calls(), 7);
    assert_eq!(count_unresponsive(&sink), 1);
    assert_eq!(
        sink.count(|e| matches!(e, MonitorEvent::NotificationFailed { .. })),
        1
    );
    assert!(sink
        .lines()
        .iter()
        .any(|l| l.contains("Failed to send notification for 10.0.0.3")));
}

#[tokio::test(start_paused = true)]
async fn test_panicking_notifier_is_contained() {
    let prober = ScriptedProber::always(false);
    let notifier = RecordingNotifier::new(NotifyBehavior::Panic);
    let (caps, sink) = capabilities(prober.clone(), notifier);

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.3", None)], default_settings())
        .unwrap();

    advance(19.5).await;
    assert!(monitor.is_running());
    monitor.stop().await;

    assert_eq!(prober.calls(), 7);
    assert_eq!(
        sink.count(|e| matches!(e, MonitorEvent::NotificationFailed { .. })),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_devices_are_tracked_independently() {
    let prober = ScriptedProber::new(|address, _| address != "10.0.0.9");
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(prober.clone(), notifier.clone());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(
            vec![
                Device::new("10.0.0.1", None),
                Device::new("10.0.0.9", None),
                Device::new("10.0.0.5", None),
            ],
            default_settings(),
        )
        .unwrap();

    advance(13.5).await;
    let snapshot = monitor.snapshots().unwrap().borrow().clone();
    monitor.stop().await;

    assert_eq!(prober.calls(), 15);
    assert_eq!(notifier.alerts().len(), 1);
    assert_eq!(notifier.alerts()[0].address, "10.0.0.9");
    assert_eq!(count_unresponsive(&sink), 1);

    let addresses: Vec<&str> = snapshot.iter().map(|s| s.address.as_str()).collect();
    assert_eq!(addresses, ["10.0.0.1", "10.0.0.9", "10.0.0.5"]);
    assert!(!snapshot[0].notified);
    assert!(snapshot[1].notified);
    assert!(!snapshot[2].notified);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_prober_counts_as_unreachable() {
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(
        Arc::new(PanickingProber {
            bad_address: "10.0.0.66",
        }),
        notifier.clone(),
    );

    let mut monitor = Monitor::new(caps);
    monitor
        .start(
            vec![Device::new("10.0.0.66", None), Device::new("10.0.0.1", None)],
            default_settings(),
        )
        .unwrap();

    // Cycles at 0, 3, ..., 30 seconds
    advance(30.5).await;
    assert!(monitor.is_running());
    monitor.stop().await;

    let faults = sink.count(|e| {
        matches!(e, MonitorEvent::DeviceFault { address, .. } if address == "10.0.0.66")
    });
    assert_eq!(faults, 11);
    assert!(sink.lines()[2].contains("Error in monitoring loop for 10.0.0.66"));

    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].address, "10.0.0.66");
    assert_eq!(alerts[0].downtime, Duration::from_secs(12));
    assert_eq!(count_unresponsive(&sink), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failing_check_is_logged_and_counts_as_unreachable() {
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(Arc::new(ErroringProber), notifier.clone());

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.7", None)], default_settings())
        .unwrap();

    // Cycles at 0, 3, 6, 9, 12, 15 and 18 seconds
    advance(19.5).await;
    monitor.stop().await;

    let errors: Vec<String> = sink
        .lines()
        .into_iter()
        .filter(|l| l.contains("Error probing 10.0.0.7: "))
        .collect();
    assert_eq!(errors.len(), 7);
    assert!(errors[0].contains("no route to host"));

    assert_eq!(count_unresponsive(&sink), 1);
    assert_eq!(notifier.alerts().len(), 1);
    assert_eq!(notifier.alerts()[0].downtime, Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_hanging_probe_times_out_as_unreachable() {
    let notifier = RecordingNotifier::new(NotifyBehavior::Succeed);
    let (caps, sink) = capabilities(Arc::new(HangingProber), notifier.clone());
    let caps = caps.with_probe_timeout(Duration::from_secs(1));

    let mut monitor = Monitor::new(caps);
    monitor
        .start(vec![Device::new("10.0.0.4", None)], default_settings())
        .unwrap();

    // Probes end at 1, 5, 9 and 13 seconds
    advance(12.5).await;
    assert_eq!(count_unresponsive(&sink), 0);

    advance(1.0).await;
    monitor.stop().await;

    assert_eq!(count_unresponsive(&sink), 1);
    assert_eq!(notifier.alerts()[0].downtime, Duration::from_secs(13));
    assert_eq!(
        sink.count(|e| matches!(e, MonitorEvent::ProbeFailed { .. })),
        0
    );
}
