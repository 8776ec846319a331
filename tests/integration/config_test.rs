use std::fs;
use tempfile::TempDir;
use uptime_monitor::core::config::{Config, ProbeMethod};
use uptime_monitor::core::monitor::{
    resolve, Device, DeviceList, FileSettings, RawValue, SettingsSource, UNKNOWN_IDENTIFIER,
};
use uptime_monitor::MonitorError;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.devices.is_empty());
    assert!(config.webhook_url.is_none());
    assert_eq!(config.probe, ProbeMethod::Ping);
}

#[test]
fn test_config_load_nonexistent_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&temp_dir.path().join("missing.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_roundtrip_with_devices() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.add_device(Device::new("192.168.1.10", Some("00:11:22:33:44:55".into())));
    config.add_device(Device::new("192.168.1.11", None));
    config.threshold = RawValue::Number(30.0);
    config.webhook_url = Some("https://hooks.example.com/alerts".into());
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path);
    assert_eq!(loaded, config);
    assert_eq!(loaded.devices[1].identifier, UNKNOWN_IDENTIFIER);

    let list = loaded.device_list().unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn test_hand_edited_config_is_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "devices": [
                {"address": "10.1.1.1", "identifier": "printer"},
                {"address": "10.1.1.2"}
            ],
            "poll_interval": "5",
            "threshold": 20,
            "probe": {"kind": "tcp", "port": 9100},
            "alert": {"subject": "Printer offline", "recipients": "ops@example.com, it@example.com"}
        }"#,
    )
    .unwrap();

    let config = Config::read_from(&path).unwrap();
    assert_eq!(config.probe, ProbeMethod::Tcp { port: 9100 });
    assert_eq!(config.devices[1].identifier, UNKNOWN_IDENTIFIER);
    assert_eq!(config.alert.subject, "Printer offline");
    assert_eq!(config.alert.recipient_list().len(), 2);

    let resolved = resolve(FileSettings::new(&path).read());
    assert!(resolved.fallback.is_none());
    assert_eq!(resolved.settings.poll_interval.as_secs(), 5);
    assert_eq!(resolved.settings.threshold.as_secs(), 20);
}

#[test]
fn test_config_with_duplicate_devices_fails_validation() {
    let config = Config {
        devices: vec![Device::new("10.0.0.1", None), Device::new("10.0.0.1", None)],
        ..Default::default()
    };
    assert!(matches!(
        config.device_list(),
        Err(MonitorError::DuplicateDevice(_))
    ));
}

#[test]
fn test_devices_file_parsing() {
    let text = "\
# office network
192.168.0.1   aa:aa:aa:aa:aa:01
192.168.0.2

192.168.0.3   aa:aa:aa:aa:aa:03
";
    let list = DeviceList::parse(text).unwrap();
    let devices: Vec<String> = list.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        devices,
        [
            "192.168.0.1 (aa:aa:aa:aa:aa:01)",
            "192.168.0.2 (Unknown)",
            "192.168.0.3 (aa:aa:aa:aa:aa:03)",
        ]
    );
}

#[test]
fn test_devices_file_rejects_extra_columns() {
    let result = DeviceList::parse("10.0.0.1 aa:bb extra\n");
    assert!(matches!(result, Err(MonitorError::InvalidDevice(_))));
}

#[test]
fn test_paired_columns() {
    let addresses = ["10.0.0.1", "", "10.0.0.2", "10.0.0.3"];
    let identifiers = ["mac-1", "mac-2"];

    let list = DeviceList::from_columns(&addresses, &identifiers).unwrap();
    let ids: Vec<&str> = list.iter().map(|d| d.identifier.as_str()).collect();
    assert_eq!(ids, ["mac-1", "mac-2", UNKNOWN_IDENTIFIER]);
}
