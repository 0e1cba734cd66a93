//! Focus / Do Not Disturb detection.
//!
//! Reads the target user's notification preferences, newest format first:
//!
//! 1. `~/Library/DoNotDisturb/DB/{Assertions,ModeConfigurations}.json`
//!    (Focus modes, macOS 12+). Reports the mode name.
//! 2. `~/Library/Preferences/com.apple.ncprefs.plist` (macOS 11). Reports
//!    [`DO_NOT_DISTURB`].
//! 3. `~/Library/Preferences/ByHost/com.apple.notificationcenterui*.plist`
//!    (macOS 10.15). Reports [`DO_NOT_DISTURB`].
//!
//! With Focus modes, precedence from weakest to strongest is: a mode turned
//! on by a smart trigger, a scheduled mode whose window covers the current
//! time, a mode the user turned on by hand.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, Timelike};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Probe, ProbeReading};
use crate::error::{AvailableError, Result};

/// Value reported by the pre-Focus formats.
pub const DO_NOT_DISTURB: &str = "Do Not Disturb";

/// Seconds between the Unix epoch and 2001-01-01, the epoch of assertion
/// timestamps.
pub const APPLE_EPOCH_OFFSET: f64 = 978_307_200.0;

/// `enabledSetting` value of a schedule that is switched on.
const SCHEDULE_ENABLED: i64 = 2;

/// Assertion reason recorded when the user toggles a mode by hand.
const MANUAL_REASON: &str = "user-action";

const ASSERTIONS_PATH: &str = "Library/DoNotDisturb/DB/Assertions.json";
const MODES_PATH: &str = "Library/DoNotDisturb/DB/ModeConfigurations.json";
const NCPREFS_PATH: &str = "Library/Preferences/com.apple.ncprefs.plist";
const BYHOST_DIR: &str = "Library/Preferences/ByHost";
const BYHOST_PREFIX: &str = "com.apple.notificationcenterui";

/// Reports the active focus mode of one user.
pub struct FocusProbe {
    home: Option<PathBuf>,
    now: Option<DateTime<FixedOffset>>,
}

impl FocusProbe {
    /// Probe the user whose home is `home`. Without a home nothing is active.
    pub fn new(home: Option<PathBuf>) -> Self {
        Self { home, now: None }
    }

    /// Evaluate schedules at a fixed time instead of the local clock.
    pub fn at(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = Some(now);
        self
    }

    /// Current mode name, or empty when no mode is active.
    pub fn mode(&self) -> String {
        let Some(home) = &self.home else {
            return String::new();
        };

        let assertions = home.join(ASSERTIONS_PATH);
        let modes = home.join(MODES_PATH);
        if assertions.exists() && modes.exists() {
            let now = self.now.unwrap_or_else(|| Local::now().fixed_offset());
            return focus_mode(&assertions, &modes, now);
        }

        let ncprefs = home.join(NCPREFS_PATH);
        if ncprefs.exists() {
            return dnd_value(ncprefs_enabled(&ncprefs), &ncprefs);
        }

        if let Some(byhost) = find_byhost_prefs(&home.join(BYHOST_DIR)) {
            return dnd_value(byhost_enabled(&byhost), &byhost);
        }

        String::new()
    }
}

impl Probe for FocusProbe {
    fn read(&self) -> ProbeReading {
        ProbeReading::Value(self.mode())
    }
}

fn dnd_value(enabled: Result<bool>, path: &Path) -> String {
    match enabled {
        Ok(true) => DO_NOT_DISTURB.to_string(),
        Ok(false) => String::new(),
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            String::new()
        }
    }
}

// --- Focus modes (JSON) ---

#[derive(Debug, Default, Deserialize)]
struct AssertionFile {
    #[serde(default)]
    data: Vec<AssertionStore>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssertionStore {
    #[serde(default)]
    store_assertion_records: Vec<AssertionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssertionRecord {
    assertion_details: AssertionDetails,
    #[serde(default)]
    assertion_start_date_timestamp: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssertionDetails {
    assertion_details_mode_identifier: String,
    #[serde(default)]
    assertion_details_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModeFile {
    #[serde(default)]
    data: Vec<ModeStore>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeStore {
    #[serde(default)]
    mode_configurations: BTreeMap<String, ModeConfiguration>,
}

#[derive(Debug, Default, Deserialize)]
struct ModeConfiguration {
    #[serde(default)]
    triggers: TriggerList,
    #[serde(default)]
    mode: Mode,
}

#[derive(Debug, Default, Deserialize)]
struct TriggerList {
    #[serde(default)]
    triggers: Vec<Trigger>,
}

#[derive(Debug, Default, Deserialize)]
struct Mode {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Trigger {
    enabled_setting: i64,
    time_period_start_time_hour: u32,
    time_period_start_time_minute: u32,
    time_period_end_time_hour: u32,
    time_period_end_time_minute: u32,
}

impl Trigger {
    fn window(&self) -> Window {
        Window {
            start: minute_of_day(
                self.time_period_start_time_hour,
                self.time_period_start_time_minute,
            ),
            end: minute_of_day(
                self.time_period_end_time_hour,
                self.time_period_end_time_minute,
            ),
        }
    }
}

fn minute_of_day(hour: u32, minute: u32) -> u32 {
    hour.saturating_mul(60).saturating_add(minute)
}

/// Daily time window in minutes after midnight; `start > end` wraps past
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    start: u32,
    end: u32,
}

impl Window {
    fn contains(&self, minute: u32) -> bool {
        if self.start < self.end {
            minute >= self.start && minute < self.end
        } else if self.start > self.end {
            minute >= self.start || minute < self.end
        } else {
            false
        }
    }

    /// Whether a smart trigger at `minute` fired before this window began.
    /// Same-day windows compare against the start only.
    fn began_after(&self, minute: u32) -> bool {
        if self.start < self.end {
            minute < self.start
        } else {
            !self.contains(minute)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| AvailableError::Decoder {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn focus_mode(assertions: &Path, modes: &Path, now: DateTime<FixedOffset>) -> String {
    let modes: ModeFile = match read_json(modes) {
        Ok(modes) => modes,
        Err(e) => {
            tracing::warn!("Ignoring focus configuration: {}", e);
            return String::new();
        }
    };
    let Some(store) = modes.data.into_iter().next() else {
        return String::new();
    };

    // An unreadable assertion file only loses the manual/smart-trigger mode
    let assertions: AssertionFile = read_json(assertions).unwrap_or_else(|e| {
        tracing::warn!("Ignoring focus assertions: {}", e);
        AssertionFile::default()
    });
    let record = assertions
        .data
        .first()
        .and_then(|store| store.store_assertion_records.first());

    resolve_mode(record, &store.mode_configurations, now)
}

fn resolve_mode(
    record: Option<&AssertionRecord>,
    modes: &BTreeMap<String, ModeConfiguration>,
    now: DateTime<FixedOffset>,
) -> String {
    let mut focus = String::new();
    let mut smart_start = None;

    if let Some(record) = record {
        let details = &record.assertion_details;
        if let Some(config) = modes.get(&details.assertion_details_mode_identifier) {
            focus = config.mode.name.clone();
        }
        if details.assertion_details_reason.as_deref() == Some(MANUAL_REASON) {
            return focus;
        }
        smart_start = local_minute(record.assertion_start_date_timestamp, now.timezone());
    }

    let now_minute = now.hour() * 60 + now.minute();
    for config in modes.values() {
        let Some(trigger) = config.triggers.triggers.first() else {
            continue;
        };
        if trigger.enabled_setting != SCHEDULE_ENABLED {
            continue;
        }
        let window = trigger.window();
        if !window.contains(now_minute) {
            continue;
        }
        // A smart trigger that fired before this schedule began keeps priority
        match smart_start {
            Some(start) if start > 0 && window.began_after(start) => {}
            _ => focus = config.mode.name.clone(),
        }
    }

    focus
}

/// Minute of day at which an assertion timestamp falls in `tz`.
fn local_minute(apple_seconds: f64, tz: FixedOffset) -> Option<u32> {
    let unix = (apple_seconds + APPLE_EPOCH_OFFSET) as i64;
    let at = DateTime::from_timestamp(unix, 0)?.with_timezone(&tz);
    Some(at.hour() * 60 + at.minute())
}

// --- Do Not Disturb (plist) ---

fn read_plist(path: &Path) -> Result<plist::Dictionary> {
    let bytes = fs::read(path)?;
    plist_from_bytes(&bytes, path)
}

fn plist_from_bytes(bytes: &[u8], path: &Path) -> Result<plist::Dictionary> {
    plist::from_bytes(bytes).map_err(|e| AvailableError::Decoder {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn decoder_error(path: &Path, message: &str) -> AvailableError {
    AvailableError::Decoder {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// `dnd_prefs` is a property list embedded as data in `ncprefs`.
fn ncprefs_enabled(path: &Path) -> Result<bool> {
    let prefs = read_plist(path)?;
    let Some(value) = prefs.get("dnd_prefs") else {
        return Ok(false);
    };
    let data = value
        .as_data()
        .ok_or_else(|| decoder_error(path, "dnd_prefs is not data"))?;
    let dnd = plist_from_bytes(data, path)?;

    Ok(dnd
        .get("userPref")
        .and_then(|v| v.as_dictionary())
        .and_then(|pref| pref.get("enabled"))
        .and_then(|v| v.as_boolean())
        .unwrap_or(false))
}

fn byhost_enabled(path: &Path) -> Result<bool> {
    let prefs = read_plist(path)?;
    Ok(match prefs.get("doNotDisturb") {
        Some(plist::Value::Boolean(b)) => *b,
        Some(plist::Value::Integer(i)) => i.as_signed().is_some_and(|i| i != 0),
        Some(plist::Value::String(s)) => !s.is_empty() && s != "0",
        _ => false,
    })
}

/// Per-host preference files carry the hardware UUID in their name.
fn find_byhost_prefs(dir: &Path) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(BYHOST_PREFIX) && n.ends_with(".plist"))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const WORK_ID: &str = "com.apple.focus.work";
    const SLEEP_ID: &str = "com.apple.sleep.sleep-mode";
    const PERSONAL_ID: &str = "com.apple.focus.personal-time";

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 10, hour, minute, 0)
            .unwrap()
    }

    /// Apple-epoch seconds for 2026-03-10 at `hour:minute` UTC.
    fn apple_seconds(hour: u32, minute: u32) -> f64 {
        at(hour, minute).timestamp() as f64 - APPLE_EPOCH_OFFSET
    }

    fn modes_json() -> String {
        serde_json::json!({
            "data": [{
                "modeConfigurations": {
                    WORK_ID: {
                        "mode": {"name": "Work"},
                        "triggers": {"triggers": [{
                            "enabledSetting": 2,
                            "timePeriodStartTimeHour": 9,
                            "timePeriodStartTimeMinute": 0,
                            "timePeriodEndTimeHour": 17,
                            "timePeriodEndTimeMinute": 0,
                            "timePeriodWeekdays": 62
                        }]}
                    },
                    SLEEP_ID: {
                        "mode": {"name": "Sleep"},
                        "triggers": {"triggers": [{
                            "enabledSetting": 2,
                            "timePeriodStartTimeHour": 22,
                            "timePeriodStartTimeMinute": 30,
                            "timePeriodEndTimeHour": 6,
                            "timePeriodEndTimeMinute": 0
                        }]}
                    },
                    PERSONAL_ID: {
                        "mode": {"name": "Personal"},
                        "triggers": {"triggers": [{
                            "enabledSetting": 1,
                            "timePeriodStartTimeHour": 0,
                            "timePeriodEndTimeHour": 23
                        }]}
                    }
                }
            }]
        })
        .to_string()
    }

    fn assertion_json(mode: &str, reason: &str, start: f64) -> String {
        serde_json::json!({
            "data": [{
                "storeAssertionRecords": [{
                    "assertionDetails": {
                        "assertionDetailsModeIdentifier": mode,
                        "assertionDetailsReason": reason
                    },
                    "assertionStartDateTimestamp": start
                }]
            }]
        })
        .to_string()
    }

    fn home_with(assertions: &str, modes: &str) -> TempDir {
        let home = TempDir::new().unwrap();
        let db = home.path().join("Library/DoNotDisturb/DB");
        fs::create_dir_all(&db).unwrap();
        fs::write(db.join("Assertions.json"), assertions).unwrap();
        fs::write(db.join("ModeConfigurations.json"), modes).unwrap();
        home
    }

    fn probe(home: &TempDir, now: DateTime<FixedOffset>) -> FocusProbe {
        FocusProbe::new(Some(home.path().to_path_buf())).at(now)
    }

    #[test]
    fn window_contains() {
        let day = Window { start: 540, end: 1020 };
        assert!(day.contains(540));
        assert!(day.contains(700));
        assert!(!day.contains(1020));
        assert!(!day.contains(100));

        let night = Window { start: 1350, end: 360 };
        assert!(night.contains(1400));
        assert!(night.contains(30));
        assert!(!night.contains(360));
        assert!(!night.contains(720));

        assert!(!Window { start: 60, end: 60 }.contains(60));
    }

    #[test]
    fn window_began_after() {
        let day = Window { start: 540, end: 1020 };
        assert!(day.began_after(480));
        assert!(!day.began_after(600));
        assert!(!day.began_after(1080));

        let night = Window { start: 1350, end: 360 };
        assert!(night.began_after(720));
        assert!(!night.began_after(1380));
        assert!(!night.began_after(60));
    }

    #[test]
    fn absurd_trigger_times_saturate() {
        let trigger = Trigger {
            enabled_setting: SCHEDULE_ENABLED,
            time_period_start_time_hour: u32::MAX,
            time_period_start_time_minute: 5,
            time_period_end_time_hour: 9,
            time_period_end_time_minute: u32::MAX,
        };
        assert_eq!(
            trigger.window(),
            Window {
                start: u32::MAX,
                end: u32::MAX
            }
        );
    }

    #[test]
    fn absurd_schedule_does_not_match() {
        let modes = serde_json::json!({
            "data": [{
                "modeConfigurations": {
                    WORK_ID: {
                        "mode": {"name": "Work"},
                        "triggers": {"triggers": [{
                            "enabledSetting": 2,
                            "timePeriodStartTimeHour": u32::MAX,
                            "timePeriodStartTimeMinute": u32::MAX,
                            "timePeriodEndTimeHour": 1,
                            "timePeriodEndTimeMinute": 0
                        }]}
                    }
                }
            }]
        })
        .to_string();
        let home = home_with(r#"{"data":[]}"#, &modes);
        assert_eq!(probe(&home, at(10, 0)).mode(), "");
    }

    #[test]
    fn manual_mode_wins_over_schedule() {
        let home = home_with(&assertion_json(PERSONAL_ID, "user-action", 0.0), &modes_json());
        assert_eq!(probe(&home, at(10, 0)).mode(), "Personal");
    }

    #[test]
    fn schedule_applies_without_assertion() {
        let home = home_with(r#"{"data":[{"storeAssertionRecords":[]}]}"#, &modes_json());
        assert_eq!(probe(&home, at(10, 0)).mode(), "Work");
        assert_eq!(probe(&home, at(18, 0)).mode(), "");
    }

    #[test]
    fn overnight_schedule() {
        let home = home_with(r#"{"data":[]}"#, &modes_json());
        assert_eq!(probe(&home, at(23, 15)).mode(), "Sleep");
        assert_eq!(probe(&home, at(5, 59)).mode(), "Sleep");
        assert_eq!(probe(&home, at(6, 0)).mode(), "");
    }

    #[test]
    fn disabled_schedule_ignored() {
        let home = home_with(r#"{"data":[]}"#, &modes_json());
        // Personal's window covers the whole day but is not enabled
        assert_eq!(probe(&home, at(18, 30)).mode(), "");
    }

    #[test]
    fn smart_trigger_before_schedule_keeps_priority() {
        let home = home_with(
            &assertion_json(PERSONAL_ID, "smart-trigger", apple_seconds(8, 30)),
            &modes_json(),
        );
        assert_eq!(probe(&home, at(10, 0)).mode(), "Personal");
    }

    #[test]
    fn schedule_overrides_smart_trigger_inside_window() {
        let home = home_with(
            &assertion_json(PERSONAL_ID, "smart-trigger", apple_seconds(9, 30)),
            &modes_json(),
        );
        assert_eq!(probe(&home, at(10, 0)).mode(), "Work");
    }

    #[test]
    fn schedule_overrides_smart_trigger_from_after_window_end() {
        let home = home_with(
            &assertion_json(PERSONAL_ID, "smart-trigger", apple_seconds(18, 0)),
            &modes_json(),
        );
        assert_eq!(probe(&home, at(10, 0)).mode(), "Work");
    }

    #[test]
    fn smart_trigger_outside_schedules() {
        let home = home_with(
            &assertion_json(PERSONAL_ID, "smart-trigger", apple_seconds(18, 0)),
            &modes_json(),
        );
        assert_eq!(probe(&home, at(19, 0)).mode(), "Personal");
    }

    #[test]
    fn unknown_mode_identifier_reads_empty() {
        let home = home_with(
            &assertion_json("com.example.missing", "user-action", 0.0),
            &modes_json(),
        );
        assert_eq!(probe(&home, at(19, 0)).mode(), "");
    }

    #[test]
    fn corrupt_configuration_reads_inactive() {
        let home = home_with(&assertion_json(WORK_ID, "user-action", 0.0), "{ nope");
        assert_eq!(probe(&home, at(10, 0)).read(), ProbeReading::Value(String::new()));
    }

    #[test]
    fn corrupt_assertions_still_apply_schedules() {
        let home = home_with("[1, 2", &modes_json());
        assert_eq!(probe(&home, at(10, 0)).mode(), "Work");
    }

    #[test]
    fn no_home_reads_inactive() {
        assert_eq!(FocusProbe::new(None).mode(), "");
    }

    #[test]
    fn empty_home_reads_inactive() {
        let home = TempDir::new().unwrap();
        assert_eq!(probe(&home, at(10, 0)).mode(), "");
    }

    fn dict(entries: Vec<(&str, plist::Value)>) -> plist::Dictionary {
        let mut dict = plist::Dictionary::new();
        for (key, value) in entries {
            dict.insert(key.to_string(), value);
        }
        dict
    }

    fn xml(dict: &plist::Dictionary) -> Vec<u8> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, dict).unwrap();
        buf
    }

    fn write_ncprefs(home: &Path, enabled: bool) {
        let inner = dict(vec![(
            "userPref",
            plist::Value::Dictionary(dict(vec![("enabled", plist::Value::Boolean(enabled))])),
        )]);
        let outer = dict(vec![("dnd_prefs", plist::Value::Data(xml(&inner)))]);
        let path = home.join(NCPREFS_PATH);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, xml(&outer)).unwrap();
    }

    #[test]
    fn ncprefs_do_not_disturb() {
        let home = TempDir::new().unwrap();
        write_ncprefs(home.path(), true);
        assert_eq!(probe(&home, at(10, 0)).mode(), DO_NOT_DISTURB);
    }

    #[test]
    fn ncprefs_disabled() {
        let home = TempDir::new().unwrap();
        write_ncprefs(home.path(), false);
        assert_eq!(probe(&home, at(10, 0)).mode(), "");
    }

    #[test]
    fn ncprefs_garbage_reads_inactive() {
        let home = TempDir::new().unwrap();
        let path = home.path().join(NCPREFS_PATH);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "garbage").unwrap();
        assert_eq!(probe(&home, at(10, 0)).mode(), "");
    }

    #[test]
    fn byhost_do_not_disturb() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join(BYHOST_DIR);
        fs::create_dir_all(&dir).unwrap();
        let prefs = dict(vec![("doNotDisturb", plist::Value::Boolean(true))]);
        fs::write(
            dir.join("com.apple.notificationcenterui.6A1B2C3D-0000-1111-2222-333344445555.plist"),
            xml(&prefs),
        )
        .unwrap();
        assert_eq!(probe(&home, at(10, 0)).mode(), DO_NOT_DISTURB);
    }

    #[test]
    fn byhost_integer_flag() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join(BYHOST_DIR);
        fs::create_dir_all(&dir).unwrap();
        let prefs = dict(vec![("doNotDisturb", plist::Value::Integer(0.into()))]);
        fs::write(dir.join("com.apple.notificationcenterui.plist"), xml(&prefs)).unwrap();
        assert_eq!(probe(&home, at(10, 0)).mode(), "");
    }

    #[test]
    fn focus_files_take_precedence_over_ncprefs() {
        let home = home_with(r#"{"data":[]}"#, &modes_json());
        write_ncprefs(home.path(), true);
        assert_eq!(probe(&home, at(12, 0)).mode(), "Work");
        assert_eq!(probe(&home, at(20, 0)).mode(), "");
    }
}
