//! Settings normalization and entitlement gating.
//!
//! Normalization never fails. Out-of-range numbers are clamped, malformed
//! clock strings are replaced by their defaults, and a reminder that ends
//! up with no usable window gets the full day.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::{
    CadenceSettings, DeliveryConfig, GlobalCadence, ReminderCadence, ScheduleConfig, ScheduleMode,
    TimeWindow,
};
use crate::clock::ClockTime;
use crate::reminder::ReminderType;

pub const INTERVAL_MIN_RANGE: RangeInclusive<u32> = 5..=360;
pub const JITTER_MIN_RANGE: RangeInclusive<u32> = 0..=3;
pub const WORK_MIN_RANGE: RangeInclusive<u32> = 15..=120;
pub const BREAK_MIN_RANGE: RangeInclusive<u32> = 5..=60;
pub const ESCALATE_AFTER_RANGE: RangeInclusive<u32> = 1..=10;
pub const STILLNESS_MIN_RANGE: RangeInclusive<u32> = 10..=240;
pub const SNOOZE_MIN_RANGE: RangeInclusive<u32> = 1..=180;
pub const DAILY_GOAL_RANGE: RangeInclusive<u32> = 1..=24;
pub const MAX_WINDOWS: usize = 8;
const MAX_SNOOZE_CHOICES: usize = 8;

/// Paid capabilities the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceFeatures {
    #[serde(default = "default_true")]
    pub work_blocks: bool,
    #[serde(default = "default_true")]
    pub time_windows: bool,
    #[serde(default = "default_true")]
    pub meeting_auto_suppression: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CadenceFeatures {
    fn default() -> Self {
        Self::unlocked()
    }
}

impl CadenceFeatures {
    pub fn unlocked() -> Self {
        Self {
            work_blocks: true,
            time_windows: true,
            meeting_auto_suppression: true,
        }
    }

    pub fn locked() -> Self {
        Self {
            work_blocks: false,
            time_windows: false,
            meeting_auto_suppression: false,
        }
    }

    /// An inactive entitlement unlocks nothing; an active one unlocks every
    /// feature it does not explicitly switch off.
    pub fn from_entitlement(entitlement: &Entitlement) -> Self {
        if !entitlement.active {
            return Self::locked();
        }
        let mapped = &entitlement.features;
        Self {
            work_blocks: mapped.work_blocks.unwrap_or(true),
            time_windows: mapped.time_windows.unwrap_or(true),
            meeting_auto_suppression: mapped.meeting_auto_suppression.unwrap_or(true),
        }
    }

    pub fn allows(&self, mode: ScheduleMode) -> bool {
        match mode {
            ScheduleMode::Interval => true,
            ScheduleMode::WorkBlocks => self.work_blocks,
            ScheduleMode::TimeWindows => self.time_windows,
        }
    }
}

/// Entitlement as reported by the billing service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entitlement {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub features: EntitlementFeatures,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitlementFeatures {
    #[serde(default)]
    pub work_blocks: Option<bool>,
    #[serde(default)]
    pub time_windows: Option<bool>,
    #[serde(default)]
    pub meeting_auto_suppression: Option<bool>,
}

impl CadenceSettings {
    /// Repair every field and apply entitlement gating.
    pub fn normalized(mut self, features: &CadenceFeatures) -> Self {
        normalize_global(&mut self.global, features);
        for reminder in ReminderType::ALL {
            normalize_reminder(reminder, &mut self.reminders[reminder], features);
        }
        self
    }
}

fn normalize_global(global: &mut GlobalCadence, features: &CadenceFeatures) {
    let (start, end) = global.quiet_hours();
    global.quiet_hours_start = start.to_string();
    global.quiet_hours_end = end.to_string();

    let mut domains: Vec<String> = Vec::new();
    for domain in global.meeting_domains.iter().map(|d| normalize_domain(d)) {
        if !domain.is_empty() && !domains.contains(&domain) {
            domains.push(domain);
        }
    }
    global.meeting_domains = domains;
    global.meeting_mode_auto &= features.meeting_auto_suppression;
    global.idle_detection_secs = global.idle_detection_secs.clamp(15, 3600);
}

fn normalize_reminder(reminder: ReminderType, cadence: &mut ReminderCadence, features: &CadenceFeatures) {
    normalize_schedule(&mut cadence.schedule, features);
    normalize_delivery(&mut cadence.delivery);

    let mut choices: Vec<u32> = cadence
        .snooze_minutes
        .iter()
        .copied()
        .filter(|m| SNOOZE_MIN_RANGE.contains(m))
        .take(MAX_SNOOZE_CHOICES)
        .collect();
    if choices.is_empty() {
        choices = vec![5, 10, 15, 30];
    }
    cadence.snooze_minutes = choices;
    cadence.snooze_custom_min = clamp(cadence.snooze_custom_min, &SNOOZE_MIN_RANGE);
    cadence.escalate_after_ignores = clamp(cadence.escalate_after_ignores, &ESCALATE_AFTER_RANGE);
    cadence.stillness_minutes = clamp(cadence.stillness_minutes, &STILLNESS_MIN_RANGE);
    cadence.daily_goal_glasses = clamp(cadence.daily_goal_glasses, &DAILY_GOAL_RANGE);

    // Only hydration may ignore quiet hours.
    if reminder != ReminderType::Hydration {
        cadence.quiet_hours_override = false;
    }
}

fn normalize_schedule(schedule: &mut ScheduleConfig, features: &CadenceFeatures) {
    if !features.allows(schedule.mode) {
        schedule.mode = ScheduleMode::Interval;
    }
    schedule.interval_min = clamp(schedule.interval_min, &INTERVAL_MIN_RANGE);
    schedule.jitter_min = clamp(schedule.jitter_min, &JITTER_MIN_RANGE);
    schedule.work_min = clamp(schedule.work_min, &WORK_MIN_RANGE);
    schedule.break_min = clamp(schedule.break_min, &BREAK_MIN_RANGE);
    schedule.anchor_time = schedule.anchor().to_string();

    let mut windows: Vec<TimeWindow> = schedule
        .windows
        .iter()
        .filter_map(TimeWindow::bounds)
        .take(MAX_WINDOWS)
        .map(|(start, end): (ClockTime, ClockTime)| TimeWindow::new(&start.to_string(), &end.to_string()))
        .collect();
    if windows.is_empty() {
        windows.push(TimeWindow::full_day());
    }
    schedule.windows = windows;
}

fn normalize_delivery(delivery: &mut DeliveryConfig) {
    if !delivery.sound_volume.is_finite() {
        delivery.sound_volume = DeliveryConfig::default().sound_volume;
    }
    delivery.sound_volume = delivery.sound_volume.clamp(0.0, 1.0);
}

fn clamp(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// Lowercase, strip scheme, `*.` prefix and path.
pub fn normalize_domain(domain: &str) -> String {
    let mut value = domain.trim().to_ascii_lowercase();
    for prefix in ["https://", "http://"] {
        if let Some(rest) = value.strip_prefix(prefix) {
            value = rest.to_string();
        }
    }
    if let Some(rest) = value.strip_prefix("*.") {
        value = rest.to_string();
    }
    if let Some(idx) = value.find('/') {
        value.truncate(idx);
    }
    value
}

/// A hostname matches a domain exactly or as a subdomain of it.
pub fn domain_matches(hostname: &str, domain: &str) -> bool {
    let host = normalize_domain(hostname);
    let domain = normalize_domain(domain);
    if host.is_empty() || domain.is_empty() {
        return false;
    }
    host == domain || host.ends_with(&format!(".{domain}"))
}
