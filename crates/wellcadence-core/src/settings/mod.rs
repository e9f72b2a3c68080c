//! User-facing cadence settings.
//!
//! Settings are owned by the user and are read-only to the engine. Every
//! field carries a serde default so partially written config files still
//! load; [`CadenceSettings::normalized`] then repairs anything out of range.

mod defaults;
mod normalize;

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::reminder::{PerReminder, ReminderType};

pub use defaults::{default_reminder, default_reminders, LegacySettings};
pub use normalize::{
    domain_matches, normalize_domain, CadenceFeatures, Entitlement, EntitlementFeatures,
    BREAK_MIN_RANGE, DAILY_GOAL_RANGE, ESCALATE_AFTER_RANGE, INTERVAL_MIN_RANGE, JITTER_MIN_RANGE, MAX_WINDOWS,
    STILLNESS_MIN_RANGE, WORK_MIN_RANGE,
};

/// How a reminder's next trigger time is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleMode {
    /// Repeating work/break duty cycle anchored to a daily start time.
    WorkBlocks,
    /// Interval cadence restricted to daily clock windows.
    TimeWindows,
    /// Fixed interval with optional deterministic jitter. Unknown mode
    /// names deserialize to this variant.
    #[default]
    #[serde(other)]
    Interval,
}

/// A daily clock window, `"HH:MM"` bounds, inclusive. May wrap midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// The whole day, used when no usable window is configured.
    pub fn full_day() -> Self {
        Self::new("00:00", "23:59")
    }

    /// Parsed bounds, or `None` if either bound is malformed.
    pub fn bounds(&self) -> Option<(ClockTime, ClockTime)> {
        Some((ClockTime::parse(&self.start)?, ClockTime::parse(&self.end)?))
    }
}

/// Per-reminder schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub mode: ScheduleMode,
    #[serde(default = "default_interval_min")]
    pub interval_min: u32,
    #[serde(default)]
    pub jitter_min: u32,
    #[serde(default = "default_work_min")]
    pub work_min: u32,
    #[serde(default = "default_break_min")]
    pub break_min: u32,
    #[serde(default = "default_anchor_time")]
    pub anchor_time: String,
    #[serde(default = "default_windows")]
    pub windows: Vec<TimeWindow>,
}

impl ScheduleConfig {
    /// Anchor for work blocks; malformed values fall back to 09:00.
    pub fn anchor(&self) -> ClockTime {
        ClockTime::parse_or(&self.anchor_time, default_anchor_clock())
    }

    /// Well-formed windows as minute bounds, in configured order.
    pub fn window_bounds(&self) -> Vec<(u32, u32)> {
        self.windows
            .iter()
            .filter_map(TimeWindow::bounds)
            .map(|(start, end)| (start.minutes(), end.minutes()))
            .collect()
    }
}

/// How a delivered reminder is surfaced. Consumed by the UI; the engine
/// only looks at `sound`, `sound_volume` and `gentle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_true")]
    pub overlay: bool,
    #[serde(default = "default_true")]
    pub notification: bool,
    #[serde(default)]
    pub popup_only: bool,
    #[serde(default)]
    pub sound: bool,
    #[serde(default = "default_sound_volume")]
    pub sound_volume: f64,
    #[serde(default)]
    pub gentle: bool,
}

/// What to do when the daily audit was not completed today or yesterday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissedDayFallback {
    /// Next 09:00.
    #[default]
    NextMorning,
    /// Next start of the audit's first configured window.
    NextWorkWindow,
    /// Keep the regular schedule.
    Skip,
}

/// Cadence for one reminder type.
///
/// `stillness_minutes` only means something for posture,
/// `quiet_hours_override` and `daily_goal_glasses` for hydration, and
/// `missed_day_fallback` for the daily audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderCadence {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: Vec<u32>,
    #[serde(default = "default_snooze_custom_min")]
    pub snooze_custom_min: u32,
    #[serde(default)]
    pub escalate_if_ignored: bool,
    #[serde(default = "default_escalate_after_ignores")]
    pub escalate_after_ignores: u32,
    #[serde(default = "default_stillness_minutes")]
    pub stillness_minutes: u32,
    #[serde(default)]
    pub quiet_hours_override: bool,
    #[serde(default = "default_daily_goal_glasses")]
    pub daily_goal_glasses: u32,
    #[serde(default)]
    pub missed_day_fallback: MissedDayFallback,
}

impl ReminderCadence {
    /// Snooze length used when the user does not pick one.
    pub fn default_snooze_min(&self) -> u32 {
        self.snooze_custom_min.max(1)
    }
}

/// Suppression switches shared by every reminder type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalCadence {
    #[serde(default = "default_quiet_start")]
    pub quiet_hours_start: String,
    #[serde(default = "default_quiet_end")]
    pub quiet_hours_end: String,
    #[serde(default = "default_true")]
    pub suppress_during_focus: bool,
    #[serde(default = "default_true")]
    pub suppress_when_idle: bool,
    #[serde(default)]
    pub meeting_mode_manual: bool,
    #[serde(default)]
    pub meeting_mode_auto: bool,
    #[serde(default = "default_meeting_domains")]
    pub meeting_domains: Vec<String>,
    /// Seconds without input before the idle source reports `idle`.
    #[serde(default = "default_idle_detection_secs")]
    pub idle_detection_secs: u32,
}

impl GlobalCadence {
    pub fn quiet_hours(&self) -> (ClockTime, ClockTime) {
        (
            ClockTime::parse_or(&self.quiet_hours_start, default_quiet_start_clock()),
            ClockTime::parse_or(&self.quiet_hours_end, default_quiet_end_clock()),
        )
    }
}

/// The complete, normalized settings object the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceSettings {
    #[serde(default)]
    pub global: GlobalCadence,
    #[serde(default = "default_reminders")]
    pub reminders: PerReminder<ReminderCadence>,
}

impl CadenceSettings {
    pub fn reminder(&self, reminder: ReminderType) -> &ReminderCadence {
        &self.reminders[reminder]
    }

    pub fn reminder_mut(&mut self, reminder: ReminderType) -> &mut ReminderCadence {
        &mut self.reminders[reminder]
    }
}

impl Default for CadenceSettings {
    fn default() -> Self {
        Self {
            global: GlobalCadence::default(),
            reminders: default_reminders(),
        }
    }
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_interval_min() -> u32 {
    20
}
fn default_work_min() -> u32 {
    50
}
fn default_break_min() -> u32 {
    10
}
fn default_anchor_clock() -> ClockTime {
    ClockTime::new(9, 0).unwrap_or(ClockTime::MIDNIGHT)
}
fn default_anchor_time() -> String {
    "09:00".into()
}
fn default_windows() -> Vec<TimeWindow> {
    vec![TimeWindow::new("09:00", "17:30")]
}
fn default_sound_volume() -> f64 {
    0.25
}
fn default_snooze_minutes() -> Vec<u32> {
    vec![5, 10, 15, 30]
}
fn default_snooze_custom_min() -> u32 {
    20
}
fn default_escalate_after_ignores() -> u32 {
    3
}
fn default_stillness_minutes() -> u32 {
    50
}
fn default_daily_goal_glasses() -> u32 {
    8
}
fn default_quiet_start_clock() -> ClockTime {
    ClockTime::new(22, 30).unwrap_or(ClockTime::MIDNIGHT)
}
fn default_quiet_end_clock() -> ClockTime {
    ClockTime::new(7, 30).unwrap_or(ClockTime::MIDNIGHT)
}
fn default_quiet_start() -> String {
    "22:30".into()
}
fn default_quiet_end() -> String {
    "07:30".into()
}
fn default_meeting_domains() -> Vec<String> {
    vec![
        "meet.google.com".into(),
        "zoom.us".into(),
        "teams.microsoft.com".into(),
    ]
}
fn default_idle_detection_secs() -> u32 {
    60
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::Interval,
            interval_min: default_interval_min(),
            jitter_min: 0,
            work_min: default_work_min(),
            break_min: default_break_min(),
            anchor_time: default_anchor_time(),
            windows: default_windows(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            overlay: true,
            notification: true,
            popup_only: false,
            sound: false,
            sound_volume: default_sound_volume(),
            gentle: false,
        }
    }
}

impl Default for ReminderCadence {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: ScheduleConfig::default(),
            delivery: DeliveryConfig::default(),
            snooze_minutes: default_snooze_minutes(),
            snooze_custom_min: default_snooze_custom_min(),
            escalate_if_ignored: false,
            escalate_after_ignores: default_escalate_after_ignores(),
            stillness_minutes: default_stillness_minutes(),
            quiet_hours_override: false,
            daily_goal_glasses: default_daily_goal_glasses(),
            missed_day_fallback: MissedDayFallback::NextMorning,
        }
    }
}

impl Default for GlobalCadence {
    fn default() -> Self {
        Self {
            quiet_hours_start: default_quiet_start(),
            quiet_hours_end: default_quiet_end(),
            suppress_during_focus: true,
            suppress_when_idle: true,
            meeting_mode_manual: false,
            meeting_mode_auto: false,
            meeting_domains: default_meeting_domains(),
            idle_detection_secs: default_idle_detection_secs(),
        }
    }
}
