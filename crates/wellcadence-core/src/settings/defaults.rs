//! Stock per-type cadence and migration from the flat v1 settings.

use serde::{Deserialize, Serialize};

use super::{
    CadenceSettings, DeliveryConfig, GlobalCadence, MissedDayFallback, ReminderCadence,
    ScheduleConfig, ScheduleMode, TimeWindow,
};
use crate::reminder::{PerReminder, ReminderType};

/// The stock cadence for one reminder type.
pub fn default_reminder(reminder: ReminderType) -> ReminderCadence {
    let base = ReminderCadence::default();
    let gentle = DeliveryConfig {
        notification: false,
        gentle: true,
        ..DeliveryConfig::default()
    };

    match reminder {
        ReminderType::Eye => ReminderCadence {
            escalate_if_ignored: true,
            ..base
        },
        ReminderType::Movement => ReminderCadence {
            schedule: interval(45, 1),
            snooze_custom_min: 15,
            ..base
        },
        ReminderType::Posture => ReminderCadence {
            schedule: interval(40, 1),
            snooze_custom_min: 15,
            stillness_minutes: 50,
            ..base
        },
        ReminderType::Hydration => ReminderCadence {
            schedule: interval(60, 0),
            snooze_minutes: vec![10, 15, 30],
            ..base
        },
        ReminderType::Breathwork => ReminderCadence {
            schedule: ScheduleConfig {
                mode: ScheduleMode::TimeWindows,
                interval_min: 120,
                windows: vec![TimeWindow::new("10:30", "11:00"), TimeWindow::new("15:30", "16:00")],
                ..ScheduleConfig::default()
            },
            delivery: gentle,
            snooze_minutes: vec![10, 15, 30],
            ..base
        },
        ReminderType::DailyAudit => ReminderCadence {
            schedule: ScheduleConfig {
                mode: ScheduleMode::TimeWindows,
                interval_min: 360,
                windows: vec![TimeWindow::new("17:00", "20:00")],
                ..ScheduleConfig::default()
            },
            delivery: gentle,
            snooze_minutes: vec![15, 30],
            snooze_custom_min: 30,
            escalate_after_ignores: 2,
            missed_day_fallback: MissedDayFallback::NextMorning,
            ..base
        },
    }
}

/// The stock cadence for all six types.
pub fn default_reminders() -> PerReminder<ReminderCadence> {
    PerReminder::from_fn(default_reminder)
}

fn interval(interval_min: u32, jitter_min: u32) -> ScheduleConfig {
    ScheduleConfig {
        interval_min,
        jitter_min,
        ..ScheduleConfig::default()
    }
}

/// Flat reminder settings written by the first release, before per-type
/// cadence existed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacySettings {
    #[serde(default)]
    pub eye_break_interval_min: Option<u32>,
    #[serde(default)]
    pub hydration_interval_min: Option<u32>,
    #[serde(default)]
    pub stillness_threshold_min: Option<u32>,
    #[serde(default)]
    pub hydration_goal_glasses: Option<u32>,
    #[serde(default)]
    pub reminder_notifications: Option<bool>,
    #[serde(default)]
    pub audio_cues: Option<bool>,
}

impl CadenceSettings {
    /// Lift flat v1 settings into per-type cadence. Values the old format
    /// did not have take their stock defaults. The result still needs
    /// [`CadenceSettings::normalized`].
    pub fn from_legacy(legacy: &LegacySettings) -> Self {
        let notification = legacy.reminder_notifications.unwrap_or(true);
        let sound = legacy.audio_cues.unwrap_or(false);

        let mut reminders = default_reminders();
        for reminder in ReminderType::ALL {
            let cadence = &mut reminders[reminder];
            // Gentle types never had notifications in v1 either.
            if !cadence.delivery.gentle {
                cadence.delivery.notification = notification;
            }
            cadence.delivery.sound = sound;
        }

        if let Some(min) = legacy.eye_break_interval_min {
            reminders[ReminderType::Eye].schedule.interval_min = min;
        }
        if let Some(min) = legacy.hydration_interval_min {
            reminders[ReminderType::Hydration].schedule.interval_min = min;
        }
        if let Some(min) = legacy.stillness_threshold_min {
            reminders[ReminderType::Posture].stillness_minutes = min;
        }
        if let Some(glasses) = legacy.hydration_goal_glasses {
            reminders[ReminderType::Hydration].daily_goal_glasses = glasses;
        }

        Self {
            global: GlobalCadence::default(),
            reminders,
        }
    }
}
