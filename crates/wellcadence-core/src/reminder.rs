//! Reminder types and the fixed-shape per-type map.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// One of the six wellness nudges. Declaration order is the iteration order
/// and the tie-break order when two reminders are due at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderType {
    Eye,
    Movement,
    Posture,
    Hydration,
    Breathwork,
    DailyAudit,
}

impl ReminderType {
    pub const ALL: [ReminderType; 6] = [
        ReminderType::Eye,
        ReminderType::Movement,
        ReminderType::Posture,
        ReminderType::Hydration,
        ReminderType::Breathwork,
        ReminderType::DailyAudit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderType::Eye => "eye",
            ReminderType::Movement => "movement",
            ReminderType::Posture => "posture",
            ReminderType::Hydration => "hydration",
            ReminderType::Breathwork => "breathwork",
            ReminderType::DailyAudit => "dailyAudit",
        }
    }

    /// Host timer label for this reminder's cadence alarm.
    pub fn timer_label(self) -> String {
        format!("wellcadence-{}", self.as_str())
    }

    /// Reverse of [`ReminderType::timer_label`].
    pub fn from_timer_label(label: &str) -> Option<Self> {
        label.strip_prefix("wellcadence-")?.parse().ok()
    }

    /// Short label used by the timeline preview.
    pub fn timeline_label(self) -> &'static str {
        match self {
            ReminderType::Eye => "EYE",
            ReminderType::Movement => "MOVE",
            ReminderType::Posture => "POSTURE",
            ReminderType::Hydration => "HYDRATE",
            ReminderType::Breathwork => "BREATH",
            ReminderType::DailyAudit => "AUDIT",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        ReminderType::ALL
            .into_iter()
            .find(|t| t.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| format!("unknown reminder type: {s}"))
    }
}

/// A value for each of the six reminder types.
///
/// The shape is fixed, so a map can never be missing a key. Serialized as
/// an object keyed by reminder name; missing keys deserialize to
/// `T::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerReminder<T> {
    #[serde(default)]
    pub eye: T,
    #[serde(default)]
    pub movement: T,
    #[serde(default)]
    pub posture: T,
    #[serde(default)]
    pub hydration: T,
    #[serde(default)]
    pub breathwork: T,
    #[serde(default)]
    pub daily_audit: T,
}

impl<T> PerReminder<T> {
    /// Build a map by evaluating `f` once per type, in declaration order.
    pub fn from_fn(mut f: impl FnMut(ReminderType) -> T) -> Self {
        Self {
            eye: f(ReminderType::Eye),
            movement: f(ReminderType::Movement),
            posture: f(ReminderType::Posture),
            hydration: f(ReminderType::Hydration),
            breathwork: f(ReminderType::Breathwork),
            daily_audit: f(ReminderType::DailyAudit),
        }
    }

    pub fn get(&self, reminder: ReminderType) -> &T {
        match reminder.index() {
            0 => &self.eye,
            1 => &self.movement,
            2 => &self.posture,
            3 => &self.hydration,
            4 => &self.breathwork,
            _ => &self.daily_audit,
        }
    }

    pub fn get_mut(&mut self, reminder: ReminderType) -> &mut T {
        match reminder.index() {
            0 => &mut self.eye,
            1 => &mut self.movement,
            2 => &mut self.posture,
            3 => &mut self.hydration,
            4 => &mut self.breathwork,
            _ => &mut self.daily_audit,
        }
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ReminderType, &T)> {
        ReminderType::ALL.into_iter().map(move |t| (t, self.get(t)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(ReminderType, &T) -> U) -> PerReminder<U> {
        PerReminder::from_fn(|t| f(t, self.get(t)))
    }
}

impl<T> Index<ReminderType> for PerReminder<T> {
    type Output = T;

    fn index(&self, reminder: ReminderType) -> &T {
        self.get(reminder)
    }
}

impl<T> IndexMut<ReminderType> for PerReminder<T> {
    fn index_mut(&mut self, reminder: ReminderType) -> &mut T {
        self.get_mut(reminder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_camel_and_kebab_names() {
        assert_eq!("dailyAudit".parse::<ReminderType>().unwrap(), ReminderType::DailyAudit);
        assert_eq!("daily-audit".parse::<ReminderType>().unwrap(), ReminderType::DailyAudit);
        assert_eq!("EYE".parse::<ReminderType>().unwrap(), ReminderType::Eye);
        assert!("stretch".parse::<ReminderType>().is_err());
    }

    #[test]
    fn timer_label_roundtrips() {
        for t in ReminderType::ALL {
            assert_eq!(ReminderType::from_timer_label(&t.timer_label()), Some(t));
        }
        assert_eq!(ReminderType::from_timer_label("wellcadence-circadian"), None);
    }

    #[test]
    fn per_reminder_index_matches_fields() {
        let mut map = PerReminder::from_fn(|t| t as u32);
        assert_eq!(map[ReminderType::Posture], 2);
        map[ReminderType::DailyAudit] = 42;
        assert_eq!(map.daily_audit, 42);
        let order: Vec<_> = map.iter().map(|(t, _)| t).collect();
        assert_eq!(order, ReminderType::ALL.to_vec());
    }

    #[test]
    fn partial_map_deserializes_with_all_keys() {
        let map: PerReminder<u32> = serde_json::from_str(r#"{"eye": 3}"#).unwrap();
        assert_eq!(map.eye, 3);
        assert_eq!(map.daily_audit, 0);
        let json = serde_json::to_value(&map).unwrap();
        assert!(json.get("dailyAudit").is_some());
    }
}
