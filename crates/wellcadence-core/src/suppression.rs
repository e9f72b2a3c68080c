//! The suppression chain.
//!
//! A due reminder is checked against an ordered list of rules and the first
//! rule that matches decides the outcome. Order matters: with panic mode
//! and quiet hours both active the reason is always `PANIC_OFF`.
//!
//! `MEETING` is the one reason that does not cancel delivery. It marks the
//! decision `subtle` so the host can fall back to a low-key presentation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::{in_clock_window, Calendar, EpochMs, MINUTE_MS};
use crate::reminder::ReminderType;
use crate::settings::{domain_matches, CadenceSettings};
use crate::state::SchedulerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuppressionReason {
    PanicOff,
    SnoozeAll,
    SnoozeType,
    QuietHours,
    Focus,
    NotStillEnough,
    Idle,
    Locked,
    Meeting,
    /// Nothing matched.
    Active,
}

impl SuppressionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SuppressionReason::PanicOff => "PANIC_OFF",
            SuppressionReason::SnoozeAll => "SNOOZE_ALL",
            SuppressionReason::SnoozeType => "SNOOZE_TYPE",
            SuppressionReason::QuietHours => "QUIET_HOURS",
            SuppressionReason::Focus => "FOCUS",
            SuppressionReason::NotStillEnough => "NOT_STILL_ENOUGH",
            SuppressionReason::Idle => "IDLE",
            SuppressionReason::Locked => "LOCKED",
            SuppressionReason::Meeting => "MEETING",
            SuppressionReason::Active => "ACTIVE",
        }
    }
}

impl fmt::Display for SuppressionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host's idle detector reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleState {
    #[default]
    Active,
    Idle,
    Locked,
}

/// Host observations gathered before a fire is evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    pub focus_active: bool,
    /// Last user input. `None` counts as "just now".
    pub last_activity_at: Option<EpochMs>,
    pub idle_state: IdleState,
    /// Hostname of the foreground browser tab, if known.
    pub active_hostname: Option<String>,
}

impl Signals {
    /// Whole minutes since the last input.
    pub fn inactive_minutes(&self, now: EpochMs) -> i64 {
        self.last_activity_at
            .map(|at| (now - at).max(0) / MINUTE_MS)
            .unwrap_or(0)
    }
}

/// Outcome of running the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub suppressed: bool,
    pub reason: SuppressionReason,
    /// Deliver, but quietly.
    pub subtle: bool,
}

impl Decision {
    pub fn active() -> Self {
        Self {
            suppressed: false,
            reason: SuppressionReason::Active,
            subtle: false,
        }
    }

    fn from_reason(reason: SuppressionReason) -> Self {
        match reason {
            SuppressionReason::Active => Self::active(),
            SuppressionReason::Meeting => Self {
                suppressed: false,
                reason,
                subtle: true,
            },
            _ => Self {
                suppressed: true,
                reason,
                subtle: false,
            },
        }
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct SuppressionContext<'a> {
    pub reminder: ReminderType,
    pub now: EpochMs,
    pub settings: &'a CadenceSettings,
    pub state: &'a SchedulerState,
    pub signals: &'a Signals,
    pub calendar: &'a Calendar,
}

type Rule = fn(&SuppressionContext<'_>) -> Option<SuppressionReason>;

/// Evaluated top to bottom; first match wins.
const CHAIN: [Rule; 8] = [
    panic_off,
    snooze_all,
    snooze_type,
    quiet_hours,
    focus,
    not_still_enough,
    idle,
    meeting,
];

/// Run the chain for one due reminder.
pub fn evaluate(ctx: &SuppressionContext<'_>) -> Decision {
    CHAIN
        .iter()
        .find_map(|rule| rule(ctx))
        .map(Decision::from_reason)
        .unwrap_or_else(Decision::active)
}

fn panic_off(ctx: &SuppressionContext<'_>) -> Option<SuppressionReason> {
    ctx.state
        .is_panic_active(ctx.now)
        .then_some(SuppressionReason::PanicOff)
}

fn snooze_all(ctx: &SuppressionContext<'_>) -> Option<SuppressionReason> {
    ctx.state
        .is_snooze_all_active(ctx.now)
        .then_some(SuppressionReason::SnoozeAll)
}

fn snooze_type(ctx: &SuppressionContext<'_>) -> Option<SuppressionReason> {
    ctx.state
        .is_snoozed(ctx.reminder, ctx.now)
        .then_some(SuppressionReason::SnoozeType)
}

fn quiet_hours(ctx: &SuppressionContext<'_>) -> Option<SuppressionReason> {
    // Normalization only lets hydration keep the override; check anyway.
    let overridden = ctx.reminder == ReminderType::Hydration
        && ctx.settings.reminder(ctx.reminder).quiet_hours_override;
    if overridden {
        return None;
    }
    let (start, end) = ctx.settings.global.quiet_hours();
    let now_min = ctx.calendar.minutes_since_midnight(ctx.now);
    in_clock_window(now_min, start.minutes(), end.minutes()).then_some(SuppressionReason::QuietHours)
}

fn focus(ctx: &SuppressionContext<'_>) -> Option<SuppressionReason> {
    (ctx.signals.focus_active && ctx.settings.global.suppress_during_focus)
        .then_some(SuppressionReason::Focus)
}

fn not_still_enough(ctx: &SuppressionContext<'_>) -> Option<SuppressionReason> {
    if ctx.reminder != ReminderType::Posture {
        return None;
    }
    let threshold = i64::from(ctx.settings.reminder(ctx.reminder).stillness_minutes);
    (ctx.signals.inactive_minutes(ctx.now) < threshold).then_some(SuppressionReason::NotStillEnough)
}

fn idle(ctx: &SuppressionContext<'_>) -> Option<SuppressionReason> {
    if !ctx.settings.global.suppress_when_idle {
        return None;
    }
    match ctx.signals.idle_state {
        IdleState::Active => None,
        IdleState::Idle => Some(SuppressionReason::Idle),
        IdleState::Locked => Some(SuppressionReason::Locked),
    }
}

fn meeting(ctx: &SuppressionContext<'_>) -> Option<SuppressionReason> {
    let global = &ctx.settings.global;
    if global.meeting_mode_manual {
        return Some(SuppressionReason::Meeting);
    }
    if !global.meeting_mode_auto {
        return None;
    }
    let host = ctx.signals.active_hostname.as_deref()?;
    global
        .meeting_domains
        .iter()
        .any(|domain| domain_matches(host, domain))
        .then_some(SuppressionReason::Meeting)
}
