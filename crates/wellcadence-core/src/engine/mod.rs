//! The cadence orchestrator.
//!
//! [`CadenceEngine`] has no thread or loop of its own. The host calls it when
//! a timer fires, when the user acts on a reminder and when settings change.
//! Every entry point runs under one async mutex and follows the same shape:
//!
//! ```text
//! lock -> load state -> ensure_today -> mutate -> plan_all -> re-arm timers -> save -> unlock
//! ```
//!
//! Collaborator failures are soft. A failed load falls back to the last
//! state this engine saw; a failed save is logged and the in-memory copy
//! stays authoritative; a failed or slow idle query counts as "active".

mod host;
mod payload;
mod plan;

pub use host::{DeliverySink, SignalSource, StateStore, TimerHost};
pub use payload::{reminder_copy, DeliveryPayload};
pub use plan::{daily_audit_fallback, plan_all, plan_next};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::{Calendar, EpochMs};
use crate::escalation::{ignores_until_escalation, is_escalated};
use crate::events::{stamp, Event};
use crate::reminder::{PerReminder, ReminderType};
use crate::settings::CadenceSettings;
use crate::state::{ReminderCounters, SchedulerState, UserAction};
use crate::suppression::{evaluate, IdleState, Signals, SuppressionContext};

/// A fire more than this far ahead of the stored `next_at` belongs to a
/// timer that has since been replaced.
pub const STALE_FIRE_GRACE_MS: i64 = 60_000;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2);

/// External collaborators the engine drives.
#[derive(Clone)]
pub struct EngineHost {
    pub store: Arc<dyn StateStore>,
    pub timers: Arc<dyn TimerHost>,
    pub sink: Arc<dyn DeliverySink>,
    pub signals: Arc<dyn SignalSource>,
}

/// Snapshot of one reminder type for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderStatus {
    pub enabled: bool,
    pub counters: ReminderCounters,
    pub escalated: bool,
    pub ignores_until_escalation: Option<u32>,
}

impl Default for ReminderStatus {
    fn default() -> Self {
        Self {
            enabled: true,
            counters: ReminderCounters::default(),
            escalated: false,
            ignores_until_escalation: None,
        }
    }
}

/// Snapshot of the whole engine for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub today: String,
    pub next_reminder_type: Option<ReminderType>,
    pub next_reminder_at: EpochMs,
    pub snooze_all_until: EpochMs,
    pub panic_until: EpochMs,
    pub reminders: PerReminder<ReminderStatus>,
}

struct Inner {
    settings: CadenceSettings,
    /// Last state loaded or committed.
    cached: Option<SchedulerState>,
}

pub struct CadenceEngine {
    inner: Mutex<Inner>,
    host: EngineHost,
    calendar: Calendar,
    idle_timeout: Duration,
}

impl CadenceEngine {
    /// `settings` should already be normalized.
    pub fn new(settings: CadenceSettings, host: EngineHost, calendar: Calendar) -> Self {
        Self {
            inner: Mutex::new(Inner {
                settings,
                cached: None,
            }),
            host,
            calendar,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Upper bound on how long the idle query may take.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    pub async fn settings(&self) -> CadenceSettings {
        self.inner.lock().await.settings.clone()
    }

    // ── Entry points ─────────────────────────────────────────────────

    /// The host timer labelled for `reminder` fired.
    pub async fn on_reminder_due(&self, reminder: ReminderType, now: EpochMs) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        let mut state = self.load(&inner, now).await;
        // Rollover clears next_at; the host timer was armed against the
        // schedule as it stood before.
        let scheduled = state.counters(reminder).next_at;
        let mut events = self.roll_over(&mut state, now);
        let settings = inner.settings.clone();

        if scheduled == 0 || scheduled > now + STALE_FIRE_GRACE_MS {
            warn!(reminder = %reminder, scheduled, now, "ignoring stale reminder fire");
            events.push(Event::StaleFireIgnored {
                reminder,
                scheduled_at: scheduled,
                at: stamp(now),
            });
            events.push(self.reschedule_locked(&settings, &mut state, now));
            self.commit(&mut inner, state).await;
            return events;
        }

        let signals = self.gather_signals(&settings).await;
        let decision = evaluate(&SuppressionContext {
            reminder,
            now,
            settings: &settings,
            state: &state,
            signals: &signals,
            calendar: &self.calendar,
        });

        if decision.suppressed {
            state.record_suppressed(reminder);
            info!(reminder = %reminder, reason = %decision.reason, "reminder suppressed");
            events.push(Event::ReminderSuppressed {
                reminder,
                reason: decision.reason,
                at: stamp(now),
            });
        } else {
            let record = state.record_fire(reminder, now);
            let cadence = settings.reminder(reminder);
            let payload = DeliveryPayload::build(reminder, cadence, state.counters(reminder), &decision, now);
            info!(
                reminder = %reminder,
                subtle = payload.subtle,
                escalated = payload.escalated,
                "reminder delivered"
            );
            self.host.sink.deliver(&payload);
            if payload.wants_sound() {
                self.host.sink.cue(reminder, payload.delivery.sound_volume);
            }
            events.push(Event::ReminderDelivered {
                reminder,
                reason: decision.reason,
                subtle: payload.subtle,
                escalated: payload.escalated,
                replaced_pending: record.rolled_stale_pending,
                at: stamp(now),
            });
        }

        events.push(self.reschedule_locked(&settings, &mut state, now));
        self.commit(&mut inner, state).await;
        events
    }

    /// The user completed, dismissed or snoozed a reminder.
    pub async fn on_user_action(&self, reminder: ReminderType, action: UserAction, now: EpochMs) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        let (mut state, mut events) = self.begin(&inner, now).await;
        let settings = inner.settings.clone();

        let default_snooze = settings.reminder(reminder).default_snooze_min();
        let snoozed_until = state.apply_action(reminder, action, now, default_snooze);
        info!(reminder = %reminder, action = %action, "user action recorded");
        events.push(Event::ActionRecorded {
            reminder,
            action,
            snoozed_until,
            at: stamp(now),
        });

        events.push(self.reschedule_locked(&settings, &mut state, now));
        self.commit(&mut inner, state).await;
        events
    }

    /// Replace the settings and reschedule everything.
    pub async fn on_settings_changed(&self, settings: CadenceSettings, now: EpochMs) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        inner.settings = settings;
        let (mut state, mut events) = self.begin(&inner, now).await;
        let settings = inner.settings.clone();

        events.push(Event::SettingsApplied { at: stamp(now) });
        events.push(self.reschedule_locked(&settings, &mut state, now));
        self.commit(&mut inner, state).await;
        events
    }

    /// Recompute and re-arm without any other change. Call on startup.
    pub async fn reschedule(&self, now: EpochMs) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        let (mut state, mut events) = self.begin(&inner, now).await;
        let settings = inner.settings.clone();

        events.push(self.reschedule_locked(&settings, &mut state, now));
        self.commit(&mut inner, state).await;
        events
    }

    /// Suppress every reminder for `minutes`.
    pub async fn snooze_all(&self, minutes: u32, now: EpochMs) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        let (mut state, mut events) = self.begin(&inner, now).await;
        let settings = inner.settings.clone();

        let until = state.snooze_all(now, minutes);
        info!(until, "all reminders snoozed");
        events.push(Event::SnoozeAllStarted { until, at: stamp(now) });

        events.push(self.reschedule_locked(&settings, &mut state, now));
        self.commit(&mut inner, state).await;
        events
    }

    /// Hard off switch for `minutes`. Outranks every other rule.
    pub async fn panic_off(&self, minutes: u32, now: EpochMs) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        let (mut state, mut events) = self.begin(&inner, now).await;
        let settings = inner.settings.clone();

        let until = state.panic_off(now, minutes);
        info!(until, "panic mode on");
        events.push(Event::PanicStarted { until, at: stamp(now) });

        events.push(self.reschedule_locked(&settings, &mut state, now));
        self.commit(&mut inner, state).await;
        events
    }

    /// Lift panic mode and every snooze.
    pub async fn resume_all(&self, now: EpochMs) -> Vec<Event> {
        let mut inner = self.inner.lock().await;
        let (mut state, mut events) = self.begin(&inner, now).await;
        let settings = inner.settings.clone();

        state.resume_all();
        info!("overrides cleared");
        events.push(Event::OverridesCleared { at: stamp(now) });

        events.push(self.reschedule_locked(&settings, &mut state, now));
        self.commit(&mut inner, state).await;
        events
    }

    /// Read-only view. A pending rollover is reflected but not saved.
    pub async fn status(&self, now: EpochMs) -> EngineStatus {
        let inner = self.inner.lock().await;
        let (state, _) = self.begin(&inner, now).await;
        let settings = &inner.settings;

        let reminders = PerReminder::from_fn(|reminder| {
            let cadence = settings.reminder(reminder);
            let counters = state.counters(reminder);
            ReminderStatus {
                enabled: cadence.enabled,
                counters: counters.clone(),
                escalated: is_escalated(cadence, counters),
                ignores_until_escalation: ignores_until_escalation(cadence, counters),
            }
        });

        EngineStatus {
            today: state.today.clone(),
            next_reminder_type: state.next_reminder_type,
            next_reminder_at: state.next_reminder_at,
            snooze_all_until: state.snooze_all_until,
            panic_until: state.panic_until,
            reminders,
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Freshest state plus the rollover event, if the day changed.
    async fn begin(&self, inner: &Inner, now: EpochMs) -> (SchedulerState, Vec<Event>) {
        let mut state = self.load(inner, now).await;
        let events = self.roll_over(&mut state, now);
        (state, events)
    }

    /// Stored state, else the cached copy, else a fresh record.
    async fn load(&self, inner: &Inner, now: EpochMs) -> SchedulerState {
        let loaded = match self.host.store.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "failed to load scheduler state, using cached copy");
                None
            }
        };
        loaded
            .or_else(|| inner.cached.clone())
            .unwrap_or_else(|| SchedulerState::new(now, &self.calendar))
    }

    fn roll_over(&self, state: &mut SchedulerState, now: EpochMs) -> Vec<Event> {
        let mut events = Vec::new();
        if state.ensure_today(now, &self.calendar) {
            info!(today = %state.today, "day rolled over");
            events.push(Event::DayRolledOver {
                today: state.today.clone(),
                at: stamp(now),
            });
        }
        events
    }

    async fn commit(&self, inner: &mut Inner, state: SchedulerState) {
        if let Err(e) = self.host.store.save(&state).await {
            warn!(error = %e, "failed to save scheduler state");
        }
        inner.cached = Some(state);
    }

    /// Plan all six types and re-arm one timer per type.
    fn reschedule_locked(&self, settings: &CadenceSettings, state: &mut SchedulerState, now: EpochMs) -> Event {
        plan_all(settings, state, now, &self.calendar);

        for reminder in ReminderType::ALL {
            let label = reminder.timer_label();
            if let Err(e) = self.host.timers.clear(&label) {
                warn!(label = %label, error = %e, "failed to clear timer");
            }
            let next_at = state.counters(reminder).next_at;
            if next_at > 0 {
                if let Err(e) = self.host.timers.arm(&label, next_at) {
                    warn!(label = %label, error = %e, "failed to arm timer");
                }
            }
        }

        debug!(
            next = ?state.next_reminder_type,
            at = state.next_reminder_at,
            "rescheduled"
        );
        Event::Rescheduled {
            next_reminder_type: state.next_reminder_type,
            next_reminder_at: state.next_reminder_at,
            at: stamp(now),
        }
    }

    async fn gather_signals(&self, settings: &CadenceSettings) -> Signals {
        let source = &self.host.signals;
        let global = &settings.global;

        let idle_state = if global.suppress_when_idle {
            let query = source.idle_state(global.idle_detection_secs);
            match tokio::time::timeout(self.idle_timeout, query).await {
                Ok(Ok(state)) => state,
                Ok(Err(e)) => {
                    warn!(error = %e, "idle query failed, assuming active");
                    IdleState::Active
                }
                Err(_) => {
                    warn!("idle query timed out, assuming active");
                    IdleState::Active
                }
            }
        } else {
            IdleState::Active
        };

        Signals {
            focus_active: source.focus_active(),
            last_activity_at: source.last_activity_at(),
            idle_state,
            active_hostname: if global.meeting_mode_auto {
                source.active_hostname()
            } else {
                None
            },
        }
    }
}
