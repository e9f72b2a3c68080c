//! # Wellcadence Core Library
//!
//! Scheduling and suppression logic for six recurring wellness reminders
//! (eye breaks, movement, posture, hydration, breathwork and a daily
//! audit). The library decides *when* each reminder should fire and
//! *whether* a due reminder should be shown; presentation belongs to the
//! host.
//!
//! ## Architecture
//!
//! - **Cadence**: pure next-trigger computation in interval, work-block
//!   and time-window modes, with deterministic jitter
//! - **Suppression**: an ordered rule chain (panic, snoozes, quiet hours,
//!   focus, stillness, idle, meetings), first match wins
//! - **State**: one persisted record of daily counters with lazy day
//!   rollover
//! - **Engine**: the orchestrator. It has no thread of its own; the host
//!   calls it when a timer fires, the user acts, or settings change
//! - **Storage**: SQLite-backed state, timers and delivery log, plus TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`CadenceEngine`]: entry points, serialized behind one async mutex
//! - [`next_trigger_at`]: the schedule calculator
//! - [`evaluate`]: the suppression chain
//! - [`SchedulerState`]: counters and per-type schedule
//! - [`Config`]: application configuration

pub mod cadence;
pub mod clock;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod events;
pub mod reminder;
pub mod settings;
pub mod state;
pub mod storage;
pub mod suppression;

pub use cadence::{build_timeline_preview, next_trigger_at, TimelineEntry};
pub use clock::{now_ms, Calendar, ClockTime, EpochMs};
pub use engine::{
    CadenceEngine, DeliveryPayload, DeliverySink, EngineHost, EngineStatus, SignalSource, StateStore,
    TimerHost,
};
pub use error::{ConfigError, CoreError, StoreError};
pub use escalation::is_escalated;
pub use events::Event;
pub use reminder::{PerReminder, ReminderType};
pub use settings::{CadenceFeatures, CadenceSettings, ReminderCadence, ScheduleConfig, ScheduleMode};
pub use state::{ReminderCounters, SchedulerState, UserAction};
pub use storage::{Config, Database, SqliteHost};
pub use suppression::{evaluate, Decision, IdleState, Signals, SuppressionReason};
