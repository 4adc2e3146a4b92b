//! A deterministic day-planning core: recurrence engine, dependency
//! resolver and five-step scheduling engine over a shared time and entity
//! model. Persistence, UI and network sync are reachable only through the
//! [`store::Store`] and [`event::EventEmitter`] ports; everything else is
//! a pure function of its inputs.

pub mod config;
pub mod error;
pub mod event;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::PlannerConfig;
pub use error::{PlannerError, PlannerResult, PlannerWarning};
pub use models::{
    ConflictRecord, ConflictSeverity, CustomPattern, Frequency, Instance, InstanceStatus, PlanResult,
    RecurrenceRule, ScheduledTask, SchedulingType, SleepSchedule, Template, TimeWindowName,
};
pub use services::generator::{generate_due_instance, generate_instance, generate_instances_in_range};
pub use services::scheduling_engine::plan;
pub use store::Store;
