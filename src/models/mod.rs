pub mod instance;
pub mod schedule;
pub mod template;

pub use instance::{Instance, InstanceStatus};
pub use schedule::{ConflictRecord, ConflictSeverity, PlanResult, ScheduledTask, SleepSchedule};
pub use template::{CustomPattern, Frequency, RecurrenceRule, SchedulingType, Template, TimeWindowName};
