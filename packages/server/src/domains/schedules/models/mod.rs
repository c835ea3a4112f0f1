pub mod job_schedule_info;

pub use job_schedule_info::{JobScheduleInfo, RunRecord, RunStatus, UnknownRunStatus};
