//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod duty;
pub mod load_item;
pub mod load_settings;
pub mod load_statement;
pub mod planning_phase;
pub mod semester;
pub mod semester_duty;
pub mod teaching_assignment;

// Re-export specific types to avoid conflicts
pub use duty::{Column as DutyColumn, Entity as Duty, Model as DutyModel};
pub use load_item::{Column as LoadItemColumn, Entity as LoadItem, Model as LoadItemModel};
pub use load_settings::{
    Column as LoadSettingsColumn, Entity as LoadSettings, Model as LoadSettingsModel,
};
pub use load_statement::{
    Column as LoadStatementColumn, Entity as LoadStatement, Model as LoadStatementModel,
};
pub use planning_phase::{
    Column as PlanningPhaseColumn, Entity as PlanningPhase, Model as PlanningPhaseModel,
};
pub use semester::{Column as SemesterColumn, Entity as Semester, Model as SemesterModel};
pub use semester_duty::{
    Column as SemesterDutyColumn, Entity as SemesterDuty, Model as SemesterDutyModel,
};
pub use teaching_assignment::{
    Column as TeachingAssignmentColumn, Entity as TeachingAssignment,
    Model as TeachingAssignmentModel,
};
