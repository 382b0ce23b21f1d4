//! Wire models for the taskdeck REST service.

pub mod category;
pub mod task;
pub mod timestamp;
pub mod user;
pub mod views;

pub use category::{Category, CategoryCreate, CategoryUpdate, Tag, TagCreate, TagUpdate};
pub use task::{
    Task, TaskCreate, TaskList, TaskPriority, TaskQuery, TaskStats, TaskStatus, TaskUpdate,
};
pub use user::{AuthResponse, Credentials, MessageResponse, Registration, User};
pub use views::{PriorityMatrix, Quadrant, QuadrantKind, TimelinePeriod};
