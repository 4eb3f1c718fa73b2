pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::Role;
pub use error::ValidationError;
pub use structs::{
    ChecklistItem, ChecklistTemplate, LoginRequest, RoundLog, SystemSettings, Task, User,
    UserAccount,
};
