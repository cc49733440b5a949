// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "reports/mod.rs"]
pub mod reports;

#[path = "conversation/mod.rs"]
pub mod conversation;
