// Discord commands module.
// Each feature gets its own command file.

pub mod admin;

pub mod reports;

// Bot presence management
pub mod presence;
