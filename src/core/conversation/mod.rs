pub mod admin_alerts;
pub mod conversation_models;
pub mod conversation_service;
pub mod role_registry;

pub use admin_alerts::AdminAlert;
pub use conversation_models::{AdminAction, FlowState, ReplyMarkup, Reply, Role, Selector, StaffMember};
pub use conversation_service::ConversationService;
pub use role_registry::RoleRegistry;
