// Discord layer - commands, button handling and admin notifications.
//
// Everything here translates between Discord types and the primitives the
// conversation service works with (user IDs, display names, `Reply`).

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "interactions/interactions.rs"]
pub mod interactions;

#[path = "notifications/dispatcher.rs"]
pub mod notifications;

#[path = "replies/replies.rs"]
pub mod replies;

use crate::core::conversation::{ConversationService, StaffMember};
use crate::infra::sheets::WorksheetBackend;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared state handed to every command and event.
pub struct Data {
    pub conversations: Arc<ConversationService<WorksheetBackend>>,
}

/// The reporting identity of a Discord user. Global display name first,
/// since that's what colleagues recognise, then the unique username.
pub fn staff_member(user: &serenity::User) -> StaffMember {
    let name = user
        .global_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| user.name.clone());
    StaffMember::new(user.id.get(), name)
}
