use crate::core::conversation::Reply;
use crate::discord::replies::{button_followup, channel_message, parse_button_id, ButtonAction};
use crate::discord::{staff_member, Data, Error};
use poise::serenity_prelude as serenity;

/// Handles a click on one of our buttons. Unknown custom IDs are left alone
/// so other components in the guild keep working.
pub async fn handle_component(
    ctx: &serenity::Context,
    data: &Data,
    component: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let Some(action) = parse_button_id(&component.data.custom_id) else {
        tracing::debug!(custom_id = %component.data.custom_id, "Ignoring unknown button");
        return Ok(());
    };

    // Saving a report can take longer than Discord's 3 second ack window.
    component.defer(ctx).await?;

    let staff = staff_member(&component.user);
    let reply = match action {
        ButtonAction::Choice { selector, label } => data
            .conversations
            .receive_choice(&staff, selector, &label)
            .await
            .unwrap_or_else(|| {
                Reply::text("⌛ That selection is no longer active. Start again with /clean or /tasks.")
            }),
        ButtonAction::Admin(action) => {
            data.conversations
                .handle_admin_action(&staff, action)
                .await
        }
    };

    component.create_followup(ctx, button_followup(reply)).await?;
    Ok(())
}

/// Feeds a plain text message into the author's flow, if they have one.
pub async fn handle_message(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    // Commands go through poise; bots never file reports.
    if message.author.bot || message.content.trim_start().starts_with('/') {
        return Ok(());
    }

    let staff = staff_member(&message.author);
    if let Some(reply) = data.conversations.receive_text(&staff, &message.content).await {
        message
            .channel_id
            .send_message(ctx, channel_message(reply))
            .await?;
    }
    Ok(())
}
