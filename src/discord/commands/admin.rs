use crate::core::conversation::Role;
use crate::discord::replies::command_reply;
use crate::discord::{staff_member, Context, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum RoleChoice {
    #[name = "admin"]
    Admin,
    #[name = "staff"]
    Staff,
}

impl From<RoleChoice> for Role {
    fn from(choice: RoleChoice) -> Self {
        match choice {
            RoleChoice::Admin => Role::Admin,
            RoleChoice::Staff => Role::Staff,
        }
    }
}

/// Open the admin control panel.
#[poise::command(slash_command, prefix_command)]
pub async fn admin(ctx: Context<'_>) -> Result<(), Error> {
    let staff = staff_member(ctx.author());
    let reply = ctx.data().conversations.open_admin_panel(&staff);
    ctx.send(command_reply(reply)).await?;
    Ok(())
}

/// Change a user's role until the bot restarts.
#[poise::command(slash_command, prefix_command, rename = "setrole")]
pub async fn set_role(
    ctx: Context<'_>,
    #[description = "User to update"] user: serenity::User,
    #[description = "New role"] role: RoleChoice,
) -> Result<(), Error> {
    if user.bot {
        ctx.say("Bots can't file reports! 🤖").await?;
        return Ok(());
    }

    let caller = staff_member(ctx.author());
    let reply = ctx
        .data()
        .conversations
        .set_role(&caller, user.id.get(), role.into());
    ctx.send(command_reply(reply)).await?;
    Ok(())
}
