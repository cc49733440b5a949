// Staff-facing commands. Each one is a thin wrapper: identify the caller,
// ask the conversation service, send back whatever it says.

use crate::core::conversation::Reply;
use crate::discord::replies::command_reply;
use crate::discord::{staff_member, Context, Error};

async fn respond(ctx: Context<'_>, reply: Reply) -> Result<(), Error> {
    ctx.send(command_reply(reply)).await?;
    Ok(())
}

/// Show your role and the commands available to you.
#[poise::command(slash_command, prefix_command)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    let staff = staff_member(ctx.author());
    let reply = ctx.data().conversations.handle_start(&staff);
    respond(ctx, reply).await
}

/// Same as /start.
#[poise::command(slash_command, prefix_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let staff = staff_member(ctx.author());
    let reply = ctx.data().conversations.handle_start(&staff);
    respond(ctx, reply).await
}

/// Report the cleaning status of a room.
#[poise::command(slash_command, prefix_command)]
pub async fn clean(ctx: Context<'_>) -> Result<(), Error> {
    let staff = staff_member(ctx.author());
    let reply = ctx.data().conversations.begin_cleaning_report(&staff);
    respond(ctx, reply).await
}

/// Report a maintenance issue.
#[poise::command(slash_command, prefix_command)]
pub async fn issue(ctx: Context<'_>) -> Result<(), Error> {
    let staff = staff_member(ctx.author());
    let reply = ctx.data().conversations.begin_maintenance_report(&staff);
    respond(ctx, reply).await
}

/// Log a completed daily task.
#[poise::command(slash_command, prefix_command)]
pub async fn tasks(ctx: Context<'_>) -> Result<(), Error> {
    let staff = staff_member(ctx.author());
    let reply = ctx.data().conversations.begin_task_report(&staff);
    respond(ctx, reply).await
}

/// Drop the report you're currently filling in.
#[poise::command(slash_command, prefix_command)]
pub async fn cancel(ctx: Context<'_>) -> Result<(), Error> {
    let staff = staff_member(ctx.author());
    let reply = ctx.data().conversations.cancel(&staff);
    respond(ctx, reply).await
}
