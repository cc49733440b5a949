// Bot presence. Discord-layer glue only: it sets the status line shown under
// the bot's name so staff can tell at a glance what it's for.

use poise::serenity_prelude as serenity;

/// Called once the bot is ready.
pub fn on_ready(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::watching("housekeeping reports | /start");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
