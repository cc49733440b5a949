// This is the entry point of the HotelFlow bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (report flows, roles, the report log)
// - `infra/` = Implementations of core traits (Google Sheets, in-memory)
// - `discord/` = Discord-specific adapters (commands, buttons, DMs)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a pile of mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::{BotConfig, ServiceAccountSource, StorageMode};
use crate::core::conversation::{ConversationService, RoleRegistry};
use crate::core::reports::{Clock, ReportLog, StoreError};
use crate::discord::commands::presence;
use crate::discord::interactions;
use crate::discord::notifications::spawn_admin_dispatcher;
use crate::discord::{Data, Error};
use crate::infra::sheets::{
    GoogleSheetsClient, InMemoryWorksheetStore, ServiceAccountAuth, WorksheetBackend,
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Event handler for non-command Discord events: typed replies inside a
/// report flow, and button clicks.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = interactions::handle_message(ctx, data, new_message).await {
                tracing::error!(
                    user_id = new_message.author.id.get(),
                    "Error handling flow message: {}",
                    e
                );
            }
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            if let Err(e) = interactions::handle_component(ctx, data, component).await {
                tracing::error!(
                    user_id = component.user.id.get(),
                    "Error handling button click: {}",
                    e
                );
            }
        }
        _ => {}
    }

    Ok(())
}

/// Connects to the configured worksheet store. Missing Sheets settings or a
/// failed connection aren't fatal: the bot still runs and tells staff
/// storage is unavailable.
async fn open_report_log(
    storage: &StorageMode,
    clock: Arc<dyn Clock>,
) -> ReportLog<WorksheetBackend> {
    match storage {
        StorageMode::Memory => {
            tracing::warn!("Reports are kept in memory only and will be lost on restart");
            ReportLog::new(
                WorksheetBackend::InMemory(InMemoryWorksheetStore::new()),
                clock,
            )
        }
        StorageMode::Unavailable(reason) => {
            tracing::error!(
                reason = %reason,
                "Google Sheets is not configured; reports will be refused until restart"
            );
            ReportLog::unavailable(clock)
        }
        StorageMode::Sheets {
            spreadsheet_id,
            credentials,
        } => match connect_sheets(spreadsheet_id, credentials).await {
            Ok(client) => ReportLog::new(WorksheetBackend::Google(client), clock),
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "Google Sheets unavailable; reports will be refused until restart"
                );
                ReportLog::unavailable(clock)
            }
        },
    }
}

async fn connect_sheets(
    spreadsheet_id: &str,
    credentials: &ServiceAccountSource,
) -> Result<GoogleSheetsClient, StoreError> {
    let auth = match credentials {
        ServiceAccountSource::KeyFile(path) => ServiceAccountAuth::from_file(path).await?,
        ServiceAccountSource::InlineJson(json) => ServiceAccountAuth::from_json(json)?,
    };
    let client = GoogleSheetsClient::new(auth, spreadsheet_id);
    client.connect().await?;
    Ok(client)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let clock: Arc<dyn Clock> = Arc::new(config.clock);
    let reports = open_report_log(&config.storage, clock).await;
    tracing::info!(available = reports.is_available(), "Report log ready");

    // Role assignments are shared by reference rather than living in a global.
    let roles = Arc::new(RoleRegistry::new(config.admin_user_id));
    let mut conversations = ConversationService::new(reports, roles);

    if let Some(timeout) = config.flow_timeout {
        conversations = conversations.with_flow_timeout(timeout);
    }

    // Admin alerts only exist when there's an admin to send them to.
    let mut alert_receiver = None;
    if config.admin_user_id.is_some() {
        let (sender, receiver) = mpsc::unbounded_channel();
        conversations = conversations.with_admin_alerts(sender);
        alert_receiver = Some(receiver);
    } else {
        tracing::warn!("ADMIN_USER_ID not set; admin alerts are disabled");
    }

    let conversations = Arc::new(conversations);

    // Sweep abandoned flows once a minute.
    if config.flow_timeout.is_some() {
        let conversations = Arc::clone(&conversations);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            loop {
                ticker.tick().await;
                let dropped = conversations.expire_stale_flows();
                if dropped > 0 {
                    tracing::info!(dropped, "Expired stale report flows");
                }
            }
        });
    }

    let data = Data {
        conversations: Arc::clone(&conversations),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read flow replies
        | serenity::GatewayIntents::GUILDS;

    let admin_user_id = config.admin_user_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::reports::start(),
                discord::commands::reports::help(),
                discord::commands::reports::clean(),
                discord::commands::reports::issue(),
                discord::commands::reports::tasks(),
                discord::commands::reports::cancel(),
                discord::commands::admin::admin(),
                discord::commands::admin::set_role(),
            ],
            // Staff are used to typing "/clean" as plain text too.
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("/".into()),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");

                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered");

                presence::on_ready(ctx);

                if let (Some(admin_user_id), Some(receiver)) = (admin_user_id, alert_receiver) {
                    spawn_admin_dispatcher(ctx.http.clone(), admin_user_id, receiver);
                }

                tracing::info!("Bot is ready!");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}
