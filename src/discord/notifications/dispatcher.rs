use crate::core::conversation::AdminAlert;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Drains the admin alert queue, delivering each alert as a DM.
///
/// Runs apart from the command handlers so a slow or failing delivery never
/// holds up a staff member's confirmation.
pub fn spawn_admin_dispatcher(
    http: Arc<serenity::Http>,
    admin_user_id: u64,
    mut alerts: UnboundedReceiver<AdminAlert>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(alert) = alerts.recv().await {
            if let Err(err) = send_alert(&http, admin_user_id, &alert).await {
                tracing::warn!(
                    admin_user_id,
                    error = %err,
                    "Failed to deliver admin alert"
                );
            }
        }
        tracing::debug!("Admin alert queue closed");
    })
}

async fn send_alert(
    http: &serenity::Http,
    admin_user_id: u64,
    alert: &AdminAlert,
) -> Result<(), serenity::Error> {
    serenity::UserId::new(admin_user_id)
        .direct_message(http, serenity::CreateMessage::new().content(alert.message()))
        .await?;
    Ok(())
}
