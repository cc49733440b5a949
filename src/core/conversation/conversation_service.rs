// The conversation router: turns staff commands and replies into report
// records. Like the rest of core, it has no Discord types in it. Every
// operation takes a `StaffMember` and returns a `Reply` that the platform
// layer renders however it likes.
//
// Each user has at most one flow in progress:
//
//   /clean  : AwaitingRoom -> AwaitingStatus { room } -> (saved)
//   /issue  : AwaitingIssue -> (saved)
//   /tasks  : AwaitingTask -> (saved)
//
// `/cancel` drops whatever is in progress. A failed save keeps the flow so
// the user can simply send the last answer again.
//
// Events can arrive on concurrent tasks, so each user's answers are
// run one at a time under a per-user lock held across the save.

use super::admin_alerts::AdminAlert;
use super::conversation_models::{
    ActiveFlow, AdminAction, FlowState, Reply, ReplyMarkup, Role, Selector, StaffMember,
};
use super::role_registry::RoleRegistry;
use crate::core::reports::{
    LoggedRow, ReportKind, ReportLog, ReportLogError, ReportRecord, WorksheetStore,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{Mutex, OwnedMutexGuard};

const ACCESS_DENIED: &str = "🚫 Access Denied.";
const STORAGE_UNAVAILABLE: &str =
    "⚠️ Report storage is unavailable right now. Please try again later.";
const SAVE_FAILED: &str = "⚠️ Could not save your report. Please send it again.";
const FLOW_EXPIRED: &str = "⌛ That report is no longer active. Start again with /clean.";

pub struct ConversationService<S: WorksheetStore> {
    reports: ReportLog<S>,
    roles: Arc<RoleRegistry>,
    // User ID -> flow in progress. No entry means idle.
    flows: DashMap<u64, ActiveFlow>,
    turns: DashMap<u64, Arc<Mutex<()>>>,
    flow_timeout: Option<Duration>,
    alerts: Option<UnboundedSender<AdminAlert>>,
}

impl<S: WorksheetStore> ConversationService<S> {
    pub fn new(reports: ReportLog<S>, roles: Arc<RoleRegistry>) -> Self {
        Self {
            reports,
            roles,
            flows: DashMap::new(),
            turns: DashMap::new(),
            flow_timeout: None,
            alerts: None,
        }
    }

    /// Flows left untouched for longer than `timeout` are forgotten.
    pub fn with_flow_timeout(mut self, timeout: Duration) -> Self {
        self.flow_timeout = Some(timeout);
        self
    }

    /// Queue that receives an alert for every saved report.
    pub fn with_admin_alerts(mut self, alerts: UnboundedSender<AdminAlert>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    // ------------------------------------------------------------------------
    // Start / help
    // ------------------------------------------------------------------------

    pub fn handle_start(&self, user: &StaffMember) -> Reply {
        self.roles.claim_first_admin(user.user_id);
        let role = self.roles.role_of(user.user_id);

        let mut text = format!(
            "Welcome to HotelFlow, {}!\nYour current role: **{}**\n\n",
            user.display_name,
            role.label()
        );

        if role == Role::Admin {
            text.push_str(
                "Admin Commands:\n/admin - Admin Dashboard\n/setrole - Change user roles\n\n",
            );
        }
        text.push_str(
            "Staff Commands:\n/clean - Report Cleaning\n/issue - Report Maintenance\n\
             /tasks - Daily Tasks\n/cancel - Cancel the current report",
        );

        Reply::text(text)
    }

    // ------------------------------------------------------------------------
    // Flow entry points
    // ------------------------------------------------------------------------

    pub fn begin_cleaning_report(&self, user: &StaffMember) -> Reply {
        self.begin_flow(
            user,
            FlowState::AwaitingRoom,
            Reply::text("Enter the Room Number:"),
        )
    }

    pub fn begin_maintenance_report(&self, user: &StaffMember) -> Reply {
        self.begin_flow(
            user,
            FlowState::AwaitingIssue,
            Reply::text("Please describe the maintenance issue:"),
        )
    }

    pub fn begin_task_report(&self, user: &StaffMember) -> Reply {
        self.begin_flow(
            user,
            FlowState::AwaitingTask,
            Reply::with_markup("Select the task you completed:", ReplyMarkup::daily_tasks()),
        )
    }

    fn begin_flow(&self, user: &StaffMember, state: FlowState, prompt: Reply) -> Reply {
        if self.active_state(user.user_id).is_some() {
            return Reply::text(
                "⏳ Please finish your current report first, or use /cancel to drop it.",
            );
        }

        tracing::debug!(user_id = user.user_id, state = ?state, "Flow started");
        self.flows.insert(
            user.user_id,
            ActiveFlow {
                state,
                last_active: Instant::now(),
            },
        );
        prompt
    }

    // ------------------------------------------------------------------------
    // Free text / quick replies
    // ------------------------------------------------------------------------

    /// Feeds a typed message into the user's flow. Returns `None` when the
    /// user has nothing in progress.
    pub async fn receive_text(&self, user: &StaffMember, text: &str) -> Option<Reply> {
        let _turn = self.take_turn(user.user_id).await;

        let reply = match self.active_state(user.user_id)? {
            FlowState::Idle => return None,
            FlowState::AwaitingRoom => self.receive_room(user, text),
            FlowState::AwaitingStatus { room } => match Selector::CleaningStatus.pick(text) {
                Some(status) => self.receive_status(user, room, status).await,
                None => Reply::with_markup(
                    format!("Please pick a status for Room {}:", room),
                    ReplyMarkup::cleaning_statuses(),
                ),
            },
            FlowState::AwaitingIssue => self.receive_issue(user, text).await,
            FlowState::AwaitingTask => match Selector::DailyTask.pick(text) {
                Some(task) => self.receive_task(user, task).await,
                None => Reply::with_markup(
                    "Please pick one of the listed tasks:",
                    ReplyMarkup::daily_tasks(),
                ),
            },
        };
        Some(reply)
    }

    /// Feeds a quick-reply pick into the user's flow. Returns `None` unless
    /// the user is on the step that `selector` belongs to.
    pub async fn receive_choice(
        &self,
        user: &StaffMember,
        selector: Selector,
        label: &str,
    ) -> Option<Reply> {
        let _turn = self.take_turn(user.user_id).await;

        let state = self.active_state(user.user_id)?;
        let choice = selector.pick(label)?;
        match (selector, state) {
            (Selector::CleaningStatus, FlowState::AwaitingStatus { room }) => {
                Some(self.receive_status(user, room, choice).await)
            }
            (Selector::DailyTask, FlowState::AwaitingTask) => {
                Some(self.receive_task(user, choice).await)
            }
            (selector, state) => {
                tracing::debug!(user_id = user.user_id, ?selector, ?state, "Choice for another step");
                None
            }
        }
    }

    fn receive_room(&self, user: &StaffMember, room: &str) -> Reply {
        let room = room.trim().to_string();
        let prompt = format!("Status for Room {}?", room);
        if !self.set_state(user.user_id, FlowState::AwaitingStatus { room }) {
            return Reply::text(FLOW_EXPIRED);
        }
        Reply::with_markup(prompt, ReplyMarkup::cleaning_statuses())
    }

    async fn receive_status(&self, user: &StaffMember, room: String, status: &str) -> Reply {
        let status = status.trim();
        let record =
            ReportRecord::cleaning(self.reports.now(), &user.display_name, &room, status);
        if let Err(reply) = self.save(user, &record).await {
            return reply;
        }

        self.flows.remove(&user.user_id);
        self.notify_admin(AdminAlert::Cleaning {
            staff: user.display_name.clone(),
            room: room.clone(),
            status: status.to_string(),
        });
        Reply::text(format!("✅ Room {} updated to {}.", room, status))
    }

    async fn receive_issue(&self, user: &StaffMember, issue: &str) -> Reply {
        let issue = issue.trim();
        let record = ReportRecord::maintenance(self.reports.now(), &user.display_name, issue);
        if let Err(reply) = self.save(user, &record).await {
            return reply;
        }

        self.flows.remove(&user.user_id);
        let notified = self.notify_admin(AdminAlert::Maintenance {
            staff: user.display_name.clone(),
            issue: issue.to_string(),
        });
        if notified {
            Reply::text("✅ Maintenance issue filed and Admin notified.")
        } else {
            Reply::text("✅ Maintenance issue filed.")
        }
    }

    async fn receive_task(&self, user: &StaffMember, task: &str) -> Reply {
        let task = task.trim();
        let record = ReportRecord::task(self.reports.now(), &user.display_name, task);
        if let Err(reply) = self.save(user, &record).await {
            return reply;
        }

        self.flows.remove(&user.user_id);
        self.notify_admin(AdminAlert::TaskCompleted {
            staff: user.display_name.clone(),
            task: task.to_string(),
        });
        Reply::text(format!("✅ Task '{}' logged.", task))
    }

    /// Appends the record, mapping failures to the reply the user should see.
    async fn save(&self, user: &StaffMember, record: &ReportRecord) -> Result<(), Reply> {
        match self.reports.append(record).await {
            Ok(()) => Ok(()),
            Err(ReportLogError::Unavailable) => {
                tracing::warn!(
                    user_id = user.user_id,
                    kind = ?record.kind(),
                    "Report dropped: storage unavailable"
                );
                Err(Reply::text(STORAGE_UNAVAILABLE))
            }
            Err(err) => {
                tracing::error!(
                    user_id = user.user_id,
                    kind = ?record.kind(),
                    error = %err,
                    "Failed to save report"
                );
                Err(Reply::text(SAVE_FAILED))
            }
        }
    }

    /// Queues an alert for the admin. Never fails the caller; returns
    /// whether the alert was queued.
    fn notify_admin(&self, alert: AdminAlert) -> bool {
        let Some(alerts) = &self.alerts else {
            return false;
        };
        if alerts.send(alert).is_err() {
            tracing::warn!("Admin alert queue is closed, dropping alert");
            return false;
        }
        true
    }

    // ------------------------------------------------------------------------
    // Cancel
    // ------------------------------------------------------------------------

    pub fn cancel(&self, user: &StaffMember) -> Reply {
        if self.flows.remove(&user.user_id).is_some() {
            tracing::debug!(user_id = user.user_id, "Flow cancelled");
        }
        Reply::text("Action cancelled.")
    }

    // ------------------------------------------------------------------------
    // Admin panel
    // ------------------------------------------------------------------------

    pub fn open_admin_panel(&self, user: &StaffMember) -> Reply {
        if !self.roles.is_admin(user.user_id) {
            return Reply::text(ACCESS_DENIED);
        }
        Reply::with_markup("🛠 **Admin Control Panel**", ReplyMarkup::AdminPanel)
    }

    pub async fn handle_admin_action(&self, user: &StaffMember, action: AdminAction) -> Reply {
        // Panel buttons are visible to everyone in the channel.
        if !self.roles.is_admin(user.user_id) {
            return Reply::text(ACCESS_DENIED);
        }

        match action {
            AdminAction::ViewTodayReports => {
                match self.reports.query_today(ReportKind::Cleaning).await {
                    Ok(rows) => Reply::text(render_cleaning_summary(&rows)),
                    Err(ReportLogError::Unavailable) => Reply::text(STORAGE_UNAVAILABLE),
                    Err(err) => {
                        tracing::error!(error = %err, "Failed to load today's reports");
                        Reply::text("⚠️ Could not load today's reports. Please try again.")
                    }
                }
            }
            AdminAction::ResetTasks => Reply::text(
                "🧹 Task list reset is not available yet. No reports were changed.",
            ),
        }
    }

    /// Admin-only: assign a role to another user for the rest of this run.
    pub fn set_role(&self, caller: &StaffMember, target_user_id: u64, role: Role) -> Reply {
        if !self.roles.is_admin(caller.user_id) {
            return Reply::text(ACCESS_DENIED);
        }

        self.roles.assign(target_user_id, role);
        tracing::info!(
            admin_id = caller.user_id,
            target_user_id,
            role = role.label(),
            "Role assigned"
        );

        if role == Role::Staff && self.roles.configured_admin() == Some(target_user_id) {
            return Reply::text(
                "ℹ️ That user is the configured administrator and stays ADMIN.",
            );
        }
        Reply::text(format!("✅ <@{}> is now **{}**.", target_user_id, role.label()))
    }

    // ------------------------------------------------------------------------
    // Flow bookkeeping
    // ------------------------------------------------------------------------

    #[cfg(test)]
    pub fn flow_state(&self, user_id: u64) -> FlowState {
        self.active_state(user_id).unwrap_or(FlowState::Idle)
    }

    /// Waits until no other event of this user is being handled.
    async fn take_turn(&self, user_id: u64) -> OwnedMutexGuard<()> {
        let lock = self.turns.entry(user_id).or_default().clone();
        lock.lock_owned().await
    }

    /// The user's live flow state, discarding it if it has gone stale.
    fn active_state(&self, user_id: u64) -> Option<FlowState> {
        let (state, last_active) = self
            .flows
            .get(&user_id)
            .map(|flow| (flow.state.clone(), flow.last_active))?;

        if self.is_expired(last_active) {
            self.flows.remove(&user_id);
            tracing::debug!(user_id, "Discarded stale flow");
            return None;
        }
        Some(state)
    }

    /// Moves the user's flow on. Returns false if the flow was swept away
    /// in the meantime.
    fn set_state(&self, user_id: u64, state: FlowState) -> bool {
        match self.flows.get_mut(&user_id) {
            Some(mut flow) => {
                flow.state = state;
                flow.last_active = Instant::now();
                true
            }
            None => false,
        }
    }

    fn is_expired(&self, last_active: Instant) -> bool {
        self.flow_timeout
            .map(|timeout| last_active.elapsed() > timeout)
            .unwrap_or(false)
    }

    /// Drops every stale flow. Returns how many were removed.
    pub fn expire_stale_flows(&self) -> usize {
        let before = self.flows.len();
        self.flows.retain(|_, flow| !self.is_expired(flow.last_active));
        before.saturating_sub(self.flows.len())
    }
}

/// One line per cleaning row, in log order.
pub fn render_cleaning_summary(rows: &[LoggedRow]) -> String {
    if rows.is_empty() {
        return "No reports for today yet.".to_string();
    }

    let mut message = String::from("**Today's Cleaning Reports:**");
    for row in rows {
        message.push('\n');
        message.push_str(&format!(
            "Room {}: {} ({})",
            row.get("Room").unwrap_or("?"),
            row.get("Status").unwrap_or("?"),
            row.get("Staff").unwrap_or("?"),
        ));
    }
    message
}
