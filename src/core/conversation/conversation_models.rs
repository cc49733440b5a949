use crate::core::reports::{CLEANING_STATUSES, DAILY_TASKS};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
        }
    }
}

/// Whoever sent the current event, reduced to what reports need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    pub user_id: u64,
    pub display_name: String,
}

impl StaffMember {
    pub fn new(user_id: u64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

/// Where a user is inside a reporting flow. Each variant carries only what
/// has been collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingRoom,
    AwaitingStatus { room: String },
    AwaitingIssue,
    AwaitingTask,
}

/// A flow in progress for one user.
#[derive(Debug, Clone)]
pub(crate) struct ActiveFlow {
    pub state: FlowState,
    /// Refreshed on every step, so only idle flows expire.
    pub last_active: Instant,
}

/// A fixed-choice quick-reply list. Each one only answers the flow step that
/// offered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    CleaningStatus,
    DailyTask,
}

impl Selector {
    pub const ALL: [Selector; 2] = [Selector::CleaningStatus, Selector::DailyTask];

    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Selector::CleaningStatus => &CLEANING_STATUSES,
            Selector::DailyTask => &DAILY_TASKS,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Selector::CleaningStatus => "status",
            Selector::DailyTask => "task",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|selector| selector.token() == token)
    }

    /// The listed label matching `input`, ignoring case and surrounding space.
    pub fn pick(&self, input: &str) -> Option<&'static str> {
        let input = input.trim();
        self.labels()
            .iter()
            .copied()
            .find(|label| label.eq_ignore_ascii_case(input))
    }
}

/// Buttons attached to the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    ViewTodayReports,
    /// Placeholder: acknowledged but never touches the log.
    ResetTasks,
}

impl AdminAction {
    pub const ALL: [AdminAction; 2] = [AdminAction::ViewTodayReports, AdminAction::ResetTasks];

    pub fn token(&self) -> &'static str {
        match self {
            AdminAction::ViewTodayReports => "view_reports",
            AdminAction::ResetTasks => "reset_tasks",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.token() == token)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdminAction::ViewTodayReports => "View Today's Reports",
            AdminAction::ResetTasks => "Reset Task List",
        }
    }
}

/// Extra controls to render under a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    None,
    /// A fixed set of quick replies for one flow step.
    Choices(Selector),
    AdminPanel,
}

impl ReplyMarkup {
    pub fn cleaning_statuses() -> Self {
        ReplyMarkup::Choices(Selector::CleaningStatus)
    }

    pub fn daily_tasks() -> Self {
        ReplyMarkup::Choices(Selector::DailyTask)
    }
}

/// Platform-agnostic outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: ReplyMarkup,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: ReplyMarkup::None,
        }
    }

    pub fn with_markup(text: impl Into<String>, markup: ReplyMarkup) -> Self {
        Self {
            text: text.into(),
            markup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_action_tokens_round_trip() {
        for action in AdminAction::ALL {
            assert_eq!(AdminAction::from_token(action.token()), Some(action));
        }
        assert_eq!(AdminAction::from_token("drop_tables"), None);
    }

    #[test]
    fn test_selector_pick_only_accepts_listed_labels() {
        assert_eq!(Selector::CleaningStatus.pick(" in progress "), Some("In Progress"));
        assert_eq!(Selector::CleaningStatus.pick("Laundry Check"), None);
        assert_eq!(Selector::DailyTask.pick("Laundry Check"), Some("Laundry Check"));
        assert_eq!(Selector::DailyTask.pick("Dirty"), None);
        assert_eq!(Selector::from_token("task"), Some(Selector::DailyTask));
        assert_eq!(Selector::from_token("choice"), None);
    }
}
