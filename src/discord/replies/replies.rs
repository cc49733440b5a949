// Renders core `Reply` values as Discord messages. Quick-reply choices and
// admin panel actions become a row of buttons; the button custom IDs are
// parsed back by the interaction handler.
//
// Custom IDs look like `status:Clean`, `task:Laundry Check` or
// `admin:view_reports`, so a click always says which list it came from.

use crate::core::conversation::{AdminAction, Reply, ReplyMarkup, Selector};
use poise::serenity_prelude as serenity;

const ADMIN_TOKEN: &str = "admin";

/// What a clicked button means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Choice { selector: Selector, label: String },
    Admin(AdminAction),
}

pub fn choice_button_id(selector: Selector, label: &str) -> String {
    format!("{}:{}", selector.token(), label)
}

pub fn admin_button_id(action: AdminAction) -> String {
    format!("{}:{}", ADMIN_TOKEN, action.token())
}

pub fn parse_button_id(custom_id: &str) -> Option<ButtonAction> {
    let (token, value) = custom_id.split_once(':')?;
    if token == ADMIN_TOKEN {
        return AdminAction::from_token(value).map(ButtonAction::Admin);
    }
    Selector::from_token(token).map(|selector| ButtonAction::Choice {
        selector,
        label: value.to_string(),
    })
}

fn build_components(markup: &ReplyMarkup) -> Vec<serenity::CreateActionRow> {
    let buttons: Vec<serenity::CreateButton> = match markup {
        ReplyMarkup::None => return Vec::new(),
        ReplyMarkup::Choices(selector) => selector
            .labels()
            .iter()
            .map(|label| {
                serenity::CreateButton::new(choice_button_id(*selector, label))
                    .label(*label)
                    .style(serenity::ButtonStyle::Primary)
            })
            .collect(),
        ReplyMarkup::AdminPanel => AdminAction::ALL
            .iter()
            .map(|action| {
                serenity::CreateButton::new(admin_button_id(*action))
                    .label(action.label())
                    .style(serenity::ButtonStyle::Secondary)
            })
            .collect(),
    };
    vec![serenity::CreateActionRow::Buttons(buttons)]
}

/// Reply to a slash or prefix command.
pub fn command_reply(reply: Reply) -> poise::CreateReply {
    let components = build_components(&reply.markup);
    let mut out = poise::CreateReply::default().content(reply.text);
    if !components.is_empty() {
        out = out.components(components);
    }
    out
}

/// Reply posted into a channel after a plain text message.
pub fn channel_message(reply: Reply) -> serenity::CreateMessage {
    let components = build_components(&reply.markup);
    let mut out = serenity::CreateMessage::new().content(reply.text);
    if !components.is_empty() {
        out = out.components(components);
    }
    out
}

/// Follow-up to a deferred button click.
pub fn button_followup(reply: Reply) -> serenity::CreateInteractionResponseFollowup {
    let components = build_components(&reply.markup);
    let mut out = serenity::CreateInteractionResponseFollowup::new().content(reply.text);
    if !components.is_empty() {
        out = out.components(components);
    }
    out
}
