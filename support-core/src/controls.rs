//! Control vocabulary for forwarded ticket messages.
//!
//! Every ticket in the review channel carries two toggles: ban state and
//! answer state. [`ControlSet`] is the rendered pair for a ticket's current
//! `{banned, answered}`; [`ControlAction`] is what comes back when an operator
//! presses a button.

use serde::{Deserialize, Serialize};

/// Callback-data prefix for ticket controls. The ticket itself is identified
/// by the channel message the keyboard is attached to.
pub const CALLBACK_PREFIX: &str = "ticket";

/// One pressable control under a ticket message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlAction {
    Ban,
    Unban,
    Answered,
    Unanswered,
}

impl ControlAction {
    /// Button label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            ControlAction::Ban => "Ban",
            ControlAction::Unban => "Banned",
            ControlAction::Answered => "Answered",
            ControlAction::Unanswered => "Unanswered",
        }
    }

    /// Encodes the action as callback data (`ticket:<action>`).
    pub fn callback_data(&self) -> String {
        let tag = match self {
            ControlAction::Ban => "ban",
            ControlAction::Unban => "unban",
            ControlAction::Answered => "answered",
            ControlAction::Unanswered => "unanswered",
        };
        format!("{CALLBACK_PREFIX}:{tag}")
    }

    /// Decodes callback data produced by [`ControlAction::callback_data`].
    /// Returns `None` for anything that is not a ticket control.
    pub fn parse(data: &str) -> Option<Self> {
        let tag = data.strip_prefix(CALLBACK_PREFIX)?.strip_prefix(':')?;
        match tag {
            "ban" => Some(ControlAction::Ban),
            "unban" => Some(ControlAction::Unban),
            "answered" => Some(ControlAction::Answered),
            "unanswered" => Some(ControlAction::Unanswered),
            _ => None,
        }
    }
}

/// The two-toggle control set for a ticket's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlSet {
    pub banned: bool,
    pub answered: bool,
}

impl ControlSet {
    pub fn new(banned: bool, answered: bool) -> Self {
        Self { banned, answered }
    }

    /// Buttons in render order: ban toggle first, answer toggle second.
    pub fn buttons(&self) -> [ControlAction; 2] {
        let ban = if self.banned {
            ControlAction::Unban
        } else {
            ControlAction::Ban
        };
        let answer = if self.answered {
            ControlAction::Answered
        } else {
            ControlAction::Unanswered
        };
        [ban, answer]
    }
}
