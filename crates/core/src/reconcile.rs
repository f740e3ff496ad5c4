//! The startup "is a summon button already posted?" decision.
//!
//! The scan is advisory: it looks at the last ten messages of the button
//! channel and treats any bot-authored message carrying a component as the
//! button. An unrelated bot message with components false-positives, and a
//! button buried more than ten messages deep false-negatives. Duplicate
//! buttons are a cosmetic nuisance, not a correctness failure, so the
//! window is left as-is.

/// How many recent messages the reconciler inspects per guild.
pub const HISTORY_SCAN_LIMIT: u8 = 10;

/// One inspected message, reduced to the two facts the decision needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScannedMessage {
    pub authored_by_bot: bool,
    pub has_components: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileAction {
    /// No bot-authored component message found; post a fresh button.
    PostButton,
    /// A button (or something indistinguishable from one) is present.
    LeaveAlone,
}

/// Message order is irrelevant: the scan checks existence, not recency.
pub fn decide(recent: &[ScannedMessage]) -> ReconcileAction {
    let present = recent.iter().any(|message| message.authored_by_bot && message.has_components);
    if present {
        ReconcileAction::LeaveAlone
    } else {
        ReconcileAction::PostButton
    }
}
