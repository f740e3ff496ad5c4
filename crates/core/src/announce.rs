//! Announcement formatting.
//!
//! Pure mapping from (selected members, invoking user) to the message that
//! is posted in the announcement channel. Mention tokens are Discord's
//! `<@id>` form and need no further escaping by construction.

/// A platform user, reduced to what formatting needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserRef {
    pub id: u64,
}

impl UserRef {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

pub const ANNOUNCEMENT_SUFFIX: &str = " is calling you. Please come to the voice channel.";

/// Renders a clickable, notifying reference to `user`.
pub fn mention_token(user: UserRef) -> String {
    format!("<@{}>", user.id)
}

/// Selected members' mentions space-joined, a newline, the invoker's
/// mention, then the fixed trailing phrase. Selection order is preserved.
pub fn format_announcement(selected: &[UserRef], invoker: UserRef) -> String {
    let mentions =
        selected.iter().map(|user| mention_token(*user)).collect::<Vec<_>>().join(" ");

    format!("{mentions}\n{}{ANNOUNCEMENT_SUFFIX}", mention_token(invoker))
}
