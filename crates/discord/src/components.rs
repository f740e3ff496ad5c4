//! Component identifiers, UI builders, and the custom-id router.
//!
//! The summon button's identifier must stay byte-stable across deploys:
//! button presses are dispatched by matching the identifier, so messages
//! posted by previous process runs stay interactive indefinitely. Changing
//! it orphans every button already sitting in a channel.

use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateSelectMenu, CreateSelectMenuKind,
};

use beckon_core::picker::{MAX_SELECTION, MIN_SELECTION};

/// Persistent identifier carried by every summon button ever posted.
pub const SUMMON_BUTTON_ID: &str = "persistent_view:call_button";
pub const MEMBER_SELECT_ID: &str = "summon_picker:member_select";
pub const CONFIRM_BUTTON_ID: &str = "summon_picker:confirm";

pub const BUTTON_MESSAGE_TEXT: &str = "Press the button below to start a summon.";
pub const PICKER_INTRO_TEXT: &str = "Select the members to summon, then press Send.";
const SELECT_PLACEHOLDER: &str = "Select the members to summon (multiple allowed)";

/// What a component interaction should do, resolved from its custom id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentAction {
    OpenPicker,
    SelectionChanged,
    ConfirmSummon,
}

/// Explicit identifier-to-action mapping; unknown ids belong to someone
/// else's components and are ignored.
pub fn route(custom_id: &str) -> Option<ComponentAction> {
    match custom_id {
        SUMMON_BUTTON_ID => Some(ComponentAction::OpenPicker),
        MEMBER_SELECT_ID => Some(ComponentAction::SelectionChanged),
        CONFIRM_BUTTON_ID => Some(ComponentAction::ConfirmSummon),
        _ => None,
    }
}

/// The action row posted with the persistent button message.
pub fn summon_button_row() -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new(SUMMON_BUTTON_ID)
        .label("Summon")
        .style(ButtonStyle::Primary)])
}

/// The ephemeral picker: a user multi-select over a green confirm button.
pub fn picker_rows() -> Vec<CreateActionRow> {
    let member_select =
        CreateSelectMenu::new(MEMBER_SELECT_ID, CreateSelectMenuKind::User { default_users: None })
            .placeholder(SELECT_PLACEHOLDER)
            .min_values(MIN_SELECTION as u8)
            .max_values(MAX_SELECTION as u8);

    vec![
        CreateActionRow::SelectMenu(member_select),
        CreateActionRow::Buttons(vec![CreateButton::new(CONFIRM_BUTTON_ID)
            .label("Send")
            .style(ButtonStyle::Success)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        route, ComponentAction, CONFIRM_BUTTON_ID, MEMBER_SELECT_ID, SUMMON_BUTTON_ID,
    };

    #[test]
    fn persistent_identifier_is_stable() {
        // Existing button messages reference this exact string; see the
        // module docs before ever changing it.
        assert_eq!(SUMMON_BUTTON_ID, "persistent_view:call_button");
    }

    #[test]
    fn router_maps_each_known_identifier() {
        assert_eq!(route(SUMMON_BUTTON_ID), Some(ComponentAction::OpenPicker));
        assert_eq!(route(MEMBER_SELECT_ID), Some(ComponentAction::SelectionChanged));
        assert_eq!(route(CONFIRM_BUTTON_ID), Some(ComponentAction::ConfirmSummon));
    }

    #[test]
    fn router_ignores_foreign_identifiers() {
        assert_eq!(route("some_other_bot:button"), None);
        assert_eq!(route(""), None);
    }
}
