//! Platform-neutral interactive controls attached to mirrors.
//!
//! Every control carries a custom id of the form `pt:<item id>:<action>`,
//! which is all an interaction needs to find its way back to the
//! dispatcher.

use crate::{BanDuration, ItemId};
use derive_getters::Getters;
use powertrip_error::{ActionError, ActionErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum number of control rows on one message.
pub const MAX_ROWS: usize = 5;

/// Maximum number of buttons in one row.
pub const MAX_CONTROLS_PER_ROW: usize = 5;

/// Maximum number of options in one select menu.
pub const MAX_SELECT_OPTIONS: usize = 25;

/// Maximum label length in characters.
pub const MAX_LABEL_LEN: usize = 80;

const PREFIX: &str = "pt";

/// What a control does when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Action {
    /// Approve the item
    #[display("approve")]
    Approve,
    /// Remove without a reason
    #[display("remove")]
    Remove,
    /// Open the removal reason picker
    #[display("reasons")]
    Reasons,
    /// Removal reason select menu
    #[display("reason")]
    Reason,
    /// Remove with the selected reason
    #[display("confirm")]
    Confirm,
    /// Leave the reason picker
    #[display("cancel")]
    Cancel,
    /// Ban the author, removing the item first
    #[display("ban:{}", _0)]
    Ban(BanDuration),
    /// Disabled error indicator
    #[display("error")]
    Error,
}

impl Action {
    /// Terminal actions mutate the source and end the mirror's life.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Action::Approve | Action::Remove | Action::Confirm | Action::Ban(_)
        )
    }

    fn parse(fragment: &str) -> Option<Self> {
        let action = match fragment {
            "approve" => Action::Approve,
            "remove" => Action::Remove,
            "reasons" => Action::Reasons,
            "reason" => Action::Reason,
            "confirm" => Action::Confirm,
            "cancel" => Action::Cancel,
            "error" => Action::Error,
            other => Action::Ban(BanDuration::parse(other.strip_prefix("ban:")?)?),
        };
        Some(action)
    }
}

/// Custom id of a control: which item, which action.
///
/// # Examples
///
/// ```
/// use powertrip_core::{Action, ActionId, BanDuration, ItemId};
///
/// let id = ActionId::new(ItemId::from("a1"), Action::Ban(BanDuration::Days(7)));
/// assert_eq!(id.to_string(), "pt:a1:ban:7");
///
/// let parsed: ActionId = "pt:a1:ban:7".parse().unwrap();
/// assert_eq!(parsed, id);
/// assert!("other:a1:approve".parse::<ActionId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, derive_more::Display)]
#[display("pt:{}:{}", item_id, action)]
pub struct ActionId {
    /// Item the control belongs to
    item_id: ItemId,
    /// Action performed
    action: Action,
}

impl ActionId {
    /// Create a new action id.
    pub fn new(item_id: ItemId, action: Action) -> Self {
        Self { item_id, action }
    }

    /// Whether a raw custom id looks like one of ours.
    pub fn is_ours(custom_id: &str) -> bool {
        custom_id
            .strip_prefix(PREFIX)
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl FromStr for ActionId {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unrecognized = || ActionError::new(ActionErrorKind::UnrecognizedControl(s.to_string()));
        let rest = s
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(unrecognized)?;
        let (item_id, fragment) = rest.split_once(':').ok_or_else(unrecognized)?;
        if item_id.is_empty() {
            return Err(unrecognized());
        }
        let action = Action::parse(fragment).ok_or_else(unrecognized)?;
        Ok(Self::new(ItemId::from(item_id), action))
    }
}

/// Button colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonStyle {
    /// Blurple
    Primary,
    /// Grey
    Secondary,
    /// Green
    Success,
    /// Red
    Danger,
}

/// A clickable button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Button {
    /// Custom id routed back on click
    custom_id: String,
    /// Visible label
    label: String,
    /// Colour
    style: ButtonStyle,
    /// Greyed out and unclickable
    disabled: bool,
}

impl Button {
    /// Create an enabled button. Labels are cut to the platform limit.
    pub fn new(id: &ActionId, label: impl AsRef<str>, style: ButtonStyle) -> Self {
        Self {
            custom_id: id.to_string(),
            label: truncate(label.as_ref(), MAX_LABEL_LEN),
            style,
            disabled: false,
        }
    }

    /// Disable the button.
    pub fn disable(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// One entry of a select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SelectOption {
    /// Value reported back when chosen
    value: String,
    /// Visible label
    label: String,
    /// Pre-selected
    default: bool,
}

impl SelectOption {
    /// Create a new option.
    pub fn new(value: impl Into<String>, label: impl AsRef<str>, default: bool) -> Self {
        Self {
            value: value.into(),
            label: truncate(label.as_ref(), MAX_LABEL_LEN),
            default,
        }
    }
}

/// A single-choice select menu. Occupies a whole row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SelectMenu {
    /// Custom id routed back on selection
    custom_id: String,
    /// Placeholder text
    placeholder: String,
    /// Options, at most 25
    options: Vec<SelectOption>,
}

impl SelectMenu {
    /// Create a select menu. Options beyond the platform limit are dropped.
    pub fn new(id: &ActionId, placeholder: impl AsRef<str>, mut options: Vec<SelectOption>) -> Self {
        options.truncate(MAX_SELECT_OPTIONS);
        Self {
            custom_id: id.to_string(),
            placeholder: truncate(placeholder.as_ref(), MAX_LABEL_LEN),
            options,
        }
    }
}

/// A control on a mirror message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
pub enum Control {
    /// Button
    Button(Button),
    /// Select menu
    Select(SelectMenu),
}

impl Control {
    /// Custom id of the control.
    pub fn custom_id(&self) -> &str {
        match self {
            Control::Button(button) => button.custom_id(),
            Control::Select(menu) => menu.custom_id(),
        }
    }
}

/// The controls of one mirror, laid out in rows.
///
/// Rows past [`MAX_ROWS`] are dropped.
///
/// # Examples
///
/// ```
/// use powertrip_core::{Action, ActionId, Button, ButtonStyle, ControlSet, ItemId};
///
/// let item = ItemId::from("a1");
/// let buttons = (0..7).map(|n| {
///     Button::new(&ActionId::new(item.clone(), Action::Approve), format!("b{n}"), ButtonStyle::Primary)
/// });
/// let set = ControlSet::new().with_buttons(buttons);
/// assert_eq!(set.rows().len(), 2);
/// assert_eq!(set.rows()[0].len(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ControlSet {
    /// Rows of controls
    rows: Vec<Vec<Control>>,
}

impl ControlSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append buttons, starting a new row and wrapping every five.
    pub fn with_buttons(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        let buttons: Vec<Control> = buttons.into_iter().map(Control::from).collect();
        for chunk in buttons.chunks(MAX_CONTROLS_PER_ROW) {
            self.push_row(chunk.to_vec());
        }
        self
    }

    /// Append a select menu on its own row.
    pub fn with_select(mut self, menu: SelectMenu) -> Self {
        self.push_row(vec![Control::from(menu)]);
        self
    }

    fn push_row(&mut self, row: Vec<Control>) {
        if self.rows.len() < MAX_ROWS && !row.is_empty() {
            self.rows.push(row);
        }
    }

    /// The single disabled error indicator that replaces a failed mirror's controls.
    pub fn error(item_id: &ItemId, description: &str) -> Self {
        let id = ActionId::new(item_id.clone(), Action::Error);
        let label = format!("Error: {}", description);
        Self::new().with_buttons([Button::new(&id, label, ButtonStyle::Secondary).disable()])
    }

    /// Every control in row order.
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.rows.iter().flatten()
    }

    /// Whether any control carries the given custom id.
    pub fn contains(&self, custom_id: &str) -> bool {
        self.controls().any(|control| control.custom_id() == custom_id)
    }

    /// True when no rows remain.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
