//! Rendering of queue items and controls into Discord payloads.

use powertrip_core::{
    ButtonStyle, Control, ControlSet, ItemKind, QueueItem, ReporterClass, SelectMenu,
};
use serenity::all::{
    ButtonStyle as SerenityButtonStyle, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption, Timestamp,
};

/// Embed colour of an unreported item.
pub const QUEUE_COLOR: u32 = 0xDA655F;

/// Embed colour of an item carrying reports.
pub const REPORTED_COLOR: u32 = 0xDFA936;

/// Longest excerpt of user content placed in a field.
pub const EXCERPT_LEN: usize = 900;

const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".gif", ".gifv", ".png", ".svg"];

/// One embed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field title
    pub name: String,
    /// Field body (markdown)
    pub value: String,
}

impl EmbedField {
    fn new(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// Platform-neutral view of a mirror embed.
///
/// The footer carries the item id; it is how mirrors are matched back to the
/// queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEmbed {
    /// Side colour
    pub color: u32,
    /// Fields in display order
    pub fields: Vec<EmbedField>,
    /// Footer text, the item id
    pub footer: String,
    /// Unix seconds of the item's creation
    pub timestamp: i64,
    /// Image shown below the fields
    pub image: Option<String>,
}

impl MirrorEmbed {
    /// Lay out an item.
    pub fn from_item(item: &QueueItem) -> Self {
        let link = item.link();
        let mut fields = Vec::new();
        let mut image = None;

        match item.kind() {
            ItemKind::Comment { body } => {
                fields.push(EmbedField::new(
                    "Comment",
                    format!("**[{}]({})**", excerpt(body), link),
                ));
                fields.push(author_field(item));
            }
            ItemKind::Submission {
                title,
                selftext,
                url,
                media_url,
            } => {
                fields.push(EmbedField::new(
                    "Submission",
                    format!("**[{}]({})**", excerpt(title), link),
                ));
                fields.push(author_field(item));
                if let Some(text) = selftext.as_deref().filter(|t| !t.is_empty()) {
                    fields.push(EmbedField::new(
                        "Selftext",
                        format!("[{}]({})", excerpt(text), link),
                    ));
                }
                image = image_url(url.as_deref(), media_url.as_deref());
            }
        }

        if let Some(report) = item.first_report(ReporterClass::User) {
            fields.push(EmbedField::new("User Reports", excerpt(report.text())));
        }
        if let Some(report) = item.first_report(ReporterClass::Moderator) {
            fields.push(EmbedField::new("Mod Reports", excerpt(report.text())));
        }

        Self {
            color: if item.is_reported() {
                REPORTED_COLOR
            } else {
                QUEUE_COLOR
            },
            fields,
            footer: item.id().to_string(),
            timestamp: item.created_at().timestamp(),
            image,
        }
    }

    /// Serenity builder for this embed.
    pub fn to_create_embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .colour(self.color)
            .footer(CreateEmbedFooter::new(&self.footer));
        for field in &self.fields {
            embed = embed.field(&field.name, &field.value, false);
        }
        if let Ok(timestamp) = Timestamp::from_unix_timestamp(self.timestamp) {
            embed = embed.timestamp(timestamp);
        }
        if let Some(image) = &self.image {
            embed = embed.image(image);
        }
        embed
    }
}

fn author_field(item: &QueueItem) -> EmbedField {
    let value = match item.author() {
        Some(name) => format!("**[{}](https://www.reddit.com/u/{})**", name, name),
        None => "[deleted]".to_string(),
    };
    EmbedField::new("Author", value)
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_LEN).collect()
}

/// Direct image links, imgur pages, then gallery media.
fn image_url(url: Option<&str>, media_url: Option<&str>) -> Option<String> {
    if let Some(url) = url {
        let lower = url.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Some(url.to_string());
        }
        if lower.contains("imgur.com") {
            return Some(format!("{}.jpg", url));
        }
    }
    media_url.map(str::to_string)
}

/// Serenity action rows for a control set.
pub fn action_rows(controls: &ControlSet) -> Vec<CreateActionRow> {
    controls
        .rows()
        .iter()
        .filter_map(|row| action_row(row))
        .collect()
}

fn action_row(row: &[Control]) -> Option<CreateActionRow> {
    match row.first()? {
        Control::Select(menu) => Some(CreateActionRow::SelectMenu(select_menu(menu))),
        Control::Button(_) => {
            let buttons = row
                .iter()
                .filter_map(|control| match control {
                    Control::Button(button) => Some(
                        CreateButton::new(button.custom_id())
                            .label(button.label())
                            .style(button_style(*button.style()))
                            .disabled(*button.disabled()),
                    ),
                    Control::Select(_) => None,
                })
                .collect();
            Some(CreateActionRow::Buttons(buttons))
        }
    }
}

fn select_menu(menu: &SelectMenu) -> CreateSelectMenu {
    let options = menu
        .options()
        .iter()
        .map(|option| {
            CreateSelectMenuOption::new(option.label(), option.value())
                .default_selection(*option.default())
        })
        .collect();
    CreateSelectMenu::new(menu.custom_id(), CreateSelectMenuKind::String { options })
        .placeholder(menu.placeholder())
        .min_values(1)
        .max_values(1)
}

fn button_style(style: ButtonStyle) -> SerenityButtonStyle {
    match style {
        ButtonStyle::Primary => SerenityButtonStyle::Primary,
        ButtonStyle::Secondary => SerenityButtonStyle::Secondary,
        ButtonStyle::Success => SerenityButtonStyle::Success,
        ButtonStyle::Danger => SerenityButtonStyle::Danger,
    }
}
