//! data structures for the mattermost incoming webhook payload

use serde::{Deserialize, Serialize};

/// username forwarded messages are posted as
pub const USERNAME: &str = "alertmatter";

/// icon shown next to forwarded messages
pub const ICON_EMOJI: &str = ":bell:";

/// message posted to the mattermost incoming webhook
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Message {
    pub text: String,
    pub username: String,
    pub icon_emoji: String,
    pub attachments: Vec<Attachment>,
    pub channel: String,
}

/// one visual block of a message, rendered from a single alert
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Attachment {
    pub color: String,
    pub text: String,
    pub title: String,
    pub title_link: String,
    pub fields: Vec<Field>,
}

/// title/value pair displayed inside an attachment
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    /// whether mattermost may display the field side by side with others
    pub short: bool,
}
