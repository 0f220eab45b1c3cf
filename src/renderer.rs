//! Renders alertmanager notifications into mattermost messages.
//!
//! Notifications are received by [webhook_receiver](crate::webhook_receiver),
//! rendered messages are delivered by [mattermost](crate::mattermost). This
//! module does no i/o: the instant elapsed times are measured against is
//! passed in by the caller, so rendering the same notification with the same
//! instant always produces the same message.

use chrono::{DateTime, Utc};

use crate::{
    alert::{Alert, Notification},
    message::{Attachment, Field, Message, ICON_EMOJI, USERNAME},
};

/// attachment color of firing alerts
const COLOR_FIRING: &str = "#FF0000";
/// attachment color of resolved alerts
const COLOR_RESOLVED: &str = "#008000";
/// attachment color of alerts in any other state
const COLOR_EXPIRED: &str = "#F0F8FF";

/// Renders a notification into the mattermost message for `channel`.
///
/// Every alert of the notification becomes one attachment, in the order the
/// alertmanager sent them.
pub fn render_message(notification: &Notification, channel: &str, now: DateTime<Utc>) -> Message {
    let attachments = notification
        .alerts
        .iter()
        .map(|alert| Attachment {
            color: status_color(&alert.status).to_owned(),
            fields: render_alert_fields(
                alert,
                &notification.external_url,
                &notification.receiver,
                now,
            ),
            ..Attachment::default()
        })
        .collect();

    Message {
        username: USERNAME.to_owned(),
        icon_emoji: ICON_EMOJI.to_owned(),
        channel: channel.to_owned(),
        attachments,
        ..Message::default()
    }
}

/// Maps an alert status to an attachment color. Unknown statuses get a
/// neutral color instead of being rejected.
fn status_color(status: &str) -> &'static str {
    match status {
        "firing" => COLOR_FIRING,
        "resolved" => COLOR_RESOLVED,
        _ => COLOR_EXPIRED,
    }
}

/// Renders the two display fields of an alert: the status field with
/// annotations, timestamps and source links, and the label field.
fn render_alert_fields(
    alert: &Alert,
    external_url: &str,
    receiver: &str,
    now: DateTime<Utc>,
) -> Vec<Field> {
    let title = if alert.status == "firing" {
        format!(":fire: {} :fire:", alert.status.to_uppercase())
    } else {
        alert.status.to_uppercase()
    };

    let mut msg = String::new();

    let mut annotations: Vec<&String> = alert.annotations.keys().collect();
    annotations.sort();
    for key in annotations {
        msg.push_str(&format!(
            "**{}:** {}\n",
            title_case(key),
            alert.annotations[key]
        ));
    }

    msg.push_str(&format!(
        "**Started at:** {}{}\n",
        alert.starts_at,
        elapsed_suffix(&alert.starts_at, now)
    ));
    if alert.status == "resolved" {
        msg.push_str(&format!(
            "**Ended at:** {}{}\n",
            alert.ends_at,
            elapsed_suffix(&alert.ends_at, now)
        ));
    }
    msg.push_str(&format!(
        "Generated by a [Prometheus Alert]({}) and sent to the [Alertmanager]({}) '{}' receiver.",
        alert.generator_url, external_url, receiver
    ));

    // label keys are sorted like annotation keys so repeated notifications
    // render identically
    let mut labels_msg = String::new();
    let mut labels: Vec<&String> = alert.labels.keys().collect();
    labels.sort();
    for key in labels {
        labels_msg.push_str(&format!("**{}:** {}\n", title_case(key), alert.labels[key]));
    }

    vec![
        Field {
            title,
            value: msg,
            short: true,
        },
        Field {
            title: String::new(),
            value: labels_msg,
            short: true,
        },
    ]
}

/// Formats the " (5 minutes ago)" suffix for a timestamp, measured against
/// `now`. Returns an empty string if the timestamp is not valid rfc 3339.
fn elapsed_suffix(timestamp: &str, now: DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => {
            let elapsed = now.signed_duration_since(parsed.with_timezone(&Utc));
            format!(" ({} ago)", format_elapsed(elapsed))
        }
        Err(_) => String::new(),
    }
}

/// Formats a duration as its two most significant nonzero units. Negative
/// durations (clock skew between the alertmanager and us) count as zero.
fn format_elapsed(elapsed: chrono::Duration) -> String {
    const UNITS: [(&str, i64); 5] = [
        ("week", 60 * 60 * 24 * 7),
        ("day", 60 * 60 * 24),
        ("hour", 60 * 60),
        ("minute", 60),
        ("second", 1),
    ];

    let mut remaining = elapsed.num_seconds().max(0);

    let mut parts = Vec::new();
    for (name, seconds) in UNITS {
        let count = remaining / seconds;
        if count > 0 {
            parts.push(format!(
                "{} {}{}",
                count,
                name,
                if count == 1 { "" } else { "s" }
            ));
            remaining %= seconds;
        }
        if parts.len() == 2 {
            break;
        }
    }

    if parts.is_empty() {
        return String::from("0 seconds");
    }

    parts.join(" ")
}

/// Uppercases the first letter of every word without lowering the rest, so
/// label keys like "runbook URL" keep their casing.
fn title_case(text: &str) -> String {
    text.split_inclusive(char::is_whitespace)
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}
