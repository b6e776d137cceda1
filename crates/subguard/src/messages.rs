//! Fixed, non-templated texts: audit notes, private messages, team
//! notifications, and the status lines shown to whoever ran a command.
//!
//! Only the public replies on moderated content are customizable (see
//! `moderation::template`). Everything here is fixed wording.

use crate::platform::{ContentAction, ContentKind, PrivateMessage, TeamNotification};

/// Appended to every private message.
pub const MESSAGE_FOOTER: &str = "This message was sent by the r/SubGuard app and replies are not monitored. If you have any questions please message the moderators.";

/// Reason attached to every suspension.
pub const SUSPENSION_REASON: &str = "Received final warning resulting in ban";

/// Status after Comment & Remind.
pub const REMINDER_POSTED: &str = "Comment Posted";

/// Status when Check My Warnings is used while logged out.
pub const LOGIN_REQUIRED: &str = "You need to be logged in to check your warnings.";

// ── Audit notes ───────────────────────────────────────────────────────────────

pub fn warning_note(location: ContentKind, username: &str, warnings: u32, threshold: u32) -> String {
    format!(
        "Warning issued for {location}. {username} now has {warnings} of {threshold} Warnings"
    )
}

pub fn reset_note(username: &str, ban_days: u32, reset_from: u32) -> String {
    format!(
        "{username} has been banned for {ban_days} days, and their warnings have been reset from {reset_from} to 0."
    )
}

// ── Private messages ──────────────────────────────────────────────────────────

pub fn warned_message(
    to: &str,
    community: &str,
    location: ContentKind,
    warnings: u32,
    threshold: u32,
    ban_days: u32,
    permalink: &str,
) -> PrivateMessage {
    PrivateMessage {
        to: to.to_string(),
        subject: format!("Received a warning on {community}"),
        body: format!(
            "You have been issued a warning for the below {location} that broke a rule in r/{community}. \
You currently have {warnings} warning(s). If you receive {threshold} warnings, you will be banned for {ban_days} days. \
To avoid further warnings & prevent a ban, please review our rules before interacting again.\n\n\
{permalink}\n\n\
{MESSAGE_FOOTER}"
        ),
    }
}

pub fn banned_message(
    to: &str,
    community: &str,
    location: ContentKind,
    ban_days: u32,
    permalink: &str,
) -> PrivateMessage {
    PrivateMessage {
        to: to.to_string(),
        subject: format!("Banned from {community} for Warnings"),
        body: format!(
            "You have been issued your final warning for the below {location} that broke a rule in r/{community}, \
and you have been banned for {ban_days} days. Your warnings have been reset to 0 allowing you to return \
to the community once your ban has ended.\n\n\
{permalink}\n\n\
{MESSAGE_FOOTER}"
        ),
    }
}

// ── Team notifications ────────────────────────────────────────────────────────

pub fn team_warning(
    community_id: &str,
    username: &str,
    location: ContentKind,
    action: ContentAction,
    warnings: u32,
    threshold: u32,
    ban_days: u32,
    permalink: &str,
) -> TeamNotification {
    TeamNotification {
        community_id: community_id.to_string(),
        subject: format!("Warning issued against {username}"),
        body_markdown: format!(
            "A Warning has been issued for the following {location} that has been {}. \
u/{username} now has {warnings} of {threshold} warning(s) until they're banned for {ban_days} days. {permalink}",
            action.past_tense()
        ),
    }
}

pub fn team_ban(
    community_id: &str,
    username: &str,
    location: ContentKind,
    action: ContentAction,
    ban_days: u32,
    reset_from: u32,
    permalink: &str,
) -> TeamNotification {
    TeamNotification {
        community_id: community_id.to_string(),
        subject: format!("Ban issued against {username}"),
        body_markdown: format!(
            "A Warning has been issued for the following {location} that has been {}. \
u/{username} has been banned for {ban_days} days and their warnings have been reset from {reset_from} to 0. {permalink}",
            action.past_tense()
        ),
    }
}

// ── Status lines ──────────────────────────────────────────────────────────────

pub fn cycle_status(username: &str, warnings: u32) -> String {
    format!("u/{username} warnings: {warnings}")
}

pub fn show_status(username: &str, warnings: u32) -> String {
    format!("u/{username} has {warnings} warnings.")
}

pub fn removed_status(username: &str, remaining: u32) -> String {
    format!("Removed a warning from u/{username}. Remaining warnings: {remaining}.")
}

pub fn no_warnings_status(username: &str) -> String {
    format!("u/{username} does not have any warnings!")
}

pub fn self_check_status(warnings: u32, threshold: u32, ban_days: u32) -> String {
    format!(
        "You have {warnings} warning(s) in this Community || Bans are issued for {ban_days} days after receiving {threshold} warning(s)."
    )
}
