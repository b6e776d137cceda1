//! Reply templates and placeholder rendering.
//!
//! Recognized placeholders:
//!
//! | Token | Value |
//! |---|---|
//! | `{{location}}` | `post` or `comment` |
//! | `{{author}}` | author's username |
//! | `{{warnings}}` | current warning count |
//! | `{{threshold}}` | configured ban threshold |
//! | `{{length}}` | configured ban length in days |
//!
//! Any other `{{token}}` is left in place. Rendering is pure.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REMINDER_TEMPLATE: &str = "Please take a moment to familiarize yourself with our rules, this {{location}} almost broke one.";

pub const DEFAULT_WARN_TEMPLATE: &str = "A warning has been issued for this {{location}}, and a PM has been sent with more details. Please reach out to the MODs with any questions.";

pub const DEFAULT_BAN_TEMPLATE: &str = "A final warning and has been issued for this {{location}}, and {{author}} has been banned for {{length}} days. A PM has been sent with more details.";

/// The closed set of placeholders a template may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    Location,
    Author,
    Warnings,
    Threshold,
    Length,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Self::Location,
        Self::Author,
        Self::Warnings,
        Self::Threshold,
        Self::Length,
    ];

    /// Name as written between the braces.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Author => "author",
            Self::Warnings => "warnings",
            Self::Threshold => "threshold",
            Self::Length => "length",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{{{}}}}}", self.token())
    }
}

/// Values substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContext {
    /// "post" or "comment"
    pub location: String,
    pub author: String,
    pub warnings: u32,
    pub threshold: u32,
    pub length_days: u32,
}

impl TemplateContext {
    fn value(&self, placeholder: Placeholder) -> String {
        match placeholder {
            Placeholder::Location => self.location.clone(),
            Placeholder::Author => self.author.clone(),
            Placeholder::Warnings => self.warnings.to_string(),
            Placeholder::Threshold => self.threshold.to_string(),
            Placeholder::Length => self.length_days.to_string(),
        }
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{([A-Za-z_]+)\}\}").expect("static pattern is valid"))
}

/// Render `template`, replacing every recognized placeholder.
pub fn render(template: &str, context: &TemplateContext) -> String {
    let rendered: Cow<'_, str> = token_pattern().replace_all(template, |caps: &Captures<'_>| {
        match Placeholder::from_token(&caps[1]) {
            Some(placeholder) => context.value(placeholder),
            None => caps[0].to_string(),
        }
    });
    rendered.into_owned()
}

/// Recognized placeholders used by `template`, in first-seen order.
pub fn placeholders_in(template: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    for caps in token_pattern().captures_iter(template) {
        if let Some(p) = Placeholder::from_token(&caps[1]) {
            if !found.contains(&p) {
                found.push(p);
            }
        }
    }
    found
}

/// `{{token}}`s in `template` that are not recognized placeholders.
pub fn unknown_tokens(template: &str) -> Vec<String> {
    token_pattern()
        .captures_iter(template)
        .filter(|caps| Placeholder::from_token(&caps[1]).is_none())
        .map(|caps| caps[0].to_string())
        .collect()
}

/// Which reply slot a template fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Comment & Remind
    Reminder,
    /// Warning issued, threshold not reached
    Warn,
    /// Warning issued and the user was banned
    Ban,
}

impl TemplateKind {
    pub fn default_template(&self) -> &'static str {
        match self {
            Self::Reminder => DEFAULT_REMINDER_TEMPLATE,
            Self::Warn => DEFAULT_WARN_TEMPLATE,
            Self::Ban => DEFAULT_BAN_TEMPLATE,
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reminder => write!(f, "reminder"),
            Self::Warn => write!(f, "warn"),
            Self::Ban => write!(f, "ban"),
        }
    }
}

/// Custom templates per slot. `None` or an empty string means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplateSet {
    pub reminder: Option<String>,
    pub warn: Option<String>,
    pub ban: Option<String>,
}

impl MessageTemplateSet {
    /// The effective template for `kind`.
    pub fn get(&self, kind: TemplateKind) -> &str {
        let custom = match kind {
            TemplateKind::Reminder => self.reminder.as_deref(),
            TemplateKind::Warn => self.warn.as_deref(),
            TemplateKind::Ban => self.ban.as_deref(),
        };
        match custom {
            Some(text) if !text.is_empty() => text,
            _ => kind.default_template(),
        }
    }

    /// Render the effective template for `kind`.
    pub fn render(&self, kind: TemplateKind, context: &TemplateContext) -> String {
        render(self.get(kind), context)
    }

    /// Number of slots with a non-empty custom template.
    pub fn custom_count(&self) -> usize {
        [&self.reminder, &self.warn, &self.ban]
            .into_iter()
            .filter(|slot| slot.as_deref().is_some_and(|t| !t.is_empty()))
            .count()
    }
}
