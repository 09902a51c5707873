//! Shared types for the inbox triage pipeline.

use std::fmt;

// ── Workspace schema ────────────────────────────────────────────────

/// Title property of inbox records.
pub const INBOX_TITLE_PROPERTY: &str = "Task name";
/// Status property of inbox records.
pub const STATUS_PROPERTY: &str = "Status";

/// Status of items waiting for triage.
pub const STATUS_INBOX: &str = "Inbox";
/// Status of tasks deferred for review.
pub const STATUS_IN_PROGRESS: &str = "In progress";
/// Status of fully processed items.
pub const STATUS_DONE: &str = "Done";

/// Title property of every destination database.
pub const NAME_PROPERTY: &str = "Name";
/// Select property of the life-lessons and journal databases.
pub const TYPE_PROPERTY: &str = "Type";
/// Multi-select property of the reading database.
pub const AUTHOR_PROPERTY: &str = "Author";
/// Select property of the reading database.
pub const READING_STATUS_PROPERTY: &str = "Status";
/// Initial reading status of new books.
pub const READING_STATUS_NOT_READ: &str = "Not Read";

// ── Item type ───────────────────────────────────────────────────────

/// What kind of inbox item a record is, derived from its title tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Principle,
    Task,
    Quote,
    Journal,
    Book,
    /// Missing, malformed or unknown tag. Never touches the store.
    Unregistered,
}

impl ItemType {
    /// Look up a lower-cased tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(Self::Principle),
            "t" => Some(Self::Task),
            "q" => Some(Self::Quote),
            "j" => Some(Self::Journal),
            "b" => Some(Self::Book),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Principle => "principle",
            Self::Task => "task",
            Self::Quote => "quote",
            Self::Journal => "journal",
            Self::Book => "book",
            Self::Unregistered => "unregistered",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Result of parsing an inbox title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub item_type: ItemType,
    pub title: String,
}

impl Classification {
    /// Classify a raw title of the form `<tag>:<free text>`.
    ///
    /// - Not exactly one `:` → `Unregistered`, title kept verbatim.
    /// - Known tag (case-insensitive) → that type, free text trimmed.
    /// - Unknown tag → `Unregistered`, free text trimmed.
    pub fn parse(raw_title: &str) -> Self {
        let parts: Vec<&str> = raw_title.split(':').collect();
        let [tag, rest] = parts.as_slice() else {
            return Self {
                item_type: ItemType::Unregistered,
                title: raw_title.to_string(),
            };
        };

        let item_type = ItemType::from_tag(&tag.to_lowercase()).unwrap_or(ItemType::Unregistered);
        Self {
            item_type,
            title: rest.trim().to_string(),
        }
    }
}

// ── Outcomes ────────────────────────────────────────────────────────

/// What processing an item did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A derivative record was created and the source marked Done.
    Filed { destination: String },
    /// The source was moved to "In progress" for later review.
    Deferred,
    /// Processing was abandoned; the source is untouched.
    Skipped { reason: String },
    /// Unregistered item; no store calls were made.
    Ignored,
}

impl ItemOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Filed { .. } => "filed",
            Self::Deferred => "deferred",
            Self::Skipped { .. } => "skipped",
            Self::Ignored => "ignored",
        }
    }
}

/// Tally of one triage run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub filed: usize,
    pub deferred: usize,
    pub skipped: usize,
    pub ignored: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Filed { .. } => self.filed += 1,
            ItemOutcome::Deferred => self.deferred += 1,
            ItemOutcome::Skipped { .. } => self.skipped += 1,
            ItemOutcome::Ignored => self.ignored += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.filed + self.deferred + self.skipped + self.ignored
    }
}
