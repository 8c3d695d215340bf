//! Change-set type and authoring helpers
//!
//! A change-set is one link in the migration chain: a timestamped identifier,
//! a pointer to its predecessor, and a forward/reverse SQL delta pair. The
//! shipped chain embeds its SQL at compile time (see [`crate::revisions`]);
//! new change-sets start life as a [`Draft`] written out by `migrate new`.

use chrono::{DateTime, Utc};

/// A single named schema delta with forward and reverse operations.
#[derive(Debug, Clone, Copy)]
pub struct ChangeSet {
    /// Unique identifier: creation timestamp plus slugified description
    pub id: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Identifier of the predecessor change-set; `None` for the chain root
    pub down_revision: Option<&'static str>,
    /// Forward delta, executed on upgrade
    pub up_sql: &'static str,
    /// Reverse delta, executed on downgrade
    pub down_sql: &'static str,
}

/// Turn a description into the slug part of a revision id.
///
/// Lowercases and replaces every non-alphanumeric run with a single
/// underscore, so "Add login_id UNIQUE constraint" becomes
/// "add_login_id_unique_constraint".
pub fn slug(description: &str) -> String {
    let mut out = String::with_capacity(description.len());
    let mut gap = false;
    for c in description.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !out.is_empty() {
                out.push('_');
            }
            gap = false;
            out.push(c.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    out
}

/// Mint a revision id from a creation time and a description.
///
/// The timestamp prefix makes the chain chronologically ordered as well as
/// structurally ordered; ids are effectively unique since they are minted at
/// generation time.
pub fn revision_id(created: DateTime<Utc>, description: &str) -> String {
    format!("{}_{}", created.format("%Y%m%d%H%M"), slug(description))
}

/// A freshly authored change-set, not yet part of the chain.
///
/// Drafts are rendered to a `.up.sql`/`.down.sql` file pair; the operator
/// fills in (or reviews) the bodies and registers the pair in
/// `revisions/mod.rs`.
#[derive(Debug, Clone)]
pub struct Draft {
    /// Minted revision id
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// Identifier of the chain tip at authoring time
    pub down_revision: Option<String>,
    /// Forward delta body; empty for hand-written drafts
    pub up_sql: String,
    /// Reverse delta body; empty for hand-written drafts
    pub down_sql: String,
}

impl Draft {
    /// Author an empty change-set whose predecessor is `down_revision`.
    pub fn new(created: DateTime<Utc>, description: &str, down_revision: Option<&str>) -> Self {
        Self {
            id: revision_id(created, description),
            description: description.to_string(),
            down_revision: down_revision.map(str::to_string),
            up_sql: String::new(),
            down_sql: String::new(),
        }
    }

    fn header(&self) -> String {
        format!(
            "-- {}\n-- Revision: {}\n-- Revises: {}\n",
            self.description,
            self.id,
            self.down_revision.as_deref().unwrap_or("base"),
        )
    }

    /// File name of the forward delta.
    pub fn up_file_name(&self) -> String {
        format!("{}.up.sql", self.id)
    }

    /// File name of the reverse delta.
    pub fn down_file_name(&self) -> String {
        format!("{}.down.sql", self.id)
    }

    /// Contents of the forward delta file.
    pub fn up_file(&self) -> String {
        format!("{}\n{}", self.header(), self.up_sql)
    }

    /// Contents of the reverse delta file.
    pub fn down_file(&self) -> String {
        format!("{}\n{}", self.header(), self.down_sql)
    }

    /// The `ChangeSet` literal to append to `revisions/mod.rs`.
    pub fn registration_snippet(&self) -> String {
        let down = match &self.down_revision {
            Some(rev) => format!("Some(\"{}\")", rev),
            None => "None".to_string(),
        };
        format!(
            "ChangeSet {{\n    id: \"{id}\",\n    description: \"{desc}\",\n    down_revision: {down},\n    up_sql: include_str!(\"{id}.up.sql\"),\n    down_sql: include_str!(\"{id}.down.sql\"),\n}},",
            id = self.id,
            desc = self.description,
            down = down,
        )
    }
}
