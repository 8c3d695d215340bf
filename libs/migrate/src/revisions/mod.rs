//! The shipped migration chain.
//!
//! Each revision embeds its forward and reverse SQL at compile time. After
//! `migrate new` generates a file pair, its `ChangeSet` is appended here.

use crate::changeset::ChangeSet;

/// Every shipped change-set, in authoring order.
pub const REVISIONS: &[ChangeSet] = &[ChangeSet {
    id: "202507312300_create_users_table",
    description: "create users table",
    down_revision: None,
    up_sql: include_str!("202507312300_create_users_table.up.sql"),
    down_sql: include_str!("202507312300_create_users_table.down.sql"),
}];
