//! Declarative entity model and best-effort schema diff
//!
//! The model is the single source of truth the diff step compares the live
//! schema against. It is read, never executed: change-set generation renders
//! its tables into SQL drafts, and an operator reviews those drafts before
//! they join the chain. Renames and type changes cannot be told apart from a
//! drop-plus-add, which is why the output is a draft and not an
//! authoritative delta.

use sqlx::SqlitePool;

use crate::error::{MigrateError, MigrateResult};

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// SQLite INTEGER
    Integer,
    /// SQLite TEXT (also carries RFC 3339 timestamps)
    Text,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }
}

/// One declared column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Column name
    pub name: &'static str,
    /// Storage type
    pub ty: ColumnType,
    /// Whether NULL is allowed
    pub nullable: bool,
    /// Whether this is the storage-generated primary key
    pub primary_key: bool,
}

impl Column {
    fn definition(&self) -> String {
        let mut def = format!("{} {}", self.name, self.ty.sql());
        if self.primary_key {
            def.push_str(" PRIMARY KEY AUTOINCREMENT");
        } else if !self.nullable {
            def.push_str(" NOT NULL");
        }
        def
    }
}

/// One declared table.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    /// Table name
    pub name: &'static str,
    /// Columns in declaration order
    pub columns: &'static [Column],
}

impl Table {
    /// Look up a declared column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name == name)
    }

    /// Render the CREATE TABLE statement for this table.
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|col| format!("    {}", col.definition()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE {} (\n{}\n);", self.name, columns)
    }

    /// Render the DROP TABLE statement for this table.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE {};", self.name)
    }
}

const fn column(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: false,
        primary_key: false,
    }
}

/// The `users` table: the only entity in the system.
pub const USERS: Table = Table {
    name: "users",
    columns: &[
        Column {
            name: "id",
            ty: ColumnType::Integer,
            nullable: false,
            primary_key: true,
        },
        column("name", ColumnType::Text),
        column("login_id", ColumnType::Text),
        column("password", ColumnType::Text),
        column("created_at", ColumnType::Text),
        column("updated_at", ColumnType::Text),
    ],
};

/// The full declared model.
pub const MODEL: &[Table] = &[USERS];

/// A single table- or column-level difference between the live schema and
/// the declared model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// Declared table missing from the live schema
    CreateTable { table: String },
    /// Live table absent from the model
    DropTable { table: String },
    /// Declared column missing from the live table
    AddColumn { table: String, column: String },
    /// Live column absent from the declared table
    DropColumn { table: String, column: String },
}

impl Delta {
    /// Draft forward SQL for this delta.
    pub fn up_sql(&self, model: &[Table]) -> String {
        match self {
            Delta::CreateTable { table } => match find_table(model, table) {
                Some(decl) => decl.create_sql(),
                None => format!("-- no declaration found for table '{}'", table),
            },
            Delta::DropTable { table } => format!("DROP TABLE {};", table),
            Delta::AddColumn { table, column } => {
                match find_table(model, table).and_then(|decl| decl.column(column)) {
                    Some(col) => {
                        format!("ALTER TABLE {} ADD COLUMN {};", table, col.definition())
                    }
                    None => format!(
                        "-- no declaration found for column '{}.{}'",
                        table, column
                    ),
                }
            }
            Delta::DropColumn { table, column } => {
                format!("ALTER TABLE {} DROP COLUMN {};", table, column)
            }
        }
    }

    /// Draft reverse SQL for this delta. Deltas whose reversal the model
    /// cannot describe (a dropped table or column only the live schema knew
    /// about) render as a comment for the operator to fill in.
    pub fn down_sql(&self, model: &[Table]) -> String {
        match self {
            Delta::CreateTable { table } => match find_table(model, table) {
                Some(decl) => decl.drop_sql(),
                None => format!("-- no declaration found for table '{}'", table),
            },
            Delta::DropTable { table } => format!(
                "-- cannot derive the shape of dropped table '{}'; recreate it by hand",
                table
            ),
            Delta::AddColumn { table, column } => {
                format!("ALTER TABLE {} DROP COLUMN {};", table, column)
            }
            Delta::DropColumn { table, column } => format!(
                "-- cannot derive the type of dropped column '{}.{}'; re-add it by hand",
                table, column
            ),
        }
    }
}

fn find_table<'a>(model: &'a [Table], name: &str) -> Option<&'a Table> {
    model.iter().find(|table| table.name == name)
}

async fn live_tables(pool: &SqlitePool) -> MigrateResult<Vec<String>> {
    sqlx::query_scalar(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name <> 'schema_revision' \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .map_err(MigrateError::Introspection)
}

async fn live_columns(pool: &SqlitePool, table: &str) -> MigrateResult<Vec<String>> {
    sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(MigrateError::Introspection)
}

/// Diff the declared model against the live schema.
///
/// Best-effort: the result is a draft for human review. The pointer table
/// and SQLite's own bookkeeping tables are ignored.
pub async fn diff(pool: &SqlitePool, model: &[Table]) -> MigrateResult<Vec<Delta>> {
    let live = live_tables(pool).await?;
    let mut deltas = Vec::new();

    for table in model {
        if !live.iter().any(|name| name == table.name) {
            deltas.push(Delta::CreateTable {
                table: table.name.to_string(),
            });
            continue;
        }

        let columns = live_columns(pool, table.name).await?;
        for declared in table.columns {
            if !columns.iter().any(|name| name == declared.name) {
                deltas.push(Delta::AddColumn {
                    table: table.name.to_string(),
                    column: declared.name.to_string(),
                });
            }
        }
        for name in &columns {
            if table.column(name).is_none() {
                deltas.push(Delta::DropColumn {
                    table: table.name.to_string(),
                    column: name.clone(),
                });
            }
        }
    }

    for name in live {
        if find_table(model, &name).is_none() {
            deltas.push(Delta::DropTable { table: name });
        }
    }

    Ok(deltas)
}
