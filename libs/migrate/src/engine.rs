//! Migration engine
//!
//! The [`Migrator`] brings a target database from its recorded revision to a
//! requested one by walking the resolved chain. Every step runs inside a
//! single transaction covering both the delta and the pointer rewrite, so a
//! failing delta can never leave the pointer advanced past the last
//! fully-applied change-set.

use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::chain::Chain;
use crate::changeset::ChangeSet;
use crate::error::{MigrateError, MigrateResult};
use crate::revisions;

/// One line of `history()` output.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Revision id
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// True when the database has this change-set applied
    pub applied: bool,
    /// True when this is the database's current revision
    pub current: bool,
}

/// Applies and reverses the migration chain against one database.
pub struct Migrator {
    pool: SqlitePool,
    chain: Chain,
}

impl Migrator {
    /// Create a migrator over an arbitrary set of change-sets.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ChainIntegrity`] when the change-sets do not
    /// resolve into a total order.
    pub fn new(pool: SqlitePool, changesets: &[ChangeSet]) -> MigrateResult<Self> {
        Ok(Self {
            pool,
            chain: Chain::resolve(changesets)?,
        })
    }

    /// Create a migrator over the revisions shipped with this crate.
    pub fn shipped(pool: SqlitePool) -> MigrateResult<Self> {
        Self::new(pool, revisions::REVISIONS)
    }

    /// The resolved chain this migrator walks.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    async fn ensure_version_table(&self) -> MigrateResult<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_revision (revision TEXT NOT NULL)")
            .execute(&self.pool)
            .await
            .map_err(MigrateError::Version)?;
        Ok(())
    }

    /// Read the current-version pointer. `None` means the base (empty)
    /// schema.
    pub async fn current(&self) -> MigrateResult<Option<String>> {
        self.ensure_version_table().await?;
        let row = sqlx::query("SELECT revision FROM schema_revision LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(MigrateError::Version)?;
        Ok(row.map(|row| row.get("revision")))
    }

    async fn write_pointer(
        tx: &mut Transaction<'_, Sqlite>,
        revision: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_revision")
            .execute(&mut **tx)
            .await?;
        if let Some(revision) = revision {
            sqlx::query("INSERT INTO schema_revision (revision) VALUES (?)")
                .bind(revision)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Execute one delta and move the pointer, atomically.
    async fn step(
        &self,
        changeset: &ChangeSet,
        delta: &str,
        new_revision: Option<&str>,
    ) -> MigrateResult<()> {
        let execution = |source: sqlx::Error| MigrateError::Execution {
            revision: changeset.id.to_string(),
            source,
        };

        let mut tx = self.pool.begin().await.map_err(execution)?;
        sqlx::raw_sql(delta)
            .execute(&mut *tx)
            .await
            .map_err(execution)?;
        Self::write_pointer(&mut tx, new_revision)
            .await
            .map_err(execution)?;
        tx.commit().await.map_err(execution)?;
        Ok(())
    }

    /// Walk forward from the current revision to `target` (default: chain
    /// tip), applying each change-set's forward delta in chain order.
    ///
    /// Returns the number of change-sets applied; zero when the database is
    /// already at the target.
    pub async fn upgrade(&self, target: Option<&str>) -> MigrateResult<usize> {
        let current = self.current().await?;
        let target = match target {
            Some(target) => target,
            None => match self.chain.tip() {
                Some(tip) => tip.id,
                None => return Ok(0),
            },
        };

        let plan = self.chain.upgrade_plan(current.as_deref(), target)?;
        for changeset in plan {
            info!(revision = changeset.id, "applying change-set");
            self.step(changeset, changeset.up_sql, Some(changeset.id))
                .await?;
        }
        Ok(plan.len())
    }

    /// Walk backward from the current revision to `target` (`None` = base),
    /// executing each change-set's reverse delta.
    ///
    /// Returns the number of change-sets reverted.
    pub async fn downgrade(&self, target: Option<&str>) -> MigrateResult<usize> {
        let current = self.current().await?;
        let plan = self.chain.downgrade_plan(current.as_deref(), target)?;
        for changeset in &plan {
            info!(revision = changeset.id, "reverting change-set");
            self.step(changeset, changeset.down_sql, changeset.down_revision)
                .await?;
        }
        Ok(plan.len())
    }

    /// The chain in order with the database's position marked.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::UnrecognizedRevision`] when the database's
    /// recorded revision is not part of the chain.
    pub async fn history(&self) -> MigrateResult<Vec<HistoryEntry>> {
        let current = self.current().await?;
        let current_idx = match current.as_deref() {
            None => None,
            Some(current) => Some(
                self.chain
                    .index_of(current)
                    .ok_or_else(|| MigrateError::UnrecognizedRevision(current.to_string()))?,
            ),
        };

        Ok(self
            .chain
            .changesets()
            .iter()
            .enumerate()
            .map(|(idx, cs)| HistoryEntry {
                id: cs.id.to_string(),
                description: cs.description.to_string(),
                applied: current_idx.is_some_and(|cur| idx <= cur),
                current: current_idx == Some(idx),
            })
            .collect())
    }
}
