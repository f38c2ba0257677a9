//! DeltaStore: storage layer built on delta-rs
//!
//! Provides ACID appends and predicate deletes, SQL reads through DataFusion,
//! and the compaction / vacuum primitives used by the maintenance scheduler.
//!
//! # Example
//!
//! ```rust,no_run
//! use contact_lakehouse::{DeltaStore, LakehouseConfig};
//!
//! #[tokio::main]
//! async fn main() -> contact_lakehouse::Result<()> {
//!     let store = DeltaStore::new(LakehouseConfig::new("/data/contacts")).await?;
//!
//!     let batches = store.query("contact_messages", "email = 'a@b.io'").await?;
//!     let deleted = store.delete("contact_messages", "id = 'c1'").await?;
//!     println!("{} rows, deleted {}", batches.len(), deleted.num_deleted_rows);
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use deltalake::arrow::array::RecordBatch;
use deltalake::datafusion::catalog::TableProvider;
use deltalake::datafusion::prelude::SessionContext;
use deltalake::kernel::StructField;
use deltalake::protocol::SaveMode;
use deltalake::writer::{DeltaWriter, RecordBatchWriter};
use deltalake::{open_table, DeltaTable};
use tracing::{debug, info};
use url::Url;

use crate::config::LakehouseConfig;
use crate::error::{LakehouseError, Result};
use crate::schema;

/// Metrics returned by delete operations
#[derive(Debug, Clone)]
pub struct DeleteMetrics {
    pub num_deleted_rows: usize,
    pub new_version: i64,
}

/// Metrics returned by compact operations
#[derive(Debug, Clone)]
pub struct CompactMetrics {
    pub files_added: usize,
    pub files_removed: usize,
    pub new_version: i64,
}

/// Metrics returned by vacuum operations
#[derive(Debug, Clone)]
pub struct VacuumMetrics {
    pub files_deleted: usize,
}

/// Delta Lake store: manages all tables under a base path
///
/// Thread-safe: can be shared across tokio tasks via `Arc<DeltaStore>`.
pub struct DeltaStore {
    config: LakehouseConfig,
}

impl DeltaStore {
    /// Create a new DeltaStore and initialize all tables
    pub async fn new(config: LakehouseConfig) -> Result<Self> {
        let store = Self { config };
        store.init_all_tables().await?;
        info!(
            path = %store.config.base_path.display(),
            "Lakehouse initialized"
        );
        Ok(store)
    }

    /// Convert a table name to a `Url` pointing at the table directory
    fn table_url(&self, name: &str) -> Result<Url> {
        let path = self.config.table_path(name);
        Url::from_directory_path(&path).map_err(|_| {
            LakehouseError::Config(format!("Invalid table path: {}", path.display()))
        })
    }

    async fn open(&self, table_name: &str) -> Result<DeltaTable> {
        let url = self.table_url(table_name)?;
        Ok(open_table(url).await?)
    }

    /// Initialize all Delta tables (idempotent)
    async fn init_all_tables(&self) -> Result<()> {
        for table_def in schema::all_tables() {
            self.ensure_table(
                table_def.name,
                table_def.delta_fields,
                table_def.partition_columns,
            )
            .await?;
        }
        Ok(())
    }

    /// Create a Delta table if it doesn't exist
    pub async fn ensure_table(
        &self,
        name: &str,
        fields: Vec<StructField>,
        partition_columns: Vec<String>,
    ) -> Result<()> {
        let url = self.table_url(name)?;

        if let Ok(table) = open_table(url.clone()).await {
            debug!(table = name, version = ?table.version(), "Table already exists");
            return Ok(());
        }

        std::fs::create_dir_all(self.config.table_path(name))?;

        let table = DeltaTable::try_from_url(url).await?;
        let mut builder = table
            .create()
            .with_table_name(name)
            .with_save_mode(SaveMode::Ignore)
            .with_columns(fields);

        if !partition_columns.is_empty() {
            builder = builder.with_partition_columns(partition_columns);
        }

        builder.await?;
        info!(table = name, "Created Delta table");
        Ok(())
    }

    // ─── Write Operations ───

    /// Append records to a table (ACID transaction)
    ///
    /// Returns the new table version after the write.
    pub async fn append(&self, table_name: &str, batch: RecordBatch) -> Result<i64> {
        let mut table = self.open(table_name).await?;

        let mut writer = RecordBatchWriter::for_table(&table)?;
        writer.write(batch).await?;
        let version = writer.flush_and_commit(&mut table).await?;

        debug!(table = table_name, version, "Appended records");
        Ok(version as i64)
    }

    /// Delete rows matching a SQL predicate in a single commit
    pub async fn delete(&self, table_name: &str, predicate: &str) -> Result<DeleteMetrics> {
        let table = self.open(table_name).await?;

        let (result_table, metrics) = table.delete().with_predicate(predicate).await?;
        let version = result_table.version().unwrap_or(-1);

        debug!(
            table = table_name,
            deleted = metrics.num_deleted_rows,
            version,
            "Deleted records"
        );

        Ok(DeleteMetrics {
            num_deleted_rows: metrics.num_deleted_rows,
            new_version: version,
        })
    }

    /// Set `column` to the SQL expression `value` on rows matching `predicate`
    ///
    /// Returns the number of rows rewritten.
    pub async fn update(
        &self,
        table_name: &str,
        predicate: &str,
        column: &str,
        value: &str,
    ) -> Result<usize> {
        let table = self.open(table_name).await?;

        let (_, metrics) = table
            .update()
            .with_predicate(predicate)
            .with_update(column, value)
            .await?;

        debug!(table = table_name, column, updated = metrics.num_updated_rows, "Updated records");
        Ok(metrics.num_updated_rows)
    }

    // ─── Read Operations ───

    /// Read all rows from a table (current version)
    pub async fn scan(&self, table_name: &str) -> Result<Vec<RecordBatch>> {
        self.run_sql(table_name, "SELECT * FROM t").await
    }

    /// Query a table with a SQL WHERE clause
    ///
    /// Values interpolated into `sql_where` must go through
    /// [`schema::sql_literal`].
    pub async fn query(&self, table_name: &str, sql_where: &str) -> Result<Vec<RecordBatch>> {
        let batches = self
            .run_sql(table_name, &format!("SELECT * FROM t WHERE {sql_where}"))
            .await?;
        debug!(table = table_name, predicate = sql_where, "Query executed");
        Ok(batches)
    }

    async fn run_sql(&self, table_name: &str, sql: &str) -> Result<Vec<RecordBatch>> {
        let table = self.open(table_name).await?;
        let table_provider: Arc<dyn TableProvider> = Arc::new(table);

        let ctx = SessionContext::new();
        ctx.register_table("t", table_provider)?;

        let df = ctx.sql(sql).await?;
        Ok(df.collect().await?)
    }

    // ─── Optimization ───

    /// Compact small files into larger ones
    pub async fn compact(&self, table_name: &str) -> Result<CompactMetrics> {
        let table = self.open(table_name).await?;

        let (new_table, metrics) = table.optimize().await?;
        let version = new_table.version().unwrap_or(-1);

        info!(
            table = table_name,
            files_added = metrics.num_files_added,
            files_removed = metrics.num_files_removed,
            "Compaction complete"
        );

        Ok(CompactMetrics {
            files_added: metrics.num_files_added as usize,
            files_removed: metrics.num_files_removed as usize,
            new_version: version,
        })
    }

    /// Vacuum files no longer referenced by the Delta log
    ///
    /// Deleted contact messages stay in old Parquet files until this runs.
    /// With `retention_hours = 0`, all unreferenced files are removed at once.
    pub async fn vacuum(
        &self,
        table_name: &str,
        retention_hours: u64,
    ) -> Result<VacuumMetrics> {
        let table = self.open(table_name).await?;

        let retention = chrono::Duration::hours(retention_hours as i64);

        let (_, metrics) = table
            .vacuum()
            .with_retention_period(retention)
            .with_enforce_retention_duration(retention_hours > 0)
            .await?;

        info!(
            table = table_name,
            retention_hours,
            files_deleted = metrics.files_deleted.len(),
            "Vacuum complete"
        );

        Ok(VacuumMetrics {
            files_deleted: metrics.files_deleted.len(),
        })
    }

    /// Get a reference to the config
    pub fn config(&self) -> &LakehouseConfig {
        &self.config
    }
}
