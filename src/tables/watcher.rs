//! Rate table file watcher for hot reload.

use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::schema::DataConfig;
use crate::observability::metrics::record_table_reload;
use crate::tables::loader::load_tables;
use crate::tables::TableSet;

/// A watcher that monitors both rate table files for changes.
///
/// A change to either file rebuilds the whole snapshot, so the two tables
/// never get out of step with each other.
pub struct DataWatcher {
    data: DataConfig,
    update_tx: mpsc::UnboundedSender<Arc<TableSet>>,
}

impl DataWatcher {
    /// Create a new DataWatcher.
    ///
    /// Returns the watcher and a receiver for rebuilt snapshots.
    pub fn new(data: DataConfig) -> (Self, mpsc::UnboundedReceiver<Arc<TableSet>>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self { data, update_tx }, update_rx)
    }

    /// Start watching the files in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let data = self.data.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Rate table change detected, reloading...");
                        match load_tables(&data) {
                            Ok(tables) => {
                                record_table_reload("ok");
                                let _ = tx.send(Arc::new(tables));
                            }
                            Err(e) => {
                                record_table_reload("error");
                                tracing::error!("Failed to reload rate tables: {}. Keeping current snapshot.", e);
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&self.data.postal_ranges_file, RecursiveMode::NonRecursive)?;
        watcher.watch(&self.data.tariffs_file, RecursiveMode::NonRecursive)?;

        tracing::info!(
            postal_ranges = ?self.data.postal_ranges_file,
            tariffs = ?self.data.tariffs_file,
            "Rate table watcher started"
        );
        Ok(watcher)
    }
}
