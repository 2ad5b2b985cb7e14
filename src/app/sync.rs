use std::{thread::sleep, time::Duration};

use crate::{
    essay::EssayRecord,
    semantic::{generate_embedding, Embedder},
};

use super::remote::{EssayRow, EssayStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    /// Records that went up with a fresh embedding
    pub embedded: usize,
}

/// Pushes archived essays into the remote table, one at a time.
///
/// Each record is embedded again (the archive never holds embeddings), looked
/// up by url, then updated in place or inserted. A failure on one record is
/// logged and the loop moves on; nothing is retried.
pub struct Synchronizer<'a> {
    store: &'a dyn EssayStore,
    embedder: Option<&'a dyn Embedder>,
    delay: Duration,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        store: &'a dyn EssayStore,
        embedder: Option<&'a dyn Embedder>,
        delay: Duration,
    ) -> Self {
        Self {
            store,
            embedder,
            delay,
        }
    }

    /// Trivial read to prove the table is reachable.
    pub fn check_connection(&self) -> Result<usize, StoreError> {
        let count = self.store.count()?;
        log::info!("Connected successfully. Found {count} existing essays.");
        Ok(count)
    }

    pub fn run(&self, essays: &[EssayRecord]) -> SyncReport {
        let mut report = SyncReport::default();

        if self.embedder.is_none() {
            log::warn!("No valid embedding API key, uploading essays without embeddings");
        }

        for essay in essays {
            let embedding = self.embedder.and_then(|embedder| {
                log::info!("Generating embedding for: {}", essay.title);
                generate_embedding(embedder, &essay.content)
            });

            match self.upsert(essay, embedding.as_deref()) {
                Ok(UpsertAction::Inserted) => {
                    log::info!("Inserted new essay: {}", essay.title);
                    report.inserted += 1;
                }
                Ok(UpsertAction::Updated) => {
                    log::info!("Updated essay: {}", essay.title);
                    report.updated += 1;
                }
                Err(err) => {
                    log::error!("Error uploading essay {}: {err}", essay.title);
                    report.failed += 1;
                    continue;
                }
            }

            if embedding.is_some() {
                report.embedded += 1;
            }

            if !self.delay.is_zero() {
                sleep(self.delay);
            }
        }

        log::info!(
            "Uploaded {} of {} essays ({} inserted, {} updated, {} failed)",
            report.inserted + report.updated,
            essays.len(),
            report.inserted,
            report.updated,
            report.failed
        );

        report
    }

    /// Insert `essay`, or update the row that already has its url.
    pub fn upsert(
        &self,
        essay: &EssayRecord,
        embedding: Option<&[f32]>,
    ) -> Result<UpsertAction, StoreError> {
        let row = EssayRow::new(essay, embedding);

        match self.store.find_id_by_url(&essay.url)? {
            Some(id) => {
                self.store.update(&id, &row)?;
                Ok(UpsertAction::Updated)
            }
            None => {
                self.store.insert(&row)?;
                Ok(UpsertAction::Inserted)
            }
        }
    }
}
