use crate::{essay::EssayRecord, storage::StorageManager};

/// File the scrape stage writes and the upload stage reads.
pub const ARCHIVE_FILE: &str = "essays.json";

#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    #[error("Essay data not found at {path}. Run `essays scrape` first.")]
    NotFound { path: String },

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("archive is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Overwrite the archive with `essays`, minus their embeddings.
///
/// Returns where the archive was written.
pub fn save_essays(
    storage: &dyn StorageManager,
    essays: &[EssayRecord],
) -> Result<String, ArchiveError> {
    log::info!("Saving essays to JSON file...");

    let json = serde_json::to_vec_pretty(essays)?;
    storage.write(ARCHIVE_FILE, &json)?;

    let path = storage.locate(ARCHIVE_FILE).display().to_string();
    log::info!("Saved {} essays to {path}", essays.len());

    Ok(path)
}

pub fn load_essays(storage: &dyn StorageManager) -> Result<Vec<EssayRecord>, ArchiveError> {
    let path = storage.locate(ARCHIVE_FILE).display().to_string();

    if !storage.exists(ARCHIVE_FILE) {
        return Err(ArchiveError::NotFound { path });
    }

    let essays: Vec<EssayRecord> = serde_json::from_slice(&storage.read(ARCHIVE_FILE)?)?;
    log::info!("Loaded {} essays from {path}", essays.len());

    Ok(essays)
}
