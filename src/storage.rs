use std::path::PathBuf;

pub trait StorageManager {
    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()>;
    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>>;
    fn exists(&self, ident: &str) -> bool;
    /// Where `ident` lives, for messages shown to the operator.
    fn locate(&self, ident: &str) -> PathBuf;
}

#[derive(Clone, Debug)]
pub struct BackendLocal {
    pub base_dir: PathBuf,
}

impl BackendLocal {
    pub fn new(storage_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = storage_dir.into();
        std::fs::create_dir_all(&path)?;
        Ok(BackendLocal { base_dir: path })
    }
}

impl StorageManager for BackendLocal {
    fn exists(&self, ident: &str) -> bool {
        std::fs::metadata(self.locate(ident)).is_ok()
    }

    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.locate(ident))
    }

    // plain overwrite; a crash mid-write leaves a truncated file behind
    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()> {
        std::fs::write(self.locate(ident), data)
    }

    fn locate(&self, ident: &str) -> PathBuf {
        self.base_dir.join(ident)
    }
}
