use crate::utils::error::Result;

/// A named key-value slot holding one serialized payload per key.
pub trait Storage {
    /// `Ok(None)` when nothing has been written under `key` yet.
    fn read_slot(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write_slot(&self, key: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn data_dir(&self) -> &str;
    fn storage_key(&self) -> &str;
}
