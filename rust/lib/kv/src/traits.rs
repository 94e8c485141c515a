use crate::error::KVError;

/// KVStore abstracts the durable "local storage" a hero store mirrors its
/// state into.
///
/// Values are opaque bytes; callers own the encoding. Implementations must be
/// shareable across threads because the store itself may live behind an `Arc`.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value wholesale.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Read a value and decode it as UTF-8 text.
    fn get_string(&self, key: &str) -> Result<Option<String>, KVError> {
        match self.get(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| KVError::Serialization(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }
}
