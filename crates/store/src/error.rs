use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure (read, write, remove, create dir).
    Io(String),
    /// State could not be encoded.
    Serialize(String),
    /// Persisted payload is corrupt or from an incompatible layout.
    Deserialize(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Serialize(msg) => write!(f, "cannot serialize dataset state: {msg}"),
            Self::Deserialize(msg) => write!(f, "cannot read persisted dataset state: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
