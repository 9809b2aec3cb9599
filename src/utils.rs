use std::path::Path;

use tokio::fs;

/// Read a whole file into a string.
pub async fn read_to_string(path: impl AsRef<Path>) -> std::io::Result<String> {
    fs::read_to_string(path).await
}

/// Write `content` to `path`, creating missing parent directories.
pub async fn write(path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content).await
}
