use crate::error::FileError;
use crate::models::raw_text::RawText;
use std::path::Path;
use tokio::fs;

/// 读取文本文件并截断为 `RawText`
///
/// 只接受 UTF-8 文本（.txt / .md 等），不做 PDF 解析。
pub async fn load_text_file(path: &Path, max_chars: usize) -> Result<RawText, FileError> {
    let path_str = path.display().to_string();

    if !path.exists() {
        return Err(FileError::NotFound { path: path_str });
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path_str.clone(),
            source,
        })?;

    let raw = RawText::new(content, max_chars);
    if raw.was_truncated() {
        tracing::info!("输入文本已截断为 {} 个字符: {}", max_chars, path_str);
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_and_truncate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Introduction to sorting algorithms").unwrap();

        let raw = load_text_file(file.path(), 12).await.unwrap();
        assert_eq!(raw.as_str(), "Introduction");
        assert!(raw.was_truncated());
    }

    #[tokio::test]
    async fn test_short_file_is_not_truncated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Quicksort").unwrap();

        let raw = load_text_file(file.path(), 100).await.unwrap();
        assert_eq!(raw.as_str(), "Quicksort");
        assert!(!raw.was_truncated());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_text_file(Path::new("/definitely/not/here.txt"), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));
    }
}
