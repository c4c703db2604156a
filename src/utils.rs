use crate::error::HotWaterError;
use log::info;
use std::io;
use std::path::Path;

pub async fn ensure_output_dir(path: &Path) -> Result<(), HotWaterError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(HotWaterError::OutputDirNotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating output directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| HotWaterError::OutputDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(HotWaterError::OutputDirCreation(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_output_dir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("a").join("b");

        ensure_output_dir(&nested).await?;
        assert!(nested.is_dir());
        // existing directory is fine
        ensure_output_dir(&nested).await?;

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x")?;
        assert!(matches!(
            ensure_output_dir(&file).await,
            Err(HotWaterError::OutputDirNotADirectory(_))
        ));
        Ok(())
    }
}
