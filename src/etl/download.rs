//! Download of the published well production CSV.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::info;
use tokio::io::AsyncWriteExt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded { bytes: u64 },
    AlreadyPresent,
}

/// Bytes are streamed here first and renamed into place once complete.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Fetch `url` into `dest`. An existing `dest` is kept unless `force`.
pub async fn download_production(
    url: &str,
    dest: &Path,
    force: bool,
) -> anyhow::Result<DownloadOutcome> {
    if !force && tokio::fs::try_exists(dest).await.unwrap_or(false) {
        info!("{} already exists, skipping download", dest.display());
        return Ok(DownloadOutcome::AlreadyPresent);
    }

    let url = Url::parse(url).with_context(|| format!("Invalid production CSV url: {}", url))?;
    let client = reqwest::Client::builder()
        .user_agent(concat!("petrolens/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(600))
        .build()
        .context("Failed to build download HTTP client")?;

    info!("Downloading production data from {} (this can take a while)", url);
    let mut response = client
        .get(url)
        .send()
        .await
        .context("Production CSV request failed")?
        .error_for_status()
        .context("Production CSV download returned an error status")?;

    let tmp = partial_path(dest);
    let mut file = tokio::fs::File::create(&tmp)
        .await
        .with_context(|| format!("Failed to create {}", tmp.display()))?;

    let mut bytes = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Production CSV download interrupted")?
    {
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, dest)
        .await
        .with_context(|| format!("Failed to move download into {}", dest.display()))?;

    info!("Downloaded {} bytes to {}", bytes, dest.display());
    Ok(DownloadOutcome::Downloaded { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path_sits_next_to_destination() {
        assert_eq!(
            partial_path(Path::new("data/produccion.csv")),
            PathBuf::from("data/produccion.csv.part")
        );
    }

    #[tokio::test]
    async fn test_existing_file_is_kept() {
        let dest = std::env::temp_dir().join(format!(
            "petrolens-download-{}.csv",
            std::process::id()
        ));
        tokio::fs::write(&dest, b"idpozo\n").await.unwrap();

        // The url is never parsed when the file is already there
        let outcome = download_production("not a url", &dest, false).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::AlreadyPresent);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"idpozo\n");

        tokio::fs::remove_file(&dest).await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_url_is_rejected_before_any_write() {
        let dest = std::env::temp_dir().join(format!(
            "petrolens-download-missing-{}.csv",
            std::process::id()
        ));

        assert!(download_production("not a url", &dest, true).await.is_err());
        assert!(!dest.exists());
    }
}
