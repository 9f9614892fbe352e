//! Artifact resolution: turn the configured code sources into exactly one
//! resolved code descriptor.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::planner;

/// Archive file name inside the OS temp directory.
///
/// Written at most once per run and read at most once; never cleaned up,
/// the process exits right after the upload.
const ARCHIVE_NAME: &str = "output.zip";

/// A code source resolved and ready to attach to the update request.
///
/// More than one field may be set at once; the platform enforces mutual
/// exclusivity, not the resolver.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCode {
    /// Full contents of the local archive.
    pub zip: Option<Vec<u8>>,
    /// Reference to a pre-uploaded S3 object.
    pub s3: Option<S3Object>,
    /// Container image URI.
    pub image_uri: Option<String>,
}

/// Reference to an object in S3.
#[derive(Debug, Clone)]
pub struct S3Object {
    pub bucket: String,
    pub key: String,
    pub object_version: Option<String>,
}

impl ResolvedCode {
    /// Returns true if no source resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zip.is_none() && self.s3.is_none() && self.image_uri.is_none()
    }
}

/// Resolve the configured code sources.
///
/// Glob patterns are expanded first; a non-empty expansion is archived and
/// then handled exactly like a pre-built local archive. Patterns that error
/// or match nothing are skipped: any one non-empty source is sufficient,
/// and validation fails only when nothing resolves at all.
pub fn resolve(config: &DeployConfig) -> DeployResult<ResolvedCode> {
    let mut resolved = ResolvedCode::default();

    if let (Some(bucket), Some(key)) = (config.s3_bucket.as_deref(), config.s3_key.as_deref()) {
        if !bucket.is_empty() && !key.is_empty() {
            resolved.s3 = Some(S3Object {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                object_version: config
                    .s3_object_version
                    .clone()
                    .filter(|version| !version.is_empty()),
            });
        }
    }

    if let Some(uri) = config.image_uri.as_deref().filter(|uri| !uri.is_empty()) {
        resolved.image_uri = Some(uri.to_owned());
    }

    let mut zip_path = config
        .zip_file
        .clone()
        .filter(|path| !path.as_os_str().is_empty());

    let sources = planner::trim_values(&config.source);
    if !sources.is_empty() {
        let files = expand_globs(&sources);
        if files.is_empty() {
            warn!("source patterns matched no files");
        } else {
            let path = std::env::temp_dir().join(ARCHIVE_NAME);
            build_archive(&files, &path)?;
            info!(path = %path.display(), files = files.len(), "assembled code archive");
            zip_path = Some(path);
        }
    }

    if let Some(path) = zip_path {
        let contents = fs::read(&path).map_err(|source| DeployError::ArchiveRead {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), size = contents.len(), "read code archive");
        resolved.zip = Some(contents);
    }

    if resolved.is_empty() {
        return Err(DeployError::validation(
            "no code source resolved: provide a zip file, source patterns \
             that match files, an S3 bucket/key, or an image URI",
        ));
    }

    Ok(resolved)
}

/// Expand each pattern independently, keeping regular files only.
///
/// A pattern that fails to parse or a path that cannot be read is logged
/// and skipped, never fatal.
fn expand_globs(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for pattern in patterns {
        let matches = match glob::glob(pattern) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(pattern, error = %e, "skipping invalid glob pattern");
                continue;
            }
        };

        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!(pattern, error = %e, "skipping unreadable glob match"),
            }
        }
    }

    files
}

/// Assemble one deflate-compressed zip archive from the matched files.
///
/// Entry names keep the matched relative paths so the package layout
/// mirrors the working tree.
fn build_archive(files: &[PathBuf], dest: &Path) -> DeployResult<()> {
    let archive_error = |message: String| DeployError::ArchiveBuild {
        path: dest.to_path_buf(),
        message,
    };

    let file = fs::File::create(dest)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for path in files {
        let name = entry_name(path);
        writer
            .start_file(name, options)
            .map_err(|e| archive_error(e.to_string()))?;
        let contents = fs::read(path)?;
        writer.write_all(&contents)?;
    }

    writer.finish().map_err(|e| archive_error(e.to_string()))?;
    Ok(())
}

fn entry_name(path: &Path) -> String {
    let name = path.to_string_lossy();
    name.trim_start_matches("./")
        .trim_start_matches('/')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    fn config_with_sources(dir: &Path, patterns: &[&str]) -> DeployConfig {
        DeployConfig {
            source: patterns
                .iter()
                .map(|p| dir.join(p).to_string_lossy().into_owned())
                .collect(),
            ..DeployConfig::new("billing")
        }
    }

    // One test exercises the whole archive path: the destination is a fixed
    // name in the OS temp directory, so parallel builders would race.
    #[test]
    fn glob_expansion_archives_matched_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("handler.py"), b"def handler(): pass").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignore").unwrap();

        // The unmatched *.rb pattern is skipped, not fatal.
        let config = config_with_sources(dir.path(), &["*.rb", "*.py"]);
        let resolved = resolve(&config).unwrap();

        let zip = resolved.zip.expect("archive bytes");
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip)).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_index(0).unwrap();
        assert!(entry.name().ends_with("handler.py"));
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "def handler(): pass");
    }

    #[test]
    fn empty_expansion_with_no_other_source_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_sources(dir.path(), &["*.py"]);

        let error = resolve(&config).unwrap_err();
        assert!(error.is_validation());
    }

    #[test]
    fn empty_expansion_with_an_s3_source_still_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_sources(dir.path(), &["*.py"]);
        config.s3_bucket = Some("deploys".to_owned());
        config.s3_key = Some("fn.zip".to_owned());

        let resolved = resolve(&config).unwrap();
        assert!(resolved.zip.is_none());
        assert_eq!(resolved.s3.unwrap().bucket, "deploys");
    }

    #[test]
    fn missing_archive_file_is_fatal() {
        let config = DeployConfig {
            zip_file: Some(PathBuf::from("/definitely/not/here.zip")),
            ..DeployConfig::new("billing")
        };

        let error = resolve(&config).unwrap_err();
        assert!(matches!(error, DeployError::ArchiveRead { .. }));
    }

    #[test]
    fn image_uri_passes_through() {
        let config = DeployConfig {
            image_uri: Some("123.dkr.ecr.us-east-1.amazonaws.com/fn:latest".to_owned()),
            ..DeployConfig::new("billing")
        };

        let resolved = resolve(&config).unwrap();
        assert!(resolved.zip.is_none());
        assert!(resolved.image_uri.is_some());
    }

    #[test]
    fn entry_names_lose_leading_dots_and_slashes() {
        assert_eq!(entry_name(Path::new("./src/main.py")), "src/main.py");
        assert_eq!(entry_name(Path::new("/abs/file.py")), "abs/file.py");
        assert_eq!(entry_name(Path::new("plain.py")), "plain.py");
    }
}
