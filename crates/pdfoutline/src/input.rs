use std::path::{Path, PathBuf};

use crate::prelude::*;

/// Read a PDF from disk, rejecting missing and empty files.
pub fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::InputNotFound(path.display().to_string()).into());
    }

    let bytes = std::fs::read(path).wrap_err_with(|| f!("failed to read {}", path.display()))?;
    if bytes.is_empty() {
        return Err(Error::EmptyInput(path.display().to_string()).into());
    }

    Ok(bytes)
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| f!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).wrap_err_with(|| f!("failed to write {}", path.display()))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Regular files in `dir` with a `.pdf` extension (any case), sorted by name.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputDirNotFound(dir.display().to_string()).into());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).wrap_err_with(|| f!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && is_pdf(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// `<output_dir>/<stem>.json` for an input document.
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(f!("{stem}.json"))
}
