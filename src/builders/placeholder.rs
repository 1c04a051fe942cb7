//! Placeholder token splicing for the publish directory's HTML files.

use std::path::Path;

use tracing::debug;

use super::BuildError;

/// Replace the first occurrence of each token with its fragment.
///
/// Every token must be present in `html` before anything is replaced; the
/// first missing token is returned as the error.
pub fn splice_placeholders<'a>(
    html: &str,
    replacements: &[(&'a str, String)],
) -> Result<String, &'a str> {
    if let Some((token, _)) = replacements.iter().find(|(token, _)| !html.contains(token)) {
        return Err(*token);
    }

    let mut out = html.to_string();
    for (token, fragment) in replacements {
        out = out.replacen(token, fragment, 1);
    }
    Ok(out)
}

/// Splice fragments into `path` and write it back in place.
///
/// The file is left untouched when any token is missing.
pub fn splice_file(path: &Path, replacements: &[(&str, String)]) -> Result<(), BuildError> {
    let html = std::fs::read_to_string(path).map_err(|source| BuildError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let updated =
        splice_placeholders(&html, replacements).map_err(|token| BuildError::PlaceholderNotFound {
            token: token.to_string(),
            path: path.to_path_buf(),
        })?;

    std::fs::write(path, updated).map_err(|source| BuildError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), tokens = replacements.len(), "spliced placeholders");
    Ok(())
}
