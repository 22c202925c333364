//! Output file naming
//!
//! Encrypted files sit next to their source with `.enc` appended. Decrypted
//! files get ` [decrypted]` inserted before their original extension so they
//! never overwrite the file that was encrypted in the first place.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use sca_core::{Direction, ScaError, ScaResult};

/// Suffix appended to encrypted files
pub const ENC_SUFFIX: &str = ".enc";

/// Marker inserted before the extension of decrypted files
pub const DECRYPTED_MARKER: &str = " [decrypted]";

/// Whether `path` names an encrypted file (final component ends in `.enc`).
///
/// A trailing separator names a directory, so `x/report.enc/` does not count.
pub fn has_enc_suffix(path: &Path) -> bool {
    let trailing_separator = path
        .as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|&b| std::path::is_separator(char::from(b)));
    if trailing_separator {
        return false;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > ENC_SUFFIX.len() && n.ends_with(ENC_SUFFIX))
}

/// Compute where the output of transforming `source` in `direction` goes.
///
/// - Encrypt: `a/report.txt` → `a/report.txt.enc`
/// - Decrypt: `a/report.txt.enc` → `a/report [decrypted].txt`
///
/// Only the final path component is inspected, so dots in directory names do
/// not matter. Decrypting requires the name to end in `.enc` and to still have
/// an extension once that is removed (a leading dot of a hidden file does not
/// count); anything else is rejected rather than guessed at.
pub fn resolve_output_path(source: &Path, direction: Direction) -> ScaResult<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| ScaError::Path(format!("no file name in {}", source.display())))?;

    match direction {
        Direction::Encrypt => {
            let mut name = OsString::from(file_name);
            name.push(ENC_SUFFIX);
            Ok(source.with_file_name(name))
        }
        Direction::Decrypt => {
            let name = file_name.to_str().ok_or_else(|| {
                ScaError::Path(format!("file name is not UTF-8: {}", source.display()))
            })?;
            let stripped = name
                .strip_suffix(ENC_SUFFIX)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    ScaError::Path(format!(
                        "{} does not end in {ENC_SUFFIX}",
                        source.display()
                    ))
                })?;

            let skip = usize::from(stripped.starts_with('.'));
            let dot = stripped[skip..]
                .find('.')
                .map(|i| i + skip)
                .ok_or_else(|| {
                    ScaError::Path(format!(
                        "{} has no extension before {ENC_SUFFIX}",
                        source.display()
                    ))
                })?;

            let (stem, extension) = stripped.split_at(dot);
            Ok(source.with_file_name(format!("{stem}{DECRYPTED_MARKER}{extension}")))
        }
    }
}
