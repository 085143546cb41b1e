//! Utilities for input/output.

use super::OverwriteMode;
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Reads and returns the content of the specified text file.
pub fn read_text_file<P: AsRef<Path>>(file_path: P) -> io::Result<String> {
    let file = fs::File::open(file_path)?;
    let mut text = String::new();
    let _ = io::BufReader::new(file).read_to_string(&mut text)?;
    Ok(text)
}

/// Asks the user a yes/no question on standard output and returns the answer.
pub fn user_says_yes(question: &str, default_is_yes: bool) -> io::Result<bool> {
    let mut stdout = io::stdout();
    write!(
        stdout,
        "{} {} ",
        question,
        if default_is_yes { "[Y/n]" } else { "[y/N]" }
    )?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default_is_yes,
    })
}

/// Creates the given directory and any missing parent directories.
pub fn create_directory_if_missing(dir_path: &Path) -> io::Result<()> {
    if !dir_path.as_os_str().is_empty() && !dir_path.exists() {
        fs::create_dir_all(dir_path)?;
    }
    Ok(())
}

/// An output path that is written through a temporary file in the same
/// directory, which replaces the target file only when writing succeeded.
#[derive(Debug)]
pub struct AtomicOutputPath {
    target_path: PathBuf,
    temporary_file: NamedTempFile,
}

impl AtomicOutputPath {
    /// Creates a new temporary file next to the given target path.
    pub fn new<P: AsRef<Path>>(target_path: P) -> io::Result<Self> {
        let target_path = target_path.as_ref().to_path_buf();
        let directory = target_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        create_directory_if_missing(&directory)?;

        let temporary_file = tempfile::Builder::new()
            .prefix(".tractwarp_")
            .suffix(".tmp")
            .tempfile_in(if directory.as_os_str().is_empty() {
                Path::new(".")
            } else {
                directory.as_path()
            })?;

        Ok(Self {
            target_path,
            temporary_file,
        })
    }

    pub fn temporary_path(&self) -> &Path {
        self.temporary_file.path()
    }

    /// Verifies that writing to the target path is allowed under the given
    /// overwrite mode, asking the user if required.
    pub fn ensure_write_allowed(&self, overwrite_mode: OverwriteMode) -> io::Result<()> {
        if !self.target_path.exists() {
            return Ok(());
        }
        let allowed = match overwrite_mode {
            OverwriteMode::Always => true,
            OverwriteMode::Never => false,
            OverwriteMode::Ask => user_says_yes(
                &format!(
                    "File {} already exists, overwrite?",
                    self.target_path.display()
                ),
                false,
            )?,
        };
        if allowed {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "Not overwriting existing file {}",
                    self.target_path.display()
                ),
            ))
        }
    }

    /// Moves the temporary file to the target path.
    pub fn perform_replace(self) -> io::Result<()> {
        self.temporary_file
            .persist(&self.target_path)
            .map(|_| ())
            .map_err(|err| err.error)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn atomic_output_replaces_target_only_when_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out.txt");

        let output = AtomicOutputPath::new(&target).unwrap();
        fs::write(output.temporary_path(), "content").unwrap();
        assert!(!target.exists());

        output.perform_replace().unwrap();
        assert_eq!(read_text_file(&target).unwrap(), "content");
    }

    #[test]
    fn existing_target_is_protected_in_never_mode() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, "old").unwrap();

        let output = AtomicOutputPath::new(&target).unwrap();
        let err = output.ensure_write_allowed(OverwriteMode::Never).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(output.ensure_write_allowed(OverwriteMode::Always).is_ok());
    }
}
