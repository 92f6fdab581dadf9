use color_eyre::eyre::{Report, Result, WrapErr};
use color_eyre::Help;
use serde::Serialize;
use std::fmt::Debug;
use std::io::Read;
use std::path::Path;

/// Path that reads input from stdin.
pub const STDIN: &str = "-";

/// Read an input file to a string, or stdin if the path is `-`.
pub fn read_input<P>(path: &P) -> Result<String, Report>
where
    P: AsRef<Path> + Debug,
{
    if path.as_ref() == Path::new(STDIN) {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input).wrap_err("Failed to read input from stdin.")?;
        return Ok(input);
    }

    std::fs::read_to_string(path)
        .wrap_err(format!("Failed to read input: {path:?}"))
        .suggestion("Check that the file exists and is UTF-8 text.")
}

/// Create the parent directory of a file path, if it has one.
pub fn create_parent_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create directory: {parent:?}"))?;
        }
    }
    Ok(())
}

/// Write a value as pretty JSON, creating the parent directory if needed.
///
/// ## Examples
///
/// ```rust
/// use varlens::utils::write_json;
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("nested").join("values.json");
/// write_json(&vec!["rs4680"], &path)?;
/// assert_eq!(std::fs::read_to_string(&path)?, "[\n  \"rs4680\"\n]");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn write_json<T, P>(value: &T, path: &P) -> Result<(), Report>
where
    T: Serialize + ?Sized,
    P: AsRef<Path> + Debug,
{
    create_parent_dir(path)?;
    let output = serde_json::to_string_pretty(value).wrap_err("Failed to serialize JSON.")?;
    std::fs::write(path, output).wrap_err(format!("Failed to write: {path:?}"))?;
    Ok(())
}
