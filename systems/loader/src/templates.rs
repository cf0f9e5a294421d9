//! Maze template expansion.
//!
//! A template is a world file whose text contains `{st}` and `{ave}`
//! placeholders. Expanding it for every street and avenue in
//! [`TEMPLATE_RANGE`] yields one maze per start corner. Literal braces are
//! written as `{{` and `}}`.

use std::{
    fs, io,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

/// Streets and avenues a template is expanded for.
pub const TEMPLATE_RANGE: RangeInclusive<u32> = 1..=6;

/// Single expanded maze ready to be written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeFile {
    /// File name of the maze, e.g. `maze013.kw`.
    pub file_name: String,
    /// Expanded world file contents.
    pub contents: String,
}

/// Substitutes the placeholders of a template for one street and avenue.
pub fn expand(template: &str, street: u32, avenue: u32) -> Result<String, TemplateError> {
    let mut expanded = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                let _ = chars.next();
                expanded.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                let _ = chars.next();
                expanded.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(inner) => name.push(inner),
                        None => return Err(TemplateError::UnclosedPlaceholder),
                    }
                }
                match name.as_str() {
                    "st" => expanded.push_str(&street.to_string()),
                    "ave" => expanded.push_str(&avenue.to_string()),
                    _ => return Err(TemplateError::UnknownPlaceholder(name)),
                }
            }
            '}' => return Err(TemplateError::UnmatchedBrace),
            other => expanded.push(other),
        }
    }
    Ok(expanded)
}

/// Expands the template for every start corner in [`TEMPLATE_RANGE`].
///
/// Mazes are numbered `street * 6 + avenue`.
pub fn maze_files(template: &str) -> Result<Vec<MazeFile>, TemplateError> {
    let span = TEMPLATE_RANGE.end() - TEMPLATE_RANGE.start() + 1;
    let mut files = Vec::new();
    for street in TEMPLATE_RANGE {
        for avenue in TEMPLATE_RANGE {
            let mut contents = expand(template, street, avenue)?;
            contents.push('\n');
            files.push(MazeFile {
                file_name: format!("maze{:03}.kw", street * span + avenue),
                contents,
            });
        }
    }
    Ok(files)
}

/// Reads a template and writes every expanded maze into `out_dir`.
pub fn write_mazes(
    template_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, TemplateError> {
    let template_path = template_path.as_ref();
    let out_dir = out_dir.as_ref();
    let template = fs::read_to_string(template_path).map_err(|source| TemplateError::Io {
        path: template_path.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for maze in maze_files(&template)? {
        let path = out_dir.join(&maze.file_name);
        fs::write(&path, maze.contents).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    info!(count = written.len(), out_dir = %out_dir.display(), "mazes_written");
    Ok(written)
}

/// Errors raised while expanding maze templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template or an output file could not be accessed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A placeholder other than `{st}` or `{ave}` was found.
    #[error("unknown template placeholder '{{{0}}}'")]
    UnknownPlaceholder(String),
    /// A `{` was never closed.
    #[error("template placeholder is not closed")]
    UnclosedPlaceholder,
    /// A single `}` appeared outside a placeholder.
    #[error("single '}}' encountered in template")]
    UnmatchedBrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "6 6 {ave} {st} E 0\nW 3 3 N";

    #[test]
    fn expands_street_and_avenue() {
        assert_eq!(
            expand(TEMPLATE, 2, 5).expect("valid template"),
            "6 6 5 2 E 0\nW 3 3 N"
        );
    }

    #[test]
    fn escaped_braces_are_literal() {
        assert_eq!(expand("{{st}} {st}", 4, 1).expect("valid template"), "{st} 4");
    }

    #[test]
    fn rejects_unknown_placeholders() {
        assert!(matches!(
            expand("{row}", 1, 1),
            Err(TemplateError::UnknownPlaceholder(name)) if name == "row"
        ));
        assert!(matches!(expand("{st", 1, 1), Err(TemplateError::UnclosedPlaceholder)));
        assert!(matches!(expand("st}", 1, 1), Err(TemplateError::UnmatchedBrace)));
    }

    #[test]
    fn numbers_mazes_by_street_and_avenue() {
        let files = maze_files(TEMPLATE).expect("valid template");

        assert_eq!(files.len(), 36);
        assert_eq!(files[0].file_name, "maze007.kw");
        assert_eq!(files[0].contents, "6 6 1 1 E 0\nW 3 3 N\n");
        assert_eq!(files[35].file_name, "maze042.kw");
    }

    #[test]
    fn writes_every_maze_into_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let template_path = dir.path().join("maze_skel.kw");
        fs::write(&template_path, TEMPLATE).expect("write template");
        let out_dir = dir.path().join("out");
        fs::create_dir(&out_dir).expect("create out dir");

        let written = write_mazes(&template_path, &out_dir).expect("mazes written");

        assert_eq!(written.len(), 36);
        let maze = fs::read_to_string(out_dir.join("maze013.kw")).expect("maze present");
        assert_eq!(maze, "6 6 1 2 E 0\nW 3 3 N\n");
    }
}
