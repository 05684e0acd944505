//! Where raw decoded strings come from.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// Line reader over a file or stdin.
enum LineReader {
    File(Lines<BufReader<tokio::fs::File>>),
    Stdin(Lines<BufReader<tokio::io::Stdin>>),
}

impl LineReader {
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        match self {
            LineReader::File(lines) => lines.next_line().await,
            LineReader::Stdin(lines) => lines.next_line().await,
        }
    }
}

/// Raw inputs from the command line, followed by those in the input file.
///
/// File lines that are blank or start with `#` are skipped. Command-line
/// arguments are taken as given, so an empty argument is reported as invalid
/// input rather than silently dropped.
pub struct InputSource {
    args: VecDeque<String>,
    lines: Option<LineReader>,
}

impl InputSource {
    /// Opens the input file (`-` for stdin), if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub async fn open(args: Vec<String>, file: Option<&Path>) -> Result<Self> {
        let lines = match file {
            Some(path) if path.as_os_str() == "-" => {
                info!("Reading inputs from stdin");
                Some(LineReader::Stdin(BufReader::new(tokio::io::stdin()).lines()))
            }
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open input file {}", path.display()))?;
                Some(LineReader::File(BufReader::new(file).lines()))
            }
            None => None,
        };
        Ok(Self {
            args: args.into(),
            lines,
        })
    }

    /// The next raw input, or `None` when every source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the file or stdin fails.
    pub async fn next_input(&mut self) -> Result<Option<String>> {
        if let Some(arg) = self.args.pop_front() {
            return Ok(Some(arg));
        }
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };
        while let Some(line) = lines.next_line().await.context("Failed to read input line")? {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some(trimmed.to_string()));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn drain(mut source: InputSource) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(input) = source.next_input().await.expect("reads") {
            out.push(input);
        }
        out
    }

    #[tokio::test]
    async fn test_args_only() {
        let source = InputSource::open(vec!["bit.ly/abc".into(), "".into()], None)
            .await
            .expect("opens");
        assert_eq!(drain(source).await, vec!["bit.ly/abc".to_string(), String::new()]);
    }

    #[tokio::test]
    async fn test_args_then_file_skipping_comments() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "# decoded on 2024-05-01").expect("write");
        writeln!(file, "  https://example.com  ").expect("write");
        writeln!(file).expect("write");
        writeln!(file, "http://192.168.1.1/login").expect("write");

        let source = InputSource::open(vec!["first".into()], Some(file.path()))
            .await
            .expect("opens");
        assert_eq!(
            drain(source).await,
            vec![
                "first".to_string(),
                "https://example.com".to_string(),
                "http://192.168.1.1/login".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope.txt");
        let result = InputSource::open(Vec::new(), Some(&missing)).await;
        assert!(result.is_err());
    }
}
