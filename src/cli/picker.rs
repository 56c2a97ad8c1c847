//! Interactive CSV picker.
//!
//! Used when no data source was given by flag or environment: running
//! `covid report` in a directory with downloaded CSVs lists them and lets the
//! user choose one.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Directory recursion depth for finding CSV files.
const SEARCH_DEPTH: usize = 4;

/// What the user typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    Quit,
    Listed(usize),
    OutOfRange(usize),
    Path(PathBuf),
}

/// Prompt the user to select a CSV file from the current directory tree.
///
/// Accepts a number from the list or an explicit path; `q` cancels.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::input(
            "No .csv files found. Provide one with `covid report -f <file.csv>` or --url.",
        ));
    }

    println!("Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock();
    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::input(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = lines
            .read_line(&mut input)
            .map_err(|e| AppError::input(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::input(
                "No input received. Provide a CSV path with `covid report -f <file.csv>`.",
            ));
        }

        match parse_choice(&input, files.len()) {
            Choice::Quit => return Err(AppError::input("Canceled.")),
            Choice::Listed(idx) => return validate_csv_path(&files[idx]),
            Choice::OutOfRange(n) => {
                println!("Invalid choice: {n}. Enter a number between 1 and {}.", files.len());
            }
            Choice::Path(candidate) => match validate_csv_path(&candidate) {
                Ok(path) => return Ok(path),
                Err(err) => println!("{err}"),
            },
        }
    }
}

fn parse_choice(input: &str, listed: usize) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=listed).contains(&n) => Choice::Listed(n - 1),
        Ok(n) => Choice::OutOfRange(n),
        Err(_) => Choice::Path(PathBuf::from(input)),
    }
}

/// Check that the path points to an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::input(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::input(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::input(format!(
            "Expected a .csv file (got: {}). Use -f to pass a CSV path.",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files under `root`, sorted by display path.
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn walk(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                walk(&path, depth + 1, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
