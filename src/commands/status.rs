//! Dataset summary.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::constants::csv_column;
use crate::models::{Asset, Timeframe};
use crate::services::DataStore;

pub fn run(data_dir: PathBuf) {
    let store = DataStore::new(data_dir);
    println!("📊 Dataset status - {}\n", store.root().display());

    if !store.root().exists() {
        println!("⚠️  No dataset found. Run 'pull' first.");
        return;
    }

    let mut shown_any = false;
    for asset in Asset::all() {
        let mut lines = Vec::new();

        for timeframe in Timeframe::all() {
            let mut files: Vec<PathBuf> = store
                .list_year_files(asset, timeframe)
                .unwrap_or_default()
                .into_iter()
                .map(|(_, path)| path)
                .collect();
            let full = store.full_file(asset, timeframe);
            if full.exists() {
                files.push(full);
            }
            if files.is_empty() {
                continue;
            }

            let mut rows = 0usize;
            let mut first: Option<String> = None;
            let mut last: Option<String> = None;
            for path in &files {
                if let Ok(summary) = summarize_file(path) {
                    rows += summary.rows;
                    if first.is_none() {
                        first = summary.first;
                    }
                    if summary.last.is_some() {
                        last = summary.last;
                    }
                }
            }

            lines.push(format!(
                "   {:<8} {:>3} file(s)  {:>12} rows  ({} → {})",
                timeframe.dir_name(),
                files.len(),
                format_number(rows),
                first.as_deref().unwrap_or("?"),
                last.as_deref().unwrap_or("?"),
            ));
        }

        if !lines.is_empty() {
            shown_any = true;
            println!("🔹 {}", asset.dir_name().to_uppercase());
            for line in lines {
                println!("{}", line);
            }
            println!();
        }
    }

    if !shown_any {
        println!("⚠️  No data files found. Run 'pull' first.");
    }
}

struct FileSummary {
    rows: usize,
    first: Option<String>,
    last: Option<String>,
}

/// Row count and first/last timestamps without parsing whole rows.
fn summarize_file(path: &Path) -> std::io::Result<FileSummary> {
    let reader = BufReader::new(File::open(path)?);

    let mut rows = 0usize;
    let mut first = None;
    let mut last = None;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line_num == 0 || line.trim().is_empty() {
            continue;
        }
        rows += 1;
        let timestamp = line
            .split(',')
            .nth(csv_column::TIMESTAMP)
            .unwrap_or("?")
            .to_string();
        if first.is_none() {
            first = Some(timestamp.clone());
        }
        last = Some(timestamp);
    }

    Ok(FileSummary { rows, first, last })
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(527040), "527,040");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
