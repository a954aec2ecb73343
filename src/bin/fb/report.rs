//! Rendering of a [`Report`] for the terminal or an output file.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use filebuddy::{Command, Detail, EntryKind, OperationResult, Report, Status};

const MATCH_COLOR: &str = "\x1b[33m";
const FILE_COLOR: &str = "\x1b[36m";
const ERROR_COLOR: &str = "\x1b[31m";
const INFO_COLOR: &str = "\x1b[90m";
const RESET_COLOR: &str = "\x1b[0m";

/// Table width when the output has no terminal to measure.
pub const DEFAULT_WIDTH: usize = 80;

/// A piece of an output line, optionally colored.
type Segment<'a> = (Option<&'static str>, &'a str);

/// Writes results line by line, then the summary tables.
pub struct Renderer<W: Write> {
    out: W,
    color: bool,
    verbose: bool,
    /// Terminal width; result lines are cut to fit. `None` writes them whole.
    width: Option<usize>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, color: bool, verbose: bool, width: Option<usize>) -> Self {
        Self {
            out,
            color,
            verbose,
            width,
        }
    }

    pub fn render(&mut self, command: Command, report: &Report) -> io::Result<()> {
        let mut current_file: Option<&Path> = None;

        for result in &report.results {
            if result.status != Status::Success {
                self.error_line(result)?;
                continue;
            }

            match (command, &result.detail) {
                (Command::Search, Some(Detail::Line { number, text, span })) => {
                    if current_file != Some(result.source.as_path()) {
                        current_file = Some(result.source.as_path());
                        let path = display_path(&result.source, result.kind);
                        self.write_line(&[(Some(FILE_COLOR), path.as_str())])?;
                    }
                    let prefix = format!("    {number}: ");
                    self.write_line(&[
                        (None, prefix.as_str()),
                        (None, &text[..span.start]),
                        (Some(MATCH_COLOR), &text[span.clone()]),
                        (None, &text[span.end..]),
                    ])?;
                }
                (_, Some(Detail::Size(bytes))) => {
                    let path = display_path(&result.source, result.kind);
                    let size = byte_string(*bytes);
                    self.write_line(&[(None, path.as_str()), (None, " => "), (Some(MATCH_COLOR), size.as_str())])?;
                }
                (_, _) => match &result.target {
                    Some(target) => {
                        let from = result.source.display().to_string();
                        let to = target.display().to_string();
                        self.write_line(&[(None, from.as_str()), (None, " => "), (Some(MATCH_COLOR), to.as_str())])?;
                    }
                    None => {
                        let path = display_path(&result.source, result.kind);
                        self.write_line(&[(None, path.as_str())])?;
                    }
                },
            }
        }

        if self.verbose {
            for error in &report.errors {
                let line = format!("ERROR: {error}");
                self.write_line(&[(Some(ERROR_COLOR), line.as_str())])?;
            }
        }
        Ok(())
    }

    /// Per-entry problems are only listed in verbose mode; the summary always
    /// carries the counts.
    fn error_line(&mut self, result: &OperationResult) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        let reason = result
            .error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        let label = match result.status {
            Status::Skipped => "SKIPPED",
            _ => "ERROR",
        };
        let line = format!("{label}: {reason}");
        self.write_line(&[(Some(ERROR_COLOR), line.as_str())])
    }

    /// Write one line, cut to the terminal width with a trailing `...`.
    fn write_line(&mut self, segments: &[Segment<'_>]) -> io::Result<()> {
        let total: usize = segments.iter().map(|(_, text)| text.chars().count()).sum();
        let limit = self.width.filter(|&width| total > width);
        let mut budget = limit.map_or(usize::MAX, |width| width.saturating_sub(3));

        let mut line = String::new();
        for (color, text) in segments {
            let kept: String = text.chars().take(budget).collect();
            budget -= kept.chars().count();
            match color {
                Some(color) if !kept.is_empty() => line.push_str(&self.paint(color, &kept)),
                _ => line.push_str(&kept),
            }
        }
        if limit.is_some() {
            line.push_str("...");
        }
        writeln!(self.out, "{line}")
    }

    pub fn summary(&mut self, command: Command, report: &Report) -> io::Result<()> {
        let width = self.width.unwrap_or(DEFAULT_WIDTH);

        if command == Command::Search {
            let hits = hits_per_file(report);
            if !hits.is_empty() {
                let rows: Vec<(String, String)> = hits
                    .iter()
                    .map(|(path, count)| (path.display().to_string(), count.to_string()))
                    .collect();
                let table = summary_table("Hits", &rows, width);
                let table = self.paint(INFO_COLOR, &table);
                writeln!(self.out, "{table}")?;
            }
        }

        let table = summary_table("Summary", &summary_rows(command, report), width);
        let table = self.paint(INFO_COLOR, &table);
        writeln!(self.out, "{table}")?;
        self.out.flush()
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET_COLOR}")
        } else {
            text.to_string()
        }
    }
}

/// Successful search lines counted per file, in traversal order.
fn hits_per_file(report: &Report) -> Vec<(&Path, usize)> {
    let mut hits: Vec<(&Path, usize)> = Vec::new();
    for result in report.results.iter().filter(|r| r.is_success()) {
        match hits.last_mut() {
            Some((path, count)) if *path == result.source.as_path() => *count += 1,
            _ => hits.push((result.source.as_path(), 1)),
        }
    }
    hits
}

fn summary_rows(command: Command, report: &Report) -> Vec<(String, String)> {
    let mut rows: Vec<(String, String)> = vec![
        ("Directories Scanned".into(), report.stats.dirs.to_string()),
        ("Files Scanned".into(), report.stats.files.to_string()),
        ("Matches".into(), report.stats.matches.to_string()),
    ];

    let succeeded = |dirs: bool| {
        report
            .results
            .iter()
            .filter(|r| r.is_success() && (r.kind == EntryKind::Dir) == dirs)
            .count()
            .to_string()
    };

    match command {
        Command::Search => {
            let hits = hits_per_file(report);
            let total: usize = hits.iter().map(|(_, count)| count).sum();
            rows.push(("Files With Hits".into(), hits.len().to_string()));
            rows.push(("Hits Found".into(), total.to_string()));
        }
        Command::List | Command::Size => {
            rows.push(("Directory Count".into(), succeeded(true)));
            rows.push(("File Count".into(), succeeded(false)));
        }
        _ => {
            let done = past_tense(command);
            rows.push((format!("Directories {done}"), succeeded(true)));
            rows.push((format!("Files {done}"), succeeded(false)));
        }
    }

    rows.push(("Skipped".into(), report.skipped().to_string()));
    rows.push(("Failed".into(), report.failed().to_string()));
    if !report.errors.is_empty() {
        rows.push(("Unreadable Paths".into(), report.errors.len().to_string()));
    }
    if report.hidden_pruned > 0 {
        rows.push(("Hidden Skipped".into(), report.hidden_pruned.to_string()));
    }
    rows.push(("Elapsed Time".into(), time_string(report.stats.duration)));
    rows
}

fn display_path(path: &Path, kind: EntryKind) -> String {
    match kind {
        EntryKind::Dir => format!("{}/", path.display()),
        _ => path.display().to_string(),
    }
}

fn past_tense(command: Command) -> &'static str {
    match command {
        Command::Search => "Searched",
        Command::List => "Listed",
        Command::Size => "Sized",
        Command::Rename => "Renamed",
        Command::Delete => "Deleted",
        Command::Copy => "Copied",
        Command::Move => "Moved",
    }
}

/// Columns of the controlling terminal, or [`DEFAULT_WIDTH`] when there is
/// none to ask.
pub fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((columns, _)) if columns > 0 => usize::from(columns),
        _ => DEFAULT_WIDTH,
    }
}

/// Human-readable byte count with two decimals, e.g. `1.50 KB`.
pub fn byte_string(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Elapsed time as `HH:MM:SS.ffff`.
pub fn time_string(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, rem) = (secs / 3600, secs % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    let fraction = elapsed.subsec_micros() / 100;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{fraction:04}")
}

/// A boxed key/value table, dot-leadered and capped at `max_width` columns.
pub fn summary_table(title: &str, rows: &[(String, String)], max_width: usize) -> String {
    const DOTS: usize = 3;

    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let val_width = rows.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0);

    let content = (key_width + DOTS + val_width + 2)
        .max(title.chars().count() + 2)
        .min(max_width.saturating_sub(2))
        .max(DOTS + 4);

    let border = format!("+{}+", "-".repeat(content));
    let title = truncate(title, content.saturating_sub(2));
    let pad = content - title.chars().count();
    let mut lines = vec![
        border.clone(),
        format!("|{}{}{}|", " ".repeat(pad / 2), title, " ".repeat(pad - pad / 2)),
        border.clone(),
    ];

    let key_col = key_width.min(content.saturating_sub(DOTS + 3));
    for (key, val) in rows {
        let key = truncate(key, key_col);
        let leader = ".".repeat(key_col - key.chars().count() + DOTS);
        let room = content.saturating_sub(key.chars().count() + leader.len() + 2);
        let val = truncate(val, room);
        let fill = room - val.chars().count();
        lines.push(format!("| {key}{leader}{val}{} |", " ".repeat(fill)));
    }
    lines.push(border);
    lines.join("\n")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return text.chars().take(width).collect();
    }
    let mut short: String = text.chars().take(width - 3).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use filebuddy::ScanStats;

    use super::*;

    #[test]
    fn bytes_are_scaled() {
        assert_eq!(byte_string(0), "0.00 B");
        assert_eq!(byte_string(1536), "1.50 KB");
        assert_eq!(byte_string(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn elapsed_time_format() {
        let d = Duration::from_millis(3_723_450);
        assert_eq!(time_string(d), "01:02:03.4500");
    }

    #[test]
    fn table_rows_line_up() {
        let rows = vec![
            ("Files".to_string(), "3".to_string()),
            ("Elapsed Time".to_string(), "00:00:00.0001".to_string()),
        ];
        let table = summary_table("Summary", &rows, 80);
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{table}");
        assert!(table.contains("| Files..........3"));
    }

    fn report_of(results: Vec<OperationResult>) -> Report {
        Report {
            results,
            errors: Vec::new(),
            hidden_pruned: 0,
            stats: ScanStats {
                files: 3,
                dirs: 1,
                matches: 3,
                duration: Duration::ZERO,
            },
        }
    }

    fn renamed(source: &str, kind: EntryKind) -> OperationResult {
        OperationResult {
            source: PathBuf::from(source),
            kind,
            target: Some(PathBuf::from(format!("{source}.bak"))),
            status: Status::Success,
            detail: None,
            error: None,
        }
    }

    fn hit(source: &str, number: usize, text: &str) -> OperationResult {
        OperationResult {
            detail: Some(Detail::Line {
                number,
                text: text.to_string(),
                span: 0..3,
            }),
            target: None,
            ..renamed(source, EntryKind::File)
        }
    }

    fn rendered(command: Command, report: &Report, width: Option<usize>) -> String {
        let mut out = Vec::new();
        let mut renderer = Renderer::new(&mut out, false, false, width);
        renderer.render(command, report).unwrap();
        renderer.summary(command, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn summary_counts_directories_and_files_apart() {
        let report = report_of(vec![
            renamed("/w/docs", EntryKind::Dir),
            renamed("/w/a.txt", EntryKind::File),
            renamed("/w/b.txt", EntryKind::File),
        ]);
        let text = rendered(Command::Rename, &report, Some(80));

        assert!(text.contains("/w/a.txt => /w/a.txt.bak"), "{text}");
        assert!(text.contains("| Directories Renamed...1"), "{text}");
        assert!(text.contains("| Files Renamed.........2"), "{text}");

        let text = rendered(Command::List, &report, Some(80));
        assert!(text.contains("Directory Count") && text.contains("File Count"), "{text}");
    }

    #[test]
    fn search_gets_a_hits_table_per_file() {
        let report = report_of(vec![
            hit("/w/a.rs", 1, "fn main"),
            hit("/w/a.rs", 4, "fn helper"),
            hit("/w/b.rs", 2, "fn other"),
        ]);
        let text = rendered(Command::Search, &report, Some(80));

        assert!(text.contains("    4: fn helper"), "{text}");
        assert!(text.contains("| /w/a.rs...2"), "{text}");
        assert!(text.contains("| /w/b.rs...1"), "{text}");
        assert!(text.contains("Hits Found"), "{text}");
    }

    #[test]
    fn result_lines_are_cut_to_the_terminal_width() {
        let long = "/w/a_very_long_directory_name/with_a_very_long_file_name.txt";
        let report = report_of(vec![renamed(long, EntryKind::File)]);

        let text = rendered(Command::Rename, &report, Some(30));
        let first = text.lines().next().unwrap();
        assert_eq!(first.chars().count(), 30);
        assert!(first.ends_with("..."));
        assert!(text.lines().all(|l| l.chars().count() <= 30), "{text}");

        let text = rendered(Command::Rename, &report, None);
        assert!(text.lines().next().unwrap().ends_with(".txt.bak"), "file output is not cut");
    }

    #[test]
    fn table_respects_narrow_terminals() {
        let rows = vec![("A very long key name".to_string(), "a very long value".to_string())];
        let table = summary_table("Summary", &rows, 20);
        assert!(table.lines().all(|l| l.chars().count() <= 20), "{table}");
    }
}
