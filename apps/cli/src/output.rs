//! Output formatting for the CLI.

use api_client::DataSource;
use clap::ValueEnum;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: could not encode output: {}", e),
    }
}

fn status_json(status: &str, message: &str) -> String {
    serde_json::json!({ "status": status, "message": message }).to_string()
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => println!("{}", status_json("success", message)),
    }
}

/// Print a warning that does not fail the command.
pub fn print_warning(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Warning: {}", message),
        OutputFormat::Json => eprintln!("{}", status_json("warning", message)),
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => eprintln!("{}", status_json("error", message)),
    }
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(64));
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    print_divider();
}

pub fn print_sources(sources: &[DataSource], format: &OutputFormat) {
    if *format == OutputFormat::Json {
        print_json(&sources);
        return;
    }

    print_heading("Data sources");
    if sources.is_empty() {
        println!("  No data sources yet. Upload a CSV with 'decisiv upload <file>'.");
        return;
    }
    for source in sources {
        println!(
            "  {:<28} {:<5} {:>10} rows  {}",
            truncate(&source.name, 28),
            source.kind.to_string(),
            source.row_count,
            source.status
        );
    }
}

pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_json_escapes_message() {
        let json = status_json("error", r#"bad "quote""#);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["message"], r#"bad "quote""#);
        assert_eq!(value["status"], "error");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("report.csv", 28), "report.csv");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
