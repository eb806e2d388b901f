//! Output formatting for CLI

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use colored::Colorize;
use serde::Serialize;

use nutanix_provider::{Diagnostic, Severity};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Render a list of items in the given format
pub fn render_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(items).unwrap_or_default(),
        OutputFormat::Plain => items
            .iter()
            .map(|item| {
                T::headers()
                    .iter()
                    .zip(item.row())
                    .map(|(header, value)| format!("{}: {}", header, value))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n---\n"),
    }
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(item).unwrap_or_default());
        }
        _ => println!("{}", render_list(std::slice::from_ref(item), format)),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    println!("{}", render_list(items, format));
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✔".green(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✘".red(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "!".yellow(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

/// Print every diagnostic to stderr
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        let mut line = format!("{}: {}", diag.summary, diag.detail);
        if let Some(attr) = &diag.attribute {
            line.push_str(&format!(" (attribute {:?})", attr));
        }

        match diag.severity {
            Severity::Error => print_error(&line),
            Severity::Warning => print_warning(&line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: String,
        count: u32,
    }

    impl TableDisplay for Row {
        fn headers() -> Vec<&'static str> {
            vec!["Name", "Count"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.name.clone(), self.count.to_string()]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "a".into(), count: 1 },
            Row { name: "b".into(), count: 2 },
        ]
    }

    #[test]
    fn test_plain_output() {
        assert_eq!(
            render_list(&rows(), OutputFormat::Plain),
            "Name: a\nCount: 1\n---\nName: b\nCount: 2"
        );
    }

    #[test]
    fn test_json_output() {
        let json = render_list(&rows(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["name"], "b");
    }

    #[test]
    fn test_table_output_has_headers() {
        let table = render_list(&rows(), OutputFormat::Table);
        assert!(table.contains("Name"));
        assert!(table.contains("Count"));
    }
}
