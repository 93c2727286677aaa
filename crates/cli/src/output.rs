//! CLI output formatting module

use crate::config::{CliConfig, OutputFormat};
use kpx_core::{Keyphrase, Outputs, Result};
use serde::Serialize;
use std::io::{self, Write};

/// Output formatter for CLI results
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
    writer: Box<dyn Write + Send>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(config: &CliConfig) -> Self {
        Self::with_format(config.default_output_format, config.use_colors)
    }

    /// Create a formatter with specific format
    pub fn with_format(format: OutputFormat, use_colors: bool) -> Self {
        Self {
            format,
            use_colors: use_colors && crate::config::supports_color(),
            writer: Box::new(io::stdout()),
        }
    }

    /// Create a formatter with custom writer
    pub fn with_writer<W: Write + Send + 'static>(
        format: OutputFormat,
        use_colors: bool,
        writer: W,
    ) -> Self {
        Self {
            format,
            use_colors: use_colors && crate::config::supports_color(),
            writer: Box::new(writer),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format and output a serializable value
    pub fn output<T: Serialize>(&mut self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.output_json(value),
            OutputFormat::Yaml => self.output_yaml(value),
            OutputFormat::Pretty => self.output_pretty(value),
            OutputFormat::Compact => self.output_compact(value),
            OutputFormat::Table => self.output_table(value),
        }
    }

    /// Output ranked keyphrase lists
    ///
    /// Pretty and table formats print one ranked block per list; the other
    /// formats serialize [`Outputs`] as is.
    pub fn output_keyphrases(&mut self, outputs: &Outputs) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => {
                for (i, list) in outputs.keyphrases.iter().enumerate() {
                    if outputs.len() > 1 {
                        writeln!(self.writer, "{}", self.colorize_key(&format!("#{}", i + 1)))?;
                    }
                    if list.is_empty() {
                        writeln!(self.writer, "  (no keyphrases)")?;
                    }
                    for (rank, keyphrase) in list.iter().enumerate() {
                        writeln!(
                            self.writer,
                            "{:>4}. {} {}",
                            rank + 1,
                            keyphrase.phrase,
                            self.format_score(keyphrase.score)
                        )?;
                    }
                }
                Ok(())
            }
            OutputFormat::Table => {
                for list in &outputs.keyphrases {
                    self.keyphrase_table(list)?;
                }
                Ok(())
            }
            _ => self.output(outputs),
        }
    }

    /// Output JSON format
    fn output_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Output YAML format
    fn output_yaml<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let yaml = serde_yaml::to_string(value)?;
        writeln!(self.writer, "{}", yaml)?;
        Ok(())
    }

    fn output_pretty<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json_value: serde_json::Value = serde_json::to_value(value)?;
        self.format_json_pretty(&json_value, 0)?;
        Ok(())
    }

    fn output_compact<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    fn output_table<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json_value: serde_json::Value = serde_json::to_value(value)?;
        self.format_as_table(&json_value)?;
        Ok(())
    }

    fn format_json_pretty(&mut self, value: &serde_json::Value, indent: usize) -> Result<()> {
        let indent_str = "  ".repeat(indent);

        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map {
                    match val {
                        serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                            writeln!(self.writer, "{}{}:", indent_str, self.colorize_key(key))?;
                            self.format_json_pretty(val, indent + 1)?;
                        }
                        _ => {
                            writeln!(
                                self.writer,
                                "{}{}: {}",
                                indent_str,
                                self.colorize_key(key),
                                self.format_value(val)
                            )?;
                        }
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for (i, item) in arr.iter().enumerate() {
                    writeln!(self.writer, "{}[{}]:", indent_str, i)?;
                    self.format_json_pretty(item, indent + 1)?;
                }
            }
            _ => {
                writeln!(self.writer, "{}{}", indent_str, self.format_value(value))?;
            }
        }
        Ok(())
    }

    fn format_as_table(&mut self, value: &serde_json::Value) -> Result<()> {
        match value {
            serde_json::Value::Object(map) => {
                let max_key_len = map.keys().map(|k| k.chars().count()).max().unwrap_or(0);

                writeln!(
                    self.writer,
                    "┌{}┬{}┐",
                    "─".repeat(max_key_len + 2),
                    "─".repeat(40)
                )?;
                writeln!(
                    self.writer,
                    "│ {:<width$} │ {:<38} │",
                    "Key",
                    "Value",
                    width = max_key_len
                )?;
                writeln!(
                    self.writer,
                    "├{}┼{}┤",
                    "─".repeat(max_key_len + 2),
                    "─".repeat(40)
                )?;

                for (key, val) in map {
                    writeln!(
                        self.writer,
                        "│ {:<width$} │ {:<38} │",
                        key,
                        truncate(&self.value_to_string(val), 38),
                        width = max_key_len
                    )?;
                }

                writeln!(
                    self.writer,
                    "└{}┴{}┘",
                    "─".repeat(max_key_len + 2),
                    "─".repeat(40)
                )?;
            }
            serde_json::Value::Array(arr) => {
                writeln!(self.writer, "┌───┬{}┐", "─".repeat(50))?;
                writeln!(self.writer, "│ # │ {:<48} │", "Value")?;
                writeln!(self.writer, "├───┼{}┤", "─".repeat(50))?;

                for (i, item) in arr.iter().enumerate() {
                    writeln!(
                        self.writer,
                        "│{:>2} │ {:<48} │",
                        i,
                        truncate(&self.value_to_string(item), 48)
                    )?;
                }

                writeln!(self.writer, "└───┴{}┘", "─".repeat(50))?;
            }
            _ => {
                writeln!(self.writer, "{}", self.format_value(value))?;
            }
        }
        Ok(())
    }

    fn keyphrase_table(&mut self, list: &[Keyphrase]) -> Result<()> {
        writeln!(self.writer, "┌──────┬{}┬──────────┐", "─".repeat(32))?;
        writeln!(self.writer, "│ Rank │ {:<30} │ Score    │", "Keyphrase")?;
        writeln!(self.writer, "├──────┼{}┼──────────┤", "─".repeat(32))?;
        for (rank, keyphrase) in list.iter().enumerate() {
            writeln!(
                self.writer,
                "│ {:>4} │ {:<30} │ {:>8.4} │",
                rank + 1,
                truncate(&keyphrase.phrase, 30),
                keyphrase.score
            )?;
        }
        writeln!(self.writer, "└──────┴{}┴──────────┘", "─".repeat(32))?;
        Ok(())
    }

    fn value_to_string(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => "null".to_string(),
            serde_json::Value::Array(arr) => format!("[{} items]", arr.len()),
            serde_json::Value::Object(obj) => format!("{{{}}} keys", obj.len()),
        }
    }

    fn format_value(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => {
                if self.use_colors {
                    format!("\x1b[32m\"{}\"\x1b[0m", s)
                } else {
                    format!("\"{}\"", s)
                }
            }
            serde_json::Value::Number(n) => {
                if self.use_colors {
                    format!("\x1b[36m{}\x1b[0m", n)
                } else {
                    n.to_string()
                }
            }
            serde_json::Value::Bool(b) => {
                if self.use_colors {
                    format!("\x1b[35m{}\x1b[0m", b)
                } else {
                    b.to_string()
                }
            }
            serde_json::Value::Null => {
                if self.use_colors {
                    "\x1b[90mnull\x1b[0m".to_string()
                } else {
                    "null".to_string()
                }
            }
            serde_json::Value::Array(arr) => format!("[{} items]", arr.len()),
            serde_json::Value::Object(obj) => format!("{{{}}} keys", obj.len()),
        }
    }

    fn format_score(&self, score: f32) -> String {
        if self.use_colors {
            format!("\x1b[36m{:.4}\x1b[0m", score)
        } else {
            format!("{:.4}", score)
        }
    }

    fn colorize_key(&self, key: &str) -> String {
        if self.use_colors {
            format!("\x1b[34m{}\x1b[0m", key)
        } else {
            key.to_string()
        }
    }

    /// Output a simple message
    pub fn message(&mut self, msg: &str) -> Result<()> {
        writeln!(self.writer, "{}", msg)?;
        Ok(())
    }

    /// Output a success message
    pub fn success(&mut self, msg: &str) -> Result<()> {
        if self.use_colors {
            writeln!(self.writer, "\x1b[32m✓\x1b[0m {}", msg)?;
        } else {
            writeln!(self.writer, "✓ {}", msg)?;
        }
        Ok(())
    }

    /// Output an error message
    pub fn error(&mut self, msg: &str) -> Result<()> {
        if self.use_colors {
            writeln!(self.writer, "\x1b[31m✗\x1b[0m {}", msg)?;
        } else {
            writeln!(self.writer, "✗ {}", msg)?;
        }
        Ok(())
    }

    /// Output a warning message
    pub fn warning(&mut self, msg: &str) -> Result<()> {
        if self.use_colors {
            writeln!(self.writer, "\x1b[33m⚠\x1b[0m {}", msg)?;
        } else {
            writeln!(self.writer, "⚠ {}", msg)?;
        }
        Ok(())
    }
}

/// Shortens `text` to at most `width` characters
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
