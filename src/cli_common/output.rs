//! Модуль для форматирования и вывода диагностик

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;

use crate::diagnostics::Diagnostic;

/// Формат вывода результатов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!("Unknown output format: {}", s)),
        }
    }
}

/// Writer для вывода результатов
pub struct OutputWriter {
    writer: Box<dyn Write>,
    format: OutputFormat,
}

impl OutputWriter {
    /// Создает writer для stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(Box::new(io::stdout()), format)
    }

    pub fn new(writer: Box<dyn Write>, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Записывает сериализуемый объект как JSON
    pub fn write_object<T: Serialize>(&mut self, obj: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(obj)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Записывает одну диагностику
    pub fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.write_object(diagnostic),
            OutputFormat::Text => {
                writeln!(
                    self.writer,
                    "{} {}:{}:{}",
                    "error".red().bold(),
                    diagnostic.file,
                    diagnostic.line,
                    diagnostic.column
                )?;
                writeln!(self.writer, "  {}", diagnostic.message)?;
                if !diagnostic.context.is_empty() {
                    writeln!(self.writer, "  {} {}", "context:".dimmed(), diagnostic.context)?;
                }
                writeln!(self.writer, "  {} {}", "issue:".yellow(), diagnostic.suggestion.issue)?;
                writeln!(self.writer, "  {} {}", "fix:".green(), diagnostic.suggestion.fix)?;
                writeln!(
                    self.writer,
                    "  {}",
                    diagnostic.timestamp.to_rfc3339().dimmed()
                )?;
                Ok(())
            }
        }
    }

    /// Записывает список диагностик (JSON: один массив)
    pub fn write_diagnostics(&mut self, diagnostics: &[Diagnostic]) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.write_object(&diagnostics),
            OutputFormat::Text => {
                if diagnostics.is_empty() {
                    writeln!(self.writer, "No DSL errors recorded")?;
                }
                for diagnostic in diagnostics {
                    self.write_diagnostic(diagnostic)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_list_is_one_array() {
        use crate::diagnostics::Suggestion;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let diagnostic = Diagnostic::new(
            "Unknown relationship".to_string(),
            "/w/workspace.dsl".to_string(),
            4,
            "a -> b".to_string(),
            Suggestion::new("issue", "fix"),
            chrono::Utc::now(),
        );

        {
            let file = std::fs::File::create(&path).unwrap();
            let mut writer = OutputWriter::new(Box::new(file), OutputFormat::Json);
            writer
                .write_diagnostics(&[diagnostic.clone(), diagnostic])
                .unwrap();
        }

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["line"], 4);
    }
}
