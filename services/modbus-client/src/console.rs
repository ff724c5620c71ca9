//! Terminal I/O for the interactive client
//!
//! Input goes through [`Prompt`] so the run loop can be driven by a script
//! in tests; output goes to any `io::Write`.

use std::io::{self, Write};

use block_model::{format_for_display, BlockKind, BlockValues, DisplayValue, ModelError};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::actions::{PendingWrite, WriteOutcome};
use crate::error::{ClientError, Result};
use crate::menu::MenuCommand;
use crate::transport::DeviceIdentity;

const SEPARATOR_WIDTH: usize = 40;

/// Line-oriented operator input
pub trait Prompt {
    /// Next line without its newline; `None` at end of input
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Like `read_line`, for secrets
    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        self.read_line(prompt)
    }
}

/// Interactive prompt with line editing
pub struct RustylinePrompt {
    editor: DefaultEditor,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| ClientError::Terminal(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl Prompt for RustylinePrompt {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    return Ok(Some(line));
                },
                // Ctrl+C - ignore and ask again
                Err(ReadlineError::Interrupted) => println!("^C"),
                // Ctrl+D
                Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(ClientError::Terminal(e.to_string())),
            }
        }
    }

    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        // Kept out of history
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(ClientError::Terminal(e.to_string())),
        }
    }
}

fn terminal(err: io::Error) -> ClientError {
    ClientError::Terminal(err.to_string())
}

fn flag(value: bool) -> String {
    if value {
        "True".green().to_string()
    } else {
        "False".red().to_string()
    }
}

fn render_value(value: DisplayValue) -> String {
    match value {
        DisplayValue::Flag(b) => flag(b),
        DisplayValue::Number(n) => n.to_string(),
    }
}

/// Singular block title used after a write
fn write_title(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Coils => "Discrete Output Coil",
        _ => "Analogue Output Holding Register",
    }
}

/// Prompt and output pair used by the run loop
pub struct Console<P, W> {
    prompt: P,
    out: W,
}

impl<P: Prompt, W: Write> Console<P, W> {
    pub fn new(prompt: P, out: W) -> Self {
        Self { prompt, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.out.flush().map_err(terminal)?;
        self.prompt.read_line(prompt)
    }

    pub fn read_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        self.out.flush().map_err(terminal)?;
        self.prompt.read_secret(prompt)
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.out, "{}", text.as_ref()).map_err(terminal)
    }

    pub fn warning(&mut self, text: impl AsRef<str>) -> Result<()> {
        self.line(text.as_ref().yellow().to_string())
    }

    pub fn error(&mut self, text: impl AsRef<str>) -> Result<()> {
        self.line(text.as_ref().red().to_string())
    }

    pub fn menu(&mut self) -> Result<()> {
        self.line("-".repeat(SEPARATOR_WIDTH))?;
        for command in MenuCommand::ALL {
            self.line(format!("{}. {}", command.number(), command.title()))?;
        }
        self.line("")
    }

    pub fn identity(&mut self, identity: &DeviceIdentity) -> Result<()> {
        self.line(format!("Vendor Name : {}", identity.vendor.green()))?;
        self.line(format!("Product Code: {}", identity.product.green()))?;
        self.line(format!("Revision    : {}\n", identity.revision.green()))
    }

    /// Header plus one labelled line per channel
    pub fn block(&mut self, kind: BlockKind, values: &BlockValues) -> Result<()> {
        self.line(format!("{} [{}]", kind.label(), kind.access()))?;
        self.entries(kind, values)
    }

    fn entries(&mut self, kind: BlockKind, values: &BlockValues) -> Result<()> {
        for entry in format_for_display(kind, values) {
            self.line(format!("{}: {}", entry.label, render_value(entry.value)))?;
        }
        Ok(())
    }

    pub fn read_failed(&mut self, kind: BlockKind, err: &ClientError) -> Result<()> {
        self.error(format!("Unable to read {}: {}", kind.label(), err))
    }

    /// Compact one-line-per-block overview
    pub fn overview(&mut self, results: &[(BlockKind, Result<BlockValues>)]) -> Result<()> {
        self.line(format!("{}\n", MenuCommand::ReadAll.title()))?;
        for (kind, result) in results {
            let rendered = match result {
                Ok(values) => {
                    let items: Vec<String> = format_for_display(*kind, values)
                        .into_iter()
                        .map(|entry| render_value(entry.value))
                        .collect();
                    if kind.is_bit() {
                        items.join(", ")
                    } else {
                        format!("[ {} ]", items.join(", "))
                    }
                },
                Err(_) => "Error reading".red().to_string(),
            };
            self.line(format!("{:<34} {}", kind.label(), rendered))?;
        }
        Ok(())
    }

    pub fn write_instructions(&mut self, kind: BlockKind) -> Result<()> {
        match kind {
            BlockKind::Coils => self.line("Enter comma separated 0s and 1s "),
            _ => self.line("Enter comma separated"),
        }
    }

    /// Explain rejected write input in operator terms
    pub fn write_rejected(&mut self, kind: BlockKind, err: &ClientError) -> Result<()> {
        let message = match (kind, err) {
            (_, ClientError::Validation(ModelError::WrongCount { expected, .. })) => {
                format!("You must enter exactly {} values.", expected)
            },
            (BlockKind::Coils, ClientError::Validation(_)) => {
                "Invalid input. Only comma-separated 0 or 1.".to_string()
            },
            (_, ClientError::Validation(_)) => {
                "Invalid input. Use only integers from 0 to 9.".to_string()
            },
            (_, other) => other.to_string(),
        };
        self.error(message)
    }

    pub fn accepting(&mut self, pending: &PendingWrite) -> Result<()> {
        let quoted: Vec<String> = pending.tokens.iter().map(|t| format!("'{}'", t)).collect();
        self.line(format!("\nAccepting these values: {}.", quoted.join(", ")))
    }

    pub fn write_failed(&mut self, kind: BlockKind, err: &ClientError) -> Result<()> {
        let target = match kind {
            BlockKind::Coils => "coils",
            _ => "holding registers",
        };
        self.error(format!("Failed to write to {}: {}", target, err))
    }

    pub fn write_succeeded(&mut self, outcome: &WriteOutcome) -> Result<()> {
        let kind = outcome.written.kind;
        self.line(format!("\nPost write, {} values:", write_title(kind)))?;
        self.line(format!("Success: {}\n", flag(true)))?;
        if let Some(e) = &outcome.storage_warning {
            self.warning(format!("Warning: written values not cached: {}", e))?;
        }
        match &outcome.readback {
            Ok(values) => self.entries(kind, values),
            Err(e) => self.read_failed(kind, e),
        }
    }
}
