//! Interactive form session.
//!
//! Keeps the four numeric form fields as text, the way a user edits them,
//! and the list of passwords currently on display. Generating replaces the
//! list only when the request succeeds; a rejected request leaves whatever
//! was displayed before.

use std::io::{BufRead, Write};
use std::str::FromStr;

use genpw::{GenerationError, GenerationRequest, PasswordBatchGenerator};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::error::Error;

pub const DEFAULT_COUNT: &str = "64";
pub const DEFAULT_LENGTH: &str = "16";
pub const DEFAULT_MIN_DIGITS: &str = "-1";
pub const DEFAULT_MIN_SYMBOLS: &str = "-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Count,
    Length,
    MinDigits,
    MinSymbols,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Count, Field::Length, Field::MinDigits, Field::MinSymbols];

    pub fn label(self) -> &'static str {
        match self {
            Field::Count => "count of output",
            Field::Length => "number of characters",
            Field::MinDigits => "minimum count of numbers",
            Field::MinSymbols => "minimum count of symbols",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" | "o" => Ok(Field::Count),
            "length" | "n" => Ok(Field::Length),
            "digits" | "nc" => Ok(Field::MinDigits),
            "symbols" | "sc" => Ok(Field::MinSymbols),
            _ => Err(format!("unknown field '{s}' (expected count, length, digits or symbols)")),
        }
    }
}

/// The four editable fields of the generator form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    count: String,
    length: String,
    min_digits: String,
    min_symbols: String,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT.to_string(),
            length: DEFAULT_LENGTH.to_string(),
            min_digits: DEFAULT_MIN_DIGITS.to_string(),
            min_symbols: DEFAULT_MIN_SYMBOLS.to_string(),
        }
    }
}

impl Form {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Count => &self.count,
            Field::Length => &self.length,
            Field::MinDigits => &self.min_digits,
            Field::MinSymbols => &self.min_symbols,
        }
    }

    pub fn set(&mut self, field: Field, text: impl Into<String>) {
        let slot = match field {
            Field::Count => &mut self.count,
            Field::Length => &mut self.length,
            Field::MinDigits => &mut self.min_digits,
            Field::MinSymbols => &mut self.min_symbols,
        };
        *slot = text.into();
    }

    /// Generating is enabled only when no field is blank.
    pub fn can_generate(&self) -> bool {
        Field::ALL.iter().all(|&field| !self.get(field).trim().is_empty())
    }

    /// Reads the fields as integers. Text that does not parse counts as 0.
    pub fn request(&self) -> GenerationRequest {
        let value = |field| self.get(field).trim().parse::<i64>().unwrap_or(0);
        GenerationRequest::new(
            value(Field::Count),
            value(Field::Length),
            value(Field::MinDigits),
            value(Field::MinSymbols),
        )
    }
}

/// A form plus the passwords it last produced.
///
/// The raw generator output is zeroed once it has been split; the displayed
/// passwords themselves are kept as plain strings.
pub struct Session<R = OsRng> {
    form: Form,
    passwords: Vec<String>,
    generator: PasswordBatchGenerator<R>,
}

impl Session<OsRng> {
    pub fn new() -> Self {
        Self::with_generator(PasswordBatchGenerator::new())
    }
}

impl Default for Session<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> Session<R> {
    pub fn with_generator(generator: PasswordBatchGenerator<R>) -> Self {
        Self { form: Form::default(), passwords: Vec::new(), generator }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Runs the generator with the current form values.
    ///
    /// Returns `Ok(false)` without doing anything while a field is blank.
    /// On error the displayed passwords are kept as they were.
    pub fn generate(&mut self) -> Result<bool, GenerationError> {
        if !self.form.can_generate() {
            return Ok(false);
        }

        let mut buf = Zeroizing::new(Vec::<u8>::new());
        self.generator.generate(&mut *buf, &self.form.request())?;

        self.passwords = String::from_utf8_lossy(&buf).split_whitespace().map(str::to_owned).collect();
        tracing::debug!(count = self.passwords.len(), "displayed passwords replaced");
        Ok(true)
    }

    /// Restores the default field values and clears the displayed passwords.
    pub fn reset(&mut self) {
        self.form.reset();
        self.passwords.clear();
    }

    pub fn passwords(&self) -> &[String] {
        &self.passwords
    }

    pub fn len(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.passwords.get(index).map(String::as_str)
    }

    /// The literal text to hand to a clipboard for password `index`.
    pub fn copy(&self, index: usize) -> Option<&str> {
        self.get(index)
    }
}

const HELP: &str = "\
commands:
  show                      print the form fields
  set <field> [value]       edit a field (count, length, digits, symbols)
  generate                  generate passwords from the form
  list                      print the displayed passwords
  copy <number>             print one password as-is
  reset                     restore defaults and clear the list
  help                      print this help
  quit                      leave
";

/// Reads commands line by line from `input` until `quit` or end of input.
pub fn run_interactive<I, W, R>(session: &mut Session<R>, input: I, out: &mut W) -> Result<(), Error>
where
    I: BufRead,
    W: Write,
    R: RngCore + CryptoRng,
{
    for line in input.lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        match command {
            "show" => show_form(session.form(), out)?,
            "set" => match words.next().map(str::parse::<Field>) {
                Some(Ok(field)) => {
                    let value = words.collect::<Vec<_>>().join(" ");
                    session.form_mut().set(field, value);
                }
                Some(Err(e)) => writeln!(out, "{e}")?,
                None => writeln!(out, "usage: set <field> [value]")?,
            },
            "generate" => match session.generate() {
                Ok(true) => list_passwords(session.passwords(), out)?,
                Ok(false) => writeln!(out, "every field needs a value")?,
                Err(e) => {
                    tracing::debug!(error = %e, "generation refused");
                    writeln!(out, "{e}")?;
                }
            },
            "list" => list_passwords(session.passwords(), out)?,
            "copy" => {
                let password = words
                    .next()
                    .and_then(|n| n.parse::<usize>().ok())
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| session.copy(i));
                match password {
                    Some(password) => writeln!(out, "{password}")?,
                    None => writeln!(out, "no such password")?,
                }
            }
            "reset" => session.reset(),
            "help" => out.write_all(HELP.as_bytes())?,
            "quit" | "exit" => break,
            other => writeln!(out, "unknown command '{other}', try 'help'")?,
        }
        out.flush()?;
    }

    Ok(())
}

fn show_form<W: Write>(form: &Form, out: &mut W) -> std::io::Result<()> {
    for field in Field::ALL {
        writeln!(out, "{:>26}: {}", field.label(), form.get(field))?;
    }
    Ok(())
}

fn list_passwords<W: Write>(passwords: &[String], out: &mut W) -> std::io::Result<()> {
    for (i, password) in passwords.iter().enumerate() {
        writeln!(out, "{:>4}  {}", i + 1, password)?;
    }
    Ok(())
}
