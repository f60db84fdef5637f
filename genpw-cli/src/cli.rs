use std::ffi::OsString;
use std::io::Write;
use std::num::NonZeroU64;

use clap::Parser;
use genpw::{GenerationRequest, Layout, PasswordBatchGenerator};

use crate::error::Error;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "genpw")]
#[command(about = "Generate random passwords with minimum counts of numbers and symbols")]
pub struct Args {
    /// Count of output
    #[arg(short = 'o', long = "count", env = "GENPW_COUNT", default_value_t = 1, allow_negative_numbers = true)]
    pub output_count: i64,

    /// Number of characters
    #[arg(short = 'n', long = "length", env = "GENPW_LENGTH", default_value_t = 16, allow_negative_numbers = true)]
    pub length: i64,

    /// Minimum count of numbers (0 excludes numbers, negative means no minimum)
    #[arg(long = "nc", env = "GENPW_MIN_DIGITS", default_value_t = -1, allow_negative_numbers = true)]
    pub min_digits: i64,

    /// Minimum count of symbols (0 excludes symbols, negative means no minimum)
    #[arg(long = "sc", env = "GENPW_MIN_SYMBOLS", default_value_t = -1, allow_negative_numbers = true)]
    pub min_symbols: i64,

    /// Give up on a password after this many rejected candidates
    #[arg(long)]
    pub max_attempts: Option<NonZeroU64>,

    /// Print one password per line instead of filling 80 column lines
    #[arg(long)]
    pub one_per_line: bool,

    /// Read commands from stdin and keep a list of generated passwords
    #[arg(short, long)]
    pub interactive: bool,

    /// Log generation details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parses `argv` after rewriting the single-dash `-nc`/`-sc` spellings.
    pub fn parse_normalized<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_args(argv))
    }

    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            output_count: self.output_count,
            length: self.length,
            min_digits: self.min_digits,
            min_symbols: self.min_symbols,
            max_attempts: self.max_attempts,
        }
    }

    pub fn layout(&self) -> Layout {
        if self.one_per_line { Layout::OnePerLine } else { Layout::Wrapped }
    }
}

/// Rewrites `-nc` and `-sc` (optionally with `=value`) to `--nc` and `--sc`.
pub fn normalize_args<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    argv.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            let Some(s) = arg.to_str() else {
                return arg;
            };
            let flag = s.split_once('=').map_or(s, |(flag, _)| flag);
            if flag == "-nc" || flag == "-sc" {
                OsString::from(format!("-{s}"))
            } else {
                arg
            }
        })
        .collect()
}

/// Generates one batch for `args` and writes it to `out`.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<(), Error> {
    let request = args.request();
    tracing::debug!(?request, "generating");

    PasswordBatchGenerator::new().layout(args.layout()).generate(out, &request)?;
    Ok(())
}
