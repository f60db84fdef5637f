//! Cryptographically secure batch password generator.
//!
//! Produces a batch of fixed-length passwords that each contain at least a
//! requested number of digits and symbols, and writes them as whitespace
//! delimited text wrapped to an 80 column line.
//!
//! Each password is drawn by rejection sampling over the whole candidate:
//! `length` characters are picked uniformly from the request's
//! [`Universe`], and the candidate is thrown away and redrawn until it meets
//! both minimums. Index selection uses [`Uniform`], which rejects out of range
//! draws instead of reducing modulo the universe size, so every character of
//! the universe is equally likely.
//!
//! # Usage
//!
//! ```no_run
//! use genpw::GenerationRequest;
//!
//! let request = GenerationRequest::new(8, 16, 2, 1);
//! let mut out = Vec::new();
//! genpw::generate(&mut out, &request)?;
//! print!("{}", String::from_utf8_lossy(&out));
//! # Ok::<(), genpw::GenerationError>(())
//! ```
//!
//! A failing operating system entropy source panics inside [`OsRng`]; it is
//! never turned into a recoverable error.
//!
//! Rejected candidates and the rendered batch text are zeroed on drop. The
//! accepted passwords handed back by [`PasswordBatchGenerator::generate_passwords`]
//! are plain `String`s owned by the caller, and are not scrubbed.

pub mod charset;
pub mod error;
pub mod format;

use std::io::Write;
use std::num::NonZeroU64;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

pub use charset::{DIGITS, LOWERCASE, SYMBOLS, UPPERCASE, Universe, count_in};
pub use error::{GenerationError, Unsatisfiable};
pub use format::{LINE_WIDTH, Layout, format_batch};

/// Passwords reserved before sampling starts; larger batches grow as they go.
const PRESIZE_LIMIT: usize = 1024;

/// Parameters of a single generation call.
///
/// `min_digits` and `min_symbols` are inclusive lower bounds; a value of zero
/// or below enforces no minimum. Zero also keeps that class out of the
/// universe, while a negative value leaves it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub output_count: i64,
    pub length: i64,
    pub min_digits: i64,
    pub min_symbols: i64,
    /// Candidate draws allowed per password. `None` retries until a candidate
    /// fits.
    pub max_attempts: Option<NonZeroU64>,
}

impl GenerationRequest {
    pub fn new(output_count: i64, length: i64, min_digits: i64, min_symbols: i64) -> Self {
        Self { output_count, length, min_digits, min_symbols, max_attempts: None }
    }

    /// Caps the number of candidates drawn for each password. Exceeding the
    /// cap fails the whole call with [`Unsatisfiable::AttemptsExhausted`].
    pub fn with_max_attempts(mut self, max_attempts: NonZeroU64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Checks the request before any randomness is consumed.
    pub fn validate(&self) -> Result<Plan, GenerationError> {
        let invalid = || GenerationError::InvalidArguments {
            output_count: self.output_count,
            length: self.length,
        };
        if self.output_count <= 0 || self.length < 1 {
            return Err(invalid());
        }

        let required = self.min_digits.max(0).saturating_add(self.min_symbols.max(0));
        if self.length < required {
            return Err(Unsatisfiable::MinimumsExceedLength { required, length: self.length }.into());
        }

        let universe = Universe::new(self.length, self.min_digits, self.min_symbols);
        if universe.is_empty() {
            return Err(Unsatisfiable::EmptyUniverse.into());
        }

        Ok(Plan {
            count: usize::try_from(self.output_count).map_err(|_| invalid())?,
            length: usize::try_from(self.length).map_err(|_| invalid())?,
            min_digits: usize::try_from(self.min_digits.max(0)).map_err(|_| invalid())?,
            min_symbols: usize::try_from(self.min_symbols.max(0)).map_err(|_| invalid())?,
            max_attempts: self.max_attempts,
            universe,
        })
    }
}

/// A validated request, ready for sampling.
#[derive(Debug, Clone)]
pub struct Plan {
    pub count: usize,
    pub length: usize,
    pub min_digits: usize,
    pub min_symbols: usize,
    pub max_attempts: Option<NonZeroU64>,
    pub universe: Universe,
}

impl Plan {
    fn accepts(&self, candidate: &[u8]) -> bool {
        if self.min_digits > 0 && count_in(candidate, DIGITS) < self.min_digits {
            return false;
        }
        if self.min_symbols > 0 && count_in(candidate, SYMBOLS) < self.min_symbols {
            return false;
        }
        true
    }
}

/// Generates password batches from a cryptographically secure random source.
///
/// Holds no state besides the random source, so independent generators can
/// run on separate threads without coordination.
pub struct PasswordBatchGenerator<R = OsRng> {
    rng: R,
    layout: Layout,
}

impl PasswordBatchGenerator<OsRng> {
    /// Creates a generator backed by the operating system's random source.
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for PasswordBatchGenerator<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> PasswordBatchGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, layout: Layout::default() }
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Generates the batch described by `request` and writes it to `out`.
    ///
    /// The whole batch is rendered before the first byte is written, so a
    /// failed request leaves `out` untouched.
    pub fn generate<W: Write>(
        &mut self,
        out: &mut W,
        request: &GenerationRequest,
    ) -> Result<(), GenerationError> {
        let passwords = self.generate_passwords(request)?;
        let text = Zeroizing::new(format_batch(&passwords, self.layout));
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Generates the batch described by `request` as individual passwords.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(count = request.output_count, length = request.length)
    )]
    pub fn generate_passwords(
        &mut self,
        request: &GenerationRequest,
    ) -> Result<Vec<String>, GenerationError> {
        let plan = request.validate()?;
        tracing::debug!(universe = plan.universe.len(), "sampling passwords");

        let mut candidate = Zeroizing::new(Vec::new());
        candidate
            .try_reserve_exact(plan.length)
            .map_err(|source| GenerationError::Allocation { length: plan.length, source })?;
        let mut passwords = Vec::with_capacity(plan.count.min(PRESIZE_LIMIT));
        for _ in 0..plan.count {
            passwords.push(self.sample(&plan, &mut candidate)?);
        }
        Ok(passwords)
    }

    fn sample(&mut self, plan: &Plan, candidate: &mut Vec<u8>) -> Result<String, GenerationError> {
        let chars = plan.universe.as_bytes();
        let index = Uniform::new(0, chars.len());

        let mut attempts = 0u64;
        loop {
            attempts += 1;
            candidate.clear();
            candidate.extend((0..plan.length).map(|_| chars[index.sample(&mut self.rng)]));

            if plan.accepts(candidate) {
                if attempts > 1 {
                    tracing::trace!(rejected = attempts - 1, "candidate accepted");
                }
                return Ok(candidate.iter().map(|&c| c as char).collect());
            }

            if plan.max_attempts.is_some_and(|max| attempts >= max.get()) {
                tracing::debug!(attempts, "retry ceiling reached");
                return Err(Unsatisfiable::AttemptsExhausted { attempts }.into());
            }
        }
    }
}

/// Generates `request` with the operating system's random source and writes
/// the wrapped batch to `out`.
pub fn generate<W: Write>(out: &mut W, request: &GenerationRequest) -> Result<(), GenerationError> {
    PasswordBatchGenerator::new().generate(out, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded(seed: u64) -> PasswordBatchGenerator<StdRng> {
        PasswordBatchGenerator::with_rng(StdRng::seed_from_u64(seed))
    }

    fn tokens(out: &[u8]) -> Vec<String> {
        std::str::from_utf8(out).unwrap().split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn test_single_token_from_universe() {
        let request = GenerationRequest::new(1, 8, -1, -1);
        let universe = Universe::new(8, -1, -1);
        let mut out = Vec::new();
        generate(&mut out, &request).unwrap();

        let tokens = tokens(&out);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].len(), 8);
        assert!(tokens[0].bytes().all(|c| universe.contains(c)));
        assert!(out.ends_with(b"\n"));
    }

    #[test]
    fn test_letters_only_without_digits_or_symbols() {
        let request = GenerationRequest::new(20, 8, 0, 0);
        for password in seeded(1).generate_passwords(&request).unwrap() {
            assert_eq!(password.len(), 8);
            assert!(password.bytes().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn test_minimum_digits_and_symbols() {
        let request = GenerationRequest::new(3, 10, 2, 2);
        let mut out = Vec::new();
        PasswordBatchGenerator::new().generate(&mut out, &request).unwrap();

        let tokens = tokens(&out);
        assert_eq!(tokens.len(), 3);
        for token in tokens {
            assert_eq!(token.len(), 10);
            assert!(count_in(token.as_bytes(), DIGITS) >= 2);
            assert!(count_in(token.as_bytes(), SYMBOLS) >= 2);
        }
    }

    #[test]
    fn test_minimums_exceed_length() {
        let request = GenerationRequest::new(1, 2, 3, 0);
        let mut out = Vec::new();
        let err = generate(&mut out, &request).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::ConstraintUnsatisfiable(Unsatisfiable::MinimumsExceedLength {
                required: 3,
                length: 2
            })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_combined_minimums_exceed_length() {
        let request = GenerationRequest::new(4, 5, 3, 3);
        let mut out = Vec::new();
        let err = generate(&mut out, &request).unwrap_err();
        assert!(matches!(err, GenerationError::ConstraintUnsatisfiable(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_count_is_invalid() {
        let request = GenerationRequest::new(0, 8, 0, 0);
        let mut out = Vec::new();
        let err = generate(&mut out, &request).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidArguments { output_count: 0, length: 8 }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_invalid_arguments() {
        for (count, length) in [(-1, 8), (1, 0), (1, -5), (0, 0)] {
            let request = GenerationRequest::new(count, length, -1, -1);
            let mut out = Vec::new();
            let err = seeded(7).generate(&mut out, &request).unwrap_err();
            assert!(matches!(err, GenerationError::InvalidArguments { .. }));
            assert!(out.is_empty());
        }
    }

    #[test]
    fn test_invalid_arguments_checked_before_minimums() {
        let request = GenerationRequest::new(0, 2, 5, 5);
        let err = request.validate().unwrap_err();
        assert!(matches!(err, GenerationError::InvalidArguments { .. }));
    }

    #[test]
    fn test_exact_count_and_length() {
        let request = GenerationRequest::new(64, 16, -1, -1);
        let passwords = seeded(2).generate_passwords(&request).unwrap();
        assert_eq!(passwords.len(), 64);
        assert!(passwords.iter().all(|p| p.len() == 16));
    }

    #[test]
    fn test_minimums_fill_whole_length() {
        let request = GenerationRequest::new(10, 6, 3, 3);
        for password in seeded(3).generate_passwords(&request).unwrap() {
            assert_eq!(count_in(password.as_bytes(), DIGITS), 3);
            assert_eq!(count_in(password.as_bytes(), SYMBOLS), 3);
        }
    }

    #[test]
    fn test_all_digits() {
        let request = GenerationRequest::new(5, 12, 12, -1);
        for password in seeded(4).generate_passwords(&request).unwrap() {
            assert!(password.bytes().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_same_seed_same_batch() {
        let request = GenerationRequest::new(8, 20, 1, 1);
        let first = seeded(42).generate_passwords(&request).unwrap();
        let second = seeded(42).generate_passwords(&request).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_output_matches_layout() {
        let request = GenerationRequest::new(9, 16, -1, -1);
        let passwords = seeded(5).generate_passwords(&request).unwrap();

        let mut out = Vec::new();
        seeded(5).generate(&mut out, &request).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format_batch(&passwords, Layout::Wrapped));

        let mut out = Vec::new();
        seeded(5).layout(Layout::OnePerLine).generate(&mut out, &request).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 9);
    }

    #[test]
    fn test_retry_ceiling() {
        // 40 digits in 41 draws from 94 candidates does not happen in three tries.
        let request = GenerationRequest::new(1, 41, 40, -1).with_max_attempts(NonZeroU64::new(3).unwrap());
        let mut out = Vec::new();
        let err = seeded(6).generate(&mut out, &request).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::ConstraintUnsatisfiable(Unsatisfiable::AttemptsExhausted { attempts: 3 })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_retry_ceiling_not_hit_by_easy_requests() {
        let request =
            GenerationRequest::new(50, 16, 0, 0).with_max_attempts(NonZeroU64::new(1).unwrap());
        assert_eq!(seeded(8).generate_passwords(&request).unwrap().len(), 50);
    }

    /// Pearson's statistic of observed byte counts against the expected share
    /// of each distinct universe byte, weighted by how often it is listed.
    fn chi_squared(passwords: &[String], universe: &Universe) -> f64 {
        let mut counts = [0u64; 256];
        let mut total = 0u64;
        for password in passwords {
            for c in password.bytes() {
                counts[c as usize] += 1;
                total += 1;
            }
        }

        let mut weights = [0u64; 256];
        for &c in universe.as_bytes() {
            weights[c as usize] += 1;
        }

        (0..256)
            .filter(|&c| weights[c] > 0)
            .map(|c| {
                let expected = total as f64 * weights[c] as f64 / universe.len() as f64;
                let diff = counts[c] as f64 - expected;
                diff * diff / expected
            })
            .sum()
    }

    #[test]
    fn test_uniform_letter_frequency() {
        // 52 letters, 51 degrees of freedom; the 0.001 critical value is about 88.0.
        let request = GenerationRequest::new(10_000, 32, 0, 0);
        let passwords = seeded(11).generate_passwords(&request).unwrap();
        let universe = Universe::new(32, 0, 0);
        assert_eq!(universe.len(), 52);

        let statistic = chi_squared(&passwords, &universe);
        assert!(statistic < 88.0, "chi-squared {statistic} suggests biased sampling");
    }

    #[test]
    fn test_uniform_full_universe_frequency() {
        // 94 entries but 93 distinct bytes since the apostrophe is listed twice,
        // so 92 degrees of freedom; the 0.001 critical value is about 139.7.
        let request = GenerationRequest::new(10_000, 32, -1, -1);
        let passwords = seeded(12).generate_passwords(&request).unwrap();
        let universe = Universe::new(32, -1, -1);
        assert_eq!(universe.len(), 94);

        let statistic = chi_squared(&passwords, &universe);
        assert!(statistic < 139.7, "chi-squared {statistic} suggests biased sampling");

        // The apostrophe should land near twice the share of any other symbol.
        let quotes = passwords.iter().map(|p| count_in(p.as_bytes(), b"'")).sum::<usize>();
        let hashes = passwords.iter().map(|p| count_in(p.as_bytes(), b"#")).sum::<usize>();
        let ratio = quotes as f64 / hashes as f64;
        assert!((1.7..2.3).contains(&ratio), "apostrophe to hash ratio {ratio}");
    }

    #[test]
    fn test_huge_count_is_not_reserved_up_front() {
        let request = GenerationRequest::new(i64::MAX, 41, 40, -1)
            .with_max_attempts(NonZeroU64::new(1).unwrap());
        let err = seeded(9).generate_passwords(&request).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::ConstraintUnsatisfiable(Unsatisfiable::AttemptsExhausted { attempts: 1 })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_huge_length_is_an_allocation_error() {
        let request = GenerationRequest::new(1, i64::MAX, -1, -1);
        let mut out = Vec::new();
        let err = seeded(10).generate(&mut out, &request).unwrap_err();
        assert!(matches!(err, GenerationError::Allocation { length, .. } if length == i64::MAX as usize));
        assert!(out.is_empty());
    }

    #[test]
    fn test_generators_on_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    let request = GenerationRequest::new(16, 12, 1, 1);
                    PasswordBatchGenerator::new().generate_passwords(&request).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 16);
        }
    }
}
