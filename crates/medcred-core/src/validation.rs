//! # Validation Pipelines
//!
//! Each credential family validates through a [`Pipeline`]: an ordered list
//! of predicate rules, each carrying exactly one [`ValidationError`]. The
//! pipeline is folded over the input with [`Outcome::ensure_with`], so the
//! first failing rule decides the single returned error and no later rule is
//! evaluated.
//!
//! | Family | Rule order |
//! |--------|------------|
//! | NPI | non-empty, length 10, numeric, entity-type digit, Luhn |
//! | DEA | non-empty, length 9, registrant letter, initial, numeric tail, DEA checksum |
//! | License | non-empty, template length, template prefix, numeric tail, template checksum |
//!
//! Pipelines borrow their input and never mutate it; running the same
//! pipeline twice on the same input yields the same result.

pub mod dea;
pub mod license;
pub mod npi;

use crate::error::ValidationError;
use crate::outcome::Outcome;

type Check<'r> = Box<dyn Fn(&str) -> bool + Send + Sync + 'r>;
type ErrorFn<'r> = Box<dyn Fn(&str) -> ValidationError + Send + Sync + 'r>;

struct Rule<'r> {
    check: Check<'r>,
    error: ErrorFn<'r>,
}

/// Ordered, short-circuiting list of validation rules over a string.
#[derive(Default)]
pub struct Pipeline<'r> {
    rules: Vec<Rule<'r>>,
}

impl<'r> Pipeline<'r> {
    /// An empty pipeline that accepts everything.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule failing with a fixed error.
    pub fn ensure(
        self,
        check: impl Fn(&str) -> bool + Send + Sync + 'r,
        error: ValidationError,
    ) -> Self {
        self.ensure_with(check, move |_| error.clone())
    }

    /// Append a rule whose error is built from the rejected input.
    pub fn ensure_with(
        mut self,
        check: impl Fn(&str) -> bool + Send + Sync + 'r,
        error: impl Fn(&str) -> ValidationError + Send + Sync + 'r,
    ) -> Self {
        self.rules.push(Rule {
            check: Box::new(check),
            error: Box::new(error),
        });
        self
    }

    /// Append the standard non-empty rule.
    pub fn non_empty(self) -> Self {
        self.ensure(|s| !s.trim().is_empty(), ValidationError::EmptyInput)
    }

    /// Append an exact-length rule (length in characters).
    pub fn exact_length(self, expected: usize) -> Self {
        self.ensure_with(
            move |s| s.chars().count() == expected,
            move |s| ValidationError::WrongLength {
                expected,
                actual: s.chars().count(),
            },
        )
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the pipeline has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The error of the first rule whose check fails.
    pub fn run<'i>(&self, input: &'i str) -> Result<&'i str, ValidationError> {
        self.rules.iter().fold(Ok(input), |acc, rule| {
            acc.ensure_with(|s| (rule.check)(s), |s| (rule.error)(s))
        })
    }
}

impl std::fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// True if every character is an ASCII digit.
pub(crate) fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
