//! Sources of the substitution parameters.
//!
//! The batch only ever sees a validated [`SubstitutionSpec`]; where the numbers
//! came from (flags or a console session) stays behind [`InputProvider`].

use crate::error::Result;
use crate::substitution::{parse_month, parse_year, SubstitutionSpec};
use crate::utils::validation::{require, require_pair};

pub trait InputProvider {
    /// Old and new month, each in 1..=12.
    fn month_pair(&mut self) -> Result<(u8, u8)>;

    /// Old and new year, or `None` when years are left alone.
    fn year_pair(&mut self) -> Result<Option<(i32, i32)>>;
}

/// Collect and validate a spec. Months are checked before years are asked for.
pub fn resolve_spec(provider: &mut dyn InputProvider) -> Result<SubstitutionSpec> {
    let (old_month, new_month) = provider.month_pair()?;
    SubstitutionSpec::new(old_month, new_month, None)?;

    let years = provider.year_pair()?;
    SubstitutionSpec::new(old_month, new_month, years)
}

/// Values given as command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ArgsInput {
    pub from_month: Option<u8>,
    pub to_month: Option<u8>,
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
}

impl ArgsInput {
    pub fn has_months(&self) -> bool {
        self.from_month.is_some() && self.to_month.is_some()
    }

    /// No substitution flag was given at all.
    pub fn is_empty(&self) -> bool {
        self.from_month.is_none()
            && self.to_month.is_none()
            && self.from_year.is_none()
            && self.to_year.is_none()
    }
}

impl InputProvider for ArgsInput {
    fn month_pair(&mut self) -> Result<(u8, u8)> {
        let old = require(self.from_month, "from_month")?;
        let new = require(self.to_month, "to_month")?;
        Ok((old, new))
    }

    fn year_pair(&mut self) -> Result<Option<(i32, i32)>> {
        require_pair(self.from_year, self.to_year, "from_year", "to_year")
    }
}

/// Interactive console session. `prompt` prints a message and returns the
/// line the user typed.
pub struct PromptInput<F>
where
    F: FnMut(&str) -> Result<String>,
{
    prompt: F,
}

impl<F> PromptInput<F>
where
    F: FnMut(&str) -> Result<String>,
{
    pub fn new(prompt: F) -> Self {
        Self { prompt }
    }
}

impl<F> InputProvider for PromptInput<F>
where
    F: FnMut(&str) -> Result<String>,
{
    fn month_pair(&mut self) -> Result<(u8, u8)> {
        let old = parse_month("from_month", &(self.prompt)("Month to replace (1-12): ")?)?;
        let new = parse_month("to_month", &(self.prompt)("New month (1-12): ")?)?;
        Ok((old, new))
    }

    fn year_pair(&mut self) -> Result<Option<(i32, i32)>> {
        let answer = (self.prompt)("Replace the year too? (y/n): ")?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            return Ok(None);
        }

        let old = parse_year("from_year", &(self.prompt)("Year to replace: ")?)?;
        let new = parse_year("to_year", &(self.prompt)("New year: ")?)?;
        Ok(Some((old, new)))
    }
}
