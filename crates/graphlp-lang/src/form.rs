//! Problem construction from raw form fields.
//!
//! Objective coefficients that are blank or unreadable count as `0`.
//! A constraint row with any blank or unreadable number is skipped
//! entirely, and its position is reported back to the caller. Relation tags
//! are read leniently, so an unknown tag yields a constraint that no point
//! satisfies.

use graphlp_solver::{Direction, LpProblem, Objective, ParseDirectionError, Relation};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error(transparent)]
    UnknownDirection(#[from] ParseDirectionError),
}

/// One constraint row as typed into the form
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormRow {
    pub c1: String,
    pub c2: String,
    pub relation: String,
    pub rhs: String,
}

impl FormRow {
    pub fn new(
        c1: impl Into<String>,
        c2: impl Into<String>,
        relation: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        Self {
            c1: c1.into(),
            c2: c2.into(),
            relation: relation.into(),
            rhs: rhs.into(),
        }
    }

    /// `c1,c2,relation,rhs`; missing trailing fields are left blank
    pub fn from_csv(line: &str) -> Self {
        let mut fields = line.split(',').map(str::trim);
        let mut next = || fields.next().unwrap_or_default().to_string();
        Self {
            c1: next(),
            c2: next(),
            relation: next(),
            rhs: next(),
        }
    }
}

/// A problem built from form input, with the rows that were left out
#[derive(Debug, Clone, PartialEq)]
pub struct FormProblem {
    pub problem: LpProblem,
    /// 1-based positions of skipped rows
    pub skipped_rows: Vec<usize>,
}

/// Read the longest numeric prefix of `s`, ignoring leading whitespace.
///
/// `"12abc"` reads as `12`, `"abc"` and `""` read as nothing.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse::<f64>().ok();
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Build a problem from the objective fields and constraint rows.
///
/// Rows are named `R1`, `R2`, ... by their position in `rows`.
pub fn build_problem(
    c1: &str,
    c2: &str,
    direction: &str,
    rows: &[FormRow],
) -> Result<FormProblem, FormError> {
    let direction: Direction = direction.parse()?;
    let objective = Objective::new(
        parse_leading_float(c1).unwrap_or(0.0),
        parse_leading_float(c2).unwrap_or(0.0),
        direction,
    );
    let mut problem = LpProblem::new(objective);
    let mut skipped_rows = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let numbers = (
            parse_leading_float(&row.c1),
            parse_leading_float(&row.c2),
            parse_leading_float(&row.rhs),
        );
        match numbers {
            (Some(a), Some(b), Some(rhs)) => {
                let relation = Relation::from_tag(&row.relation);
                problem.add_constraint(format!("R{}", i + 1), a, b, relation, rhs);
            }
            _ => {
                debug!(row = i + 1, "skipping incomplete constraint row");
                skipped_rows.push(i + 1);
            }
        }
    }

    Ok(FormProblem {
        problem,
        skipped_rows,
    })
}
