//! The single failure type surfaced by an HTTP exchange.

use crate::problem::{Problem, ProblemType};

/// Structured failure carrying one or more problems.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", summarize(.problems))]
pub struct ProblemsError {
    /// Problems in the order they were reported.
    pub problems: Vec<Problem>,
}

impl ProblemsError {
    pub fn new(problems: Vec<Problem>) -> Self {
        Self { problems }
    }

    /// Wrap a single problem.
    pub fn single(problem: Problem) -> Self {
        Self {
            problems: vec![problem],
        }
    }

    /// Transport failure.
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::single(Problem::connection(reason))
    }

    /// Body decoding failure.
    pub fn unmarshaling(reason: impl Into<String>) -> Self {
        Self::single(Problem::unmarshaling(reason))
    }

    /// Whether any contained problem has the given type.
    pub fn has(&self, kind: &ProblemType) -> bool {
        self.problems.iter().any(|problem| &problem.kind == kind)
    }

    /// Type of the first problem, if any.
    pub fn first_kind(&self) -> Option<&ProblemType> {
        self.problems.first().map(|problem| &problem.kind)
    }

    /// Field-scoped problems.
    pub fn field_problems(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(|problem| problem.is_field_error())
    }

    /// Problems that belong to the page-level error region.
    pub fn global_problems(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|problem| !problem.is_field_error())
    }
}

impl From<Problem> for ProblemsError {
    fn from(problem: Problem) -> Self {
        Self::single(problem)
    }
}

fn summarize(problems: &[Problem]) -> String {
    match problems {
        [] => "no problems reported".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}
