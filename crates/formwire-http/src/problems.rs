//! Translation of error responses into problems.

use crate::message::HttpResponse;
use formwire_protocol::{Problem, ProblemsError};
use log::debug;
use serde_json::Value;

/// Content type of a JSON array of problems.
pub const PROBLEMS_CONTENT_TYPE: &str = "application/problems+json";
/// Content type of a single problem.
pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Translate a non-2xx response into a structured failure.
///
/// The declared content type selects the decoding: a problem list, a single
/// problem (optionally wrapped as `{"problem": ...}`), or a synthesized
/// `GENERIC_PROBLEM` carrying the status and body text.
pub fn translate_error_response(response: &HttpResponse) -> ProblemsError {
    let content_type = response.content_type();
    debug!(
        "translating error response (status={}, content_type={})",
        response.status.as_u16(),
        content_type.as_deref().unwrap_or("none")
    );
    match content_type.as_deref() {
        Some(PROBLEMS_CONTENT_TYPE) => match response.json::<Vec<Problem>>() {
            Ok(problems) => ProblemsError::new(problems),
            Err(err) => err,
        },
        Some(PROBLEM_CONTENT_TYPE) => match response.json::<Value>() {
            Ok(value) => single_problem(value),
            Err(err) => err,
        },
        _ => ProblemsError::single(Problem::generic(
            response.status.as_u16(),
            response.status.canonical_reason().unwrap_or_default(),
            response.text(),
        )),
    }
}

fn single_problem(value: Value) -> ProblemsError {
    let value = match value {
        Value::Object(mut map) if map.contains_key("problem") => {
            map.remove("problem").unwrap_or(Value::Null)
        }
        other => other,
    };
    match serde_json::from_value::<Problem>(value) {
        Ok(problem) => ProblemsError::single(problem),
        Err(err) => ProblemsError::unmarshaling(format!("failed to decode problem: {err}")),
    }
}
