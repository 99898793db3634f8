//! Assertions over mutation responses
//!
//! Each helper returns a [`TestResult`] describing what was expected, so
//! failures print the offending response instead of a bare `assert!`.

use crate::{TestError, TestResult};
use cairn_mutation::{ItemPath, MutationResponse, ResponseError};
use serde_json::Value;

pub struct MutationAssertions;

impl MutationAssertions {
    /// Assert that the whole result of a single-item mutation is `null`
    pub fn assert_null_result(response: &MutationResponse) -> TestResult<()> {
        if !response.result().is_null() {
            return Err(failure("Expected a null result", response));
        }
        Ok(())
    }

    /// Assert that the batch result has `len` slots and exactly the slots in
    /// `null_slots` are `null`
    pub fn assert_batch_slots(response: &MutationResponse, len: usize, null_slots: &[usize]) -> TestResult<()> {
        let Value::Array(slots) = response.result() else {
            return Err(failure("Expected a batch result", response));
        };
        if slots.len() != len {
            return Err(failure(&format!("Expected {} slots, got {}", len, slots.len()), response));
        }
        for (index, slot) in slots.iter().enumerate() {
            let expect_null = null_slots.contains(&index);
            if slot.is_null() != expect_null {
                let expected = if expect_null { "null" } else { "non-null" };
                return Err(failure(&format!("Expected slot {} to be {}", index, expected), response));
            }
        }
        Ok(())
    }

    /// Assert that the response carries exactly one error, located at
    /// `<item_path>.<field_path>` with the rendered `Input error: ` message
    pub fn assert_single_relationship_error<'a>(
        response: &'a MutationResponse,
        item_path: &ItemPath,
        field_path: &str,
        message: &str,
    ) -> TestResult<&'a ResponseError> {
        let [error] = response.errors.as_slice() else {
            return Err(failure(
                &format!("Expected exactly one error, got {}", response.errors.len()),
                response,
            ));
        };

        let path = format!("{}.{}", item_path, field_path);
        if error.path != path {
            return Err(failure(&format!("Expected error at {}", path), response));
        }
        let rendered = format!("Input error: {}", message);
        if error.message != rendered {
            return Err(failure(&format!("Expected message {:?}", rendered), response));
        }
        Ok(error)
    }

    /// Assert that the response has no errors
    pub fn assert_no_errors(response: &MutationResponse) -> TestResult<()> {
        if response.has_errors() {
            return Err(failure("Expected no errors", response));
        }
        Ok(())
    }

    /// Assert the error codes in response order
    pub fn assert_error_codes(response: &MutationResponse, codes: &[&str]) -> TestResult<()> {
        let actual: Vec<&str> = response.errors.iter().map(|error| error.code.as_str()).collect();
        if actual != codes {
            return Err(failure(&format!("Expected error codes {:?}, got {:?}", codes, actual), response));
        }
        Ok(())
    }
}

fn failure(message: &str, response: &MutationResponse) -> TestError {
    TestError::Assertion {
        message: format!(
            "{}\nResponse: {}",
            message,
            serde_json::to_string_pretty(&response.to_json()).unwrap_or_default()
        ),
    }
}
