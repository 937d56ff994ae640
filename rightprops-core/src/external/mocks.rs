// rightprops-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// This module is only compiled when the "test-mocks" feature is enabled.
#![cfg(feature = "test-mocks")]

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use super::{FfprobeExecutor, ProbeRequest};
use crate::error::{CoreError, CoreResult};

/// What a matched expectation does.
pub enum MockFfprobeResponse {
    /// Emits the given stdout, line by line.
    Output(String),
    /// Fails with the given error.
    Error(CoreError),
    /// Blocks until the run is cancelled.
    Hang,
}

/// Represents an expected ffprobe call and its scripted result.
pub struct MockFfprobeExpectation {
    pub arg_pattern: String,
    pub response: MockFfprobeResponse,
}

/// Scripted implementation of FfprobeExecutor.
///
/// Each call is matched against the registered expectations in insertion
/// order: the first one whose pattern occurs in the full command line
/// (arguments plus input path, space separated) is consumed. A call without
/// a matching expectation panics.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    expectations: Arc<Mutex<Vec<MockFfprobeExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(&self, arg_pattern: &str, response: MockFfprobeResponse) {
        self.expectations
            .lock()
            .unwrap()
            .push(MockFfprobeExpectation {
                arg_pattern: arg_pattern.to_string(),
                response,
            });
    }

    pub fn add_output_expectation(&self, arg_pattern: &str, stdout: &str) {
        self.add_expectation(arg_pattern, MockFfprobeResponse::Output(stdout.to_string()));
    }

    pub fn add_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, MockFfprobeResponse::Error(error));
    }

    pub fn add_hang_expectation(&self, arg_pattern: &str) {
        self.add_expectation(arg_pattern, MockFfprobeResponse::Hang);
    }

    /// Every call received so far, arguments first and input path last.
    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }

    pub fn remaining_expectations(&self) -> usize {
        self.expectations.lock().unwrap().len()
    }

    fn take_response(&self, args: &[String]) -> MockFfprobeResponse {
        let command_line = args.join(" ");
        let mut expectations = self.expectations.lock().unwrap();

        let found_index = expectations
            .iter()
            .position(|exp| command_line.contains(&exp.arg_pattern));

        match found_index {
            Some(index) => {
                let expectation = expectations.remove(index);
                log::info!(
                    "MockFfprobeExecutor: Matched expectation with pattern '{}'",
                    expectation.arg_pattern
                );
                expectation.response
            }
            None => {
                log::error!(
                    "MockFfprobeExecutor: No expectation found for command args: {:?}",
                    args
                );
                panic!(
                    "MockFfprobeExecutor: No expectation found for command args: {:?}",
                    args
                );
            }
        }
    }
}

#[async_trait]
impl FfprobeExecutor for MockFfprobeExecutor {
    async fn stream_lines(
        &self,
        request: &ProbeRequest,
        input: &Path,
        cancel: &CancellationToken,
        on_line: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> CoreResult<()> {
        let mut args = request.args();
        args.push(input.to_string_lossy().into_owned());
        self.received_calls.lock().unwrap().push(args.clone());

        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        match self.take_response(&args) {
            MockFfprobeResponse::Output(stdout) => {
                for line in stdout.lines() {
                    on_line(line);
                }
                Ok(())
            }
            MockFfprobeResponse::Error(err) => Err(err),
            MockFfprobeResponse::Hang => {
                cancel.cancelled().await;
                Err(CoreError::Cancelled)
            }
        }
    }
}
