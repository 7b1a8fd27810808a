//! Director task polling
//!
//! Listing the instances of a deployment is asynchronous on the director: the
//! listing request answers `302 Found` with the location of a task, the task is
//! polled until its state is `done`, and the task output holds one JSON object
//! per line.

use std::future::Future;
use std::time::Duration;

use reqwest::{header, StatusCode};
use tracing::{debug, info};

use crate::errors::InventoryError;
use crate::http::client::HttpClient;
use crate::models::deployment::Deployment;
use crate::models::instance::Instance;
use crate::models::task::{Enumeration, TaskStatus};

/// Poller options
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between two task status checks
    pub interval: Duration,

    /// Number of delays allowed before the task is given up
    pub timeout_ticks: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout_ticks: 60,
        }
    }
}

/// Request that answered with an unexpected status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    Submit,
    Poll,
    Output,
}

impl std::fmt::Display for TaskStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStage::Submit => f.write_str("submit"),
            TaskStage::Poll => f.write_str("poll"),
            TaskStage::Output => f.write_str("output"),
        }
    }
}

/// Result of resolving the instances of one deployment.
///
/// Every variant but `Completed` means "no instances" to the inventory; the
/// variants only exist so the reason can be logged.
#[derive(Debug)]
pub enum TaskOutcome {
    Completed(Vec<Instance>),

    /// The director did not create a task
    NoTask { status: StatusCode },

    BadStatus { stage: TaskStage, status: StatusCode },

    /// The task was still running when the budget ran out
    TimedOut { task_url: String, last_state: String },

    /// The task status document could not be read
    MalformedState { task_url: String, reason: String },

    /// The director could not be reached mid-protocol
    Unreachable { stage: TaskStage, reason: String },
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    /// Collapse every failure into an empty listing
    pub fn into_instances(self) -> Vec<Instance> {
        match self {
            TaskOutcome::Completed(instances) => instances,
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskOutcome::Completed(instances) => write!(f, "{} instances", instances.len()),
            TaskOutcome::NoTask { status } => write!(f, "no task created ({})", status),
            TaskOutcome::BadStatus { stage, status } => {
                write!(f, "unexpected status {} on task {}", status, stage)
            }
            TaskOutcome::TimedOut { task_url, last_state } => {
                write!(f, "task {} timed out in state '{}'", task_url, last_state)
            }
            TaskOutcome::MalformedState { task_url, reason } => {
                write!(f, "unreadable status for task {}: {}", task_url, reason)
            }
            TaskOutcome::Unreachable { stage, reason } => {
                write!(f, "director unreachable on task {}: {}", stage, reason)
            }
        }
    }
}

/// Decode a task result stream, one JSON object per line.
///
/// Trailing newlines end the stream. Any line before them that is not a JSON
/// object, a blank one included, fails the whole stream.
pub fn decode_result_stream(body: &str) -> Result<Vec<Instance>, InventoryError> {
    body.trim_end_matches(['\r', '\n'])
        .lines()
        .enumerate()
        .map(|(n, line)| {
            serde_json::from_str(line)
                .map_err(|source| InventoryError::DecodeError { line: n + 1, source })
        })
        .collect()
}

impl HttpClient {
    /// Resolve the instances of a deployment through a director task.
    ///
    /// Only a malformed result stream is an error; every other failure is
    /// reported as a [`TaskOutcome`] variant.
    pub async fn resolve_instances<S, F>(
        &self,
        deployment: &Deployment,
        enumeration: Enumeration,
        options: &PollOptions,
        sleep_fn: S,
    ) -> Result<TaskOutcome, InventoryError>
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let path = format!("/deployments/{}/{}", deployment.name, enumeration.endpoint());
        let submit_url = self.url(&path);

        let response = match self.get(&submit_url, &[("format", "full")]).await {
            Ok(response) => response,
            Err(e) => return Ok(unreachable_at(TaskStage::Submit, e)),
        };
        if response.status() != StatusCode::FOUND {
            return Ok(TaskOutcome::NoTask {
                status: response.status(),
            });
        }

        let Some(location) = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
        else {
            return Ok(TaskOutcome::MalformedState {
                task_url: submit_url,
                reason: "redirect without Location header".to_string(),
            });
        };
        let task_url = match self.resolve_location(location) {
            Ok(url) => url,
            Err(e) => {
                return Ok(TaskOutcome::MalformedState {
                    task_url: location.to_string(),
                    reason: format!("invalid Location header: {}", e),
                })
            }
        };
        info!("Deployment {}: waiting for task {}", deployment.name, task_url);

        if let Some(outcome) = self.await_task(&task_url, options, sleep_fn).await {
            return Ok(outcome);
        }

        self.fetch_result(&task_url).await
    }

    /// Poll the task until it is done.
    ///
    /// Returns `None` once the task is done, or the outcome that ended polling.
    async fn await_task<S, F>(
        &self,
        task_url: &str,
        options: &PollOptions,
        sleep_fn: S,
    ) -> Option<TaskOutcome>
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let mut remaining = options.timeout_ticks;

        loop {
            let response = match self.get(task_url, &[]).await {
                Ok(response) => response,
                Err(e) => return Some(unreachable_at(TaskStage::Poll, e)),
            };
            if response.status() != StatusCode::OK {
                return Some(TaskOutcome::BadStatus {
                    stage: TaskStage::Poll,
                    status: response.status(),
                });
            }

            let status: TaskStatus = match response.json().await {
                Ok(status) => status,
                Err(e) => {
                    return Some(TaskOutcome::MalformedState {
                        task_url: task_url.to_string(),
                        reason: e.to_string(),
                    })
                }
            };

            if status.is_done() {
                return None;
            }
            if remaining == 0 {
                return Some(TaskOutcome::TimedOut {
                    task_url: task_url.to_string(),
                    last_state: status.state,
                });
            }

            debug!("Task {} is {}, {} checks left", task_url, status.state, remaining);
            remaining -= 1;
            sleep_fn(options.interval).await;
        }
    }

    async fn fetch_result(&self, task_url: &str) -> Result<TaskOutcome, InventoryError> {
        let output_url = format!("{}/output", task_url);

        let response = match self.get_plain(&output_url, &[("type", "result")]).await {
            Ok(response) => response,
            Err(e) => return Ok(unreachable_at(TaskStage::Output, e)),
        };
        if response.status() != StatusCode::OK {
            return Ok(TaskOutcome::BadStatus {
                stage: TaskStage::Output,
                status: response.status(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Ok(unreachable_at(TaskStage::Output, e.into())),
        };

        let instances = decode_result_stream(&body)?;
        Ok(TaskOutcome::Completed(instances))
    }
}

fn unreachable_at(stage: TaskStage, err: InventoryError) -> TaskOutcome {
    TaskOutcome::Unreachable {
        stage,
        reason: err.to_string(),
    }
}
