//! Long-running server tasks: status, polling and control.

use std::time::Duration;

use crate::params::Parameters;
use crate::types::{CallOutcome, TaskStatus};

use super::{Method, StoreClient};

/// How long [`wait_for_task`](StoreClient::wait_for_task) may keep polling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitLimit {
    /// Poll until the task finishes
    Forever,
    /// Give up once this much polling time has been used
    Within(Duration),
}

impl WaitLimit {
    /// Limit in whole seconds; `0` means no limit
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            WaitLimit::Forever
        } else {
            WaitLimit::Within(Duration::from_secs(secs))
        }
    }
}

impl From<Duration> for WaitLimit {
    fn from(duration: Duration) -> Self {
        WaitLimit::Within(duration)
    }
}

impl StoreClient {
    /// Fetch the current status of a task
    pub async fn task_status(&self, task_id: &str) -> CallOutcome<TaskStatus> {
        let params = Parameters::new().with("threadId", task_id);
        self.issue(
            "taskStatus",
            &params,
            Some(&self.config.url("thread")),
            Method::Get,
        )
        .await
        .decode()
    }

    /// Poll a task until it stops running or `limit` is used up
    ///
    /// Each check waits the server's advertised `refreshSeconds` (or the configured default)
    /// before the next one; the wait is a timer, so other work on the runtime proceeds.
    /// Polling stops without another check once the remaining budget no longer exceeds the next
    /// interval, and the last status is returned: a result with `running == true` means the
    /// limit was reached before the task finished. A failed status check ends polling with that
    /// outcome, and [`cancel_pending`](Self::cancel_pending) ends it with the error `cancelled`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use labbcat::{Config, StoreClient, WaitLimit};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = StoreClient::new(Config::new("https://labbcat.example.org/labbcat"))?;
    /// let outcome = client.wait_for_task("42", WaitLimit::from_secs(30)).await;
    /// if let Some(task) = outcome.result {
    ///     if task.running {
    ///         println!("still running after 30s: {}", task.status);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_for_task(&self, task_id: &str, limit: WaitLimit) -> CallOutcome<TaskStatus> {
        let mut remaining = match limit {
            WaitLimit::Forever => None,
            WaitLimit::Within(budget) => Some(budget),
        };
        let mut checks = 0u32;
        let cancel = self.cancellation_token();

        loop {
            let outcome = self.task_status(task_id).await;
            checks += 1;

            let Some(task) = &outcome.result else {
                tracing::debug!(task_id, checks, error = ?outcome.errors, "task status unavailable");
                return outcome;
            };
            if !task.running {
                tracing::debug!(task_id, checks, status = %task.status, "task finished");
                return outcome;
            }

            let interval = task.refresh_interval(self.config.tasks.default_refresh);
            if let Some(budget) = remaining {
                if budget <= interval {
                    tracing::debug!(
                        task_id,
                        checks,
                        percent_complete = task.percent_complete,
                        "stopped waiting for task before it finished"
                    );
                    return outcome;
                }
                remaining = Some(budget - interval);
            }

            tracing::trace!(task_id, interval_ms = interval.as_millis() as u64, "task still running");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(task_id, checks, "stopped waiting for task: cancelled");
                    return CallOutcome::failure("taskStatus", None, "cancelled");
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// List the server's tasks
    pub async fn get_tasks(&self) -> CallOutcome {
        self.issue(
            "getTasks",
            &Parameters::new(),
            Some(&self.config.url("threads")),
            Method::Get,
        )
        .await
    }

    /// Release a finished task's resources on the server
    pub async fn release_task(&self, task_id: &str) -> CallOutcome {
        self.task_command("releaseTask", task_id, "release").await
    }

    /// Ask the server to stop a running task
    pub async fn cancel_task(&self, task_id: &str) -> CallOutcome {
        self.task_command("cancelTask", task_id, "cancel").await
    }

    async fn task_command(&self, call: &str, task_id: &str, command: &str) -> CallOutcome {
        tracing::info!(task_id, command, "sending task command");
        let params = Parameters::new()
            .with("threadId", task_id)
            .with("command", command);
        self.issue(call, &params, Some(&self.config.url("threads")), Method::Get)
            .await
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seconds_means_forever() {
        assert_eq!(WaitLimit::from_secs(0), WaitLimit::Forever);
        assert_eq!(
            WaitLimit::from_secs(10),
            WaitLimit::Within(Duration::from_secs(10))
        );
        assert_eq!(
            WaitLimit::from(Duration::from_millis(1500)),
            WaitLimit::Within(Duration::from_millis(1500))
        );
    }
}
