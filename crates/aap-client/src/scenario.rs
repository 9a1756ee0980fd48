//! The smoke scenarios: create-then-query, and the point-in-time walk over
//! a long answer history.

use std::env;
use std::thread;
use std::time::Duration;

use rand::Rng;
use serde_json::Value;
use uuid::Uuid;

use aap_core::models::user::User;

use crate::client::AapClient;
use crate::error::ClientError;

const ANSWER_KEY: &str = "test_addition";

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    /// Answer updates between creation and the captured timestamp.
    pub loop_count: u32,
    pub min_think: Duration,
    pub max_think: Duration,
    /// Pause after capturing the timestamp, so later events are strictly after it.
    pub pit_gap: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            loop_count: 48,
            min_think: Duration::from_secs(1),
            max_think: Duration::from_secs(5),
            pit_gap: Duration::from_secs(5),
        }
    }
}

impl ScenarioConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Unparseable values fall back to the defaults, as does a zero
    /// `LOOP_COUNT`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let seconds = |name: &str, default: Duration| {
            lookup(name)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|s| s.is_finite() && *s >= 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(default)
        };
        let min_think = seconds("MIN_THINK_TIME", defaults.min_think);
        let max_think = seconds("MAX_THINK_TIME", defaults.max_think).max(min_think);
        Self {
            loop_count: lookup("LOOP_COUNT")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.loop_count),
            min_think,
            max_think,
            pit_gap: seconds("PIT_GAP_SECONDS", defaults.pit_gap),
        }
    }

    /// No pauses at all; for tests against a local service.
    pub fn fast(loop_count: u32) -> Self {
        Self {
            loop_count,
            min_think: Duration::ZERO,
            max_think: Duration::ZERO,
            pit_gap: Duration::ZERO,
        }
    }

    fn think(&self) {
        let pause = if self.max_think > self.min_think {
            rand::thread_rng().gen_range(self.min_think..=self.max_think)
        } else {
            self.min_think
        };
        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: String,
    pub passed: bool,
}

/// Named pass/fail checks collected over one scenario run.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub checks: Vec<Check>,
}

impl CheckReport {
    pub fn check(&mut self, name: impl Into<String>, passed: bool) -> bool {
        let name = name.into();
        if passed {
            tracing::debug!(check = %name, "check passed");
        } else {
            tracing::warn!(check = %name, "check failed");
        }
        self.checks.push(Check { name, passed });
        passed
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn merge(&mut self, other: CheckReport) {
        self.checks.extend(other.checks);
    }
}

pub fn test_user() -> User {
    User::new("test-user", "Test User")
}

fn answer(result: &Value) -> Option<&str> {
    result["answers"][ANSWER_KEY]
        .as_array()
        .and_then(|values| values.first())
        .and_then(Value::as_str)
}

fn is_uuid(value: &Value) -> bool {
    value.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok())
}

/// Create an assessment, then query it with a timestamp taken before the
/// create was sent.
pub fn create_and_query(client: &AapClient) -> Result<CheckReport, ClientError> {
    let mut report = CheckReport::default();
    let user = test_user();
    let time_stamp = AapClient::timestamp_now();

    let created = client.create_assessment("1.0", &user)?;
    let request = &created.request;
    let result = &created.result;
    report.check("request.type is correct", request["type"] == "CreateAssessmentCommand");
    report.check("user.id exists", request["user"]["id"].is_string());
    report.check("properties exists (even {})", request["properties"].is_object());
    report.check("result.type correct", result.result_type == "CreateAssessmentCommandResult");
    report.check("success is true", result.success);

    let Some(assessment_uuid) = result.assessment_uuid else {
        report.check("assessmentUuid exists", false);
        return Ok(report);
    };
    report.check(
        "message contains assessmentUuid",
        result.message.contains(&assessment_uuid.to_string()),
    );

    let queried = client.assessment_version(assessment_uuid, Some(&time_stamp), &user)?;
    let result = serde_json::to_value(&queried.result)?;
    report.check("query result type", result["type"] == "AssessmentVersionQueryResult");
    report.check("has assessmentUuid", is_uuid(&result["assessmentUuid"]));
    report.check("has aggregateUuid", is_uuid(&result["aggregateUuid"]));
    report.check(
        "createdAt looks like a timestamp",
        result["createdAt"]
            .as_str()
            .is_some_and(|s| s.len() >= 19 && s.as_bytes()[10] == b'T'),
    );
    report.check("collections is an array", result["collections"].is_array());
    report.check("collaborators is an array", result["collaborators"].is_array());
    Ok(report)
}

/// Build a long answer history, capture the server time of one state, and
/// check that a point-in-time query at that time restores exactly it.
pub fn point_in_time(
    client: &AapClient,
    config: &ScenarioConfig,
) -> Result<CheckReport, ClientError> {
    // Event 1 is the creation; updates are events 2..=loop_count+1, and two
    // more follow the captured one.
    if config.loop_count == 0 || config.loop_count.checked_add(3).is_none() {
        return Err(ClientError::Config(format!(
            "loop count must be between 1 and {}, got {}",
            u32::MAX - 3,
            config.loop_count
        )));
    }
    let captured_event = config.loop_count + 1;

    let mut report = CheckReport::default();
    let user = test_user();

    let created = client.create_assessment("1.0", &user)?;
    let Some(assessment_uuid) = created.result.assessment_uuid else {
        report.check("create returned assessmentUuid", false);
        return Ok(report);
    };

    for event in 2..=captured_event {
        let response =
            client.update_answer(assessment_uuid, ANSWER_KEY, &format!("Loop Iteration {event}"), &user)?;
        if !response.result.success {
            report.check(format!("update {event} succeeded"), false);
        }
        config.think();
    }

    let latest = |report: &mut CheckReport, event: u32| -> Result<Value, ClientError> {
        let response = client.assessment_version(assessment_uuid, None, &user)?;
        let result = serde_json::to_value(&response.result)?;
        let expected = format!("Loop Iteration {event}");
        report.check(
            format!("aggregate {event} has the right update"),
            answer(&result) == Some(expected.as_str()),
        );
        Ok(result)
    };

    let captured = latest(&mut report, captured_event)?;
    let Some(time_stamp) = captured["updatedAt"].as_str().map(str::to_string) else {
        report.check("captured server timestamp", false);
        return Ok(report);
    };
    tracing::info!(%time_stamp, event = captured_event, "captured server timestamp");
    if !config.pit_gap.is_zero() {
        thread::sleep(config.pit_gap);
    }

    let mut later = Vec::new();
    for event in captured_event + 1..=captured_event + 2 {
        client.update_answer(assessment_uuid, ANSWER_KEY, &format!("Loop Iteration {event}"), &user)?;
        later.push(latest(&mut report, event)?["aggregateUuid"].clone());
    }
    report.check(
        "aggregate UUID changed on every later event",
        later[0] != later[1] && later[0] != captured["aggregateUuid"],
    );

    let pit = client.assessment_version(assessment_uuid, Some(&time_stamp), &user)?;
    let pit = serde_json::to_value(&pit.result)?;
    report.check("PIT query returned a version", pit["type"] == "AssessmentVersionQueryResult");
    report.check("PIT aggregate UUID exists", is_uuid(&pit["aggregateUuid"]));
    report.check(
        "PIT answer is the captured one",
        answer(&pit) == answer(&captured),
    );
    report.check(
        "PIT aggregate matches the captured state",
        pit["aggregateUuid"] == captured["aggregateUuid"],
    );
    for (offset, aggregate) in later.iter().enumerate() {
        report.check(
            format!("PIT aggregate differs from event {}", captured_event + 1 + offset as u32),
            pit["aggregateUuid"] != *aggregate,
        );
    }

    let again = client.assessment_version(assessment_uuid, Some(&time_stamp), &user)?;
    let again = serde_json::to_value(&again.result)?;
    report.check(
        "repeated PIT query is identical",
        again["aggregateUuid"] == pit["aggregateUuid"] && again["answers"] == pit["answers"],
    );

    Ok(report)
}
