use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use ureq::Agent;
use uuid::Uuid;

use aap_core::models::command::{CommandBatch, CommandBatchResponse, CommandResponse};
use aap_core::models::query::{QueryBatch, QueryBatchResponse, QueryResponse};
use aap_core::models::user::User;
use aap_core::time::ServerTimestamp;

use crate::error::ClientError;

/// Blocking client for one AAP deployment.
pub struct AapClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl AapClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(30)))
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        let mut response = self.agent.get(&url).call()?;
        if response.status().as_u16() != 200 {
            return Ok(false);
        }
        let body: Value = serde_json::from_str(&response.body_mut().read_to_string()?)?;
        Ok(body["status"] == "UP")
    }

    /// `POST /command` with raw command objects.
    pub fn commands(&self, commands: Vec<Value>) -> Result<CommandBatchResponse, ClientError> {
        self.post("/command", &CommandBatch { commands })
    }

    /// `POST /query` with raw query objects.
    pub fn queries(&self, queries: Vec<Value>) -> Result<QueryBatchResponse, ClientError> {
        self.post("/query", &QueryBatch { queries })
    }

    pub fn command(&self, command: Value) -> Result<CommandResponse, ClientError> {
        self.commands(vec![command])?
            .commands
            .pop()
            .ok_or_else(|| ClientError::Unexpected("empty commands array".to_string()))
    }

    pub fn query(&self, query: Value) -> Result<QueryResponse, ClientError> {
        self.queries(vec![query])?
            .queries
            .pop()
            .ok_or_else(|| ClientError::Unexpected("empty queries array".to_string()))
    }

    pub fn create_assessment(
        &self,
        form_version: &str,
        user: &User,
    ) -> Result<CommandResponse, ClientError> {
        self.command(json!({
            "type": "CreateAssessmentCommand",
            "formVersion": form_version,
            "user": user,
        }))
    }

    /// Set one answer key to a single value.
    pub fn update_answer(
        &self,
        assessment_uuid: Uuid,
        key: &str,
        value: &str,
        user: &User,
    ) -> Result<CommandResponse, ClientError> {
        let mut added = serde_json::Map::new();
        added.insert(key.to_string(), json!([value]));
        self.command(json!({
            "type": "UpdateAssessmentAnswersCommand",
            "assessmentUuid": assessment_uuid,
            "added": added,
            "removed": [],
            "user": user,
        }))
    }

    /// `AssessmentVersionQuery`, latest state when `time_stamp` is `None`.
    pub fn assessment_version(
        &self,
        assessment_uuid: Uuid,
        time_stamp: Option<&str>,
        user: &User,
    ) -> Result<QueryResponse, ClientError> {
        let mut query = json!({
            "type": "AssessmentVersionQuery",
            "user": user,
            "assessmentUuid": assessment_uuid,
        });
        if let Some(time_stamp) = time_stamp {
            query["timeStamp"] = json!(time_stamp);
        }
        self.query(query)
    }

    /// The current time in the service's timestamp format.
    pub fn timestamp_now() -> String {
        ServerTimestamp::now().to_string()
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let payload = serde_json::to_vec(body)?;

        let mut request = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }
        let mut response = request.send(&payload[..])?;

        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string()?;
        if status != 200 {
            tracing::warn!(path, status, "non-200 response");
            return Err(ClientError::Status {
                path: path.to_string(),
                status,
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}
