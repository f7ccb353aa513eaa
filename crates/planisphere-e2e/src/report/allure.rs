// Allure 2 result writer
//
// One `AllureReport` per test case. Calling `write` produces
// `<uuid>-result.json` plus one `<uuid>-attachment.<ext>` file per
// attachment in the results directory, which `allure generate` reads.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use super::{ContentType, ReportSink, Status};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize)]
struct Label {
    name: String,
    value: String,
}

#[derive(Debug, Clone, Serialize)]
struct Link {
    name: String,
    url: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Serialize)]
struct Parameter {
    name: String,
    value: String,
}

#[derive(Debug, Clone, Serialize)]
struct Attachment {
    name: String,
    source: String,
    #[serde(rename = "type")]
    mime: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepResult {
    name: String,
    status: Option<Status>,
    stage: &'static str,
    start: i64,
    stop: Option<i64>,
    steps: Vec<StepResult>,
    attachments: Vec<Attachment>,
    parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestResult {
    uuid: String,
    history_id: String,
    name: String,
    full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    status: Option<Status>,
    status_details: StatusDetails,
    stage: &'static str,
    start: i64,
    stop: Option<i64>,
    labels: Vec<Label>,
    links: Vec<Link>,
    parameters: Vec<Parameter>,
    attachments: Vec<Attachment>,
    steps: Vec<StepResult>,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Collects one case's report data and writes it as Allure results.
#[derive(Debug)]
pub struct AllureReport {
    results_dir: PathBuf,
    result: TestResult,
    // Open steps, outermost first
    open_steps: Vec<StepResult>,
    pending_files: Vec<(String, Vec<u8>)>,
}

impl AllureReport {
    pub fn new(results_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            results_dir: results_dir.into(),
            result: TestResult {
                uuid: Uuid::new_v4().to_string(),
                history_id: name.clone(),
                full_name: name.clone(),
                name,
                description: None,
                status: None,
                status_details: StatusDetails::default(),
                stage: "running",
                start: now_millis(),
                stop: None,
                labels: Vec::new(),
                links: Vec::new(),
                parameters: Vec::new(),
                attachments: Vec::new(),
                steps: Vec::new(),
            },
            open_steps: Vec::new(),
            pending_files: Vec::new(),
        }
    }

    /// Sets the `fullName` and history id, e.g. `login::VAL-101`.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        self.result.history_id = full_name.clone();
        self.result.full_name = full_name;
        self
    }

    pub fn uuid(&self) -> &str {
        &self.result.uuid
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Closes open steps and records the case outcome.
    pub fn finish<T>(&mut self, outcome: &Result<T>) {
        let status = Status::of(outcome);
        while !self.open_steps.is_empty() {
            self.finish_step(status);
        }
        if let Err(e) = outcome {
            self.result.status_details = StatusDetails {
                message: Some(e.to_string()),
                trace: Some(format!("{:?}", e)),
            };
        }
        self.result.status = Some(status);
        self.result.stage = "finished";
        self.result.stop = Some(now_millis());
    }

    /// Writes the result JSON and attachment files; returns the result path.
    pub async fn write(&self) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.results_dir).await?;

        for (file_name, body) in &self.pending_files {
            tokio::fs::write(self.results_dir.join(file_name), body).await?;
        }

        let path = self
            .results_dir
            .join(format!("{}-result.json", self.result.uuid));
        let json = serde_json::to_vec_pretty(&self.result)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| Error::from(e).context(format!("writing {}", path.display())))?;

        tracing::debug!(path = %path.display(), status = ?self.result.status, "Wrote Allure result");
        Ok(path)
    }

    fn current_attachments(&mut self) -> &mut Vec<Attachment> {
        match self.open_steps.last_mut() {
            Some(step) => &mut step.attachments,
            None => &mut self.result.attachments,
        }
    }
}

impl ReportSink for AllureReport {
    fn start_step(&mut self, name: &str) {
        self.open_steps.push(StepResult {
            name: name.to_string(),
            status: None,
            stage: "running",
            start: now_millis(),
            stop: None,
            steps: Vec::new(),
            attachments: Vec::new(),
            parameters: Vec::new(),
        });
    }

    fn finish_step(&mut self, status: Status) {
        let Some(mut step) = self.open_steps.pop() else {
            tracing::warn!("finish_step called with no open step");
            return;
        };
        step.status = Some(status);
        step.stage = "finished";
        step.stop = Some(now_millis());
        match self.open_steps.last_mut() {
            Some(parent) => parent.steps.push(step),
            None => self.result.steps.push(step),
        }
    }

    fn parameter(&mut self, name: &str, value: &str) {
        self.result.parameters.push(Parameter {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn attach(&mut self, name: &str, content_type: ContentType, body: &[u8]) {
        let source = format!(
            "{}-attachment.{}",
            Uuid::new_v4(),
            content_type.extension()
        );
        self.pending_files.push((source.clone(), body.to_vec()));
        self.current_attachments().push(Attachment {
            name: name.to_string(),
            source,
            mime: content_type.mime().to_string(),
        });
    }

    fn label(&mut self, name: &str, value: &str) {
        self.result.labels.push(Label {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn link(&mut self, name: &str, url: &str, kind: &str) {
        self.result.links.push(Link {
            name: name.to_string(),
            url: url.to_string(),
            kind: kind.to_string(),
        });
    }

    fn description(&mut self, text: &str) {
        self.result.description = Some(text.to_string());
    }
}
