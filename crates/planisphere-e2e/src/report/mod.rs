// Test reporting
//
// Flows and page checks write steps, parameters and attachments to a
// `ReportSink`; nothing in the suite reads them back. `AllureReport` writes
// Allure 2 result files, `MemoryReport` keeps events in memory.

use std::fmt;
use std::future::Future;

use serde::Serialize;

use crate::error::{Error, Result};

pub mod allure;

pub use allure::AllureReport;

/// Allure severity levels.
///
/// Allure has no `high` or `medium`; cases rated that way run as `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocker,
    Critical,
    Normal,
    Minor,
    Trivial,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocker => "blocker",
            Severity::Critical => "critical",
            Severity::Normal => "normal",
            Severity::Minor => "minor",
            Severity::Trivial => "trivial",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a step or a whole case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    /// An assertion did not hold
    Failed,
    /// Anything else went wrong
    Broken,
    Skipped,
}

impl Status {
    /// Assertion failures are `Failed`; every other error is `Broken`.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Passed,
            Err(e) if is_assertion(e) => Status::Failed,
            Err(_) => Status::Broken,
        }
    }
}

fn is_assertion(error: &Error) -> bool {
    match error {
        Error::Assertion { .. } | Error::ThresholdExceeded { .. } => true,
        Error::Context(_, inner) => is_assertion(inner),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Png,
    Json,
    Text,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Png => "image/png",
            ContentType::Json => "application/json",
            ContentType::Text => "text/plain",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::Png => "png",
            ContentType::Json => "json",
            ContentType::Text => "txt",
        }
    }
}

/// Write-only sink for per-case report data.
pub trait ReportSink: Send {
    fn start_step(&mut self, name: &str);

    /// Closes the innermost open step.
    fn finish_step(&mut self, status: Status);

    fn parameter(&mut self, name: &str, value: &str);

    /// Attaches to the innermost open step, or to the case.
    fn attach(&mut self, name: &str, content_type: ContentType, body: &[u8]);

    fn label(&mut self, name: &str, value: &str);

    fn link(&mut self, name: &str, url: &str, kind: &str);

    fn description(&mut self, text: &str);

    fn epic(&mut self, epic: &str) {
        self.label("epic", epic);
    }

    fn feature(&mut self, feature: &str) {
        self.label("feature", feature);
    }

    fn story(&mut self, story: &str) {
        self.label("story", story);
    }

    fn severity(&mut self, severity: Severity) {
        self.label("severity", severity.as_str());
    }

    fn tag(&mut self, tag: &str) {
        self.label("tag", tag);
    }

    fn owner(&mut self, owner: &str) {
        self.label("owner", owner);
    }

    fn issue(&mut self, id: &str) {
        self.link(id, id, "issue");
    }

    /// Records a step that has no body of its own.
    fn step(&mut self, name: &str) {
        self.start_step(name);
        self.finish_step(Status::Passed);
    }
}

/// Runs `body` as a named step and records its outcome.
pub async fn run_step<T, F>(report: &mut dyn ReportSink, name: &str, body: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    report.start_step(name);
    let result = body.await;
    report.finish_step(Status::of(&result));
    result
}

/// Metadata of one test case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseMeta {
    pub epic: Option<String>,
    pub feature: Option<String>,
    pub story: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub tags: Vec<String>,
    pub owner: Option<String>,
    pub issue: Option<String>,
}

impl CaseMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epic(mut self, epic: impl Into<String>) -> Self {
        self.epic = Some(epic.into());
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn story(mut self, story: impl Into<String>) -> Self {
        self.story = Some(story.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn issue(mut self, issue: impl Into<String>) -> Self {
        self.issue = Some(issue.into());
        self
    }

    pub fn apply(&self, sink: &mut dyn ReportSink) {
        if let Some(epic) = &self.epic {
            sink.epic(epic);
        }
        if let Some(feature) = &self.feature {
            sink.feature(feature);
        }
        if let Some(story) = &self.story {
            sink.story(story);
        }
        if let Some(description) = &self.description {
            sink.description(description);
        }
        if let Some(severity) = self.severity {
            sink.severity(severity);
        }
        for tag in &self.tags {
            sink.tag(tag);
        }
        if let Some(owner) = &self.owner {
            sink.owner(owner);
        }
        if let Some(issue) = &self.issue {
            sink.issue(issue);
        }
    }
}

/// One call made on a [`MemoryReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    StepStarted(String),
    StepFinished(Status),
    Parameter(String, String),
    Attachment {
        name: String,
        content_type: ContentType,
        size: usize,
    },
    Label(String, String),
    Link(String, String, String),
    Description(String),
}

/// Sink that keeps every event, for callers that inspect the run directly.
#[derive(Debug, Default)]
pub struct MemoryReport {
    pub events: Vec<ReportEvent>,
}

impl MemoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of started steps, in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ReportEvent::StepStarted(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn parameter_value(&self, name: &str) -> Option<&str> {
        self.events.iter().find_map(|event| match event {
            ReportEvent::Parameter(key, value) if key == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn attachment_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Attachment { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn labels(&self, name: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Label(key, value) if key == name => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl ReportSink for MemoryReport {
    fn start_step(&mut self, name: &str) {
        self.events.push(ReportEvent::StepStarted(name.to_string()));
    }

    fn finish_step(&mut self, status: Status) {
        self.events.push(ReportEvent::StepFinished(status));
    }

    fn parameter(&mut self, name: &str, value: &str) {
        self.events
            .push(ReportEvent::Parameter(name.to_string(), value.to_string()));
    }

    fn attach(&mut self, name: &str, content_type: ContentType, body: &[u8]) {
        self.events.push(ReportEvent::Attachment {
            name: name.to_string(),
            content_type,
            size: body.len(),
        });
    }

    fn label(&mut self, name: &str, value: &str) {
        self.events
            .push(ReportEvent::Label(name.to_string(), value.to_string()));
    }

    fn link(&mut self, name: &str, url: &str, kind: &str) {
        self.events.push(ReportEvent::Link(
            name.to_string(),
            url.to_string(),
            kind.to_string(),
        ));
    }

    fn description(&mut self, text: &str) {
        self.events.push(ReportEvent::Description(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_meta_applies_every_label() {
        let meta = CaseMeta::new()
            .epic("基本UI")
            .feature("トップページ")
            .severity(Severity::Critical)
            .tags(["smoke", "ui"])
            .owner("qa")
            .issue("VAL-101");
        let mut report = MemoryReport::new();
        meta.apply(&mut report);

        assert_eq!(report.labels("epic"), vec!["基本UI"]);
        assert_eq!(report.labels("severity"), vec!["critical"]);
        assert_eq!(report.labels("tag"), vec!["smoke", "ui"]);
        assert!(report.events.contains(&ReportEvent::Link(
            "VAL-101".into(),
            "VAL-101".into(),
            "issue".into()
        )));
    }

    #[tokio::test]
    async fn test_run_step_records_status_from_result() {
        let mut report = MemoryReport::new();
        run_step(&mut report, "ok", async { Ok(()) }).await.unwrap();
        let _ = run_step::<(), _>(&mut report, "assert", async {
            Err(Error::assertion("x", "a", "b"))
        })
        .await;
        let _ = run_step::<(), _>(&mut report, "broken", async {
            Err(Error::Timeout("t".into()))
        })
        .await;

        let statuses: Vec<_> = report
            .events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::StepFinished(status) => Some(*status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![Status::Passed, Status::Failed, Status::Broken]);
    }
}
