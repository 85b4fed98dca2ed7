//! Request and response types for the platform API.
//!
//! Remote objects keep every field the client does not model explicitly in a
//! flattened `extra` map, so nothing is lost when a record is handed back to
//! the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Runs
// ─────────────────────────────────────────────────────────────────────────────

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "SUCCEEDED")]
    Succeeded,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "TIMING-OUT", alias = "TIMING_OUT")]
    TimingOut,
    #[serde(rename = "TIMED-OUT", alias = "TIMED_OUT")]
    TimedOut,
    #[serde(rename = "ABORTING")]
    Aborting,
    #[serde(rename = "ABORTED")]
    Aborted,
}

impl RunStatus {
    /// Statuses from which no further transition occurs.
    pub const TERMINAL: [RunStatus; 4] = [
        RunStatus::Succeeded,
        RunStatus::Failed,
        RunStatus::TimedOut,
        RunStatus::Aborted,
    ];

    /// Returns true for a terminal status.
    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Ready => "READY",
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::TimingOut => "TIMING-OUT",
            RunStatus::TimedOut => "TIMED-OUT",
            RunStatus::Aborting => "ABORTING",
            RunStatus::Aborted => "ABORTED",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_uppercase()))
            .map_err(|_| format!("unknown run status '{}'", s))
    }
}

/// One execution of an actor or task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub act_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_task_id: Option<String>,
    pub status: RunStatus,
    /// Timestamps keep the remote text so they reach the host unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dataset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_key_value_store_id: Option<String>,
    /// Every other field of the remote record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Run {
    /// Actor or task this run belongs to.
    pub fn source(&self) -> RunSource {
        match &self.actor_task_id {
            Some(task_id) => RunSource::Task(task_id.clone()),
            None => RunSource::Actor(self.act_id.clone()),
        }
    }

    pub fn started_time(&self) -> Option<DateTime<Utc>> {
        self.started_at.as_deref().and_then(parse_timestamp)
    }

    pub fn finished_time(&self) -> Option<DateTime<Utc>> {
        self.finished_at.as_deref().and_then(parse_timestamp)
    }

    /// `finished_at` holds a valid timestamp exactly when the status is
    /// terminal.
    pub fn is_consistent(&self) -> bool {
        self.status.is_terminal() == self.finished_time().is_some()
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Whether a run was started from an actor directly or through a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunSource {
    Actor(String),
    Task(String),
}

impl RunSource {
    /// Actor source; `user/name` is normalised to `user~name`.
    pub fn actor(id: impl AsRef<str>) -> Self {
        RunSource::Actor(normalize_id(id.as_ref()))
    }

    /// Task source; `user/name` is normalised to `user~name`.
    pub fn task(id: impl AsRef<str>) -> Self {
        RunSource::Task(normalize_id(id.as_ref()))
    }

    pub fn id(&self) -> &str {
        match self {
            RunSource::Actor(id) | RunSource::Task(id) => id,
        }
    }

    /// API collection holding this source.
    pub fn collection(&self) -> &'static str {
        match self {
            RunSource::Actor(_) => "acts",
            RunSource::Task(_) => "actor-tasks",
        }
    }

    /// Path of the source's run collection.
    pub fn runs_path(&self) -> String {
        format!("{}/{}/runs", self.collection(), self.id())
    }

    /// Webhook condition matching runs of this source.
    pub fn condition(&self) -> WebhookCondition {
        match self {
            RunSource::Actor(id) => WebhookCondition::Actor {
                actor_id: id.clone(),
            },
            RunSource::Task(id) => WebhookCondition::Task {
                actor_task_id: id.clone(),
            },
        }
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().replace('/', "~")
}

/// Options for starting a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Build tag or number.
    pub build: Option<String>,
    /// Memory in megabytes.
    pub memory_mbytes: Option<u32>,
    /// Timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Seconds to wait for the run to finish before returning.
    pub wait_for_finish_secs: Option<u64>,
}

/// Filter for listing runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRunsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub desc: bool,
    pub status: Option<RunStatus>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

/// A page of a paginated list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedList<T> {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub desc: bool,
    pub items: Vec<T>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Storages
// ─────────────────────────────────────────────────────────────────────────────

/// A dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Actor whose run produced the dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueStore {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of dataset items, as returned by the items endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemsPage {
    pub items: Vec<Value>,
    /// Total item count reported by the pagination header.
    pub total: Option<u64>,
}

/// Query for dataset items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Projection flag name (`clean` or `simplified`) set to `true`.
    pub clean_param: Option<&'static str>,
}

/// Content type of a record stored without one, and of values written
/// without one.
pub const DEFAULT_RECORD_CONTENT_TYPE: &str = "application/json; charset=utf-8";

fn is_json_type(content_type: &str) -> bool {
    content_type.contains("json")
}

fn is_text_type(content_type: &str) -> bool {
    content_type.starts_with("text/")
}

/// Record metadata from a HEAD probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

impl RecordMetadata {
    /// Declared content type, or the default for untyped records.
    pub fn effective_content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_RECORD_CONTENT_TYPE)
    }

    /// Whether the record holds JSON.
    pub fn is_json(&self) -> bool {
        is_json_type(self.effective_content_type())
    }

    /// Whether the record holds text.
    pub fn is_text(&self) -> bool {
        is_text_type(self.effective_content_type())
    }
}

/// A record value fetched from a key-value store.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl Record {
    /// Declared content type, or the default for untyped records.
    pub fn effective_content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_RECORD_CONTENT_TYPE)
    }

    pub fn is_json(&self) -> bool {
        is_json_type(self.effective_content_type())
    }

    pub fn is_text(&self) -> bool {
        is_text_type(self.effective_content_type())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhooks
// ─────────────────────────────────────────────────────────────────────────────

/// Condition restricting which runs fire a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebhookCondition {
    Actor {
        #[serde(rename = "actorId")]
        actor_id: String,
    },
    Task {
        #[serde(rename = "actorTaskId")]
        actor_task_id: String,
    },
}

/// Request to register a webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookRequest {
    pub event_types: Vec<String>,
    pub condition: WebhookCondition,
    pub request_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// A registered webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    #[serde(default)]
    pub event_types: Vec<String>,
    pub condition: WebhookCondition,
    pub request_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Users, actors, tasks
// ─────────────────────────────────────────────────────────────────────────────

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Actor entry in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Task entry in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub act_name: Option<String>,
}
