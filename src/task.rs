use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type TaskId = Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Steps through `ALL`, wrapping at both ends.
    pub fn cycle(self, direction: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0) as isize;
        Self::ALL[(index + direction).rem_euclid(len) as usize]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored task record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: NaiveDate,
}

/// Body of a create or update request, before validation.
///
/// Every field is optional on the wire so that missing values are reported
/// as validation failures rather than as deserialization errors.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// A draft that passed validation. Optional fields stay optional so an
/// update can leave stored values untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: NaiveDate,
}

impl TaskFields {
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            due_date: self.due_date,
        }
    }

    pub fn apply_to(self, task: &mut Task) {
        task.title = self.title;
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        task.due_date = self.due_date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_serializes_with_camel_case_due_date() {
        let task = Task {
            id: Uuid::nil(),
            title: "Buy milk".to_string(),
            description: String::new(),
            status: TaskStatus::InProgress,
            due_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2099-01-01");
        assert_eq!(value["status"], "InProgress");
        assert_eq!(value["id"], Uuid::nil().to_string());
    }

    #[test]
    fn draft_rejects_unknown_status() {
        let result: Result<TaskDraft, _> =
            serde_json::from_value(json!({ "title": "x", "status": "Archived" }));
        assert!(result.is_err());
    }

    #[test]
    fn status_cycle_wraps() {
        assert_eq!(TaskStatus::Completed.cycle(1), TaskStatus::Pending);
        assert_eq!(TaskStatus::Pending.cycle(-1), TaskStatus::Completed);
        assert_eq!(TaskStatus::Pending.cycle(1), TaskStatus::InProgress);
    }

    #[test]
    fn update_keeps_omitted_fields() {
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "old".to_string(),
            description: "keep me".to_string(),
            status: TaskStatus::Completed,
            due_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        };
        TaskFields {
            title: "new".to_string(),
            description: None,
            status: None,
            due_date: NaiveDate::from_ymd_opt(2099, 2, 1).unwrap(),
        }
        .apply_to(&mut task);
        assert_eq!(task.title, "new");
        assert_eq!(task.description, "keep me");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2099, 2, 1).unwrap());
    }
}
