use chrono::NaiveDate;

use crate::task::{TaskDraft, TaskStatus};
use crate::validation::{self, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Status,
    DueDate,
}

impl FormField {
    const ORDER: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::Status,
        FormField::DueDate,
    ];

    fn step(self, direction: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(index + direction).rem_euclid(len) as usize]
    }
}

/// State of the create-task modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// Raw `YYYY-MM-DD` text as typed.
    pub due_date: String,
    pub focus: FormField,
    pub errors: ValidationErrors,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.step(1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.step(-1);
    }

    pub fn cycle_status(&mut self, direction: isize) {
        self.status = self.status.cycle(direction);
    }

    /// Types into the focused text field. The status field ignores text.
    pub fn input(&mut self, c: char) {
        if let Some(field) = self.focused_text() {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_text() {
            field.pop();
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Status => None,
        }
    }

    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status),
            due_date: Some(self.due_date.clone()),
        }
    }

    /// Applies the same rules the service enforces. On failure the field
    /// errors are kept for display and `None` is returned.
    pub fn submit(&mut self, today: NaiveDate) -> Option<TaskDraft> {
        let draft = self.draft();
        match validation::validate(&draft, today) {
            Ok(_) => {
                self.errors = ValidationErrors::default();
                Some(draft)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn type_str(form: &mut TaskForm, text: &str) {
        text.chars().for_each(|c| form.input(c));
    }

    #[test]
    fn typing_follows_focus() {
        let mut form = TaskForm::new();
        type_str(&mut form, "Buy milk");
        form.focus_next();
        type_str(&mut form, "2 litres");
        form.focus_next();
        type_str(&mut form, "ignored");
        form.cycle_status(1);
        form.focus_next();
        type_str(&mut form, "2025-03-11");
        form.backspace();
        type_str(&mut form, "2");

        assert_eq!(form.title, "Buy milk");
        assert_eq!(form.description, "2 litres");
        assert_eq!(form.status, TaskStatus::InProgress);
        assert_eq!(form.due_date, "2025-03-12");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = TaskForm::new();
        form.focus_prev();
        assert_eq!(form.focus, FormField::DueDate);
        form.focus_next();
        assert_eq!(form.focus, FormField::Title);
    }

    #[test]
    fn submit_reports_both_field_errors() {
        let mut form = TaskForm::new();
        form.due_date = "2025-03-09".to_string();
        assert!(form.submit(today()).is_none());
        assert_eq!(form.errors.title, Some(ValidationError::MissingTitle));
        assert_eq!(form.errors.due_date, Some(ValidationError::PastDueDate));

        form.title = "fixed".to_string();
        form.due_date = "2025-03-10".to_string();
        let draft = form.submit(today()).unwrap();
        assert!(form.errors.is_empty());
        assert_eq!(draft.status, Some(TaskStatus::Pending));
        assert_eq!(draft.due_date.as_deref(), Some("2025-03-10"));
    }
}
