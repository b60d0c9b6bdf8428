//! The two-field "add user" draft.

use crate::error::ValidationError;
use crate::model::NewUser;

/// Which draft field an edit targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "User name",
            Self::Email => "Email",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub email: String,
}

/// Draft plus the field the cursor is in.
#[derive(Clone, Debug)]
pub struct FormState {
    pub draft: Draft,
    pub focus: Field,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            draft: Draft::default(),
            focus: Field::Name,
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field, leaving the other untouched.
    pub fn update(&mut self, field: Field, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.draft.name,
            Field::Email => &self.draft.email,
        }
    }

    pub fn push_char(&mut self, c: char) {
        let focus = self.focus;
        self.field_mut(focus).push(c);
    }

    pub fn pop_char(&mut self) {
        let focus = self.focus;
        self.field_mut(focus).pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Check both fields are non-empty after trimming and return the
    /// trimmed request body.
    pub fn validate(&self) -> Result<NewUser, ValidationError> {
        let name = self.draft.name.trim();
        let email = self.draft.email.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        Ok(NewUser {
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    pub fn reset(&mut self) {
        self.draft = Draft::default();
        self.focus = Field::Name;
    }

    /// Soft hint for the email field; never blocks submission.
    pub fn email_looks_valid(&self) -> bool {
        let email = self.draft.email.trim();
        match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
            }
            None => false,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.draft.name,
            Field::Email => &mut self.draft.email,
        }
    }
}
