use crate::account::TodoId;
use crate::todos::Filter;

/// Transient state of one logged-in user's interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub current_user: Option<String>,
    pub filter: Filter,
    pub editing: Option<TodoId>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn begin(&mut self, username: &str) {
        *self = Self {
            current_user: Some(username.to_string()),
            ..Self::default()
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
