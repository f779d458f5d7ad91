use crate::foundation::error::StoryError;

/// User-facing message raised by a session operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// A locked premium item was requested.
    Upsell { item: String },
    Error(String),
}

impl Notice {
    pub fn upsell(item: impl Into<String>) -> Self {
        Self::Upsell { item: item.into() }
    }

    pub fn text(&self) -> String {
        match self {
            Notice::Upsell { item } => format!("'{item}' is part of Premium. Upgrade to unlock it."),
            Notice::Error(msg) => msg.clone(),
        }
    }
}

impl From<&StoryError> for Notice {
    fn from(err: &StoryError) -> Self {
        Notice::Error(err.user_message())
    }
}
