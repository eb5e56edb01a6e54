use serde::{Deserialize, Serialize};

/// Chat message role, serialized the way OpenAI-compatible APIs expect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat turn. Histories are slices of these; the wire body reuses the
/// same shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Answer style requested by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseMode {
    #[default]
    Concise,
    Detailed,
}

impl ResponseMode {
    /// The style line embedded in the system prompt.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Concise => "Provide short, crisp, interview-ready answers.",
            Self::Detailed => {
                "Provide detailed, explanatory, teaching-style answers with examples."
            }
        }
    }
}
