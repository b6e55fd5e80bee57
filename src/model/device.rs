use serde::{Deserialize, Serialize};

/// One entry of the scan endpoint's JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub user: String,
    pub os: String,
    pub id: String, // backend stringifies its numeric id
}

impl Device {
    pub fn new(user: impl Into<String>, os: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            os: os.into(),
            id: id.into(),
        }
    }

    /// Plain-text block used by the CLI: one `Label: value` line per field.
    pub fn to_text_block(&self) -> String {
        format!("User: {}\nOs: {}\nId: {}", self.user, self.os, self.id)
    }
}
