use serde::{Deserialize, Serialize};

/// Outcome code attached to every coordinator response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    Ok,
}

/// The status of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    /// A successful status with the conventional `"OK"` message.
    pub fn ok() -> Self {
        Self {
            code: Code::Ok,
            message: "OK".to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }
}
