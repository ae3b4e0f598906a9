use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ContextError;

#[allow(clippy::expect_used)]
static WAIVER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^WV-[0-9]{4}$").expect("waiver id pattern is valid"));

/// A waiver identifier of the form `WV-####`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WaiverId(String);

impl WaiverId {
    pub fn parse(raw: &str) -> Result<Self, ContextError> {
        if WAIVER_ID_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ContextError::InvalidWaiverId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WaiverId {
    type Error = ContextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WaiverId> for String {
    fn from(value: WaiverId) -> Self {
        value.0
    }
}

impl fmt::Display for WaiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
