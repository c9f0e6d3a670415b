use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Where in the guest's source an instruction came from, when debug info says so.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    #[serde(default)]
    pub function: Option<String>,
}

/// The static identity of an instrumented instruction.
///
/// Sites are keyed by address; the source location is carried along for reporting.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OpSite {
    pub address: u64,
    #[serde(default)]
    pub source: Option<SourceLocation>,
}

impl OpSite {
    pub fn new(address: u64) -> Self {
        Self {
            address,
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(mut self, file: T, line: u32, function: Option<T>) -> Self {
        self.source = Some(SourceLocation {
            file: file.into(),
            line,
            function: function.map(Into::into),
        });
        self
    }

    pub fn function(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.function.as_deref())
    }

    pub fn file(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.file.as_str())
    }

    pub fn line(&self) -> Option<u32> {
        self.source.as_ref().map(|s| s.line)
    }
}

impl Display for OpSite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(src) => write!(
                f,
                "{} at {}:{} ({:#x})",
                src.function.as_deref().unwrap_or("Unknown"),
                src.file,
                src.line,
                self.address
            ),
            None => write!(f, "{:#x}", self.address),
        }
    }
}
