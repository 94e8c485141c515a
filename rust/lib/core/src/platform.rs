use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Execution context a store runs in.
///
/// `Browser` has durable local storage: the store restores its snapshot at
/// construction and mirrors every change back. `Server` has none: the store
/// starts from its seed and never touches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Browser,
    Server,
}

impl Platform {
    pub fn is_browser(self) -> bool {
        self == Platform::Browser
    }

    pub fn is_server(self) -> bool {
        self == Platform::Server
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Browser => "browser",
            Platform::Server => "server",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "browser" => Ok(Platform::Browser),
            "server" => Ok(Platform::Server),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}
