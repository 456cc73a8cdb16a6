// Command descriptors & applications (manager API)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Application type that hosts a content store
pub const STORE_APP_TYPE: &str = "DOCKER_STORE";

/// A command that can be run against applications of one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    pub app_type: String,

    /// Application statuses for which the command is applicable (absent = any)
    #[serde(default)]
    pub app_status: Option<BTreeSet<String>>,

    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl CommandDescriptor {
    /// Check whether the command may run against an application in `app_status`
    pub fn is_applicable_to(&self, app_status: Option<&str>) -> bool {
        match &self.app_status {
            None => true,
            Some(allowed) => allowed.contains(app_status.unwrap_or_default()),
        }
    }
}

/// Application managed by the manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,

    #[serde(rename = "type")]
    pub app_type: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub creation_date: Option<String>,
}

impl Application {
    pub fn is_store(&self) -> bool {
        self.app_type == STORE_APP_TYPE
    }
}
