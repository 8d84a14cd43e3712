use super::common::PartialUser;
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// A workspace member or integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub kind: UserKind,
}

impl User {
    pub fn is_bot(&self) -> bool {
        matches!(self.kind, UserKind::Bot { .. })
    }

    pub fn email(&self) -> Option<&str> {
        match &self.kind {
            UserKind::Person { person } => person.email.as_deref(),
            UserKind::Bot { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserKind {
    Person { person: Person },
    Bot { bot: Bot },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    #[serde(default)]
    pub owner: Option<BotOwner>,
    #[serde(default)]
    pub workspace_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotOwner {
    Workspace { workspace: bool },
    User { user: PartialUser },
}
