//! `session/update`: the agent's fire-and-forget stream of progress while a
//! `session/prompt` call is in flight. The client must observe these in
//! order, and before the prompt call itself resolves.

use serde::{Deserialize, Serialize};

use super::content::ContentBlock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sessionUpdate", rename_all = "snake_case")]
pub enum SessionUpdate {
    UserMessageChunk { content: ContentBlock },
    AgentMessageChunk { content: ContentBlock },
    AgentThoughtChunk { content: ContentBlock },
    /// A free-form plan the agent is following, re-sent as it's revised.
    Plan { entries: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNotification {
    pub session_id: String,
    #[serde(flatten)]
    pub update: SessionUpdate,
}

impl SessionNotification {
    pub fn new(session_id: impl Into<String>, update: SessionUpdate) -> Self {
        Self {
            session_id: session_id.into(),
            update,
        }
    }
}
