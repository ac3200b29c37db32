use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Handle to the in-flight assistant entry returned by
/// [`Transcript::begin_assistant`]. Addressing the entry explicitly
/// avoids last-element lookups while a response is still growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryId(usize);

/// The conversation log: an ordered sequence of messages.
///
/// Always holds at least one entry: the system message it was created
/// with. `reset` restores exactly that state.
#[derive(Debug, Clone)]
pub struct Transcript {
    system_prompt: String,
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let messages = vec![Message {
            role: Role::System,
            content: system_prompt.clone(),
        }];
        Self {
            system_prompt,
            messages,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// Append an empty assistant entry as the placeholder for a streamed
    /// response and return a handle to it.
    pub fn begin_assistant(&mut self) -> EntryId {
        self.messages.push(Message {
            role: Role::Assistant,
            content: String::new(),
        });
        EntryId(self.messages.len() - 1)
    }

    /// Overwrite the content of an in-flight assistant entry.
    ///
    /// Only assistant entries can be rewritten; a stale handle (e.g. after
    /// a reset) is a no-op rather than a corruption.
    pub fn set_content(&mut self, id: EntryId, content: &str) {
        if let Some(entry) = self.messages.get_mut(id.0)
            && entry.role == Role::Assistant
        {
            entry.content.clear();
            entry.content.push_str(content);
        }
    }

    /// Drop the whole conversation and start over with the system entry.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(Message {
            role: Role::System,
            content: self.system_prompt.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcript_has_single_system_entry() {
        let transcript = Transcript::new("be helpful");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].role, Role::System);
        assert_eq!(transcript.messages()[0].content, "be helpful");
    }

    #[test]
    fn push_appends_in_order() {
        let mut transcript = Transcript::new("sys");
        transcript.push_user("question");
        transcript.push_assistant("answer");
        let roles: Vec<Role> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[test]
    fn begin_assistant_creates_empty_placeholder() {
        let mut transcript = Transcript::new("sys");
        transcript.push_user("hi");
        let id = transcript.begin_assistant();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[2].content, "");

        transcript.set_content(id, "Hel");
        transcript.set_content(id, "Hello");
        assert_eq!(transcript.messages()[2].content, "Hello");
    }

    #[test]
    fn set_content_ignores_non_assistant_entries() {
        let mut transcript = Transcript::new("sys");
        transcript.push_user("hi");
        // Forge a handle pointing at the user entry
        transcript.set_content(EntryId(1), "overwritten");
        assert_eq!(transcript.messages()[1].content, "hi");
    }

    #[test]
    fn reset_restores_single_system_entry() {
        let mut transcript = Transcript::new("sys");
        transcript.push_user("a");
        let id = transcript.begin_assistant();
        transcript.set_content(id, "partial");
        transcript.reset();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].role, Role::System);
        assert_eq!(transcript.messages()[0].content, "sys");

        // A handle from before the reset must not resurrect anything
        transcript.set_content(id, "ghost");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].content, "sys");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::User.as_str(), "user");
    }
}
