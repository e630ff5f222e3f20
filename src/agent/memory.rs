//! Per-session conversation memory.
//!
//! Stores whole exchanges (user message plus final reply), not raw model
//! messages, and replays them as a context preamble on the next turn.

use std::collections::{HashMap, VecDeque};

/// One completed user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub message: String,
    pub response: String,
}

/// Bounded history keyed by session id.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    max_messages: usize,
    sessions: HashMap<String, VecDeque<Exchange>>,
}

impl ConversationMemory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages: max_messages.max(1),
            sessions: HashMap::new(),
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Record an exchange, dropping the oldest ones past the cap.
    pub fn add(&mut self, session_id: &str, message: &str, response: &str) {
        let history = self.sessions.entry(session_id.to_string()).or_default();
        history.push_back(Exchange {
            message: message.to_string(),
            response: response.to_string(),
        });
        while history.len() > self.max_messages {
            history.pop_front();
        }
    }

    /// Oldest-first history; with `limit`, only the newest `limit` exchanges.
    pub fn history(&self, session_id: &str, limit: Option<usize>) -> Vec<Exchange> {
        let Some(history) = self.sessions.get(session_id) else {
            return Vec::new();
        };
        let skip = limit.map_or(0, |limit| history.len().saturating_sub(limit));
        history.iter().skip(skip).cloned().collect()
    }

    pub fn count(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map_or(0, VecDeque::len)
    }

    pub fn clear(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn clear_all(&mut self) {
        self.sessions.clear();
    }

    /// The user message as sent to the model: prefixed with prior exchanges
    /// when the session has any, unchanged otherwise.
    pub fn contextualize(&self, session_id: &str, message: &str) -> String {
        let history = self.history(session_id, None);
        if history.is_empty() {
            return message.to_string();
        }
        let context = history
            .iter()
            .map(|ex| format!("User: {}\nAssistant: {}", ex.message, ex.response))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Previous conversation context:\n{context}\n\nCurrent message: {message}")
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(crate::config::MemoryConfig::default().max_messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_newest_exchanges_past_cap() {
        let mut memory = ConversationMemory::new(2);
        memory.add("s", "one", "1");
        memory.add("s", "two", "2");
        memory.add("s", "three", "3");
        let history = memory.history("s", None);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "two");
        assert_eq!(history[1].message, "three");
    }

    #[test]
    fn history_limit_takes_newest() {
        let mut memory = ConversationMemory::new(10);
        for i in 0..6 {
            memory.add("s", &format!("m{i}"), "r");
        }
        let recent = memory.history("s", Some(2));
        assert_eq!(
            recent.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec!["m4", "m5"]
        );
        assert_eq!(memory.history("other", Some(2)), Vec::new());
    }

    #[test]
    fn sessions_are_isolated_and_clearable() {
        let mut memory = ConversationMemory::new(5);
        memory.add("a", "hi", "hello");
        memory.add("b", "yo", "hey");
        memory.clear("a");
        assert_eq!(memory.count("a"), 0);
        assert_eq!(memory.count("b"), 1);
        memory.clear_all();
        assert_eq!(memory.count("b"), 0);
    }

    #[test]
    fn contextualize_prefixes_prior_exchanges() {
        let mut memory = ConversationMemory::new(5);
        assert_eq!(memory.contextualize("s", "first"), "first");
        memory.add("s", "first", "ok");
        assert_eq!(
            memory.contextualize("s", "second"),
            "Previous conversation context:\nUser: first\nAssistant: ok\n\nCurrent message: second"
        );
    }
}
