#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use chrono::Local;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Author;

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// A single transcript entry. Messages are never edited after creation, a
/// transcript only grows or gets replaced wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub author: Author,
    pub text: String,
    pub timestamp: String,
}

impl Message {
    pub fn new(author: Author, text: &str) -> Message {
        return Message {
            id: NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed),
            author,
            text: text.to_string(),
            timestamp: Local::now().format("%H:%M").to_string(),
        };
    }

    /// Locally synthesized notice describing a failure. These never travel to
    /// or from the remote service.
    pub fn system(text: &str) -> Message {
        return Message::new(Author::System, text);
    }

    pub fn is_system(&self) -> bool {
        return self.author == Author::System;
    }

    pub fn as_string_lines(&self, line_max_width: usize) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();

        for full_line in self.text.split('\n') {
            if full_line.trim().is_empty() {
                lines.push(" ".to_string());
                continue;
            }

            let mut char_count = 0;
            let mut current_lines: Vec<&str> = vec![];

            for word in full_line.split(' ') {
                if !current_lines.is_empty() && word.len() + char_count + 1 > line_max_width {
                    lines.push(current_lines.join(" ").trim_end().to_string());
                    current_lines = vec![word];
                    char_count = word.len() + 1;
                } else {
                    current_lines.push(word);
                    char_count += word.len() + 1;
                }
            }
            if !current_lines.is_empty() {
                lines.push(current_lines.join(" ").trim_end().to_string());
            }
        }

        return lines;
    }
}
