//! Keyword matching for the chat endpoint.
//!
//! No language understanding: a file matches when the message mentions its
//! name (without extension), or when the name contains the message's first
//! word.

use std::path::Path;

pub const NO_MATCH_REPLY: &str = "I couldn't find a matching PDF. Try: 'Get <name>' or use the search box. You can also upload PDFs.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Matching catalog names, in catalog order.
    Pdf(Vec<String>),
    Text(String),
}

fn stem_lower(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| name.to_lowercase())
}

/// Match `message` against catalog `names`.
pub fn respond<I, S>(message: &str, names: I) -> ChatReply
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let message = message.trim().to_lowercase();
    let Some(first_word) = message.split_whitespace().next() else {
        return ChatReply::Text(NO_MATCH_REPLY.to_string());
    };

    let matches: Vec<String> = names
        .into_iter()
        .filter(|name| {
            let stem = stem_lower(name.as_ref());
            message.contains(&stem) || stem.contains(first_word)
        })
        .map(|name| name.as_ref().to_string())
        .collect();

    if matches.is_empty() {
        ChatReply::Text(NO_MATCH_REPLY.to_string())
    } else {
        ChatReply::Pdf(matches)
    }
}
