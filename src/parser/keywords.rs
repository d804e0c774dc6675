//! Keyword extraction used by the task matcher.

/// Maximum keywords kept per task.
pub const MAX_KEYWORDS: usize = 10;

/// Tokens shorter than this are dropped.
const MIN_KEYWORD_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "that", "this", "then", "than", "are", "was",
    "were", "will", "should", "must", "can", "all", "any", "not", "but", "its", "our", "your",
    "their", "has", "have", "had", "via", "per", "use", "using", "when", "where", "which", "what",
    "who", "how", "add", "new", "make", "task", "tasks",
];

/// Lowercased alphanumeric tokens of `text`, in order, duplicates included.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Derive matching keywords from a task description.
pub fn extract_keywords(description: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokenize(description) {
        if token.chars().count() < MIN_KEYWORD_LEN || STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        if keywords.contains(&token) {
            continue;
        }
        keywords.push(token);
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}
