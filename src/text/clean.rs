//! Review text cleaning

use crate::core::Result;
use crate::text::Stopwords;
use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    html_tags: Regex,
    urls: Regex,
    non_word: Regex,
}

impl Patterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            html_tags: Regex::new(r"<.*?>")?,
            urls: Regex::new(r"https?://\S+")?,
            non_word: Regex::new(r"[^\w\s]")?,
        })
    }
}

fn patterns() -> Result<&'static Patterns> {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    if let Some(patterns) = PATTERNS.get() {
        return Ok(patterns);
    }
    let compiled = Patterns::compile()?;
    Ok(PATTERNS.get_or_init(|| compiled))
}

/// Strip HTML tags, URLs and punctuation, then lowercase.
///
/// Whitespace is preserved, so word boundaries survive.
pub fn clean_text(text: &str) -> Result<String> {
    let patterns = patterns()?;
    let text = patterns.html_tags.replace_all(text, "");
    let text = patterns.urls.replace_all(&text, "");
    let text = patterns.non_word.replace_all(&text, "");
    Ok(text.to_lowercase())
}

/// Cleaned whitespace-separated tokens
pub fn tokenize(text: &str) -> Result<Vec<String>> {
    Ok(clean_text(text)?
        .split_whitespace()
        .map(str::to_string)
        .collect())
}

/// Clean `text` and drop stopwords, joining what is left with single spaces
pub fn preprocess(text: &str, stopwords: &Stopwords) -> Result<String> {
    let cleaned = clean_text(text)?;
    Ok(cleaned
        .split_whitespace()
        .filter(|word| !stopwords.contains(word))
        .collect::<Vec<_>>()
        .join(" "))
}
