//! Render a stored summary as shareable content.

use std::fmt;
use std::str::FromStr;

use topicflow_shared::{SummaryRecord, TopicflowError};

/// Characters of the summary quoted in a post.
const POST_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentFormat {
    #[default]
    Educational,
    LinkedinPost,
}

impl ContentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Educational => "educational",
            Self::LinkedinPost => "linkedin_post",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentFormat {
    type Err = TopicflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "educational" => Ok(Self::Educational),
            "linkedin_post" => Ok(Self::LinkedinPost),
            other => Err(TopicflowError::validation(format!(
                "format '{other}' not supported (expected educational or linkedin_post)"
            ))),
        }
    }
}

/// Render `record` in the requested format.
pub fn generate_content(record: &SummaryRecord, format: ContentFormat) -> String {
    let topic = &record.topic;
    match format {
        ContentFormat::Educational => {
            let mut out = format!(
                "Here's a beginner-friendly explanation of **{topic}**:\n\n{}\n\n",
                record.summary
            );
            if !record.glossary_terms.is_empty() {
                out.push_str(&format!(
                    "Key terms to remember: {}.\n\n",
                    record.glossary_terms.join(", ")
                ));
            }
            out.push_str(
                "This is a great starting point for learners who are just getting into the topic.",
            );
            out
        }
        ContentFormat::LinkedinPost => {
            let preview: String = record.summary.chars().take(POST_PREVIEW_CHARS).collect();
            format!(
                "{}\n\n{preview}...\n\n\
                 What's your experience with this concept? Drop a comment below.",
                post_hook(topic)
            )
        }
    }
}

/// Opening line for a post, stable for a given topic.
fn post_hook(topic: &str) -> String {
    let pick = topic.bytes().map(usize::from).sum::<usize>() % 3;
    match pick {
        0 => format!("Ever wondered how {topic} works?"),
        1 => format!(
            "{} is changing the way we think about technology.",
            capitalize(topic)
        ),
        _ => format!("Beginners, here's a quick dive into {topic}."),
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
