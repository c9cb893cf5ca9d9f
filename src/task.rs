//! Task Model
//!
//! What the user asked for (task kind and tone), and the request handed to
//! the engine for one invocation.

use serde::{Deserialize, Serialize};

/// Writing tone for the change-tone task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Casual,
    Straightforward,
    Confident,
    Friendly,
    Strict,
}

impl Tone {
    /// Menu order
    pub const ALL: [Tone; 6] = [
        Tone::Professional,
        Tone::Casual,
        Tone::Straightforward,
        Tone::Confident,
        Tone::Friendly,
        Tone::Strict,
    ];

    /// Label shown in the tone submenu
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Straightforward => "Straight forward",
            Tone::Confident => "Confident",
            Tone::Friendly => "Friendly",
            Tone::Strict => "Strict",
        }
    }

    /// Phrase interpolated into the prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Straightforward => "straight forward",
            Tone::Confident => "confident",
            Tone::Friendly => "friendly",
            Tone::Strict => "strict",
        }
    }

    pub fn from_label(label: &str) -> Option<Tone> {
        Tone::ALL.into_iter().find(|t| t.label() == label)
    }
}

/// Operation to run on the selected text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tone", rename_all = "snake_case")]
pub enum TaskKind {
    Summarize,
    ImproveWriting,
    BulletPoints,
    ChangeTone(Tone),
}

impl TaskKind {
    /// Render the engine prompt for `text`
    pub fn prompt(&self, text: &str) -> String {
        let instruction = match self {
            TaskKind::Summarize => "Summarize the text below, keep it as succinct as possible while keeping the general idea of the text, only include the summarization in your response:".to_string(),
            TaskKind::ImproveWriting => "Rewrite the text below to improve the overall writing and clarity while keeping the general idea of the text and its length, only include the rewritten text in your response:".to_string(),
            TaskKind::BulletPoints => "Rewrite the text below in a few bullet points summarizing the important points, only include the rewritten text in your response:".to_string(),
            TaskKind::ChangeTone(tone) => format!(
                "Rewrite the text below to make it more {} while keeping the general idea of the text and its length, only include the rewritten text in your response:",
                tone.as_str()
            ),
        };

        format!("{instruction}\n```\n{text}\n```\n")
    }
}

/// One engine invocation, built fresh per trigger and never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    /// Selected text (may be empty when nothing was selected)
    pub text: String,
    pub kind: TaskKind,
    pub model: String,
    pub url: String,
}

impl TaskRequest {
    pub fn new(
        text: impl Into<String>,
        kind: TaskKind,
        model: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            kind,
            model: model.into(),
            url: url.into(),
        }
    }

    pub fn prompt(&self) -> String {
        self.kind.prompt(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_order_and_labels() {
        let labels: Vec<&str> = Tone::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Professional",
                "Casual",
                "Straight forward",
                "Confident",
                "Friendly",
                "Strict"
            ]
        );
        assert_eq!(Tone::from_label("Straight forward"), Some(Tone::Straightforward));
        assert_eq!(Tone::from_label("Grumpy"), None);
    }

    #[test]
    fn test_prompt_fences_text() {
        let prompt = TaskKind::Summarize.prompt("Hello world");
        assert!(prompt.starts_with("Summarize the text below"));
        assert!(prompt.contains("```\nHello world\n```"));
    }

    #[test]
    fn test_tone_prompt_uses_phrase() {
        let prompt = TaskKind::ChangeTone(Tone::Straightforward).prompt("Please respond");
        assert!(prompt.contains("make it more straight forward"));
        assert!(prompt.contains("Please respond"));
    }

    #[test]
    fn test_empty_text_still_renders() {
        let request = TaskRequest::new("", TaskKind::BulletPoints, "llama2", "http://x");
        assert!(request.prompt().contains("```\n\n```"));
    }

    #[test]
    fn test_task_kind_serialize() {
        let json = serde_json::to_string(&TaskKind::ChangeTone(Tone::Casual)).unwrap();
        assert_eq!(json, r#"{"kind":"change_tone","tone":"casual"}"#);
        let json = serde_json::to_string(&TaskKind::Summarize).unwrap();
        assert_eq!(json, r#"{"kind":"summarize"}"#);
    }
}
