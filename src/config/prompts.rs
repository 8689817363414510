//! Prompt templates for the reading assistant.
//!
//! Prompts can be customized by placing an `assistant.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub assistant: AssistantPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Texts used by the reading assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    /// Fixed system instruction describing persona and scope.
    pub system: String,
    /// First message shown in the conversation panel.
    pub greeting: String,
    /// Reply used when the hosted model cannot be reached.
    pub fallback: String,
    /// Reply used when the model answers with no text.
    pub empty_reply: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a literary analyst who knows the wuxia novels of Jin Yong in depth. Answer questions about "{{title}}", chapter "{{subtitle}}", using the text of this chapter as your ground.

Guidelines:
- Keep an elegant, professional tone
- Explore the characters' inner lives and the rhetoric of the prose
- Quote or paraphrase the chapter when it supports your point
- If a question goes beyond this chapter, say so before answering from wider knowledge"#
                .to_string(),

            greeting: "Hello, I am your reading guide for {{title}}. Ask me about Guo Xiang's state of mind, how the scenery is drawn, or what this passage means for the rest of the novel.".to_string(),

            fallback: "Sorry, the assistant cannot answer right now. Please check your network connection or API settings.".to_string(),

            empty_reply: "No response was received.".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Render every assistant text against the chapter's title and subtitle.
    pub fn assistant_for_chapter(&self, title: &str, subtitle: &str) -> AssistantPrompts {
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert("subtitle".to_string(), subtitle.to_string());

        AssistantPrompts {
            system: self.render_with_custom(&self.assistant.system, &vars),
            greeting: self.render_with_custom(&self.assistant.greeting, &vars),
            fallback: self.render_with_custom(&self.assistant.fallback, &vars),
            empty_reply: self.render_with_custom(&self.assistant.empty_reply, &vars),
        }
    }
}
