use std::cell::RefCell;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::boundary::BoundaryWarning;
use crate::config::MessageConfig;
use crate::domain::{ChangeEntry, SemanticVersion};
use crate::message::{LocalMessageGenerator, MessageGenerator};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Commit messages from an OpenAI-compatible chat-completion endpoint.
///
/// Makes a single attempt per call. Transport errors, timeouts, non-success
/// statuses, malformed bodies and empty replies all fall back to the local
/// template, and the reason is kept for [MessageGenerator::take_warning].
pub struct RemoteMessageGenerator {
    config: MessageConfig,
    project_name: String,
    api_key: String,
    last_warning: RefCell<Option<BoundaryWarning>>,
}

impl RemoteMessageGenerator {
    pub fn new(config: MessageConfig, project_name: String, api_key: String) -> Self {
        RemoteMessageGenerator {
            config,
            project_name,
            api_key,
            last_warning: RefCell::new(None),
        }
    }

    #[instrument(skip_all, fields(endpoint = %self.config.endpoint, model = %self.config.model))]
    fn request(&self, prompt: &str) -> Result<String, String> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(self.config.timeout_secs)))
            .build()
            .into();

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut response = agent
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|e| e.to_string())?;

        let parsed: ChatResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| format!("malformed response: {}", e))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err("empty response".to_string());
        }
        debug!(chars = content.len(), "received generated message");
        Ok(content)
    }
}

impl MessageGenerator for RemoteMessageGenerator {
    fn generate(&self, changes: &[ChangeEntry], version: &SemanticVersion) -> String {
        let prompt = build_prompt(&self.project_name, changes, version, &self.config);
        match self.request(&prompt) {
            Ok(message) => {
                self.last_warning.replace(None);
                message
            }
            Err(reason) => {
                let warning = BoundaryWarning::MessageFallback { reason };
                warn!("{}", warning);
                self.last_warning.replace(Some(warning));
                LocalMessageGenerator.generate(changes, version)
            }
        }
    }

    fn kind(&self) -> &'static str {
        "remote"
    }

    fn take_warning(&self) -> Option<BoundaryWarning> {
        self.last_warning.take()
    }
}

/// Build the instruction text sent to the endpoint.
///
/// Only the first `max_prompt_changes` change lines are included.
pub fn build_prompt(
    project_name: &str,
    changes: &[ChangeEntry],
    version: &SemanticVersion,
    config: &MessageConfig,
) -> String {
    let shown: Vec<String> = changes
        .iter()
        .take(config.max_prompt_changes)
        .map(|change| change.to_string())
        .collect();
    let omitted = changes.len().saturating_sub(shown.len());

    let mut prompt = format!(
        "Write a git commit message for releasing version {version} of the project \"{project_name}\".\n\n\
         Changed files:\n{}\n",
        shown.join("\n")
    );
    if omitted > 0 {
        prompt.push_str(&format!("... and {} more\n", omitted));
    }
    prompt.push_str(&format!(
        "\nRules:\n\
         - Follow the Conventional Commits format\n\
         - Keep the title line under 50 characters\n\
         - Put the details in a bullet-point body\n\
         - Write the message in {}\n\
         - Reply with the commit message only",
        config.language
    ));
    prompt
}
