use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use log::debug;
use crate::config::LlmConfig;
use crate::error::{ChallengeError, Result};
use super::{ChatMessage, ChatModel, Role};

/// Chat completions through the OpenAI API or a compatible server
pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    /// Creates a client from the LLM configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut openai = OpenAIConfig::new().with_api_key(config.require_api_key()?);
        if let Some(base) = &config.base_url {
            openai = openai.with_api_base(base);
        }

        Ok(Self {
            client: Client::with_config(openai),
            model: config.model().to_string(),
            temperature: config.temperature,
        })
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let converted: ChatCompletionRequestMessage = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
        };
        Ok(converted)
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .temperature(self.temperature)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;
        debug!("OpenAI usage: {:?}", response.usage);

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChallengeError::LLM("OpenAI returned no message content".into()))
    }
}
