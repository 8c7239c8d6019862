use futures::StreamExt;
use rig::completion::{CompletionModel, Message as RigMessage};
use rig::prelude::CompletionClient;
use rig::providers::openai;
use rig::streaming::StreamedAssistantContent;
use snafu::{ResultExt, ensure};

use crate::contract::{
    BoxFuture, CompletionsFailedSnafu, HttpClientSnafu, MissingApiKeySnafu, Mode, Reply,
    ReplyRequest, Respondent, RespondentError, RespondentResult,
};

pub const OPENAI_RESPONDENT_ID: &str = "openai";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Connection parameters for the rig-backed respondent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondentConfig {
    pub respondent_id: String,
    pub api_key: String,
    pub base_url: String,
    pub model_id: String,
}

impl RespondentConfig {
    pub fn new(
        respondent_id: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            respondent_id: respondent_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            base_url: base_url.into().trim().to_string(),
            model_id: model_id.into().trim().to_string(),
        }
    }
}

/// Respondent backed by an OpenAI-compatible completion endpoint via rig.
///
/// The provider streams tokens; this adapter folds them into the single reply
/// the send pipeline contract expects.
pub struct RigRespondent {
    config: RespondentConfig,
}

impl RigRespondent {
    pub fn new(config: RespondentConfig) -> RespondentResult<Self> {
        ensure!(
            !config.api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "rig-respondent-new",
                respondent_id: config.respondent_id.clone(),
            }
        );

        Ok(Self { config })
    }

    fn build_client(config: &RespondentConfig) -> RespondentResult<openai::Client> {
        let mut builder = openai::Client::builder().api_key(config.api_key.as_str());
        if !config.base_url.is_empty() {
            builder = builder.base_url(config.base_url.as_str());
        }
        builder.build().context(HttpClientSnafu {
            stage: "build-client",
        })
    }

    /// Sampling temperature derived from the opaque request mode.
    ///
    /// The pipeline attaches no meaning to the tag; mapping it to sampling
    /// behavior is this respondent's interpretation.
    fn temperature_for(mode: Mode) -> Option<f64> {
        match mode {
            Mode::Default => None,
            Mode::Fast => Some(1.0),
            Mode::Precise => Some(0.2),
        }
    }

    async fn collect_reply(
        config: RespondentConfig,
        request: ReplyRequest,
    ) -> RespondentResult<Reply> {
        let client = Self::build_client(&config)?;
        let model = client.completion_model(config.model_id.clone());

        let mut builder = model.completion_request(RigMessage::user(request.prompt.clone()));
        if let Some(temperature) = Self::temperature_for(request.mode) {
            builder = builder.temperature(temperature);
        }

        let mut stream = builder.stream().await.context(CompletionsFailedSnafu {
            stage: "open-stream",
        })?;

        let mut text = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(StreamedAssistantContent::Text(chunk)) => text.push_str(&chunk.text),
                // Reasoning and tool-call fragments are not part of the reply text.
                Ok(_) => {}
                Err(source) => {
                    tracing::warn!(
                        respondent_id = %config.respondent_id,
                        model_id = %config.model_id,
                        error = %source,
                        "provider stream emitted an error chunk"
                    );
                    return Err(RespondentError::CompletionsFailed {
                        stage: "stream-chunk",
                        source,
                    });
                }
            }
        }

        Ok(Reply::new(text))
    }
}

impl Respondent for RigRespondent {
    fn id(&self) -> &str {
        &self.config.respondent_id
    }

    fn respond(&self, request: ReplyRequest) -> BoxFuture<'static, RespondentResult<Reply>> {
        let config = self.config.clone();
        tracing::debug!(
            respondent_id = %config.respondent_id,
            model_id = %config.model_id,
            mode = %request.mode,
            "issuing completion request"
        );
        Box::pin(Self::collect_reply(config, request))
    }
}
