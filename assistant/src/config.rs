/// Which classifier implementation handles incoming messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierMode {
    /// Deterministic regex/keyword rules. No network, no surprises.
    #[default]
    Rules,
    /// LLM-backed classification with a deterministic fallback to the
    /// unknown intent on any failure.
    Llm,
}

/// Connection settings for the OpenAI-compatible completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        LlmSettings {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 8,
        }
    }
}

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub classifier: ClassifierMode,
    pub llm: LlmSettings,
    /// Suggestions returned per request unless the caller asks for fewer.
    pub suggestion_limit: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            classifier: ClassifierMode::default(),
            llm: LlmSettings::default(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl AssistantConfig {
    /// Read configuration from `ROTA_*` environment variables; anything
    /// absent keeps its default. Never fails: a bad value falls back too.
    pub fn from_env() -> Self {
        let mut config = AssistantConfig::default();

        if let Ok(mode) = std::env::var("ROTA_CLASSIFIER") {
            config.classifier = match mode.to_lowercase().as_str() {
                "llm" => ClassifierMode::Llm,
                _ => ClassifierMode::Rules,
            };
        }
        if let Ok(endpoint) = std::env::var("ROTA_LLM_ENDPOINT") {
            config.llm.endpoint = endpoint;
        }
        if let Ok(key) = std::env::var("ROTA_LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("ROTA_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(timeout) = std::env::var("ROTA_LLM_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.llm.timeout_secs = secs;
            }
        }

        config
    }
}
