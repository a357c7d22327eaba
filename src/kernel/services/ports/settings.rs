use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            export: ExportSettings::default(),
            log_filter: default_log_filter(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationBackend {
    /// POST `{prompt}` to a function endpoint that returns the project JSON.
    #[default]
    Function,
    /// OpenAI-compatible chat completions endpoint.
    ChatCompletions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default)]
    pub backend: GenerationBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::default(),
            endpoint: None,
            api_key_env: default_api_key_env(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_project_name")]
    pub project_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
        }
    }
}

fn default_log_filter() -> String {
    "promptbench=info".to_string()
}

fn default_api_key_env() -> String {
    "PROMPTBENCH_API_KEY".to_string()
}

fn default_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    8000
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_project_name() -> String {
    "workspace-project".to_string()
}
