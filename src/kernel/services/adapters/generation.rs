//! HTTP project generator and the payload repair applied to model output.

use std::collections::BTreeMap;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use crate::kernel::services::ports::{
    GeneratedProject, GenerationBackend, GenerationError, GenerationFuture, GenerationSettings,
    ProjectGenerator,
};
use crate::models::FileMap;

pub const SYSTEM_PROMPT: &str = r#"You are an expert full-stack developer. Generate complete, working project code.

CRITICAL JSON RULES:
1. Output ONLY a valid JSON object - no markdown, no code blocks, no explanation
2. All string values must have properly escaped characters:
   - Use \\ for backslashes
   - Use \" for quotes inside strings
   - Use \n for newlines (not actual line breaks inside string values)
   - Use \t for tabs
3. Double-check your JSON is valid before responding

DEVELOPMENT RULES:
1. Generate complete, working code - no placeholders
2. Use React 18, TypeScript, Tailwind CSS
3. Keep code simple and clean

OUTPUT FORMAT (raw JSON only):
{"files":{"index.html":"<!DOCTYPE html>...","src/App.tsx":"import React from \"react\";..."}}

For simple apps, use a single index.html with embedded styles/scripts.
For React apps, include: index.html, src/main.tsx, src/App.tsx, src/index.css, package.json, vite.config.ts, tsconfig.json, tailwind.config.js"#;

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("fence pattern");
}

#[derive(Clone)]
pub struct HttpGenerator {
    client: reqwest::Client,
    settings: GenerationSettings,
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("backend", &self.settings.backend)
            .field("endpoint", &self.settings.endpoint)
            .finish()
    }
}

impl HttpGenerator {
    pub fn new(settings: GenerationSettings) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| GenerationError::NotConfigured(e.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    async fn run(self, prompt: String) -> Result<GeneratedProject, GenerationError> {
        let prompt = prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(GenerationError::MissingPrompt);
        }
        let endpoint = self
            .settings
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| GenerationError::NotConfigured("no endpoint set".to_string()))?;

        tracing::info!(backend = ?self.settings.backend, endpoint = %endpoint, "requesting generation");
        match self.settings.backend {
            GenerationBackend::Function => self.call_function(&endpoint, &prompt).await,
            GenerationBackend::ChatCompletions => self.call_chat(&endpoint, &prompt).await,
        }
    }

    async fn call_function(
        &self,
        endpoint: &str,
        prompt: &str,
    ) -> Result<GeneratedProject, GenerationError> {
        let mut request = self.client.post(endpoint).json(&json!({ "prompt": prompt }));
        if let Ok(key) = std::env::var(&self.settings.api_key_env) {
            request = request.bearer_auth(key);
        }
        let body = read_body(request).await?;

        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) {
            if let Some(message) = map.get("error").and_then(Value::as_str) {
                return Err(GenerationError::Upstream {
                    status: 200,
                    message: message.to_string(),
                });
            }
        }
        parse_project_payload(&body)
    }

    async fn call_chat(
        &self,
        endpoint: &str,
        prompt: &str,
    ) -> Result<GeneratedProject, GenerationError> {
        let key = std::env::var(&self.settings.api_key_env).map_err(|_| {
            GenerationError::NotConfigured(format!("{} is not set", self.settings.api_key_env))
        })?;

        let request = self
            .client
            .post(endpoint)
            .bearer_auth(key)
            .json(&chat_request(&self.settings, prompt));
        let body = read_body(request).await?;

        let response: Value = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedPayload(e.to_string()))?;
        let content = response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::MalformedPayload("No content in AI response".to_string())
            })?;
        tracing::debug!(chars = content.len(), "chat completion received");
        parse_project_payload(content)
    }
}

impl ProjectGenerator for HttpGenerator {
    fn generate(&self, prompt: String) -> GenerationFuture {
        Box::pin(self.clone().run(prompt))
    }
}

pub fn chat_request(settings: &GenerationSettings, prompt: &str) -> Value {
    json!({
        "model": settings.model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": format!("Generate a complete project for: {prompt}") },
        ],
        "temperature": settings.temperature,
        "max_tokens": settings.max_tokens,
    })
}

async fn read_body(request: reqwest::RequestBuilder) -> Result<String, GenerationError> {
    let response = request
        .send()
        .await
        .map_err(|e| GenerationError::Network(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GenerationError::Network(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        tracing::warn!(status = status.as_u16(), message = %message, "generation request failed");
        return Err(GenerationError::from_status(status.as_u16(), message));
    }
    Ok(body)
}

/// Parses model output into a project, tolerating fences, surrounding prose and raw
/// control characters inside string literals.
pub fn parse_project_payload(raw: &str) -> Result<GeneratedProject, GenerationError> {
    let mut text = raw.trim();
    if let Some(inner) = FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        text = inner.as_str().trim();
    }

    let span = extract_json_object(text)
        .ok_or_else(|| GenerationError::MalformedPayload("no JSON object found".to_string()))?;

    let value = match serde_json::from_str::<Value>(span) {
        Ok(value) => value,
        Err(first) => {
            tracing::debug!(error = %first, "initial parse failed, repairing string literals");
            serde_json::from_str::<Value>(&escape_control_in_strings(span))
                .map_err(|e| GenerationError::MalformedPayload(e.to_string()))?
        }
    };

    project_from_value(value)
}

fn project_from_value(value: Value) -> Result<GeneratedProject, GenerationError> {
    let Value::Object(mut root) = value else {
        return Err(GenerationError::InvalidStructure);
    };
    let Some(Value::Object(raw_files)) = root.remove("files") else {
        return Err(GenerationError::InvalidStructure);
    };

    let mut files = FileMap::new();
    for (path, content) in raw_files {
        match content {
            Value::String(content) => {
                files.insert(path, content);
            }
            _ => return Err(GenerationError::InvalidStructure),
        }
    }

    Ok(GeneratedProject {
        files,
        dependencies: root.remove("dependencies").and_then(string_map),
        dev_dependencies: root.remove("devDependencies").and_then(string_map),
    })
}

fn string_map(value: Value) -> Option<BTreeMap<String, String>> {
    serde_json::from_value(value).ok()
}

/// First balanced `{...}` span, or first `{` through last `}` when braces never balance.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Escapes raw newlines, carriage returns and tabs that appear inside string literals.
pub fn escape_control_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/generation.rs"]
mod tests;
