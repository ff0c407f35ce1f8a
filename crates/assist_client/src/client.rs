//! OpenAI-backed mapping assist.
//!
//! Blocking reqwest client (no Tokio runtime required). One chat-completions
//! call per entity batch; the reply must be a JSON object
//! `{"mappings": [{"original", "suggested", "confidence"}]}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use taskgrid_recon::{AssistError, AssistSuggestion, EntityType, MappingAssist, RawRecord};

/// HTTP mapping assist (blocking).
#[derive(Clone)]
pub struct OpenAiAssist {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiAssist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAssist")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Deserialize)]
struct MappingReply {
    mappings: Vec<AssistSuggestion>,
}

// ============================================================================
// Client
// ============================================================================

impl OpenAiAssist {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AssistError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("taskgrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AssistError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn call(&self, system_prompt: String, user_prompt: String) -> Result<String, AssistError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    AssistError::Network(format!("request timed out: {e}"))
                } else {
                    AssistError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(AssistError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| AssistError::Malformed(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AssistError::Malformed("no choices in response".to_string()))
    }
}

impl MappingAssist for OpenAiAssist {
    fn suggest_mapping(
        &self,
        headers: &[String],
        entity: EntityType,
        samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError> {
        log::debug!(
            "requesting {} mapping for {} headers from {}",
            entity,
            headers.len(),
            self.model
        );
        let content = self.call(build_system_prompt(), build_user_prompt(headers, entity, samples))?;
        parse_mapping_response(&content)
    }
}

// ============================================================================
// Prompt
// ============================================================================

fn build_system_prompt() -> String {
    "You map spreadsheet column headers onto a fixed canonical schema.\n\
     For every input header return exactly one entry, in input order, with:\n\
     - original: the header exactly as given\n\
     - suggested: the canonical field it holds, or the original header if none fits\n\
     - confidence: a number between 0 and 1\n\
     Use the sample rows to disambiguate. Return ONLY a JSON object of the form \
     {\"mappings\": [{\"original\": ..., \"suggested\": ..., \"confidence\": ...}]}."
        .to_string()
}

fn build_user_prompt(headers: &[String], entity: EntityType, samples: &[RawRecord]) -> String {
    let mut prompt = String::new();

    prompt.push_str("ENTITY:\n");
    prompt.push_str(entity.as_str());
    prompt.push('\n');

    prompt.push_str("\nCANONICAL FIELDS:\n");
    prompt.push_str(&entity.canonical_fields().join(", "));
    prompt.push('\n');

    prompt.push_str("\nHEADERS:\n");
    for header in headers {
        prompt.push_str(&format!("- {header}\n"));
    }

    if !samples.is_empty() {
        prompt.push_str("\nSAMPLE ROWS:\n");
        for record in samples {
            prompt.push_str(&serde_json::Value::Object(record.clone()).to_string());
            prompt.push('\n');
        }
    }

    prompt
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse the model reply. Prose or code fences around the JSON object are
/// tolerated; coverage and confidence checks are left to the resolver.
pub fn parse_mapping_response(content: &str) -> Result<Vec<AssistSuggestion>, AssistError> {
    let reply: MappingReply = match serde_json::from_str(content) {
        Ok(r) => r,
        Err(e) => {
            let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
                return Err(AssistError::Malformed(format!("response is not JSON: {e}")));
            };
            if end < start {
                return Err(AssistError::Malformed(format!("response is not JSON: {e}")));
            }
            let reply = serde_json::from_str(&content[start..=end])
                .map_err(|_| AssistError::Malformed(format!("failed to parse JSON: {e}")))?;
            log::debug!("assist response contained extra text around JSON");
            reply
        }
    };
    Ok(reply.mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    // ── Parsing ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_plain_json() {
        let out = parse_mapping_response(
            r#"{"mappings": [{"original": "Client ID", "suggested": "ClientID", "confidence": 0.95}]}"#,
        )
        .unwrap();
        assert_eq!(out, vec![AssistSuggestion::new("Client ID", "ClientID", 0.95)]);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let content = "Sure, here you go:\n```json\n{\"mappings\": [{\"original\": \"a\", \"suggested\": \"TaskID\", \"confidence\": 0.7}]}\n```";
        let out = parse_mapping_response(content).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].suggested, "TaskID");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_mapping_response("I cannot help with that."),
            Err(AssistError::Malformed(_))
        ));
        assert!(matches!(
            parse_mapping_response("} nope {"),
            Err(AssistError::Malformed(_))
        ));
        assert!(matches!(
            parse_mapping_response(r#"{"answer": 42}"#),
            Err(AssistError::Malformed(_))
        ));
    }

    // ── Prompt ──────────────────────────────────────────────────────

    #[test]
    fn test_user_prompt_lists_fields_headers_and_samples() {
        let sample = json!({"Worker Name": "Ann"}).as_object().cloned().unwrap();
        let prompt = build_user_prompt(
            &headers(&["Worker Name"]),
            EntityType::Workers,
            &[sample],
        );
        assert!(prompt.contains("workers"));
        assert!(prompt.contains("WorkerID, WorkerName"));
        assert!(prompt.contains("- Worker Name"));
        assert!(prompt.contains(r#"{"Worker Name":"Ann"}"#));
    }

    // ── HTTP ────────────────────────────────────────────────────────

    #[test]
    fn test_suggest_mapping_roundtrip() {
        let server = MockServer::start();
        let reply = json!({
            "mappings": [
                {"original": "Task Name", "suggested": "TaskName", "confidence": 0.92},
                {"original": "Len", "suggested": "Duration", "confidence": 0.6}
            ]
        })
        .to_string();

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_includes("\"response_format\"")
                .body_includes("TaskName");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(completion(&reply));
        });

        let assist = OpenAiAssist::new(
            "sk-test",
            "gpt-4o-mini",
            server.url("/v1/chat/completions"),
            Duration::from_secs(5),
        )
        .unwrap();
        let out = assist
            .suggest_mapping(&headers(&["Task Name", "Len"]), EntityType::Tasks, &[])
            .unwrap();

        mock.assert();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], AssistSuggestion::new("Len", "Duration", 0.6));
    }

    #[test]
    fn test_api_error_carries_status_and_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401)
                .header("content-type", "application/json")
                .json_body(json!({"error": {"message": "Incorrect API key provided"}}));
        });

        let assist = OpenAiAssist::new(
            "bad",
            "gpt-4o-mini",
            server.url("/v1/chat/completions"),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = assist
            .suggest_mapping(&headers(&["x"]), EntityType::Clients, &[])
            .unwrap_err();
        assert_eq!(
            err,
            AssistError::Api {
                status: 401,
                message: "Incorrect API key provided".into()
            }
        );
    }

    #[test]
    fn test_empty_choices_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"choices": []}));
        });

        let assist = OpenAiAssist::new(
            "sk-test",
            "gpt-4o-mini",
            server.url("/v1/chat/completions"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(matches!(
            assist.suggest_mapping(&headers(&["x"]), EntityType::Clients, &[]),
            Err(AssistError::Malformed(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        let assist = OpenAiAssist::new(
            "sk-test",
            "gpt-4o-mini",
            "http://127.0.0.1:1/v1/chat/completions",
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(matches!(
            assist.suggest_mapping(&headers(&["x"]), EntityType::Clients, &[]),
            Err(AssistError::Network(_))
        ));
    }
}
