use futures_util::Stream;
use serde::Serialize;
use serde_json::{Map, Value};
use std::pin::Pin;

/// One decoded unit of endpoint output. No schema is imposed on it.
pub type ResponseChunk = Value;

/// Lazy, single-pass sequence of chunks produced by one forwarding call.
pub type ChunkStream = Pin<Box<dyn Stream<Item = crate::Result<ResponseChunk>> + Send>>;

#[derive(Debug, Clone)]
pub struct InferenceRequest {
    model_name: String,
    prompt: String,
    parameters: Map<String, Value>,
    stream: bool,
    auth_override: Option<String>,
}

impl InferenceRequest {
    pub fn new(model_name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            prompt: prompt.into(),
            parameters: Map::new(),
            stream: false,
            auth_override: None,
        }
    }

    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn auth(mut self, token: impl Into<String>) -> Self {
        self.auth_override = Some(token.into());
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn sampling_parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn is_stream(&self) -> bool {
        self.stream
    }

    /// The caller-supplied token, ignoring an empty string.
    pub fn auth_override(&self) -> Option<&str> {
        self.auth_override.as_deref().filter(|token| !token.is_empty())
    }
}

/// JSON body sent to the endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RequestBody {
    pub inputs: String,
    pub parameters: Map<String, Value>,
    pub stream: bool,
}

impl From<InferenceRequest> for RequestBody {
    fn from(request: InferenceRequest) -> Self {
        Self {
            inputs: request.prompt,
            parameters: request.parameters,
            stream: request.stream,
        }
    }
}
