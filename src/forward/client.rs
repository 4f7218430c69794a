use super::{ChunkStream, InferenceRequest, RequestBody, ResponseChunk, decode_frame};
use crate::{Error, Result, config::EndpointConfig, session::SessionManager};
use async_stream::try_stream;
use futures_util::{Stream, StreamExt, TryStreamExt};
use reqwest::StatusCode;
use std::{env, sync::Arc};
use tokio::io::AsyncBufReadExt;
use tokio_util::{io::StreamReader, sync::CancellationToken};
use tracing::{debug, warn};

/// Relays inference requests to the hosted endpoint through a shared session.
#[derive(Debug, Clone)]
pub struct Forwarder {
    sessions: Arc<SessionManager>,
    base_url: String,
    token_env: String,
}

impl Forwarder {
    pub fn new(config: &EndpointConfig) -> Self {
        Self::with_sessions(config, SessionManager::global())
    }

    pub fn with_sessions(config: &EndpointConfig, sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_env: config.token_env.clone(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn endpoint_url(&self, model_name: &str) -> String {
        format!("{}/models/{}", self.base_url, model_name)
    }

    fn resolve_credential(&self, request: &InferenceRequest) -> Result<String> {
        if let Some(token) = request.auth_override() {
            return Ok(token.to_string());
        }
        match env::var(&self.token_env) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::MissingCredential {
                env_var: self.token_env.clone(),
            }),
        }
    }

    /// Starts a forwarding call.
    ///
    /// Credential and model checks happen here, before any I/O. The returned
    /// stream is lazy: the request is sent on first poll, and dropping the
    /// stream releases the underlying connection.
    pub fn forward(&self, request: InferenceRequest) -> Result<ChunkStream> {
        if request.model_name().is_empty() {
            return Err(Error::config("model name must not be empty"));
        }
        let credential = self.resolve_credential(&request)?;

        let url = self.endpoint_url(request.model_name());
        let stream = request.is_stream();
        let body = RequestBody::from(request);
        let sessions = Arc::clone(&self.sessions);

        Ok(boxed(try_stream! {
            let session = sessions.acquire()?;
            debug!("Forwarding to {} (stream: {}, session: {})", url, stream, session.id());

            let response = session
                .client()
                .post(&url)
                .bearer_auth(&credential)
                .json(&body)
                .send()
                .await?;

            if stream {
                let response = ensure_ok(response).await?;
                let bytes = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
                let mut frames = StreamReader::new(bytes).split(b'\n');
                let mut produced = 0usize;

                while let Some(raw) = frames
                    .next_segment()
                    .await
                    .map_err(|e| Error::transport(e.to_string()))?
                {
                    if let Some(chunk) = decode_frame(&raw)? {
                        produced += 1;
                        yield chunk;
                    }
                }
                debug!("Stream from {} ended after {} chunks", url, produced);
            } else {
                let text = read_ok_body(response).await?;
                let chunk: ResponseChunk = serde_json::from_str(&text)?;
                yield chunk;
            }
        }))
    }

    /// Like [`forward`](Self::forward), but ends with [`Error::Cancelled`] as
    /// soon as `cancel` fires. The in-flight request is dropped at that point.
    pub fn forward_with_cancel(
        &self,
        request: InferenceRequest,
        cancel: CancellationToken,
    ) -> Result<ChunkStream> {
        let mut inner = self.forward(request)?;

        Ok(boxed(try_stream! {
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(Error::Cancelled),
                    item = inner.next() => Ok(item),
                };
                match next? {
                    Some(item) => {
                        let chunk = item?;
                        yield chunk;
                    }
                    None => break,
                }
            }
        }))
    }
}

/// Drains a stream into memory, failing on the first error.
pub async fn collect(stream: ChunkStream) -> Result<Vec<ResponseChunk>> {
    stream.try_collect().await
}

fn boxed<S>(stream: S) -> ChunkStream
where
    S: Stream<Item = Result<ResponseChunk>> + Send + 'static,
{
    Box::pin(stream)
}

async fn ensure_ok(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status() == StatusCode::OK {
        return Ok(response);
    }
    Err(endpoint_failure(response).await)
}

async fn read_ok_body(response: reqwest::Response) -> Result<String> {
    if response.status() == StatusCode::OK {
        return Ok(response.text().await?);
    }
    Err(endpoint_failure(response).await)
}

async fn endpoint_failure(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return e.into(),
    };
    warn!("forward: http status {}, response text was:\n{}", status, text);
    Error::endpoint(status, &text)
}
