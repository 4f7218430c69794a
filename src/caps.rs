//! Capabilities document published by the routing service.

use crate::{Error, Result, session::Session};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapsModel {
    pub n_ctx: usize,
    #[serde(default)]
    pub similar_models: Vec<String>,
    #[serde(default)]
    pub supports_tools: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caps {
    pub cloud_name: String,
    pub code_chat_models: HashMap<String, CapsModel>,
    pub code_chat_default_model: String,
    #[serde(default)]
    pub embedding_model: String,
}

impl Caps {
    /// Picks the requested model, or the advertised default when none is given.
    pub fn resolve_model<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|model| !model.is_empty())
            .unwrap_or(self.code_chat_default_model.as_str())
    }

    pub fn n_ctx(&self, model: &str) -> Option<usize> {
        self.code_chat_models.get(model).map(|m| m.n_ctx)
    }
}

pub async fn fetch_caps(session: &Session, base_url: &str) -> Result<Caps> {
    let url = format!("{}/caps", base_url.trim_end_matches('/'));
    debug!("Fetching capabilities from: {}", url);

    let response = session.client().get(&url).send().await?;
    let status = response.status();
    let text = response.text().await?;
    if status != StatusCode::OK {
        warn!("cannot fetch {}: http status {}", url, status.as_u16());
        return Err(Error::endpoint(status.as_u16(), &text));
    }

    Ok(serde_json::from_str(&text)?)
}
