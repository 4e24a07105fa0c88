//! REST implementation of the record gateway.
//!
//! Speaks the hosted data service's REST dialect: collections are routes,
//! row filters are query parameters (`id=eq.<id>`), and writes return the
//! affected rows when asked via `Prefer: return=representation`. Responses
//! to single-row operations are arrays; an empty array on `get`/`update`
//! means the row does not exist.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::BackendConfig;
use crate::content::Record;
use crate::error::GatewayError;

use super::gateway::{Identity, RecordGateway};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway over the hosted backend's REST endpoint.
///
/// One instance serves every collection; the collection route is taken
/// from the record type at each call.
#[derive(Clone)]
pub struct RestGateway {
  http: reqwest::Client,
  base: Url,
}

impl RestGateway {
  pub fn new(
    backend: &BackendConfig,
    api_key: String,
    token: Option<String>,
  ) -> color_eyre::Result<Self> {
    use color_eyre::eyre::eyre;

    let base = Url::parse(&backend.url)
      .map_err(|e| eyre!("Invalid backend url {}: {}", backend.url, e))?;

    if base.cannot_be_a_base() {
      return Err(eyre!("Backend url {} cannot carry collection routes", backend.url));
    }

    let mut headers = HeaderMap::new();
    let mut api_key = HeaderValue::from_str(&api_key)
      .map_err(|e| eyre!("Backend API key is not a valid header value: {}", e))?;
    api_key.set_sensitive(true);
    headers.insert("apikey", api_key);

    if let Some(token) = token {
      let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| eyre!("Service token is not a valid header value: {}", e))?;
      bearer.set_sensitive(true);
      headers.insert(AUTHORIZATION, bearer);
    }

    let http = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .default_headers(headers)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base })
  }

  fn collection_url(&self, collection: &str) -> Result<Url, GatewayError> {
    let mut url = self.base.clone();
    {
      let mut segments = url
        .path_segments_mut()
        .map_err(|_| GatewayError::Connectivity("backend url cannot be a base".to_string()))?;
      segments.pop_if_empty().push(collection);
    }
    Ok(url)
  }

  fn row_url(&self, collection: &str, id: &str) -> Result<Url, GatewayError> {
    let mut url = self.collection_url(collection)?;
    url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
    Ok(url)
  }
}

#[async_trait]
impl<T: Record> RecordGateway<T> for RestGateway {
  async fn list(&self) -> Result<Vec<T>, GatewayError> {
    let mut url = self.collection_url(T::collection())?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("order", "created_at.desc");

    debug!(collection = T::collection(), "Listing records");

    let response = self.http.get(url).send().await?;
    decode_rows(response).await
  }

  async fn get(&self, id: &str) -> Result<T, GatewayError> {
    let mut url = self.row_url(T::collection(), id)?;
    url.query_pairs_mut().append_pair("select", "*");

    let response = self.http.get(url).send().await?;
    let rows: Vec<T> = decode_rows(response).await?;

    rows
      .into_iter()
      .next()
      .ok_or_else(|| GatewayError::NotFound(id.to_string()))
  }

  async fn create(&self, draft: &T::Draft, actor: Option<&Identity>) -> Result<T, GatewayError> {
    let url = self.collection_url(T::collection())?;
    let body = stamped_body(draft, actor)?;

    debug!(collection = T::collection(), "Creating record");

    let response = self
      .http
      .post(url)
      .header("Prefer", "return=representation")
      .json(&body)
      .send()
      .await?;

    let rows: Vec<T> = decode_rows(response).await?;
    rows
      .into_iter()
      .next()
      .ok_or_else(|| GatewayError::Validation("backend returned no created record".to_string()))
  }

  async fn update(
    &self,
    id: &str,
    patch: &T::Patch,
    actor: Option<&Identity>,
  ) -> Result<T, GatewayError> {
    let url = self.row_url(T::collection(), id)?;
    let body = stamped_body(patch, actor)?;

    debug!(collection = T::collection(), id, "Updating record");

    let response = self
      .http
      .patch(url)
      .header("Prefer", "return=representation")
      .json(&body)
      .send()
      .await?;

    let rows: Vec<T> = decode_rows(response).await?;
    rows
      .into_iter()
      .next()
      .ok_or_else(|| GatewayError::NotFound(id.to_string()))
  }

  async fn delete(&self, id: &str) -> Result<bool, GatewayError> {
    let url = self.row_url(T::collection(), id)?;

    debug!(collection = T::collection(), id, "Deleting record");

    let response = self
      .http
      .delete(url)
      .header("Prefer", "return=representation")
      .send()
      .await?;

    // The representation holds the deleted rows; empty means the id was
    // already absent, which is not an error.
    let rows: Vec<Value> = decode_rows(response).await?;
    Ok(!rows.is_empty())
  }
}

/// Decode a response into rows, mapping non-success statuses to tagged
/// gateway errors.
async fn decode_rows<R: DeserializeOwned>(response: Response) -> Result<Vec<R>, GatewayError> {
  let status = response.status();
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    return Err(classify_status(status, &body));
  }

  response.json::<Vec<R>>().await.map_err(GatewayError::from)
}

/// Map a non-success HTTP response to a tagged gateway error.
fn classify_status(status: StatusCode, body: &str) -> GatewayError {
  let message = if body.is_empty() {
    status.to_string()
  } else {
    format!("{}: {}", status, body)
  };

  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Authorization(message),
    StatusCode::NOT_FOUND => GatewayError::NotFound(message),
    StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => GatewayError::Validation(message),
    _ => GatewayError::Connectivity(message),
  }
}

/// Serialize a draft or patch, stamping the actor as owner when present.
fn stamped_body<D: Serialize>(body: &D, actor: Option<&Identity>) -> Result<Value, GatewayError> {
  let mut body = serde_json::to_value(body)
    .map_err(|e| GatewayError::Validation(format!("unserializable record: {}", e)))?;

  if let (Some(actor), Some(map)) = (actor, body.as_object_mut()) {
    map.insert("owner".to_string(), Value::String(actor.subject.clone()));
  }

  Ok(body)
}
