// JSON-over-HTTP plumbing shared by the collaborator clients.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;

const PREVIEW_CHARS: usize = 200;

/// One configured service URL plus the client that talks to it.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    http: reqwest::Client,
    base_url: Url,
}

impl Endpoint {
    pub(crate) fn new(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` below the base URL. An empty path addresses the base
    /// URL itself.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        if path.is_empty() {
            return Ok(self.base_url.clone());
        }
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// The base URL with `id` appended as one escaped path segment.
    pub(crate) fn item_url(&self, id: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_empty(resp).await
    }

    /// DELETE the item `id` below the base URL.
    pub(crate) async fn delete_item(&self, id: &str) -> Result<(), Error> {
        let url = self.item_url(id)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_empty(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(PREVIEW_CHARS).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    let message = if raw.trim().is_empty() {
        status.to_string()
    } else {
        raw.chars().take(PREVIEW_CHARS).collect()
    };

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Error::Authentication { message };
    }

    Error::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn endpoint(raw: &str) -> Endpoint {
        Endpoint::new(raw, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn empty_path_addresses_base_verbatim() {
        let ep = endpoint("http://kiosk.local:8000/api/note");
        assert_eq!(ep.url("").unwrap().as_str(), "http://kiosk.local:8000/api/note");
    }

    #[test]
    fn relative_path_nests_below_base() {
        let ep = endpoint("http://kiosk.local:8000/api/notifications");
        assert_eq!(
            ep.url("42").unwrap().as_str(),
            "http://kiosk.local:8000/api/notifications/42"
        );
    }

    #[test]
    fn item_ids_stay_one_segment() {
        let ep = endpoint("http://kiosk.local:8000/api/notifications/");
        assert_eq!(
            ep.item_url("n1").unwrap().as_str(),
            "http://kiosk.local:8000/api/notifications/n1"
        );
        assert_eq!(
            ep.item_url("../a?b#c").unwrap().as_str(),
            "http://kiosk.local:8000/api/notifications/..%2Fa%3Fb%23c"
        );
    }

    #[test]
    fn host_only_base_joins_from_root() {
        let ep = endpoint("http://hub.local:8123");
        assert_eq!(
            ep.url("/api/states/light.kitchen").unwrap().as_str(),
            "http://hub.local:8123/api/states/light.kitchen"
        );
    }
}
