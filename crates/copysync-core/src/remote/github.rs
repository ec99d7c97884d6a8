//! GitHub Contents API adapter
//!
//! Reads: `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}`. A 200
//! carries base64 content and the blob `sha`; a 404 means the file does
//! not exist yet.
//!
//! Writes: `PUT` to the same URL with `{message, content, branch, sha?}`.
//! `sha` is only sent when updating an existing file.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{FileContent, RemoteError, RemoteFile, RemoteFileStore};
use crate::models::RemoteConfig;

/// Request timeout in seconds
const REQUEST_TIMEOUT: u64 = 30;

const USER_AGENT: &str = concat!("copysync/", env!("CARGO_PKG_VERSION"));

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub Contents API client
pub struct GitHubContents {
    client: Client,
    api_url: String,
}

/// Relevant fields of a contents response
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    /// `base64`, or `none` for files too large to inline
    #[serde(default)]
    encoding: Option<String>,
}

impl ContentsResponse {
    fn decode(&self, full_path: &str) -> Result<FileContent, RemoteError> {
        match self.encoding.as_deref() {
            None | Some("base64") => decode_content(full_path, &self.content),
            Some(other) => Err(RemoteError::Decode {
                path: full_path.to_string(),
                details: format!("unsupported content encoding '{}'", other),
            }),
        }
    }
}

/// Body of a create-or-update request
#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

impl GitHubContents {
    /// Create a client for the given API base URL (e.g. `https://api.github.com`)
    pub fn new(api_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// URL of a page file in the repository's contents namespace
    pub fn contents_url(&self, config: &RemoteConfig, path: &str) -> Result<Url, RemoteError> {
        let invalid = |details: &str| RemoteError::InvalidUrl {
            url: self.api_url.clone(),
            details: details.to_string(),
        };

        let mut url = Url::parse(&self.api_url).map_err(|e| invalid(&e.to_string()))?;
        let full_path = config.full_path(path);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid("URL cannot have a path"))?;
            segments
                .pop_if_empty()
                .extend(["repos", config.owner.as_str(), config.repo.as_str(), "contents"])
                .extend(full_path.split('/').filter(|s| !s.is_empty()));
        }
        if !config.branch.is_empty() {
            url.query_pairs_mut().append_pair("ref", &config.branch);
        }
        Ok(url)
    }

    /// Fetch the contents entry, `None` on 404
    async fn get_contents(
        &self,
        config: &RemoteConfig,
        path: &str,
    ) -> Result<Option<ContentsResponse>, RemoteError> {
        let url = self.contents_url(config, path)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&config.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} does not exist yet", config.full_path(path));
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(Some(response.json::<ContentsResponse>().await?))
    }
}

#[async_trait]
impl RemoteFileStore for GitHubContents {
    async fn read_file(
        &self,
        config: &RemoteConfig,
        path: &str,
    ) -> Result<RemoteFile, RemoteError> {
        match self.get_contents(config, path).await? {
            Some(entry) => Ok(RemoteFile {
                content: entry.decode(&config.full_path(path))?,
                sha: Some(entry.sha),
            }),
            None => Ok(RemoteFile::default()),
        }
    }

    async fn write_file(
        &self,
        config: &RemoteConfig,
        path: &str,
        content: &FileContent,
        sha: Option<String>,
    ) -> Result<(), RemoteError> {
        let sha = match sha {
            Some(sha) => Some(sha),
            None => self.get_contents(config, path).await?.map(|entry| entry.sha),
        };

        let body = PutContents {
            message: format!("Update {} from copysync", path),
            content: encode_content(content)?,
            branch: &config.branch,
            sha,
        };

        let url = self.contents_url(config, path)?;
        debug!("PUT {} (update: {})", url, body.sha.is_some());

        let response = self
            .client
            .put(url)
            .bearer_auth(&config.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        info!("Wrote {} ({} keys)", config.full_path(path), content.len());
        Ok(())
    }
}

async fn status_error(response: Response) -> RemoteError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RemoteError::Status { status, body }
}

/// Serialize a key -> text map as pretty JSON and base64-encode it
pub fn encode_content(content: &FileContent) -> Result<String, RemoteError> {
    let json = serde_json::to_string_pretty(content).map_err(|e| RemoteError::Decode {
        path: String::new(),
        details: e.to_string(),
    })?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decode base64 file content (line-wrapped or not) into a key -> text map
pub fn decode_content(path: &str, encoded: &str) -> Result<FileContent, RemoteError> {
    let decode_error = |details: String| RemoteError::Decode {
        path: path.to_string(),
        details,
    };

    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| decode_error(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?;
    if text.trim().is_empty() {
        return Ok(FileContent::new());
    }
    serde_json::from_str(&text).map_err(|e| decode_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn config() -> RemoteConfig {
        RemoteConfig {
            owner: "acme".to_string(),
            repo: "site".to_string(),
            branch: "main".to_string(),
            token: "ghp_token".to_string(),
            base_path: "copy/".to_string(),
        }
    }

    fn content(pairs: &[(&str, &str)]) -> FileContent {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_contents_url() {
        let client = GitHubContents::new("https://api.github.com").unwrap();
        let url = client.contents_url(&config(), "home.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/site/contents/copy/home.json?ref=main"
        );
    }

    #[test]
    fn test_contents_url_enterprise_base() {
        let client = GitHubContents::new("https://git.example.com/api/v3/").unwrap();
        let url = client.contents_url(&config(), "pages/home.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://git.example.com/api/v3/repos/acme/site/contents/copy/pages/home.json?ref=main"
        );
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let client = GitHubContents::new("https://api.github.com").unwrap();
        let url = client.contents_url(&config(), "about us.json").unwrap();
        assert!(url.path().ends_with("/contents/copy/about%20us.json"));
    }

    #[test]
    fn test_contents_url_rejects_bad_base() {
        let client = GitHubContents::new("not a url").unwrap();
        let err = client.contents_url(&config(), "home.json").unwrap_err();
        assert!(matches!(err, RemoteError::InvalidUrl { .. }));
    }

    #[test]
    fn test_encode_content_is_pretty_sorted_json() {
        let encoded = encode_content(&content(&[("b", "2"), ("a", "1")])).unwrap();
        let json = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(json, "{\n  \"a\": \"1\",\n  \"b\": \"2\"\n}");
    }

    #[test]
    fn test_decode_line_wrapped_content() {
        let encoded = encode_content(&content(&[("hero.title", "Grüße aus Köln")])).unwrap();
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{}\n{}\n", head, tail);

        let decoded = decode_content("copy/home.json", &wrapped).unwrap();
        assert_eq!(decoded["hero.title"], "Grüße aus Köln");
    }

    #[test]
    fn test_decode_empty_file() {
        assert!(decode_content("copy/home.json", "").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_non_string_values() {
        let encoded = STANDARD.encode(r#"{"a": {"nested": true}}"#);
        let err = decode_content("copy/home.json", &encoded).unwrap_err();
        assert!(matches!(err, RemoteError::Decode { ref path, .. } if path == "copy/home.json"));
    }

    #[test]
    fn test_put_body_omits_sha_for_new_files() {
        let body = PutContents {
            message: "Update home.json from copysync".to_string(),
            content: "e30=".to_string(),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");

        let body = PutContents {
            sha: Some("abc123".to_string()),
            ..body
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sha"], "abc123");
    }

    // ==================== HTTP behaviour ====================

    /// A request as the local server received it
    #[derive(Debug)]
    struct Seen {
        method: String,
        target: String,
        head: String,
        body: String,
    }

    impl Seen {
        fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    /// Serve `responses` in order, one connection each, and hand back
    /// the requests once they are all answered
    async fn local_server(
        responses: Vec<(u16, String)>,
    ) -> (GitHubContents, tokio::task::JoinHandle<Vec<Seen>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                seen.push(read_request(&mut stream).await);
                let reply = format!(
                    "HTTP/1.1 {} Local\r\n\
                     content-type: application/json\r\n\
                     content-length: {}\r\n\
                     connection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(reply.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            seen
        });

        let client = GitHubContents::new(format!("http://{}", addr)).unwrap();
        (client, handle)
    }

    async fn read_request(stream: &mut TcpStream) -> Seen {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before end of headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before end of body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut request_line = head.split_whitespace();
        let method = request_line.next().unwrap_or_default().to_string();
        let target = request_line.next().unwrap_or_default().to_string();
        let body = String::from_utf8_lossy(&buf[head_end..head_end + content_length]).into_owned();
        Seen {
            method,
            target,
            head,
            body,
        }
    }

    fn contents_json(sha: &str, file: &FileContent) -> String {
        serde_json::json!({
            "sha": sha,
            "content": encode_content(file).unwrap(),
            "encoding": "base64",
        })
        .to_string()
    }

    const HOME_PATH: &str = "/repos/acme/site/contents/copy/home.json";

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let (client, server) =
            local_server(vec![(404, r#"{"message":"Not Found"}"#.to_string())]).await;

        let file = client.read_file(&config(), "home.json").await.unwrap();
        assert_eq!(file, RemoteFile::default());

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].target, format!("{}?ref=main", HOME_PATH));
        assert!(seen[0]
            .head
            .to_lowercase()
            .contains("authorization: bearer ghp_token"));
    }

    #[tokio::test]
    async fn test_read_existing_file() {
        let remote = content(&[("hero.title", "Welcome")]);
        let (client, server) = local_server(vec![(200, contents_json("abc123", &remote))]).await;

        let file = client.read_file(&config(), "home.json").await.unwrap();
        assert_eq!(file.content, remote);
        assert_eq!(file.sha.as_deref(), Some("abc123"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_error_status_carries_body() {
        let (client, server) = local_server(vec![(500, "boom".to_string())]).await;

        let err = client.read_file(&config(), "home.json").await.unwrap_err();
        assert!(
            matches!(err, RemoteError::Status { status: 500, ref body } if body == "boom"),
            "got {:?}",
            err
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_rejects_file_without_inline_content() {
        let body = r#"{"sha":"abc123","content":"","encoding":"none"}"#.to_string();
        let (client, server) = local_server(vec![(200, body)]).await;

        let err = client.read_file(&config(), "home.json").await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode { ref path, .. } if path == "copy/home.json"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_write_new_file_omits_sha() {
        let (client, server) = local_server(vec![
            (404, r#"{"message":"Not Found"}"#.to_string()),
            (201, "{}".to_string()),
        ])
        .await;

        let file = content(&[("hero.title", "Welcome")]);
        client
            .write_file(&config(), "home.json", &file, None)
            .await
            .unwrap();

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[1].method, "PUT");
        assert!(seen[1].target.starts_with(HOME_PATH));

        let put = seen[1].json();
        assert!(put.get("sha").is_none());
        assert_eq!(put["branch"], "main");
        assert_eq!(put["message"], "Update home.json from copysync");
        let sent = decode_content("copy/home.json", put["content"].as_str().unwrap()).unwrap();
        assert_eq!(sent, file);
    }

    #[tokio::test]
    async fn test_write_existing_file_sends_current_sha() {
        let current = content(&[("hero.title", "Old")]);
        let (client, server) = local_server(vec![
            (200, contents_json("abc123", &current)),
            (200, "{}".to_string()),
        ])
        .await;

        client
            .write_file(&config(), "home.json", &content(&[("hero.title", "New")]), None)
            .await
            .unwrap();

        let seen = server.await.unwrap();
        assert_eq!(seen[1].method, "PUT");
        assert_eq!(seen[1].json()["sha"], "abc123");
    }

    #[tokio::test]
    async fn test_write_stops_when_sha_lookup_fails() {
        let (client, server) = local_server(vec![(500, "boom".to_string())]).await;

        let err = client
            .write_file(&config(), "home.json", &content(&[("a", "1")]), None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));

        // No PUT after the failed lookup
        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "GET");
    }

    #[tokio::test]
    async fn test_write_with_stale_sha_is_rejected() {
        let (client, server) = local_server(vec![(
            409,
            r#"{"message":"home.json does not match stale"}"#.to_string(),
        )])
        .await;

        let err = client
            .write_file(
                &config(),
                "home.json",
                &content(&[("a", "1")]),
                Some("stale".to_string()),
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(matches!(
            err,
            RemoteError::Status { ref body, .. } if body.contains("does not match")
        ));

        // A given sha skips the lookup
        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "PUT");
        assert_eq!(seen[0].json()["sha"], "stale");
    }
}
