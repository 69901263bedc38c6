//! reqwest-backed implementation of [`PostsApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::transport::{PostsApi, TransportError};
use crate::config::ApiSettings;
use crate::domain::posts::{Comment, NewPost, Post, PostId, PostPatch, UserId};
use crate::infra::error::InfraError;
use postboard_api_types::PostCreateRequest;

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base: Url,
    user_id: UserId,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration, user_id: UserId) -> Result<Self, InfraError> {
        let base = normalize_base(base_url)?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::configuration(format!("failed to build client: {err}")))?;
        Ok(Self {
            client,
            base,
            user_id,
        })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, InfraError> {
        Self::new(settings.base_url.as_str(), settings.timeout, settings.user_id)
    }

    pub fn user_agent() -> &'static str {
        concat!("postboard/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base.join(path).map_err(TransportError::from_request)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, TransportError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    fn with_json<B: Serialize>(builder: RequestBuilder, body: &B) -> RequestBuilder {
        builder
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .json(body)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, TransportError> {
        let resp = builder.send().await.map_err(map_reqwest)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
        let bytes = resp.bytes().await.map_err(map_reqwest)?;
        serde_json::from_slice(&bytes).map_err(TransportError::from_decode)
    }
}

#[async_trait]
impl PostsApi for HttpClient {
    #[instrument(skip(self), err)]
    async fn get_posts(&self) -> Result<Vec<Post>, TransportError> {
        let resp = Self::send(self.request(Method::GET, "posts")?).await?;
        let posts: Vec<Post> = Self::decode(resp).await?;
        debug!(count = posts.len(), "Fetched posts");
        Ok(posts)
    }

    #[instrument(skip(self, post), err)]
    async fn create_post(&self, post: NewPost) -> Result<Post, TransportError> {
        let body = PostCreateRequest::new(post, self.user_id);
        let builder = Self::with_json(self.request(Method::POST, "posts")?, &body);
        Self::decode(Self::send(builder).await?).await
    }

    #[instrument(skip(self, post), fields(post_id = post.id), err)]
    async fn update_post(&self, post: Post) -> Result<Post, TransportError> {
        let path = format!("posts/{}", post.id);
        let builder = Self::with_json(self.request(Method::PUT, &path)?, &post);
        Self::decode(Self::send(builder).await?).await
    }

    #[instrument(skip(self, patch), err)]
    async fn patch_post(&self, id: PostId, patch: PostPatch) -> Result<PostPatch, TransportError> {
        let path = format!("posts/{id}");
        let builder = Self::with_json(self.request(Method::PATCH, &path)?, &patch);
        Self::decode(Self::send(builder).await?).await
    }

    #[instrument(skip(self), err)]
    async fn delete_post(&self, id: PostId) -> Result<(), TransportError> {
        let path = format!("posts/{id}");
        Self::send(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get_comments(&self, post_id: PostId) -> Result<Vec<Comment>, TransportError> {
        let path = format!("posts/{post_id}/comments");
        let resp = Self::send(self.request(Method::GET, &path)?).await?;
        Self::decode(resp).await
    }
}

/// Parse the base URL and make sure relative joins stay below its path.
fn normalize_base(base_url: &str) -> Result<Url, InfraError> {
    let mut base = Url::parse(base_url)
        .map_err(|err| InfraError::configuration(format!("invalid api base url: {err}")))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(InfraError::configuration(format!(
            "unsupported api url scheme `{}`",
            base.scheme()
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn map_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::from_decode(err)
    } else {
        TransportError::from_request(err)
    }
}
