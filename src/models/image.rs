//! Image handle and collection

use std::sync::Arc;

use serde_json::Value;

use super::resource::Resource;
use crate::api::stream::build_image_id;
use crate::api::{
    ApiClient, BuildOptions, Identifier, ListImagesOptions, ProgressEvent, PullOptions,
    PushOptions, RemoveImageOptions,
};
use crate::utils::parse_repository_tag;
use crate::Result;

const UNTAGGED: &str = "<none>:<none>";

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    resource: Resource,
}

impl Image {
    pub(crate) fn new(client: Arc<ApiClient>, attrs: Value) -> Self {
        Self {
            resource: Resource::new(client, attrs, "Id"),
        }
    }

    pub fn id(&self) -> &str {
        self.resource.id()
    }

    /// `sha256:` plus the first 10 hex digits
    pub fn short_id(&self) -> &str {
        self.resource.short_id()
    }

    pub fn attrs(&self) -> &Value {
        self.resource.attrs()
    }

    pub fn labels(&self) -> Option<&Value> {
        self.resource.attr("/Config/Labels")
    }

    /// `repository:tag` references, untagged placeholders dropped
    pub fn tags(&self) -> Vec<&str> {
        self.resource
            .attr("/RepoTags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .filter(|t| *t != UNTAGGED)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn history(&self) -> Result<Value> {
        self.resource.client().history(self)
    }

    pub fn reload(&mut self) -> Result<()> {
        let attrs = self.resource.client().inspect_image(self)?;
        self.resource.replace(attrs);
        Ok(())
    }

    pub fn tag(&self, repository: &str, tag: Option<&str>, force: bool) -> Result<bool> {
        self.resource.client().tag(self, repository, tag, force)
    }

    /// Push `repository` after tagging; consumes the whole progress stream
    pub fn push(&self, repository: &str, options: &PushOptions) -> Result<Vec<ProgressEvent>> {
        self.resource.client().push(repository, options)?.finish()
    }

    pub fn remove(&self, options: &RemoveImageOptions) -> Result<()> {
        self.resource.client().remove_image(self, options)
    }
}

impl Identifier for Image {
    fn identifier(&self) -> Option<String> {
        Some(self.id().to_string())
    }
}

#[derive(Clone)]
pub struct ImageCollection {
    client: Arc<ApiClient>,
}

impl ImageCollection {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Build and return the resulting image
    ///
    /// The whole event stream is consumed; an `error` event or a stream
    /// without a success marker is [`crate::Error::Build`].
    pub fn build(&self, options: &BuildOptions) -> Result<Image> {
        let events = self.client.build(options)?;
        let image_id = build_image_id(events)?;
        tracing::info!(image = %image_id, "build finished");
        self.get(image_id.as_str())
    }

    pub fn get(&self, name: &(impl Identifier + ?Sized)) -> Result<Image> {
        let attrs = self.client.inspect_image(name)?;
        Ok(Image::new(self.client.clone(), attrs))
    }

    pub fn list(&self, options: &ListImagesOptions) -> Result<Vec<Image>> {
        let options = ListImagesOptions {
            quiet: false,
            ..options.clone()
        };
        Ok(self
            .client
            .images(&options)?
            .into_iter()
            .map(|attrs| Image::new(self.client.clone(), attrs))
            .collect())
    }

    /// Pull to completion and return the pulled image
    pub fn pull(&self, name: &str, options: &PullOptions) -> Result<Image> {
        self.client.pull(name, options)?.finish()?;
        let (repo, embedded_tag) = parse_repository_tag(name);
        let tag = options
            .tag
            .clone()
            .or(embedded_tag)
            .unwrap_or_else(|| "latest".to_string());
        let separator = if tag.contains(':') { '@' } else { ':' };
        self.get(format!("{}{}{}", repo, separator, tag).as_str())
    }

    pub fn push(&self, repository: &str, options: &PushOptions) -> Result<Vec<ProgressEvent>> {
        self.client.push(repository, options)?.finish()
    }

    pub fn remove(&self, image: &(impl Identifier + ?Sized), options: &RemoveImageOptions) -> Result<()> {
        self.client.remove_image(image, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::{MockTransport, Response};
    use crate::Error;
    use http::StatusCode;
    use serde_json::json;

    fn collection(transport: MockTransport) -> ImageCollection {
        let api = ApiClient::with_transport(Arc::new(transport), &ClientConfig::default()).unwrap();
        ImageCollection::new(Arc::new(api))
    }

    #[test]
    fn test_tags_skip_untagged() {
        let images = collection(MockTransport::new());
        let image = Image::new(
            images.client.clone(),
            json!({"Id": "sha256:aaaa", "RepoTags": ["alpine:3.4", "<none>:<none>"]}),
        );
        assert_eq!(image.tags(), vec!["alpine:3.4"]);
    }

    #[test]
    fn test_build_failure_is_build_error() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(Response::from_bytes(
                StatusCode::OK,
                "{\"stream\":\"Step 1 : FROOM alpine\\n\"}\n{\"error\":\"no such instruction\"}\n",
            ))
        });
        let err = collection(transport)
            .build(&BuildOptions::from_context(vec![1]))
            .unwrap_err();
        assert!(matches!(err, Error::Build(ref m) if m.contains("no such instruction")));
    }

    #[test]
    fn test_pull_returns_tagged_image() {
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send()
            .withf(|req| req.route() == "/v1.24/images/create")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Response::from_bytes(StatusCode::OK, "{\"status\":\"Done\"}")));
        transport
            .expect_send()
            .withf(|req| req.route() == "/v1.24/images/busybox:1.25/json")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Response::json(StatusCode::OK, &json!({"Id": "sha256:bb"}))));

        let image = collection(transport)
            .pull("busybox", &PullOptions::default().with_tag("1.25"))
            .unwrap();
        assert_eq!(image.id(), "sha256:bb");
    }
}
