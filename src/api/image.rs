//! Image endpoints

use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::request::{encode_path_segment, resource_path, Identifier, Query};
use super::stream::ProgressStream;
use super::{decode, ApiClient};
use crate::transport::{Body, Request};
use crate::types::Filters;
use crate::utils::{encode_json_header, parse_repository_tag, ByteSize};
use crate::{Error, Result};

const REGISTRY_AUTH_HEADER: &str = "x-registry-auth";
const DEFAULT_TAG: &str = "latest";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListImagesOptions {
    /// Only images with this repository name
    pub name: Option<String>,
    /// Include intermediate layers
    pub all: bool,
    /// Return bare ids
    pub quiet: bool,
    pub filters: Option<Filters>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullOptions {
    /// Overrides any tag or digest embedded in the repository name
    pub tag: Option<String>,
    pub auth_config: Option<Value>,
}

impl PullOptions {
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_auth(mut self, auth_config: Value) -> Self {
        self.auth_config = Some(auth_config);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushOptions {
    pub tag: Option<String>,
    pub auth_config: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveImageOptions {
    pub force: bool,
    pub noprune: bool,
}

/// Build-time resource limits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildLimits {
    pub memory: Option<ByteSize>,
    pub memswap: Option<ByteSize>,
    pub cpushares: Option<i64>,
    pub cpusetcpus: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOptions {
    /// Tarred build context; ignored when `remote` is set
    pub context: Vec<u8>,
    /// Git URL or tarball URL fetched by the daemon
    pub remote: Option<String>,
    pub tag: Option<String>,
    pub quiet: bool,
    pub nocache: bool,
    pub rm: bool,
    pub forcerm: bool,
    pub pull: bool,
    /// Path to the Dockerfile inside the context
    pub dockerfile: Option<String>,
    pub buildargs: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub limits: BuildLimits,
}

impl BuildOptions {
    pub fn from_context(context: Vec<u8>) -> Self {
        Self {
            context,
            ..Default::default()
        }
    }

    pub fn from_remote(remote: impl Into<String>) -> Self {
        Self {
            remote: Some(remote.into()),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_dockerfile(mut self, path: impl Into<String>) -> Self {
        self.dockerfile = Some(path.into());
        self
    }

    pub fn with_buildarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.buildargs.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_nocache(mut self, nocache: bool) -> Self {
        self.nocache = nocache;
        self
    }

    pub fn with_rm(mut self, rm: bool) -> Self {
        self.rm = rm;
        self
    }

    pub fn with_pull(mut self, pull: bool) -> Self {
        self.pull = pull;
        self
    }

    fn to_query(&self, api: &ApiClient) -> Result<Query> {
        if self.remote.is_none() && self.context.is_empty() {
            return Err(Error::InvalidArgument(
                "build needs either a context archive or a remote URL".into(),
            ));
        }

        let mut query = Query::new()
            .opt("t", self.tag.as_deref())
            .opt("remote", self.remote.as_deref())
            .flag("q", self.quiet)
            .flag("nocache", self.nocache)
            .flag("rm", self.rm)
            .flag("forcerm", self.forcerm)
            .flag("pull", self.pull);

        if let Some(ref dockerfile) = self.dockerfile {
            api.require("1.17", "dockerfile")?;
            query = query.param("dockerfile", dockerfile);
        }
        if !self.buildargs.is_empty() {
            api.require("1.21", "buildargs")?;
            query = query.json("buildargs", &self.buildargs)?;
        }
        if !self.labels.is_empty() {
            api.require("1.23", "labels")?;
            query = query.json("labels", &self.labels)?;
        }

        if let Some(ref memory) = self.limits.memory {
            query = query.param("memory", memory.to_bytes()?);
        }
        if let Some(ref memswap) = self.limits.memswap {
            query = query.param("memswap", memswap.to_bytes()?);
        }
        Ok(query
            .opt("cpushares", self.limits.cpushares)
            .opt("cpusetcpus", self.limits.cpusetcpus.as_deref()))
    }
}

impl ApiClient {
    pub fn images(&self, options: &ListImagesOptions) -> Result<Vec<Value>> {
        let query = Query::new()
            .opt("filter", options.name.as_deref())
            .flag("only_ids", options.quiet)
            .flag("all", options.all)
            .filters(options.filters.as_ref());
        let images: Vec<Value> = self.get_json("/images/json", &query)?;
        if options.quiet {
            return Ok(images
                .into_iter()
                .filter_map(|image| image.get("Id").cloned())
                .collect());
        }
        Ok(images)
    }

    pub fn inspect_image(&self, image: &(impl Identifier + ?Sized)) -> Result<Value> {
        let path = resource_path("/images", image, "/json")?;
        self.get_json(&path, &Query::new())
    }

    pub fn history(&self, image: &(impl Identifier + ?Sized)) -> Result<Value> {
        let path = resource_path("/images", image, "/history")?;
        self.get_json(&path, &Query::new())
    }

    /// Tag an image into a repository; true when the daemon answered 201
    pub fn tag(
        &self,
        image: &(impl Identifier + ?Sized),
        repository: &str,
        tag: Option<&str>,
        force: bool,
    ) -> Result<bool> {
        let path = resource_path("/images", image, "/tag")?;
        let query = Query::new()
            .param("repo", repository)
            .opt("tag", tag)
            .flag("force", force);
        let response = self.send(Request::post(self.url_with_query(&path, &query)))?;
        let created = response.status == http::StatusCode::CREATED;
        decode::no_content(response)?;
        Ok(created)
    }

    pub fn remove_image(&self, image: &(impl Identifier + ?Sized), options: &RemoveImageOptions) -> Result<()> {
        let path = resource_path("/images", image, "")?;
        let query = Query::new()
            .flag("force", options.force)
            .flag("noprune", options.noprune);
        self.delete(&path, &query)
    }

    /// Pull an image; progress arrives as events and a failure surfaces as
    /// an error item even after partial progress
    pub fn pull(&self, repository: &str, options: &PullOptions) -> Result<ProgressStream> {
        let (repo, embedded_tag) = parse_repository_tag(repository);
        let tag = options
            .tag
            .clone()
            .or(embedded_tag)
            .unwrap_or_else(|| DEFAULT_TAG.to_string());

        tracing::info!(image = %repo, tag = %tag, "pulling image");

        let query = Query::new().param("fromImage", &repo).param("tag", &tag);
        let mut request = Request::post(self.url_with_query("/images/create", &query)).stream(true);
        if let Some(ref auth) = options.auth_config {
            request = request.header(REGISTRY_AUTH_HEADER, &encode_json_header(auth)?)?;
        }
        Ok(ProgressStream::new(self.send(request)?))
    }

    pub fn push(&self, repository: &str, options: &PushOptions) -> Result<ProgressStream> {
        let (repo, embedded_tag) = parse_repository_tag(repository);
        let tag = options.tag.clone().or(embedded_tag);

        tracing::info!(image = %repo, tag = ?tag, "pushing image");

        let path = format!("/images/{}/push", encode_path_segment(&repo));
        let query = Query::new().opt("tag", tag.as_deref());
        let auth = options.auth_config.clone().unwrap_or_else(|| json!({}));
        let request = Request::post(self.url_with_query(&path, &query))
            .header(REGISTRY_AUTH_HEADER, &encode_json_header(&auth)?)?
            .stream(true);
        Ok(ProgressStream::new(self.send(request)?))
    }

    /// Start a build; feed the events to [`super::stream::build_image_id`]
    /// to obtain the resulting image
    pub fn build(&self, options: &BuildOptions) -> Result<ProgressStream> {
        let query = options.to_query(self)?;

        tracing::info!(tag = ?options.tag, remote = ?options.remote, "building image");

        let mut request = Request::post(self.url_with_query("/build", &query)).stream(true);
        if options.remote.is_none() {
            request = request.body(Body::tar(options.context.clone()));
        }
        Ok(ProgressStream::new(self.send(request)?))
    }
}
