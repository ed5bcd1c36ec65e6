//! Collaborator boundary
//!
//! [`SubmitHandler`] is the only channel through which the palette calls
//! back into the rest of the application (entry CRUD, auth). Handlers may
//! fail; the core never retries or swallows those failures.

use crate::error::ExecuteError;
use crate::params::{ParamData, ParamSpec};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Receives submitted parameter data
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    /// Perform the command's side effect
    async fn submit(&self, data: ParamData) -> anyhow::Result<()>;
}

/// Produces a parameter spec on demand
#[async_trait]
pub trait ParamsProducer: Send + Sync {
    /// Produce the parameter declarations (may suspend)
    async fn produce(&self) -> anyhow::Result<ParamSpec>;
}

struct FnSubmit<F>(F);

#[async_trait]
impl<F, Fut> SubmitHandler for FnSubmit<F>
where
    F: Fn(ParamData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn submit(&self, data: ParamData) -> anyhow::Result<()> {
        (self.0)(data).await
    }
}

struct SyncSubmit<F>(F);

#[async_trait]
impl<F> SubmitHandler for SyncSubmit<F>
where
    F: Fn(ParamData) -> anyhow::Result<()> + Send + Sync,
{
    async fn submit(&self, data: ParamData) -> anyhow::Result<()> {
        (self.0)(data)
    }
}

struct FnParams<F>(F);

#[async_trait]
impl<F, Fut> ParamsProducer for FnParams<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<ParamSpec>> + Send + 'static,
{
    async fn produce(&self) -> anyhow::Result<ParamSpec> {
        (self.0)().await
    }
}

/// Wrap an async closure as a submit handler
pub fn submit_fn<F, Fut>(handler: F) -> Arc<dyn SubmitHandler>
where
    F: Fn(ParamData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnSubmit(handler))
}

/// Wrap a synchronous closure as a submit handler
pub fn sync_submit_fn<F>(handler: F) -> Arc<dyn SubmitHandler>
where
    F: Fn(ParamData) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(SyncSubmit(handler))
}

/// Wrap an async closure as a params producer
pub fn params_fn<F, Fut>(producer: F) -> Arc<dyn ParamsProducer>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<ParamSpec>> + Send + 'static,
{
    Arc::new(FnParams(producer))
}

/// Where a command's parameter spec comes from
#[derive(Clone)]
pub enum ParamSource {
    /// Spec known at registration
    Static(ParamSpec),
    /// Spec produced when the command is selected
    Deferred(Arc<dyn ParamsProducer>),
}

impl ParamSource {
    /// Resolve to a concrete spec
    ///
    /// # Errors
    /// - `ExecuteError::Params` if the producer fails
    pub async fn resolve(&self, command: &str) -> Result<ParamSpec, ExecuteError> {
        match self {
            Self::Static(spec) => Ok(spec.clone()),
            Self::Deferred(producer) => {
                producer
                    .produce()
                    .await
                    .map_err(|source| ExecuteError::Params {
                        command: command.to_string(),
                        source,
                    })
            }
        }
    }

    /// Whether resolution may suspend
    #[inline]
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl Default for ParamSource {
    fn default() -> Self {
        Self::Static(ParamSpec::new())
    }
}

impl From<ParamSpec> for ParamSource {
    fn from(spec: ParamSpec) -> Self {
        Self::Static(spec)
    }
}

impl fmt::Debug for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(spec) => f.debug_tuple("Static").field(spec).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
