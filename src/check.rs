//! Check context and contract (C7): the interface every check satisfies,
//! plus a string-keyed registry for building a pipeline by check id.
//!
//! Re-architected per the closed-variant-plus-registry design: a check is
//! an object with a stable name and a single `run` capability, rather than
//! the source's ad-hoc duck-typed objects.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::model::{CheckContext, CheckResult};

type BoxedCheckFuture<'a> = Pin<Box<dyn Future<Output = CheckResult> + Send + 'a>>;

/// An independent validator with a stable name and a single asynchronous
/// operation returning findings and a status.
///
/// Implementors must not mutate the context, the configuration, or shared
/// state other than their own cache partition (enforced by convention: the
/// context is handed by shared reference). A check should return
/// `Status::Skipped` rather than `Status::Pass` when it has no relevant
/// work, so reporting can distinguish the two. A panic inside `run` is
/// caught by the scheduler (via `tokio::task::JoinSet`), not here.
pub trait Check: Send + Sync {
    /// Display name, used as the check result's `name` and as the default
    /// registry id.
    fn name(&self) -> &str;

    fn run<'a>(&'a self, ctx: &'a CheckContext) -> BoxedCheckFuture<'a>;
}

/// Maps a string identifier to a constructor, so a `PipelineConfig` can be
/// built by name without runtime type reflection.
#[derive(Default, Clone)]
pub struct Registry {
    constructors: HashMap<String, Arc<dyn Fn() -> Arc<dyn Check> + Send + Sync>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, id: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<dyn Check> + Send + Sync + 'static,
    {
        self.constructors.insert(id.into(), Arc::new(constructor));
    }

    pub fn build(&self, id: &str) -> Option<Arc<dyn Check>> {
        self.constructors.get(id).map(|ctor| ctor())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.constructors.contains_key(id)
    }

    /// Merges another registry's entries into this one, the other's
    /// entries winning on id collision.
    pub fn merge(&mut self, other: Registry) {
        self.constructors.extend(other.constructors);
    }
}
