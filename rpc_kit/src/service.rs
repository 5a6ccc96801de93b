use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use validator::Validate;

use crate::context::Context;
use crate::docs::Describe;
use crate::error::check_route_name;
use crate::method::MethodDescriptor;
use crate::status::Status;

/// A service object whose methods can be exposed as RPC endpoints.
///
/// `#[rpc_service]` implements this for an inherent `impl` block by
/// registering every method shaped
///
/// ```text
/// pub async fn name(&self, ctx: Context, input: In) -> (Option<Out>, Status)
/// ```
///
/// It can also be implemented by hand with [`Methods::register`].
pub trait RpcService: Send + Sync + Sized + 'static {
    /// First path segment of every route of this service.
    fn service_name() -> &'static str;

    fn methods(methods: &mut Methods<Self>);
}

/// Collects the method descriptors of one service instance.
pub struct Methods<S> {
    service: Arc<S>,
    entries: BTreeMap<String, MethodDescriptor>,
}

impl<S: Send + Sync + 'static> Methods<S> {
    pub(crate) fn new(service: Arc<S>) -> Self {
        Self {
            service,
            entries: BTreeMap::new(),
        }
    }

    /// Registers `f` under `name`. The input and output shapes are captured
    /// from `f`'s signature.
    ///
    /// A name that cannot be a route segment is skipped; registering a name
    /// twice keeps the latest handler.
    pub fn register<In, Out, F, Fut>(&mut self, name: &str, f: F) -> &mut Self
    where
        In: DeserializeOwned + Validate + Describe + Send + 'static,
        Out: Serialize + Describe + Send + 'static,
        F: Fn(Arc<S>, Context, In) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = (Option<Out>, Status)> + Send + 'static,
    {
        if let Err(err) = check_route_name(name) {
            warn!(error = %err, "skipping method");
            return self;
        }
        let descriptor = MethodDescriptor::new(name.to_string(), Arc::clone(&self.service), f);
        debug!(
            method = name,
            input = descriptor.input_type(),
            output = descriptor.output_type(),
            "registered rpc method"
        );
        if self.entries.insert(name.to_string(), descriptor).is_some() {
            warn!(method = name, "method registered twice; keeping the latest");
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_descriptors(self) -> BTreeMap<String, MethodDescriptor> {
        self.entries
    }
}
