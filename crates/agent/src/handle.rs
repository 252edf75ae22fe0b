//! Agent handle: the reasoner, tools and limits bundled for reuse.
//!
//! [`AgentHandle`] is built once and answers any number of queries, from any
//! number of tasks, without sharing state between them. [`SharedAgent`]
//! defers that build until the first query and guarantees that concurrent
//! first callers all receive the same handle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use billwise_config::AppConfig;
use billwise_core::error::{Error, Result};
use billwise_core::reasoner::Reasoner;
use billwise_core::tool::ToolRegistry;
use billwise_tools::BillStore;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::loop_runner::{AgentLoop, AgentOutcome, LoopSettings};

pub struct AgentHandle {
    agent_loop: AgentLoop,
}

impl AgentHandle {
    pub fn new(reasoner: Arc<dyn Reasoner>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            agent_loop: AgentLoop::new(reasoner, tools),
        }
    }

    /// Build the configured reasoner and the bill tools over the configured data.
    ///
    /// With no `data.bills_path` the tools run over an empty store.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let reasoner = billwise_providers::build_from_config(config).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;

        let store = match &config.data.bills_path {
            Some(path) => BillStore::load(path).map_err(|e| Error::Config {
                message: e.to_string(),
            })?,
            None => {
                warn!("No bill data configured (data.bills_path); lookups will find nothing");
                BillStore::empty()
            }
        };

        let registry = billwise_tools::default_registry(Arc::new(store));
        info!(
            reasoner = reasoner.name(),
            tools = registry.len(),
            "Agent handle built"
        );

        Ok(Self::new(reasoner, Arc::new(registry)).with_settings(LoopSettings::from(&config.agent)))
    }

    pub fn with_settings(mut self, settings: LoopSettings) -> Self {
        self.agent_loop = self.agent_loop.with_settings(settings);
        self
    }

    pub fn with_max_turns(self, max_turns: u32) -> Self {
        let settings = LoopSettings {
            max_turns,
            ..self.settings().clone()
        };
        self.with_settings(settings)
    }

    pub fn with_reasoning_timeout(self, timeout: Duration) -> Self {
        let settings = LoopSettings {
            reasoning_timeout: timeout,
            ..self.settings().clone()
        };
        self.with_settings(settings)
    }

    pub fn with_tool_timeout(self, timeout: Duration) -> Self {
        let settings = LoopSettings {
            tool_timeout: timeout,
            ..self.settings().clone()
        };
        self.with_settings(settings)
    }

    pub fn settings(&self) -> &LoopSettings {
        self.agent_loop.settings()
    }

    pub fn reasoner_name(&self) -> &str {
        self.agent_loop.reasoner().name()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.agent_loop
            .tools()
            .names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Answer `query` with a single final text.
    pub async fn ask(&self, query: &str) -> Result<String> {
        self.ask_detailed(query).await.map(|outcome| outcome.answer)
    }

    /// Answer `query`, also returning the transcript and turn count.
    pub async fn ask_detailed(&self, query: &str) -> Result<AgentOutcome> {
        self.agent_loop.run(query).await
    }
}

type Factory = Box<dyn Fn() -> BoxFuture<'static, Result<AgentHandle>> + Send + Sync>;

/// Lazily built, shared [`AgentHandle`].
///
/// A failed build leaves the cell empty, so a later call retries.
pub struct SharedAgent {
    cell: OnceCell<Arc<AgentHandle>>,
    factory: Factory,
}

impl SharedAgent {
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AgentHandle>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(move || factory().boxed()),
        }
    }

    pub fn from_config(config: AppConfig) -> Self {
        let config = Arc::new(config);
        Self::new(move || {
            let config = config.clone();
            async move { AgentHandle::from_config(&config) }
        })
    }

    /// The handle, building it on first use.
    pub async fn get(&self) -> Result<Arc<AgentHandle>> {
        self.cell
            .get_or_try_init(|| async { (self.factory)().await.map(Arc::new) })
            .await
            .cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn ask(&self, query: &str) -> Result<String> {
        self.get().await?.ask(query).await
    }
}
