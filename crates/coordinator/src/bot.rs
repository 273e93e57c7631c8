//! The ResearchBot facade: one `research` entry point over both engines.

use crate::config::{BotConfig, ResearchMode};
use crate::supervisor::DelegationSupervisor;
use researchbot_agents::{CallLimits, Deduplicator, ResearchLoop, RolePipeline};
use researchbot_common::{Embedder, MemoryStore, ResearchRequest, Result};
use researchbot_knowledge::{IngestReport, KnowledgeBase, index_directory};
use researchbot_llm::{LlmClient, build_llm_client};
use researchbot_memory::{EmbeddingService, VectorMemoryStore};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct ResearchBot {
    config: BotConfig,
    llm: Arc<dyn LlmClient>,
    knowledge: Arc<KnowledgeBase>,
    research_loop: ResearchLoop,
    supervisor: DelegationSupervisor,
}

impl ResearchBot {
    /// Wire the engines over explicit collaborators.
    ///
    /// `memory` is only consulted in multi-agent mode, and only when
    /// `research.memory_enabled` is set.
    pub fn new(
        config: BotConfig,
        llm: Arc<dyn LlmClient>,
        knowledge: Arc<KnowledgeBase>,
        memory: Option<Arc<dyn MemoryStore>>,
    ) -> Self {
        let top_k = config.knowledge.top_k;
        let dedup = Deduplicator::with_prefix(config.research.dedup_prefix_chars);

        let research_loop = ResearchLoop::new(llm.clone(), knowledge.clone())
            .with_top_k(top_k)
            .with_deduplicator(dedup.clone());

        let pipeline = RolePipeline::standard(llm.clone(), knowledge.clone(), top_k, dedup);
        let mut supervisor = DelegationSupervisor::new(llm.clone(), pipeline);
        if let Some(store) = memory.filter(|_| config.research.memory_enabled) {
            supervisor = supervisor.with_memory(store, config.memory.max_context_tokens);
        }

        Self {
            config,
            llm,
            knowledge,
            research_loop,
            supervisor,
        }
    }

    /// Build the production stack: an OpenAI-compatible client, a local
    /// embedding model shared by the knowledge base and memory, and an
    /// in-process namespaced memory store.
    pub fn from_config(config: BotConfig) -> Result<Self> {
        let llm = build_llm_client(&config.llm)?;

        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::from_config(
            &config.memory.embedding_model,
            config.memory.embedding_dim,
        )?);

        let knowledge = Arc::new(KnowledgeBase::new(
            config.knowledge.collection.clone(),
            embedder.clone(),
        ));

        let memory: Option<Arc<dyn MemoryStore>> = if config.research.memory_enabled {
            Some(Arc::new(VectorMemoryStore::new(config.memory.clone(), embedder)))
        } else {
            None
        };

        info!(
            mode = %config.research.mode,
            model = %llm.model_name(),
            collection = %config.knowledge.collection,
            memory = memory.is_some(),
            "ResearchBot initialized"
        );

        Ok(Self::new(config, llm, knowledge, memory))
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn mode(&self) -> ResearchMode {
        self.config.research.mode
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub fn supervisor(&self) -> &DelegationSupervisor {
        &self.supervisor
    }

    /// A request carrying the configured defaults, with caller overrides.
    pub fn request(
        &self,
        question: &str,
        user_id: Option<&str>,
        max_iterations: Option<u32>,
    ) -> ResearchRequest {
        let research = &self.config.research;
        ResearchRequest::new(question)
            .with_user(user_id.unwrap_or(&research.default_user_id))
            .with_max_iterations(max_iterations.unwrap_or(research.max_iterations))
            .with_confidence_threshold(research.confidence_threshold)
    }

    /// `research(question, user_id?, max_iterations?) -> answer`.
    pub async fn research(
        &self,
        question: &str,
        user_id: Option<&str>,
        max_iterations: Option<u32>,
    ) -> Result<String> {
        let request = self.request(question, user_id, max_iterations);
        self.research_with(&request, CancellationToken::new()).await
    }

    /// Answer `request`, aborting in-flight calls once `cancel` fires.
    pub async fn research_with(
        &self,
        request: &ResearchRequest,
        cancel: CancellationToken,
    ) -> Result<String> {
        let limits = CallLimits::new(self.config.research.call_timeout(), cancel);

        let answer = match self.mode() {
            ResearchMode::SelfReflective => self
                .research_loop
                .run(request, &limits)
                .await
                .map(|outcome| outcome.answer),
            ResearchMode::MultiAgent => self
                .supervisor
                .research(request, &limits)
                .await
                .map(|outcome| outcome.answer),
        };

        if let Err(e) = &answer {
            error!(request_id = %request.id, mode = %self.mode(), error = %e, "Research failed");
        }
        answer
    }

    /// Index matching files in `directory`; `extensions` defaults to the
    /// configured list.
    pub async fn index_documents(
        &self,
        directory: &Path,
        extensions: Option<&[String]>,
    ) -> Result<IngestReport> {
        let extensions = extensions.unwrap_or(&self.config.knowledge.extensions);
        index_directory(&self.knowledge, directory, extensions, &self.config.knowledge).await
    }

    /// Index the configured documents directory.
    pub async fn index_configured_documents(&self) -> Result<IngestReport> {
        let directory = self.config.knowledge.documents_dir.clone();
        self.index_documents(&directory, None).await
    }
}
