//! Integration tests for the ResearchBot facade and the delegation
//! supervisor.
//!
//! A scripted completion client and a bag-of-words embedder stand in for
//! the model providers, so these run without network access.

use async_trait::async_trait;
use parking_lot::Mutex;
use researchbot_common::{
    AgentRole, Embedder, MemoryHit, MemoryStore, Namespace, ResearchError, Result,
    ToolCapability,
};
use researchbot_coordinator::{BotConfig, ResearchBot, ResearchMode, SUPERVISOR_FALLBACK};
use researchbot_knowledge::{Document, KnowledgeBase};
use researchbot_llm::{LlmClient, LlmRequest, LlmResponse};
use researchbot_memory::{MemoryConfig, VectorMemoryStore};
use std::sync::Arc;
use std::time::Duration;

const VAPORWARE_DOC: &str =
    "VaporWare was a product launched in 2019 that failed within six months.";

const VOCAB: &[&str] = &[
    "vaporware", "product", "launched", "failed", "researching", "failure", "months", "diana",
];

struct BagOfWords;

#[async_trait]
impl Embedder for BagOfWords {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(VOCAB
            .iter()
            .map(|w| lower.matches(w).count() as f32)
            .collect())
    }

    fn dimension(&self) -> usize {
        VOCAB.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Plan,
    Synthesize,
    Reflect,
    Analyst,
    Researcher,
    Writer,
    MemoryNote,
}

struct ScriptedLlm {
    memory_note: String,
    writer_reply: String,
    calls: Mutex<Vec<(Call, String)>>,
}

impl ScriptedLlm {
    fn new(memory_note: &str) -> Self {
        Self {
            memory_note: memory_note.to_string(),
            writer_reply: "VaporWare was a 2019 product that failed within six months [Source 1]."
                .to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn sequence(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|(c, _)| *c).collect()
    }

    fn inputs(&self, call: Call) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|(c, _)| *c == call)
            .map(|(_, input)| input.clone())
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let system = request.system_prompt.unwrap_or_default();
        let call = if system.contains("planning a research strategy") {
            Call::Plan
        } else if system.contains("synthesizing research findings") {
            Call::Synthesize
        } else if system.contains("Evaluate these research findings") {
            Call::Reflect
        } else if system.contains("Query Analyst") {
            Call::Analyst
        } else if system.contains("Document Researcher") {
            Call::Researcher
        } else if system.contains("Report Writer") {
            Call::Writer
        } else {
            Call::MemoryNote
        };
        self.calls
            .lock()
            .push((call, request.messages[0].content.clone()));

        let content = match call {
            Call::Plan => "SUB_QUESTIONS: none".to_string(),
            Call::Synthesize => {
                "VaporWare was a product launched in 2019 that failed within six months [1]."
                    .to_string()
            }
            Call::Reflect => "0.9".to_string(),
            Call::Analyst => "A single-fact question.\nSUB_QUESTIONS: none".to_string(),
            Call::Researcher => "VaporWare failed within six months [Source 1].".to_string(),
            Call::Writer => self.writer_reply.clone(),
            Call::MemoryNote => self.memory_note.clone(),
        };
        Ok(LlmResponse {
            content,
            model: "scripted".to_string(),
            usage: None,
            finish_reason: None,
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct Fixture {
    bot: Arc<ResearchBot>,
    llm: Arc<ScriptedLlm>,
    memory: Arc<VectorMemoryStore>,
}

async fn fixture(mode: ResearchMode, memory_note: &str) -> Fixture {
    fixture_with(mode, ScriptedLlm::new(memory_note)).await
}

async fn fixture_with(mode: ResearchMode, llm: ScriptedLlm) -> Fixture {
    let mut config = BotConfig::default();
    config.research.mode = mode;

    let embedder: Arc<dyn Embedder> = Arc::new(BagOfWords);
    let knowledge = Arc::new(KnowledgeBase::new("test_docs", embedder.clone()));
    knowledge
        .add_documents(vec![Document::new(VAPORWARE_DOC, "vaporware.txt")])
        .await
        .unwrap();

    let memory = Arc::new(VectorMemoryStore::new(
        MemoryConfig {
            min_similarity: 0.1,
            ..Default::default()
        },
        embedder,
    ));
    let llm = Arc::new(llm);
    let bot = ResearchBot::new(config, llm.clone(), knowledge, Some(memory.clone()));

    Fixture {
        bot: Arc::new(bot),
        llm,
        memory,
    }
}

// ============================================================================
// Self-reflective mode
// ============================================================================

#[tokio::test]
async fn test_self_reflective_vaporware() {
    let f = fixture(ResearchMode::SelfReflective, "NONE").await;

    let answer = f.bot.research("What was VaporWare?", None, None).await.unwrap();

    assert!(answer.contains("[1]"));
    assert_eq!(
        f.llm.sequence(),
        [Call::Plan, Call::Synthesize, Call::Reflect]
    );
    // The loop never touches memory.
    assert_eq!(
        f.memory.count(&Namespace::memories("default_user")).await,
        0
    );
}

#[tokio::test]
async fn test_request_defaults_and_overrides() {
    let f = fixture(ResearchMode::SelfReflective, "NONE").await;

    let request = f.bot.request("q", None, None);
    assert_eq!(request.user_id, "default_user");
    assert_eq!(request.max_iterations, 3);
    assert_eq!(request.confidence_threshold, 0.6);

    let request = f.bot.request("q", Some("alice"), Some(7));
    assert_eq!(request.user_id, "alice");
    assert_eq!(request.max_iterations, 7);
}

#[tokio::test]
async fn test_zero_iterations_rejected() {
    let f = fixture(ResearchMode::SelfReflective, "NONE").await;
    let err = f
        .bot
        .research("What was VaporWare?", None, Some(0))
        .await
        .unwrap_err();
    assert!(matches!(err, ResearchError::Config(_)));
    assert!(f.llm.sequence().is_empty());
}

// ============================================================================
// Multi-agent mode
// ============================================================================

#[tokio::test]
async fn test_supervisor_fixed_order_with_memory_bracket() {
    let f = fixture(
        ResearchMode::MultiAgent,
        "User is researching VaporWare's failure.",
    )
    .await;

    let answer = f
        .bot
        .research("What was VaporWare?", Some("alice"), None)
        .await
        .unwrap();

    assert!(answer.contains("[Source 1]"));
    assert_eq!(
        f.llm.sequence(),
        [Call::Analyst, Call::Researcher, Call::Writer, Call::MemoryNote]
    );
    assert_eq!(f.memory.count(&Namespace::memories("alice")).await, 1);
    assert_eq!(
        f.bot.supervisor().tools(),
        [ToolCapability::SearchMemory, ToolCapability::ManageMemory]
    );

    let roles: Vec<_> = f
        .bot
        .supervisor()
        .pipeline()
        .agents()
        .iter()
        .map(|a| a.role())
        .collect();
    assert_eq!(roles, AgentRole::ORDER);
}

#[tokio::test]
async fn test_memory_context_injected_on_next_request() {
    let f = fixture(
        ResearchMode::MultiAgent,
        "User is researching VaporWare's failure.",
    )
    .await;

    f.bot
        .research("What was VaporWare?", Some("alice"), None)
        .await
        .unwrap();
    f.bot
        .research("Why did VaporWare fail?", Some("alice"), None)
        .await
        .unwrap();

    let analyst_inputs = f.llm.inputs(Call::Analyst);
    assert!(!analyst_inputs[0].contains("Relevant Context from Memory"));
    assert!(analyst_inputs[1].contains("## Relevant Context from Memory"));
    assert!(analyst_inputs[1].contains("researching VaporWare's failure"));
}

#[tokio::test]
async fn test_memory_isolated_between_users() {
    let f = fixture(
        ResearchMode::MultiAgent,
        "User is researching VaporWare's failure.",
    )
    .await;

    f.bot
        .research("What was VaporWare?", Some("alice"), None)
        .await
        .unwrap();
    assert_eq!(f.memory.count(&Namespace::memories("alice")).await, 1);

    let bob_hits = f
        .memory
        .search(&Namespace::memories("bob"), "VaporWare failure")
        .await
        .unwrap();
    assert!(bob_hits.is_empty());

    f.bot
        .research("What was VaporWare?", Some("bob"), None)
        .await
        .unwrap();

    let analyst_inputs = f.llm.inputs(Call::Analyst);
    assert!(!analyst_inputs[1].contains("Relevant Context from Memory"));
    assert_eq!(f.memory.count(&Namespace::memories("alice")).await, 1);
    assert_eq!(f.memory.count(&Namespace::memories("bob")).await, 1);
}

#[tokio::test]
async fn test_none_note_saves_nothing() {
    let f = fixture(ResearchMode::MultiAgent, "NONE").await;

    f.bot
        .research("What was VaporWare?", None, None)
        .await
        .unwrap();

    assert_eq!(
        f.memory.count(&Namespace::memories("default_user")).await,
        0
    );
}

#[tokio::test]
async fn test_memory_disabled_skips_bracket() {
    let mut config = BotConfig::default();
    config.research.mode = ResearchMode::MultiAgent;
    config.research.memory_enabled = false;

    let embedder: Arc<dyn Embedder> = Arc::new(BagOfWords);
    let knowledge = Arc::new(KnowledgeBase::new("test_docs", embedder.clone()));
    let memory = Arc::new(VectorMemoryStore::new(MemoryConfig::default(), embedder));
    let llm = Arc::new(ScriptedLlm::new("Remember this."));
    let bot = ResearchBot::new(config, llm.clone(), knowledge, Some(memory.clone()));

    bot.research("What was VaporWare?", Some("alice"), None)
        .await
        .unwrap();

    assert!(bot.supervisor().tools().is_empty());
    assert_eq!(
        llm.sequence(),
        [Call::Analyst, Call::Researcher, Call::Writer]
    );
    assert_eq!(memory.count(&Namespace::memories("alice")).await, 0);
}

#[tokio::test]
async fn test_empty_writer_output_falls_back() {
    let mut llm = ScriptedLlm::new("NONE");
    llm.writer_reply = "   ".to_string();
    let f = fixture_with(ResearchMode::MultiAgent, llm).await;

    let answer = f
        .bot
        .research("What was VaporWare?", None, None)
        .await
        .unwrap();

    // The last non-empty output wins; the researcher's notes are still there.
    assert!(answer.contains("[Source 1]"));
    assert_ne!(answer, SUPERVISOR_FALLBACK);
}

#[tokio::test]
async fn test_concurrent_same_user_saves_are_not_lost() {
    let f = fixture(
        ResearchMode::MultiAgent,
        "User is researching VaporWare's failure.",
    )
    .await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bot = f.bot.clone();
            tokio::spawn(async move {
                bot.research("What was VaporWare?", Some("carol"), None)
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(f.memory.count(&Namespace::memories("carol")).await, 8);
}

#[tokio::test]
async fn test_dedup_prefix_applies_in_both_modes() {
    let cases = [
        (ResearchMode::SelfReflective, Call::Synthesize),
        (ResearchMode::MultiAgent, Call::Researcher),
    ];

    for (prefix_chars, expect_both) in [(200, true), (9, false)] {
        for (mode, call) in cases {
            let mut config = BotConfig::default();
            config.research.mode = mode;
            config.research.dedup_prefix_chars = prefix_chars;

            let embedder: Arc<dyn Embedder> = Arc::new(BagOfWords);
            let knowledge = Arc::new(KnowledgeBase::new("test_docs", embedder));
            knowledge
                .add_documents(vec![
                    Document::new(VAPORWARE_DOC, "vaporware.txt"),
                    Document::new("VaporWare failed within six months.", "postmortem.txt"),
                ])
                .await
                .unwrap();

            let llm = Arc::new(ScriptedLlm::new("NONE"));
            let bot = ResearchBot::new(config, llm.clone(), knowledge, None);
            bot.research("What was VaporWare?", None, None)
                .await
                .unwrap();

            let inputs = llm.inputs(call);
            assert_eq!(inputs.len(), 1, "{mode}");
            assert!(inputs[0].contains("[Source 1"), "{mode}");
            assert_eq!(inputs[0].contains("[Source 2"), expect_both, "{mode}");
        }
    }
}

// ============================================================================
// Memory failures
// ============================================================================

#[derive(Clone, Copy)]
enum MemoryFault {
    Search,
    Save,
    Hang,
}

struct FaultyMemory {
    fault: MemoryFault,
}

#[async_trait]
impl MemoryStore for FaultyMemory {
    async fn save(&self, _namespace: &Namespace, _content: &str) -> Result<String> {
        match self.fault {
            MemoryFault::Save => Err(ResearchError::Memory("store rejected write".into())),
            _ => Ok("mem-1".to_string()),
        }
    }

    async fn search(&self, _namespace: &Namespace, _query: &str) -> Result<Vec<MemoryHit>> {
        match self.fault {
            MemoryFault::Search => Err(ResearchError::Memory("store unreachable".into())),
            MemoryFault::Hang => {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(Vec::new())
            }
            MemoryFault::Save => Ok(Vec::new()),
        }
    }
}

async fn bot_with_faulty_memory(
    fault: MemoryFault,
    call_timeout_ms: u64,
) -> (ResearchBot, Arc<ScriptedLlm>) {
    let mut config = BotConfig::default();
    config.research.mode = ResearchMode::MultiAgent;
    config.research.call_timeout_ms = call_timeout_ms;

    let knowledge = Arc::new(KnowledgeBase::new("test_docs", Arc::new(BagOfWords)));
    knowledge
        .add_documents(vec![Document::new(VAPORWARE_DOC, "vaporware.txt")])
        .await
        .unwrap();
    let llm = Arc::new(ScriptedLlm::new("User is researching VaporWare."));
    let bot = ResearchBot::new(
        config,
        llm.clone(),
        knowledge,
        Some(Arc::new(FaultyMemory { fault })),
    );
    (bot, llm)
}

#[tokio::test]
async fn test_memory_search_failure_propagates() {
    let (bot, llm) = bot_with_faulty_memory(MemoryFault::Search, 120_000).await;

    let err = bot
        .research("What was VaporWare?", Some("alice"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "MEMORY_UNAVAILABLE");
    assert!(err.is_upstream());
    assert!(llm.sequence().is_empty());
}

#[tokio::test]
async fn test_memory_save_failure_propagates() {
    let (bot, llm) = bot_with_faulty_memory(MemoryFault::Save, 120_000).await;

    let err = bot
        .research("What was VaporWare?", Some("alice"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "MEMORY_UNAVAILABLE");
    assert_eq!(
        llm.sequence(),
        [Call::Analyst, Call::Researcher, Call::Writer, Call::MemoryNote]
    );
}

#[tokio::test]
async fn test_memory_timeout_names_capability() {
    let (bot, llm) = bot_with_faulty_memory(MemoryFault::Hang, 50).await;

    let err = bot
        .research("What was VaporWare?", Some("alice"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ResearchError::Timeout {
            capability: "memory",
            ..
        }
    ));
    assert_eq!(err.code(), "UPSTREAM_TIMEOUT");
    assert!(llm.sequence().is_empty());
}

// ============================================================================
// Ingestion and configuration
// ============================================================================

#[tokio::test]
async fn test_index_documents_through_bot() {
    let f = fixture(ResearchMode::SelfReflective, "NONE").await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("diana.txt"), "Diana Reeves founded Vapor Labs.").unwrap();
    std::fs::write(dir.path().join("notes.md"), "Not indexed by default.").unwrap();

    let report = f.bot.index_documents(dir.path(), None).await.unwrap();
    assert_eq!(report.files_indexed, 1);
    assert_eq!(report.chunks_indexed, 1);
    assert_eq!(f.bot.knowledge().len(), 2);

    let md = vec![".md".to_string()];
    let report = f.bot.index_documents(dir.path(), Some(md.as_slice())).await.unwrap();
    assert_eq!(report.files_indexed, 1);
    assert_eq!(f.bot.knowledge().len(), 3);
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("researchbot.toml");
    std::fs::write(
        &path,
        "[research]\nmode = \"multi_agent\"\nmax_iterations = 2\n",
    )
    .unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
    }

    let config = BotConfig::from_file(&path).unwrap();
    assert_eq!(config.research.mode, ResearchMode::MultiAgent);
    assert_eq!(config.research.max_iterations, 2);
}

#[cfg(unix)]
#[test]
fn test_config_rejects_world_writable_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("researchbot.toml");
    std::fs::write(&path, "").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o666)).unwrap();

    assert!(BotConfig::from_file(&path).is_err());
}

#[cfg(unix)]
#[test]
fn test_config_rejects_world_readable_api_key() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("researchbot.toml");
    std::fs::write(&path, "[llm]\napi_key = \"sk-test\"\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    assert!(BotConfig::from_file(&path).is_err());

    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
    let config = BotConfig::from_file(&path).unwrap();
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
}

#[test]
fn test_config_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("researchbot.toml");
    std::fs::write(&path, "[research]\nconfidence_threshold = 2.0\n").unwrap();
    assert!(BotConfig::from_file_unchecked(&path).is_err());
}
