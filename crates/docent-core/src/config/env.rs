use super::{Config, Secret};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_corpus();
        self.apply_env_overrides_llm();
        self.apply_env_overrides_serving();
        self.apply_env_secrets();
    }

    fn apply_env_overrides_corpus(&mut self) {
        if let Ok(v) = std::env::var("DOCENT_CORPUS_ROOT") {
            self.corpus.root = v.into();
        }
        if let Ok(v) = std::env::var("DOCENT_CHUNK_SIZE") {
            if let Ok(size) = v.parse::<usize>() {
                self.corpus.chunk_size = size;
            } else {
                tracing::warn!("ignoring invalid DOCENT_CHUNK_SIZE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("DOCENT_CHUNK_OVERLAP") {
            if let Ok(overlap) = v.parse::<usize>() {
                self.corpus.chunk_overlap = overlap;
            } else {
                tracing::warn!("ignoring invalid DOCENT_CHUNK_OVERLAP value: {v}");
            }
        }
        if let Ok(v) = std::env::var("DOCENT_UNKNOWN_FILES") {
            match v.parse() {
                Ok(mode) => self.corpus.unknown_files = mode,
                Err(e) => tracing::warn!("ignoring invalid DOCENT_UNKNOWN_FILES value: {e}"),
            }
        }
        if let Ok(v) = std::env::var("DOCENT_MAX_FILE_SIZE")
            && let Ok(bytes) = v.parse::<u64>()
        {
            self.corpus.max_file_size = bytes;
        }
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("DOCENT_LLM_PROVIDER") {
            match v.parse() {
                Ok(kind) => self.llm.provider = kind,
                Err(_) => tracing::warn!("ignoring invalid DOCENT_LLM_PROVIDER value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("DOCENT_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("DOCENT_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("DOCENT_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("DOCENT_LLM_TEMPERATURE")
            && let Ok(t) = v.parse::<f32>()
        {
            self.llm.temperature = t;
        }
        if let Ok(v) = std::env::var("DOCENT_LLM_MAX_TOKENS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.max_tokens = n;
        }
        if let Ok(v) = std::env::var("DOCENT_OPENAI_BASE_URL") {
            self.llm.openai.get_or_insert_with(Default::default).base_url = v;
        }
        if let Ok(v) = std::env::var("DOCENT_OPENAI_MODEL") {
            self.llm.openai.get_or_insert_with(Default::default).model = v;
        }
        if let Ok(v) = std::env::var("DOCENT_OPENAI_EMBEDDING_MODEL") {
            self.llm
                .openai
                .get_or_insert_with(Default::default)
                .embedding_model = Some(v);
        }
    }

    fn apply_env_overrides_serving(&mut self) {
        if let Ok(v) = std::env::var("DOCENT_RETRIEVAL_TOP_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.retrieval.top_k = k;
        }
        if let Ok(v) = std::env::var("DOCENT_EMBED_CONCURRENCY")
            && let Ok(n) = v.parse::<usize>()
        {
            self.retrieval.embed_concurrency = n;
        }
        if let Ok(v) = std::env::var("DOCENT_TIMEOUT_LLM")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.llm_seconds = secs;
        }
        if let Ok(v) = std::env::var("DOCENT_TIMEOUT_EMBEDDING")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.embedding_seconds = secs;
        }
        if let Ok(v) = std::env::var("DOCENT_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("DOCENT_GATEWAY_PORT")
            && let Ok(port) = v.parse::<u16>()
        {
            self.gateway.port = port;
        }
        if let Ok(v) = std::env::var("DOCENT_GATEWAY_MAX_BODY")
            && let Ok(bytes) = v.parse::<usize>()
        {
            self.gateway.max_body_size = bytes;
        }
    }

    fn apply_env_secrets(&mut self) {
        let key = std::env::var("DOCENT_OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Some(key) = key {
            self.secrets.openai_api_key = Some(Secret::new(key));
        }
    }
}
