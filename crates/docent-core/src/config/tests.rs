use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 24] = [
    "DOCENT_CORPUS_ROOT",
    "DOCENT_CHUNK_SIZE",
    "DOCENT_CHUNK_OVERLAP",
    "DOCENT_UNKNOWN_FILES",
    "DOCENT_MAX_FILE_SIZE",
    "DOCENT_LLM_PROVIDER",
    "DOCENT_LLM_BASE_URL",
    "DOCENT_LLM_MODEL",
    "DOCENT_LLM_EMBEDDING_MODEL",
    "DOCENT_LLM_TEMPERATURE",
    "DOCENT_LLM_MAX_TOKENS",
    "DOCENT_OPENAI_BASE_URL",
    "DOCENT_OPENAI_MODEL",
    "DOCENT_OPENAI_EMBEDDING_MODEL",
    "DOCENT_OPENAI_API_KEY",
    "OPENAI_API_KEY",
    "DOCENT_RETRIEVAL_TOP_K",
    "DOCENT_EMBED_CONCURRENCY",
    "DOCENT_TIMEOUT_LLM",
    "DOCENT_TIMEOUT_EMBEDDING",
    "DOCENT_GATEWAY_BIND",
    "DOCENT_GATEWAY_PORT",
    "DOCENT_GATEWAY_MAX_BODY",
    "DOCENT_CONFIG",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

fn set_env(key: &str, value: &str) {
    unsafe { std::env::set_var(key, value) };
}

#[test]
fn defaults_when_file_missing() {
    let config = Config::default();
    assert_eq!(config.corpus.root, std::path::PathBuf::from("data"));
    assert_eq!(config.corpus.chunk_size, 1000);
    assert_eq!(config.corpus.chunk_overlap, 0);
    assert_eq!(config.corpus.unknown_files, docent_corpus::UnknownHandling::Ignore);
    assert_eq!(config.llm.provider, ProviderKind::Ollama);
    assert_eq!(config.llm.base_url, "http://localhost:11434");
    assert!(config.llm.temperature.abs() < f32::EPSILON);
    assert!(config.llm.openai.is_none());
    assert_eq!(config.retrieval.top_k, 4);
    assert_eq!(config.gateway.port, 3000);
    assert_eq!(config.timeouts.llm_seconds, 120);
    assert!(config.secrets.openai_api_key.is_none());
}

#[test]
#[serial]
fn load_missing_file_uses_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.corpus.chunk_size, 1000);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn parse_toml_sections() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[corpus]
root = "/srv/docs"
chunk_size = 500
chunk_overlap = 50
unknown_files = "warn"

[llm]
provider = "openai"
model = "unused-for-openai"
temperature = 0.2

[llm.openai]
model = "gpt-4o"

[retrieval]
top_k = 6

[timeouts]
llm_seconds = 60

[gateway]
port = 8080
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.corpus.root, std::path::PathBuf::from("/srv/docs"));
    assert_eq!(config.corpus.chunk_size, 500);
    assert_eq!(config.corpus.chunk_overlap, 50);
    assert_eq!(config.corpus.unknown_files, docent_corpus::UnknownHandling::Warn);
    assert_eq!(config.llm.provider, ProviderKind::OpenAi);
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    let openai = config.openai();
    assert_eq!(openai.model, "gpt-4o");
    assert_eq!(openai.base_url, "https://api.openai.com/v1");
    assert_eq!(openai.embedding_model.as_deref(), Some("text-embedding-3-small"));
    assert_eq!(config.retrieval.top_k, 6);
    assert_eq!(config.retrieval.embed_concurrency, 8);
    assert_eq!(config.timeouts.llm_seconds, 60);
    assert_eq!(config.timeouts.embedding_seconds, 30);
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.bind, "127.0.0.1");
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[corpus\nchunk_size = ").unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    set_env("DOCENT_CORPUS_ROOT", "/tmp/corpus");
    set_env("DOCENT_CHUNK_SIZE", "200");
    set_env("DOCENT_CHUNK_OVERLAP", "20");
    set_env("DOCENT_LLM_PROVIDER", "openai");
    set_env("DOCENT_OPENAI_MODEL", "gpt-4");
    set_env("DOCENT_RETRIEVAL_TOP_K", "2");
    set_env("DOCENT_GATEWAY_PORT", "9000");
    set_env("DOCENT_TIMEOUT_EMBEDDING", "5");

    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("none.toml")).unwrap();
    clear_env();

    assert_eq!(config.corpus.root, std::path::PathBuf::from("/tmp/corpus"));
    assert_eq!(config.corpus.chunk_size, 200);
    assert_eq!(config.corpus.chunk_overlap, 20);
    assert_eq!(config.llm.provider, ProviderKind::OpenAi);
    assert_eq!(config.openai().model, "gpt-4");
    assert_eq!(config.retrieval.top_k, 2);
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.timeouts.embedding(), std::time::Duration::from_secs(5));
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    set_env("DOCENT_CHUNK_SIZE", "lots");
    set_env("DOCENT_LLM_PROVIDER", "skynet");
    set_env("DOCENT_UNKNOWN_FILES", "shout");

    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.corpus.chunk_size, 1000);
    assert_eq!(config.llm.provider, ProviderKind::Ollama);
    assert_eq!(config.corpus.unknown_files, docent_corpus::UnknownHandling::Ignore);
}

#[test]
#[serial]
fn api_key_falls_back_to_openai_env() {
    clear_env();
    set_env("OPENAI_API_KEY", "sk-fallback");
    let mut config = Config::default();
    config.apply_env_overrides();
    assert_eq!(
        config.secrets.openai_api_key.as_ref().map(Secret::expose),
        Some("sk-fallback")
    );

    set_env("DOCENT_OPENAI_API_KEY", "sk-primary");
    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();
    assert_eq!(
        config.secrets.openai_api_key.as_ref().map(Secret::expose),
        Some("sk-primary")
    );
}

#[test]
fn secret_is_redacted() {
    let secret = Secret::new("sk-live-123");
    assert_eq!(format!("{secret:?}"), "[REDACTED]");
    assert_eq!(format!("{secret}"), "[REDACTED]");
    assert_eq!(secret.expose(), "sk-live-123");
}

#[test]
fn validate_rejects_overlap_not_below_size() {
    let mut config = Config::default();
    config.corpus.chunk_size = 100;
    config.corpus.chunk_overlap = 100;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("chunk_overlap"));
}

#[test]
fn validate_rejects_zero_top_k() {
    let mut config = Config::default();
    config.retrieval.top_k = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_requires_key_for_openai() {
    let mut config = Config::default();
    config.llm.provider = ProviderKind::OpenAi;
    assert!(config.validate().is_err());
    config.secrets.openai_api_key = Some(Secret::new("sk"));
    assert!(config.validate().is_ok());
}

#[test]
fn provider_kind_parses_case_insensitively() {
    assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
    assert_eq!(ProviderKind::Ollama.to_string(), "ollama");
    assert!("claude".parse::<ProviderKind>().is_err());
}
