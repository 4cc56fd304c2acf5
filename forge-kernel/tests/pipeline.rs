use std::path::PathBuf;
use std::sync::Arc;

use forge_adapters::scripted::{ScriptStep, ScriptedClient};
use forge_kernel::{GenerationError, GenerationOrchestrator, MAX_ATTEMPTS};
use forge_memory::{ResultCache, ResultPersister};
use forge_primitives::{EnvelopeKind, GenerationRequest, Tweet, reserved_keys};
use forge_prompts::{ContextStore, PromptBuilder, SELF_CORRECTION_DIRECTIVE, TextLibrary};
use uuid::Uuid;

const VALID_THREE: &str =
    r#"{"Launch_Day": "We shipped", "Hiring": "Join us", "Roadmap": "Next up"}"#;

fn store() -> Arc<ContextStore> {
    Arc::new(ContextStore::new(
        TextLibrary::from_entries([("jina", "Jina builds search.")]),
        TextLibrary::default(),
    ))
}

fn request() -> GenerationRequest {
    GenerationRequest::new("Write launch posts")
        .with_prompt_id("persona")
        .with_tweets(vec![Tweet::new("1", "ana", "we are live")])
}

fn orchestrator(client: &Arc<ScriptedClient>) -> GenerationOrchestrator {
    GenerationOrchestrator::new(store(), PromptBuilder::new(5)).with_client(client.clone())
}

fn initial_prompt(request: &GenerationRequest) -> String {
    PromptBuilder::new(5)
        .build(&store(), request)
        .unwrap()
        .system_prompt()
        .to_owned()
}

fn temp_root() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("forge-pipeline-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn showcase_mode_makes_no_call() {
    let root = temp_root();
    let cache = Arc::new(ResultCache::empty(root.join("cache.json")));
    let orchestrator = GenerationOrchestrator::new(store(), PromptBuilder::new(5))
        .with_cache(cache.clone())
        .with_persister(ResultPersister::new(root.join("outputs")));
    assert!(orchestrator.is_showcase());

    let envelope = orchestrator.generate(&request()).await.unwrap();

    assert_eq!(envelope.kind(), EnvelopeKind::Showcase);
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json[reserved_keys::SHOWCASE_STATUS], reserved_keys::SHOWCASE_DETAIL);
    assert!(json.get(reserved_keys::INPUT).is_none());
    assert!(json.get(reserved_keys::CONTEXT).is_none());
    assert!(cache.is_empty().await);
    assert!(!root.join("cache.json").exists());
    assert!(!root.join("outputs").exists());

    let _ = std::fs::remove_dir_all(root);
}

#[tokio::test]
async fn accepts_third_attempt_after_two_malformed_replies() {
    let client = Arc::new(ScriptedClient::replies([
        "Here are your topics: Launch, Hiring",
        "{'Launch': 'single quotes'}",
        VALID_THREE,
    ]));
    let request = request();

    let envelope = orchestrator(&client).generate(&request).await.unwrap();

    assert_eq!(envelope.kind(), EnvelopeKind::Generated);
    let labels: Vec<&str> = envelope.topics().keys().collect();
    assert_eq!(labels, ["🧠 Launch Day", "🧠 Hiring", "🧠 Roadmap"]);
    assert_eq!(client.calls(), 3);

    let json = serde_json::to_value(&envelope).unwrap();
    let object = json.as_object().unwrap();
    // status, three topics, prompt echo, input echo
    assert_eq!(object.len(), 6);
    assert!(object.contains_key(reserved_keys::PROMPT));
    assert!(object.contains_key(reserved_keys::INPUT));

    let sent = client.requests();
    assert_eq!(envelope.prompt_echo(), sent[2].system_prompt());
    assert_eq!(envelope.input_echo(), Some(sent[2].user_message()));
}

#[tokio::test]
async fn each_correction_changes_the_prompt() {
    let client = Arc::new(ScriptedClient::replies(["not json", "still not json", "nope"]));
    let request = request();

    let envelope = orchestrator(&client).generate(&request).await.unwrap();
    assert!(envelope.is_failure());

    let sent = client.requests();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].system_prompt(), initial_prompt(&request));
    assert_eq!(sent[0].user_message(), r#"["we are live"]"#);

    for pair in sent.windows(2) {
        assert_ne!(pair[0].system_prompt(), pair[1].system_prompt());
        assert_ne!(pair[0].user_message(), pair[1].user_message());
    }

    let second_user = sent[1].user_message();
    assert!(second_user.starts_with("JSON Parsing failed"));
    assert!(second_user.ends_with("not json"));
    assert!(sent[1].system_prompt().ends_with(SELF_CORRECTION_DIRECTIVE));
    assert!(sent[2].user_message().ends_with("still not json"));

    // The failure echoes the prompt of the last attempt and its raw output.
    assert_eq!(envelope.prompt_echo(), sent[2].system_prompt());
    assert_eq!(envelope.raw_output(), Some("nope"));
}

#[tokio::test]
async fn transport_failures_keep_the_original_prompt() {
    let client = Arc::new(ScriptedClient::new([
        ScriptStep::TransportFailure("boom 1".to_owned()),
        ScriptStep::TransportFailure("boom 2".to_owned()),
        ScriptStep::TransportFailure("boom 3".to_owned()),
    ]));
    let request = request();

    let envelope = orchestrator(&client).generate(&request).await.unwrap();

    assert_eq!(envelope.kind(), EnvelopeKind::Failed);
    assert!(envelope.error_message().unwrap().contains("boom 3"));
    assert_eq!(envelope.prompt_echo(), initial_prompt(&request));
    assert!(envelope.raw_output().is_none());

    let sent = client.requests();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|req| req == &sent[0]));

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json[reserved_keys::FAILURE_STATUS], reserved_keys::FAILURE_DETAIL);
    assert_eq!(json[reserved_keys::FAILURE_PROMPT], initial_prompt(&request));
}

#[tokio::test]
async fn transport_failure_after_a_correction_resends_the_corrected_prompt() {
    let client = Arc::new(ScriptedClient::new([
        ScriptStep::Reply("not json".to_owned()),
        ScriptStep::TransportFailure("connection reset".to_owned()),
        ScriptStep::Reply(VALID_THREE.to_owned()),
    ]));
    let request = request();

    let envelope = orchestrator(&client).generate(&request).await.unwrap();

    assert_eq!(envelope.kind(), EnvelopeKind::Generated);
    let sent = client.requests();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].system_prompt(), initial_prompt(&request));
    assert!(sent[1].system_prompt().ends_with(SELF_CORRECTION_DIRECTIVE));
    assert!(sent[1].user_message().ends_with("not json"));
    assert_eq!(sent[1], sent[2]);
    assert_eq!(envelope.prompt_echo(), sent[2].system_prompt());
}

#[tokio::test]
async fn never_exceeds_the_attempt_budget() {
    let client = Arc::new(ScriptedClient::replies(["{}"; 6]));

    let envelope = orchestrator(&client).generate(&request()).await.unwrap();

    assert!(envelope.is_failure());
    assert_eq!(client.calls(), MAX_ATTEMPTS as usize);
}

#[tokio::test]
async fn unknown_tag_is_rejected_before_any_call() {
    let client = Arc::new(ScriptedClient::replies([VALID_THREE]));
    let request = request().with_tags(["jina", "missing"]);

    let err = orchestrator(&client)
        .generate(&request)
        .await
        .expect_err("missing tag");

    assert!(matches!(err, GenerationError::UnknownContextTag { ref tag } if tag == "missing"));
    assert!(err.is_client_error());
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn accepted_result_is_cached_and_recorded() {
    let root = temp_root();
    let cache = Arc::new(ResultCache::empty(root.join("cache.json")));
    let client = Arc::new(ScriptedClient::replies([VALID_THREE]));
    let orchestrator = orchestrator(&client)
        .with_cache(cache.clone())
        .with_persister(ResultPersister::new(root.join("outputs")));
    let request = request().with_tags(["jina"]);

    let envelope = orchestrator.generate(&request).await.unwrap();
    assert_eq!(envelope.context_note(), Some("Including context jina"));

    let snapshot = cache.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    let (key, stored) = snapshot.iter().next().unwrap();
    assert!(key.starts_with("persona "));
    assert_eq!(stored, &envelope);

    let reloaded = ResultCache::load(root.join("cache.json")).await;
    assert_eq!(reloaded.len().await, 1);

    let records: Vec<_> = std::fs::read_dir(root.join("outputs")).unwrap().collect();
    assert_eq!(records.len(), 1);

    let _ = std::fs::remove_dir_all(root);
}

#[tokio::test]
async fn unwritable_cache_still_serves_the_result() {
    let root = temp_root();
    // A directory where the cache file should be makes every write fail.
    let cache_path = root.join("cache.json");
    std::fs::create_dir_all(&cache_path).unwrap();
    let cache = Arc::new(ResultCache::empty(&cache_path));
    let client = Arc::new(ScriptedClient::replies([VALID_THREE]));
    let orchestrator = orchestrator(&client)
        .with_cache(cache.clone())
        .with_persister(ResultPersister::new(root.join("outputs")));

    let envelope = orchestrator.generate(&request()).await.unwrap();

    assert_eq!(envelope.kind(), EnvelopeKind::Generated);
    assert_eq!(envelope.topics().len(), 3);
    assert!(cache.is_empty().await);
    assert!(cache_path.is_dir());
    assert_eq!(std::fs::read_dir(root.join("outputs")).unwrap().count(), 1);

    let _ = std::fs::remove_dir_all(root);
}

#[tokio::test]
async fn malformed_exhaustion_is_recorded_but_not_cached() {
    let root = temp_root();
    let cache = Arc::new(ResultCache::empty(root.join("cache.json")));
    let client = Arc::new(ScriptedClient::new([
        ScriptStep::TransportFailure("boom".to_owned()),
        ScriptStep::Reply("[]".to_owned()),
        ScriptStep::Reply("oops".to_owned()),
    ]));
    let orchestrator = orchestrator(&client)
        .with_cache(cache.clone())
        .with_persister(ResultPersister::new(root.join("outputs")));

    let envelope = orchestrator.generate(&request()).await.unwrap();

    assert!(envelope.is_failure());
    assert_eq!(envelope.raw_output(), Some("oops"));
    assert!(cache.is_empty().await);
    assert_eq!(std::fs::read_dir(root.join("outputs")).unwrap().count(), 1);

    let _ = std::fs::remove_dir_all(root);
}

#[tokio::test]
async fn transport_exhaustion_writes_nothing() {
    let root = temp_root();
    let client = Arc::new(ScriptedClient::new(Vec::<ScriptStep>::new()));
    let orchestrator = orchestrator(&client)
        .with_persister(ResultPersister::new(root.join("outputs")));

    let envelope = orchestrator.generate(&request()).await.unwrap();

    assert!(envelope.is_failure());
    assert!(!root.join("outputs").exists());

    let _ = std::fs::remove_dir_all(root);
}
