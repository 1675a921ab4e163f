//! Integration tests for query conversion routing and fallback

use async_trait::async_trait;
use evquery_core::{
    ChannelSink, ChatMessage, ConversionPath, ConversionRequest, DebugEvent, DebugKind,
    DebugSink, EvQueryError, FragmentStream, LLMClient, LocalOptimizer, QueryConverter, Result,
    RuleOptimizer,
};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the scripted client does when called
#[derive(Clone)]
enum Script {
    Reply(&'static str),
    Fragments(Vec<&'static str>),
    Fail(&'static str),
}

struct ScriptedClient {
    script: Script,
    calls: AtomicUsize,
    stream_calls: AtomicUsize,
    last_messages: Mutex<Vec<ChatMessage>>,
}

impl ScriptedClient {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            last_messages: Mutex::new(vec![]),
        })
    }

    fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst) + self.stream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages;
        match &self.script {
            Script::Reply(text) => Ok(text.to_string()),
            Script::Fragments(parts) => Ok(parts.concat()),
            Script::Fail(msg) => Err(EvQueryError::ModelRequestFailed(msg.to_string())),
        }
    }

    async fn chat_completion_stream(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages;
        match &self.script {
            Script::Reply(text) => Ok(stream::iter(vec![Ok(text.to_string())]).boxed()),
            Script::Fragments(parts) => {
                let items: Vec<Result<String>> = parts.iter().map(|p| Ok(p.to_string())).collect();
                Ok(stream::iter(items).boxed())
            }
            Script::Fail(msg) => Err(EvQueryError::ModelRequestFailed(msg.to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Sink that records events synchronously
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<DebugEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<DebugEvent> {
        self.events.lock().unwrap().clone()
    }

    fn of_kind(&self, kind: DebugKind) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.text)
            .collect()
    }
}

impl DebugSink for RecordingSink {
    fn send(&self, event: DebugEvent) {
        self.events.lock().unwrap().push(event);
    }
}

struct FailingOptimizer;

impl LocalOptimizer for FailingOptimizer {
    fn optimize(&self, _raw_query: &str) -> Result<String> {
        Err(EvQueryError::LocalOptimizerFailed("rules exhausted".to_string()))
    }
}

fn converter_with(client: &Arc<ScriptedClient>) -> QueryConverter {
    QueryConverter::new(Some(client.clone() as Arc<dyn LLMClient>), Arc::new(RuleOptimizer))
}

fn local(raw: &str) -> String {
    RuleOptimizer.optimize(raw).unwrap()
}

#[tokio::test]
async fn test_scenario_a_unreachable_model_falls_back() {
    let client = ScriptedClient::new(Script::Fail("connection refused"));
    let converter = converter_with(&client);

    let conversion = converter
        .convert(&ConversionRequest::new("find pdfs from today"))
        .await
        .unwrap();

    assert_eq!(conversion.query, local("find pdfs from today"));
    assert_eq!(conversion.via, ConversionPath::Local);
    assert_eq!(client.total_calls(), 1);
}

#[tokio::test]
async fn test_scenario_b_model_reply_used() {
    let client = ScriptedClient::new(Script::Reply(
        r#"{"query": "size:>1mb *.mp4;*.avi;*.mkv", "confidence": 0.9}"#,
    ));
    let converter = converter_with(&client);

    let conversion = converter
        .convert(&ConversionRequest::new("videos over 1mb"))
        .await
        .unwrap();

    assert_eq!(conversion.query, "size:>1mb *.mp4;*.avi;*.mkv");
    assert_eq!(conversion.via, ConversionPath::Model);
}

#[tokio::test]
async fn test_scenario_c_short_query_never_calls_model() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query": "should not be used"}"#));
    let converter = converter_with(&client);

    for debug in [false, true] {
        let conversion = converter
            .convert(&ConversionRequest::new("ab").with_debug(debug))
            .await
            .unwrap();
        assert_eq!(conversion.query, local("ab"));
        assert_eq!(conversion.via, ConversionPath::Local);
    }
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn test_short_query_limit_counts_characters() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query": "*.txt"}"#));
    let converter = converter_with(&client);

    // Three characters, nine bytes
    converter
        .convert(&ConversionRequest::new("文档夹"))
        .await
        .unwrap();
    assert_eq!(client.total_calls(), 0);

    let conversion = converter
        .convert(&ConversionRequest::new("abcd"))
        .await
        .unwrap();
    assert_eq!(conversion.via, ConversionPath::Model);
    assert_eq!(client.total_calls(), 1);
}

#[tokio::test]
async fn test_no_client_uses_local_rules() {
    let converter = QueryConverter::new(None, Arc::new(RuleOptimizer));
    assert!(!converter.is_model_available());

    let conversion = converter
        .convert(&ConversionRequest::new("music from yesterday").with_debug(true))
        .await
        .unwrap();
    assert_eq!(conversion.query, local("music from yesterday"));
    assert_eq!(conversion.via, ConversionPath::Local);
}

#[tokio::test]
async fn test_local_path_is_idempotent() {
    let converter = QueryConverter::new(None, Arc::new(RuleOptimizer));
    let request = ConversionRequest::new("images larger than 2mb from this week");

    let first = converter.convert(&request).await.unwrap();
    let second = converter.convert(&request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unparsable_reply_falls_back() {
    let client = ScriptedClient::new(Script::Reply("I'm sorry, I can't do that."));
    let sink = Arc::new(RecordingSink::default());
    let converter = converter_with(&client).with_debug_sink(sink.clone());

    let conversion = converter
        .convert(&ConversionRequest::new("spreadsheets from last month").with_debug(true))
        .await
        .unwrap();

    assert_eq!(conversion.via, ConversionPath::Local);
    assert_eq!(conversion.query, local("spreadsheets from last month"));
    let errors = sink.of_kind(DebugKind::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("using local rules"));
}

#[tokio::test]
async fn test_broken_json_recovery_is_reported() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query": "dm:today *.pdf", "confidence": 0.8"#));
    let sink = Arc::new(RecordingSink::default());
    let converter = converter_with(&client).with_debug_sink(sink.clone());

    let conversion = converter
        .convert(&ConversionRequest::new("pdfs from today").with_debug(true))
        .await
        .unwrap();

    assert_eq!(conversion.via, ConversionPath::Model);
    assert_eq!(conversion.query, "dm:today *.pdf");
    let infos = sink.of_kind(DebugKind::Info);
    assert_eq!(infos.len(), 3);
    assert!(infos[1].contains("not usable JSON"));
    assert!(infos[2].contains("query_field_pattern"));
    assert!(infos[2].contains("dm:today *.pdf"));
    assert!(sink.of_kind(DebugKind::Error).is_empty());
}

#[tokio::test]
async fn test_clean_json_reply_reports_no_recovery() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query":"*.zip"}"#));
    let sink = Arc::new(RecordingSink::default());
    let converter = converter_with(&client).with_debug_sink(sink.clone());

    converter
        .convert(&ConversionRequest::new("zip archives").with_debug(true))
        .await
        .unwrap();

    assert_eq!(sink.of_kind(DebugKind::Info).len(), 1);
}

#[tokio::test]
async fn test_unparsable_reply_reports_attempt_before_error() {
    let client = ScriptedClient::new(Script::Reply("no idea"));
    let sink = Arc::new(RecordingSink::default());
    let converter = converter_with(&client).with_debug_sink(sink.clone());

    converter
        .convert(&ConversionRequest::new("tax returns").with_debug(true))
        .await
        .unwrap();

    let kinds: Vec<DebugKind> = sink.events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DebugKind::Info,
            DebugKind::Stream,
            DebugKind::Info,
            DebugKind::Error
        ]
    );
}

#[tokio::test]
async fn test_empty_query_in_reply_falls_back() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query": "  ", "confidence": 1.0}"#));
    let converter = converter_with(&client);

    let conversion = converter
        .convert(&ConversionRequest::new("old tax forms"))
        .await
        .unwrap();
    assert_eq!(conversion.via, ConversionPath::Local);
    assert!(!conversion.query.trim().is_empty());
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let client = ScriptedClient::new(Script::Reply("```json\n{\"query\":\"dm:today *.pdf\"}\n```"));
    let converter = converter_with(&client);

    let conversion = converter
        .convert(&ConversionRequest::new("pdfs from today"))
        .await
        .unwrap();
    assert_eq!(conversion.query, "dm:today *.pdf");
    assert_eq!(conversion.via, ConversionPath::Model);
}

#[tokio::test]
async fn test_debug_streams_fragments_in_order() {
    let client = ScriptedClient::new(Script::Fragments(vec!["{\"qu", "ery\":\"*.", "pdf\"}"]));
    let sink = Arc::new(RecordingSink::default());
    let converter = converter_with(&client).with_debug_sink(sink.clone());

    let conversion = converter
        .convert(&ConversionRequest::new("all my pdf files").with_debug(true))
        .await
        .unwrap();

    assert_eq!(conversion.query, "*.pdf");
    assert_eq!(conversion.via, ConversionPath::Model);
    assert_eq!(client.stream_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        sink.of_kind(DebugKind::Stream),
        vec!["{\"qu", "ery\":\"*.", "pdf\"}"]
    );
    // The starting notice precedes every fragment
    assert_eq!(sink.events()[0].kind, DebugKind::Info);
}

#[tokio::test]
async fn test_without_debug_uses_standard_mode_and_stays_silent() {
    let client = ScriptedClient::new(Script::Fragments(vec!["{\"query\":", "\"*.zip\"}"]));
    let sink = Arc::new(RecordingSink::default());
    let converter = converter_with(&client).with_debug_sink(sink.clone());

    let conversion = converter
        .convert(&ConversionRequest::new("zip archives"))
        .await
        .unwrap();

    assert_eq!(conversion.query, "*.zip");
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.stream_calls.load(Ordering::SeqCst), 0);
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_streaming_failure_reports_error_event() {
    let client = ScriptedClient::new(Script::Fail("HTTP 503"));
    let (sink, mut rx) = ChannelSink::new();
    let converter = converter_with(&client).with_debug_sink(Arc::new(sink));

    let conversion = converter
        .convert(&ConversionRequest::new("presentation slides").with_debug(true))
        .await
        .unwrap();
    assert_eq!(conversion.via, ConversionPath::Local);

    let mut kinds = vec![];
    while let Ok(event) = rx.try_recv() {
        kinds.push(event.kind);
        if event.kind == DebugKind::Error {
            assert!(event.text.contains("HTTP 503"));
        }
    }
    assert_eq!(kinds, vec![DebugKind::Info, DebugKind::Error]);
}

#[tokio::test]
async fn test_dropped_debug_receiver_does_not_matter() {
    let client = ScriptedClient::new(Script::Fragments(vec!["{\"query\":\"*.iso\"}"]));
    let (sink, rx) = ChannelSink::new();
    drop(rx);
    let converter = converter_with(&client).with_debug_sink(Arc::new(sink));

    let conversion = converter
        .convert(&ConversionRequest::new("disk images").with_debug(true))
        .await
        .unwrap();
    assert_eq!(conversion.query, "*.iso");
}

#[tokio::test]
async fn test_optimizer_failure_is_fatal() {
    let client = ScriptedClient::new(Script::Fail("timeout"));
    let converter = QueryConverter::new(
        Some(client.clone() as Arc<dyn LLMClient>),
        Arc::new(FailingOptimizer),
    );

    let err = converter
        .convert(&ConversionRequest::new("anything at all"))
        .await
        .unwrap_err();
    assert!(matches!(err, EvQueryError::LocalOptimizerFailed(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_optimizer_not_consulted_on_model_success() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query":"ext:psd"}"#));
    let converter = QueryConverter::new(
        Some(client.clone() as Arc<dyn LLMClient>),
        Arc::new(FailingOptimizer),
    );

    let conversion = converter
        .convert(&ConversionRequest::new("photoshop files"))
        .await
        .unwrap();
    assert_eq!(conversion.query, "ext:psd");
}

#[tokio::test]
async fn test_prompt_embeds_request() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query":"*.log"}"#));
    let converter = converter_with(&client);

    converter
        .convert(&ConversionRequest::new("server log files"))
        .await
        .unwrap();

    let messages = client.last_messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[1].role, "user");
    assert!(messages[1].content.contains("server log files"));
}

#[tokio::test]
async fn test_replace_client_affects_later_calls() {
    let converter = QueryConverter::new(None, Arc::new(RuleOptimizer));
    let request = ConversionRequest::new("budget spreadsheets");
    assert_eq!(
        converter.convert(&request).await.unwrap().via,
        ConversionPath::Local
    );

    let client = ScriptedClient::new(Script::Reply(r#"{"query":"budget *.xlsx"}"#));
    converter.replace_client(Some(client as Arc<dyn LLMClient>));
    assert!(converter.is_model_available());

    let conversion = converter.convert(&request).await.unwrap();
    assert_eq!(conversion.query, "budget *.xlsx");
    assert_eq!(conversion.via, ConversionPath::Model);
}

#[tokio::test]
async fn test_update_config_without_key_disables_model() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query":"*.md"}"#));
    let converter = converter_with(&client);
    assert!(converter.is_model_available());

    let config = evquery_core::LLMServiceConfig {
        api_key: None,
        ..Default::default()
    };
    converter.update_config(&config).unwrap();
    assert!(!converter.is_model_available());

    converter
        .convert(&ConversionRequest::new("markdown notes"))
        .await
        .unwrap();
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn test_concurrent_conversions_are_independent() {
    let client = ScriptedClient::new(Script::Reply(r#"{"query":"*.csv"}"#));
    let converter = Arc::new(converter_with(&client));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let converter = converter.clone();
            tokio::spawn(async move {
                let raw = if i % 2 == 0 { "csv exports" } else { "ab" };
                converter.convert(&ConversionRequest::new(raw)).await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(client.total_calls(), 4);
}
