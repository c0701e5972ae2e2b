mod support;

use interactions::{InteractionError, OperationKind, Status};
use record::{Draft, InteractionType, RecordId, Sentiment};
use serde_json::json;
use support::{harness, until};

fn smith() -> Draft {
    Draft {
        hcp_name: "Dr. Smith".to_string(),
        interaction_type: InteractionType::Meeting,
        topics: "Efficacy".to_string(),
        sentiment: Sentiment::Positive,
        ..Draft::default()
    }
}

fn named(name: &str) -> Draft {
    Draft {
        hcp_name: name.to_string(),
        ..Draft::default()
    }
}

#[tokio::test]
async fn test_save_form_draft() {
    let h = harness();
    let mut draft = smith();

    let record = h.service.save_draft(&mut draft).await.unwrap();

    assert!(record.structured_data.attendees.is_empty());
    assert_eq!(record.structured_data.topics, vec!["Efficacy"]);
    assert_eq!(record.raw_text, "Met Dr. Smith (Meeting).");
    assert!(record.sentiment_consistent());
    assert!(draft.is_blank());

    let list = h.service.list().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, record.id);
    assert_eq!(h.service.status().await, Status::Succeeded);
}

#[tokio::test]
async fn test_chat_extraction_then_save() {
    let h = harness();
    let text = "Met Dr. Lee today, we discussed dosing.";
    h.extractor.reply(
        text,
        json!({
            "interaction": {
                "structured_data": {
                    "hcp_name": "Dr. Lee",
                    "topics": ["Dosing"],
                    "sentiment": "neutral",
                    "materials_shared": [],
                    "samples_distributed": [],
                    "follow_up_tasks": ["Send brochure"]
                },
                "summary": "Discussed dosing"
            },
            "followups": ["Call next week"]
        }),
    );

    h.service.request_extraction(text).await.unwrap();
    let shown = h.service.extraction().await.unwrap();
    assert_eq!(interactions::suggested_followups(&shown.result), vec!["Call next week"]);

    let mut draft = Draft::new();
    let record = h.service.save_extracted(&mut draft).await.unwrap();

    assert_eq!(record.structured_data.hcp_name.as_deref(), Some("Dr. Lee"));
    assert_eq!(record.structured_data.topics, vec!["Dosing"]);
    assert_eq!(record.structured_data.follow_up_tasks, vec!["Send brochure"]);
    assert_eq!(record.summary, "Discussed dosing");
    assert_eq!(record.raw_text, text);
    assert!(record.sentiment_consistent());
    assert!(draft.is_blank());
    assert!(h.service.extraction().await.is_none());
}

#[tokio::test]
async fn test_fetch_resolving_after_create_replaces_list() {
    let h = harness();
    h.store.seed(&["Dr. A", "Dr. B"]).await;

    let gate = h.store.gate_next_list();
    let fetch = tokio::spawn({
        let service = h.service.clone();
        async move { service.fetch().await }
    });
    until(|| h.store.list_calls() == 1).await;

    let created = h.service.save_draft(&mut named("Dr. New")).await.unwrap();
    assert_eq!(h.service.list().await[0].id, created.id);
    assert_eq!(h.service.status().await, Status::Loading);

    gate.notify_one();
    let fetched = fetch.await.unwrap().unwrap();

    let ids: Vec<RecordId> = h.service.list().await.iter().map(|r| r.id).collect();
    let fetched_ids: Vec<RecordId> = fetched.iter().map(|r| r.id).collect();
    assert_eq!(ids, fetched_ids);
    assert!(!ids.contains(&created.id));
    assert_eq!(h.service.status().await, Status::Succeeded);
}

#[tokio::test]
async fn test_failed_delete_keeps_record_visible() {
    let h = harness();
    h.store.seed(&["Dr. A"]).await;
    let list = h.service.fetch().await.unwrap();
    let target = list[0].id;

    h.store.fail_deletes();
    let err = h.service.delete(target).await.unwrap_err();
    assert!(matches!(err, InteractionError::Transport(_)));

    assert!(h.service.list().await.iter().any(|r| r.id == target));
    assert_eq!(h.service.status().await, Status::Failed);
    let message = h.service.last_error().await.unwrap();
    assert!(!message.is_empty());
    assert!(message.contains("500"));
}

#[tokio::test]
async fn test_delete_twice() {
    let h = harness();
    let record = h.service.save_draft(&mut named("Dr. A")).await.unwrap();
    h.service.save_draft(&mut named("Dr. B")).await.unwrap();

    h.service.delete(record.id).await.unwrap();
    let before = h.service.list().await;

    let err = h.service.delete(record.id).await.unwrap_err();
    assert!(matches!(err, InteractionError::Transport(remote::TransportError::NotFound(_))));
    assert_eq!(h.service.list().await, before);
}

#[tokio::test]
async fn test_save_and_summarize() {
    let h = harness();
    h.extractor.reply_to_anything(json!({
        "interaction": {
            "structured_data": {
                "hcp_name": "Dr. Smith",
                "topics": ["Efficacy", "Pricing"],
                "sentiment": "positive",
                "follow_up_tasks": ["Send pricing sheet"]
            },
            "summary": "Positive discussion of efficacy and pricing.",
            "sentiment": "negative"
        },
        "followups": "- Send pricing sheet\n- Schedule follow-up"
    }));

    let mut draft = smith();
    draft.sentiment = Sentiment::Neutral;
    draft.attendees = "Ana".to_string();
    let source_text = draft.to_source_text();

    let record = h.service.save_and_summarize(&mut draft).await.unwrap();

    assert_eq!(record.raw_text, source_text);
    assert_eq!(record.summary, "Positive discussion of efficacy and pricing.");
    assert_eq!(record.sentiment, Sentiment::Positive);
    assert!(record.sentiment_consistent());
    assert_eq!(record.structured_data.topics, vec!["Efficacy", "Pricing"]);
    assert_eq!(record.structured_data.attendees, vec!["Ana"]);

    // merged draft stays in the form
    assert_eq!(draft.topics, "Efficacy\nPricing");
    assert_eq!(draft.sentiment, Sentiment::Positive);

    let metrics = h.service.metrics();
    assert_eq!(metrics.total_succeeded, 2);
    let kinds: Vec<OperationKind> = metrics
        .operations
        .iter()
        .filter(|k| k.dispatched > 0)
        .map(|k| k.kind)
        .collect();
    assert_eq!(kinds, vec![OperationKind::Create, OperationKind::Extract]);
}

#[tokio::test]
async fn test_failed_summarize_leaves_draft_and_list() {
    let h = harness();
    let mut draft = smith();
    h.extractor.fail(&draft.to_source_text(), "model unavailable");
    let before = draft.clone();

    let err = h.service.save_and_summarize(&mut draft).await.unwrap_err();
    assert!(matches!(err, InteractionError::ExtractionService(_)));
    assert_eq!(draft, before);
    assert!(h.service.list().await.is_empty());
    assert_eq!(h.service.status().await, Status::Failed);
    assert_eq!(h.service.last_error().await.as_deref(), Some("extraction service failed: extraction model failed: model unavailable"));
}

#[tokio::test]
async fn test_malformed_extraction_is_a_failed_operation() {
    let h = harness();
    h.extractor.reply("hello", json!({ "raw_response": "Sorry, I could not do that." }));

    let err = h.service.request_extraction("hello").await.unwrap_err();
    assert!(matches!(err, InteractionError::ExtractionShape(_)));
    assert!(h.service.extraction().await.is_none());
    assert_eq!(h.service.status().await, Status::Failed);
}

#[tokio::test]
async fn test_save_extracted_without_extraction() {
    let h = harness();
    let mut draft = smith();
    let err = h.service.save_extracted(&mut draft).await.unwrap_err();
    assert!(matches!(err, InteractionError::NoExtraction));
    assert!(!err.is_operation_failure());
    assert_eq!(draft, smith());
    assert_eq!(h.service.status().await, Status::Idle);
}

#[tokio::test]
async fn test_stale_extraction_is_not_shown() {
    let h = harness();
    let lee = json!({ "interaction": { "structured_data": { "hcp_name": "Dr. Lee" } } });
    let patel = json!({ "interaction": { "structured_data": { "hcp_name": "Dr. Patel" } } });
    h.extractor.reply("first", lee);
    h.extractor.reply("second", patel);
    let gate = h.extractor.gate("first");

    let first = tokio::spawn({
        let service = h.service.clone();
        async move { service.request_extraction("first").await }
    });
    until(|| h.extractor.calls() == 1).await;

    h.service.request_extraction("second").await.unwrap();
    gate.notify_one();
    first.await.unwrap().unwrap();

    let shown = h.service.extraction().await.unwrap();
    assert_eq!(shown.source_text, "second");
    assert_eq!(shown.result.interaction.structured_data.hcp_name.as_deref(), Some("Dr. Patel"));
    assert_eq!(h.service.status().await, Status::Succeeded);
}

#[tokio::test]
async fn test_dismiss_clears_extraction() {
    let h = harness();
    h.extractor.reply("note", json!({ "interaction": { "structured_data": { "hcp_name": "Dr. Lee" } } }));
    h.service.request_extraction("note").await.unwrap();
    assert!(h.service.extraction().await.is_some());

    h.service.dismiss_extraction().await;
    assert!(h.service.extraction().await.is_none());
}

#[tokio::test]
async fn test_edit_raw_document() {
    let h = harness();
    let record = h.service.save_draft(&mut smith()).await.unwrap();

    let text = h.service.raw_document(record.id).await.unwrap();
    let edited = text.replace("Efficacy", "Safety");
    let updated = h.service.edit(record.id, &edited).await.unwrap();

    assert_eq!(updated.structured_data.topics, vec!["Safety"]);
    assert_eq!(updated.created_at, record.created_at);
    let list = h.service.list().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].structured_data.topics, vec!["Safety"]);
}

#[tokio::test]
async fn test_rejected_edit_changes_nothing() {
    let h = harness();
    let record = h.service.save_draft(&mut smith()).await.unwrap();
    let before = h.service.snapshot().await;

    for text in ["{ not json", "{}"] {
        let err = h.service.edit(record.id, text).await.unwrap_err();
        assert!(matches!(err, InteractionError::EditDeserialization(_)));
    }

    let text = h.service.raw_document(record.id).await.unwrap();
    let wrong_id = text.replacen(&format!("\"id\": {}", record.id), "\"id\": 999", 1);
    let err = h.service.edit(record.id, &wrong_id).await.unwrap_err();
    assert!(matches!(err, InteractionError::EditDeserialization(_)));

    let after = h.service.snapshot().await;
    assert_eq!(after.list(), before.list());
    assert_eq!(after.status(), Status::Succeeded);
    assert_eq!(h.service.metrics().operations[2].dispatched, 0);
}

#[tokio::test]
async fn test_raw_document_for_unknown_record() {
    let h = harness();
    let err = h.service.raw_document(RecordId(42)).await.unwrap_err();
    assert!(matches!(err, InteractionError::UnknownRecord(RecordId(42))));
}
