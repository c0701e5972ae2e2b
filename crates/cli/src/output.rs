use interactions::MetricsSnapshot;
use record::parse::{format_sample, join_comma_list};
use record::{ExtractionResult, InteractionRecord};

pub fn records(records: &[InteractionRecord]) {
    if records.is_empty() {
        println!("No interactions logged yet.");
        return;
    }
    for record in records {
        println!("{}", record_line(record));
    }
}

pub fn record_line(record: &InteractionRecord) -> String {
    let when = record
        .meeting_time
        .or(record.created_at)
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "#{:<5} {:<16} {:<8} {:<8} {}  {}",
        record.id,
        when,
        record.structured_data.interaction_type,
        record.sentiment,
        record.display_name(),
        record.display_summary()
    )
}

pub fn saved(record: &InteractionRecord) {
    println!("Saved interaction {}", record.id);
    println!("{}", record_line(record));
}

pub fn extraction(result: &ExtractionResult, followups: &[String]) {
    let data = &result.interaction.structured_data;
    let field = |value: Option<String>| value.filter(|v| !v.is_empty()).unwrap_or_else(|| "-".to_string());

    println!("HCP:        {}", field(data.hcp_name.clone()));
    println!("Topics:     {}", field(data.topics.as_deref().map(join_comma_list)));
    println!("Materials:  {}", field(data.materials_shared.as_deref().map(join_comma_list)));
    println!(
        "Samples:    {}",
        field(
            data.samples_distributed
                .as_ref()
                .map(|s| s.iter().map(format_sample).collect::<Vec<_>>().join(", "))
        )
    );
    println!("Sentiment:  {}", field(result.sentiment().map(|s| s.to_string())));
    println!("Summary:    {}", field(result.interaction.summary.clone()));

    if !followups.is_empty() {
        println!("Suggested follow-ups:");
        for (i, item) in followups.iter().enumerate() {
            println!("  {}. {}", i + 1, item);
        }
    }
}

pub fn stats(snapshot: &MetricsSnapshot) {
    println!(
        "operations: {} dispatched, {} succeeded, {} failed",
        snapshot.total_dispatched, snapshot.total_succeeded, snapshot.total_failed
    );
    for kind in snapshot.operations.iter().filter(|k| k.dispatched > 0) {
        println!(
            "  {:<8} {} ok, {} failed, avg {:.1} ms",
            kind.kind, kind.succeeded, kind.failed, kind.avg_time_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use record::{Draft, RecordId};

    #[test]
    fn test_record_line() {
        let draft = Draft {
            hcp_name: "Dr. Smith".to_string(),
            outcomes: "Agreed to trial".to_string(),
            ..Draft::default()
        };
        let record = InteractionRecord::from_payload(RecordId(12), draft.to_payload(""), Utc::now());
        let line = record_line(&record);
        assert!(line.starts_with("#12    "));
        assert!(line.contains("Dr. Smith"));
        assert!(line.contains("Meeting"));
        assert!(line.contains("Meeting  neutral  "));
    }
}
