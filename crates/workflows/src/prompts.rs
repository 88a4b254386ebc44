//! Prompt templates and rendering helpers.
//!
//! Retrieved records and pre-computed statistics are rendered into the
//! QUERY and REPORT prompts so the model answers grounded in the user's
//! actual data instead of inventing numbers.

use std::fmt::Write as _;

use fh_domain::record::{ActivityRecord, AggregateStats, ItemBreakdownRow};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Templates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Intent-routing prompt. The model must answer with a single label.
pub(crate) fn classification(text: &str) -> String {
    format!(
        "You are an intent classifier for a farm operations assistant. \
Classify the user's message into exactly one of the following intents:

- LOG: the user states a farm activity to record (a sale, harvest, purchase, or expense).
- QUERY: the user asks a question about their previously logged data.
- REPORT: the user asks for a summary or formatted report of their data.
- GENERAL: anything else, including farming advice and small talk.

Respond with only the intent label.

User message: {text}
Intent:"
    )
}

/// Structured-extraction prompt for the LOG workflow.
pub(crate) fn extraction(text: &str) -> String {
    format!(
        "You are a data entry assistant. From the user's statement, extract \
the key details into a structured JSON object.

- \"action\": What did the user do? One of 'sale', 'harvest', 'purchase', 'expense'.
- \"item\": What is the subject of the log? (e.g., 'tomatoes', 'tractor fuel')
- \"quantity\": A numerical quantity, if mentioned.
- \"unit\": The unit for the quantity (e.g., 'pounds', 'gallons').
- \"value_usd\": The monetary value in USD, if mentioned.
- \"note\": Any other relevant details from the statement.

Respond with only the JSON object.

User statement: {text}
JSON:"
    )
}

/// Retrieval-augmented QUERY prompt.
pub(crate) fn query(
    records: &[ActivityRecord],
    stats: &AggregateStats,
    breakdown: &[ItemBreakdownRow],
    question: &str,
) -> String {
    format!(
        "You are a helpful farm assistant. Your task is to answer the user's \
question based *only* on the provided data.
- Prefer the pre-computed statistics below over re-deriving totals from the raw records.
- Think step-by-step to find the relevant information, then give a clear, friendly, conversational answer.
- If the answer isn't in the data, say so. Do not make up information.

Here are the most recent records:
{records}

Here are the pre-computed statistics:
{stats}

Top items by value:
{breakdown}

Here is the user's question: {question}

Based on the data, here is the answer:",
        records = render_records(records),
        stats = render_stats(stats, false),
        breakdown = render_breakdown(breakdown),
    )
}

/// Retrieval-augmented REPORT prompt. Includes net income and requests a
/// sectioned narrative.
pub(crate) fn report(
    records: &[ActivityRecord],
    stats: &AggregateStats,
    breakdown: &[ItemBreakdownRow],
    request: &str,
) -> String {
    format!(
        "You are a helpful farm assistant. Your task is to generate a report \
based on the user's request, using *only* the provided data.
- Prefer the pre-computed statistics below over re-deriving totals from the raw records.
- Create a well-formatted report with a clear title, sections, and totals where appropriate.
- If the data doesn't contain relevant information, state that clearly in the report.

Here are the records:
{records}

Here are the pre-computed statistics:
{stats}

Top items by value:
{breakdown}

Here is the user's request: {request}

Based on the data, here is the report:",
        records = render_records(records),
        stats = render_stats(stats, true),
        breakdown = render_breakdown(breakdown),
    )
}

/// GENERAL workflow wrapper. No retrieved context.
pub(crate) fn general(question: &str) -> String {
    format!(
        "You are a helpful farm assistant. Provide a clear and concise answer \
to the user's question.

User Question: {question}

Answer:"
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Context rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Render records as one JSON object per line, oldest last (the caller
/// passes them most recent first).
fn render_records(records: &[ActivityRecord]) -> String {
    records
        .iter()
        .map(|r| serde_json::to_string(r).unwrap_or_else(|_| "{}".into()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_stats(stats: &AggregateStats, with_net_income: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "- total sales: ${:.2}", stats.total_sales);
    let _ = writeln!(out, "- total expenses: ${:.2}", stats.total_expenses);
    if with_net_income {
        let _ = writeln!(out, "- net income: ${:.2}", stats.net_income());
    }
    let _ = writeln!(out, "- total entries: {}", stats.total_entries);
    for (action, entry) in &stats.by_action {
        let _ = writeln!(
            out,
            "- {}: {} entries, ${:.2}",
            action, entry.count, entry.total_value
        );
    }
    out.trim_end().to_string()
}

fn render_breakdown(breakdown: &[ItemBreakdownRow]) -> String {
    if breakdown.is_empty() {
        return "(none)".into();
    }
    breakdown
        .iter()
        .map(|row| {
            format!(
                "- {} ({}): {} entries, qty {}, ${:.2}",
                row.item, row.action, row.count, row.total_quantity, row.total_value
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use fh_domain::record::{Action, ActionStats};

    #[test]
    fn classification_prompt_lists_all_labels() {
        let prompt = classification("I sold tomatoes");
        for label in ["LOG", "QUERY", "REPORT", "GENERAL"] {
            assert!(prompt.contains(label), "missing label {label}");
        }
        assert!(prompt.contains("I sold tomatoes"));
    }

    #[test]
    fn extraction_prompt_names_all_fields() {
        let prompt = extraction("I sold 50 pounds of tomatoes");
        for field in ["action", "item", "quantity", "unit", "value_usd", "note"] {
            assert!(prompt.contains(field), "missing field {field}");
        }
    }

    #[test]
    fn query_prompt_embeds_records_stats_and_question() {
        let mut record = ActivityRecord::new(Action::Sale, "tomatoes");
        record.value_usd = Some(75.0);
        let mut stats = AggregateStats {
            total_sales: 75.0,
            total_entries: 1,
            ..Default::default()
        };
        stats.by_action.insert(
            Action::Sale,
            ActionStats {
                count: 1,
                total_value: 75.0,
            },
        );

        let prompt = query(
            std::slice::from_ref(&record),
            &stats,
            &[],
            "how much did I sell?",
        );

        assert!(prompt.contains("\"item\":\"tomatoes\""));
        assert!(prompt.contains("- total sales: $75.00"));
        assert!(prompt.contains("how much did I sell?"));
        assert!(prompt.contains("Do not make up information"));
        assert!(!prompt.contains("net income"));
    }

    #[test]
    fn report_prompt_includes_net_income() {
        let stats = AggregateStats {
            total_sales: 120.0,
            total_expenses: 50.0,
            total_entries: 3,
            ..Default::default()
        };

        let prompt = report(&[], &stats, &[], "monthly summary");
        assert!(prompt.contains("- net income: $70.00"));
        assert!(prompt.contains("monthly summary"));
        assert!(prompt.contains("clear title"));
    }

    #[test]
    fn breakdown_rows_render_with_values() {
        let rows = vec![ItemBreakdownRow {
            item: "tomatoes".into(),
            action: Action::Sale,
            count: 2,
            total_quantity: 70.0,
            total_value: 105.0,
        }];
        let rendered = render_breakdown(&rows);
        assert_eq!(rendered, "- tomatoes (sale): 2 entries, qty 70, $105.00");
    }

    #[test]
    fn empty_breakdown_renders_placeholder() {
        assert_eq!(render_breakdown(&[]), "(none)");
    }
}
