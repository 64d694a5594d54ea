use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use jfed_common::types::NumericRange;
use jfed_common::{MetricValue, SortOrder};
use serde_json::{json, Value};

use super::*;
use crate::executor::{RawRow, SqlParam};

/// How a scripted store answers
enum Reply {
    Rows(Vec<RawRow>),
    Fail,
    Hang,
}

/// Executor answering from a fixed script and recording every call
#[derive(Default)]
struct ScriptedExecutor {
    replies: HashMap<&'static str, Reply>,
    calls: Mutex<Vec<(String, String, Vec<SqlParam>)>>,
}

impl ScriptedExecutor {
    fn reply(mut self, store: &'static str, reply: Reply) -> Self {
        self.replies.insert(store, reply);
        self
    }

    fn calls_to(&self, store: &str) -> Vec<(String, Vec<SqlParam>)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _, _)| s == store)
            .map(|(_, sql, params)| (sql.clone(), params.clone()))
            .collect()
    }
}

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    async fn run(&self, store: &str, sql: &str, params: &[SqlParam]) -> Result<Vec<RawRow>, StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push((store.to_string(), sql.to_string(), params.to_vec()));

        match self.replies.get(store) {
            Some(Reply::Rows(rows)) => Ok(rows.clone()),
            Some(Reply::Fail) => Err(StoreError::Query {
                store: store.to_string(),
                message: "no such table: journal_details".to_string(),
            }),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }
}

fn row(value: Value) -> RawRow {
    match value {
        Value::Object(map) => map,
        _ => panic!("row must be an object"),
    }
}

fn engine(executor: ScriptedExecutor) -> (FederationEngine, Arc<ScriptedExecutor>) {
    let executor = Arc::new(executor);
    let engine = FederationEngine::new(executor.clone(), Duration::from_millis(200));
    (engine, executor)
}

fn title_search(text: &str) -> Filter {
    Filter {
        search_text: Some(text.to_string()),
        search_fields: vec!["title".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_publisher_search_end_to_end() {
    let (engine, executor) = engine(ScriptedExecutor::default().reply(
        "elsevier_journals.db",
        Reply::Rows(vec![row(json!({
            "title": "Network Security",
            "issn": "1234-5678",
            "impact_factor": "1.4",
        }))]),
    ));
    let filter = Filter {
        publishers: vec!["Elsevier".to_string()],
        ..title_search("network")
    };

    let outcome = engine.search(&filter, None).await.unwrap();

    assert_eq!(outcome.total_results(), 1);
    assert_eq!(outcome.records[0].title, "Network Security");
    assert_eq!(outcome.records[0].publisher.as_deref(), Some("Elsevier"));
    assert_eq!(outcome.queried_stores, vec!["elsevier_journals.db"]);
    assert!(!outcome.is_annexure);
    assert!(!outcome.used_fallback);

    let calls = executor.calls_to("elsevier_journals.db");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        "SELECT * FROM \"journal_details\" WHERE (\"title\" LIKE ?)"
    );
    assert_eq!(calls[0].1, vec![SqlParam::Text("%network%".into())]);
}

#[tokio::test]
async fn test_merge_follows_catalog_order() {
    let (engine, _) = engine(
        ScriptedExecutor::default()
            .reply("springer_journals.db", Reply::Rows(vec![row(json!({"title": "S", "print_issn": "3"}))]))
            .reply("sage.db", Reply::Rows(vec![row(json!({"title": "A", "issn": "1"}))]))
            .reply("wiley_db.db", Reply::Rows(vec![row(json!({"title": "W", "issn": "2"}))])),
    );

    let outcome = engine.search(&Filter::default(), None).await.unwrap();
    let titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "W", "S"]);
    assert_eq!(outcome.queried_stores.len(), 8);
}

#[tokio::test]
async fn test_failing_store_is_excluded() {
    let (engine, _) = engine(
        ScriptedExecutor::default()
            .reply("sage.db", Reply::Fail)
            .reply("wiley_db.db", Reply::Rows(vec![row(json!({"title": "W", "issn": "2"}))])),
    );

    let outcome = engine.search(&Filter::default(), None).await.unwrap();
    assert_eq!(outcome.total_results(), 1);
    assert_eq!(outcome.records[0].publisher.as_deref(), Some("Wiley"));
    assert!(outcome.queried_stores.contains(&"sage.db".to_string()));
}

#[tokio::test]
async fn test_hung_store_times_out_without_blocking_siblings() {
    let (engine, _) = engine(
        ScriptedExecutor::default()
            .reply("emerald_journals.db", Reply::Hang)
            .reply("sage.db", Reply::Rows(vec![row(json!({"title": "A", "issn": "1"}))])),
    );

    let outcome = tokio::time::timeout(Duration::from_secs(5), engine.search(&Filter::default(), None))
        .await
        .expect("search must not hang")
        .unwrap();
    assert_eq!(outcome.total_results(), 1);
}

#[tokio::test]
async fn test_unknown_publishers_yield_empty_success() {
    let (engine, executor) = engine(ScriptedExecutor::default());
    let filter = Filter {
        publishers: vec!["Nobody Press".to_string()],
        search_fields: vec!["issn".to_string()],
        search_text: Some("1234".to_string()),
        ..Default::default()
    };

    let outcome = engine.search(&filter, None).await.unwrap();
    assert_eq!(outcome.total_results(), 0);
    assert!(outcome.queried_stores.is_empty());
    assert!(outcome.message.is_some());
    assert!(executor.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_inverted_range_is_bad_request() {
    let (engine, _) = engine(ScriptedExecutor::default());
    let filter = Filter {
        cite_score_range: Some(NumericRange::new(9.0, 1.0)),
        ..Default::default()
    };
    let err = engine.search(&filter, None).await.unwrap_err();
    assert!(matches!(err, SearchError::BadRequest(_)));
}

#[tokio::test]
async fn test_fallback_runs_for_empty_title_search() {
    let (engine, executor) = engine(
        ScriptedExecutor::default()
            .reply(
                "ugc.db",
                Reply::Rows(vec![row(json!({"journal_title": "Rare Journal", "issn": "9", "publisher": "P"}))]),
            )
            .reply(
                "journal_details.db",
                Reply::Rows(vec![row(json!({"title": "Rare Journal of X", "issn": "8", "publisher": "Q"}))]),
            ),
    );
    let filter = Filter {
        publishers: vec!["Wiley".to_string()],
        databases: vec!["SCI".to_string()],
        ..title_search("rare")
    };

    let outcome = engine.search(&filter, None).await.unwrap();

    assert!(outcome.used_fallback);
    assert_eq!(outcome.total_results(), 2);
    assert_eq!(outcome.records[0].title, "Rare Journal");
    assert_eq!(outcome.records[1].indexed.as_deref(), Some("Scopus"));
    assert_eq!(
        outcome.queried_stores,
        vec!["wiley_db.db", "ugc.db", "journal_details.db"]
    );

    // Store selection is stripped: no indexing keywords reach the fallback store
    let ugc = executor.calls_to("ugc.db");
    assert_eq!(ugc.len(), 1);
    assert_eq!(ugc[0].1, vec![SqlParam::Text("%rare%".into())]);
}

#[tokio::test]
async fn test_fallback_respects_scheme_hint() {
    let (engine, executor) = engine(ScriptedExecutor::default());
    let filter = Filter {
        databases: vec!["UGC".to_string()],
        ..title_search("rare")
    };

    let outcome = engine.search(&filter, None).await.unwrap();
    assert!(outcome.used_fallback);
    assert_eq!(executor.calls_to("ugc.db").len(), 1);
    assert!(executor.calls_to("journal_details.db").is_empty());
}

#[tokio::test]
async fn test_fallback_skipped_without_title_field() {
    let (engine, executor) = engine(
        ScriptedExecutor::default().reply(
            "ugc.db",
            Reply::Rows(vec![row(json!({"journal_title": "X", "issn": "1234-5678"}))]),
        ),
    );
    let filter = Filter {
        search_text: Some("1234-5678".to_string()),
        search_fields: vec!["issn".to_string()],
        ..Default::default()
    };

    let outcome = engine.search(&filter, None).await.unwrap();
    assert_eq!(outcome.total_results(), 0);
    assert!(!outcome.used_fallback);
    assert!(executor.calls_to("ugc.db").is_empty());
}

#[tokio::test]
async fn test_fallback_failure_is_skipped() {
    let (engine, _) = engine(
        ScriptedExecutor::default()
            .reply("ugc.db", Reply::Fail)
            .reply("journal_details.db", Reply::Rows(vec![row(json!({"title": "Found", "issn": "1"}))])),
    );

    let outcome = engine.search(&title_search("found"), None).await.unwrap();
    assert_eq!(outcome.total_results(), 1);
    assert_eq!(outcome.records[0].title, "Found");
}

#[tokio::test]
async fn test_annexure_bridges_issns_in_batches() {
    let annex_rows: Vec<RawRow> = (0..120)
        .map(|i| row(json!({"title": format!("A{}", i), "issn": format!("{:04}-0000", i), "publisher": "Agg"})))
        .collect();
    let (engine, executor) = engine(
        ScriptedExecutor::default()
            .reply("annex.db", Reply::Rows(annex_rows))
            .reply(
                "wiley_db.db",
                Reply::Rows(vec![row(json!({"title": "Bridged", "issn": "0007-0000"}))]),
            ),
    );
    let filter = Filter {
        databases: vec!["Annexure".to_string()],
        ..Default::default()
    };

    let outcome = engine.search(&filter, None).await.unwrap();

    assert!(outcome.is_annexure);
    assert!(!outcome.used_fallback);
    assert_eq!(outcome.queried_stores[0], "annex.db");
    assert!(!outcome.queried_stores.contains(&"ugc.db".to_string()));
    assert!(outcome.queried_stores.contains(&"journal_details.db".to_string()));

    // 9 bridge targets x 3 batches; the scripted store answers each batch
    let wiley = executor.calls_to("wiley_db.db");
    let sizes: Vec<usize> = wiley.iter().map(|(_, params)| params.len()).collect();
    assert_eq!(sizes, vec![50, 50, 20]);
    assert!(wiley[0].0.starts_with("SELECT * FROM \"journals\" WHERE \"issn\" LIKE ? OR"));

    // The same row comes back for each batch and is deduplicated
    assert_eq!(outcome.total_results(), 1);
    assert_eq!(outcome.records[0].title, "Bridged");
    assert_eq!(outcome.records[0].publisher.as_deref(), Some("Wiley"));
}

#[tokio::test]
async fn test_annexure_without_issns_is_empty_without_fallback() {
    let (engine, executor) = engine(
        ScriptedExecutor::default()
            .reply("annex.db", Reply::Rows(vec![row(json!({"title": "No ISSN", "issn": ""}))]))
            .reply("ugc.db", Reply::Rows(vec![row(json!({"journal_title": "X", "issn": "1"}))])),
    );
    let filter = Filter {
        databases: vec!["Annexure".to_string()],
        ..title_search("no")
    };

    let outcome = engine.search(&filter, None).await.unwrap();
    assert!(outcome.is_annexure);
    assert_eq!(outcome.total_results(), 0);
    assert!(!outcome.used_fallback);
    assert_eq!(outcome.queried_stores, vec!["annex.db"]);
    assert!(executor.calls_to("ugc.db").is_empty());
}

#[tokio::test]
async fn test_annexure_read_failure_is_empty_result() {
    let (engine, _) = engine(ScriptedExecutor::default().reply("annex.db", Reply::Fail));
    let filter = Filter {
        databases: vec!["Annexure".to_string()],
        ..Default::default()
    };
    let outcome = engine.search(&filter, None).await.unwrap();
    assert!(outcome.is_annexure);
    assert_eq!(outcome.total_results(), 0);
}

#[tokio::test]
async fn test_annexure_with_publishers_bridges_only_those() {
    let (engine, executor) = engine(
        ScriptedExecutor::default()
            .reply("annex.db", Reply::Rows(vec![row(json!({"title": "A", "issn": "1111-1111"}))])),
    );
    let filter = Filter {
        databases: vec!["Annexure".to_string()],
        publishers: vec!["Springer".to_string()],
        ..Default::default()
    };

    let outcome = engine.search(&filter, None).await.unwrap();
    assert_eq!(outcome.queried_stores, vec!["annex.db", "springer_journals.db"]);
    let springer = executor.calls_to("springer_journals.db");
    assert_eq!(springer.len(), 1);
    assert_eq!(
        springer[0].0,
        "SELECT * FROM \"journals\" WHERE \"print_issn\" LIKE ?"
    );
}

#[tokio::test]
async fn test_sorting_and_quartiles_apply_to_merged_set() {
    let (engine, _) = engine(
        ScriptedExecutor::default()
            .reply(
                "sage.db",
                Reply::Rows(vec![
                    row(json!({"title": "low", "issn": "1", "impact_factor": 0.2})),
                    row(json!({"title": "blank", "issn": "2", "impact_factor": ""})),
                ]),
            )
            .reply(
                "wiley_db.db",
                Reply::Rows(vec![
                    row(json!({"title": "top", "issn": "3", "impact_factor": "5.0"})),
                    row(json!({"title": "mid", "issn": "4", "impact_factor": 3.1})),
                ]),
            ),
    );

    let sorting = Sorting::new("impactFactor", SortOrder::Desc);
    let outcome = engine.search(&Filter::default(), Some(&sorting)).await.unwrap();
    let titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["top", "mid", "low", "blank"]);
    assert_eq!(outcome.records[0].impact_factor, Some(MetricValue::Text("5.0".into())));

    let filter = Filter {
        quartiles: vec![jfed_common::Quartile::Q1],
        ..Default::default()
    };
    let outcome = engine.search(&filter, None).await.unwrap();
    assert_eq!(outcome.total_results(), 1);
    assert_eq!(outcome.records[0].title, "top");
}

#[test]
fn test_outcome_into_response() {
    let outcome = SearchOutcome {
        records: vec![CanonicalRecord::default()],
        queried_stores: vec!["sage.db".to_string()],
        is_annexure: false,
        used_fallback: true,
        message: None,
    };
    let response = outcome.into_response();
    assert!(response.success);
    assert_eq!(response.total_results, 1);
    assert!(response.used_fallback);
}
