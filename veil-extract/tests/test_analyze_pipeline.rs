//! Redact, chunk and extract a whole statement against a scripted model.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use rust_decimal::Decimal;
use veil_core::{Category, Locale, ModelConfig};
use veil_extract::{
    Completion, CompletionRequest, ExtractError, ExtractionOrchestrator, ExtractionWorker,
    ModelClient,
};
use veil_ingest::PatternRedactor;

const STATEMENT: &str = "\
招商银行信用卡对账单
客户：张三
邮箱：zhang.san@example.com
手机：138 1234 5678
身份证：110101199003071234
卡号：6222 0200 1234 5678
2025-10-01 STARBUCKS 35.00
2025-10-02 DIDI -12.50
FAIL: gateway timeout
2025-10-03 JD.COM 199.00
GARBAGE: scanned page
2025-10-05 HEMA 88.80";

/// Answers each chunk by turning `YYYY-MM-DD MERCHANT AMOUNT` lines into
/// the JSON contract. A chunk containing FAIL gets an HTTP error, one
/// containing GARBAGE gets prose.
#[derive(Default)]
struct StatementModel {
    seen: Mutex<Vec<CompletionRequest>>,
}

#[async_trait]
impl ModelClient for StatementModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ExtractError> {
        self.seen.lock().unwrap().push(request.clone());
        let user = &request.user;
        if user.contains("FAIL") {
            return Err(ExtractError::Status {
                status: 503,
                body: "upstream unavailable".to_string(),
            });
        }
        if user.contains("GARBAGE") {
            return Ok(Completion {
                content: "I could not find anything useful here.".to_string(),
            });
        }

        let items: Vec<String> = user
            .lines()
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                let [date, merchant, amount] = parts.as_slice() else {
                    return None;
                };
                NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                Some(format!(
                    r#"{{"Date":"{date}","Description":"{merchant}","Amount":{amount},"Category":"购物","CardLastFour":"5678"}}"#
                ))
            })
            .collect();
        Ok(Completion {
            content: format!("```json\n[{}]\n```", items.join(",")),
        })
    }
}

fn config() -> ModelConfig {
    ModelConfig::new("https://example.test/v1", "sk-test", "test-model", Locale::Zh)
}

#[tokio::test]
async fn test_statement_end_to_end() {
    let redaction = PatternRedactor::default().redact(STATEMENT);
    assert!(!redaction.is_clean());

    let model = Arc::new(StatementModel::default());
    let worker = ExtractionWorker::new(model.clone(), &config(), 2025);
    let orchestrator = ExtractionOrchestrator::new(Arc::new(worker))
        .with_max_chunk_chars(30)
        .with_max_concurrency(2);

    let report = orchestrator.analyze_report(&redaction.text).await;
    assert_eq!(report.aborted_chunks, 0);
    assert!(report.chunk_count > 3);

    let mut found: Vec<(String, Decimal)> = report
        .transactions
        .iter()
        .map(|t| (t.description.clone(), t.amount))
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            ("DIDI".to_string(), Decimal::from_str("-12.50").unwrap()),
            ("HEMA".to_string(), Decimal::from_str("88.80").unwrap()),
            ("JD.COM".to_string(), Decimal::from_str("199.00").unwrap()),
            ("STARBUCKS".to_string(), Decimal::from_str("35.00").unwrap()),
        ]
    );
    assert!(report.transactions.iter().all(|t| t.category == Category::Shopping));

    let refunds: Vec<_> = report.transactions.iter().filter(|t| t.is_refund()).collect();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].description, "DIDI");
}

#[tokio::test]
async fn test_no_pii_reaches_the_model() {
    let redaction = PatternRedactor::default().redact(STATEMENT);
    let model = Arc::new(StatementModel::default());
    let worker = ExtractionWorker::new(model.clone(), &config(), 2025);
    ExtractionOrchestrator::new(Arc::new(worker))
        .with_max_chunk_chars(40)
        .analyze(&redaction.text)
        .await;

    let seen = model.seen.lock().unwrap();
    assert!(!seen.is_empty());
    for request in seen.iter() {
        for secret in [
            "张三",
            "zhang.san@example.com",
            "138 1234 5678",
            "110101199003071234",
            "6222 0200 1234 5678",
        ] {
            assert!(!request.user.contains(secret), "leaked {secret}");
        }
    }

    let sent: String = seen.iter().map(|r| r.user.as_str()).collect();
    for placeholder in [
        "[NAME_REDACTED]",
        "[EMAIL_REDACTED]",
        "[PHONE_REDACTED]",
        "[ID_REDACTED]",
        "[CC_REDACTED]",
    ] {
        assert!(sent.contains(placeholder), "missing {placeholder}");
    }
}

#[tokio::test]
async fn test_every_chunk_failing_yields_empty_report() {
    let model = Arc::new(StatementModel::default());
    let worker = ExtractionWorker::new(model.clone(), &config(), 2025);
    let report = ExtractionOrchestrator::new(Arc::new(worker))
        .with_max_chunk_chars(4)
        .analyze_report("FAIL\nFAIL\nFAIL")
        .await;

    assert_eq!(report.chunk_count, 3);
    assert!(report.came_back_empty());
    assert_eq!(model.seen.lock().unwrap().len(), 3);
}
