use anyhow::Result;
use reward_correlator::config::ScanMode;
use reward_correlator::explorer::ExplorerClient;
use reward_correlator::processor::{Correlator, ScanControl};
use reward_correlator::types::ScanTermination;
use std::time::Instant;

use crate::common::explorer_helpers::{local_explorer_config, serve_responses};
use crate::common::fixtures::*;
use crate::common::stub_explorer::{calls, StubExplorer};

/// Tests for the backward scanner in page and block modes
///
/// Covers each termination reason, deduplication of multi-row transactions
/// and the ordering of collected packs.

/// Three rewarded purchases at blocks 300, 200 and 100
fn three_purchases() -> StubExplorer {
    let mut stub = StubExplorer::new();
    for (id, block) in [(1u64, 100u64), (2, 200), (3, 300)] {
        stub = stub
            .with_purchase(&tx_hash(id), BUYER, block, vec![purchase_log()])
            .with_transfer(reward_transfer(
                &tx_hash(100 + id),
                BUYER,
                block + 3,
                REWARD_TOKEN,
                "RWD",
                "1000000000000000000",
                Some(18),
            ));
    }
    stub
}

#[tokio::test]
async fn test_page_scan_stops_at_target() -> Result<()> {
    let correlator = Correlator::new(three_purchases(), tracker_config());

    let report = correlator.scan_backward(2, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::TargetReached);
    assert_eq!(report.units_scanned, 1);

    let blocks: Vec<u64> = report.packs.iter().map(|p| p.buy_block).collect();
    assert_eq!(blocks, vec![300, 200]);
    assert_eq!(report.rewarded_count(), 2);
    assert_eq!(report.packs[0].reward.as_ref().unwrap().delay_blocks, 3);

    // The purchase at block 100 was never classified
    assert_eq!(calls(&correlator.api().tx_transfer_calls), 2);
    Ok(())
}

#[tokio::test]
async fn test_empty_page_exhausts_history() -> Result<()> {
    let correlator = Correlator::new(three_purchases(), tracker_config());

    let report = correlator.scan_backward(10, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::Exhausted);
    assert_eq!(report.packs.len(), 3);
    // The short first page is not trusted; the empty second page ends the scan
    assert_eq!(report.units_scanned, 2);
    Ok(())
}

#[tokio::test]
async fn test_empty_history_exhausted() -> Result<()> {
    let correlator = Correlator::new(StubExplorer::new(), tracker_config());

    let report = correlator.scan_backward(1, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::Exhausted);
    assert!(report.packs.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_multi_row_transaction_checked_once() -> Result<()> {
    let hash = tx_hash(7);
    let stub = StubExplorer::new()
        .with_purchase(&hash, BUYER, 500, vec![purchase_log()])
        .with_transfer(purchase_transfer(&hash, BUYER, 500))
        .with_transfer(purchase_transfer(&hash, BUYER, 500));
    let correlator = Correlator::new(stub, tracker_config());

    let report = correlator.scan_backward(5, ScanControl::new()).await?;
    assert_eq!(report.packs.len(), 1);
    assert_eq!(report.candidates_checked, 1);
    assert_eq!(calls(&correlator.api().tx_transfer_calls), 1);
    assert!(report.packs[0].reward.is_none());
    Ok(())
}

#[tokio::test]
async fn test_safety_bound_on_full_pages() -> Result<()> {
    let mut stub = StubExplorer::new();
    for id in 1..=10u64 {
        stub = stub.with_transfer(unrelated_transfer(&tx_hash(id), id));
    }
    let mut config = tracker_config();
    config.page_size = 2;
    config.max_scan_units = 3;
    let correlator = Correlator::new(stub, config);

    let report = correlator.scan_backward(1, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::SafetyBound);
    assert_eq!(report.units_scanned, 3);
    assert_eq!(report.candidates_checked, 0);

    let pages: Vec<Option<u64>> = correlator
        .api()
        .address_queries()
        .iter()
        .map(|q| q.page)
        .collect();
    assert_eq!(pages, vec![Some(1), Some(2), Some(3)]);
    Ok(())
}

#[tokio::test]
async fn test_non_qualifying_candidates_skipped() -> Result<()> {
    let stub = StubExplorer::new()
        .with_purchase(&tx_hash(1), BUYER, 100, vec![event_log(OTHER_TOPIC, "0x")])
        .with_purchase(&tx_hash(2), OTHER_BUYER, 90, vec![purchase_log()]);
    let correlator = Correlator::new(stub, tracker_config());

    let report = correlator.scan_backward(5, ScanControl::new()).await?;
    assert_eq!(report.candidates_checked, 2);
    assert_eq!(report.packs.len(), 1);
    assert_eq!(report.packs[0].buyer, OTHER_BUYER);
    Ok(())
}

#[tokio::test]
async fn test_stop_requested_before_first_unit() -> Result<()> {
    let correlator = Correlator::new(three_purchases(), tracker_config());
    let control = ScanControl::new();
    control.clone().request_stop();

    let report = correlator.scan_backward(2, control).await?;
    assert_eq!(report.termination, ScanTermination::Cancelled);
    assert_eq!(report.units_scanned, 0);
    assert_eq!(calls(&correlator.api().address_calls), 0);
    Ok(())
}

#[tokio::test]
async fn test_expired_deadline_cancels() -> Result<()> {
    let correlator = Correlator::new(three_purchases(), tracker_config());
    let control = ScanControl::new().with_deadline(Instant::now());

    let report = correlator.scan_backward(2, control).await?;
    assert_eq!(report.termination, ScanTermination::Cancelled);
    assert!(report.packs.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_zero_target_does_no_work() -> Result<()> {
    let correlator = Correlator::new(three_purchases(), tracker_config());

    let report = correlator.scan_backward(0, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::TargetReached);
    assert_eq!(calls(&correlator.api().address_calls), 0);
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_aborts_scan() {
    let stub = three_purchases().failing_logs();
    let correlator = Correlator::new(stub, tracker_config());

    assert!(correlator.scan_backward(2, ScanControl::new()).await.is_err());
}

#[tokio::test]
async fn test_block_scan_from_head() -> Result<()> {
    let stub = StubExplorer::new()
        .with_head(105)
        .with_purchase(&tx_hash(1), BUYER, 103, vec![purchase_log()])
        .with_purchase(&tx_hash(2), OTHER_BUYER, 101, vec![purchase_log()]);
    let mut config = tracker_config();
    config.scan_mode = ScanMode::Blocks;
    let correlator = Correlator::new(stub, config);

    let report = correlator.scan_backward(2, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::TargetReached);
    assert_eq!(report.units_scanned, 5);
    assert_eq!(calls(&correlator.api().head_calls), 1);

    let blocks: Vec<u64> = report.packs.iter().map(|p| p.buy_block).collect();
    assert_eq!(blocks, vec![103, 101]);
    Ok(())
}

#[tokio::test]
async fn test_block_scan_from_pinned_start() -> Result<()> {
    let stub = StubExplorer::new()
        .with_head(1_000)
        .with_purchase(&tx_hash(1), BUYER, 103, vec![purchase_log()]);
    let mut config = tracker_config();
    config.scan_mode = ScanMode::Blocks;
    let correlator = Correlator::new(stub, config);

    let report = correlator
        .scan_backward_from(1, Some(104), ScanControl::new())
        .await?;
    assert_eq!(report.packs.len(), 1);
    assert_eq!(report.units_scanned, 2);
    assert_eq!(calls(&correlator.api().head_calls), 0);
    Ok(())
}

#[tokio::test]
async fn test_block_scan_exhausts_at_genesis() -> Result<()> {
    let stub = StubExplorer::new().with_head(2);
    let mut config = tracker_config();
    config.scan_mode = ScanMode::Blocks;
    let correlator = Correlator::new(stub, config);

    let report = correlator.scan_backward(1, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::Exhausted);
    assert_eq!(report.units_scanned, 3);
    Ok(())
}

#[tokio::test]
async fn test_block_scan_without_head() -> Result<()> {
    let mut config = tracker_config();
    config.scan_mode = ScanMode::Blocks;
    let correlator = Correlator::new(StubExplorer::new(), config);

    let report = correlator.scan_backward(1, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::Exhausted);
    assert_eq!(report.units_scanned, 0);
    Ok(())
}

#[tokio::test]
async fn test_block_scan_safety_bound() -> Result<()> {
    let stub = StubExplorer::new().with_head(1_000);
    let mut config = tracker_config();
    config.scan_mode = ScanMode::Blocks;
    config.max_scan_units = 4;
    let correlator = Correlator::new(stub, config);

    let report = correlator.scan_backward(1, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::SafetyBound);
    assert_eq!(report.units_scanned, 4);

    let last = correlator.api().address_queries().pop().unwrap();
    assert_eq!(last.start_block, Some(997));
    assert_eq!(last.end_block, Some(997));
    Ok(())
}

fn transfer_row(hash: Option<&str>, from: &str, token: &str, block: u64) -> serde_json::Value {
    let mut row = serde_json::json!({
        "blockNumber": block.to_string(),
        "from": from,
        "to": TARGET_CONTRACT,
        "contractAddress": token,
        "tokenSymbol": "USDC",
        "tokenDecimal": "6",
        "value": "500000000"
    });
    if let Some(hash) = hash {
        row["hash"] = serde_json::json!(hash);
    }
    row
}

fn result_body(rows: Vec<serde_json::Value>) -> String {
    serde_json::json!({"status": "1", "message": "OK", "result": rows}).to_string()
}

#[tokio::test]
async fn test_page_with_unusable_row_does_not_end_scan() -> Result<()> {
    let purchase_hash = tx_hash(9);
    let purchase = transfer_row(Some(purchase_hash.as_str()), BUYER, PURCHASE_ASSET, 300);
    let log = serde_json::json!({
        "address": TARGET_CONTRACT,
        "topics": [PURCHASE_TOPIC],
        "data": "0x"
    });

    let (url, server) = serve_responses(vec![
        // Full page whose first row has no hash and is dropped while parsing
        (
            200,
            result_body(vec![
                transfer_row(None, OTHER_BUYER, PURCHASE_ASSET, 400),
                transfer_row(Some(tx_hash(8).as_str()), OTHER_BUYER, OTHER_TOKEN, 399),
            ]),
        ),
        (200, result_body(vec![purchase.clone()])),
        // Classification of the purchase, then its reward window
        (200, result_body(vec![purchase])),
        (200, result_body(vec![log])),
        (200, result_body(vec![])),
        (200, result_body(vec![])),
    ])
    .await?;

    let mut config = tracker_config();
    config.page_size = 2;
    let correlator = Correlator::new(ExplorerClient::new(local_explorer_config(&url))?, config);

    let report = correlator.scan_backward(5, ScanControl::new()).await?;
    assert_eq!(report.termination, ScanTermination::Exhausted);
    assert_eq!(report.units_scanned, 3);
    assert_eq!(report.candidates_checked, 1);
    assert_eq!(report.packs.len(), 1);
    assert_eq!(report.packs[0].buy_tx_hash, purchase_hash);

    let requests = server.await?;
    assert!(requests[1].contains("page=2"));
    assert!(requests[5].contains("page=3"));
    Ok(())
}
