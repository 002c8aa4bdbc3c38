use alloy_primitives::{Address, U256};
use beacon_miner_primitives::{ChainConfig, Fork};
use beacon_miner_test_utils::{
    engine::{MockEngine, VAL_SET_DIFF},
    node::TestHarness,
    tx::tx,
    ALICE, BOB, CAROL, CUSD, DEV_CHAIN_ID, VALIDATOR,
};

#[test]
fn block_receipt_for_finalization_logs() {
    let harness = TestHarness::builder().build();
    harness
        .engine
        .set_block_reward(Some((VALIDATOR, U256::from(1_000))));
    harness.pool.extend([tx(ALICE).call(), tx(BOB).call()]);

    let mut block = harness.fill().unwrap();
    let assembled = block.finalize_and_assemble(&harness.worker).unwrap();
    assert_eq!(block.receipts().len(), 3);
    assert_eq!(block.transaction_receipts().len(), assembled.transactions.len());
    assert!(block
        .transaction_receipts()
        .iter()
        .zip(assembled.transactions())
        .all(|(receipt, tx)| receipt.tx_hash == tx.hash()));
    drop(block);

    let built = harness.build().unwrap();

    assert_eq!(built.block.transactions.len(), 2);
    assert_eq!(built.receipts.len(), 3);
    let block_receipt = built.receipts.last().unwrap();
    assert_eq!(block_receipt.tx_hash, built.block.hash());
    assert_eq!(block_receipt.gas_used, 0);
    assert_eq!(block_receipt.cumulative_gas_used, 42_000);
    assert_eq!(block_receipt.logs.len(), 1);
    assert_eq!(block_receipt.logs[0].address, VALIDATOR);
}

#[test]
fn no_block_receipt_without_finalization_logs() {
    let harness = TestHarness::builder().build();
    harness.pool.add(tx(ALICE).call());

    let built = harness.build().unwrap();

    assert_eq!(built.receipts.len(), built.block.transactions.len());
    assert_eq!(built.block.header.gas_used, 21_000);
    assert_eq!(harness.engine.finalized(), 1);
}

#[test]
fn validator_set_diff_written_at_epoch_end() {
    let harness = TestHarness::builder()
        .engine(MockEngine::with_epoch_size(1))
        .build();
    harness
        .engine
        .set_block_reward(Some((VALIDATOR, U256::from(1))));

    let built = harness.build().unwrap();

    assert_eq!(built.block.header.extra_data, VAL_SET_DIFF);
    assert_eq!(harness.engine.validator().unwrap().diffs(), 1);
    // The block receipt refers to the header including the diff.
    assert_eq!(built.receipts.last().unwrap().tx_hash, built.block.hash());
}

#[test]
fn no_validator_set_diff_mid_epoch() {
    let harness = TestHarness::builder().build();

    let built = harness.build().unwrap();

    assert!(built.block.header.extra_data.is_empty());
    assert_eq!(harness.engine.validator().unwrap().diffs(), 0);
}

#[test]
fn fees_over_gas_price_minimum_in_native_terms() {
    let harness = TestHarness::builder().build();
    harness.pool.extend([
        tx(ALICE).gas_price(10).call(),
        tx(BOB).fee_currency(CUSD).gas_price(10).call(),
    ]);

    let built = harness.build().unwrap();

    // Minimum 1: each pays a tip of 9 for 21000 gas, the cUSD half counts half.
    assert_eq!(built.block.transactions.len(), 2);
    assert_eq!(built.fees, U256::from(21_000 * 9 + 21_000 * 9 / 2));
}

#[test]
fn fees_before_currency_base_fee_fork() {
    let harness = TestHarness::builder()
        .chain_config(ChainConfig::all_active(DEV_CHAIN_ID).with_fork(Fork::CurrencyBaseFee, None))
        .build();
    harness.pool.add(tx(ALICE).gas_price(10).call());

    let built = harness.build().unwrap();

    assert_eq!(built.fees, U256::from(21_000 * 10));
}

#[test]
fn unconvertible_fees_count_as_zero() {
    let harness = TestHarness::builder().build();
    let unknown = Address::with_last_byte(0x77);
    harness.pool.extend([
        tx(ALICE).gas_price(10).call(),
        tx(CAROL).fee_currency(unknown).gas_price(10).call(),
    ]);

    let built = harness.build().unwrap();

    assert_eq!(built.block.transactions.len(), 2);
    assert_eq!(built.fees, U256::from(21_000 * 9));
}
