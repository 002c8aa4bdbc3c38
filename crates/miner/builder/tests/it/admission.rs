use alloy_primitives::{Address, U256};
use beacon_miner::{
    error::{ApplyError, PoolError},
    CommitLoopState,
};
use beacon_miner_primitives::{constants::MAX_TX_DATA_PER_BLOCK, ChainConfig, Fork};
use beacon_miner_test_utils::{
    node::{miner_config, TestHarness},
    state::MockState,
    tx::tx,
    ALICE, BOB, CAROL, CUSD, DAVE, DEV_CHAIN_ID, REVERTING_CONTRACT,
};
use test_case::test_case;

#[test]
fn higher_tip_first_until_gas_runs_out() {
    let harness = TestHarness::builder().gas_limit(70_000).build();
    harness.pool.extend([
        tx(ALICE).nonce(0).gas_price(10).call(),
        tx(ALICE).nonce(1).gas_price(10).call(),
        tx(BOB).nonce(0).gas_price(20).call(),
    ]);

    let (block, state) = harness.commit().unwrap();

    assert_eq!(state, CommitLoopState::Done);
    assert_eq!(TestHarness::included(&block), vec![(BOB, 0), (ALICE, 0)]);
    assert_eq!(block.header().gas_used, 42_000);
    assert_eq!(block.gas_pool().gas(), 28_000);
    assert_eq!(block.tx_count(), 2);
}

#[test]
fn nonce_too_low_skips_only_the_transaction() {
    let mut genesis = MockState::funded(&[ALICE, BOB]);
    genesis.set_nonce(ALICE, 1);
    let harness = TestHarness::builder().genesis(genesis).build();
    harness.pool.extend([tx(ALICE).nonce(0).call(), tx(ALICE).nonce(1).call()]);

    let block = harness.fill().unwrap();

    assert_eq!(TestHarness::included(&block), vec![(ALICE, 1)]);
}

#[test]
fn nonce_too_high_drops_the_account() {
    let harness = TestHarness::builder().build();
    harness.pool.extend([
        tx(ALICE).nonce(1).gas_price(50).call(),
        tx(ALICE).nonce(2).gas_price(50).call(),
        tx(BOB).nonce(0).call(),
    ]);

    let block = harness.fill().unwrap();

    assert_eq!(TestHarness::included(&block), vec![(BOB, 0)]);
}

#[test]
fn fee_currency_limited_to_its_share_of_block_gas() {
    let mut config = miner_config();
    config.fee_currency_limits.insert(CUSD, 0.5);
    let harness = TestHarness::builder()
        .gas_limit(100_000)
        .config(config)
        .build();
    harness.pool.extend([
        tx(ALICE).fee_currency(CUSD).gas_price(100).call(),
        tx(CAROL).fee_currency(CUSD).gas_price(100).call(),
        tx(BOB).gas_price(10).call(),
    ]);

    let block = harness.fill().unwrap();

    // The second cUSD transaction needs 30000 gas but only 29000 remain in the
    // cUSD pool.
    assert_eq!(TestHarness::included(&block), vec![(ALICE, 0), (BOB, 0)]);
    assert_eq!(block.multi_gas_pool().pool_for(Some(CUSD)).gas(), 29_000);
    assert_eq!(block.multi_gas_pool().pool_for(None).gas(), 79_000);
    assert_eq!(block.gas_pool().gas(), 58_000);
}

#[test]
fn non_whitelisted_currency_uses_the_native_pool() {
    let unknown = Address::with_last_byte(0x77);
    let harness = TestHarness::builder().gas_limit(100_000).build();
    harness.pool.add(tx(ALICE).fee_currency(unknown).call());

    let block = harness.fill().unwrap();

    assert_eq!(TestHarness::included(&block), vec![(ALICE, 0)]);
    assert_eq!(block.multi_gas_pool().pool_for(None).gas(), 79_000);
    assert_eq!(block.multi_gas_pool().pool_for(Some(CUSD)).gas(), 50_000);
}

fn large_tx(signer: Address, gas_price: u64) -> beacon_miner_primitives::Transaction {
    tx(signer)
        .gas_price(gas_price)
        .gas_limit(60_000_000)
        .input(vec![0xab; 3 * 1024 * 1024])
        .call()
}

#[test]
fn byte_budget_limits_block_size() {
    let harness = TestHarness::builder().gas_limit(200_000_000).build();
    let large = large_tx(ALICE, 30);
    let small = tx(BOB).gas_price(10).call();
    harness
        .pool
        .extend([large.clone(), large_tx(CAROL, 20), small.clone()]);

    let block = harness.fill().unwrap();

    assert_eq!(TestHarness::included(&block), vec![(ALICE, 0), (BOB, 0)]);
    assert_eq!(
        block.bytes_block().unwrap().bytes_left(),
        MAX_TX_DATA_PER_BLOCK - large.size() - small.size()
    );
}

#[test]
fn no_byte_budget_before_the_fork() {
    let harness = TestHarness::builder()
        .gas_limit(200_000_000)
        .chain_config(ChainConfig::all_active(DEV_CHAIN_ID).with_fork(Fork::TxBytesLimit, None))
        .build();
    harness
        .pool
        .extend([large_tx(ALICE, 30), large_tx(CAROL, 20), tx(BOB).call()]);

    let block = harness.fill().unwrap();

    assert!(block.bytes_block().is_none());
    assert_eq!(
        TestHarness::included(&block),
        vec![(ALICE, 0), (CAROL, 0), (BOB, 0)]
    );
}

#[test_case(Some(0), true ; "protected after the fork")]
#[test_case(Some(0), false ; "unprotected after the fork")]
#[test_case(None, true ; "protected before the fork")]
#[test_case(None, false ; "unprotected before the fork")]
fn replay_protection(fork: Option<u64>, protected: bool) {
    let harness = TestHarness::builder()
        .chain_config(ChainConfig::all_active(DEV_CHAIN_ID).with_fork(Fork::ReplayProtection, fork))
        .build();
    harness.pool.add(tx(ALICE).protected(protected).call());

    let block = harness.fill().unwrap();

    let included = fork.is_some() == protected;
    assert_eq!(block.transactions().len(), usize::from(included));
}

#[test_case(Some(0), false ; "rejected after the fork")]
#[test_case(None, true ; "accepted before the fork")]
fn gateway_fee(fork: Option<u64>, included: bool) {
    let harness = TestHarness::builder()
        .chain_config(ChainConfig::all_active(DEV_CHAIN_ID).with_fork(Fork::BaseFee, fork))
        .build();
    harness
        .pool
        .add(tx(ALICE).gateway_fee_recipient(DAVE).gateway_fee(5).call());

    let block = harness.fill().unwrap();

    assert_eq!(block.transactions().len(), usize::from(included));
}

#[test]
fn price_floor_stops_the_loop() {
    let harness = TestHarness::builder().build();
    harness.params.set_gas_price_minimum(None, 15);
    harness.pool.extend([
        tx(ALICE).gas_price(20).call(),
        tx(BOB).gas_price(10).call(),
        tx(CAROL).gas_price(5).call(),
    ]);

    let (block, state) = harness.commit().unwrap();

    assert_eq!(state, CommitLoopState::StoppedPriceFloor);
    assert_eq!(TestHarness::included(&block), vec![(ALICE, 0)]);
    assert_eq!(block.price_floor(), Some(U256::ZERO));
    let state = block.state();
    assert_eq!(state.nonce(BOB), 0);
    assert_eq!(state.nonce(CAROL), 0);
}

#[test]
fn price_floor_of_locals_holds_for_remotes() {
    let harness = TestHarness::builder().build();
    harness.params.set_gas_price_minimum(None, 15);
    harness.pool.add_local(ALICE);
    harness.pool.extend([
        // Fee cap below the minimum, ranked at a zero tip.
        tx(ALICE).gas_price(10).call(),
        // Meets the minimum but is ranked at the same zero tip.
        tx(BOB).gas_price(0).max_fee_per_gas(15).call(),
        tx(CAROL).gas_price(20).call(),
    ]);

    let (block, state) = harness.commit().unwrap();

    assert_eq!(state, CommitLoopState::Done);
    assert_eq!(TestHarness::included(&block), vec![(CAROL, 0)]);
    assert_eq!(block.price_floor(), Some(U256::ZERO));
    assert_eq!(block.state().nonce(BOB), 0);
}

#[test]
fn remotes_unaffected_without_a_local_price_floor() {
    let harness = TestHarness::builder().build();
    harness.params.set_gas_price_minimum(None, 15);
    harness.pool.add_local(ALICE);
    harness.pool.extend([
        tx(ALICE).gas_price(20).call(),
        tx(BOB).gas_price(0).max_fee_per_gas(15).call(),
    ]);

    let (block, state) = harness.commit().unwrap();

    assert_eq!(state, CommitLoopState::Done);
    assert_eq!(TestHarness::included(&block), vec![(ALICE, 0), (BOB, 0)]);
    assert_eq!(block.price_floor(), None);
}

#[test]
fn failed_transaction_leaves_no_trace() {
    let harness = TestHarness::builder().build();
    let mut block = harness.worker.prepare_block().unwrap();

    let root = block.state().root();
    let gas = block.gas_pool().gas();
    let reverting = tx(ALICE).to(REVERTING_CONTRACT).value(1).call();

    let err = block
        .commit_transaction(&*harness.chain, &reverting)
        .unwrap_err();

    assert!(matches!(err, ApplyError::Execution(_)));
    assert_eq!(block.state().root(), root);
    assert_eq!(block.gas_pool().gas(), gas);
    assert!(block.transactions().is_empty());
    assert!(block.receipts().is_empty());
    assert_eq!(block.header().gas_used, 0);
}

#[test]
fn failed_transaction_skips_to_the_next() {
    let reference = TestHarness::builder().build();
    reference.pool.add(tx(BOB).call());
    let expected = reference.fill().unwrap();

    let harness = TestHarness::builder().build();
    harness.pool.extend([
        tx(ALICE).nonce(0).gas_price(20).to(REVERTING_CONTRACT).call(),
        tx(ALICE).nonce(1).gas_price(20).call(),
        tx(BOB).call(),
    ]);
    let block = harness.fill().unwrap();

    // The reverted nonce 0 leaves nonce 1 too high for the account.
    assert_eq!(TestHarness::included(&block), vec![(BOB, 0)]);
    assert_eq!(block.state().root(), expected.state().root());
    assert_eq!(block.gas_pool(), expected.gas_pool());
}

#[test]
fn unfunded_and_underpriced_intrinsic_gas_are_skipped() {
    let unfunded = Address::with_last_byte(0x99);
    let harness = TestHarness::builder().build();
    harness.pool.extend([
        tx(unfunded).gas_price(50).call(),
        tx(ALICE).gas_price(40).gas_limit(21_000).input(vec![1]).call(),
        tx(BOB).call(),
    ]);

    let block = harness.fill().unwrap();

    assert_eq!(TestHarness::included(&block), vec![(BOB, 0)]);
}

#[test]
fn locals_before_remotes() {
    let harness = TestHarness::builder().build();
    harness.pool.add_local(BOB);
    harness
        .pool
        .extend([tx(ALICE).gas_price(50).call(), tx(BOB).gas_price(2).call()]);

    let block = harness.fill().unwrap();

    assert_eq!(TestHarness::included(&block), vec![(BOB, 0), (ALICE, 0)]);
}

#[test]
fn stops_once_a_transfer_no_longer_fits() {
    let harness = TestHarness::builder().gas_limit(30_000).build();
    harness
        .pool
        .extend([tx(ALICE).call(), tx(ALICE).nonce(1).gas_limit(25_000).call()]);

    let (block, state) = harness.commit().unwrap();

    assert_eq!(state, CommitLoopState::StoppedGasExhausted);
    assert_eq!(TestHarness::included(&block), vec![(ALICE, 0)]);
    assert_eq!(block.gas_pool().gas(), 9_000);
}

#[test]
fn block_budgets_stay_consistent() {
    let harness = TestHarness::builder().gas_limit(150_000).build();
    harness.pool.extend([
        tx(ALICE).nonce(0).gas_price(12).call(),
        tx(ALICE).nonce(1).gas_price(12).input(vec![7; 100]).call(),
        tx(BOB).fee_currency(CUSD).gas_price(30).call(),
        tx(CAROL).gas_price(1).input(vec![1; 10]).call(),
        tx(DAVE).nonce(3).call(),
    ]);

    let block = harness.fill().unwrap();

    assert_eq!(block.tx_count(), block.transactions().len());
    assert_eq!(block.transactions().len(), block.receipts().len());
    assert_eq!(block.transaction_receipts(), block.receipts());
    assert_eq!(
        block.gas_pool().gas() + block.header().gas_used,
        block.gas_limit()
    );

    let mut cumulative = 0;
    for receipt in block.receipts() {
        cumulative += receipt.gas_used;
        assert_eq!(receipt.cumulative_gas_used, cumulative);
    }
    assert_eq!(cumulative, block.header().gas_used);

    let cusd_used: u64 = block
        .transactions()
        .iter()
        .zip(block.receipts())
        .filter(|(tx, _)| tx.fee_currency == Some(CUSD))
        .map(|(_, receipt)| receipt.gas_used)
        .sum();
    assert_eq!(cusd_used, 21_000);
    assert_eq!(
        block.multi_gas_pool().pool_for(Some(CUSD)).gas(),
        75_000 - cusd_used
    );

    let bytes: u64 = block.transactions().iter().map(|tx| tx.size()).sum();
    assert_eq!(
        block.bytes_block().unwrap().bytes_left(),
        MAX_TX_DATA_PER_BLOCK - bytes
    );
}

#[test]
fn rebuilding_gives_the_same_block() {
    let harness = TestHarness::builder().gas_limit(100_000).build();
    harness.pool.extend([
        tx(ALICE).gas_price(10).call(),
        tx(BOB).gas_price(10).call(),
        tx(CAROL).gas_price(10).call(),
        tx(DAVE).gas_price(10).call(),
    ]);

    let first = harness.fill().unwrap();
    let second = harness.fill().unwrap();

    assert_eq!(TestHarness::included(&first), TestHarness::included(&second));
    assert_eq!(first.receipts(), second.receipts());
    assert_eq!(first.state().root(), second.state().root());
}

#[test]
fn pool_failure_builds_an_empty_block() {
    let harness = TestHarness::builder().build();
    harness.pool.add(tx(ALICE).call());
    harness
        .pool
        .fail(Some(PoolError::Unavailable("shutting down".to_string())));

    let (block, state) = harness.commit().unwrap();
    assert_eq!(state, CommitLoopState::Done);
    assert!(block.transactions().is_empty());
    drop(block);

    let built = harness.build().unwrap();

    assert!(built.block.transactions.is_empty());
    assert_eq!(built.block.header.gas_used, 0);
}
