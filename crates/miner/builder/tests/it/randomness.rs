use alloy_primitives::B256;
use beacon_miner::{
    error::{ContractError, LedgerError, RandomnessError},
    BlockBuildError,
};
use beacon_miner_primitives::Randomness;
use beacon_miner_test_utils::{
    node::TestHarness, state::MockState, tx::tx, ALICE, BOB, VALIDATOR,
};

const LAST_COMMITMENT: B256 = B256::repeat_byte(0xc0);
const LAST_PARENT: B256 = B256::repeat_byte(0x9a);

/// A harness whose validator committed to randomness derived from
/// `LAST_PARENT` in an earlier block.
fn committed_harness() -> TestHarness {
    let mut genesis = MockState::funded(&[ALICE, BOB]);
    genesis.set_commitment(VALIDATOR, LAST_COMMITMENT);
    TestHarness::builder().genesis(genesis).build()
}

fn randomness(harness: &TestHarness, parent_hash: B256) -> (B256, B256) {
    harness.engine.validator().unwrap().randomness(parent_hash)
}

#[test]
fn first_commitment_reveals_nothing() {
    let harness = TestHarness::builder().build();
    let (_, commitment) = randomness(&harness, harness.chain.head().hash());

    let block = harness.worker.prepare_block().unwrap();

    assert_eq!(*block.randomness(), Randomness::new(B256::ZERO, commitment));
    assert_eq!(block.state().commitment(VALIDATOR), commitment);
    assert_eq!(harness.random.reveals(), vec![(B256::ZERO, commitment)]);
    assert_eq!(harness.cache.recoveries(), 0);
}

#[test]
fn reveals_the_previous_commitment() {
    let harness = committed_harness();
    harness.cache.insert(LAST_COMMITMENT, LAST_PARENT);
    let (revealed, _) = randomness(&harness, LAST_PARENT);
    let (_, commitment) = randomness(&harness, harness.chain.head().hash());

    let block = harness.worker.prepare_block().unwrap();

    assert_eq!(*block.randomness(), Randomness::new(revealed, commitment));
    assert_eq!(block.state().commitment(VALIDATOR), commitment);
    assert_eq!(harness.cache.recoveries(), 0);
}

#[test]
fn recovers_from_a_cache_miss() {
    let harness = committed_harness();
    harness.cache.insert_history(LAST_COMMITMENT, LAST_PARENT);
    let (revealed, _) = randomness(&harness, LAST_PARENT);

    let block = harness.worker.prepare_block().unwrap();

    assert_eq!(block.randomness().revealed, revealed);
    assert_eq!(harness.cache.recoveries(), 1);
}

#[test]
fn unrecoverable_cache_miss_aborts() {
    let harness = committed_harness();
    harness.pool.add(tx(ALICE).call());

    let err = harness.build().unwrap_err();

    assert_eq!(
        err,
        BlockBuildError::RandomnessUnavailable(RandomnessError::CacheMiss(LAST_COMMITMENT))
    );
    assert_eq!(harness.cache.recoveries(), 1);
    assert!(harness.random.reveals().is_empty());
    assert_eq!(harness.chain.tracker().active(), 0);
    assert!(harness.worker.is_running());
}

#[test]
fn failed_recovery_aborts() {
    let harness = committed_harness();
    let err = LedgerError::MissingBlock(LAST_PARENT);
    harness.cache.fail_recovery(Some(err.clone()));

    let result = harness.worker.prepare_block();

    assert_eq!(
        result.unwrap_err(),
        BlockBuildError::RandomnessUnavailable(RandomnessError::Recovery(err))
    );
}

#[test]
fn failed_reveal_aborts() {
    let harness = TestHarness::builder().build();
    let err = ContractError::Reverted("not a validator".to_string());
    harness.random.fail_reveal(Some(err.clone()));

    let result = harness.worker.prepare_block();

    assert_eq!(
        result.unwrap_err(),
        BlockBuildError::RandomnessUnavailable(RandomnessError::RevealAndCommit(err))
    );
    assert_eq!(harness.chain.tracker().active(), 0);
}

#[test]
fn inactive_beacon_is_skipped() {
    let harness = committed_harness();
    harness.random.set_running(false);

    let block = harness.worker.prepare_block().unwrap();

    assert!(block.randomness().is_empty());
    assert_eq!(block.state().commitment(VALIDATOR), LAST_COMMITMENT);
    assert_eq!(harness.cache.recoveries(), 0);
}

#[test]
fn built_block_carries_the_randomness() {
    let harness = TestHarness::builder().build();
    let (_, commitment) = randomness(&harness, harness.chain.head().hash());

    let built = harness.build().unwrap();

    assert_eq!(built.block.randomness, Randomness::new(B256::ZERO, commitment));
}
