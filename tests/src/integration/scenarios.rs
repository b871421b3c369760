//! # End-to-End Ledger Scenarios
//!
//! Codec, Merkle tree and ledger working together through the public API:
//!
//! 1. **Scenario A**: deposit, then transfer to a second owner
//! 2. **Scenario B**: the same transfer again is a double spend
//! 3. **Scenario C**: a transfer signed by a stranger is refused
//! 4. **Scenario D**: block submission needs the authority key
//!
//! Every refused call must leave the ledger exactly as it was.

#[cfg(test)]
mod tests {
    use crate::fixtures::{signed_transfer, Account, TestChain};
    use pc_01_transaction_codec::{Slot, Transaction, TxOutput};
    use pc_02_fixed_merkle::{FixedMerkleTree, MerkleProof};
    use pc_03_utxo_ledger::{
        BlockKind, ChildChainApi, ChildChainError, ErrorKind, LedgerReader, UtxoEntry,
    };
    use shared_types::{UtxoPosition, U256};

    /// Everything observable about the ledger, for before/after comparison.
    fn snapshot(
        net: &TestChain,
        positions: &[UtxoPosition],
    ) -> (u64, usize, Vec<Transaction>, Vec<Option<UtxoEntry>>) {
        (
            net.chain.current_block_number(),
            net.chain.block_count(),
            net.chain.pending_transactions(),
            positions.iter().map(|p| net.chain.utxo(p)).collect(),
        )
    }

    // =============================================================================
    // SCENARIOS A-D
    // =============================================================================

    #[test]
    fn test_scenario_a_deposit_then_transfer() {
        let net = TestChain::new();
        let owner1 = Account::random();
        let owner2 = Account::random();

        let deposit = net.deposit(owner1.address, 100);
        let tx_pos = net
            .chain
            .apply_transaction(signed_transfer(deposit, owner2.address, 100, &owner1.key))
            .unwrap();

        let created = net.chain.utxo(&tx_pos).unwrap();
        assert_eq!(created.owner, owner2.address);
        assert_eq!(created.amount, U256::from(100u64));
        assert!(!created.spent);
        assert!(net.chain.utxo(&deposit).unwrap().spent);
    }

    #[test]
    fn test_scenario_b_repeated_transfer_is_double_spend() {
        let net = TestChain::new();
        let owner1 = Account::random();
        let owner2 = Account::random();
        let deposit = net.deposit(owner1.address, 100);
        let tx = signed_transfer(deposit, owner2.address, 100, &owner1.key);
        let tx_pos = net.chain.apply_transaction(tx.clone()).unwrap();

        let watched = [deposit, tx_pos];
        let before = snapshot(&net, &watched);
        let err = net.chain.apply_transaction(tx).unwrap_err();

        assert_eq!(err, ChildChainError::UtxoAlreadySpent { position: deposit });
        assert_eq!(err.kind(), ErrorKind::Ledger);
        assert_eq!(snapshot(&net, &watched), before);
    }

    #[test]
    fn test_scenario_c_stranger_signature_rejected() {
        let net = TestChain::new();
        let owner1 = Account::random();
        let owner2 = Account::random();
        let stranger = Account::random();
        let deposit = net.deposit(owner1.address, 100);

        let before = snapshot(&net, &[deposit]);
        let err = net
            .chain
            .apply_transaction(signed_transfer(deposit, owner2.address, 100, &stranger.key))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Signature);
        assert_eq!(snapshot(&net, &[deposit]), before);
    }

    #[test]
    fn test_scenario_c_missing_signature_rejected() {
        let net = TestChain::new();
        let owner1 = Account::random();
        let deposit = net.deposit(owner1.address, 100);

        let unsigned = Transaction::transfer(deposit, [2u8; 20], 100u64);
        let err = net.chain.apply_transaction(unsigned).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Signature);
        assert!(!net.chain.utxo(&deposit).unwrap().spent);
    }

    #[test]
    fn test_scenario_d_block_submission_needs_authority() {
        let net = TestChain::new();
        let owner1 = Account::random();
        let deposit = net.deposit(owner1.address, 100);
        net.chain
            .apply_transaction(signed_transfer(deposit, [2u8; 20], 100, &owner1.key))
            .unwrap();
        let before = snapshot(&net, &[deposit]);

        let err = net.chain.submit_block(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(snapshot(&net, &[deposit]), before);

        let err = net.chain.submit_block(Some(&owner1.key)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(snapshot(&net, &[deposit]), before);

        let interval = net.chain.config().child_block_interval;
        let old = net.chain.current_block_number();
        let block = net.submit();
        assert_eq!(net.chain.current_block_number(), old + interval);
        assert_eq!(block.number, old);
        assert_eq!(block.transactions.len(), 1);
        assert!(net.chain.pending_transactions().is_empty());
    }

    // =============================================================================
    // BLOCK COMMITMENTS
    // =============================================================================

    #[test]
    fn test_finalized_block_root_matches_independent_tree() {
        let net = TestChain::new();
        let alice = Account::random();
        let bob = Account::random();

        let mut txs = Vec::new();
        for amount in [10u64, 20, 30] {
            let deposit = net.deposit(alice.address, amount);
            let tx = signed_transfer(deposit, bob.address, amount, &alice.key);
            net.chain.apply_transaction(tx.clone()).unwrap();
            txs.push(tx);
        }
        let block = net.submit();

        let leaves = txs.iter().map(Transaction::merkle_hash).collect();
        let tree = FixedMerkleTree::new(16, leaves).unwrap();
        assert_eq!(block.root, tree.root());

        for (index, tx) in txs.iter().enumerate() {
            let proof = tree.membership_proof(&tx.merkle_hash()).unwrap();
            assert_eq!(proof.index, index);
            let wire = MerkleProof::from_bytes(index, &proof.to_bytes()).unwrap();
            assert!(wire.verify(&tx.merkle_hash(), &block.root));
        }
    }

    #[test]
    fn test_deposit_block_numbering_across_submissions() {
        let net = TestChain::new();
        let alice = Account::random();

        assert_eq!(net.deposit(alice.address, 1).blknum(), 1);
        assert_eq!(net.deposit(alice.address, 1).blknum(), 2);
        net.submit();
        assert_eq!(net.deposit(alice.address, 1).blknum(), 1001);
        net.submit();
        net.submit();
        assert_eq!(net.deposit(alice.address, 1).blknum(), 3001);

        let block = net.chain.block(3001).unwrap();
        assert_eq!(block.kind, BlockKind::Deposit);
        assert_eq!(block.transactions.len(), 1);
    }

    #[test]
    fn test_multi_hop_value_flow() {
        let net = TestChain::new();
        let alice = Account::random();
        let bob = Account::random();
        let carol = Account::random();

        let d1 = net.deposit(alice.address, 70);
        let d2 = net.deposit(alice.address, 30);

        // Alice merges both deposits and splits to Bob and herself, paying a fee
        let mut merge = Transaction::new(
            [d1, d2],
            [
                TxOutput::new(bob.address, 60u64),
                TxOutput::new(alice.address, 35u64),
            ],
            5u64,
        );
        merge.sign(Slot::First, &alice.key).unwrap();
        merge.sign(Slot::Second, &alice.key).unwrap();
        let merge_pos = net.chain.apply_transaction(merge).unwrap();
        net.submit();

        let bob_utxo = merge_pos.with_output(0).unwrap();
        let pay = signed_transfer(bob_utxo, carol.address, 60, &bob.key);
        let pay_pos = net.chain.apply_transaction(pay).unwrap();
        net.submit();

        assert_eq!(net.chain.utxos_owned_by(&carol.address).len(), 1);
        assert_eq!(net.chain.utxos_owned_by(&bob.address).len(), 0);
        let alice_utxos = net.chain.utxos_owned_by(&alice.address);
        assert_eq!(alice_utxos.len(), 1);
        assert_eq!(alice_utxos[0].0, merge_pos.with_output(1).unwrap());
        assert_eq!(net.chain.transaction(pay_pos.blknum(), 0).unwrap().inputs[0], bob_utxo);
    }

    #[test]
    fn test_unbalanced_transfer_rejected() {
        let net = TestChain::new();
        let alice = Account::random();
        let deposit = net.deposit(alice.address, 100);

        let err = net
            .chain
            .apply_transaction(signed_transfer(deposit, [2u8; 20], 101, &alice.key))
            .unwrap_err();
        assert!(matches!(err, ChildChainError::BalanceMismatch { .. }));

        let err = net
            .chain
            .apply_transaction(signed_transfer(deposit, [2u8; 20], 99, &alice.key))
            .unwrap_err();
        assert!(matches!(err, ChildChainError::BalanceMismatch { .. }));
        assert!(!net.chain.utxo(&deposit).unwrap().spent);
    }

    #[test]
    fn test_wire_round_trip_through_ledger() {
        let net = TestChain::new();
        let alice = Account::random();
        let deposit = net.deposit(alice.address, 100);

        let tx = signed_transfer(deposit, [2u8; 20], 100, &alice.key);
        let received = Transaction::decode(&tx.encode()).unwrap();
        assert_eq!(received.sender(Slot::First).unwrap(), alice.address);

        let tx_pos = net.chain.apply_transaction(received).unwrap();
        assert_eq!(net.chain.transaction(tx_pos.blknum(), tx_pos.txindex()).unwrap(), tx);
    }
}
