use agora_core::{Block, Chain, Node, NullStore, TokenType, Transaction, FAUCET_ADDRESS};

fn node(id: &str) -> Node {
    Node::new(id, Box::new(NullStore))
}

fn mine(n: &mut Node, txs: &[(&str, &str, u64, TokenType)]) -> Block {
    for &(sender, recipient, amount, token) in txs {
        n.add_transaction(sender, recipient, amount, token)
            .expect("admission");
    }
    let validator = n.identifier().to_string();
    n.create_new_block(&validator).expect("forge")
}

#[test]
fn all_fresh_nodes_share_the_genesis_hash() {
    let a = node("node_0");
    let b = node("node_1");
    let c = node("node_2");
    assert_eq!(a.last_block().hash, b.last_block().hash);
    assert_eq!(b.last_block().hash, c.last_block().hash);
    assert_eq!(a.last_block().previous_hash, "0");
    assert_eq!(a.last_block().validator, "Genesis");
}

#[test]
fn hash_continuity_holds_across_forged_blocks() {
    let mut n = node("node_0");
    mine(&mut n, &[(FAUCET_ADDRESS, "w1", 10, TokenType::Main)]);
    mine(&mut n, &[(FAUCET_ADDRESS, "w2", 20, TokenType::Second)]);

    let blocks = n.chain().blocks();
    for i in 1..blocks.len() {
        assert_eq!(blocks[i].previous_hash, blocks[i - 1].hash);
        assert!(blocks[i].verify_hash());
    }
    assert!(Chain::is_valid(blocks));
}

#[test]
fn forged_blocks_propagate_through_the_receive_pipeline() {
    let mut producer = node("node_0");
    let mut receiver = node("node_1");

    let block = mine(&mut producer, &[(FAUCET_ADDRESS, "w1", 10, TokenType::Main)]);
    receiver.receive_block(block.clone()).expect("receive");

    assert_eq!(receiver.chain().len(), 2);
    assert_eq!(receiver.last_block().hash, producer.last_block().hash);
    assert_eq!(receiver.last_block().index, 1);
}

#[test]
fn longer_valid_chain_wins_shorter_is_kept_on_tie() {
    let mut local = node("node_0");
    let mut remote = node("node_1");

    mine(&mut remote, &[(FAUCET_ADDRESS, "w1", 1, TokenType::Main)]);
    mine(&mut remote, &[(FAUCET_ADDRESS, "w2", 2, TokenType::Main)]);
    assert_eq!(remote.chain().len(), 3);

    // Survey found a longer valid chain: adopt it, orphan the mempool.
    local
        .add_transaction(FAUCET_ADDRESS, "w3", 3, TokenType::Main)
        .unwrap();
    let candidate = remote.chain().blocks().to_vec();
    assert!(Chain::is_valid(&candidate));
    assert!(local.adopt_chain(candidate));
    assert_eq!(local.chain().len(), 3);
    assert_eq!(local.last_block().hash, remote.last_block().hash);
    assert!(local.mempool().is_empty());

    // Equal length never replaces.
    let tie = remote.chain().blocks().to_vec();
    assert!(!local.adopt_chain(tie));
}

#[test]
fn tampered_candidate_chains_fail_validation() {
    let mut remote = node("node_1");
    mine(&mut remote, &[(FAUCET_ADDRESS, "w1", 1, TokenType::Main)]);
    mine(&mut remote, &[(FAUCET_ADDRESS, "w2", 2, TokenType::Main)]);

    let mut candidate = remote.chain().blocks().to_vec();
    candidate[1].hash = "tampered_hash".into();
    assert!(!Chain::is_valid(&candidate));
}

#[test]
fn balance_conservation_per_token() {
    let mut n = node("node_0");
    mine(
        &mut n,
        &[
            (FAUCET_ADDRESS, "q", 10_000, TokenType::Main),
            (FAUCET_ADDRESS, "r", 10_000, TokenType::Main),
            (FAUCET_ADDRESS, "q", 500, TokenType::Second),
        ],
    );
    mine(
        &mut n,
        &[
            ("q", "r", 2_500, TokenType::Main),
            ("q", "r", 100, TokenType::Second),
            ("r", FAUCET_ADDRESS, 1_000, TokenType::Main),
        ],
    );

    // Net minted = faucet outflow minus faucet inflow, per token.
    let mut addresses = std::collections::BTreeSet::new();
    let mut minted_main: i64 = 0;
    let mut minted_second: i64 = 0;
    for block in n.chain().blocks() {
        for tx in &block.transactions {
            for addr in [&tx.sender, &tx.recipient] {
                if addr.as_str() != FAUCET_ADDRESS {
                    addresses.insert(addr.clone());
                }
            }
            let signed = tx.amount as i64;
            let delta = match (tx.sender.as_str(), tx.recipient.as_str()) {
                (FAUCET_ADDRESS, _) => signed,
                (_, FAUCET_ADDRESS) => -signed,
                _ => 0,
            };
            match tx.token_type {
                TokenType::Main => minted_main += delta,
                TokenType::Second => minted_second += delta,
            }
        }
    }

    let mut total_main = 0;
    let mut total_second = 0;
    for addr in &addresses {
        let b = n.balance(addr);
        total_main += b.main;
        total_second += b.second;
    }
    assert_eq!(total_main, minted_main);
    assert_eq!(total_second, minted_second);
}

#[test]
fn orphaned_fork_is_replaced_by_longer_fork() {
    // One honest producer, two colluding producers building a longer fork
    // from genesis; the honest node adopts the longer history.
    let mut honest = node("honest");
    let mut attacker1 = node("attacker_1");
    let mut attacker2 = node("attacker_2");

    mine(&mut honest, &[(FAUCET_ADDRESS, "honest_wallet", 10, TokenType::Main)]);
    let honest_tip = honest.last_block().hash.clone();

    let fork1 = mine(&mut attacker1, &[(FAUCET_ADDRESS, "attacker_wallet", 50, TokenType::Main)]);
    attacker2.receive_block(fork1).expect("fork block 1");
    let fork2 = mine(&mut attacker2, &[(FAUCET_ADDRESS, "attacker_wallet", 51, TokenType::Main)]);
    attacker1.receive_block(fork2).expect("fork block 2");
    assert_eq!(attacker1.chain().len(), 3);

    let candidate = attacker1.chain().blocks().to_vec();
    assert!(Chain::is_valid(&candidate));
    assert!(honest.adopt_chain(candidate));
    assert_eq!(honest.chain().len(), 3);
    assert_ne!(honest.chain().blocks()[1].hash, honest_tip);
}

#[test]
fn transaction_insertion_order_does_not_change_the_block_hash() {
    let t1 = Transaction::new(FAUCET_ADDRESS, "a", 1, TokenType::Main);
    let t2 = Transaction::new(FAUCET_ADDRESS, "b", 2, TokenType::Second);

    let a = Block::new(1, 50.0, vec![t1.clone(), t2.clone()], "prev", "v").unwrap();
    let b = Block::new(1, 50.0, vec![t2, t1], "prev", "v").unwrap();
    assert_eq!(a.hash, b.hash);
}
