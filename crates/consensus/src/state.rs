//! Per-round shared consensus state.
//!
//! One `ConsensusState` exists per active round and is shared by every
//! subround driver. The round driver resets it at each round boundary; in
//! between, all mutation goes through accessors that keep the record
//! monotone:
//!
//! - `data`, `body`, `header` are write-once slots; later writes are
//!   silently ignored.
//! - Job-done bits only ever go from unset to set.
//! - Subround status only moves forward (`NotFinished` → `Extended` →
//!   `Finished`); attempts to move it back are ignored.
//! - `round_canceled` is terminal for the round.

use shardline_messages::ConsensusMessage;
use shardline_types::{BlockBody, BlockHeader, Hash, PublicKey, RoundIndex};
use std::collections::{HashMap, HashSet};

/// Identity of a subround within the round schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubroundId {
    /// Round bootstrap: leader election, state reset.
    StartRound,
    /// Leader proposes the block; validators receive it.
    Block,
    /// Validators produce signature shares.
    Signature,
    /// Quorum assembly and commit.
    EndRound,
}

impl SubroundId {
    /// Name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SubroundId::StartRound => "start round",
            SubroundId::Block => "block",
            SubroundId::Signature => "signature",
            SubroundId::EndRound => "end round",
        }
    }
}

/// Completion status of a subround. Ordered: status never moves backward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubroundStatus {
    /// Still working.
    #[default]
    NotFinished,
    /// The wall-clock window elapsed and the grace extension fired.
    Extended,
    /// The subround's threshold was met.
    Finished,
}

/// Shared per-round consensus record.
pub struct ConsensusState {
    /// This node's public key.
    self_pub_key: PublicKey,

    /// Ordered consensus group for the round; element 0 is the leader.
    consensus_group: Vec<PublicKey>,

    /// Agreed header hash, set once per round.
    data: Option<Hash>,

    /// Received (or self-proposed) block body.
    body: Option<BlockBody>,

    /// Received (or self-proposed) block header.
    header: Option<BlockHeader>,

    /// Which nodes have completed which subround.
    job_done: HashSet<(PublicKey, SubroundId)>,

    /// Status per subround.
    status: HashMap<SubroundId, SubroundStatus>,

    /// The round was aborted; no subround can finish any more.
    round_canceled: bool,

    /// The grace extension fired for some subround this round.
    extended_called: bool,

    /// The block processor is currently running. Diagnostic only.
    processing_block: bool,
}

impl ConsensusState {
    /// Create the state for a fresh round.
    ///
    /// `consensus_group` is the ordered membership for the round; the first
    /// element is the leader.
    pub fn new(self_pub_key: PublicKey, consensus_group: Vec<PublicKey>) -> Self {
        ConsensusState {
            self_pub_key,
            consensus_group,
            data: None,
            body: None,
            header: None,
            job_done: HashSet::new(),
            status: HashMap::new(),
            round_canceled: false,
            extended_called: false,
            processing_block: false,
        }
    }

    /// Reset for a new round with a (possibly new) consensus group.
    ///
    /// Called by the round driver at each round boundary.
    pub fn reset(&mut self, consensus_group: Vec<PublicKey>) {
        self.consensus_group = consensus_group;
        self.data = None;
        self.body = None;
        self.header = None;
        self.job_done.clear();
        self.status.clear();
        self.round_canceled = false;
        self.extended_called = false;
        self.processing_block = false;
    }

    // ───────────────────────────────────────────────────────────────────────
    // Membership
    // ───────────────────────────────────────────────────────────────────────

    /// This node's public key.
    pub fn self_pub_key(&self) -> &PublicKey {
        &self.self_pub_key
    }

    /// The round's consensus group, leader first.
    pub fn consensus_group(&self) -> &[PublicKey] {
        &self.consensus_group
    }

    /// The round's leader.
    pub fn leader(&self) -> Option<&PublicKey> {
        self.consensus_group.first()
    }

    /// Whether this node is the round's leader.
    pub fn is_self_leader(&self) -> bool {
        self.leader() == Some(&self.self_pub_key)
    }

    /// Whether `node` is the round's leader.
    pub fn is_node_leader(&self, node: &PublicKey) -> bool {
        self.leader() == Some(node)
    }

    /// Whether `node` belongs to the round's consensus group.
    pub fn is_node_in_group(&self, node: &PublicKey) -> bool {
        self.consensus_group.contains(node)
    }

    // ───────────────────────────────────────────────────────────────────────
    // Round artifacts (write-once)
    // ───────────────────────────────────────────────────────────────────────

    /// The agreed header hash, if set.
    pub fn data(&self) -> Option<Hash> {
        self.data
    }

    /// Whether the header hash has been set this round.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Set the agreed header hash. Ignored if already set.
    pub fn set_data(&mut self, hash: Hash) {
        self.data.get_or_insert(hash);
    }

    /// The round's block body, if received.
    pub fn body(&self) -> Option<&BlockBody> {
        self.body.as_ref()
    }

    /// Clone of the round's block body, if received.
    pub fn body_cloned(&self) -> Option<BlockBody> {
        self.body.clone()
    }

    /// Whether a body has been received this round.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Set the block body. Ignored if already set.
    pub fn set_body(&mut self, body: BlockBody) {
        self.body.get_or_insert(body);
    }

    /// The round's block header, if received.
    pub fn header(&self) -> Option<&BlockHeader> {
        self.header.as_ref()
    }

    /// Clone of the round's block header, if received.
    pub fn header_cloned(&self) -> Option<BlockHeader> {
        self.header.clone()
    }

    /// Whether a header has been received this round.
    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Set the block header. Ignored if already set.
    pub fn set_header(&mut self, header: BlockHeader) {
        self.header.get_or_insert(header);
    }

    // ───────────────────────────────────────────────────────────────────────
    // Job-done bits (monotone)
    // ───────────────────────────────────────────────────────────────────────

    /// Whether `node` has completed `subround`.
    pub fn job_done(&self, node: &PublicKey, subround: SubroundId) -> bool {
        self.job_done.contains(&(*node, subround))
    }

    /// Mark `node` as having completed `subround`. Never cleared within a
    /// round.
    pub fn set_job_done(&mut self, node: PublicKey, subround: SubroundId) {
        self.job_done.insert((node, subround));
    }

    /// Whether this node has completed `subround`.
    pub fn self_job_done(&self, subround: SubroundId) -> bool {
        self.job_done(&self.self_pub_key, subround)
    }

    /// Mark this node as having completed `subround`.
    pub fn set_self_job_done(&mut self, subround: SubroundId) {
        self.set_job_done(self.self_pub_key, subround);
    }

    /// Number of group members that have completed `subround`.
    pub fn count_job_done(&self, subround: SubroundId) -> usize {
        self.consensus_group
            .iter()
            .filter(|node| self.job_done(node, subround))
            .count()
    }

    // ───────────────────────────────────────────────────────────────────────
    // Status and flags
    // ───────────────────────────────────────────────────────────────────────

    /// Status of `subround`.
    pub fn status(&self, subround: SubroundId) -> SubroundStatus {
        self.status.get(&subround).copied().unwrap_or_default()
    }

    /// Advance the status of `subround`. Writes that would move the status
    /// backward are ignored.
    pub fn set_status(&mut self, subround: SubroundId, status: SubroundStatus) {
        let entry = self.status.entry(subround).or_default();
        if status > *entry {
            *entry = status;
        }
    }

    /// Whether the round has been aborted.
    pub fn round_canceled(&self) -> bool {
        self.round_canceled
    }

    /// Abort the round. Terminal until the next reset.
    pub fn cancel_round(&mut self) {
        self.round_canceled = true;
    }

    /// Whether a grace extension has fired this round.
    pub fn extended_called(&self) -> bool {
        self.extended_called
    }

    /// Record that a grace extension fired.
    pub fn set_extended_called(&mut self) {
        self.extended_called = true;
    }

    /// Whether the block processor is currently running.
    pub fn processing_block(&self) -> bool {
        self.processing_block
    }

    /// Record whether the block processor is running.
    pub fn set_processing_block(&mut self, processing: bool) {
        self.processing_block = processing;
    }

    // ───────────────────────────────────────────────────────────────────────
    // Message admission
    // ───────────────────────────────────────────────────────────────────────

    /// Generic admission check for a received consensus message.
    ///
    /// Admits the message iff it belongs to the current round, comes from
    /// another group member, and that member has not already completed the
    /// subround (which is what "processed before" reduces to here).
    pub fn can_process_message(
        &self,
        message: &ConsensusMessage,
        current_round: RoundIndex,
        subround: SubroundId,
    ) -> bool {
        if message.sender == self.self_pub_key {
            return false;
        }
        if !self.is_node_in_group(&message.sender) {
            return false;
        }
        if message.round_index != current_round {
            return false;
        }
        if self.job_done(&message.sender, subround) {
            return false;
        }
        true
    }
}
