//! The Block subround driver.
//!
//! First subround of every consensus round. The round's leader builds a
//! candidate block, signs the chained rand seed into its header, and
//! broadcasts it; every other member of the consensus group receives the
//! block, runs it through the block processor, and records the leader's job
//! as done. The host round driver calls [`BlockSubround::job`] on each tick
//! and [`BlockSubround::check`] to decide when to move to the signing
//! subrounds.
//!
//! All outward signals are booleans: transport and serialization failures
//! are logged and absorbed (the tick can be retried while the window is
//! open), while a block-processor failure cancels the round.

use crate::{ConsensusState, HeaderError, Subround, SubroundStatus};
use parking_lot::Mutex;
use shardline_core::{
    header_hash, AppStatusHandler, BlockProcessor, BroadcastMessenger, Hasher, Marshalizer,
    Rounder, SingleSigner, METRIC_CREATED_PROPOSED_BLOCK, METRIC_PROCESSED_PROPOSED_BLOCK,
};
use shardline_messages::{can_send_together, ConsensusMessage, MAX_ALLOWED_SIZE_IN_BYTES};
use shardline_types::{BlockBody, BlockHeader, Blockchain, ChainId, KeyPair, RoundIndex, ShardId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the Block subround.
#[derive(Debug, Clone)]
pub struct BlockSubroundConfig {
    /// Share of the round duration a validator may spend processing the
    /// received block, in percent.
    pub processing_threshold_percent: u32,
}

impl Default for BlockSubroundConfig {
    fn default() -> Self {
        BlockSubroundConfig {
            processing_threshold_percent: 85,
        }
    }
}

impl BlockSubroundConfig {
    /// Set the processing threshold percentage.
    pub fn with_processing_threshold(mut self, percent: u32) -> Self {
        self.processing_threshold_percent = percent;
        self
    }
}

/// The collaborator services a subround consumes.
///
/// Wired once at node startup and shared by all subrounds of a round.
#[derive(Clone)]
pub struct ConsensusServices {
    pub rounder: Arc<dyn Rounder>,
    pub block_processor: Arc<dyn BlockProcessor>,
    pub blockchain: Arc<dyn Blockchain>,
    pub signer: Arc<dyn SingleSigner>,
    pub marshalizer: Arc<dyn Marshalizer>,
    pub hasher: Arc<dyn Hasher>,
    pub messenger: Arc<dyn BroadcastMessenger>,
    pub status_handler: Arc<dyn AppStatusHandler>,
}

/// Block subround state machine.
///
/// Role-dependent: on the leader, `job` produces and broadcasts the block;
/// on validators, the three receive handlers accept it. Both paths converge
/// on the same shared [`ConsensusState`], whose write-once slots and
/// monotone job-done bits make duplicate and out-of-order deliveries
/// idempotent.
pub struct BlockSubround {
    subround: Subround,
    state: Arc<Mutex<ConsensusState>>,
    services: ConsensusServices,
    keypair: KeyPair,
    shard_id: ShardId,
    chain_id: ChainId,
    config: BlockSubroundConfig,
}

/// Clears the processing-block flag on every exit path.
struct ProcessingGuard<'a> {
    state: &'a Mutex<ConsensusState>,
}

impl<'a> ProcessingGuard<'a> {
    fn engage(state: &'a Mutex<ConsensusState>) -> Self {
        state.lock().set_processing_block(true);
        ProcessingGuard { state }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().set_processing_block(false);
    }
}

impl BlockSubround {
    /// Create the Block subround driver.
    ///
    /// `state` is the round's shared consensus record; `subround` describes
    /// this subround's window and threshold. Handlers are registered with
    /// the transport once, before the round starts.
    pub fn new(
        subround: Subround,
        state: Arc<Mutex<ConsensusState>>,
        services: ConsensusServices,
        keypair: KeyPair,
        shard_id: ShardId,
        chain_id: ChainId,
        config: BlockSubroundConfig,
    ) -> Self {
        BlockSubround {
            subround,
            state,
            services,
            keypair,
            shard_id,
            chain_id,
            config,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Leader path
    // ═══════════════════════════════════════════════════════════════════════

    /// Run the subround's job for this tick.
    ///
    /// Returns true iff this node is the leader and it produced, broadcast,
    /// and recorded the round's block. On any failure the tick reports no
    /// progress and may be retried while the subround window is open.
    pub fn job(&self) -> bool {
        {
            let state = self.state.lock();
            if !state.is_self_leader() {
                return false;
            }
            if self.services.rounder.index() <= self.round_of_last_committed_block() {
                return false;
            }
            if state.self_job_done(self.subround.id) {
                return false;
            }
            if state.status(self.subround.id) == SubroundStatus::Finished {
                return false;
            }
        }

        let metric_start = self.services.rounder.now();
        let proposed = self.propose_block();
        self.emit_window_metric(metric_start, METRIC_CREATED_PROPOSED_BLOCK);
        proposed
    }

    fn propose_block(&self) -> bool {
        let header = match self.build_header() {
            Ok(header) => header,
            Err(e) => {
                debug!(
                    round = self.services.rounder.index(),
                    error = %e,
                    "header construction failed"
                );
                return false;
            }
        };

        let round_start = self.services.rounder.time_stamp();
        let window_end = self.subround.end_offset;
        let have_time = || {
            self.services
                .rounder
                .remaining_time(round_start, window_end)
                > Duration::ZERO
        };

        let (header, body) = match self.services.block_processor.create_block(header, &have_time)
        {
            Ok(created) => created,
            Err(e) => {
                debug!(
                    round = self.services.rounder.index(),
                    error = %e,
                    "block creation failed"
                );
                return false;
            }
        };

        if !self.send_block(body, header) {
            return false;
        }

        self.state.lock().set_self_job_done(self.subround.id);
        true
    }

    /// Broadcast the proposed block, combined when it fits, split otherwise.
    fn send_block(&self, body: BlockBody, header: BlockHeader) -> bool {
        let marshaled_header = match self.services.marshalizer.marshal_header(&header) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "header marshaling failed");
                return false;
            }
        };
        let marshaled_body = match self.services.marshalizer.marshal_body(&body) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "body marshaling failed");
                return false;
            }
        };

        debug!(
            header_size = marshaled_header.len(),
            body_size = marshaled_body.len(),
            max_allowed = MAX_ALLOWED_SIZE_IN_BYTES,
            "sizing proposed block for broadcast"
        );

        if can_send_together(marshaled_header.len(), marshaled_body.len()) {
            return self.send_block_body_and_header(body, header, &marshaled_header);
        }

        // Body first, then header; a failed body send must not be followed
        // by the header.
        self.send_block_body(body) && self.send_block_header(header, &marshaled_header)
    }

    fn send_block_body_and_header(
        &self,
        body: BlockBody,
        header: BlockHeader,
        marshaled_header: &[u8],
    ) -> bool {
        let hash = self.services.hasher.compute(marshaled_header);

        let message = ConsensusMessage::block_body_and_header(
            hash,
            body.clone(),
            header.clone(),
            self.keypair.public_key(),
            self.services.rounder.index(),
            self.chain_id.clone(),
        );

        if let Err(e) = self.services.messenger.broadcast_consensus_message(&message) {
            debug!(error = %e, "block body and header broadcast failed");
            return false;
        }

        debug!(nonce = header.nonce, hash = %hash, "block body and header sent");

        let mut state = self.state.lock();
        state.set_data(hash);
        state.set_body(body);
        state.set_header(header);
        true
    }

    fn send_block_body(&self, body: BlockBody) -> bool {
        let message = ConsensusMessage::block_body(
            body.clone(),
            self.keypair.public_key(),
            self.services.rounder.index(),
            self.chain_id.clone(),
        );

        if let Err(e) = self.services.messenger.broadcast_consensus_message(&message) {
            debug!(error = %e, "block body broadcast failed");
            return false;
        }

        debug!("block body sent");

        self.state.lock().set_body(body);
        true
    }

    fn send_block_header(&self, header: BlockHeader, marshaled_header: &[u8]) -> bool {
        let hash = self.services.hasher.compute(marshaled_header);

        let message = ConsensusMessage::block_header(
            hash,
            header.clone(),
            self.keypair.public_key(),
            self.services.rounder.index(),
            self.chain_id.clone(),
        );

        if let Err(e) = self.services.messenger.broadcast_consensus_message(&message) {
            debug!(error = %e, "block header broadcast failed");
            return false;
        }

        debug!(nonce = header.nonce, hash = %hash, "block header sent");

        let mut state = self.state.lock();
        state.set_data(hash);
        state.set_header(header);
        true
    }

    /// Build the candidate header for the current round.
    ///
    /// Links the header to the chain tip (or genesis) and derives the new
    /// rand seed by signing the previous one.
    fn build_header(&self) -> Result<BlockHeader, HeaderError> {
        let round = self.services.rounder.index().max(0) as u64;
        let mut header = self.services.block_processor.create_new_header(round);

        let prev_rand_seed = match self.services.blockchain.current_header() {
            None => {
                header.nonce = 1;
                header.prev_hash = self.services.blockchain.genesis_header_hash();
                self.services.blockchain.genesis_header().rand_seed
            }
            Some(tip) => {
                header.nonce = tip.nonce + 1;
                header.prev_hash = self
                    .services
                    .blockchain
                    .current_header_hash()
                    .ok_or(HeaderError::MissingTipHash)?;
                tip.rand_seed
            }
        };

        let rand_seed = self.services.signer.sign(&self.keypair, &prev_rand_seed)?;

        header.shard_id = self.shard_id;
        header.round = round;
        header.timestamp = self.services.rounder.time_stamp().as_secs();
        header.prev_rand_seed = prev_rand_seed;
        header.rand_seed = rand_seed.as_bytes().to_vec();
        header.chain_id = self.chain_id.clone();

        Ok(header)
    }

    fn round_of_last_committed_block(&self) -> RoundIndex {
        self.services
            .blockchain
            .current_header()
            .map(|header| header.round as RoundIndex)
            .unwrap_or(0)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Validator path
    // ═══════════════════════════════════════════════════════════════════════

    /// Handle a combined body-and-header message from the leader.
    pub fn on_block_body_and_header(&self, message: &ConsensusMessage) -> bool {
        {
            let mut state = self.state.lock();
            if state.has_data() || state.has_body() || state.has_header() {
                return false;
            }
            if !state.is_node_leader(&message.sender) {
                return false;
            }
            if !state.can_process_message(
                message,
                self.services.rounder.index(),
                self.subround.id,
            ) {
                return false;
            }

            let (Some(hash), Some(body), Some(header)) =
                (&message.header_hash, &message.body, &message.header)
            else {
                return false;
            };

            state.set_data(*hash);
            state.set_body(body.clone());
            state.set_header(header.clone());

            debug!(nonce = header.nonce, hash = %hash, "block body and header received");
        }

        self.process_received_block(message)
    }

    /// Handle a body-only message from the leader.
    pub fn on_block_body(&self, message: &ConsensusMessage) -> bool {
        {
            let mut state = self.state.lock();
            if state.has_body() {
                return false;
            }
            if !state.is_node_leader(&message.sender) {
                return false;
            }
            if !state.can_process_message(
                message,
                self.services.rounder.index(),
                self.subround.id,
            ) {
                return false;
            }

            let Some(body) = &message.body else {
                return false;
            };

            state.set_body(body.clone());

            debug!("block body received");
        }

        self.process_received_block(message)
    }

    /// Handle a header-only message from the leader.
    pub fn on_block_header(&self, message: &ConsensusMessage) -> bool {
        {
            let mut state = self.state.lock();
            if state.has_data() || state.has_header() {
                return false;
            }
            if !state.is_node_leader(&message.sender) {
                return false;
            }
            if !state.can_process_message(
                message,
                self.services.rounder.index(),
                self.subround.id,
            ) {
                return false;
            }

            let (Some(hash), Some(header)) = (&message.header_hash, &message.header) else {
                return false;
            };

            state.set_data(*hash);
            state.set_header(header.clone());

            debug!(nonce = header.nonce, hash = %hash, "block header received");
        }

        self.process_received_block(message)
    }

    /// Run the received block through the block processor.
    ///
    /// No-op (false) until both body and header have arrived. Aborts without
    /// touching the job-done bits if the subround was extended or the round
    /// moved on — checked both before and after the processor runs, since
    /// the processor may consume most of the round's budget.
    fn process_received_block(&self, message: &ConsensusMessage) -> bool {
        let (header, body) = {
            let state = self.state.lock();
            match (state.header_cloned(), state.body_cloned()) {
                (Some(header), Some(body)) => (header, body),
                _ => return false,
            }
        };

        let _guard = ProcessingGuard::engage(&self.state);

        {
            let state = self.state.lock();
            if state.extended_called() || message.round_index < self.services.rounder.index() {
                debug!(
                    round = self.services.rounder.index(),
                    subround = self.subround.name(),
                    msg_round = message.round_index,
                    extended = state.extended_called(),
                    "dropping received block, subround extended or round changed"
                );
                return false;
            }
        }

        let round_start = self.services.rounder.time_stamp();
        let max_time =
            self.services.rounder.time_duration() * self.config.processing_threshold_percent / 100;
        let remaining_time = || self.services.rounder.remaining_time(round_start, max_time);

        let metric_start = self.services.rounder.now();
        let processed = self
            .services
            .block_processor
            .process_block(&header, &body, &remaining_time);
        self.emit_window_metric(metric_start, METRIC_PROCESSED_PROPOSED_BLOCK);

        if message.round_index < self.services.rounder.index() {
            debug!(
                round = self.services.rounder.index(),
                subround = self.subround.name(),
                msg_round = message.round_index,
                "round changed during block processing"
            );
            return false;
        }

        if let Err(e) = processed {
            warn!(
                round = self.services.rounder.index(),
                subround = self.subround.name(),
                error = %e,
                "block processing failed, canceling round"
            );
            self.state.lock().cancel_round();
            return false;
        }

        self.state
            .lock()
            .set_job_done(message.sender, self.subround.id);
        true
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Completion
    // ═══════════════════════════════════════════════════════════════════════

    /// Whether the subround may transition to finished.
    ///
    /// False forever once the round is canceled; otherwise true as soon as
    /// at least `threshold` group members have their job done, at which
    /// point the status is latched to finished.
    pub fn check(&self) -> bool {
        let mut state = self.state.lock();

        if state.round_canceled() {
            return false;
        }

        if state.status(self.subround.id) == SubroundStatus::Finished {
            return true;
        }

        if state.count_job_done(self.subround.id) >= self.subround.threshold {
            info!(subround = self.subround.name(), "subround finished");
            state.set_status(self.subround.id, SubroundStatus::Finished);
            return true;
        }

        false
    }

    /// Called by the host when the subround's wall-clock window elapsed.
    ///
    /// Marks the subround extended; an in-flight block processing observes
    /// this and aborts without recording progress.
    pub fn extend(&self) {
        let mut state = self.state.lock();
        state.set_status(self.subround.id, SubroundStatus::Extended);
        state.set_extended_called();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Metrics
    // ═══════════════════════════════════════════════════════════════════════

    /// Record how much of the subround window an operation consumed, as a
    /// percentage. Can exceed 100 when the operation overran the window.
    fn emit_window_metric(&self, start: Duration, metric: &'static str) {
        let window_ms = self.subround.duration().as_millis() as u64;
        if window_ms == 0 {
            return;
        }

        let elapsed_ms = self.services.rounder.now().saturating_sub(start).as_millis() as u64;
        self.services
            .status_handler
            .set_u64(metric, elapsed_ms * 100 / window_ms);
    }
}
