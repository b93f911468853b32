//! Mock collaborators for subround tests.

use parking_lot::Mutex;
use shardline_core::{
    BlockProcessor, BroadcastMessenger, Marshalizer, ProcessError, Rounder, TransportError,
};
use shardline_messages::{CodecError, ConsensusMessage};
use shardline_types::{BlockBody, BlockHeader, ChainId, Hash, MiniBlock, RoundIndex, ShardId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Round clock driven entirely by the test.
pub struct MockRounder {
    inner: Mutex<MockRounderState>,
}

struct MockRounderState {
    index: RoundIndex,
    time_stamp: Duration,
    time_duration: Duration,
    now: Duration,
}

impl MockRounder {
    pub fn new(index: RoundIndex, time_stamp: Duration, time_duration: Duration) -> Self {
        MockRounder {
            inner: Mutex::new(MockRounderState {
                index,
                time_stamp,
                time_duration,
                now: time_stamp,
            }),
        }
    }

    pub fn set_index(&self, index: RoundIndex) {
        self.inner.lock().index = index;
    }

    pub fn set_now(&self, now: Duration) {
        self.inner.lock().now = now;
    }

    pub fn advance(&self, by: Duration) {
        self.inner.lock().now += by;
    }
}

impl Rounder for MockRounder {
    fn index(&self) -> RoundIndex {
        self.inner.lock().index
    }

    fn time_stamp(&self) -> Duration {
        self.inner.lock().time_stamp
    }

    fn time_duration(&self) -> Duration {
        self.inner.lock().time_duration
    }

    fn now(&self) -> Duration {
        self.inner.lock().now
    }
}

/// Block processor with scriptable failure modes and an on-process hook for
/// mutating the world mid-processing.
#[derive(Default)]
pub struct MockBlockProcessor {
    pub fail_create: AtomicBool,
    pub fail_process: AtomicBool,
    pub create_calls: AtomicUsize,
    pub process_calls: AtomicUsize,
    on_process: Mutex<Option<Box<dyn FnMut() + Send>>>,
}

impl MockBlockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` while a block is being processed (before the result is
    /// reported back).
    pub fn set_on_process(&self, hook: Box<dyn FnMut() + Send>) {
        *self.on_process.lock() = Some(hook);
    }
}

impl BlockProcessor for MockBlockProcessor {
    fn create_new_header(&self, round: u64) -> BlockHeader {
        BlockHeader {
            nonce: 0,
            prev_hash: Hash::ZERO,
            prev_rand_seed: Vec::new(),
            rand_seed: Vec::new(),
            round,
            shard_id: ShardId(0),
            timestamp: 0,
            chain_id: ChainId::new(Vec::new()),
            root_hash: Hash::ZERO,
        }
    }

    fn create_block(
        &self,
        mut header: BlockHeader,
        have_time: &dyn Fn() -> bool,
    ) -> Result<(BlockHeader, BlockBody), ProcessError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ProcessError::CreateFailed("mock".into()));
        }
        if !have_time() {
            return Err(ProcessError::OutOfTime);
        }

        header.root_hash = Hash::from_bytes(b"root");
        let body = BlockBody {
            mini_blocks: vec![MiniBlock {
                sender_shard: header.shard_id,
                receiver_shard: header.shard_id,
                tx_hashes: vec![Hash::from_bytes(b"tx-1")],
            }],
        };
        Ok((header, body))
    }

    fn process_block(
        &self,
        _header: &BlockHeader,
        _body: &BlockBody,
        _remaining_time: &dyn Fn() -> Duration,
    ) -> Result<(), ProcessError> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(hook) = self.on_process.lock().as_mut() {
            hook();
        }

        if self.fail_process.load(Ordering::SeqCst) {
            return Err(ProcessError::InvalidBlock("mock".into()));
        }
        Ok(())
    }
}

/// Messenger that records successful broadcasts and can fail the next N.
#[derive(Default)]
pub struct MockMessenger {
    sent: Mutex<Vec<ConsensusMessage>>,
    attempts: AtomicUsize,
    failures: AtomicUsize,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` broadcasts fail.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Messages broadcast successfully, in order.
    pub fn sent(&self) -> Vec<ConsensusMessage> {
        self.sent.lock().clone()
    }

    /// Total broadcast attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl BroadcastMessenger for MockMessenger {
    fn broadcast_consensus_message(
        &self,
        message: &ConsensusMessage,
    ) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failures = self.failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.failures.store(failures - 1, Ordering::SeqCst);
            return Err(TransportError::BroadcastFailed("mock".into()));
        }

        self.sent.lock().push(message.clone());
        Ok(())
    }
}

/// Marshalizer that reports fixed payload sizes, for exercising the
/// combined-vs-split gate without building megabyte blocks.
pub struct SizedMarshalizer {
    pub header_len: usize,
    pub body_len: usize,
}

impl Marshalizer for SizedMarshalizer {
    fn marshal_header(&self, _header: &BlockHeader) -> Result<Vec<u8>, CodecError> {
        Ok(vec![0u8; self.header_len])
    }

    fn marshal_body(&self, _body: &BlockBody) -> Result<Vec<u8>, CodecError> {
        Ok(vec![0u8; self.body_len])
    }

    fn unmarshal_header(&self, _bytes: &[u8]) -> Result<BlockHeader, CodecError> {
        Err(CodecError::Decode("not supported by SizedMarshalizer".into()))
    }

    fn unmarshal_body(&self, _bytes: &[u8]) -> Result<BlockBody, CodecError> {
        Err(CodecError::Decode("not supported by SizedMarshalizer".into()))
    }
}

/// Marshalizer that always fails, for exercising the marshaling error path.
pub struct FailingMarshalizer;

impl Marshalizer for FailingMarshalizer {
    fn marshal_header(&self, _header: &BlockHeader) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::Encode("mock".into()))
    }

    fn marshal_body(&self, _body: &BlockBody) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::Encode("mock".into()))
    }

    fn unmarshal_header(&self, _bytes: &[u8]) -> Result<BlockHeader, CodecError> {
        Err(CodecError::Decode("mock".into()))
    }

    fn unmarshal_body(&self, _bytes: &[u8]) -> Result<BlockBody, CodecError> {
        Err(CodecError::Decode("mock".into()))
    }
}
