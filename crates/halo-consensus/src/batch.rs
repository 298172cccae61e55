//! Parallel verification of header sequences.
//!
//! Workers claim indices off a shared counter and validate independently; a
//! single collector re-orders their results so the output channel delivers
//! them in strict input order. The critical path is dominated by the PoW
//! hash, so plain atomics and channels are all the machinery this needs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use halo_types::Header;
use tracing::debug;

use crate::chain::ChainReader;
use crate::error::{ConsensusError, ConsensusResult};
use crate::seal::PowHasher;
use crate::validation::verify_header_against_parent;

/// Cancels an in-flight batch verification.
///
/// Aborting stops dispatch promptly; items already claimed by a worker may
/// still produce results.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Signal the batch to stop dispatching further headers.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    /// Whether the batch has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}

/// Verify `headers` concurrently, delivering per-header results in input
/// order on the returned channel.
///
/// Each header resolves its parent either from the previous batch entry
/// (when the hashes link up) or, for the first entry, from the chain reader.
/// `unix_now` is sampled once by the caller so every worker shares the same
/// clock reading.
pub(crate) fn run(
    chain: Arc<dyn ChainReader>,
    pow: Arc<dyn PowHasher>,
    headers: Vec<Header>,
    seals: Vec<bool>,
    unix_now: u64,
) -> (AbortHandle, mpsc::Receiver<ConsensusResult<()>>) {
    let aborted = Arc::new(AtomicBool::new(false));
    let handle = AbortHandle {
        aborted: aborted.clone(),
    };
    let (out_tx, out_rx) = mpsc::channel();

    let total = headers.len();
    if total == 0 {
        // Sender dropped here; the receiver reports completion immediately.
        return (handle, out_rx);
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(total);

    let headers = Arc::new(headers);
    let seals = Arc::new(seals);
    let next_index = Arc::new(AtomicUsize::new(0));
    let (result_tx, result_rx) = mpsc::channel::<(usize, ConsensusResult<()>)>();

    for _ in 0..workers {
        let chain = chain.clone();
        let pow = pow.clone();
        let headers = headers.clone();
        let seals = seals.clone();
        let next_index = next_index.clone();
        let aborted = aborted.clone();
        let result_tx = result_tx.clone();
        thread::spawn(move || loop {
            if aborted.load(Ordering::Relaxed) {
                debug!("batch verification worker observed abort");
                break;
            }
            let index = next_index.fetch_add(1, Ordering::Relaxed);
            if index >= headers.len() {
                break;
            }
            let seal = seals.get(index).copied().unwrap_or(false);
            let result = verify_at(chain.as_ref(), pow.as_ref(), &headers, index, seal, unix_now);
            if result_tx.send((index, result)).is_err() {
                break;
            }
        });
    }
    drop(result_tx);

    // Re-ordering collector: buffers out-of-order results and releases the
    // longest ready prefix.
    thread::spawn(move || {
        let mut pending: Vec<Option<ConsensusResult<()>>> = vec![None; total];
        let mut next_out = 0usize;
        for (index, result) in result_rx {
            pending[index] = Some(result);
            while next_out < total {
                let Some(ready) = pending[next_out].take() else {
                    break;
                };
                if out_tx.send(ready).is_err() {
                    return;
                }
                next_out += 1;
            }
        }
    });

    (handle, out_rx)
}

fn verify_at(
    chain: &dyn ChainReader,
    pow: &dyn PowHasher,
    headers: &[Header],
    index: usize,
    seal: bool,
    unix_now: u64,
) -> ConsensusResult<()> {
    let header = &headers[index];
    let parent = if index == 0 {
        header
            .number
            .checked_sub(1)
            .and_then(|number| chain.header_by_hash_and_number(header.parent_hash, number))
    } else if headers[index - 1].hash() == header.parent_hash {
        Some(headers[index - 1].clone())
    } else {
        None
    };
    let Some(parent) = parent else {
        return Err(ConsensusError::UnknownAncestor);
    };
    verify_header_against_parent(chain, pow, header, &parent, false, seal, unix_now)
}
