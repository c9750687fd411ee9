//! Background store mutation with a completion signal
//!
//! The mutator races against the watch driver's waits; its writes reach the
//! driver only through the store's own notification path. The runner must
//! join the handle before starting the next scenario so writes never leak
//! across scenario boundaries.

use std::sync::Arc;

use tokio::sync::oneshot;

use super::scenario::PutEvent;
use super::store::StoreWriter;
use crate::common::{Error, Result};

/// Handle to a running mutator.
pub struct MutatorHandle {
    done: oneshot::Receiver<Result<()>>,
}

impl MutatorHandle {
    /// Block until every put has been applied, or one has failed.
    pub async fn wait(self) -> Result<()> {
        self.done.await.unwrap_or(Err(Error::MutatorLost))
    }
}

/// Apply the puts strictly in list order on a background task, concurrently
/// with the watch driver. A failed put stops the sequence and surfaces
/// through the completion signal with the failing index; it is fatal to the
/// whole run, since a missing write makes the expected event sequence
/// unsatisfiable.
pub fn spawn_puts(writer: Arc<dyn StoreWriter>, puts: Vec<PutEvent>) -> MutatorHandle {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let mut result = Ok(());
        for (index, put) in puts.iter().enumerate() {
            if let Err(source) = writer.put(&put.key, &put.value).await {
                result = Err(Error::MutationFailed {
                    index,
                    source: Box::new(source),
                });
                break;
            }
        }
        if result.is_ok() {
            tracing::debug!(count = puts.len(), "all puts applied");
        }
        let _ = tx.send(result);
    });
    MutatorHandle { done: rx }
}
