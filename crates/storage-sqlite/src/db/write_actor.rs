//! Single-writer actor serializing all database writes.
//!
//! SQLite allows one writer at a time; funneling every write through one
//! dedicated connection avoids `SQLITE_BUSY` under concurrent load and gives
//! each job an `immediate_transaction` so multi-statement writes commit
//! atomically.

use super::DbPool;
use crate::errors::StorageError;
use assetledger_core::errors::Result;
use diesel::SqliteConnection;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// A write job: runs against the actor's dedicated connection inside an
// immediate transaction. The return type is erased so one channel carries
// jobs of any result type.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    #[allow(clippy::type_complexity)]
    tx: mpsc::Sender<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>,
}

impl WriteHandle {
    /// Executes a job on the writer's connection, inside an immediate
    /// transaction. A returned `Err` rolls the whole transaction back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("writer actor channel closed; the actor has stopped");

        ret_rx
            .await
            .expect("writer actor dropped the reply sender without a result")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("writer actor result had an unexpected type"))
            })
    }
}

/// Spawns the writer actor. It holds one pool connection for its lifetime
/// and processes jobs strictly in order.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("failed to get a connection for the writer actor");

        while let Some((job, reply_tx)) = rx.recv().await {
            // StorageError carries core errors through the transaction
            // wrapper intact, so domain failures (stale projection, sign
            // violations) survive the round trip.
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    job(c).map_err(StorageError::from)
                })
                .map_err(|e: StorageError| e.into());

            // Receiver may have been dropped by a cancelled caller.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
