//! Single-writer actor for derived-state mutations.
//!
//! One background task owns one connection and processes write jobs serially,
//! each inside an immediate transaction. A cascade handler submits its whole
//! write set as one job, which is what makes a cascade atomic: either every
//! mutation in the batch commits or the transaction rolls back.

use super::DbPool;
use crate::errors::StorageError;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::error;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use kingston_core::errors::{DatabaseError, Error, Result};

type Job = Box<dyn FnOnce(&mut SqliteConnection) -> Result<()> + Send + 'static>;

/// Handle for sending write jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job, oneshot::Sender<Result<()>>)>,
}

impl WriteHandle {
    /// Executes `job` on the writer's connection inside one immediate
    /// transaction. Any error from the job rolls the transaction back and is
    /// returned to the caller.
    pub async fn exec<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<()> + Send + 'static,
    {
        let (ret_tx, ret_rx) = oneshot::channel();
        self.tx.send((Box::new(job), ret_tx)).await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer actor is no longer running".to_string(),
            ))
        })?;
        ret_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer actor dropped the reply channel".to_string(),
            ))
        })?
    }
}

/// Spawns the writer actor on the current Tokio runtime and returns its
/// handle. The actor holds one pooled connection for its whole lifetime and
/// terminates when every handle has been dropped.
pub fn spawn_writer(pool: Arc<DbPool>) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(Job, oneshot::Sender<Result<()>>)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer actor could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<()> = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    job(c).map_err(StorageError::from)
                })
                .map_err(|e: StorageError| e.into());
            // The receiver may have been dropped (caller cancelled); nothing
            // to do about it.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
