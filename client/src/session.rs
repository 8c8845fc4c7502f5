use std::{collections::BTreeMap, io, sync::Arc};

use boosting::Engine;
use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload},
    specs::{EvaluateRes, Status},
};
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    client::Client,
    error::{ClientErr, Result},
};

/// Serves coordinator requests for a `Client` over one connection.
pub struct Session<E: Engine> {
    client: Arc<Client<E>>,
}

impl<E: Engine> Session<E> {
    pub fn new(client: Arc<Client<E>>) -> Self {
        Self { client }
    }

    /// Handles messages one at a time until the coordinator disconnects.
    ///
    /// Engine work runs on the blocking pool. A bad model blob or an evaluate
    /// before any fit is answered with an error message and the session goes on,
    /// every other failure ends it.
    ///
    /// # Arguments
    /// * `rx` - Receiving end of the coordinator channel.
    /// * `tx` - Sending end of the coordinator channel.
    ///
    /// # Errors
    /// Returns `ClientErr` on I/O failures, engine failures or messages the
    /// client does not expect.
    pub async fn run<R, W>(self, mut rx: OnoReceiver<R>, mut tx: OnoSender<W>) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        let mut rx_buf = Vec::new();

        loop {
            let msg: Msg = rx.recv_into(&mut rx_buf).await?;
            debug!("received {}", msg.kind());

            match msg {
                Msg::Control(Command::GetParameters) => {
                    let res = self.client.get_parameters();
                    tx.send(&Msg::Control(Command::ParametersRes(res))).await?;
                }
                Msg::Data(Payload::FitIns(blob)) => {
                    let incoming = (!blob.is_empty()).then(|| blob.to_vec());

                    match self.blocking(move |c| c.fit(incoming.as_deref())).await {
                        Ok(outcome) => {
                            let msg = Msg::Data(Payload::FitRes {
                                num_examples: outcome.num_examples as u64,
                                model: outcome.model.as_bytes(),
                            });
                            tx.send(&msg).await?;
                        }
                        Err(e) => reject(&mut tx, e).await?,
                    }
                }
                Msg::Control(Command::Evaluate) => {
                    match self.blocking(|c| c.evaluate()).await {
                        Ok(outcome) => {
                            let res = EvaluateRes {
                                status: Status::ok(),
                                loss: outcome.loss,
                                num_examples: outcome.num_examples as u64,
                                metrics: BTreeMap::from([(
                                    outcome.metric.name.to_string(),
                                    outcome.metric.value,
                                )]),
                            };
                            tx.send(&Msg::Control(Command::EvaluateRes(res))).await?;
                        }
                        Err(e) => reject(&mut tx, e).await?,
                    }
                }
                Msg::Control(Command::Disconnect) => {
                    info!(fits = self.client.fits(); "disconnect received from coordinator");
                    tx.send(&Msg::Control(Command::Disconnect)).await?;
                    return Ok(());
                }
                Msg::Err(detail) => {
                    warn!("coordinator reported an error: {detail}");
                }
                other => {
                    warn!("unexpected message from coordinator: got={}", other.kind());
                    return Err(ClientErr::UnexpectedMessage { got: other.kind() });
                }
            }
        }
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Client<E>) -> Result<T> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || f(&client))
            .await
            .map_err(io::Error::other)?
    }
}

/// Answers a failed request. Only round-local failures are answered, the rest
/// are handed back to end the session.
async fn reject<W>(tx: &mut OnoSender<W>, err: ClientErr) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    if !err.is_round_local() {
        return Err(err);
    }

    warn!("rejecting request: {err}");
    tx.send(&Msg::Err(err.to_string().into())).await?;
    Ok(())
}
