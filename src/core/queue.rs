// stage-overlay-rs/src/core/queue.rs

//! Thread dedicada do carregador.
//!
//! Move um [`StageLoader`] para uma thread própria para que o motor siga
//! rodando enquanto um estágio carrega. Um único worker consome o canal de
//! pedidos, então as transferências saem na ordem exata de submissão.

use crate::core::dma::DmaTransfer;
use crate::core::overlay::OverlayLoader;
use crate::core::stage::StageActivation;
use crate::core::system::StageLoader;
use crate::core::{LoaderError, LoaderResult};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, info};
use std::thread::{self, JoinHandle};

enum LoadRequest {
    ActivateStage {
        stage: i32,
        reply: Sender<LoaderResult<StageActivation>>,
    },
}

/// Handle de uma ativação pendente
pub struct PendingActivation {
    reply: Receiver<LoaderResult<StageActivation>>,
}

impl PendingActivation {
    /// Bloqueia até o worker terminar este pedido
    pub fn wait(self) -> LoaderResult<StageActivation> {
        self.reply.recv().map_err(|_| LoaderError::QueueClosed)?
    }
}

pub struct LoaderQueue<B> {
    requests: Option<Sender<LoadRequest>>,
    worker: Option<JoinHandle<StageLoader<B>>>,
}

impl<B> LoaderQueue<B>
where
    B: DmaTransfer + OverlayLoader + Send + 'static,
{
    pub fn spawn(mut loader: StageLoader<B>) -> LoaderResult<Self> {
        let (tx, rx) = unbounded::<LoadRequest>();

        let worker = thread::Builder::new()
            .name("stage-loader".into())
            .spawn(move || {
                for request in rx.iter() {
                    match request {
                        LoadRequest::ActivateStage { stage, reply } => {
                            debug!("loader thread: activating stage {}", stage);
                            let result = loader.activate_stage(stage);
                            // Quem submeteu pode ter descartado o handle
                            let _ = reply.send(result);
                        }
                    }
                }
                info!("loader thread exiting");
                loader
            })
            .map_err(LoaderError::Spawn)?;

        Ok(Self {
            requests: Some(tx),
            worker: Some(worker),
        })
    }

    /// Enfileira uma ativação atrás de todos os pedidos anteriores
    pub fn submit(&self, stage: i32) -> LoaderResult<PendingActivation> {
        let (reply, rx) = bounded(1);
        self.requests
            .as_ref()
            .ok_or(LoaderError::QueueClosed)?
            .send(LoadRequest::ActivateStage { stage, reply })
            .map_err(|_| LoaderError::QueueClosed)?;
        Ok(PendingActivation { reply: rx })
    }

    pub fn activate_stage(&self, stage: i32) -> LoaderResult<StageActivation> {
        self.submit(stage)?.wait()
    }

    /// Termina a fila, para o worker e devolve o carregador
    pub fn shutdown(mut self) -> LoaderResult<StageLoader<B>> {
        self.stop()
    }

    fn stop(&mut self) -> LoaderResult<StageLoader<B>> {
        drop(self.requests.take());
        self.worker
            .take()
            .ok_or(LoaderError::QueueClosed)?
            .join()
            .map_err(|_| LoaderError::WorkerPanicked)
    }
}

impl<B> Drop for LoaderQueue<B> {
    fn drop(&mut self) {
        drop(self.requests.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
