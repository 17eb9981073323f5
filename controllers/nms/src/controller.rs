//! Main controller implementation.
//!
//! The controller reads triggers from a line-oriented source and hands each one
//! to the reconciler. A trigger is fully handled before the next line is read.

use crate::config::OperatorConfig;
use crate::error::ControllerError;
use crate::events::Trigger;
use crate::reconciler::{NmsClientFactory, Reconciler};
use crate::secrets::KubeSecretStore;
use crate::sink::StdoutSink;
use crate::workload::LocalWorkload;
use futures::{Stream, StreamExt, stream};
use kube::Client;
use nms_client::{NmsClient, NmsClientTrait};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, warn};

/// Drives the reconciler from a stream of trigger lines.
pub struct Controller {
    reconciler: Reconciler,
}

impl Controller {
    /// Creates a controller backed by the Kubernetes secret store, the local
    /// workload and stdout.
    pub async fn new(config: &OperatorConfig) -> Result<Self, ControllerError> {
        info!("Initializing NMS operator");

        let kube_client = Client::try_default().await?;
        let secrets = KubeSecretStore::new(kube_client, &config.secret_namespace);
        let workload = LocalWorkload::new(config.workload_root.clone());

        let nms_url = config.nms_url.clone();
        let factory: NmsClientFactory = Box::new(move |ca: Option<&str>| {
            let client = NmsClient::new(nms_url.clone(), ca)?;
            Ok(Arc::new(client) as Arc<dyn NmsClientTrait>)
        });

        Ok(Self::with_reconciler(Reconciler::new(
            Arc::new(workload),
            Arc::new(secrets),
            Arc::new(StdoutSink),
            factory,
        )))
    }

    pub fn with_reconciler(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }

    /// Handle every trigger until the input ends.
    ///
    /// Malformed lines are logged and skipped. A relation-data write attempted
    /// without leadership stops the controller.
    pub async fn run<R>(&self, input: R) -> Result<(), ControllerError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = std::pin::pin!(trigger_lines(input));
        let mut handled = 0u64;
        while let Some(line) = lines.next().await {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let trigger = match Trigger::parse(&line) {
                Ok(trigger) => trigger,
                Err(e) => {
                    warn!("Skipping trigger: {}", e);
                    continue;
                }
            };
            if let Err(e) = self.reconciler.handle(&trigger).await {
                error!("Stopping after {} trigger(s): {}", handled, e);
                return Err(e);
            }
            handled += 1;
        }
        info!("Input closed after {} trigger(s)", handled);
        Ok(())
    }
}

fn trigger_lines<R>(input: R) -> impl Stream<Item = std::io::Result<String>>
where
    R: AsyncBufRead + Unpin,
{
    stream::unfold(Some(input.lines()), |lines| async move {
        let mut lines = lines?;
        match lines.next_line().await {
            Ok(Some(line)) => Some((Ok(line), Some(lines))),
            Ok(None) => None,
            // Surface the error once, then end the stream
            Err(e) => Some((Err(e), None)),
        }
    })
}
