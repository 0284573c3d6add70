//! The streaming job: consume payloads, normalize, fan out.
//!
//! Each payload flows normalize -> raw sink, then annotate -> annotated sink.
//! Records are processed independently and unordered; the router keeps no
//! cross-record state, so it is safe to drive from any number of workers.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::annotate::Annotator;
use crate::error::Result;
use crate::event::{AnnotatedEvent, PurchaseEvent, Status};
use crate::normalize::Normalizer;
use crate::transport::EventSubscriber;
use crate::warehouse::EventSink;

/// Routes one payload at a time through the normalizer, the raw sink, the
/// annotator and the annotated sink.
pub struct Pipeline<R, A> {
    normalizer: Normalizer,
    annotator: Annotator,
    raw_sink: R,
    annotated_sink: A,
}

impl<R, A> Pipeline<R, A>
where
    R: EventSink<PurchaseEvent>,
    A: EventSink<AnnotatedEvent>,
{
    pub fn new(raw_sink: R, annotated_sink: A) -> Self {
        Self {
            normalizer: Normalizer::new(),
            annotator: Annotator::new(),
            raw_sink,
            annotated_sink,
        }
    }

    /// Handles one payload: at most one record comes out the other end.
    ///
    /// A malformed payload is dropped after a diagnostic and yields
    /// `Ok(None)`; neither sink sees it. Sink failures are real errors and
    /// surface as `Err`, they are not part of the drop policy.
    pub async fn dispatch(&self, payload: &[u8]) -> Result<Option<Status>> {
        let event = match self.normalizer.normalize(payload) {
            Ok(event) => event,
            Err(reason) => {
                warn!(%reason, "dropping malformed payload");
                return Ok(None);
            }
        };

        self.raw_sink.append(&event).await?;

        let annotated = self.annotator.annotate(event);
        self.annotated_sink.append(&annotated).await?;

        Ok(Some(annotated.status))
    }

    /// Consumes messages until the token is cancelled.
    ///
    /// A single bad record never stops the loop; sink and receive errors are
    /// logged and the loop moves on to the next message.
    pub async fn run(&self, subscriber: EventSubscriber, shutdown: CancellationToken) -> Result<()> {
        info!("pipeline started, waiting for purchase events");

        loop {
            tokio::select! {
                received = subscriber.recv() => {
                    match received {
                        Ok(payload) => {
                            if let Err(e) = self.dispatch(&payload).await {
                                error!(error = %e, "failed to write purchase event");
                            }
                        }
                        Err(e) => error!(error = %e, "receive error"),
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("shutdown requested, stopping pipeline");
                    return Ok(());
                }
            }
        }
    }
}
