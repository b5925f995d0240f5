use std::{sync::Arc, time::Duration};

use plenka_state::{Cluster, Region, YearRange, api::ErrorKind};

use crate::{AnnotationDelta, MapSession, PhotoGateway, SessionOptions};

/// How long the viewport must stay still before it is loaded.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub enum ViewportRequest {
    /// The visible region changed.
    Viewport(Region),
    /// The year filter changed; the last region is reloaded.
    YearRange(YearRange),
    /// A server cluster was tapped.
    ZoomIntoCluster(Cluster),
    Clear,
}

#[derive(Debug, Clone)]
pub enum MapEvent {
    Annotations(AnnotationDelta),
    LoadFailed { kind: ErrorKind, message: String },
    /// The map should move to this region.
    MoveTo(Region),
    /// Everything on the map should be removed.
    Cleared,
}

pub type MapEventRx = tokio::sync::broadcast::Receiver<MapEvent>;

#[derive(Clone)]
pub struct SessionThreadSendHandle(tokio::sync::mpsc::UnboundedSender<ViewportRequest>);
impl SessionThreadSendHandle {
    pub fn send(&self, request: ViewportRequest) {
        if self.0.send(request).is_err() {
            tracing::warn!("Session thread has stopped, dropping request");
        }
    }
}

/// Runs a [`MapSession`] on its own thread, coalescing bursts of viewport
/// changes and broadcasting the results.
///
/// The thread stops once the `SessionThread` and every send handle are dropped.
pub struct SessionThread {
    request_tx: SessionThreadSendHandle,
    event_tx: tokio::sync::broadcast::Sender<MapEvent>,
    _session_thread_handle: std::thread::JoinHandle<()>,
}
impl SessionThread {
    pub fn new<G: PhotoGateway>(
        gateway: Arc<G>,
        options: SessionOptions,
        debounce: Duration,
    ) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (request_tx, request_rx) = tokio::sync::mpsc::unbounded_channel();
        let (event_tx, _) = tokio::sync::broadcast::channel(100);

        let worker = Worker {
            session: MapSession::new(gateway, options),
            events: event_tx.clone(),
            debounce,
        };
        let session_thread_handle = std::thread::Builder::new()
            .name("plenka-session".to_string())
            .spawn(move || runtime.block_on(worker.run(request_rx)))?;

        Ok(Self {
            request_tx: SessionThreadSendHandle(request_tx),
            event_tx,
            _session_thread_handle: session_thread_handle,
        })
    }

    pub fn send(&self, request: ViewportRequest) {
        self.request_tx.send(request);
    }

    pub fn send_handle(&self) -> SessionThreadSendHandle {
        self.request_tx.clone()
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> MapEventRx {
        self.event_tx.subscribe()
    }
}

/// What a burst of requests asks the worker to load once it settles.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Nothing,
    /// Load the last region again.
    Reload,
    Region(Region),
}
impl Pending {
    fn merge(self, next: Pending) -> Pending {
        match (self, next) {
            (_, Pending::Region(region)) => Pending::Region(region),
            (Pending::Nothing, Pending::Reload) => Pending::Reload,
            (current, _) => current,
        }
    }
}

struct Worker<G> {
    session: MapSession<G>,
    events: tokio::sync::broadcast::Sender<MapEvent>,
    debounce: Duration,
}
impl<G: PhotoGateway> Worker<G> {
    async fn run(mut self, mut requests: tokio::sync::mpsc::UnboundedReceiver<ViewportRequest>) {
        while let Some(request) = requests.recv().await {
            let mut pending = self.apply(request);
            if pending != Pending::Nothing {
                // Keep absorbing requests until the viewport has been still
                // for a full debounce interval.
                while let Ok(Some(request)) =
                    tokio::time::timeout(self.debounce, requests.recv()).await
                {
                    pending = pending.merge(self.apply(request));
                }
            }

            let region = match pending {
                Pending::Nothing => continue,
                Pending::Reload => match self.session.last_region() {
                    Some(region) => region,
                    None => continue,
                },
                Pending::Region(region) => region,
            };
            self.load(region).await;
        }
        tracing::debug!("Session thread stopping");
    }

    fn apply(&mut self, request: ViewportRequest) -> Pending {
        match request {
            ViewportRequest::Viewport(region) => Pending::Region(region),
            ViewportRequest::YearRange(years) => {
                if self.session.set_year_range(years) {
                    Pending::Reload
                } else {
                    Pending::Nothing
                }
            }
            ViewportRequest::ZoomIntoCluster(cluster) => {
                let region = self.session.cluster_tap_region(&cluster);
                self.publish(MapEvent::MoveTo(region));
                Pending::Nothing
            }
            ViewportRequest::Clear => {
                self.session.clear();
                self.publish(MapEvent::Cleared);
                Pending::Nothing
            }
        }
    }

    async fn load(&mut self, region: Region) {
        match self.session.viewport_changed(region).await {
            Ok(delta) => {
                tracing::info!(
                    "Loaded {} new annotations, {} retracted",
                    delta.added.len(),
                    delta.removed.len()
                );
                self.publish(MapEvent::Annotations(delta));
            }
            Err(e) => self.publish(MapEvent::LoadFailed {
                kind: e.kind(),
                message: e.to_string(),
            }),
        }
    }

    fn publish(&self, event: MapEvent) {
        // No subscribers is fine; the event is simply dropped.
        let _ = self.events.send(event);
    }
}
