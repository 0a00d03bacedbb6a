//! Disposal completeness: everything a player owns dies with it.

use std::time::Duration;

use axum::{Router, routing::get};
use bytes::Bytes;
use tether::{
    AttachError, CoreEvent, Dispatcher, Options, RequestId, ResourceId, TrackKind,
};
use tether_host::mock::{MockHost, MockSurface};
use tokio::{net::TcpListener, sync::broadcast};
use url::Url;

struct TestServer {
    base_url: Url,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    async fn new() -> Self {
        let router = Router::new()
            .route("/segment", get(|| async { Bytes::from_static(b"payload") }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Bytes::from_static(b"payload")
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });
        tokio::spawn(async move {
            server.await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn url(&self, path: &str) -> Url {
        self.base_url.join(path).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

async fn retained_resource(
    dispatcher: &Dispatcher,
    events: &mut broadcast::Receiver<CoreEvent>,
    player: tether::PlayerId,
    url: Url,
) -> ResourceId {
    let request = dispatcher.fetch_bytes_no_copy(player, url).unwrap();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out waiting for completion")
            .expect("event channel closed");
        if let CoreEvent::ByteRequestFinishedNoCopy {
            request: r,
            resource,
            ..
        } = event
            && r == request
        {
            return resource;
        }
    }
}

#[tokio::test]
async fn disposal_frees_every_owned_entry() {
    let server = TestServer::new().await;
    let host = MockHost::new();
    let dispatcher = Dispatcher::new(host.clone(), Options::default());
    let surface = MockSurface::new();
    let player = dispatcher.create_player(surface.clone()).unwrap();
    let mut events = dispatcher.subscribe();

    dispatcher.attach_media_sink(player).unwrap();
    dispatcher
        .add_track_buffer(player, TrackKind::Audio, "audio/mp4")
        .unwrap();
    dispatcher.start_observing(player);

    let resource_a = retained_resource(&dispatcher, &mut events, player, server.url("/segment")).await;
    let resource_b = retained_resource(&dispatcher, &mut events, player, server.url("/segment")).await;
    let in_flight: Vec<RequestId> = (0..2)
        .map(|_| dispatcher.fetch_bytes(player, server.url("/slow")).unwrap())
        .collect();

    assert!(dispatcher.dispose_player(player));

    // Owned resources and requests are gone.
    assert!(!dispatcher.free_resource(resource_a));
    assert!(!dispatcher.free_resource(resource_b));
    for request in &in_flight {
        assert!(!dispatcher.abort_request(*request));
    }

    // The sink was torn down and the surface unbound.
    assert!(surface.bound_token().is_none());
    assert!(host.sink(0).token_released());

    // The player id itself is dead.
    assert_eq!(
        dispatcher.attach_media_sink(player),
        Err(AttachError::PlayerInstanceNotFound)
    );

    // No cancelled continuation reports anything afterwards.
    while events.try_recv().is_ok() {}
    let outcome = tokio::time::timeout(Duration::from_millis(300), events.recv()).await;
    assert!(outcome.is_err(), "post-disposal event: {outcome:?}");
}

#[tokio::test]
async fn disposal_is_idempotent() {
    let dispatcher = Dispatcher::new(MockHost::new(), Options::default());
    let player = dispatcher.create_player(MockSurface::new()).unwrap();

    assert!(dispatcher.dispose_player(player));
    assert!(!dispatcher.dispose_player(player));
}

#[tokio::test]
async fn shutdown_disposes_every_live_player() {
    let host = MockHost::new();
    let dispatcher = Dispatcher::new(host.clone(), Options::default());
    let first = dispatcher.create_player(MockSurface::new()).unwrap();
    let second = dispatcher.create_player(MockSurface::new()).unwrap();
    dispatcher.attach_media_sink(first).unwrap();

    dispatcher.context().shutdown();

    assert_eq!(
        dispatcher.attach_media_sink(first),
        Err(AttachError::PlayerInstanceNotFound)
    );
    assert_eq!(
        dispatcher.attach_media_sink(second),
        Err(AttachError::PlayerInstanceNotFound)
    );
    assert!(host.sink(0).token_released());
}

#[tokio::test]
async fn session_ids_are_not_reused_while_live() {
    let dispatcher = Dispatcher::new(MockHost::new(), Options::default());
    let first = dispatcher.create_player(MockSurface::new()).unwrap();
    let second = dispatcher.create_player(MockSurface::new()).unwrap();
    assert_ne!(first, second);
}
