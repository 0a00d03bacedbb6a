//! Media sink attach/detach lifecycle against the mock host.

use std::sync::Arc;

use tether::{AttachError, CoreEvent, Dispatcher, Options, PlayerId, SinkError, SinkReadiness};
use tether_host::mock::{MockHost, MockSurface};

fn make_dispatcher() -> (Dispatcher, Arc<MockHost>) {
    let host = MockHost::new();
    let dispatcher = Dispatcher::new(host.clone(), Options::default());
    (dispatcher, host)
}

fn make_player(dispatcher: &Dispatcher) -> (tether::PlayerId, Arc<MockSurface>) {
    let surface = MockSurface::new();
    let player = dispatcher.create_player(surface.clone()).unwrap();
    (player, surface)
}

#[test]
fn attach_creates_sink_and_binds_surface() {
    let (dispatcher, host) = make_dispatcher();
    let (player, surface) = make_player(&dispatcher);

    dispatcher.attach_media_sink(player).unwrap();

    assert_eq!(host.sink_count(), 1);
    assert!(surface.bound_token().is_some());
    assert_eq!(host.sink(0).readiness_listener_count(), 1);
}

#[test]
fn attach_twice_is_rejected() {
    let (dispatcher, _host) = make_dispatcher();
    let (player, _surface) = make_player(&dispatcher);

    dispatcher.attach_media_sink(player).unwrap();
    assert_eq!(
        dispatcher.attach_media_sink(player),
        Err(AttachError::AlreadyAttached)
    );
}

#[test]
fn attach_unknown_player_is_rejected() {
    let (dispatcher, _host) = make_dispatcher();
    assert_eq!(
        dispatcher.attach_media_sink(PlayerId(42)),
        Err(AttachError::PlayerInstanceNotFound)
    );
}

#[test]
fn host_failure_maps_to_unknown_with_message() {
    let (dispatcher, host) = make_dispatcher();
    let (player, _surface) = make_player(&dispatcher);

    host.fail_next_sink("sink quota reached");
    assert_eq!(
        dispatcher.attach_media_sink(player),
        Err(AttachError::Unknown("sink quota reached".into()))
    );
}

#[test]
fn readiness_changes_are_forwarded() {
    let (dispatcher, host) = make_dispatcher();
    let (player, _surface) = make_player(&dispatcher);
    dispatcher.attach_media_sink(player).unwrap();

    let mut events = dispatcher.subscribe();
    host.sink(0).set_readiness(SinkReadiness::Ended);

    match events.try_recv().unwrap() {
        CoreEvent::SinkReadinessChanged {
            player: p,
            readiness,
        } => {
            assert_eq!(p, player);
            assert_eq!(readiness, SinkReadiness::Ended);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn detach_tears_buffers_down_in_reverse_order() {
    let (dispatcher, host) = make_dispatcher();
    let (player, surface) = make_player(&dispatcher);
    dispatcher.attach_media_sink(player).unwrap();

    let first = dispatcher
        .add_track_buffer(player, tether::TrackKind::Audio, "audio/mp4")
        .unwrap();
    let second = dispatcher
        .add_track_buffer(player, tether::TrackKind::Video, "video/mp4")
        .unwrap();
    assert!(first < second);

    let sink = host.sink(0);
    let first_handle = sink.buffer(0);
    let second_handle = sink.buffer(1);

    dispatcher.detach_media_sink(player).unwrap();

    assert!(first_handle.aborted());
    assert!(second_handle.aborted());
    let removed = sink.removed_buffers();
    assert_eq!(removed.len(), 2);
    assert!(Arc::ptr_eq(&removed[0], &second_handle));
    assert!(Arc::ptr_eq(&removed[1], &first_handle));

    assert!(surface.bound_token().is_none());
    assert!(sink.token_released());
    assert_eq!(sink.readiness_listener_count(), 0);
}

#[test]
fn detach_of_closed_sink_skips_buffer_teardown() {
    let (dispatcher, host) = make_dispatcher();
    let (player, surface) = make_player(&dispatcher);
    dispatcher.attach_media_sink(player).unwrap();
    dispatcher
        .add_track_buffer(player, tether::TrackKind::Audio, "audio/mp4")
        .unwrap();

    let sink = host.sink(0);
    sink.set_readiness(SinkReadiness::Closed);

    dispatcher.detach_media_sink(player).unwrap();

    assert!(sink.removed_buffers().is_empty());
    assert!(!sink.buffer(0).aborted());
    assert!(surface.bound_token().is_none());
    assert!(sink.token_released());
}

#[test]
fn detach_without_sink_is_rejected() {
    let (dispatcher, _host) = make_dispatcher();
    let (player, _surface) = make_player(&dispatcher);

    assert_eq!(
        dispatcher.detach_media_sink(player),
        Err(SinkError::NoSinkAttached)
    );

    dispatcher.attach_media_sink(player).unwrap();
    dispatcher.detach_media_sink(player).unwrap();
    assert_eq!(
        dispatcher.detach_media_sink(player),
        Err(SinkError::NoSinkAttached)
    );
}

#[test]
fn duration_reaches_the_sink() {
    let (dispatcher, host) = make_dispatcher();
    let (player, _surface) = make_player(&dispatcher);

    assert_eq!(
        dispatcher.set_sink_duration(player, 60.0),
        Err(SinkError::NoSinkAttached)
    );

    dispatcher.attach_media_sink(player).unwrap();
    dispatcher.set_sink_duration(player, 60.0).unwrap();
    assert_eq!(host.sink(0).duration(), Some(60.0));
}
