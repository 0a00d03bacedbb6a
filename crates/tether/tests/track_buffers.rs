//! Track-buffer creation, appends, and remux routing.

use std::sync::Arc;

use bytes::Bytes;
use rstest::rstest;
use tether::{
    AddBufferError, AppendError, CoreEvent, Dispatcher, Options, RemoveRangeError, Remuxer,
    SinkReadiness, TrackKind,
};
use tether_host::{
    CreateBufferError,
    mock::{MockHost, MockSurface},
};

/// Prepends a marker so tests can tell transformed bytes from originals.
struct PrefixRemuxer;

impl Remuxer for PrefixRemuxer {
    fn remux(&self, input: &[u8]) -> Option<Bytes> {
        let mut out = Vec::with_capacity(4 + input.len());
        out.extend_from_slice(b"fmp4");
        out.extend_from_slice(input);
        Some(Bytes::from(out))
    }
}

struct FailingRemuxer;

impl Remuxer for FailingRemuxer {
    fn remux(&self, _input: &[u8]) -> Option<Bytes> {
        None
    }
}

fn make_dispatcher(remuxer: Option<Arc<dyn Remuxer>>) -> (Dispatcher, Arc<MockHost>) {
    let host = MockHost::new();
    let options = Options {
        remuxer,
        ..Options::default()
    };
    let dispatcher = Dispatcher::new(host.clone(), options);
    (dispatcher, host)
}

fn attached_player(dispatcher: &Dispatcher) -> tether::PlayerId {
    let player = dispatcher.create_player(MockSurface::new()).unwrap();
    dispatcher.attach_media_sink(player).unwrap();
    player
}

#[test]
fn empty_mime_type_never_reaches_the_host() {
    let (dispatcher, host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    assert_eq!(
        dispatcher.add_track_buffer(player, TrackKind::Audio, ""),
        Err(AddBufferError::EmptyMimeType)
    );
    assert_eq!(host.sink(0).create_buffer_calls(), 0);
}

#[test]
fn buffer_ids_are_monotonic_per_sink() {
    let (dispatcher, host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    let first = dispatcher
        .add_track_buffer(player, TrackKind::Audio, "audio/mp4")
        .unwrap();
    let second = dispatcher
        .add_track_buffer(player, TrackKind::Video, "video/mp4")
        .unwrap();
    assert_eq!(first, 0);
    assert_eq!(second, 1);
    assert_eq!(host.sink(0).buffer(0).mime_type(), "audio/mp4");
    assert_eq!(host.sink(0).buffer(1).mime_type(), "video/mp4");
}

#[test]
fn transport_stream_type_is_negotiated_and_remuxed() {
    let (dispatcher, host) = make_dispatcher(Some(Arc::new(PrefixRemuxer)));
    let player = attached_player(&dispatcher);

    let buffer = dispatcher
        .add_track_buffer(player, TrackKind::Audio, "video/mp2t; codecs=\"mp4a.40.2\"")
        .unwrap();
    let mock_buffer = host.sink(0).buffer(0);
    assert_eq!(mock_buffer.mime_type(), "audio/mp4; codecs=\"mp4a.40.2\"");

    dispatcher.append_bytes(player, buffer, b"segment").unwrap();
    assert_eq!(mock_buffer.appended(), vec![b"fmp4segment".to_vec()]);
}

#[test]
fn plain_type_is_appended_verbatim() {
    let (dispatcher, host) = make_dispatcher(Some(Arc::new(PrefixRemuxer)));
    let player = attached_player(&dispatcher);

    let buffer = dispatcher
        .add_track_buffer(player, TrackKind::Video, "video/mp4")
        .unwrap();
    dispatcher.append_bytes(player, buffer, b"segment").unwrap();
    assert_eq!(host.sink(0).buffer(0).appended(), vec![b"segment".to_vec()]);
}

#[test]
fn transport_stream_without_transform_is_unsupported() {
    let (dispatcher, host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    assert_eq!(
        dispatcher.add_track_buffer(player, TrackKind::Video, "video/mp2t"),
        Err(AddBufferError::TypeNotSupported)
    );
    assert_eq!(host.sink(0).create_buffer_calls(), 0);
}

#[rstest]
#[case(CreateBufferError::QuotaExceeded("too many".into()), AddBufferError::QuotaExceeded)]
#[case(CreateBufferError::TypeNotSupported("no codec".into()), AddBufferError::TypeNotSupported)]
#[case(CreateBufferError::Other("boom".into()), AddBufferError::Unknown("boom".into()))]
fn host_creation_failures_map_to_error_kinds(
    #[case] host_error: CreateBufferError,
    #[case] expected: AddBufferError,
) {
    let (dispatcher, host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    host.sink(0).fail_next_buffer(host_error);
    assert_eq!(
        dispatcher.add_track_buffer(player, TrackKind::Audio, "audio/mp4"),
        Err(expected)
    );
}

#[test]
fn closed_sink_rejects_new_buffers() {
    let (dispatcher, host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    host.sink(0).set_readiness(SinkReadiness::Closed);
    assert_eq!(
        dispatcher.add_track_buffer(player, TrackKind::Audio, "audio/mp4"),
        Err(AddBufferError::SinkClosed)
    );
}

#[test]
fn failed_transform_pushes_nothing() {
    let (dispatcher, host) = make_dispatcher(Some(Arc::new(FailingRemuxer)));
    let player = attached_player(&dispatcher);

    let buffer = dispatcher
        .add_track_buffer(player, TrackKind::Video, "video/mp2t")
        .unwrap();
    assert_eq!(
        dispatcher.append_bytes(player, buffer, b"segment"),
        Err(AppendError::RemuxFailed)
    );
    assert!(host.sink(0).buffer(0).appended().is_empty());
}

#[test]
fn append_to_unknown_buffer_is_rejected() {
    let (dispatcher, _host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    assert_eq!(
        dispatcher.append_bytes(player, 7, b"segment"),
        Err(AppendError::PlayerOrBufferNotFound)
    );
}

#[test]
fn host_append_failure_preserves_the_message() {
    let (dispatcher, host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    let buffer = dispatcher
        .add_track_buffer(player, TrackKind::Audio, "audio/mp4")
        .unwrap();
    host.sink(0).buffer(0).fail_next_append("append refused");
    assert_eq!(
        dispatcher.append_bytes(player, buffer, b"segment"),
        Err(AppendError::Unknown("append refused".into()))
    );
}

#[test]
fn update_finished_forwards_the_local_buffer_id() {
    let (dispatcher, host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    let buffer = dispatcher
        .add_track_buffer(player, TrackKind::Audio, "audio/mp4")
        .unwrap();
    let mut events = dispatcher.subscribe();
    host.sink(0).buffer(0).fire_update_finished();

    match events.try_recv().unwrap() {
        CoreEvent::BufferUpdateFinished { player: p, buffer: b } => {
            assert_eq!(p, player);
            assert_eq!(b, buffer);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn remove_range_reaches_the_buffer() {
    let (dispatcher, host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    let buffer = dispatcher
        .add_track_buffer(player, TrackKind::Audio, "audio/mp4")
        .unwrap();
    dispatcher.remove_range(player, buffer, 2.0, 8.0).unwrap();
    assert_eq!(host.sink(0).buffer(0).removed_ranges(), vec![(2.0, 8.0)]);

    assert_eq!(
        dispatcher.remove_range(player, 99, 0.0, 1.0),
        Err(RemoveRangeError::PlayerOrBufferNotFound)
    );
}

#[test]
fn append_after_detach_is_rejected() {
    let (dispatcher, _host) = make_dispatcher(None);
    let player = attached_player(&dispatcher);

    let buffer = dispatcher
        .add_track_buffer(player, TrackKind::Audio, "audio/mp4")
        .unwrap();
    dispatcher.detach_media_sink(player).unwrap();
    assert_eq!(
        dispatcher.append_bytes(player, buffer, b"segment"),
        Err(AppendError::PlayerOrBufferNotFound)
    );
}
