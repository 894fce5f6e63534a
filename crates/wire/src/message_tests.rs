use super::*;

#[test]
fn parses_ready_frame() {
    let parts = WorkerFrame::Ready { service_name: "poolA".into(), worker_id: "w1".into() }.encode();
    let parsed = WorkerFrame::parse(&parts).unwrap();
    assert_eq!(
        parsed,
        WorkerFrame::Ready { service_name: "poolA".into(), worker_id: "w1".into() }
    );
}

#[test]
fn parses_heartbeat_and_disconnect() {
    assert_eq!(WorkerFrame::parse(&WorkerFrame::Heartbeat.encode()).unwrap(), WorkerFrame::Heartbeat);
    assert_eq!(
        WorkerFrame::parse(&WorkerFrame::Disconnect.encode()).unwrap(),
        WorkerFrame::Disconnect
    );
}

#[test]
fn rejects_wrong_header_byte() {
    let parts = vec![vec![0xee], vec![Command::Heartbeat.as_byte()]];
    assert!(matches!(WorkerFrame::parse(&parts), Err(ProtocolError::UnknownHeader(0xee))));
}

#[test]
fn rejects_too_few_parts() {
    let parts = vec![vec![WORKER_HEADER]];
    assert!(matches!(WorkerFrame::parse(&parts), Err(ProtocolError::Malformed { .. })));
}

#[test]
fn rejects_broker_only_command_from_worker() {
    let parts = vec![vec![WORKER_HEADER], vec![Command::Request.as_byte()], b"x".to_vec()];
    assert!(matches!(WorkerFrame::parse(&parts), Err(ProtocolError::UnknownCommand(_))));
}

#[test]
fn broker_frame_round_trips_request_payload() {
    let frame = BrokerFrame::Request { payload: b"hello".to_vec() };
    let parsed = BrokerFrame::parse(&frame.encode()).unwrap();
    assert_eq!(parsed, frame);
}

#[test]
fn broker_frame_rejects_ready_command() {
    let parts = WorkerFrame::Ready { service_name: "a".into(), worker_id: "b".into() }.encode();
    assert!(matches!(BrokerFrame::parse(&parts), Err(ProtocolError::UnknownCommand(_))));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn worker_ready_frame_roundtrips(service_name in ".*", worker_id in ".*") {
            let frame = WorkerFrame::Ready { service_name: service_name.clone(), worker_id: worker_id.clone() };
            let parsed = WorkerFrame::parse(&frame.encode()).unwrap();
            prop_assert_eq!(parsed, frame);
        }

        #[test]
        fn broker_request_frame_roundtrips(payload in proptest::collection::vec(any::<u8>(), 0..64)) {
            let frame = BrokerFrame::Request { payload: payload.clone() };
            let parsed = BrokerFrame::parse(&frame.encode()).unwrap();
            prop_assert_eq!(parsed, frame);
        }
    }
}
