use super::dims;
use crate::error::ModelError;
use crate::flow::{MB, Message, MessageSet, TraceRecord, partition};
use crate::topo::EndpointMap;

#[test]
fn partition_covers_range_without_overlap() {
    for (total, size) in [(10u64, 3usize), (3, 5), (0, 2), (1_000_003, 7)] {
        let mut next = 0;
        for rank in 0..size {
            let r = partition(total, rank, size);
            assert_eq!(r.start, next, "total {total} size {size} rank {rank}");
            assert!(r.end >= r.start);
            next = r.end;
        }
        assert_eq!(next, total);
    }
    assert_eq!(partition(10, 0, 3), 0..3);
    assert_eq!(partition(10, 1, 3), 3..6);
    assert_eq!(partition(10, 2, 3), 6..10);
}

#[test]
fn push_record_drops_same_router_and_empty_messages() {
    // 每个路由器 2 个 pci，每个 pci 2 个 core：端点 0..4 都在路由器 0 上
    let map = EndpointMap::dimension_ordered(dims(2, 1, 2, 2, 2));
    let mut set = MessageSet::new();

    let same_router = TraceRecord {
        src: 0,
        dst: 3,
        bytes: MB,
    };
    assert!(!set.push_record(same_router, 0, &map).unwrap());
    let empty = TraceRecord {
        src: 0,
        dst: 4,
        bytes: 0.0,
    };
    assert!(!set.push_record(empty, 0, &map).unwrap());

    let real = TraceRecord {
        src: 2,
        dst: 13,
        bytes: 3.0 * MB,
    };
    assert!(set.push_record(real, 0, &map).unwrap());

    assert_eq!(set.len(), 1);
    assert_eq!(set.dropped(), 2);
    assert_eq!(set.total_mb(), 3.0);
    let m = &set.messages()[0];
    assert_eq!((m.src, m.dst), (0, 3));
    assert_eq!((m.src_pci, m.dst_pci), (1, 0));
    assert_eq!(m.bytes, 3.0);
}

#[test]
fn push_record_applies_endpoint_base_and_rejects_unknown_endpoints() {
    let map = EndpointMap::dimension_ordered(dims(2, 1, 2, 1, 1));
    let mut set = MessageSet::new();
    let rec = TraceRecord {
        src: 0,
        dst: 1,
        bytes: MB,
    };
    assert!(set.push_record(rec, 2, &map).unwrap());
    assert_eq!((set.messages()[0].src, set.messages()[0].dst), (2, 3));

    let err = set.push_record(rec, 3, &map).unwrap_err();
    assert!(matches!(err, ModelError::UnknownEndpoint { endpoint: 4, .. }));
}

#[test]
fn set_paths_keeps_state_only_when_count_matches() {
    use crate::route::Hop;
    use crate::topo::{LinkClass, LinkId};

    let hop = |r| vec![Hop::new(r, LinkId::new(LinkClass::Green, 0))];
    let mut m = Message::new(0, 1, 0, 0, 8.0);
    m.set_paths(vec![hop(0), hop(0)]);
    m.reset_loads();
    assert!(m.candidates.iter().all(|c| c.load == 4.0 && c.expand));

    m.candidates[1].expand = false;
    m.set_paths(vec![hop(0), hop(2)]);
    assert!(!m.candidates[1].expand);
    assert_eq!(m.candidates[1].path, hop(2));
    assert!(m.is_expanding());

    m.set_paths(vec![hop(3)]);
    assert_eq!(m.candidates.len(), 1);
    assert!(m.candidates[0].expand);
}

#[test]
#[should_panic(expected = "self-message")]
fn push_rejects_self_message() {
    MessageSet::new().push(Message::new(4, 4, 0, 1, 1.0));
}
