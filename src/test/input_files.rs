use std::fs;
use std::path::{Path, PathBuf};

use super::{dims, unique_temp_dir};
use crate::error::ModelError;
use crate::flow::TraceRecord;
use crate::input::{
    ModelConf, RECORD_BYTES, convert_text_trace, load_endpoint_map, parse_endpoint_map,
    read_inter_edges, read_intra_edges, read_trace_range, write_binary_trace, write_inter_edges,
    write_intra_edges,
};
use crate::topo::{Coords, InterEdge, IntraEdge};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn conf_parses_dimensions_files_and_repeated_traces() {
    let text = "\
# 2 组 x 2 行 x 2 列
8
2 2 2 1 1
intra.bin inter.bin
a.bin 4 100   # 第一个 trace
b.txt 4 20
";
    let conf = ModelConf::parse(Path::new("model.conf"), text).unwrap();
    assert_eq!(conf.num_routers, 8);
    assert_eq!(conf.dims, dims(2, 2, 2, 1, 1));
    assert_eq!(conf.intra_file, PathBuf::from("intra.bin"));
    assert_eq!(conf.inter_file, PathBuf::from("inter.bin"));
    assert_eq!(conf.traces.len(), 2);
    assert_eq!(conf.traces[0].path, PathBuf::from("a.bin"));
    assert_eq!((conf.traces[0].ranks, conf.traces[0].messages), (4, 100));
    assert_eq!((conf.traces[1].ranks, conf.traces[1].messages), (4, 20));
}

#[test]
fn conf_reports_line_of_bad_token_and_non_positive_values() {
    let err = ModelConf::parse(Path::new("c"), "8\n2 2 x 1 1\n").unwrap_err();
    match err {
        ModelError::Parse { line, msg, .. } => {
            assert_eq!(line, 2);
            assert!(msg.contains("`x`"), "{msg}");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = ModelConf::parse(Path::new("c"), "0\n2 2 2 1 1\ni o\n").unwrap_err();
    assert!(matches!(err, ModelError::NonPositive { value: 0, .. }));

    let err = ModelConf::parse(Path::new("c"), "8\n2 2 2 1 1\ni o\nt.bin 4 0\n").unwrap_err();
    assert!(matches!(
        err,
        ModelError::NonPositive {
            field: "number of messages",
            ..
        }
    ));

    let err = ModelConf::parse(Path::new("c"), "8\n2 2 2\n").unwrap_err();
    assert!(matches!(err, ModelError::Parse { .. }));
}

#[test]
fn missing_conf_file_is_an_io_error() {
    let dir = unique_temp_dir("conf-missing");
    let err = ModelConf::load(&dir.join("nope.conf")).unwrap_err();
    assert!(matches!(err, ModelError::Io { .. }));
}

#[test]
fn mapfile_falls_back_to_default_when_absent() {
    let d = dims(2, 1, 2, 1, 2);
    let dir = unique_temp_dir("mapfile");
    let map = load_endpoint_map(Some(dir.join("absent.map").as_path()), d).unwrap();
    assert_eq!(map.len(), 8);
    assert_eq!(*map.get(5).unwrap(), Coords([1, 0, 0, 0, 1]));

    let map = load_endpoint_map(None, d).unwrap();
    assert_eq!(map.len(), 8);
}

#[test]
fn mapfile_reads_explicit_coordinates_in_endpoint_order() {
    let d = dims(2, 1, 2, 1, 1);
    let dir = unique_temp_dir("mapfile-explicit");
    let path = write_file(&dir, "reverse.map", "1 0 1 0 0\n1 0 0 0 0\n0 0 1 0 0\n0 0 0 0 0\n");
    let map = load_endpoint_map(Some(path.as_path()), d).unwrap();
    assert_eq!(map.router_of(map.get(0).unwrap()), 3);
    assert_eq!(map.router_of(map.get(3).unwrap()), 0);

    let err = parse_endpoint_map(&path, "0 0 0 0 0\n", d).unwrap_err();
    assert!(matches!(err, ModelError::Parse { line: 1, .. }));

    let err = parse_endpoint_map(&path, "0 0 2 0 0\n0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n", d)
        .unwrap_err();
    assert!(matches!(err, ModelError::CoordOutOfRange { .. }));
}

#[test]
fn edge_files_round_trip_and_reject_truncated_records() {
    let dir = unique_temp_dir("edges");
    let intra = vec![
        IntraEdge {
            src: 0,
            dst: 1,
            tag: 0,
        },
        IntraEdge {
            src: 1,
            dst: 3,
            tag: 1,
        },
    ];
    let inter = vec![InterEdge { src: 1, dst: 6 }, InterEdge { src: 6, dst: 1 }];
    let intra_path = dir.join("intra.bin");
    let inter_path = dir.join("inter.bin");
    write_intra_edges(&intra_path, &intra).unwrap();
    write_inter_edges(&inter_path, &inter).unwrap();
    assert_eq!(fs::metadata(&intra_path).unwrap().len(), 24);
    assert_eq!(read_intra_edges(&intra_path).unwrap(), intra);
    assert_eq!(read_inter_edges(&inter_path).unwrap(), inter);

    // 截断到 12 字节后最后一条只剩一半
    let mut raw = fs::read(&inter_path).unwrap();
    raw.truncate(12);
    fs::write(&inter_path, &raw).unwrap();
    let err = read_inter_edges(&inter_path).unwrap_err();
    assert!(matches!(err, ModelError::Truncated { offset: 8, .. }));
}

#[test]
fn binary_trace_reads_only_the_requested_record_range() {
    let dir = unique_temp_dir("trace-bin");
    let path = dir.join("trace.bin");
    let records: Vec<TraceRecord> = (0..10)
        .map(|i| TraceRecord {
            src: i,
            dst: 9 - i,
            bytes: 1024.0 * i as f64,
        })
        .collect();
    write_binary_trace(&path, &records).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 10 * RECORD_BYTES);

    assert_eq!(read_trace_range(&path, 3..6).unwrap(), records[3..6].to_vec());
    assert!(read_trace_range(&path, 4..4).unwrap().is_empty());
    // 文件比配置短：只返回实际存在的记录
    assert_eq!(read_trace_range(&path, 8..12).unwrap(), records[8..].to_vec());

    let mut raw = fs::read(&path).unwrap();
    raw.truncate(raw.len() - 4);
    fs::write(&path, &raw).unwrap();
    let err = read_trace_range(&path, 8..10).unwrap_err();
    assert!(matches!(err, ModelError::Truncated { offset: 144, .. }));
}

#[test]
fn text_trace_skips_blank_lines_and_converts_to_binary() {
    let dir = unique_temp_dir("trace-txt");
    let text = write_file(&dir, "trace.txt", "0 1 100\n\n2 3 2.5e3\n4 5 7\n");
    let got = read_trace_range(&text, 1..3).unwrap();
    assert_eq!(
        got,
        vec![
            TraceRecord {
                src: 2,
                dst: 3,
                bytes: 2500.0
            },
            TraceRecord {
                src: 4,
                dst: 5,
                bytes: 7.0
            },
        ]
    );

    let bin = dir.join("trace.bin");
    assert_eq!(convert_text_trace(&text, &bin).unwrap(), 3);
    assert_eq!(read_trace_range(&bin, 0..3).unwrap()[1], got[0]);

    let bad = write_file(&dir, "bad.txt", "0 1 100\n2 oops 5\n");
    let err = read_trace_range(&bad, 0..2).unwrap_err();
    assert!(matches!(err, ModelError::Parse { line: 2, .. }));
}
