//! End-to-end scenarios over the public surface: literal fixtures for the
//! splitter, the CSV projection, and the planner.

use spliterator::{
    iter_chunks, plan_chunks, AsyncSpliterator, ByteRange, CsvMode, CsvOptions, CsvRow,
    CsvSplitter, MemorySource, Needle, SplitOptions, Spliterator,
};

fn block_on<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(fut)
}

#[test]
fn headerless_array_row() {
    let rows: Vec<_> = CsvSplitter::new(
        b"a,b,c",
        CsvOptions {
            header: false,
            ..Default::default()
        },
    )
    .collect::<Result<_, _>>()
    .unwrap();
    assert_eq!(
        rows,
        [CsvRow::Array(vec!["a".into(), "b".into(), "c".into()])]
    );
}

#[test]
fn header_object_rows() {
    let rows: Vec<_> = CsvSplitter::new(
        b"name,age\nAlice,30\nBob,40\n",
        CsvOptions {
            mode: CsvMode::Object,
            ..Default::default()
        },
    )
    .collect::<Result<_, _>>()
    .unwrap();

    assert_eq!(rows.len(), 2);
    let CsvRow::Object(alice) = &rows[0] else {
        panic!("expected object rows");
    };
    assert_eq!(alice["name"], "Alice");
    assert_eq!(alice["age"], "30");
    let CsvRow::Object(bob) = &rows[1] else {
        panic!("expected object rows");
    };
    assert_eq!(bob["name"], "Bob");
    assert_eq!(bob["age"], "40");
}

#[test]
fn duplicate_headers_canonicalize_with_suffixes() {
    let mut splitter = CsvSplitter::new(
        b"Full Name,Full Name,Age\n1,2,3\n",
        CsvOptions {
            normalize_keys: Some(true),
            ..Default::default()
        },
    );
    let first = splitter.next().unwrap().unwrap();
    assert_eq!(
        splitter.headers().unwrap(),
        ["full_name", "full_name_2", "age"]
    );
    assert_eq!(
        first,
        CsvRow::Array(vec!["1".into(), "2".into(), "3".into()])
    );
}

#[test]
fn quote_aware_columns() {
    let rows: Vec<_> = CsvSplitter::new(
        b"\"a,b\",c\n",
        CsvOptions {
            header: false,
            ..Default::default()
        },
    )
    .collect::<Result<_, _>>()
    .unwrap();
    assert_eq!(rows, [CsvRow::Array(vec!["\"a,b\"".into(), "c".into()])]);
}

#[test]
fn planner_aligns_boundaries_after_delimiters() {
    let mut bytes = vec![b'x'; 1000];
    for p in [100, 250, 500, 750] {
        bytes[p] = b'\n';
    }
    let plan = block_on(plan_chunks(
        &mut MemorySource(bytes),
        &Needle::from_char('\n'),
        3,
    ))
    .unwrap();
    assert_eq!(
        plan,
        [
            ByteRange::new(0, 250),
            ByteRange::new(251, 500),
            ByteRange::new(501, 1000),
        ]
    );
}

#[test]
fn async_three_byte_chunks() {
    let chunks: Vec<Vec<u8>> = b"ab\ncd\nef".chunks(3).map(<[u8]>::to_vec).collect();
    let records = block_on(
        AsyncSpliterator::over_stream(
            iter_chunks(chunks),
            Needle::from_char('\n'),
            SplitOptions {
                skip_empty: true,
                ..Default::default()
            },
        )
        .collect_vecs(),
    )
    .unwrap();
    assert_eq!(records, [b"ab", b"cd", b"ef"]);
}

#[test]
fn sync_and_async_agree_on_a_mixed_fixture() {
    let source = b"one\n\ntwo\nthree\n";
    let needle = Needle::from_char('\n');

    let sync: Vec<Vec<u8>> = Spliterator::new(source, needle.clone(), SplitOptions::default())
        .map(<[u8]>::to_vec)
        .collect();

    let chunks: Vec<Vec<u8>> = source.chunks(4).map(<[u8]>::to_vec).collect();
    let streamed = block_on(
        AsyncSpliterator::over_stream(iter_chunks(chunks), needle.clone(), SplitOptions::default())
            .collect_vecs(),
    )
    .unwrap();

    let seekable = block_on(
        AsyncSpliterator::over_seekable(
            MemorySource(source.to_vec()),
            needle,
            SplitOptions::default(),
        )
        .collect_vecs(),
    )
    .unwrap();

    assert_eq!(sync, streamed);
    assert_eq!(sync, seekable);
}

#[test]
fn record_reconstruction_with_crlf() {
    let source = b"alpha\r\nbeta\r\n\r\ngamma";
    let records: Vec<&[u8]> = Spliterator::new(
        source,
        Needle::from_str("\r\n").unwrap(),
        SplitOptions::default(),
    )
    .collect();
    assert_eq!(records, [&b"alpha"[..], b"beta", b"", b"gamma"]);
    assert_eq!(records.join(&b"\r\n"[..]), source);
}
