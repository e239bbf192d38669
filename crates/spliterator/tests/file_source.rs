//! File-backed sources: end-to-end splitting and parallel decomposition.

#![cfg(feature = "fs")]

use std::io::Write;

use spliterator::{
    plan_chunks, split_many, AsyncSpliterator, FileSource, Needle, SplitOptions, Spliterator,
};

fn fixture(lines: usize) -> (tempfile::NamedTempFile, Vec<u8>) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut content = Vec::new();
    for i in 0..lines {
        content.extend_from_slice(format!("line-{i:04},{}\n", i * 7).as_bytes());
    }
    file.write_all(&content).unwrap();
    file.flush().unwrap();
    (file, content)
}

#[tokio::test]
async fn file_records_match_an_in_memory_scan() {
    let (file, content) = fixture(200);
    let needle = Needle::from_char('\n');

    let expected: Vec<Vec<u8>> = Spliterator::new(&content, needle.clone(), SplitOptions::default())
        .map(<[u8]>::to_vec)
        .collect();

    let source = FileSource::open(file.path()).await.unwrap();
    let records = AsyncSpliterator::over_seekable(source, needle, SplitOptions::default())
        .collect_vecs()
        .await
        .unwrap();

    assert_eq!(records, expected);
}

#[tokio::test]
async fn small_reads_still_find_every_record() {
    let (file, content) = fixture(50);
    let needle = Needle::from_char('\n');

    let expected: Vec<Vec<u8>> = Spliterator::new(&content, needle.clone(), SplitOptions::default())
        .map(<[u8]>::to_vec)
        .collect();

    let source = FileSource::open(file.path()).await.unwrap();
    let records = AsyncSpliterator::over_seekable(
        source,
        needle,
        SplitOptions {
            high_water_mark: 16,
            ..Default::default()
        },
    )
    .collect_vecs()
    .await
    .unwrap();

    assert_eq!(records, expected);
}

#[tokio::test]
async fn planned_chunks_cover_the_file() {
    let (file, content) = fixture(500);
    let needle = Needle::from_char('\n');

    let mut source = FileSource::open(file.path()).await.unwrap();
    let plan = plan_chunks(&mut source, &needle, 4).await.unwrap();

    assert_eq!(plan.first().unwrap().start, 0);
    assert_eq!(plan.last().unwrap().end, content.len());
    for boundary in plan.windows(2) {
        // Interior boundaries sit immediately after a newline.
        assert_eq!(content[boundary[1].start - 1], b'\n');
        assert_eq!(boundary[0].end + 1, boundary[1].start);
    }
}

#[tokio::test]
async fn split_many_concatenates_to_the_whole_scan() {
    let (file, content) = fixture(300);
    let needle = Needle::from_char('\n');

    let expected: Vec<Vec<u8>> = Spliterator::new(&content, needle.clone(), SplitOptions::default())
        .map(<[u8]>::to_vec)
        .collect();

    let mut source = FileSource::open(file.path()).await.unwrap();
    let spliterators = split_many(&mut source, &needle, 4, &SplitOptions::default())
        .await
        .unwrap();
    assert!(spliterators.len() <= 4);

    // Drive the instances concurrently, then stitch in plan order.
    let handles: Vec<_> = spliterators
        .into_iter()
        .map(|s| tokio::spawn(s.collect_vecs()))
        .collect();
    let mut stitched = Vec::new();
    for handle in handles {
        stitched.extend(handle.await.unwrap().unwrap());
    }

    assert_eq!(stitched, expected);
}
