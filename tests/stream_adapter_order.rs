// tests/stream_adapter_order.rs

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use seqexec::stream::StreamAdapter;

/// Write `chunks` into a fresh adapter, some before and some after `start`,
/// then stop it and return everything the callback received.
fn pump(chunks: &[Vec<u8>], written_before_start: usize) -> Vec<u8> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .unwrap();

    rt.block_on(async {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut adapter =
            StreamAdapter::new(move |chunk: &[u8]| sink.lock().unwrap().extend_from_slice(chunk));

        let writer = adapter.writer();
        let split = written_before_start.min(chunks.len());
        for chunk in &chunks[..split] {
            writer.write_chunk(chunk).unwrap();
        }
        adapter.start().unwrap();
        for chunk in &chunks[split..] {
            writer.write_chunk(chunk).unwrap();
        }
        drop(writer);
        adapter.stop().await;

        let out = seen.lock().unwrap().clone();
        out
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn callback_sees_exact_concatenation_of_writes(
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 0..40),
        written_before_start in 0usize..40,
    ) {
        let expected: Vec<u8> = chunks.concat();
        let received = pump(&chunks, written_before_start);
        prop_assert_eq!(received, expected);
    }
}

#[test]
fn single_byte_writes_round_trip() {
    let chunks: Vec<Vec<u8>> = b"hello world".iter().map(|b| vec![*b]).collect();
    assert_eq!(pump(&chunks, chunks.len()), b"hello world");
}
