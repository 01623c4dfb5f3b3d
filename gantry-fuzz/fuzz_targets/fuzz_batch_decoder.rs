#![no_main]

use futures::executor::block_on;
use futures::io::Cursor;
use gantry_core::decode::{read_batch, read_single, BatchFormat, SizeLimits};
use gantry_core::pool::BufferPool;
use libfuzzer_sys::fuzz_target;

const LIMITS: SizeLimits = SizeLimits::new(256, 4096);

fuzz_target!(|data: &[u8]| {
    let pool = BufferPool::new(4, 64 * 1024);

    for format in [BatchFormat::Text, BatchFormat::Binary] {
        if let Ok(batch) = block_on(read_batch(format, &mut Cursor::new(data), &LIMITS, &pool)) {
            let mut total = 0;
            for msg in &batch {
                assert!(!msg.is_empty());
                assert!(msg.len() <= LIMITS.max_msg_size);
                total += msg.len();
            }
            assert!(total <= LIMITS.max_body_size);
        }
        assert_eq!(pool.outstanding(), 0);
    }

    if let Ok(msg) = block_on(read_single(&mut Cursor::new(data), None, &LIMITS, &pool)) {
        assert_eq!(msg.body().as_ref(), data);
    }
    assert_eq!(pool.outstanding(), 0);
});
