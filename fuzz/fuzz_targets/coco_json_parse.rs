//! Fuzz target for COCO JSON parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use kwtools::coco::{from_coco_slice, to_coco_string};

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for annotation files.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(doc) = from_coco_slice(data) {
        let _ = to_coco_string(&doc);
    }
});
