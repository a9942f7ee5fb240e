//! Fuzz target for class mapping files.

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use kwtools::mapping::ClassMapping;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(mapping) = ClassMapping::from_json_str(json, Path::new("fuzz.json")) {
        let _ = mapping.to_yolo();
    }
});
