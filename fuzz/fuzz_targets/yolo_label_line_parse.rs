//! Fuzz target for YOLO label line parsing.
//!
//! Feeds arbitrary UTF-8 text to the line parser and the whole-file parser,
//! checking for panics or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use kwtools::labels::{fuzz_parse_label_line, parse_labels};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    fuzz_parse_label_line(text);
    let _ = parse_labels(text);
});
