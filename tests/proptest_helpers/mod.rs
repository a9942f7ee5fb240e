#![allow(dead_code)]

use std::path::PathBuf;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A well-formed label: class id and four normalized values.
#[derive(Clone, Debug)]
pub struct ValidLine {
    pub class_id: u32,
    pub values: [f64; 4],
}

impl ValidLine {
    pub fn render(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.class_id, self.values[0], self.values[1], self.values[2], self.values[3]
        )
    }
}

pub fn arb_valid_line() -> impl Strategy<Value = ValidLine> {
    (0u32..200, prop::array::uniform4(0.0f64..=1.0)).prop_map(|(class_id, values)| ValidLine {
        class_id,
        values,
    })
}

/// Lines that can never parse: wrong field count or alphabetic class token.
pub fn arb_noise_line() -> BoxedStrategy<String> {
    prop_oneof![
        "[a-z]{1,8}( [a-z]{1,8}){0,7}",
        "[0-9]{1,3}( 0\\.[0-9]{1,3}){0,3}",
        "[0-9]{1,3}( 0\\.[0-9]{1,3}){5,6}",
        "-[1-9][0-9]{0,2}( 0\\.5){4}",
    ]
    .boxed()
}

/// Either a valid line (`Ok`) or noise (`Err`), to interleave in a file.
pub fn arb_mixed_lines(max: usize) -> impl Strategy<Value = Vec<Result<ValidLine, String>>> {
    prop::collection::vec(
        prop_oneof![
            arb_valid_line().prop_map(Ok::<ValidLine, String>),
            arb_noise_line().prop_map(Err::<ValidLine, String>),
        ],
        0..max,
    )
}

pub fn render_lines(lines: &[Result<ValidLine, String>]) -> String {
    lines
        .iter()
        .map(|line| match line {
            Ok(valid) => valid.render(),
            Err(noise) => noise.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Distinct image-like file names.
pub fn arb_file_names(max: usize) -> impl Strategy<Value = Vec<PathBuf>> {
    prop::collection::btree_set("[a-z]{1,10}\\.jpg", 0..max)
        .prop_map(|names| names.into_iter().map(PathBuf::from).collect())
}
