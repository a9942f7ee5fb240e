use std::collections::BTreeMap;

use kwtools::labels::{parse_labels, ClassId, LabelOutcome};
use kwtools::rewrite::{rewrite_label_text, RewriteMode};
use proptest::prelude::*;

mod proptest_helpers;

use proptest_helpers::{arb_mixed_lines, arb_valid_line, render_lines};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn object_count_ignores_surrounding_noise(lines in arb_mixed_lines(40)) {
        let text = render_lines(&lines);
        let parsed = parse_labels(&text);

        let expected: Vec<u32> = lines
            .iter()
            .filter_map(|line| line.as_ref().ok())
            .map(|valid| valid.class_id)
            .collect();
        let got: Vec<u32> = parsed.records().iter().map(|r| r.class_id.as_u32()).collect();

        prop_assert_eq!(got, expected);
        prop_assert_eq!(
            parsed.issues.len(),
            lines.iter().filter(|line| line.is_err()).count()
        );
    }

    #[test]
    fn outcome_classes_are_disjoint(lines in arb_mixed_lines(20)) {
        let text = render_lines(&lines);
        let parsed = parse_labels(&text);
        let valid = lines.iter().filter(|line| line.is_ok()).count();

        match parsed.outcome {
            LabelOutcome::Empty => prop_assert!(lines.is_empty()),
            LabelOutcome::NoValidObjects => {
                prop_assert!(!lines.is_empty());
                prop_assert_eq!(valid, 0);
            }
            LabelOutcome::Parsed(records) => prop_assert_eq!(records.len(), valid),
        }
    }

    #[test]
    fn parsed_values_match_written_values(line in arb_valid_line()) {
        let parsed = parse_labels(&line.render());
        let record = parsed.records()[0];
        prop_assert_eq!(record.class_id.as_u32(), line.class_id);
        prop_assert_eq!([record.x, record.y, record.width, record.height], line.values);
    }

    #[test]
    fn stripping_confidence_is_idempotent(
        lines in prop::collection::vec((arb_valid_line(), prop::option::of(0.0f64..=1.0)), 0..30)
    ) {
        let text: String = lines
            .iter()
            .map(|(line, conf)| match conf {
                Some(conf) => format!("{} {}\n", line.render(), conf),
                None => format!("{}\n", line.render()),
            })
            .collect();

        let first = rewrite_label_text(&text, &RewriteMode::StripConfidence);
        let second = rewrite_label_text(&first.to_text(), &RewriteMode::StripConfidence);

        prop_assert!(!second.modified);
        prop_assert_eq!(&second.lines, &first.lines);
        prop_assert_eq!(first.lines.len(), lines.len());
    }

    #[test]
    fn remap_leaves_unmapped_lines_untouched(lines in prop::collection::vec(arb_valid_line(), 1..30)) {
        let map = BTreeMap::from([(ClassId::new(0), ClassId::new(500))]);
        let text = lines.iter().map(|l| l.render()).collect::<Vec<_>>().join("\n");
        let out = rewrite_label_text(&text, &RewriteMode::RemapClasses(map));

        prop_assert_eq!(out.lines.len(), lines.len());
        for (input, output) in lines.iter().zip(&out.lines) {
            if input.class_id == 0 {
                prop_assert!(output.starts_with("500 "));
                prop_assert_eq!(&output[4..], &input.render()[2..]);
            } else {
                prop_assert_eq!(output, &input.render());
            }
        }
    }
}
