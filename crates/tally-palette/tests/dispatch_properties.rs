//! Properties of signal dispatch with reconciliation

use proptest::prelude::*;
use tally_palette::prelude::*;
use tally_test_utils::{entry, log, screen};

const ELEMENTS: [&str; 8] = [
    "document",
    "list",
    "row-42",
    "row-42-label",
    "row-7",
    "sidebar",
    "palette",
    "palette-input",
];

fn signal_strategy() -> impl Strategy<Value = (usize, bool)> {
    (0..ELEMENTS.len(), any::<bool>())
}

proptest! {
    #[test]
    fn prop_context_stays_backed_by_triggers(
        signals in prop::collection::vec(signal_strategy(), 0..16),
        with_palette_root in any::<bool>(),
    ) {
        let palette = Palette::default();
        let tree = screen();
        if with_palette_root {
            palette.set_palette_root(Some(tree.id("palette")));
        }

        let _a = palette.mount_trigger(Trigger::element(entry("42"), tree.id("row-42")));
        let _b = palette.mount_trigger(Trigger::element(entry("7"), tree.id("row-7")));
        let _c = palette.auto_trigger(log(), true);

        for (index, pointer) in signals {
            let target = tree.id(ELEMENTS[index]);
            let signal = if pointer { InputSignal::pointer(target) } else { InputSignal::focus(target) };
            palette.dispatch(signal, &tree);

            prop_assert!(palette.is_in_context(&log()));
            for subject in palette.context_state() {
                prop_assert!(palette.triggers().has_subject(&subject));
            }
        }
    }

    #[test]
    fn prop_clicking_a_row_puts_only_that_row_in_context(
        warmup in prop::collection::vec(0..ELEMENTS.len(), 0..8),
        pick_42 in any::<bool>(),
    ) {
        let palette = Palette::default();
        let tree = screen();
        let _a = palette.mount_trigger(Trigger::element(entry("42"), tree.id("row-42")));
        let _b = palette.mount_trigger(Trigger::element(entry("7"), tree.id("row-7")));

        for index in warmup {
            palette.dispatch(InputSignal::pointer(tree.id(ELEMENTS[index])), &tree);
        }

        let (row, subject) = if pick_42 { ("row-42", entry("42")) } else { ("row-7", entry("7")) };
        palette.dispatch(InputSignal::pointer(tree.id(row)), &tree);
        prop_assert_eq!(palette.context_state(), vec![subject]);
    }
}
