//! Property tests for name derivation

use dita_rename::{base_name, image_stem, BatchContext};
use proptest::prelude::*;

proptest! {
    #[test]
    fn base_names_are_clean_stems(title in "[A-Za-z0-9 _.,:;!?()/-]{0,40}") {
        if let Some(name) = base_name(&title) {
            prop_assert!(!name.is_empty());
            prop_assert!(!name.starts_with('_') && !name.ends_with('_'));
            prop_assert!(!name.contains("__"));
            prop_assert!(name.chars().all(|c| c == '_' || c.is_alphanumeric()));
        }
    }

    #[test]
    fn repeated_names_never_collide(name in "[a-z]{1,8}", count in 1usize..20) {
        let mut context = BatchContext::new();
        let names: Vec<_> = (0..count).map(|_| context.next_name(&name)).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), count);
        prop_assert_eq!(&names[0], &name);
    }

    #[test]
    fn image_stems_carry_the_marker(prefix in "[a-z]{1,6}", title in "[A-Za-z ]{0,20}") {
        let stem = image_stem(&prefix, &title);
        let marker = format!("img_{}_", prefix);
        prop_assert!(stem.starts_with(&marker));
        prop_assert!(stem.chars().all(|c| c == '_' || c.is_alphanumeric()));
    }
}
