//! Per-batch bookkeeping
//!
//! Counters live for one batch only; nothing here is persisted.

use std::collections::HashMap;

/// Seen-counts for derived names and image titles within one batch
#[derive(Debug, Default, Clone)]
pub struct BatchContext {
    names: HashMap<String, usize>,
    image_titles: HashMap<String, usize>,
}

impl BatchContext {
    /// Fresh context
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `name` and return it, suffixed `_<n>` from the second sighting on
    pub fn next_name(&mut self, name: &str) -> String {
        let count = bump(&mut self.names, name);
        if count > 1 {
            format!("{name}_{count}")
        } else {
            name.to_string()
        }
    }

    /// Count an image title and return it, suffixed ` <n>` from the second
    /// sighting on
    pub fn next_image_title(&mut self, title: &str) -> String {
        let count = bump(&mut self.image_titles, title);
        if count > 1 {
            format!("{title} {count}")
        } else {
            title.to_string()
        }
    }
}

fn bump(counts: &mut HashMap<String, usize>, key: &str) -> usize {
    let count = counts.entry(key.to_string()).or_insert(0);
    *count += 1;
    *count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_per_key() {
        let mut context = BatchContext::new();
        assert_eq!(context.next_name("t_A"), "t_A");
        assert_eq!(context.next_name("t_B"), "t_B");
        assert_eq!(context.next_name("t_A"), "t_A_2");
        assert_eq!(context.next_name("t_A"), "t_A_3");
        assert_eq!(context.next_image_title("Pump"), "Pump");
        assert_eq!(context.next_image_title("Pump"), "Pump 2");
    }

    #[test]
    fn new_context_starts_over() {
        let mut first = BatchContext::new();
        first.next_name("x");
        let mut second = BatchContext::new();
        assert_eq!(second.next_name("x"), "x");
    }
}
