use serde::{Deserialize, Serialize};

/// One fixed-width slice of the column axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub index: usize,
    /// First column of the section in the full column axis.
    pub start: usize,
    pub size: usize,
    /// Blank header cells that keep the section aligned with full ones.
    pub padding: usize,
}

impl Section {
    pub fn columns(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.size
    }
}

/// Split `total_columns` into pages of `page_size`; only the last page can
/// be short, and it reports its shortfall as padding.
pub fn paginate(total_columns: usize, page_size: usize) -> Vec<Section> {
    if page_size == 0 {
        return Vec::new();
    }
    let mut sections = Vec::with_capacity(total_columns.div_ceil(page_size));
    let mut start = 0;
    while start < total_columns {
        let size = page_size.min(total_columns - start);
        sections.push(Section {
            index: sections.len(),
            start,
            size,
            padding: page_size - size,
        });
        start += size;
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn twelve_columns_in_pages_of_five() {
        let sizes: Vec<usize> = paginate(12, 5).iter().map(|s| s.size).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
        let last = paginate(12, 5)[2];
        assert_eq!(last.padding, 3);
        assert_eq!(last.columns(), 10..12);
    }

    #[test]
    fn exact_multiple_has_no_padding() {
        let sections = paginate(10, 5);
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.padding == 0));
    }

    #[test]
    fn empty_inputs() {
        assert!(paginate(0, 5).is_empty());
        assert!(paginate(7, 0).is_empty());
    }

    proptest! {
        #[test]
        fn pages_cover_every_column(total in 0usize..500, page in 1usize..40) {
            let sections = paginate(total, page);
            prop_assert_eq!(sections.iter().map(|s| s.size).sum::<usize>(), total);
            prop_assert_eq!(sections.len(), total.div_ceil(page));
            if let Some((last, full)) = sections.split_last() {
                prop_assert!(full.iter().all(|s| s.size == page && s.padding == 0));
                prop_assert_eq!(last.padding, page - last.size);
            }
            for pair in sections.windows(2) {
                prop_assert_eq!(pair[0].start + pair[0].size, pair[1].start);
            }
        }
    }
}
