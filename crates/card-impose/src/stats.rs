//! Print-run statistics, for display before an export.

use crate::layout::PageGrid;
use crate::options::ImpositionOptions;
use crate::types::*;

/// Calculate statistics for a grouped print run.
///
/// Groups that cannot fit the page are counted rather than failing, so
/// the numbers can be shown before (or instead of) an export.
pub fn calculate_statistics(
    groups: &[Vec<CardPrintEntry>],
    options: &ImpositionOptions,
) -> ImpositionStatistics {
    let (page_w, page_h) = options.paper_size.dimensions_mm();

    let mut stats = ImpositionStatistics {
        cards: 0,
        sheets: 0,
        pages: 0,
        groups: 0,
        ungroupable_cards: 0,
    };

    for group in groups {
        let Some(first) = group.first() else {
            continue;
        };
        stats.cards += group.len();

        match PageGrid::compute(first.size, page_w, page_h, options.margin_mm) {
            Some(grid) => {
                let per_page = grid.items_per_page();
                let sheets = (group.len() + per_page - 1) / per_page;
                stats.sheets += sheets;
                stats.pages += sheets * 2;
                stats.groups += 1;
            }
            None => stats.ungroupable_cards += group.len(),
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(count: usize, size: PhysicalSize) -> Vec<CardPrintEntry> {
        vec![
            CardPrintEntry {
                front: 0,
                back: None,
                size,
            };
            count
        ]
    }

    #[test]
    fn ten_poker_cards_need_two_sheets() {
        let groups = vec![entries(10, PhysicalSize::new(63.0, 88.0))];
        let stats = calculate_statistics(&groups, &ImpositionOptions::default());

        assert_eq!(stats.cards, 10);
        assert_eq!(stats.sheets, 2);
        assert_eq!(stats.pages, 4);
        assert_eq!(stats.groups, 1);
        assert_eq!(stats.ungroupable_cards, 0);
    }

    #[test]
    fn oversized_group_is_counted_not_placed() {
        let groups = vec![
            entries(4, PhysicalSize::new(63.0, 88.0)),
            entries(3, PhysicalSize::new(250.0, 310.0)),
        ];
        let stats = calculate_statistics(&groups, &ImpositionOptions::default());

        assert_eq!(stats.cards, 7);
        assert_eq!(stats.groups, 1);
        assert_eq!(stats.sheets, 1);
        assert_eq!(stats.ungroupable_cards, 3);
    }
}
