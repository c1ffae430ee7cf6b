//! Distribution of dispatched sections into page columns.
//!
//! A static partition: each column is the master order filtered to one set
//! of section kinds. No attempt is made to balance column heights.

use crate::model::SectionKind;
use crate::sections::SectionBlock;
use crate::style::{HeaderPlacement, LayoutStyle};

/// Which set of kinds a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Primary,
    Secondary,
}

/// One column: its share of the content width and the sections it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub role: ColumnRole,
    /// Percentage of the content width, before the gap is subtracted.
    pub width_pct: f32,
    /// Indices into the plan's section list, in master order.
    pub sections: Vec<usize>,
}

/// Columns in left-to-right page order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    pub columns: Vec<Column>,
    /// Whether the header is drawn at the top of the primary column instead
    /// of across the full width.
    pub header_in_primary: bool,
    pub divider: bool,
}

impl ColumnPlan {
    /// Every section in one full-width column.
    pub fn single(section_count: usize) -> Self {
        Self {
            columns: vec![Column {
                role: ColumnRole::Primary,
                width_pct: 100.0,
                sections: (0..section_count).collect(),
            }],
            header_in_primary: false,
            divider: false,
        }
    }

    pub fn is_multi_column(&self) -> bool {
        self.columns.len() > 1
    }

    /// Section indices in master order, regardless of column.
    pub fn master_order(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self
            .columns
            .iter()
            .flat_map(|c| c.sections.iter().copied())
            .collect();
        all.sort_unstable();
        all
    }
}

/// Whether `kind` belongs in the secondary column.
///
/// Kinds in neither set, and kinds listed in both, stay primary.
fn is_secondary(kind: SectionKind, primary: &[SectionKind], secondary: &[SectionKind]) -> bool {
    secondary.contains(&kind) && !primary.contains(&kind)
}

/// Split an ordered list of kinds into primary and secondary, keeping order.
pub fn partition(
    order: &[SectionKind],
    primary: &[SectionKind],
    secondary: &[SectionKind],
) -> (Vec<SectionKind>, Vec<SectionKind>) {
    order
        .iter()
        .copied()
        .partition(|&kind| !is_secondary(kind, primary, secondary))
}

/// Assign dispatched sections to columns.
pub fn distribute(sections: &[SectionBlock], layout: &LayoutStyle) -> ColumnPlan {
    if layout.columns <= 1 {
        return ColumnPlan::single(sections.len());
    }

    let (primary, secondary): (Vec<usize>, Vec<usize>) = (0..sections.len()).partition(|&i| {
        !is_secondary(
            sections[i].kind,
            &layout.primary_sections,
            &layout.secondary_sections,
        )
    });

    let primary = Column {
        role: ColumnRole::Primary,
        width_pct: layout.primary_width_pct,
        sections: primary,
    };
    let secondary = Column {
        role: ColumnRole::Secondary,
        width_pct: 100.0 - layout.primary_width_pct,
        sections: secondary,
    };
    let columns = if layout.sidebar_left {
        vec![secondary, primary]
    } else {
        vec![primary, secondary]
    };

    ColumnPlan {
        columns,
        header_in_primary: layout.header_placement == HeaderPlacement::PrimaryColumn,
        divider: layout.column_divider,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Template;
    use pretty_assertions::assert_eq;

    use SectionKind::*;

    fn block(kind: SectionKind) -> SectionBlock {
        SectionBlock {
            kind,
            key: kind.identifier().to_string(),
            heading: None,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_partition_scenario() {
        let (primary, secondary) = partition(
            &[Summary, Education, Work, Skills],
            &[Summary, Work],
            &[Skills, Education],
        );
        assert_eq!(primary, vec![Summary, Work]);
        assert_eq!(secondary, vec![Education, Skills]);
    }

    #[test]
    fn test_unclassified_goes_primary() {
        let (primary, secondary) = partition(&[Awards, Skills], &[Work], &[Skills]);
        assert_eq!(primary, vec![Awards]);
        assert_eq!(secondary, vec![Skills]);
    }

    #[test]
    fn test_partition_preserves_order() {
        let order = SectionKind::CANONICAL;
        let layout = Template::Modern.defaults().layout;
        let (primary, secondary) =
            partition(&order, &layout.primary_sections, &layout.secondary_sections);
        for column in [&primary, &secondary] {
            let positions: Vec<_> = column
                .iter()
                .map(|k| order.iter().position(|o| o == k).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(primary.len() + secondary.len(), order.len());
    }

    #[test]
    fn test_single_column() {
        let sections = vec![block(Work), block(Skills)];
        let plan = distribute(&sections, &Template::Classic.defaults().layout);
        assert!(!plan.is_multi_column());
        assert_eq!(plan.columns[0].sections, vec![0, 1]);
    }

    #[test]
    fn test_two_columns_sidebar_right() {
        let sections = vec![block(Summary), block(Education), block(Work), block(Skills)];
        let plan = distribute(&sections, &Template::Modern.defaults().layout);
        assert_eq!(plan.columns.len(), 2);
        assert_eq!(plan.columns[0].role, ColumnRole::Primary);
        assert_eq!(plan.columns[0].sections, vec![0, 2]);
        assert_eq!(plan.columns[1].sections, vec![1, 3]);
        assert_eq!(plan.columns[0].width_pct + plan.columns[1].width_pct, 100.0);
        assert_eq!(plan.master_order(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_sidebar_left_puts_secondary_first() {
        let sections = vec![block(Work), block(Skills)];
        let plan = distribute(&sections, &Template::Sidebar.defaults().layout);
        assert_eq!(plan.columns[0].role, ColumnRole::Secondary);
        assert_eq!(plan.columns[0].sections, vec![1]);
        assert!(plan.header_in_primary);
    }
}
