//! # Page Break Decisions
//!
//! The per-block verdict logic: given the capacity remaining on the current
//! page and the costs of a block's splittable parts, decide whether the
//! block fits, moves whole, or splits. Keeping this pure and separate from
//! the splitter's accumulation loop is what makes page breaks testable
//! arithmetic rather than emergent behavior.

/// The verdict for one block (or run of splittable parts) against the
/// remaining capacity of the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitDecision {
    /// Everything fits on the current page.
    Fits,
    /// Nothing fits (or the block is atomic): move whole to the next page.
    OverflowsWhole,
    /// A prefix fits; the rest continues on the next page.
    OverflowsPartial {
        /// How many parts (rows, items, sentences) stay on the current page.
        items_on_current_page: usize,
    },
}

/// Decide how a block with the given part costs breaks against `remaining`
/// capacity.
///
/// `min_usable` is the floor below which a split is not worth attempting:
/// when less than that much capacity remains, the whole block moves. Pass
/// `0.0` for parts that are cheap to continue (table rows, list items).
pub fn decide_split(
    remaining: f64,
    part_costs: &[f64],
    splittable: bool,
    min_usable: f64,
) -> SplitDecision {
    let total: f64 = part_costs.iter().sum();

    if total <= remaining {
        return SplitDecision::Fits;
    }

    if !splittable || remaining < min_usable {
        return SplitDecision::OverflowsWhole;
    }

    let mut running = 0.0;
    let mut fit_count = 0usize;
    for &cost in part_costs {
        if running + cost > remaining {
            break;
        }
        running += cost;
        fit_count += 1;
    }

    if fit_count == 0 {
        return SplitDecision::OverflowsWhole;
    }

    SplitDecision::OverflowsPartial {
        items_on_current_page: fit_count,
    }
}
