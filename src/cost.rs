//! Split-cost engine: the four pluggable cost models of §4.4.
//!
//! Each model scores a candidate split given the parent node's per-axis surface-area
//! decomposition (`end_area`, `area`, and the two children's surface areas) and the accumulated
//! per-side traversal cost (`cost_left`, `cost_right`, summing to `node_total_cost`). The two
//! double-recurse models additionally thread a running `exponent_to_beat` through the whole build
//! (§8 Cost monotonicity: every accepted split strictly lowers it).

use crate::core::types::Number;
use crate::double_recurse;

const END_AREA_RATIO_EPSILON: Number = 1.0e-14;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CostModel {
    MacdonaldBooth,
    MacdonaldBoothModifiedCoefs,
    DoubleRecurseGs,
    DoubleRecurseModifiedCoefs,
}

impl Default for CostModel {
    fn default() -> Self { CostModel::MacdonaldBooth }
}

/// The geometric inputs to a single split-cost evaluation, shared by all four models.
#[derive(Copy, Clone, Debug)]
pub struct SplitGeometry {
    pub end_area: Number,
    pub area: Number,
    pub sa_left: Number,
    pub sa_right: Number,
}

/// Evaluates one candidate split under `model`.
///
/// `mod_fade` is `CF_TotalNodeObjectCosts / TotalObjectCosts` (§4.4, §9): 1.0 at the root, shrinking
/// toward 0 in small deep subtrees. `exponent_to_beat` is only read/updated by the two
/// double-recurse models; `None` is returned for those models when the candidate cannot beat the
/// current `exponent_to_beat` (§4.1 bounded solve) — such a candidate is rejected outright, not
/// merely scored worse, since the double-recurse models compare on exponent rather than on a
/// commensurable scalar cost across the whole build.
pub fn evaluate_split(
    model: CostModel,
    geometry: SplitGeometry,
    node_total_cost: Number,
    cost_left: Number,
    cost_right: Number,
    mod_fade: Number,
    exponent_to_beat: &mut Number,
) -> Option<Number> {
    match model {
        CostModel::MacdonaldBooth => Some(macdonald_booth(geometry, cost_left, cost_right)),
        CostModel::MacdonaldBoothModifiedCoefs => {
            Some(macdonald_booth_modified_coefs(geometry, cost_left, cost_right, mod_fade))
        }
        CostModel::DoubleRecurseGs => double_recurse_gs(geometry, node_total_cost, cost_left, cost_right, exponent_to_beat),
        CostModel::DoubleRecurseModifiedCoefs => {
            double_recurse_modified_coefs(geometry, node_total_cost, cost_left, cost_right, mod_fade, exponent_to_beat)
        }
    }
}

fn macdonald_booth(g: SplitGeometry, cost_left: Number, cost_right: Number) -> Number {
    1.0 + (g.sa_left * cost_left + g.sa_right * cost_right) / g.area
}

fn modified_coefs_term(g: SplitGeometry, cost_left: Number, cost_right: Number) -> Number {
    let f_l = cost_left / (cost_left + cost_right);
    let f_r = 1.0 - f_l;
    (f_l + f_r * g.end_area / g.sa_right) * cost_left + (f_r + f_l * g.end_area / g.sa_left) * cost_right
}

fn macdonald_booth_modified_coefs(g: SplitGeometry, cost_left: Number, cost_right: Number, mod_fade: Number) -> Number {
    let sah_term = (g.sa_left * cost_left + g.sa_right * cost_right) / g.area;
    let mod_term = modified_coefs_term(g, cost_left, cost_right);
    1.0 + (1.0 - mod_fade) * sah_term + mod_fade * mod_term
}

/// `A, B` (area fractions) and `α, β` (cost fractions) feeding the double-recurse solver, plus the
/// degenerate-case handling that bypasses the solver entirely (§4.4).
fn double_recurse_gs(
    g: SplitGeometry,
    node_total_cost: Number,
    cost_left: Number,
    cost_right: Number,
    exponent_to_beat: &mut Number,
) -> Option<Number> {
    let (a, b) = (g.sa_left / g.area, g.sa_right / g.area);
    double_recurse_cost(a, b, g, node_total_cost, cost_left, cost_right, exponent_to_beat)
}

fn double_recurse_modified_coefs(
    g: SplitGeometry,
    node_total_cost: Number,
    cost_left: Number,
    cost_right: Number,
    mod_fade: Number,
    exponent_to_beat: &mut Number,
) -> Option<Number> {
    let (a, b) = (g.sa_left / g.area, g.sa_right / g.area);
    let f_l = cost_left / (cost_left + cost_right);
    let f_r = 1.0 - f_l;
    let a_mod = f_l + f_r * g.end_area / g.sa_right;
    let b_mod = f_r + f_l * g.end_area / g.sa_left;
    let a_blend = (1.0 - mod_fade) * a + mod_fade * a_mod;
    let b_blend = (1.0 - mod_fade) * b + mod_fade * b_mod;
    double_recurse_cost(a_blend, b_blend, g, node_total_cost, cost_left, cost_right, exponent_to_beat)
}

fn double_recurse_cost(
    a: Number,
    b: Number,
    g: SplitGeometry,
    node_total_cost: Number,
    cost_left: Number,
    cost_right: Number,
    exponent_to_beat: &mut Number,
) -> Option<Number> {
    if cost_left == 0.0 || cost_right == 0.0 {
        let other_frac = if cost_left == 0.0 { b } else { a };
        if other_frac < 1.0 {
            return Some(1.0 / (1.0 - other_frac));
        }
    }

    let alpha = cost_left / node_total_cost;
    let beta = cost_right / node_total_cost;

    if g.end_area / g.area < END_AREA_RATIO_EPSILON {
        let denom = a * alpha.ln() + b * beta.ln();
        return Some(1.0 - node_total_cost.ln() / denom);
    }

    let solution = double_recurse::solve_bounded(a, b, alpha, beta, *exponent_to_beat)?;
    *exponent_to_beat = solution.exponent;
    Some(solution.c * node_total_cost.powf(solution.exponent) + solution.d)
}
