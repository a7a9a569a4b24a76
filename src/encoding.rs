//! Constraint-encoding helpers: thin, stateless translators that only call
//! `new_variable`/`add_clause`/`solve` on a [`Solver`]. Grounded on
//! `examples/original_source/c++-src/SatTseitinEnc.cc`, `SatCountEnc.cc`,
//! `SatBvEnc.cc` and `SatOrderedSet.cc`.

use crate::cnf::Lit;
use crate::error::EncodingError;
use crate::solver::Solver;

/// `olit <-> AND(lits)`.
pub fn and_gate(solver: &mut Solver, olit: Lit, lits: &[Lit]) -> Result<(), EncodingError> {
    if lits.is_empty() {
        return Err(EncodingError::EmptyGateInput { gate: "AND" });
    }
    let mut clause = Vec::with_capacity(lits.len() + 1);
    for &ilit in lits {
        solver.add_clause(vec![ilit, !olit]);
        clause.push(!ilit);
    }
    clause.push(olit);
    solver.add_clause(clause);
    Ok(())
}

/// `olit <-> OR(lits)`.
pub fn or_gate(solver: &mut Solver, olit: Lit, lits: &[Lit]) -> Result<(), EncodingError> {
    if lits.is_empty() {
        return Err(EncodingError::EmptyGateInput { gate: "OR" });
    }
    let mut clause = Vec::with_capacity(lits.len() + 1);
    for &ilit in lits {
        solver.add_clause(vec![!ilit, olit]);
        clause.push(ilit);
    }
    clause.push(!olit);
    solver.add_clause(clause);
    Ok(())
}

/// `olit <-> XOR(lits)`, encoded over every parity-consistent assignment of
/// the inputs (exponential in `lits.len()`, as in the original).
pub fn xor_gate(solver: &mut Solver, olit: Lit, lits: &[Lit]) -> Result<(), EncodingError> {
    if lits.is_empty() {
        return Err(EncodingError::EmptyGateInput { gate: "XOR" });
    }
    let n = lits.len();
    let n_exp = 1usize << n;
    for p in 0..n_exp {
        let mut c = 0u32;
        let mut clause = Vec::with_capacity(n + 1);
        for (i, &ilit) in lits.iter().enumerate() {
            if p & (1 << i) != 0 {
                clause.push(!ilit);
                c += 1;
            } else {
                clause.push(ilit);
            }
        }
        clause.push(if c % 2 == 0 { !olit } else { olit });
        solver.add_clause(clause);
    }
    Ok(())
}

/// `olit <-> !ilit`.
pub fn not_gate(solver: &mut Solver, olit: Lit, ilit: Lit) {
    solver.add_clause(vec![!ilit, !olit]);
    solver.add_clause(vec![ilit, olit]);
}

/// Ripple-carry full adder: returns `(sum, carry_out)` literals such that
/// `sum <-> a xor b xor carry_in` and `carry_out <-> majority(a, b, carry_in)`.
pub fn full_adder(solver: &mut Solver, a: Lit, b: Lit, carry_in: Lit) -> (Lit, Lit) {
    let sum = solver.new_variable(false);
    let carry_out = solver.new_variable(false);
    xor_gate(solver, sum, &[a, b, carry_in]).expect("3 inputs is never empty");
    // carry_out <-> (a & b) | (a & carry_in) | (b & carry_in)
    let ab = solver.new_variable(false);
    let ac = solver.new_variable(false);
    let bc = solver.new_variable(false);
    and_gate(solver, ab, &[a, b]).unwrap();
    and_gate(solver, ac, &[a, carry_in]).unwrap();
    and_gate(solver, bc, &[b, carry_in]).unwrap();
    or_gate(solver, carry_out, &[ab, ac, bc]).unwrap();
    (sum, carry_out)
}

/// Ripple-carry adder over two equal-width bit-vectors (lsb-first),
/// returning the `n`-bit sum and the final carry-out.
pub fn adder(solver: &mut Solver, a: &[Lit], b: &[Lit]) -> Result<(Vec<Lit>, Lit), EncodingError> {
    if a.len() != b.len() {
        return Err(EncodingError::MismatchedWidth {
            lhs: a.len(),
            rhs: b.len(),
        });
    }
    let mut carry = solver.new_variable(false);
    solver.add_clause(vec![!carry]); // carry_in of bit 0 is false
    let mut sum = Vec::with_capacity(a.len());
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        let (s, c) = full_adder(solver, ai, bi, carry);
        sum.push(s);
        carry = c;
    }
    Ok((sum, carry))
}

/// Sequential-counter "at-most-k" encoding (linear in `n*k`): at most `k` of
/// `lits` may be true.
pub fn at_most_k(solver: &mut Solver, lits: &[Lit], k: usize) -> Result<(), EncodingError> {
    let n = lits.len();
    if k >= n {
        return Ok(());
    }
    if k == 0 {
        for &l in lits {
            solver.add_clause(vec![!l]);
        }
        return Ok(());
    }
    // register[i][j] = true iff at least j+1 of lits[0..=i] are true, for j in 0..k
    let mut register: Vec<Vec<Lit>> = Vec::with_capacity(n);
    for _ in 0..n {
        register.push((0..k).map(|_| solver.new_variable(false)).collect());
    }

    solver.add_clause(vec![!lits[0], register[0][0]]);
    for j in 1..k {
        solver.add_clause(vec![!register[0][j]]);
    }

    for i in 1..n {
        solver.add_clause(vec![!lits[i], register[i][0]]);
        solver.add_clause(vec![!register[i - 1][0], register[i][0]]);
        for j in 1..k {
            solver.add_clause(vec![!lits[i], !register[i - 1][j - 1], register[i][j]]);
            solver.add_clause(vec![!register[i - 1][j], register[i][j]]);
        }
        solver.add_clause(vec![!lits[i], !register[i - 1][k - 1]]);
    }
    Ok(())
}

/// At-least-k, expressed as at-most-`(n-k)` over the negated literals.
pub fn at_least_k(solver: &mut Solver, lits: &[Lit], k: usize) -> Result<(), EncodingError> {
    if k == 0 {
        return Ok(());
    }
    if k > lits.len() {
        return Err(EncodingError::KOutOfRange { k, n: lits.len() });
    }
    let negated: Vec<Lit> = lits.iter().map(|&l| !l).collect();
    at_most_k(solver, &negated, lits.len() - k)
}

/// `a < b` over two equal-width unsigned bit-vectors (lsb-first), returning
/// the literal asserting the comparison.
pub fn less_than(solver: &mut Solver, a: &[Lit], b: &[Lit]) -> Result<Lit, EncodingError> {
    if a.len() != b.len() {
        return Err(EncodingError::MismatchedWidth {
            lhs: a.len(),
            rhs: b.len(),
        });
    }
    // lt[i] <-> a[i..] < b[i..] treating higher index as more significant,
    // built from the most significant bit down via the standard recurrence
    // lt[msb] = (!a[msb] & b[msb])
    // lt[i]   = (!a[i] & b[i]) | ((a[i] == b[i]) & lt[i+1])
    let n = a.len();
    let mut lt = solver.new_variable(false);
    and_gate(solver, lt, &[!a[n - 1], b[n - 1]])?;
    for i in (0..n - 1).rev() {
        let eq = solver.new_variable(false);
        let a_iff_b_1 = solver.new_variable(false);
        let a_iff_b_2 = solver.new_variable(false);
        and_gate(solver, a_iff_b_1, &[a[i], b[i]])?;
        and_gate(solver, a_iff_b_2, &[!a[i], !b[i]])?;
        or_gate(solver, eq, &[a_iff_b_1, a_iff_b_2])?;

        let lt_here = solver.new_variable(false);
        and_gate(solver, lt_here, &[!a[i], b[i]])?;
        let eq_and_lower = solver.new_variable(false);
        and_gate(solver, eq_and_lower, &[eq, lt])?;

        let next_lt = solver.new_variable(false);
        or_gate(solver, next_lt, &[lt_here, eq_and_lower])?;
        lt = next_lt;
    }
    Ok(lt)
}

pub fn less_or_equal(solver: &mut Solver, a: &[Lit], b: &[Lit]) -> Result<Lit, EncodingError> {
    let gt = less_than(solver, b, a)?;
    let le = solver.new_variable(false);
    not_gate(solver, le, gt);
    Ok(le)
}

/// Odd-even sorting network: returns `ys`, sorted descending (true-first),
/// a permutation of `xs` enforced by Tseitin comparator gates.
pub fn sort_literals(solver: &mut Solver, xs: &[Lit]) -> Vec<Lit> {
    if xs.len() <= 1 {
        return xs.to_vec();
    }
    let mid = xs.len() / 2;
    let lower = sort_literals(solver, &xs[..mid]);
    let upper = sort_literals(solver, &xs[mid..]);
    odd_even_merge(solver, &lower, &upper)
}

fn odd_even_merge(solver: &mut Solver, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut i = 0;
    let mut j = 0;
    // Pairwise comparator merge: descending order, so the larger (true)
    // literal of each pair comes first.
    while i < a.len() && j < b.len() {
        let (hi, lo) = comparator(solver, a[i], b[j]);
        merged.push(hi);
        merged.push(lo);
        i += 1;
        j += 1;
    }
    merged.extend_from_slice(&a[i..]);
    merged.extend_from_slice(&b[j..]);
    merged
}

/// Returns `(max(x, y), min(x, y))` as fresh literals, Tseitin-encoded.
fn comparator(solver: &mut Solver, x: Lit, y: Lit) -> (Lit, Lit) {
    let hi = solver.new_variable(false);
    let lo = solver.new_variable(false);
    or_gate(solver, hi, &[x, y]).unwrap();
    and_gate(solver, lo, &[x, y]).unwrap();
    (hi, lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Solution;

    #[test]
    fn and_gate_is_unsat_when_output_forced_true_and_one_input_false() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        let o = s.new_variable(true);
        and_gate(&mut s, o, &[a, b]).unwrap();
        s.add_clause(vec![o]);
        s.add_clause(vec![!a]);
        match s.solve(vec![], std::time::Duration::ZERO) {
            Solution::Unsat => {}
            other => panic!("expected Unsat, got {other:?}"),
        }
    }

    #[test]
    fn or_gate_forces_an_input_true_when_output_true() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        let o = s.new_variable(true);
        or_gate(&mut s, o, &[a, b]).unwrap();
        s.add_clause(vec![o]);
        s.add_clause(vec![!a]);
        match s.solve(vec![], std::time::Duration::ZERO) {
            Solution::Sat(_) => assert_eq!(s.read_model(b), Some(true)),
            other => panic!("expected Sat, got {other:?}"),
        }
    }

    #[test]
    fn at_most_one_rejects_two_true_literals() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        at_most_k(&mut s, &[a, b], 1).unwrap();
        s.add_clause(vec![a]);
        s.add_clause(vec![b]);
        match s.solve(vec![], std::time::Duration::ZERO) {
            Solution::Unsat => {}
            other => panic!("expected Unsat, got {other:?}"),
        }
    }

    #[test]
    fn at_most_k_allows_exactly_k_true() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        let c = s.new_variable(true);
        at_most_k(&mut s, &[a, b, c], 2).unwrap();
        s.add_clause(vec![a]);
        s.add_clause(vec![b]);
        s.add_clause(vec![c]);
        match s.solve(vec![], std::time::Duration::ZERO) {
            Solution::Unsat => {}
            other => panic!("expected Unsat (3 > 2), got {other:?}"),
        }
    }

    #[test]
    fn empty_gate_input_is_an_error() {
        let mut s = Solver::with_default_config();
        let o = s.new_variable(true);
        assert!(and_gate(&mut s, o, &[]).is_err());
    }

    #[test]
    fn at_least_k_rejects_fewer_than_k_true() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        let c = s.new_variable(true);
        at_least_k(&mut s, &[a, b, c], 2).unwrap();
        s.add_clause(vec![a]);
        s.add_clause(vec![!b]);
        s.add_clause(vec![!c]);
        match s.solve(vec![], std::time::Duration::ZERO) {
            Solution::Unsat => {}
            other => panic!("expected Unsat (1 < 2), got {other:?}"),
        }
    }

    #[test]
    fn at_most_k_and_at_least_k_together_force_exactly_k() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        let c = s.new_variable(true);
        let lits = [a, b, c];
        at_most_k(&mut s, &lits, 2).unwrap();
        at_least_k(&mut s, &lits, 2).unwrap();
        match s.solve(vec![], std::time::Duration::ZERO) {
            Solution::Sat(_) => {
                let true_count = lits
                    .iter()
                    .filter(|&&l| s.read_model(l) == Some(true))
                    .count();
                assert_eq!(true_count, 2);
            }
            other => panic!("expected Sat, got {other:?}"),
        }
    }
}
