use tracing::{debug, trace};

use crate::geometry::{
    FEASIBILITY_EPSILON, axis_intercepts, dedup_points, intersection, is_feasible,
    order_around_centroid,
};
use crate::problem::{Constraint, LpProblem, Objective, Point, Relation};
use crate::solution::{Analysis, ConstraintSlack, Evaluation, Solution, SolutionStatus};

/// How to choose among vertices that share the optimal objective value
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Keep the first vertex in output order; later vertices must be strictly better
    #[default]
    FirstEncountered,
    /// Among vertices within tolerance of the optimum, prefer the smallest `(x, y)`
    Lexicographic,
}

/// Graphical-method solver for two-variable linear programs.
///
/// Stateless: every call to [`Solver::solve`] depends only on its input.
#[derive(Debug, Clone)]
pub struct Solver {
    /// Sort feasible vertices around their centroid before evaluating
    order_polygon: bool,
    /// Offer the origin as a candidate vertex
    include_origin: bool,
    /// Merge near-identical vertices
    deduplicate: bool,
    tie_break: TieBreak,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            order_polygon: true,
            include_origin: true,
            deduplicate: true,
            tie_break: TieBreak::FirstEncountered,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_polygon_ordering(mut self, enabled: bool) -> Self {
        self.order_polygon = enabled;
        self
    }

    pub fn with_origin_candidate(mut self, enabled: bool) -> Self {
        self.include_origin = enabled;
        self
    }

    pub fn with_deduplication(mut self, enabled: bool) -> Self {
        self.deduplicate = enabled;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Solve the problem by enumerating and evaluating feasible vertices
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        let constraints = problem.full_constraints();

        let candidates = self.candidates(&constraints);
        let found = candidates.len();
        let mut points = if self.deduplicate {
            dedup_points(&candidates)
        } else {
            candidates
        };
        if self.order_polygon {
            order_around_centroid(&mut points);
        }

        let evaluations: Vec<Evaluation> = points
            .iter()
            .map(|p| Evaluation {
                point: *p,
                z: problem.objective.evaluate(p),
            })
            .collect();

        debug!(
            constraints = constraints.len(),
            feasible = found,
            vertices = evaluations.len(),
            "enumerated candidate vertices"
        );

        let Some(best) = self.select_best(&problem.objective, &evaluations) else {
            debug!("no feasible vertex");
            return Solution {
                evaluations,
                feasible_polygon: points,
                ..Solution::infeasible()
            };
        };

        debug!(x = best.point.x, y = best.point.y, z = best.z, "optimum");
        let analysis = self.analyze(&constraints, &evaluations, &best);

        Solution {
            status: SolutionStatus::Optimal,
            evaluations,
            best_point: Some(best.point),
            best_value: Some(best.z),
            feasible_polygon: points,
            analysis,
        }
    }

    /// Feasible candidates in enumeration order: pairwise intersections,
    /// then axis intercepts, then the origin
    fn candidates(&self, constraints: &[Constraint]) -> Vec<Point> {
        let mut points = Vec::new();
        let mut keep = |p: Point, source: &str| {
            let feasible = is_feasible(&p, constraints);
            trace!(x = p.x, y = p.y, source, feasible, "candidate");
            if feasible {
                points.push(p);
            }
        };

        for (i, a) in constraints.iter().enumerate() {
            for b in &constraints[i + 1..] {
                if let Some(p) = intersection(a, b) {
                    keep(p, "intersection");
                }
            }
        }

        for c in constraints {
            for p in axis_intercepts(c) {
                keep(p, "intercept");
            }
        }

        if self.include_origin {
            keep(Point::ORIGIN, "origin");
        }

        points
    }

    fn select_best(&self, objective: &Objective, evaluations: &[Evaluation]) -> Option<Evaluation> {
        let mut best: Option<Evaluation> = None;
        let mut best_value = objective.worst_value();
        for e in evaluations {
            if objective.improves(e.z, best_value) {
                best_value = e.z;
                best = Some(*e);
            }
        }

        match self.tie_break {
            TieBreak::FirstEncountered => best,
            TieBreak::Lexicographic => {
                let best = best?;
                evaluations
                    .iter()
                    .filter(|e| (e.z - best.z).abs() < FEASIBILITY_EPSILON)
                    .min_by(|a, b| {
                        a.point
                            .x
                            .total_cmp(&b.point.x)
                            .then(a.point.y.total_cmp(&b.point.y))
                    })
                    .copied()
            }
        }
    }

    fn analyze(
        &self,
        constraints: &[Constraint],
        evaluations: &[Evaluation],
        best: &Evaluation,
    ) -> Analysis {
        let p = best.point;

        let slacks: Vec<ConstraintSlack> = constraints
            .iter()
            .map(|c| {
                let lhs = c.lhs(&p);
                let slack = match c.relation {
                    Relation::Le => c.rhs - lhs,
                    Relation::Ge => lhs - c.rhs,
                    Relation::Eq => (lhs - c.rhs).abs(),
                    Relation::Unrecognized => f64::NAN,
                };
                ConstraintSlack {
                    constraint: c.name.clone(),
                    lhs,
                    rhs: c.rhs,
                    slack,
                }
            })
            .collect();

        let binding_constraints = slacks
            .iter()
            .filter(|s| (s.lhs - s.rhs).abs() < FEASIBILITY_EPSILON)
            .map(|s| s.constraint.clone())
            .collect();

        let alternative_optima = evaluations
            .iter()
            .filter(|e| e.point != p && (e.z - best.z).abs() < FEASIBILITY_EPSILON)
            .map(|e| e.point)
            .collect();

        Analysis {
            binding_constraints,
            slacks,
            alternative_optima,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DEDUP_EPSILON;
    use crate::problem::Direction;

    fn problem(c1: f64, c2: f64, direction: Direction) -> LpProblem {
        LpProblem::new(Objective::new(c1, c2, direction))
    }

    fn points(solution: &Solution) -> Vec<(f64, f64)> {
        solution
            .evaluations
            .iter()
            .map(|e| (e.point.x, e.point.y))
            .collect()
    }

    fn assert_point(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
            "got {} (expected ({}, {}))",
            p,
            x,
            y
        );
    }

    #[test]
    fn test_two_constraint_maximization_tie() {
        // Maximize: x1 + x2
        // Subject to:
        //   x1 + x2 <= 4
        //   x1 <= 3
        // (3,1) and (0,4) tie at Z=4; (3,1) comes first after ordering
        let mut p = problem(1.0, 1.0, Direction::Maximize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Le, 4.0);
        p.add_constraint("x1_max", 1.0, 0.0, Relation::Le, 3.0);

        let solution = Solver::new().solve(&p);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(
            points(&solution),
            vec![(0.0, 0.0), (3.0, 0.0), (3.0, 1.0), (0.0, 4.0)]
        );
        assert_point(solution.best_point.unwrap(), 3.0, 1.0);
        assert!((solution.best_value.unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(solution.feasible_polygon.len(), 4);
        assert_eq!(solution.analysis.alternative_optima.len(), 1);
        assert_point(solution.analysis.alternative_optima[0], 0.0, 4.0);
        assert_eq!(solution.analysis.binding_constraints, vec!["sum", "x1_max"]);
    }

    #[test]
    fn test_lexicographic_tie_break() {
        let mut p = problem(1.0, 1.0, Direction::Maximize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Le, 4.0);
        p.add_constraint("x1_max", 1.0, 0.0, Relation::Le, 3.0);

        let solution = Solver::new()
            .with_tie_break(TieBreak::Lexicographic)
            .solve(&p);

        assert_point(solution.best_point.unwrap(), 0.0, 4.0);
        assert!((solution.best_value.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: x1 + x2
        // Subject to:
        //   x1 + x2 >= 2
        // Two vertices, left unordered; (0,2) is enumerated first
        let mut p = problem(1.0, 1.0, Direction::Minimize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Ge, 2.0);

        let solution = Solver::new().solve(&p);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.evaluations.len(), 2);
        assert_point(solution.evaluations[0].point, 0.0, 2.0);
        assert_point(solution.evaluations[1].point, 2.0, 0.0);
        assert_point(solution.best_point.unwrap(), 0.0, 2.0);
        assert!((solution.best_value.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_constraints_unbounded_in_y() {
        // x1 <= 5 and x1 <= 3 never intersect; only finite vertices are reported
        let mut p = problem(1.0, 0.0, Direction::Maximize);
        p.add_constraint("wide", 1.0, 0.0, Relation::Le, 5.0);
        p.add_constraint("narrow", 1.0, 0.0, Relation::Le, 3.0);

        let solution = Solver::new().solve(&p);
        let all = p.full_constraints();

        assert_eq!(points(&solution), vec![(3.0, 0.0), (0.0, 0.0)]);
        for e in &solution.evaluations {
            assert!(is_feasible(&e.point, &all));
        }
        assert_point(solution.best_point.unwrap(), 3.0, 0.0);
    }

    #[test]
    fn test_infeasible() {
        // x1 >= 5
        // x1 <= 2
        let mut p = problem(1.0, 1.0, Direction::Maximize);
        p.add_constraint("lower", 1.0, 0.0, Relation::Ge, 5.0);
        p.add_constraint("upper", 1.0, 0.0, Relation::Le, 2.0);

        let solution = Solver::new().solve(&p);

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.evaluations.is_empty());
        assert!(solution.best_point.is_none());
        assert!(solution.best_value.is_none());
        assert!(!solution.is_feasible());
        assert_eq!(solution.analysis, Analysis::empty());
    }

    #[test]
    fn test_unrecognized_relation_makes_everything_infeasible() {
        let mut p = problem(1.0, 1.0, Direction::Maximize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Le, 4.0);
        p.add_constraint("bad", 1.0, 0.0, Relation::Unrecognized, 1.0);

        let solution = Solver::new().solve(&p);
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_equality_constraint() {
        // Maximize: 2x1 + x2
        // Subject to:
        //   x1 + x2 = 3
        //   x1 <= 2
        // Optimal on the segment end: x1=2, x2=1, obj=5
        let mut p = problem(2.0, 1.0, Direction::Maximize);
        p.add_constraint("total", 1.0, 1.0, Relation::Eq, 3.0);
        p.add_constraint("cap", 1.0, 0.0, Relation::Le, 2.0);

        let solution = Solver::new().solve(&p);

        assert_point(solution.best_point.unwrap(), 2.0, 1.0);
        assert!((solution.best_value.unwrap() - 5.0).abs() < 1e-9);
        for e in &solution.evaluations {
            assert!((e.point.x + e.point.y - 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_unordered_variant_keeps_enumeration_order() {
        let mut p = problem(1.0, 1.0, Direction::Maximize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Le, 4.0);
        p.add_constraint("x1_max", 1.0, 0.0, Relation::Le, 3.0);

        let solution = Solver::new().with_polygon_ordering(false).solve(&p);

        // pairwise intersections first, origin from the last pair
        assert_eq!(
            points(&solution),
            vec![(3.0, 1.0), (0.0, 4.0), (3.0, 0.0), (0.0, 0.0)]
        );
        assert_point(solution.best_point.unwrap(), 3.0, 1.0);
    }

    #[test]
    fn test_without_deduplication_repeats_vertices() {
        let mut p = problem(1.0, 1.0, Direction::Maximize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Le, 4.0);

        let raw = Solver::new()
            .with_deduplication(false)
            .with_polygon_ordering(false)
            .solve(&p);
        let deduped = Solver::new().with_polygon_ordering(false).solve(&p);

        assert!(raw.evaluations.len() > deduped.evaluations.len());
        for (i, a) in deduped.evaluations.iter().enumerate() {
            for b in &deduped.evaluations[i + 1..] {
                assert!(
                    (a.point.x - b.point.x).abs() >= DEDUP_EPSILON
                        || (a.point.y - b.point.y).abs() >= DEDUP_EPSILON
                );
            }
        }
    }

    #[test]
    fn test_origin_candidate_toggle() {
        // only constraint through the origin is non-negativity; without the origin
        // candidate it is still found as the x1>=0 / x2>=0 intersection
        let mut p = problem(-1.0, -1.0, Direction::Maximize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Le, 4.0);

        let with = Solver::new().solve(&p);
        let without = Solver::new().with_origin_candidate(false).solve(&p);

        assert_eq!(with.evaluations.len(), without.evaluations.len());
        assert_point(without.best_point.unwrap(), 0.0, 0.0);
    }

    #[test]
    fn test_slacks_at_optimum() {
        // Maximize: 3x1 + 2x2
        // Subject to:
        //   x1 + x2 <= 4
        //   x1 <= 3
        //   x2 <= 3
        // Optimal: x1=3, x2=1, obj=11
        let mut p = problem(3.0, 2.0, Direction::Maximize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Le, 4.0);
        p.add_constraint("x_max", 1.0, 0.0, Relation::Le, 3.0);
        p.add_constraint("y_max", 0.0, 1.0, Relation::Le, 3.0);

        let solution = Solver::new().solve(&p);

        assert_point(solution.best_point.unwrap(), 3.0, 1.0);
        assert!((solution.best_value.unwrap() - 11.0).abs() < 1e-9);

        let slacks = &solution.analysis.slacks;
        assert_eq!(slacks.len(), 5);
        assert_eq!(slacks[2].constraint, "y_max");
        assert!((slacks[2].slack - 2.0).abs() < 1e-9);
        assert!(solution.analysis.alternative_optima.is_empty());
    }

    #[test]
    fn test_solver_is_stateless() {
        let mut p = problem(1.0, 2.0, Direction::Minimize);
        p.add_constraint("sum", 1.0, 1.0, Relation::Ge, 2.0);
        let solver = Solver::new();
        assert_eq!(solver.solve(&p), solver.solve(&p));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn constraint() -> impl Strategy<Value = Constraint> {
            (
                -5.0..5.0f64,
                -5.0..5.0f64,
                prop_oneof![Just(Relation::Le), Just(Relation::Ge), Just(Relation::Eq)],
                0.0..20.0f64,
            )
                .prop_map(|(c1, c2, relation, rhs)| Constraint::new("c", c1, c2, relation, rhs))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(300))]

            #[test]
            fn optimum_is_extremal_and_feasible(
                c1 in -5.0..5.0f64,
                c2 in -5.0..5.0f64,
                maximize in proptest::bool::ANY,
                constraints in prop::collection::vec(constraint(), 0..6),
            ) {
                let direction = if maximize { Direction::Maximize } else { Direction::Minimize };
                let mut p = problem(c1, c2, direction);
                p.constraints = constraints;
                let all = p.full_constraints();

                let solution = Solver::new().solve(&p);

                for e in &solution.evaluations {
                    prop_assert!(is_feasible(&e.point, &all));
                }
                match solution.best() {
                    Some(best) => {
                        prop_assert!(solution.evaluations.contains(&best));
                        for e in &solution.evaluations {
                            if maximize {
                                prop_assert!(best.z >= e.z);
                            } else {
                                prop_assert!(best.z <= e.z);
                            }
                        }
                    }
                    None => prop_assert!(solution.evaluations.is_empty()),
                }
                prop_assert_eq!(solution.feasible_polygon.len(), solution.evaluations.len());
            }
        }
    }
}
