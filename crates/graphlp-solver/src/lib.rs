pub mod geometry;
mod graphical;
mod problem;
mod solution;

pub use graphical::{Solver, TieBreak};
pub use problem::{
    Constraint, Direction, LpProblem, Objective, ParseDirectionError, ParseRelationError, Point,
    Relation,
};
pub use solution::{Analysis, ConstraintSlack, Evaluation, Solution, SolutionStatus};
