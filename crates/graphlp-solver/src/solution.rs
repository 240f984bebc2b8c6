use crate::problem::Point;

/// The result of solving a two-variable LP graphically
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Every feasible candidate vertex with its objective value, in output order
    pub evaluations: Vec<Evaluation>,
    /// The optimal vertex, if any vertex is feasible
    pub best_point: Option<Point>,
    /// Objective value at `best_point`
    pub best_value: Option<f64>,
    /// Feasible vertices ordered for drawing the region boundary
    pub feasible_polygon: Vec<Point>,
    /// Post-optimal analysis at `best_point`
    pub analysis: Analysis,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// At least one feasible vertex was found
    Optimal,
    /// No candidate vertex satisfies all constraints
    Infeasible,
}

/// A feasible vertex and its objective value Z
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub point: Point,
    pub z: f64,
}

/// Detailed analysis of the optimal vertex
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Constraints that hold with equality at the optimum
    pub binding_constraints: Vec<String>,

    /// Slack of every constraint (implicit non-negativity included)
    pub slacks: Vec<ConstraintSlack>,

    /// Other evaluated vertices reaching the optimal value
    pub alternative_optima: Vec<Point>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSlack {
    /// Constraint name
    pub constraint: String,
    /// Left-hand side at the optimum
    pub lhs: f64,
    /// Right-hand side value
    pub rhs: f64,
    /// Distance to the boundary on the allowed side
    pub slack: f64,
}

impl Solution {
    pub fn infeasible() -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            evaluations: Vec::new(),
            best_point: None,
            best_value: None,
            feasible_polygon: Vec::new(),
            analysis: Analysis::empty(),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.best_point.is_some()
    }

    /// The optimum as an evaluation, if one exists
    pub fn best(&self) -> Option<Evaluation> {
        match (self.best_point, self.best_value) {
            (Some(point), Some(z)) => Some(Evaluation { point, z }),
            _ => None,
        }
    }
}

impl Analysis {
    pub fn empty() -> Self {
        Self::default()
    }
}
