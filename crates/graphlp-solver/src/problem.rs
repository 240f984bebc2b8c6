use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A point in the (x1, x2) plane
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown relation: {0:?} (expected <=, >= or =)")]
pub struct ParseRelationError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown direction: {0:?} (expected max or min)")]
pub struct ParseDirectionError(pub String);

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
    /// A tag that matched none of the above. Never satisfied.
    Unrecognized,
}

impl Relation {
    /// Lenient conversion used for free-form input: unknown tags become
    /// [`Relation::Unrecognized`] instead of an error.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(Relation::Unrecognized)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
            Relation::Unrecognized => "?",
        }
    }
}

impl FromStr for Relation {
    type Err = ParseRelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "<=" | "≤" | "le" | "max" => Ok(Relation::Le),
            ">=" | "≥" | "ge" | "min" => Ok(Relation::Ge),
            "=" | "==" | "eq" | "equal" => Ok(Relation::Eq),
            _ => Err(ParseRelationError(s.to_string())),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" => Ok(Direction::Maximize),
            "min" | "minimize" => Ok(Direction::Minimize),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Maximize => write!(f, "maximize"),
            Direction::Minimize => write!(f, "minimize"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    /// Coefficient of x1
    pub c1: f64,
    /// Coefficient of x2
    pub c2: f64,
    /// Whether to maximize or minimize
    pub direction: Direction,
}

impl Objective {
    pub fn new(c1: f64, c2: f64, direction: Direction) -> Self {
        Self { c1, c2, direction }
    }

    /// Objective value Z at `p`
    pub fn evaluate(&self, p: &Point) -> f64 {
        self.c1 * p.x + self.c2 * p.y
    }

    /// True when `candidate` is strictly better than `current`
    pub fn improves(&self, candidate: f64, current: f64) -> bool {
        match self.direction {
            Direction::Maximize => candidate > current,
            Direction::Minimize => candidate < current,
        }
    }

    /// The value every real objective value improves upon
    pub fn worst_value(&self) -> f64 {
        match self.direction {
            Direction::Maximize => f64::NEG_INFINITY,
            Direction::Minimize => f64::INFINITY,
        }
    }
}

/// A linear constraint `c1·x1 + c2·x2 (relation) rhs`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    pub c1: f64,
    pub c2: f64,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    pub fn new(name: impl Into<String>, c1: f64, c2: f64, relation: Relation, rhs: f64) -> Self {
        Self {
            name: name.into(),
            c1,
            c2,
            relation,
            rhs,
        }
    }

    /// Left-hand side value at `p`
    pub fn lhs(&self, p: &Point) -> f64 {
        self.c1 * p.x + self.c2 * p.y
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x1 + {}x2 {} {}", self.c1, self.c2, self.relation, self.rhs)
    }
}

/// Represents a two-variable linear programming problem.
///
/// Non-negativity of x1 and x2 is implicit; see [`LpProblem::full_constraints`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    pub objective: Objective,
    /// User constraints, in input order
    pub constraints: Vec<Constraint>,
}

impl LpProblem {
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, c1: f64, c2: f64, direction: Direction) {
        self.objective = Objective { c1, c2, direction };
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        c1: f64,
        c2: f64,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(Constraint::new(name, c1, c2, relation, rhs));
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// User constraints followed by `x1 >= 0` and `x2 >= 0`
    pub fn full_constraints(&self) -> Vec<Constraint> {
        let mut all = self.constraints.clone();
        all.push(Constraint::new("x1 >= 0", 1.0, 0.0, Relation::Ge, 0.0));
        all.push(Constraint::new("x2 >= 0", 0.0, 1.0, Relation::Ge, 0.0));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_spellings() {
        assert_eq!("<=".parse::<Relation>(), Ok(Relation::Le));
        assert_eq!("≥".parse::<Relation>(), Ok(Relation::Ge));
        assert_eq!("equal".parse::<Relation>(), Ok(Relation::Eq));
        // legacy form tags
        assert_eq!("max".parse::<Relation>(), Ok(Relation::Le));
        assert_eq!("min".parse::<Relation>(), Ok(Relation::Ge));
        assert!("<".parse::<Relation>().is_err());
    }

    #[test]
    fn test_relation_from_tag_fails_closed() {
        assert_eq!(Relation::from_tag("between"), Relation::Unrecognized);
        assert_eq!(Relation::from_tag(" >= "), Relation::Ge);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("MAX".parse::<Direction>(), Ok(Direction::Maximize));
        assert_eq!("minimize".parse::<Direction>(), Ok(Direction::Minimize));
        let err = "best".parse::<Direction>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown direction: \"best\" (expected max or min)");
    }

    #[test]
    fn test_objective_improves() {
        let max = Objective::new(1.0, 1.0, Direction::Maximize);
        assert!(max.improves(2.0, max.worst_value()));
        assert!(!max.improves(2.0, 2.0));
        let min = Objective::new(1.0, 1.0, Direction::Minimize);
        assert!(min.improves(-5.0, 0.0));
        assert!(!min.improves(0.0, 0.0));
    }

    #[test]
    fn test_full_constraints_appends_non_negativity() {
        let mut problem = LpProblem::new(Objective::new(1.0, 1.0, Direction::Maximize));
        problem.add_constraint("sum", 1.0, 1.0, Relation::Le, 4.0);
        let all = problem.full_constraints();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "sum");
        assert_eq!((all[1].c1, all[1].c2, all[1].relation), (1.0, 0.0, Relation::Ge));
        assert_eq!((all[2].c1, all[2].c2, all[2].relation), (0.0, 1.0, Relation::Ge));
        assert_eq!(problem.num_constraints(), 1);
    }
}
