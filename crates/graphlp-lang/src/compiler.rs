use std::path::Path;

use graphlp_solver::{Direction, LpProblem, Objective, Relation};
use thiserror::Error;
use tracing::debug;

use crate::ast::*;
use crate::Parser;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("No objective: add a line such as `maximize 3x1 + 2x2`")]
    MissingObjective,
    #[error("Only one objective is allowed (second one at position {0:?})")]
    DuplicateObjective(crate::lexer::Span),
    #[error("Unknown variable: {0} (expected x1 or x2)")]
    UnknownVariable(String),
    #[error("Expression is not linear: {0}")]
    NonLinear(String),
    #[error("Objective must not contain a constant term: {0}")]
    ConstantInObjective(String),
    #[error("Division by zero in expression")]
    DivisionByZero,
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error in {0}: {1}")]
    ParseError(String, String),
}

/// `x1·x1 + x2·x2 + constant`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearForm {
    pub x1: f64,
    pub x2: f64,
    pub constant: f64,
}

impl LinearForm {
    pub fn constant(value: f64) -> Self {
        Self {
            constant: value,
            ..Self::default()
        }
    }

    pub fn is_constant(&self) -> bool {
        self.x1 == 0.0 && self.x2 == 0.0
    }

    fn add(self, other: LinearForm) -> Self {
        Self {
            x1: self.x1 + other.x1,
            x2: self.x2 + other.x2,
            constant: self.constant + other.constant,
        }
    }

    fn sub(self, other: LinearForm) -> Self {
        self.add(other.scale(-1.0))
    }

    fn scale(self, k: f64) -> Self {
        Self {
            x1: self.x1 * k,
            x2: self.x2 * k,
            constant: self.constant * k,
        }
    }
}

/// Compiler for converting a parsed program to an [`LpProblem`]
#[derive(Debug, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    /// Read, parse and compile a problem file
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<LpProblem, CompileError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| CompileError::IoError(format!("{}: {}", path.display(), e)))?;
        let program = Parser::parse(&source)
            .map_err(|e| CompileError::ParseError(path.display().to_string(), e.to_string()))?;
        self.compile(&program)
    }

    pub fn compile_source(&self, source: &str) -> Result<LpProblem, CompileError> {
        let program = Parser::parse(source)
            .map_err(|e| CompileError::ParseError("<input>".to_string(), e.to_string()))?;
        self.compile(&program)
    }

    pub fn compile(&self, program: &Program) -> Result<LpProblem, CompileError> {
        let mut objectives = program.objectives();
        let decl = objectives.next().ok_or(CompileError::MissingObjective)?;
        if let Some(extra) = objectives.next() {
            return Err(CompileError::DuplicateObjective(extra.span));
        }

        let form = self.lower(&decl.expr)?;
        if form.constant != 0.0 {
            return Err(CompileError::ConstantInObjective(decl.expr.to_string()));
        }
        let direction = match decl.sense {
            Sense::Max => Direction::Maximize,
            Sense::Min => Direction::Minimize,
        };
        let mut problem = LpProblem::new(Objective::new(form.x1, form.x2, direction));

        for (i, c) in program.constraints().enumerate() {
            // move everything to the left, constants to the right
            let lhs = self.lower(&c.lhs)?;
            let rhs = self.lower(&c.rhs)?;
            let diff = lhs.sub(rhs);
            let relation = match c.relation {
                RelOp::Le => Relation::Le,
                RelOp::Ge => Relation::Ge,
                RelOp::Eq => Relation::Eq,
            };
            let name = c.label.clone().unwrap_or_else(|| format!("c{}", i + 1));
            problem.add_constraint(name, diff.x1, diff.x2, relation, -diff.constant);
        }

        debug!(
            direction = %problem.objective.direction,
            constraints = problem.num_constraints(),
            "compiled problem"
        );
        Ok(problem)
    }

    /// Reduce an expression to a linear form over x1 and x2
    pub fn lower(&self, expr: &Expr) -> Result<LinearForm, CompileError> {
        match expr {
            Expr::Number(n) => Ok(LinearForm::constant(*n)),
            Expr::Variable(v) => match v.name.as_str() {
                "x1" | "x" => Ok(LinearForm {
                    x1: 1.0,
                    ..LinearForm::default()
                }),
                "x2" | "y" => Ok(LinearForm {
                    x2: 1.0,
                    ..LinearForm::default()
                }),
                other => Err(CompileError::UnknownVariable(other.to_string())),
            },
            Expr::Neg(inner) => Ok(self.lower(inner)?.scale(-1.0)),
            Expr::Paren(inner) => self.lower(inner),
            Expr::BinaryOp { left, op, right } => {
                let l = self.lower(left)?;
                let r = self.lower(right)?;
                match op {
                    BinaryOp::Add => Ok(l.add(r)),
                    BinaryOp::Sub => Ok(l.sub(r)),
                    BinaryOp::Mul => {
                        // one side must be a plain number
                        if l.is_constant() {
                            Ok(r.scale(l.constant))
                        } else if r.is_constant() {
                            Ok(l.scale(r.constant))
                        } else {
                            Err(CompileError::NonLinear(expr.to_string()))
                        }
                    }
                    BinaryOp::Div => {
                        if !r.is_constant() {
                            return Err(CompileError::NonLinear(expr.to_string()));
                        }
                        if r.constant == 0.0 {
                            return Err(CompileError::DivisionByZero);
                        }
                        Ok(l.scale(1.0 / r.constant))
                    }
                }
            }
        }
    }
}
