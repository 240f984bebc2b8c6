pub mod ast;
pub mod compiler;
pub mod form;
pub mod lexer;
pub mod parser;
pub mod render;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use ast::*;
pub use compiler::{CompileError, Compiler, LinearForm};
pub use form::{FormError, FormProblem, FormRow, build_problem, parse_leading_float};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{MAX_EXPR_DEPTH, ParseError, Parser};
pub use render::{
    ChartBounds, ChartData, ConstraintLine, LabeledPoint, VertexRow, chart_data, optimum_line,
    vertex_label, vertex_table,
};
