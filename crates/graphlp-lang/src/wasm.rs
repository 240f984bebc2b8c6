//! WASM bindings for graphlp
//!
//! This module provides JavaScript-friendly APIs for the browser front end:
//! editor support for `.lp2` sources and solving from either a source string
//! or raw form fields.

use wasm_bindgen::prelude::*;

use crate::compiler::Compiler;
use crate::form::{FormRow, build_problem};
use crate::lexer::{Lexer, TokenKind};
use crate::parser::Parser;
use crate::render::{ChartData, VertexRow, chart_data, optimum_line, vertex_table};
use graphlp_solver::{Evaluation, LpProblem, Solver, SolutionStatus};

/// Parse source code and return the AST as JSON
#[wasm_bindgen]
pub fn parse(source: &str) -> Result<JsValue, JsValue> {
    let program = Parser::parse(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&program).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Tokenize source code and return tokens as JSON
#[wasm_bindgen]
pub fn tokenize(source: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<TokenInfo> = Lexer::tokenize(source)
        .into_iter()
        .map(|t| TokenInfo {
            kind: format!("{:?}", t.kind),
            token_type: semantic_type(t.kind).to_string(),
            text: t.text,
            start: t.span.start,
            end: t.span.end,
        })
        .collect();
    serde_wasm_bindgen::to_value(&tokens).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Token information for JavaScript
#[derive(serde::Serialize)]
struct TokenInfo {
    kind: String,
    token_type: String,
    text: String,
    start: usize,
    end: usize,
}

fn semantic_type(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Max | TokenKind::Min | TokenKind::Subject | TokenKind::To | TokenKind::St => {
            "keyword"
        }
        TokenKind::Ident => "variable",
        TokenKind::Number => "number",
        TokenKind::Comment => "comment",
        TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash => "operator",
        TokenKind::Le | TokenKind::Ge | TokenKind::Eq => "operator",
        TokenKind::Colon | TokenKind::Comma | TokenKind::Semicolon => "delimiter",
        TokenKind::LParen | TokenKind::RParen => "delimiter",
        TokenKind::Newline => "whitespace",
        TokenKind::Error | TokenKind::Eof => "error",
    }
}

/// Validate source code and return diagnostics as JSON
#[wasm_bindgen]
pub fn validate(source: &str) -> JsValue {
    let diagnostics = get_diagnostics(source);
    serde_wasm_bindgen::to_value(&diagnostics).unwrap_or(JsValue::NULL)
}

#[derive(serde::Serialize)]
struct Diagnostic {
    message: String,
    start: usize,
    end: usize,
    severity: String,
}

fn get_diagnostics(source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for token in Lexer::tokenize(source) {
        if token.kind == TokenKind::Error {
            diagnostics.push(Diagnostic {
                message: format!("Unexpected character {:?}", token.text),
                start: token.span.start,
                end: token.span.end,
                severity: "error".to_string(),
            });
        }
    }

    match Parser::parse(source) {
        Ok(program) => {
            if let Err(e) = Compiler::new().compile(&program) {
                diagnostics.push(Diagnostic {
                    message: e.to_string(),
                    start: 0,
                    end: source.len(),
                    severity: "error".to_string(),
                });
            }
        }
        Err(e) => {
            let span = e.span().unwrap_or(crate::lexer::Span::new(source.len(), source.len()));
            diagnostics.push(Diagnostic {
                message: e.to_string(),
                start: span.start,
                end: span.end,
                severity: "error".to_string(),
            });
        }
    }

    diagnostics
}

/// Solve a problem written in the `.lp2` language
#[wasm_bindgen]
pub fn solve(source: &str) -> Result<JsValue, JsValue> {
    let problem = Compiler::new()
        .compile_source(source)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let result = solve_problem(&problem, Vec::new());
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Solve from raw form fields; `rows` is an array of `{ c1, c2, relation, rhs }`
#[wasm_bindgen]
pub fn solve_form(c1: &str, c2: &str, direction: &str, rows: js_sys::Array) -> Result<JsValue, JsValue> {
    let rows = rows
        .iter()
        .map(serde_wasm_bindgen::from_value::<FormRow>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let form =
        build_problem(c1, c2, direction, &rows).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let result = solve_problem(&form.problem, form.skipped_rows);
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn solve_problem(problem: &LpProblem, skipped_rows: Vec<usize>) -> SolveResult {
    let solution = Solver::new().solve(problem);
    SolveResult {
        status: match solution.status {
            SolutionStatus::Optimal => "optimal".to_string(),
            SolutionStatus::Infeasible => "infeasible".to_string(),
        },
        table: vertex_table(&solution),
        optimum: optimum_line(&solution),
        best: solution.best(),
        binding_constraints: solution.analysis.binding_constraints.clone(),
        chart: chart_data(problem, &solution),
        skipped_rows,
    }
}

#[derive(serde::Serialize)]
struct SolveResult {
    status: String,
    table: Vec<VertexRow>,
    optimum: String,
    best: Option<Evaluation>,
    binding_constraints: Vec<String>,
    chart: ChartData,
    skipped_rows: Vec<usize>,
}
