//! Presentation of a solution: vertex labels, the results table, the optimum
//! line, and data for plotting the feasible region.

use graphlp_solver::{Constraint, LpProblem, Point, Solution};

/// Number of steps used to sample each constraint line across the chart.
pub const LINE_SAMPLES: usize = 200;

/// Headroom added above the largest coordinate when sizing the chart.
pub const CHART_MARGIN: f64 = 1.1;

/// One row of the vertex table, already formatted
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRow {
    pub label: String,
    pub x: String,
    pub y: String,
    pub z: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub max_x: f64,
    pub max_y: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintLine {
    pub constraint: String,
    pub points: Vec<Point>,
}

/// Everything a plotting front end needs
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub bounds: ChartBounds,
    /// Closed outline of the feasible region, empty when it has no area
    pub region: Vec<Point>,
    pub constraint_lines: Vec<ConstraintLine>,
    pub vertices: Vec<LabeledPoint>,
    pub optimum: Option<Point>,
}

/// `A`..`Z`, then `AA`, `AB`, ... like spreadsheet columns
pub fn vertex_label(index: usize) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Two decimals; negative zero prints as `0.00`
pub fn fixed2(value: f64) -> String {
    format!("{:.2}", value + 0.0)
}

pub fn vertex_table(solution: &Solution) -> Vec<VertexRow> {
    solution
        .evaluations
        .iter()
        .enumerate()
        .map(|(i, e)| VertexRow {
            label: vertex_label(i),
            x: fixed2(e.point.x),
            y: fixed2(e.point.y),
            z: fixed2(e.z),
        })
        .collect()
}

pub fn optimum_line(solution: &Solution) -> String {
    match solution.best() {
        Some(best) => format!(
            "Optimum: x1={}, x2={}, Z={}",
            fixed2(best.point.x),
            fixed2(best.point.y),
            fixed2(best.z)
        ),
        None => "No feasible solution found.".to_string(),
    }
}

/// Axis maxima covering the region and the optimum, never below 1 before the margin
pub fn chart_bounds(solution: &Solution) -> ChartBounds {
    let points = solution
        .feasible_polygon
        .iter()
        .chain(solution.best_point.as_ref());
    let (mx, my) = points.fold((1.0f64, 1.0f64), |(mx, my), p| (mx.max(p.x), my.max(p.y)));
    ChartBounds {
        max_x: (mx * CHART_MARGIN).ceil(),
        max_y: (my * CHART_MARGIN).ceil(),
    }
}

/// Sample the boundary of `c` over `0..=max_x`, keeping points inside the chart.
///
/// Vertical lines (`c2 == 0`) produce no samples.
pub fn constraint_line(c: &Constraint, bounds: ChartBounds) -> Vec<Point> {
    if c.c2 == 0.0 {
        return Vec::new();
    }
    let step = bounds.max_x / LINE_SAMPLES as f64;
    (0..=LINE_SAMPLES)
        .map(|i| i as f64 * step)
        .map(|x| Point::new(x, (c.rhs - c.c1 * x) / c.c2))
        .filter(|p| p.y >= 0.0 && p.y <= bounds.max_y)
        .collect()
}

pub fn chart_data(problem: &LpProblem, solution: &Solution) -> ChartData {
    let bounds = chart_bounds(solution);

    let region = if solution.feasible_polygon.len() > 2 {
        let mut closed = solution.feasible_polygon.clone();
        closed.push(solution.feasible_polygon[0]);
        closed
    } else {
        Vec::new()
    };

    let constraint_lines = problem
        .full_constraints()
        .iter()
        .filter_map(|c| {
            let points = constraint_line(c, bounds);
            (!points.is_empty()).then(|| ConstraintLine {
                constraint: c.name.clone(),
                points,
            })
        })
        .collect();

    let vertices = solution
        .evaluations
        .iter()
        .enumerate()
        .map(|(i, e)| LabeledPoint {
            label: vertex_label(i),
            x: e.point.x,
            y: e.point.y,
        })
        .collect();

    ChartData {
        bounds,
        region,
        constraint_lines,
        vertices,
        optimum: solution.best_point,
    }
}
