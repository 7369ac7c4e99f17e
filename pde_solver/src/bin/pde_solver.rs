//! The `pde_solver` binary: parses the CLI flag surface, builds the
//! requested equation specialization, drives the snapshot loop, and writes
//! the output solution matrix.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::str::FromStr;
use std::time::Instant;

use log::debug;
use nalgebra::{DMatrix, DVector};

use pde_solver::boundary::{BoundaryCondition, BoundaryConditionKind, BoundaryConditions1D, BoundaryConditions2D};
use pde_solver::cli::ArgParser;
use pde_solver::enums::{PdeType, SolverType, SpaceDiscretizerType};
use pde_solver::equations::{AdvectionDiffusion1D, AdvectionDiffusion2D, Equation, WaveEquation1D, WaveEquation2D};
use pde_solver::error::{PdeError, PdeResult};
use pde_solver::grid::{Grid1D, Grid2D};
use pde_solver::input::{PdeInputData1D, PdeInputData2D};
use pde_solver::io;
use pde_solver::matrix::Matrix;
use pde_solver::scalar::{MathDomain, Scalar};
use pde_solver::solver::FiniteDifferenceSolver;
use pde_solver::vector::Vector;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(args) {
        eprintln!("pde_solver: {e}");
        std::process::exit(1);
    }
}

/// Runs `f`, bracketing it with `debug!`-level start/end messages when
/// `-dbg` is set. Mirrors the original's `DEBUG_PRINT_START`/`DEBUG_PRINT_END`
/// macros, which wrap every stage from argument parsing through the final
/// file write.
fn timed_stage<R>(debug_on: bool, label: &str, f: impl FnOnce() -> PdeResult<R>) -> PdeResult<R> {
    if !debug_on {
        return f();
    }
    debug!("{label}: start");
    let start = Instant::now();
    let result = f();
    debug!("{label}: done in {:?}", start.elapsed());
    result
}

fn run(args: Vec<String>) -> PdeResult<()> {
    let ap = ArgParser::new(args);
    let debug = ap.has_flag("-dbg");
    let (domain, pde_type, dim) = timed_stage(debug, "parsing inputs", || {
        let domain: MathDomain = ap.value_or("-md", "Float")?.parse()?;
        let pde_type: PdeType = ap.value_or("-pde", "AdvectionDiffusion")?.parse()?;
        let dim: usize = ap.parse_or("-dim", 1)?;
        Ok((domain, pde_type, dim))
    })?;

    match domain {
        MathDomain::Float => dispatch_dim::<f32>(&ap, pde_type, dim, debug),
        MathDomain::Double => dispatch_dim::<f64>(&ap, pde_type, dim, debug),
    }
}

fn dispatch_dim<T>(ap: &ArgParser, pde_type: PdeType, dim: usize, debug: bool) -> PdeResult<()>
where
    T: Scalar + FromStr,
    T::Err: Display,
{
    match dim {
        1 => run_1d::<T>(ap, pde_type, debug),
        2 => run_2d::<T>(ap, pde_type, debug),
        other => Err(PdeError::IllegalArgument { flag: "-dim", value: other.to_string() }),
    }
}

/// Parses the left face's BC unconditionally (it has no fallback) and each
/// other face's BC, defaulting both kind and value to the left face's when
/// its own flags are absent.
fn parse_left_bc<T>(ap: &ArgParser, kind_flag: &'static str, value_flag: &'static str) -> PdeResult<BoundaryCondition<T>>
where
    T: Scalar + FromStr,
    T::Err: Display,
{
    parse_face_bc(ap, kind_flag, value_flag, None)
}

fn parse_face_bc<T>(
    ap: &ArgParser,
    kind_flag: &'static str,
    value_flag: &'static str,
    fallback: Option<BoundaryCondition<T>>,
) -> PdeResult<BoundaryCondition<T>>
where
    T: Scalar + FromStr,
    T::Err: Display,
{
    let kind = match ap.value(kind_flag) {
        Ok(raw) => raw.parse::<BoundaryConditionKind>()?,
        Err(PdeError::MissingArgument { .. }) => {
            fallback.map(|f| f.kind).ok_or(PdeError::MissingArgument { flag: kind_flag })?
        }
        Err(e) => return Err(e),
    };
    if kind == BoundaryConditionKind::Periodic {
        return Ok(BoundaryCondition::periodic());
    }
    let value = match ap.parse::<T>(value_flag) {
        Ok(v) => v,
        Err(PdeError::MissingArgument { .. }) => {
            fallback.map(|f| f.value).ok_or(PdeError::MissingArgument { flag: value_flag })?
        }
        Err(e) => return Err(e),
    };
    Ok(BoundaryCondition { kind, value })
}

fn load_grid_1d<T: Scalar>(ap: &ArgParser, flag: &'static str, default: (T, T, usize)) -> PdeResult<Grid1D<T>> {
    match ap.value(flag) {
        Ok(path) => {
            let file = File::open(path)?;
            let coords = io::read_vector::<T, _>(BufReader::new(file))?;
            Grid1D::new(coords)
        }
        Err(PdeError::MissingArgument { .. }) => {
            let (start, end, n) = default;
            Grid1D::linspace(start, end, n)
        }
        Err(e) => Err(e),
    }
}

fn load_ic_1d<T: Scalar>(ap: &ArgParser, grid: &Grid1D<T>) -> PdeResult<DVector<T>> {
    let values = match ap.value("-ic") {
        Ok(path) => {
            let file = File::open(path)?;
            io::read_vector::<T, _>(BufReader::new(file))?
        }
        Err(PdeError::MissingArgument { .. }) => io::bell_1d(grid.coords()),
        Err(e) => return Err(e),
    };
    if values.len() != grid.len() {
        return Err(PdeError::ShapeMismatch { expected: grid.len(), actual: values.len() });
    }
    Ok(DVector::from_vec(values))
}

fn load_ic_2d<T: Scalar>(ap: &ArgParser, grid: &Grid2D<T>) -> PdeResult<DVector<T>> {
    let values = match ap.value("-ic") {
        Ok(path) => {
            let file = File::open(path)?;
            let (data, nx, ny) = io::read_matrix::<T, _>(BufReader::new(file))?;
            if nx != grid.nx() || ny != grid.ny() {
                return Err(PdeError::ShapeMismatch { expected: grid.len(), actual: data.len() });
            }
            data
        }
        Err(PdeError::MissingArgument { .. }) => io::bell_2d(grid.x.coords(), grid.y.coords()),
        Err(e) => return Err(e),
    };
    Ok(DVector::from_vec(values))
}

/// Runs `solver.advance(n)` `big_n` times, recording one snapshot column
/// after each batch, then writes the `rows x big_n` snapshot matrix to
/// `output_path`. Mirrors the original's "advance, then record a column"
/// loop: file I/O happens once, after the loop, never per micro-step.
fn drive<M, E>(equation: E, n: usize, big_n: usize, rows: usize, output_path: &str, debug: bool) -> PdeResult<()>
where
    M: Matrix,
    E: Equation<M>,
{
    let mut solver = timed_stage(debug, "creating PDE solver", || FiniteDifferenceSolver::<M, E>::new(equation))?;
    let mut columns = Vec::with_capacity(big_n);
    timed_stage(debug, "solving", || {
        for _ in 0..big_n {
            solver.advance(n)?;
            columns.push(solver.solution().as_slice().to_vec());
        }
        Ok(())
    })?;
    timed_stage(debug, "saving to file", || {
        let file = File::create(output_path)?;
        io::write_solution_matrix(BufWriter::new(file), &columns, rows)
    })
}

fn run_1d<T>(ap: &ArgParser, pde_type: PdeType, debug: bool) -> PdeResult<()>
where
    T: Scalar + FromStr,
    T::Err: Display,
{
    let zero = T::from_f64_lossy(0.0);
    let one = T::from_f64_lossy(1.0);
    let grid = timed_stage(debug, "creating grid", || load_grid_1d(ap, "-g", (zero, one, 128)))?;
    let ic = timed_stage(debug, "creating initial condition", || load_ic_1d(ap, &grid))?;

    let left = parse_left_bc(ap, "-lbct", "-lbc")?;
    let right = parse_face_bc(ap, "-rbct", "-rbc", Some(left))?;
    let bc = BoundaryConditions1D::new(left, right)?;

    let velocity = ap.parse::<T>("-v")?;
    let dt = ap.parse::<T>("-dt")?;
    let solver_type: SolverType = ap.value_or("-st", "CrankNicolson")?.parse()?;
    let space_type: SpaceDiscretizerType = ap.value_or("-sdt", "Upwind")?.parse()?;
    let n: usize = ap.parse("-n")?;
    let big_n: usize = ap.parse("-N")?;
    let output_path = ap.value_or("-of", "sol.cl")?.to_string();

    match pde_type {
        PdeType::AdvectionDiffusion => {
            let diffusion = ap.parse::<T>("-d")?;
            let input = timed_stage(debug, "creating PDE input data", || {
                PdeInputData1D::<DMatrix<T>>::new(ic, grid, velocity, diffusion, dt, solver_type, space_type, bc)
            })?;
            let rows = input.len();
            let equation = AdvectionDiffusion1D::new(&input);
            drive::<DMatrix<T>, _>(equation, n, big_n, rows, &output_path, debug)
        }
        PdeType::WaveEquation => {
            let c = ap.parse::<T>("-c")?;
            let input = timed_stage(debug, "creating PDE input data", || {
                PdeInputData1D::<DMatrix<T>>::new(ic, grid, velocity, c, dt, solver_type, space_type, bc)
            })?;
            let rows = input.len();
            let equation = WaveEquation1D::new(&input)?;
            drive::<DMatrix<T>, _>(equation, n, big_n, rows, &output_path, debug)
        }
    }
}

fn run_2d<T>(ap: &ArgParser, pde_type: PdeType, debug: bool) -> PdeResult<()>
where
    T: Scalar + FromStr,
    T::Err: Display,
{
    let neg_four = T::from_f64_lossy(-4.0);
    let four = T::from_f64_lossy(4.0);
    let grid = timed_stage(debug, "creating grid", || {
        let gx = load_grid_1d(ap, "-gx", (neg_four, four, 128))?;
        let gy = load_grid_1d(ap, "-gy", (neg_four, four, 128))?;
        Ok(Grid2D::new(gx, gy))
    })?;
    let ic = timed_stage(debug, "creating initial condition", || load_ic_2d(ap, &grid))?;

    let left = parse_left_bc(ap, "-lbct", "-lbc")?;
    let right = parse_face_bc(ap, "-rbct", "-rbc", Some(left))?;
    let down = parse_face_bc(ap, "-dbct", "-dbc", Some(left))?;
    let up = parse_face_bc(ap, "-ubct", "-ubc", Some(left))?;
    let bc = BoundaryConditions2D::new(left, right, down, up)?;

    let x_velocity = ap.parse::<T>("-vx")?;
    let y_velocity = ap.parse::<T>("-vy")?;
    let dt = ap.parse::<T>("-dt")?;
    let solver_type: SolverType = ap.value_or("-st", "CrankNicolson")?.parse()?;
    let space_type: SpaceDiscretizerType = ap.value_or("-sdt", "Upwind")?.parse()?;
    let n: usize = ap.parse("-n")?;
    let big_n: usize = ap.parse("-N")?;
    let output_path = ap.value_or("-of", "sol.cl")?.to_string();

    match pde_type {
        PdeType::AdvectionDiffusion => {
            let diffusion = ap.parse::<T>("-d")?;
            let input = timed_stage(debug, "creating PDE input data", || {
                PdeInputData2D::<DMatrix<T>>::new(
                    ic, grid, x_velocity, y_velocity, diffusion, dt, solver_type, space_type, bc,
                )
            })?;
            let rows = input.len();
            let equation = AdvectionDiffusion2D::new(&input);
            drive::<DMatrix<T>, _>(equation, n, big_n, rows, &output_path, debug)
        }
        PdeType::WaveEquation => {
            let c = ap.parse::<T>("-c")?;
            let input = timed_stage(debug, "creating PDE input data", || {
                PdeInputData2D::<DMatrix<T>>::new(ic, grid, x_velocity, y_velocity, c, dt, solver_type, space_type, bc)
            })?;
            let rows = input.len();
            let equation = WaveEquation2D::new(&input)?;
            drive::<DMatrix<T>, _>(equation, n, big_n, rows, &output_path, debug)
        }
    }
}
