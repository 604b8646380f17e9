use std::f64::consts::PI;
use log::{debug, info};
use crate::automaton::{self, Automaton, Status};
use crate::checkpoint::{Snapshot, SnapshotWriter};
use crate::config::Configuration;
use crate::error::Error;
use crate::flux::{self, ADVECTION_VELOCITY};
use crate::mesh::Mesh;
use crate::partition::{Decomposition, Transfer};
use crate::patch::Patch;
use crate::weno;

/// Width of the halo around each block. The upwind WENO5 stencil of a
/// block's lowest face reaches three cells below the block.
pub const NUM_GUARD: i64 = weno::STENCIL_RADIUS + 1;

/// Weight of the step-start state in each stage of the Shu-Osher form of
/// SSP-RK3.
pub const RK_COEFFICIENTS: [f64; 3] = [0.0, 3.0 / 4.0, 1.0 / 3.0];




/// The initial condition, `sin(2 pi x) sin(2 pi y)`, sampled at cell centers.
///
pub fn initial_condition(position: (f64, f64)) -> f64 {
    let (x, y) = position;
    f64::sin(2.0 * PI * x) * f64::sin(2.0 * PI * y)
}

/// Magnitude of the advection velocity, the fastest signal speed.
///
pub fn max_wavespeed() -> f64 {
    ADVECTION_VELOCITY.0.hypot(ADVECTION_VELOCITY.1)
}

/// One stage of SSP-RK3: blend the step-start value `old` with a forward
/// Euler update of the current value. `lambda` is `dt / (dx dy)`, and the
/// residual is the net flux out of the cell.
///
pub fn ssp_rk3_update(stage: usize, old: f64, current: f64, residual: f64, lambda: f64) -> f64 {
    let c = RK_COEFFICIENTS[stage];
    c * old + (1.0 - c) * (current - lambda * residual)
}




/// CFL-limited step size selection. There is no stability check: a CFL
/// number that is too large yields a diverging solution.
///
#[derive(Clone, Copy, Debug)]
pub struct StepControl {
    pub cfl: f64,
    pub cell_size: f64,
    pub final_time: f64,
}

impl StepControl {
    pub fn nominal_step_size(&self) -> f64 {
        self.cfl * self.cell_size / max_wavespeed()
    }

    /// Return the step to take from `time`, and the clock value after taking
    /// it. A step that would pass the final time is shortened to end on it,
    /// and the clock is then set to the final time exactly.
    ///
    pub fn next(&self, time: f64) -> (f64, f64) {
        let dt = self.nominal_step_size();

        if time + dt > self.final_time {
            (self.final_time - time, self.final_time)
        } else {
            (dt, time + dt)
        }
    }
}




/// One block of the grid and the scratch memory to advance it by a
/// Runge-Kutta stage. Blocks are the automata of the stage execution: they
/// send copies of their owned cells to the blocks whose halos need them,
/// and advance once all of their own halo pieces have arrived.
///
pub struct Block {
    rank: usize,
    stage: usize,
    time_step_size: f64,
    spacing: (f64, f64),
    solution: Patch,
    old: Patch,
    view: Patch,
    residual: Patch,
    incoming_count: usize,
    outgoing: Vec<Transfer>,
    neighbor_patches: Vec<Patch>,
}

impl Block {
    pub fn new(rank: usize, solution: Patch, decomposition: &Decomposition, spacing: (f64, f64)) -> Self {
        let owned = decomposition.owned_extent(rank).clone();

        assert_eq!(
            solution.index_space(),
            &owned,
            "block {} does not cover its owned extent",
            rank
        );

        Self {
            rank,
            stage: 0,
            time_step_size: 0.0,
            spacing,
            old: Patch::zeros(owned.clone()),
            view: Patch::zeros(decomposition.ghosted_extent(rank)),
            residual: Patch::zeros(owned),
            solution,
            incoming_count: decomposition.incoming_count(rank),
            outgoing: decomposition.outgoing_transfers(rank),
            neighbor_patches: Vec::new(),
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn solution(&self) -> &Patch {
        &self.solution
    }

    fn with_stage(mut self, stage: usize, time_step_size: f64) -> Self {
        self.stage = stage;
        self.time_step_size = time_step_size;
        self
    }

    fn update(&mut self) {
        let (dx, dy) = self.spacing;
        let lambda = self.time_step_size / (dx * dy);
        let space = self.solution.index_space().clone();

        for index in space.iter() {
            *self.solution.get_mut(index) = ssp_rk3_update(
                self.stage,
                self.old.get(index),
                self.view.get(index),
                self.residual.get(index),
                lambda,
            )
        }
    }
}

impl Automaton for Block {
    type Key = usize;
    type Message = Patch;
    type Value = Self;

    fn key(&self) -> Self::Key {
        self.rank
    }

    fn messages(&self) -> Vec<(Self::Key, Self::Message)> {
        self.outgoing
            .iter()
            .map(|transfer| (transfer.target, transfer.pack(&self.solution)))
            .collect()
    }

    fn receive(&mut self, patch: Self::Message) {
        self.neighbor_patches.push(patch)
    }

    fn status(&self) -> Status {
        Status::eligible_if(self.neighbor_patches.len() == self.incoming_count)
    }

    fn value(mut self) -> Self::Value {
        self.view.copy_from(&self.solution);

        for patch in self.neighbor_patches.drain(..) {
            self.view.copy_from(&patch)
        }

        if self.stage == 0 {
            self.old.copy_from(&self.solution)
        }

        self.residual.fill(0.0);
        flux::accumulate_residual(&self.view, self.spacing, &mut self.residual);
        self.update();
        self
    }
}




/// Evaluates the blocks of one stage, either on the calling thread or in a
/// dedicated thread pool.
///
enum Executor {
    Serial,
    Parallel(rayon::ThreadPool),
}

impl Executor {
    fn new(num_threads: usize) -> Result<Self, Error> {
        if num_threads < 2 {
            Ok(Self::Serial)
        } else {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .map(Self::Parallel)
                .map_err(|e| Error::ThreadPool(e.to_string()))
        }
    }

    /// Run a stage to completion; the returned blocks are sorted by rank.
    ///
    fn run_stage(&self, blocks: Vec<Block>) -> Vec<Block> {
        let mut blocks = match self {
            Self::Serial => automaton::execute(blocks).collect::<Vec<_>>(),
            Self::Parallel(pool) => {
                pool.scope(|scope| automaton::execute_par(scope, blocks).collect::<Vec<_>>())
            }
        };
        blocks.sort_by_key(Block::rank);
        blocks
    }
}




/// The simulation state: the step counter, the clock, and the owned blocks
/// of the global field, sorted by rank.
///
pub struct State {
    pub iteration: u64,
    pub time: f64,
    blocks: Vec<Block>,
}

impl State {
    pub fn blocks(&self) -> impl Iterator<Item = &Patch> {
        self.blocks.iter().map(Block::solution)
    }
}




/// Drives the distributed SSP-RK3 / WENO5 scheme for linear advection on the
/// periodic unit square.
///
pub struct Solver {
    config: Configuration,
    mesh: Mesh,
    decomposition: Decomposition,
    executor: Executor,
}

impl Solver {
    pub fn new(config: Configuration) -> Result<Self, Error> {
        config.validate()?;

        let mesh = Mesh::unit_square(config.grid_size);
        let decomposition = Decomposition::with_workers(config.grid_size, config.num_workers, NUM_GUARD)?;
        let executor = Executor::new(config.num_threads)?;
        let (dx, dy) = mesh.cell_spacing();

        info!("nx = {}, dx = {:e}", mesh.size.0, dx);
        info!("ny = {}, dy = {:e}", mesh.size.1, dy);
        info!(
            "{} workers in a {} x {} layout, {} threads",
            decomposition.num_workers(),
            decomposition.layout().0,
            decomposition.layout().1,
            config.num_threads
        );

        Ok(Self {
            config,
            mesh,
            decomposition,
            executor,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn step_control(&self) -> StepControl {
        StepControl {
            cfl: self.config.cfl,
            cell_size: self.mesh.cell_spacing().0,
            final_time: self.config.final_time,
        }
    }

    /// Return the state at t = 0 built from [`initial_condition`].
    ///
    pub fn initial_state(&self) -> State {
        self.state_from_function(initial_condition)
    }

    /// Return a state at t = 0 with cell values sampled from a function of
    /// the cell-center position.
    ///
    pub fn state_from_function<F>(&self, f: F) -> State
    where
        F: Fn((f64, f64)) -> f64,
    {
        let mesh = &self.mesh;
        let global = Patch::from_function(mesh.index_space(), |index| f(mesh.cell_center(index)));
        let spacing = mesh.cell_spacing();

        let blocks = self
            .decomposition
            .scatter(&global)
            .into_iter()
            .enumerate()
            .map(|(rank, solution)| Block::new(rank, solution, &self.decomposition, spacing))
            .collect();

        State {
            iteration: 0,
            time: 0.0,
            blocks,
        }
    }

    /// Assemble the global field from the owned blocks.
    ///
    pub fn field(&self, state: &State) -> Patch {
        self.decomposition.gather(state.blocks())
    }

    pub fn snapshot(&self, state: &State) -> Snapshot {
        Snapshot::new(state.iteration, state.time, self.mesh.clone(), self.field(state))
    }

    /// Advance the state by one step of size `dt`: three stages, each
    /// beginning with a halo exchange. The clock advances by `dt`.
    ///
    pub fn advance(&self, state: State, dt: f64) -> State {
        let State { iteration, time, mut blocks } = state;

        for stage in 0..RK_COEFFICIENTS.len() {
            let flow = blocks.into_iter().map(|block| block.with_stage(stage, dt));
            blocks = self.executor.run_stage(flow.collect());
        }

        State {
            iteration: iteration + 1,
            time: time + dt,
            blocks,
        }
    }

    /// Advance the state until the final time, writing a snapshot before the
    /// first step, after every `checkpoint_interval` steps, and after the
    /// last step if that one was not already written. A failed write aborts
    /// the run.
    ///
    pub fn run<W: SnapshotWriter>(&self, state: State, writer: &mut W) -> Result<State, Error> {
        let control = self.step_control();
        let mut state = state;

        debug!("nominal time step {:e}", control.nominal_step_size());

        writer.save(&self.snapshot(&state))?;
        let mut last_written = state.iteration;

        while state.time < control.final_time {
            let (dt, time) = control.next(state.time);
            state = self.advance(state, dt);
            state.time = time;

            info!("[{}] t={:.4}", state.iteration, state.time);

            if state.iteration % self.config.checkpoint_interval == 0 {
                writer.save(&self.snapshot(&state))?;
                last_written = state.iteration;
            }
        }

        if last_written != state.iteration {
            writer.save(&self.snapshot(&state))?;
        }
        Ok(state)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;

    fn config(n: i64, num_workers: usize, final_time: f64) -> Configuration {
        Configuration {
            final_time,
            grid_size: (n, n),
            num_workers,
            ..Configuration::default()
        }
    }

    fn run_to_end(config: Configuration) -> (Solver, Patch, Patch) {
        let solver = Solver::new(config).unwrap();
        let state = solver.initial_state();
        let initial = solver.field(&state);
        let mut snapshots: Vec<Snapshot> = Vec::new();
        let state = solver.run(state, &mut snapshots).unwrap();
        let last = solver.field(&state);
        (solver, initial, last)
    }

    #[test]
    fn zero_residual_leaves_values_unchanged() {
        for &u in &[0.0, 1.0, -0.37, 12.5] {
            let mut current = u;

            for stage in 0..3 {
                current = ssp_rk3_update(stage, u, current, 0.0, 0.7);
            }
            assert!((current - u).abs() <= 1e-15 * u.abs().max(1.0));
        }
    }

    #[test]
    fn uniform_field_is_steady() {
        let solver = Solver::new(config(8, 4, 1.0)).unwrap();
        let state = solver.state_from_function(|_| 3.0);
        let dt = solver.step_control().nominal_step_size();
        let state = solver.advance(state, dt);

        for block in state.blocks() {
            for (_, u) in block.iter() {
                assert!((u - 3.0).abs() < 1e-14);
            }
        }
        assert_eq!(state.iteration, 1);
        assert_eq!(state.time, dt);
    }

    #[test]
    fn step_sizes_sum_to_the_final_time() {
        let control = StepControl {
            cfl: 0.4,
            cell_size: 1.0 / 8.0,
            final_time: 1.0,
        };
        assert!((1.0 / control.nominal_step_size()).fract() != 0.0);

        let mut time = 0.0;
        let mut total = 0.0;
        let mut steps = 0;

        while time < control.final_time {
            let (dt, next) = control.next(time);
            assert!(dt > 0.0 && dt <= control.nominal_step_size());
            total += dt;
            time = next;
            steps += 1;
            assert!(steps < 1000);
        }
        assert_eq!(time, 1.0);
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(steps, (1.0 / control.nominal_step_size()).ceil() as usize);
    }

    #[test]
    fn mass_is_conserved() {
        let solver = Solver::new(config(16, 4, 1.0)).unwrap();
        let state = solver.state_from_function(|(x, y)| 1.0 + initial_condition((x, y)) + 0.25 * f64::cos(2.0 * PI * x));
        let before = solver.field(&state).sum();
        let dt = solver.step_control().nominal_step_size();
        let state = (0..5).fold(state, |state, _| solver.advance(state, dt));
        let after = solver.field(&state).sum();
        assert!((before - after).abs() < 1e-11, "{} != {}", before, after);
    }

    #[test]
    fn one_period_returns_the_initial_field_with_high_order_convergence() {
        let errors: Vec<f64> = [8, 16, 32]
            .iter()
            .map(|&n| {
                let (_, initial, last) = run_to_end(config(n, 1, 1.0));
                last.max_abs_difference(&initial)
            })
            .collect();

        assert!(errors[0] > errors[1] && errors[1] > errors[2], "errors {:?}", errors);
        assert!(errors[0] / errors[1] > 12.0, "errors {:?}", errors);
        assert!(errors[1] / errors[2] > 12.0, "errors {:?}", errors);
        assert!(errors[2] < 1e-2, "errors {:?}", errors);
    }

    #[test]
    fn results_do_not_depend_on_worker_count() {
        let (_, _, one) = run_to_end(config(16, 1, 0.25));
        let (_, _, four) = run_to_end(config(16, 4, 0.25));
        let (_, _, six) = run_to_end(config(12, 6, 0.25));
        let (_, _, also_one) = run_to_end(config(12, 1, 0.25));
        assert!(one.max_abs_difference(&four) < 1e-14);
        assert!(six.max_abs_difference(&also_one) < 1e-14);
    }

    #[test]
    fn parallel_execution_matches_serial() {
        let (_, _, serial) = run_to_end(config(16, 4, 0.2));
        let (_, _, parallel) = run_to_end(Configuration { num_threads: 3, ..config(16, 4, 0.2) });
        assert!(serial.max_abs_difference(&parallel) < 1e-14);
    }

    #[test]
    fn snapshots_are_taken_at_start_interval_and_end() {
        let solver = Solver::new(Configuration { checkpoint_interval: 2, ..config(8, 2, 0.1) }).unwrap();
        let mut snapshots: Vec<Snapshot> = Vec::new();
        let state = solver.run(solver.initial_state(), &mut snapshots).unwrap();

        let steps = state.iteration;
        let expected = 1 + steps / 2 + if steps % 2 == 0 { 0 } else { 1 };
        assert_eq!(snapshots.len() as u64, expected);
        assert_eq!(snapshots[0].time, 0.0);
        assert_eq!(snapshots.last().unwrap().time, 0.1);
        assert_eq!(snapshots.last().unwrap().iteration, steps);
        assert!(snapshots.iter().all(|s| s.name == "Solution" && s.field.index_space() == &solver.mesh().index_space()));
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        assert!(matches!(Solver::new(config(2, 1, 1.0)), Err(Error::HaloExceedsGrid { .. })));
        assert!(matches!(Solver::new(config(8, 1, -1.0)), Err(Error::InvalidFinalTime(_))));
        assert!(matches!(Solver::new(config(8, 100, 1.0)), Err(Error::InvalidWorkerCount(100))));
    }
}
