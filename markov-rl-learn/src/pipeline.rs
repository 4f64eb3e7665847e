//! Concurrent online-learning simulation pipeline
//!
//! Action selection, environment simulation, and weight updates run as
//! three concurrent stages joined by capacity-one channels, with the
//! learner feeding each episode's next state back to the driver. At
//! most one item is ever in flight per hand-off, so logical steps stay
//! strictly ordered and throughput is serialized to the slowest stage.

use std::sync::Arc;

use async_trait::async_trait;
use ndarray::Array1;
use tokio::sync::mpsc;
use tracing::debug;

use markov_rl_core::{Episode, MdpError, Policy, Process, Result};

use crate::linear::{update, LinearProcess};
use crate::params::SharedParametrization;

/// Produces one experience sample for a state-action pair.
///
/// Simulators are external collaborators: the pipeline hands them the
/// training process, the current state, and the selected action, and
/// receives back the observed transition.
#[async_trait]
pub trait Simulator<P: Process>: Send + Sync {
    /// Simulate taking `action` in `state` under `process`.
    async fn simulate(
        &self,
        process: &P,
        state: &P::State,
        action: &P::Action,
    ) -> Result<Episode<P::State, P::Action>>;
}

#[async_trait]
impl<P, F> Simulator<P> for F
where
    P: Process,
    F: Fn(&P, &P::State, &P::Action) -> Result<Episode<P::State, P::Action>> + Send + Sync,
{
    async fn simulate(
        &self,
        process: &P,
        state: &P::State,
        action: &P::Action,
    ) -> Result<Episode<P::State, P::Action>> {
        self(process, state, action)
    }
}

/// Online training loop over a linearly approximated process.
///
/// One run is a closed loop: the driver selects actions, the simulator
/// produces episodes, the learner computes fresh weights and feeds the
/// next state back to the driver. The shared parametrization decays by
/// one step per completed action selection.
pub struct Simulation<P: LinearProcess> {
    /// The process being trained
    process: Arc<P>,
    /// Action selection policy
    policy: Arc<dyn Policy<P>>,
    /// External episode source
    simulator: Arc<dyn Simulator<P>>,
    /// Parameters shared between the driver and learner stages
    parameters: SharedParametrization,
}

impl<P> Simulation<P>
where
    P: LinearProcess + 'static,
{
    /// Create a new simulation over `process`.
    pub fn new(
        process: Arc<P>,
        policy: Arc<dyn Policy<P>>,
        simulator: Arc<dyn Simulator<P>>,
        parameters: SharedParametrization,
    ) -> Self {
        Self {
            process,
            policy,
            simulator,
            parameters,
        }
    }

    /// Run the training loop from `start` until the terminal predicate
    /// accepts a visited state. The predicate is the only cancellation
    /// mechanism.
    ///
    /// Each visited state is forwarded to the caller's `observations`
    /// sink one step behind the driver; the final state is never
    /// forwarded, and the sink is closed when the run ends. The caller
    /// must drain the sink (or drop its receiver) for the run to make
    /// progress. Every completed step hands a freshly computed weight
    /// vector to `apply`, which typically writes it back into the
    /// training process, before the next state's action is selected.
    ///
    /// Returns the terminal state. A failure in any stage tears the
    /// pipeline down in dependency order and is returned as the error.
    pub async fn run<T, W>(
        &self,
        start: P::State,
        terminal: T,
        observations: mpsc::Sender<P::State>,
        apply: W,
    ) -> Result<P::State>
    where
        T: Fn(&P::State) -> bool + Send + Sync + 'static,
        W: Fn(Array1<f64>) + Send + Sync + 'static,
    {
        let (action_tx, action_rx) = mpsc::channel(1);
        let (episode_tx, episode_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = mpsc::channel(1);

        // Seed the loop; the channel is empty so this cannot block.
        state_tx
            .send(start)
            .await
            .map_err(|_| MdpError::Simulation("failed to seed the start state".into()))?;

        let driver = tokio::spawn(drive(
            Arc::clone(&self.process),
            Arc::clone(&self.policy),
            Arc::clone(&self.parameters),
            state_rx,
            action_tx,
            observations,
            terminal,
        ));
        let simulator = tokio::spawn(simulate(
            Arc::clone(&self.process),
            Arc::clone(&self.simulator),
            action_rx,
            episode_tx,
        ));
        let learner = tokio::spawn(learn(
            Arc::clone(&self.process),
            Arc::clone(&self.parameters),
            episode_rx,
            state_tx,
            apply,
        ));

        let (driver, simulator, learner) = tokio::join!(driver, simulator, learner);

        // A stage failure is the root cause of an early driver exit,
        // so the simulator and learner results are inspected first.
        join_result(simulator)?;
        join_result(learner)?;
        join_result(driver)
    }
}

/// Stage A: consume arriving states, select actions, decay parameters.
async fn drive<P, T>(
    process: Arc<P>,
    policy: Arc<dyn Policy<P>>,
    parameters: SharedParametrization,
    mut states: mpsc::Receiver<P::State>,
    actions: mpsc::Sender<(P::State, P::Action)>,
    observations: mpsc::Sender<P::State>,
    terminal: T,
) -> Result<P::State>
where
    P: LinearProcess,
    T: Fn(&P::State) -> bool + Send + Sync,
{
    let mut current: Option<P::State> = None;
    let mut steps = 0_usize;

    while let Some(state) = states.recv().await {
        if let Some(previous) = current.replace(state.clone()) {
            // The sink is caller-owned telemetry; a dropped receiver
            // must not stall training.
            let _ = observations.send(previous).await;
        }

        if terminal(&state) {
            debug!(steps, "terminal state reached");
            return Ok(state);
        }

        let action = policy.act(process.as_ref(), &state).await?;
        if actions.send((state, action)).await.is_err() {
            // Downstream stage stopped; its error is reported by run().
            break;
        }
        parameters.write().await.decay();
        steps += 1;
    }

    Err(MdpError::Simulation(
        "simulation stopped before reaching a terminal state".into(),
    ))
}

/// Stage B: turn each selected action into one experience sample.
async fn simulate<P>(
    process: Arc<P>,
    simulator: Arc<dyn Simulator<P>>,
    mut actions: mpsc::Receiver<(P::State, P::Action)>,
    episodes: mpsc::Sender<Episode<P::State, P::Action>>,
) -> Result<()>
where
    P: LinearProcess,
{
    while let Some((state, action)) = actions.recv().await {
        let episode = simulator.simulate(process.as_ref(), &state, &action).await?;
        if episodes.send(episode).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Stage C: update weights per episode and close the loop.
async fn learn<P, W>(
    process: Arc<P>,
    parameters: SharedParametrization,
    mut episodes: mpsc::Receiver<Episode<P::State, P::Action>>,
    states: mpsc::Sender<P::State>,
    apply: W,
) -> Result<()>
where
    P: LinearProcess,
    W: Fn(Array1<f64>) + Send + Sync,
{
    while let Some(episode) = episodes.recv().await {
        // One consistent snapshot per step; the driver decays the
        // shared parametrization concurrently.
        let snapshot = *parameters.read().await;
        let weights = update(process.as_ref(), &episode, &snapshot)?;
        apply(weights);

        if states.send(episode.next_state).await.is_err() {
            break;
        }
    }
    Ok(())
}

fn join_result<T>(joined: std::result::Result<Result<T>, tokio::task::JoinError>) -> Result<T> {
    match joined {
        Ok(result) => result,
        Err(err) => Err(MdpError::Simulation(format!("stage panicked: {err}"))),
    }
}
