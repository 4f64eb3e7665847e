//! Temporal-difference learning from streams of experience

use tokio::sync::mpsc;
use tracing::debug;

use markov_rl_core::{Action, Episode, State, Values};

/// Drive TD(0) updates from a stream of episodes.
///
/// Episodes are processed strictly one at a time, in arrival order:
/// the store carries no concurrency guarantee of its own, so no
/// reordering is permitted. The learner suspends while awaiting the
/// next episode and returns once the sending side of the channel is
/// closed and the stream is drained.
pub async fn temporal_difference_learning<S, A, V>(
    mut episodes: mpsc::Receiver<Episode<S, A>>,
    alpha: f64,
    gamma: f64,
    values: &mut V,
) where
    S: State,
    A: Action,
    V: Values<State = S>,
{
    let mut processed = 0_usize;
    while let Some(episode) = episodes.recv().await {
        temporal_difference_update(&episode, alpha, gamma, values);
        processed += 1;
    }
    debug!(processed, "episode stream closed");
}

/// One TD(0) update from a single episode:
///
/// `v(s) <- (1 - alpha) v(s) + alpha (r + gamma v(s'))`
pub fn temporal_difference_update<S, A, V>(
    episode: &Episode<S, A>,
    alpha: f64,
    gamma: f64,
    values: &mut V,
) where
    S: State,
    A: Action,
    V: Values<State = S>,
{
    let target = episode.reward + gamma * values.value(&episode.next_state);
    let blended = (1.0 - alpha) * values.value(&episode.state) + alpha * target;
    values.update(episode.state.clone(), blended);
}
