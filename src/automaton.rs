use core::hash::Hash;
use std::collections::hash_map::{Entry, HashMap};

/// Returned by [`Automaton::status`] to indicate whether a task is eligible
/// to be evaluated.
pub enum Status {
    Eligible,
    Ineligible,
}

impl Status {
    pub fn eligible_if(condition: bool) -> Self {
        if condition {
            Self::Eligible
        } else {
            Self::Ineligible
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// A worker in a group of compute tasks which exchanges data with its peers
/// before yielding a computationally intensive result. In the advection
/// solver each automaton is one block of the grid: its messages are copies
/// of the owned cells its neighbors need in their halos, and its value is
/// the block advanced by one Runge-Kutta stage.
///
/// Data is never shared between automata. Each message is an owned buffer
/// whose ownership moves to the recipient, so a stage can be evaluated on a
/// worker thread without locks, and no peer can observe another peer's data
/// changing mid-stage. Because every peer of a stage emits its messages
/// before any of them is evaluated, one call to [`execute`] or
/// [`execute_par`] is a synchronous collective: collecting all of its values
/// is the barrier between stages.
///
pub trait Automaton {
    /// The type of the key to uniquely identify this automaton within a
    /// group. Executors require this type to be `Hash + Eq`.
    type Key;

    /// The type of a message passed between the automata. An automaton may
    /// expect any number of messages, including several from the same peer
    /// or from itself.
    type Message;

    /// The type of the value yielded by this automaton, generally the
    /// automaton itself advanced to its next state.
    type Value;

    /// Return the key to uniquely identify this automaton within the group.
    fn key(&self) -> Self::Key;

    /// Return a list of messages to be sent to peers.
    fn messages(&self) -> Vec<(Self::Key, Self::Message)>;

    /// Receive and store a message from a peer. The automaton takes
    /// ownership of the message until the executor calls `value`. This
    /// method is invoked once by the executor for each incoming message.
    fn receive(&mut self, message: Self::Message);

    /// Return whether all incoming messages have arrived. An automaton
    /// expecting no messages must report `Eligible` from the start.
    fn status(&self) -> Status;

    /// Run the task. CPU-intensive work should be done in this method only.
    /// It may be called on a worker thread.
    fn value(self) -> Self::Value;
}

/// Execute a group of tasks in serial, on the calling thread. Values are
/// yielded in the order the tasks become eligible.
///
pub fn execute<I, A, K, V>(stage: I) -> impl Iterator<Item = V>
where
    I: IntoIterator<Item = A>,
    A: Automaton<Key = K, Value = V>,
    K: Hash + Eq,
{
    let (eligible_sink, eligible_source) = crossbeam_channel::unbounded();

    coordinate(stage, eligible_sink);

    eligible_source.into_iter().map(|peer: A| peer.value())
}

/// Execute a group of tasks in parallel. Tasks are spawned into the given
/// Rayon scope. A coordinator delivers messages between tasks as they are
/// yielded by the `flow` iterator, and hands each task to a dispatcher once
/// it has received all of its messages. The dispatcher moves tasks into the
/// Rayon thread pool for evaluation and delivers their values into the
/// output channel. The returned iterator yields values as they are computed,
/// in no particular order, and ends once every task has been evaluated.
///
/// _Note_: There must be at least two threads in the Rayon thread pool,
/// because the coordinator and dispatcher need to run at the same time.
///
pub fn execute_par<'a, I, A, K, V>(scope: &rayon::Scope<'a>, flow: I) -> impl Iterator<Item = V>
where
    I: IntoIterator<Item = A>,
    A: Send + Automaton<Key = K, Value = V> + 'a,
    K: Hash + Eq,
    V: Send + 'a,
{
    use rayon::prelude::*;

    assert!{
        rayon::current_num_threads() >= 2,
        "automaton::execute_par requires at least two threads to be running"
    };

    let (eligible_sink, eligible_source) = crossbeam_channel::unbounded();
    let (computed_sink, computed_source) = crossbeam_channel::unbounded();

    scope.spawn(move |_| {
        eligible_source
            .into_iter()
            .par_bridge()
            .for_each_with(computed_sink, |sink, peer: A| {
                sink.send(peer.value()).expect("result receiver dropped")
            })
    });

    coordinate(flow, eligible_sink);
    computed_source.into_iter()
}

/// Deliver messages among the automata of a flow, and send each one into
/// `eligible` as soon as it has everything it needs. Messages addressed to
/// an automaton not yet seen are held until it arrives. Panics if, after the
/// flow is exhausted, some automaton is still waiting on messages.
///
fn coordinate<I, A, K, V>(flow: I, eligible: crossbeam_channel::Sender<A>)
where
    I: IntoIterator<Item = A>,
    A: Automaton<Key = K, Value = V>,
    K: Hash + Eq,
{
    let mut seen: HashMap<K, A> = HashMap::new();
    let mut undelivered = Vec::new();

    for mut a in flow {
        for (dest, data) in a.messages() {
            match seen.entry(dest) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().receive(data);

                    if entry.get().status().is_eligible() {
                        eligible.send(entry.remove()).expect("eligible receiver dropped")
                    }
                }
                Entry::Vacant(none) => undelivered.push((none.into_key(), data)),
            }
        }

        // Deliver messages addressed to A that arrived before it did,
        // including the ones it just sent to itself.
        let dest = a.key();
        let mut i = 0;
        while i != undelivered.len() {
            if undelivered[i].0 == dest {
                a.receive(undelivered.remove(i).1);
            } else {
                i += 1;
            }
        }

        if a.status().is_eligible() {
            eligible.send(a).expect("eligible receiver dropped");
        } else {
            seen.insert(dest, a);
        }
    }

    assert!(
        seen.is_empty() && undelivered.is_empty(),
        "{} automata never became eligible and {} messages were never delivered",
        seen.len(),
        undelivered.len()
    );
}
