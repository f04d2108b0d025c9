//! Named-state machine with ordered, predicate-guarded transitions.
//!
//! Transitions out of a state are checked in the order they were added and
//! the first one whose predicate holds wins. Predicates only read the
//! context; the change hook is where entering a state mutates anything.
//! A transition back into the same state is a real change and fires the
//! hook with `current == previous`.
//!
//! ```ignore
//! let machine = StateMachine::builder()
//!     .states(Phase::ALL.iter().copied())
//!     .initial_state(Phase::Stand)
//!     .transition(Phase::Stand, Phase::Attack, |ctx: &Ctx| ctx.stand_done)
//!     .transition(Phase::Attack, Phase::Stand, |ctx: &Ctx| ctx.attack_done)
//!     .on_change_state(|current, previous, ctx: &mut Ctx| ctx.entered(current, previous))
//!     .build()?;
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use bevy::prelude::*;

use super::error::ConfigError;

/// A closed set of states usable as machine states and table keys.
pub trait StateId: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every state, in declaration order. `ALL[s.index()] == s`.
    const ALL: &'static [Self];

    fn index(self) -> usize;

    /// Stable lowercase name, also used as the animation key.
    fn name(self) -> &'static str;
}

/// Guard evaluated against the owner's context.
pub type Predicate<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// Called as `hook(current, previous, ctx)` after every change.
pub type ChangeHook<S, C> = Box<dyn FnMut(S, S, &mut C) + Send + Sync>;

struct Transition<S, C> {
    to: S,
    predicate: Predicate<C>,
}

/// One value per state of `S`, stored by index.
pub struct PerState<S: StateId, T> {
    slots: Vec<Option<T>>,
    _states: std::marker::PhantomData<S>,
}

impl<S: StateId, T> Default for PerState<S, T> {
    fn default() -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(S::ALL.len()).collect(),
            _states: std::marker::PhantomData,
        }
    }
}

impl<S: StateId, T> PerState<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, state: S, value: T) -> Self {
        self.insert(state, value);
        self
    }

    pub fn insert(&mut self, state: S, value: T) -> Option<T> {
        self.slots[state.index()].replace(value)
    }

    pub fn get(&self, state: S) -> Option<&T> {
        self.slots[state.index()].as_ref()
    }

    pub fn get_mut(&mut self, state: S) -> Option<&mut T> {
        self.slots[state.index()].as_mut()
    }

    pub fn contains(&self, state: S) -> bool {
        self.slots[state.index()].is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (S, &T)> {
        S::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(state, slot)| slot.as_ref().map(|value| (*state, value)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (S, &mut T)> {
        S::ALL
            .iter()
            .zip(self.slots.iter_mut())
            .filter_map(|(state, slot)| slot.as_mut().map(|value| (*state, value)))
    }
}

/// The machine itself. Always has a current state.
pub struct StateMachine<S: StateId, C> {
    initial: S,
    current: S,
    previous: Option<S>,
    transitions: Vec<Vec<Transition<S, C>>>,
    on_change: Option<ChangeHook<S, C>>,
}

impl<S: StateId, C> StateMachine<S, C> {
    /// A machine sitting in `initial` with no transitions.
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            current: initial,
            previous: None,
            transitions: std::iter::repeat_with(Vec::new).take(S::ALL.len()).collect(),
            on_change: None,
        }
    }

    pub fn builder() -> StateMachineBuilder<S, C> {
        StateMachineBuilder::default()
    }

    /// Appends a transition after the ones already added for `from`.
    pub fn add_transition(
        &mut self,
        from: S,
        to: S,
        predicate: impl Fn(&C) -> bool + Send + Sync + 'static,
    ) {
        self.transitions[from.index()].push(Transition {
            to,
            predicate: Box::new(predicate),
        });
    }

    pub fn set_on_change_state(&mut self, hook: impl FnMut(S, S, &mut C) + Send + Sync + 'static) {
        self.on_change = Some(Box::new(hook));
    }

    /// Takes the hook out so an owner can wrap it.
    pub fn take_on_change_state(&mut self) -> Option<ChangeHook<S, C>> {
        self.on_change.take()
    }

    /// Back to the initial state without firing the hook.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.previous = None;
    }

    /// Evaluates the current state's transitions and takes the first that holds.
    pub fn update(&mut self, ctx: &mut C) -> S {
        let from = self.current;
        let Some(to) = self.transitions[from.index()]
            .iter()
            .find(|transition| (transition.predicate)(ctx))
            .map(|transition| transition.to)
        else {
            return from;
        };

        self.previous = Some(from);
        self.current = to;
        debug!("state change: {} -> {}", from.name(), to.name());

        if let Some(hook) = self.on_change.as_mut() {
            hook(to, from, ctx);
        }
        to
    }

    pub fn current(&self) -> S {
        self.current
    }

    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    pub fn initial(&self) -> S {
        self.initial
    }
}

/// Collects states and transitions, then validates them in [`build`](Self::build).
pub struct StateMachineBuilder<S: StateId, C> {
    initial: Option<S>,
    states: Vec<S>,
    terminal: Vec<S>,
    transitions: Vec<(S, S, Predicate<C>)>,
    on_change: Option<ChangeHook<S, C>>,
}

impl<S: StateId, C> Default for StateMachineBuilder<S, C> {
    fn default() -> Self {
        Self {
            initial: None,
            states: Vec::new(),
            terminal: Vec::new(),
            transitions: Vec::new(),
            on_change: None,
        }
    }
}

impl<S: StateId, C> StateMachineBuilder<S, C> {
    pub fn state(mut self, state: S) -> Self {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
        self
    }

    pub fn states(self, states: impl IntoIterator<Item = S>) -> Self {
        states.into_iter().fold(self, Self::state)
    }

    pub fn initial_state(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Allows `state` to have no outgoing transitions.
    pub fn terminal(mut self, state: S) -> Self {
        self.terminal.push(state);
        self
    }

    pub fn transition(
        mut self,
        from: S,
        to: S,
        predicate: impl Fn(&C) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.transitions.push((from, to, Box::new(predicate)));
        self
    }

    pub fn on_change_state(mut self, hook: impl FnMut(S, S, &mut C) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Result<StateMachine<S, C>, ConfigError> {
        let initial = self.initial.ok_or(ConfigError::MissingInitialState)?;
        if !self.states.contains(&initial) {
            return Err(ConfigError::UnregisteredState(initial.name()));
        }

        let mut machine = StateMachine::new(initial);

        for (from, to, predicate) in self.transitions {
            for state in [from, to] {
                if !self.states.contains(&state) {
                    return Err(ConfigError::UnregisteredState(state.name()));
                }
            }
            machine.transitions[from.index()].push(Transition { to, predicate });
        }

        if let Some(state) = self.states.iter().copied().find(|state| {
            machine.transitions[state.index()].is_empty() && !self.terminal.contains(state)
        }) {
            return Err(ConfigError::NoTransitions(state.name()));
        }

        machine.on_change = self.on_change;
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Node {
        A,
        B,
        C,
        D,
    }

    impl StateId for Node {
        const ALL: &'static [Self] = &[Node::A, Node::B, Node::C, Node::D];

        fn index(self) -> usize {
            self as usize
        }

        fn name(self) -> &'static str {
            match self {
                Node::A => "a",
                Node::B => "b",
                Node::C => "c",
                Node::D => "d",
            }
        }
    }

    #[derive(Default)]
    struct Ctx {
        go_b: bool,
        go_c: bool,
        counter: u32,
        changes: Vec<(Node, Node)>,
    }

    fn record(current: Node, previous: Node, ctx: &mut Ctx) {
        ctx.changes.push((current, previous));
    }

    fn loop_machine() -> StateMachine<Node, Ctx> {
        StateMachine::builder()
            .states([Node::A, Node::B, Node::C])
            .initial_state(Node::A)
            .transition(Node::A, Node::B, |_: &Ctx| true)
            .transition(Node::B, Node::C, |_: &Ctx| true)
            .transition(Node::C, Node::A, |_: &Ctx| true)
            .on_change_state(record)
            .build()
            .unwrap()
    }

    #[test]
    fn always_true_transitions_loop() {
        let mut machine = loop_machine();
        let mut ctx = Ctx::default();

        assert_eq!(machine.update(&mut ctx), Node::B);
        assert_eq!(machine.update(&mut ctx), Node::C);
        assert_eq!(machine.update(&mut ctx), Node::A);
        assert_eq!(machine.update(&mut ctx), Node::B);
        assert_eq!(ctx.changes.len(), 4);
        assert_eq!(ctx.changes[2], (Node::A, Node::C));
    }

    #[test]
    fn branches_follow_context() {
        let mut machine = StateMachine::builder()
            .states([Node::A, Node::B, Node::C])
            .initial_state(Node::A)
            .transition(Node::A, Node::B, |c: &Ctx| c.go_b)
            .transition(Node::A, Node::C, |c: &Ctx| c.go_c)
            .transition(Node::B, Node::A, |_: &Ctx| true)
            .transition(Node::C, Node::A, |_: &Ctx| true)
            .build()
            .unwrap();

        let mut ctx = Ctx {
            go_c: true,
            ..Default::default()
        };
        assert_eq!(machine.update(&mut ctx), Node::C);
        assert_eq!(machine.update(&mut ctx), Node::A);

        ctx.go_c = false;
        ctx.go_b = true;
        assert_eq!(machine.update(&mut ctx), Node::B);
    }

    #[test]
    fn first_true_predicate_wins() {
        let mut machine = StateMachine::builder()
            .states([Node::A, Node::B, Node::C])
            .initial_state(Node::A)
            .transition(Node::A, Node::C, |_: &Ctx| true)
            .transition(Node::A, Node::B, |_: &Ctx| true)
            .terminal(Node::B)
            .terminal(Node::C)
            .build()
            .unwrap();

        assert_eq!(machine.update(&mut Ctx::default()), Node::C);
    }

    #[test]
    fn no_valid_transition_keeps_state_and_skips_hook() {
        let mut machine = StateMachine::builder()
            .states([Node::A, Node::B])
            .initial_state(Node::A)
            .transition(Node::A, Node::B, |c: &Ctx| c.go_b)
            .transition(Node::B, Node::A, |_: &Ctx| true)
            .on_change_state(record)
            .build()
            .unwrap();

        let mut ctx = Ctx::default();
        for _ in 0..3 {
            assert_eq!(machine.update(&mut ctx), Node::A);
        }
        assert!(ctx.changes.is_empty());
        assert_eq!(machine.previous(), None);
    }

    #[test]
    fn self_transition_fires_hook() {
        let mut machine = StateMachine::builder()
            .state(Node::A)
            .initial_state(Node::A)
            .transition(Node::A, Node::A, |c: &Ctx| c.counter < 2)
            .on_change_state(|current, previous, ctx: &mut Ctx| {
                ctx.counter += 1;
                ctx.changes.push((current, previous));
            })
            .build()
            .unwrap();

        let mut ctx = Ctx::default();
        machine.update(&mut ctx);
        machine.update(&mut ctx);
        machine.update(&mut ctx);
        assert_eq!(ctx.changes, vec![(Node::A, Node::A), (Node::A, Node::A)]);
    }

    #[test]
    fn predicates_can_read_changing_context() {
        let mut machine = StateMachine::builder()
            .states([Node::A, Node::B])
            .initial_state(Node::A)
            .transition(Node::A, Node::B, |c: &Ctx| c.counter >= 3)
            .transition(Node::B, Node::A, |c: &Ctx| c.counter == 0)
            .build()
            .unwrap();

        let mut ctx = Ctx::default();
        while machine.current() == Node::A {
            ctx.counter += 1;
            machine.update(&mut ctx);
        }
        assert_eq!(ctx.counter, 3);
    }

    #[test]
    fn reset_returns_to_initial_without_hook() {
        let mut machine = loop_machine();
        let mut ctx = Ctx::default();
        machine.update(&mut ctx);
        machine.reset();
        assert_eq!(machine.current(), Node::A);
        assert_eq!(ctx.changes.len(), 1);
    }

    #[test]
    fn configuration_mistakes_are_rejected() {
        let missing_initial = StateMachine::<Node, Ctx>::builder().state(Node::A).build();
        assert_eq!(missing_initial.err(), Some(ConfigError::MissingInitialState));

        let unregistered = StateMachine::<Node, Ctx>::builder()
            .state(Node::A)
            .initial_state(Node::A)
            .transition(Node::A, Node::D, |_: &Ctx| true)
            .build();
        assert_eq!(unregistered.err(), Some(ConfigError::UnregisteredState("d")));

        let dead_end = StateMachine::<Node, Ctx>::builder()
            .states([Node::A, Node::B])
            .initial_state(Node::A)
            .transition(Node::A, Node::B, |_: &Ctx| true)
            .build();
        assert_eq!(dead_end.err(), Some(ConfigError::NoTransitions("b")));
    }

    #[test]
    fn per_state_table_is_indexed_by_state() {
        let table = PerState::<Node, u32>::new().with(Node::C, 7).with(Node::A, 1);
        assert_eq!(table.get(Node::C), Some(&7));
        assert!(!table.contains(Node::B));
        let keys: Vec<Node> = table.iter().map(|(s, _)| s).collect();
        assert_eq!(keys, vec![Node::A, Node::C]);
    }
}
