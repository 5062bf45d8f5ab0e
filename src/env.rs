/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent.
/// Agents in this crate never drive an environment themselves, a training loop owns both
/// and passes transitions between them.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Update the environment in response to an action taken by an agent, producing a new state and associated reward
    ///
    /// **Returns** `(next_state, reward)`, where `next_state` is `None` once the episode is over
    fn step(&mut self, action: Self::Action) -> (Option<Self::State>, f32);

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;

    /// Sample an action uniformly from the action space
    fn random_action(&mut self) -> Self::Action;
}

/// An environment with a finite set of actions
pub trait DiscreteActionSpace: Environment {
    /// Get the available actions for the current state
    ///
    /// The returned vector should never be empty.
    fn actions(&self) -> Vec<Self::Action>;
}
