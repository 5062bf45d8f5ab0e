use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    check_interval,
    ds::QTable,
    error::ConfigError,
    exploration::{Choice, EpsilonGreedy},
    util::argmax,
};

use super::Hashable;

/// Configuration for the [`ExpectedSarsaAgent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedSarsaConfig {
    /// Number of discrete actions, indexed `0..n_actions`
    ///
    /// **Default**: `6`
    pub n_actions: usize,
    /// Exploration rate of the epsilon greedy policy, in `[0,1]`
    ///
    /// **Default**: `0.001`
    pub epsilon: f32,
    /// Discount factor, in `[0,1]`
    ///
    /// **Default**: `1.0`
    pub gamma: f32,
    /// Learning rate, in `(0,1]`
    ///
    /// **Default**: `0.1`
    pub alpha: f32,
}

impl Default for ExpectedSarsaConfig {
    fn default() -> Self {
        Self {
            n_actions: 6,
            epsilon: 0.001,
            gamma: 1.0,
            alpha: 0.1,
        }
    }
}

/// A tabular expected SARSA agent
///
/// The agent keeps one row of action values per visited state and acts epsilon greedily with
/// respect to it. After every transition the value of the action taken is moved toward
/// the one-step target
///
/// R + γ Σ<sub>a</sub> π(a|S') Q(S', a)
///
/// where π is the epsilon greedy policy itself. Terminal transitions use R alone.
///
/// The agent only decides and learns. The environment and the episode loop belong to the caller:
/// ```ignore
/// let action = agent.select_action(state);
/// let (next_state, reward, done) = env.step(action);
/// agent.step(state, action, reward, next_state, done);
/// ```
///
/// ### Generics
/// - `S` - The state type, used as a key in the Q table
/// - `R` - The random number generator driving exploration
#[derive(Debug, Clone)]
pub struct ExpectedSarsaAgent<S, R = StdRng> {
    q_table: QTable<S>,
    exploration: EpsilonGreedy,
    alpha: f32,
    gamma: f32,
    rng: R,
}

impl<S: Hashable> ExpectedSarsaAgent<S, StdRng> {
    /// Initialize a new agent with an entropy seeded random number generator
    pub fn new(config: ExpectedSarsaConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Initialize a new agent whose exploration is reproducible from `seed`
    pub fn seeded(config: ExpectedSarsaConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<S: Hashable, R: Rng> ExpectedSarsaAgent<S, R> {
    /// Initialize a new agent drawing its random numbers from `rng`
    ///
    /// **Errors** if `n_actions` is zero, if `epsilon` or `gamma` is not in the interval `[0,1]`,
    /// or if `alpha` is not in the interval `(0,1]`
    pub fn with_rng(config: ExpectedSarsaConfig, rng: R) -> Result<Self, ConfigError> {
        let ExpectedSarsaConfig {
            n_actions,
            epsilon,
            gamma,
            alpha,
        } = config;

        if n_actions == 0 {
            return Err(ConfigError::EmptyActionSpace);
        }
        check_interval!(gamma, 0.0, 1.0);
        check_interval!(alpha, > 0.0, 1.0);
        let exploration = EpsilonGreedy::new(epsilon)?;

        log::debug!(
            "Expected SARSA agent: n_actions={n_actions}, epsilon={epsilon}, gamma={gamma}, alpha={alpha}"
        );

        Ok(Self {
            q_table: QTable::new(n_actions),
            exploration,
            alpha,
            gamma,
            rng,
        })
    }

    pub fn n_actions(&self) -> usize {
        self.q_table.n_actions()
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon()
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn q_table(&self) -> &QTable<S> {
        &self.q_table
    }

    /// Choose an action for `state` with the epsilon greedy policy
    ///
    /// Exploiting picks the highest valued action (the lowest index on ties) and allocates a
    /// row for `state` if it has none. Exploring picks uniformly from all actions.
    ///
    /// **Returns** an action in `0..n_actions`
    pub fn select_action(&mut self, state: S) -> usize {
        match self.exploration.choose(&mut self.rng) {
            Choice::Explore => self.rng.gen_range(0..self.q_table.n_actions()),
            Choice::Exploit => argmax(self.q_table.row(state)),
        }
    }

    /// The epsilon greedy distribution over a row of action values
    ///
    /// **Panics** if `q_state` does not hold exactly `n_actions` values
    pub fn get_probs(&self, q_state: &[f32]) -> Vec<f32> {
        assert_eq!(
            q_state.len(),
            self.n_actions(),
            "Expected one value per action"
        );
        self.exploration.probs(q_state)
    }

    /// Learn from one transition, moving Q(`state`, `action`) toward the expected SARSA target
    ///
    /// When `done` is set the target is `reward` alone and `next_state` is not looked up.
    ///
    /// **Panics** if `action` is not in `0..n_actions`
    pub fn step(&mut self, state: S, action: usize, reward: f32, next_state: S, done: bool) {
        assert!(action < self.n_actions(), "Invalid action: {action}");

        let mut target = reward;
        if !done {
            target += self.gamma * self.exploration.expected_value(self.q_table.row(next_state));
        }

        let q_value = &mut self.q_table.row_mut(state)[action];
        let td_error = target - *q_value;
        *q_value += self.alpha * td_error;

        log::trace!("Q update: action={action}, target={target}, td_error={td_error}");
    }

    /// The greedy action of every state in the table
    pub fn greedy_policy(&self) -> HashMap<S, usize> {
        self.q_table
            .iter()
            .map(|(&state, row)| (state, argmax(row)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    use super::*;

    const TOLERANCE: f32 = 1e-6;

    fn agent(config: ExpectedSarsaConfig) -> ExpectedSarsaAgent<u32> {
        ExpectedSarsaAgent::seeded(config, 0).unwrap()
    }

    fn greedy_config() -> ExpectedSarsaConfig {
        ExpectedSarsaConfig {
            epsilon: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn default_config() {
        let agent = agent(ExpectedSarsaConfig::default());
        assert_eq!(agent.n_actions(), 6);
        assert_eq!(agent.epsilon(), 0.001);
        assert_eq!(agent.gamma(), 1.0);
        assert_eq!(agent.alpha(), 0.1);
        assert!(agent.q_table().is_empty(), "Table starts empty");
    }

    #[test]
    fn invalid_config_rejected() {
        let new = |config| ExpectedSarsaAgent::<u32>::seeded(config, 0).map(|_| ());

        assert_eq!(
            new(ExpectedSarsaConfig {
                n_actions: 0,
                ..Default::default()
            }),
            Err(ConfigError::EmptyActionSpace)
        );
        assert_eq!(
            new(ExpectedSarsaConfig {
                alpha: 0.0,
                ..Default::default()
            }),
            Err(ConfigError::OutOfRange {
                name: "alpha",
                value: 0.0,
                range: "(0.0, 1.0]",
            })
        );
        assert_eq!(
            new(ExpectedSarsaConfig {
                gamma: 1.01,
                ..Default::default()
            }),
            Err(ConfigError::OutOfRange {
                name: "gamma",
                value: 1.01,
                range: "[0.0, 1.0]",
            })
        );
        assert!(new(ExpectedSarsaConfig {
            epsilon: -0.5,
            ..Default::default()
        })
        .is_err());
        assert!(new(ExpectedSarsaConfig {
            gamma: f32::NAN,
            ..Default::default()
        })
        .is_err());
        assert!(new(ExpectedSarsaConfig {
            n_actions: 1,
            epsilon: 1.0,
            gamma: 0.0,
            alpha: 1.0,
        })
        .is_ok());
    }

    #[test]
    fn terminal_step() {
        let mut agent = agent(ExpectedSarsaConfig::default());
        agent.step(0, 2, 1.0, 1, true);

        assert_eq!(
            agent.q_table().get(&0),
            Some(&[0.0, 0.0, 0.1, 0.0, 0.0, 0.0][..]),
            "Only the taken action moves, by alpha * reward"
        );
        assert_eq!(agent.q_table().get(&1), None, "Terminal step skips the lookahead");
    }

    #[test]
    fn nonterminal_step_with_zero_lookahead() {
        let mut agent = agent(ExpectedSarsaConfig::default());
        agent.step(0, 2, 1.0, 1, false);

        assert_eq!(
            agent.q_table().get(&0),
            Some(&[0.0, 0.0, 0.1, 0.0, 0.0, 0.0][..]),
            "Zero next state values leave the target at the reward"
        );
        assert_eq!(
            agent.q_table().get(&1),
            Some(&[0.0; 6][..]),
            "Lookahead allocates the next state"
        );
    }

    #[test]
    fn nonterminal_step_uses_expected_value() {
        let mut agent = agent(ExpectedSarsaConfig {
            n_actions: 2,
            epsilon: 0.5,
            gamma: 0.9,
            alpha: 0.5,
        });
        agent.step(1, 0, 4.0, 1, true);
        assert_eq!(agent.q_table().get(&1), Some(&[2.0, 0.0][..]));

        // π(.|1) = [0.75, 0.25], so the expected next value is 1.5
        agent.step(0, 1, 1.0, 1, false);
        let target = 1.0 + 0.9 * 1.5;
        let q = agent.q_table().get(&0).unwrap()[1];
        assert!((q - 0.5 * target).abs() < TOLERANCE, "Q moved halfway to the target");
    }

    #[test]
    fn terminal_step_ignores_next_state() {
        let mut agent = agent(ExpectedSarsaConfig {
            alpha: 1.0,
            ..Default::default()
        });
        agent.step(1, 3, 10.0, 1, true);
        agent.step(0, 0, -1.0, 1, true);
        assert_eq!(agent.q_table().get(&0).unwrap()[0], -1.0, "Target is the reward alone");

        agent.step(0, 0, -1.0, 1, false);
        assert!(
            agent.q_table().get(&0).unwrap()[0] > 8.0,
            "Nonterminal target includes the next state value"
        );
    }

    #[test]
    fn repeated_steps_converge_geometrically() {
        let mut agent = agent(ExpectedSarsaConfig::default());
        for k in 1..=50 {
            agent.step(7, 1, 1.0, 8, true);
            let q = agent.q_table().get(&7).unwrap()[1];
            let gap = 0.9f32.powi(k);
            assert!((1.0 - q - gap).abs() < 1e-5, "Gap shrinks by 1 - alpha each step");
        }
    }

    #[test]
    #[should_panic(expected = "Invalid action")]
    fn step_rejects_invalid_action() {
        let mut agent = agent(ExpectedSarsaConfig::default());
        agent.step(0, 6, 0.0, 1, true);
    }

    #[test]
    fn select_action_in_range() {
        let mut agent = agent(ExpectedSarsaConfig {
            epsilon: 0.5,
            ..Default::default()
        });
        for state in 0..100 {
            agent.step(state, (state % 6) as usize, state as f32, state + 1, false);
        }
        for state in 0..200 {
            assert!(agent.select_action(state) < 6, "Action is valid");
        }
    }

    #[test]
    fn greedy_selection_is_deterministic() {
        let mut agent = agent(greedy_config());
        assert_eq!(agent.select_action(0), 0, "Fresh state resolves ties to action 0");

        agent.step(0, 4, 1.0, 0, true);
        for _ in 0..1000 {
            assert_eq!(agent.select_action(0), 4, "Always the argmax");
        }

        agent.step(0, 2, 1.0, 0, true);
        assert_eq!(agent.select_action(0), 2, "Ties resolve to the lowest index");
    }

    #[test]
    fn select_action_table_side_effects() {
        let mut explorer = agent(ExpectedSarsaConfig {
            epsilon: 1.0,
            ..Default::default()
        });
        explorer.select_action(5);
        assert!(explorer.q_table().is_empty(), "Exploring does not touch the table");

        let mut exploiter = agent(greedy_config());
        exploiter.select_action(5);
        assert_eq!(exploiter.q_table().get(&5), Some(&[0.0; 6][..]), "Exploiting allocates");
    }

    #[test]
    fn exploration_is_uniform() {
        let mut agent = agent(ExpectedSarsaConfig {
            epsilon: 1.0,
            ..Default::default()
        });
        agent.step(0, 5, 100.0, 0, true);

        let n = 60_000;
        let mut counts = [0usize; 6];
        for _ in 0..n {
            counts[agent.select_action(0)] += 1;
        }

        let expected = n as f64 / 6.0;
        let statistic: f64 = counts
            .iter()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum();
        let critical = ChiSquared::new(5.0).unwrap().inverse_cdf(0.999);
        assert!(
            statistic < critical,
            "Chi squared statistic {statistic} exceeds {critical}"
        );
    }

    #[test]
    fn seeded_agents_agree() {
        let config = ExpectedSarsaConfig {
            epsilon: 0.5,
            ..Default::default()
        };
        let mut a = ExpectedSarsaAgent::<u32>::seeded(config, 1234).unwrap();
        let mut b = ExpectedSarsaAgent::<u32>::seeded(config, 1234).unwrap();
        for state in 0..500 {
            let action = a.select_action(state % 10);
            assert_eq!(action, b.select_action(state % 10), "Same seed, same choices");
            a.step(state % 10, action, 1.0, (state + 1) % 10, false);
            b.step(state % 10, action, 1.0, (state + 1) % 10, false);
        }
        assert_eq!(a.greedy_policy(), b.greedy_policy());
    }

    #[test]
    fn get_probs_functional() {
        let agent = agent(ExpectedSarsaConfig::default());
        let probs = agent.get_probs(&[0.0, 0.0, 3.0, 1.0, 3.0, -2.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < TOLERANCE);
        assert!((probs[2] - (0.001 / 6.0 + 0.999)).abs() < TOLERANCE);
        assert!((probs[4] - 0.001 / 6.0).abs() < TOLERANCE);
    }

    #[test]
    #[should_panic(expected = "Expected one value per action")]
    fn get_probs_rejects_wrong_length() {
        agent(ExpectedSarsaConfig::default()).get_probs(&[0.0; 4]);
    }

    #[test]
    fn greedy_policy_functional() {
        let mut agent = agent(greedy_config());
        agent.step(0, 3, 1.0, 0, true);
        agent.step(1, 5, -1.0, 1, true);
        agent.step(2, 1, 2.0, 2, true);

        let policy = agent.greedy_policy();
        assert_eq!(policy.len(), 3);
        assert_eq!(policy[&0], 3);
        assert_eq!(policy[&1], 0, "Negative values lose to untried actions");
        assert_eq!(policy[&2], 1);
    }
}
