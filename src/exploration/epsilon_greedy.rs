use rand::Rng;

use crate::{check_interval, error::ConfigError, util::argmax};

use super::Choice;

/// Epsilon greedy exploration policy with a constant exploration rate
///
/// With probability ε the policy explores, otherwise it exploits the action with the highest
/// value. The same rule defines a distribution over actions, see [`probs`](EpsilonGreedy::probs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy
    ///
    /// **Errors** if `epsilon` is not in the interval `[0,1]`
    pub fn new(epsilon: f32) -> Result<Self, ConfigError> {
        check_interval!(epsilon, 0.0, 1.0);
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Invoke epsilon greedy policy, drawing from `rng`
    ///
    /// An ε of exactly `0` always exploits and an ε of exactly `1` always explores.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen_bool(self.epsilon as f64) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// The epsilon greedy distribution over a row of action values
    ///
    /// Every action receives ε / n, and the greedy action (first on ties) additionally
    /// receives 1 - ε.
    ///
    /// **Panics** if `q_values` is empty
    pub fn probs(&self, q_values: &[f32]) -> Vec<f32> {
        let n = q_values.len();
        let mut probs = vec![self.epsilon / n as f32; n];
        probs[argmax(q_values)] += 1.0 - self.epsilon;
        probs
    }

    /// Expected action value when acting with this policy, Σ<sub>a</sub> π(a) Q(a)
    pub fn expected_value(&self, q_values: &[f32]) -> f32 {
        self.probs(q_values)
            .into_iter()
            .zip(q_values)
            .map(|(p, q)| p * q)
            .sum()
    }
}
