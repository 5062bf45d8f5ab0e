use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{Display, VariantArray};

use crate::env::{DiscreteActionSpace, Environment};

/// Number of encoded states, see [`Taxi::encode`]
pub const N_STATES: usize = 500;

/// Number of actions, one per [`TaxiAction`] variant
pub const N_ACTIONS: usize = 6;

/// Episodes are cut off after this many steps
pub const MAX_STEPS: u32 = 200;

/// Passenger index meaning the passenger is riding in the taxi
pub const IN_TAXI: usize = 4;

const SIZE: usize = 5;

const MAP: [&[u8]; 7] = [
    b"+---------+",
    b"|R: | : :G|",
    b"| : | : : |",
    b"| : : : : |",
    b"| | : | : |",
    b"|Y| : |B: |",
    b"+---------+",
];

/// Grid coordinates `(row, col)` of the R, G, Y and B landmarks
pub const LOCATIONS: [(usize, usize); 4] = [(0, 0), (0, 4), (4, 0), (4, 3)];

#[derive(Display, VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum TaxiAction {
    South = 0,
    North = 1,
    East = 2,
    West = 3,
    Pickup = 4,
    Dropoff = 5,
}

impl TaxiAction {
    /// Look up the action with the given index
    pub fn from_index(ix: usize) -> Option<Self> {
        Self::VARIANTS.get(ix).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The taxi problem from Python [gymnasium](https://gymnasium.farama.org/environments/toy_text/taxi/)
///
/// A taxi on a 5x5 grid with walls must pick up a passenger waiting at one of four landmarks
/// and drop them off at another. Every step costs 1, an illegal pickup or dropoff costs 10,
/// and a successful dropoff earns 20 and ends the episode.
///
/// States are encoded as integers in `0..500`, see [`Taxi::encode`].
pub struct Taxi {
    row: usize,
    col: usize,
    passenger: usize,
    destination: usize,
    steps: u32,
    rng: StdRng,
}

impl Taxi {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a taxi environment whose episodes are reproducible from `seed`
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut env = Self {
            row: 0,
            col: 0,
            passenger: 0,
            destination: 1,
            steps: 0,
            rng,
        };
        env.reset();
        env
    }

    /// Pack a taxi position, passenger index and destination index into a state
    pub fn encode(row: usize, col: usize, passenger: usize, destination: usize) -> usize {
        ((row * SIZE + col) * (LOCATIONS.len() + 1) + passenger) * LOCATIONS.len() + destination
    }

    /// Unpack a state into `(row, col, passenger, destination)`
    pub fn decode(state: usize) -> (usize, usize, usize, usize) {
        let destination = state % LOCATIONS.len();
        let state = state / LOCATIONS.len();
        let passenger = state % (LOCATIONS.len() + 1);
        let state = state / (LOCATIONS.len() + 1);
        (state / SIZE, state % SIZE, passenger, destination)
    }

    /// The current encoded state
    pub fn state(&self) -> usize {
        Self::encode(self.row, self.col, self.passenger, self.destination)
    }

    fn drive(&mut self, action: TaxiAction) {
        let (row, col) = (self.row, self.col);
        match action {
            TaxiAction::South => self.row = (row + 1).min(SIZE - 1),
            TaxiAction::North => self.row = row.saturating_sub(1),
            TaxiAction::East if MAP[1 + row][2 * col + 2] == b':' => self.col = col + 1,
            TaxiAction::West if MAP[1 + row][2 * col] == b':' => self.col = col - 1,
            _ => {}
        }
    }
}

impl Default for Taxi {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Taxi {
    type State = usize;
    type Action = TaxiAction;

    fn step(&mut self, action: Self::Action) -> (Option<Self::State>, f32) {
        self.steps += 1;

        let taxi = (self.row, self.col);
        let mut reward = -1.0;
        let mut delivered = false;

        match action {
            TaxiAction::Pickup => {
                if self.passenger != IN_TAXI && taxi == LOCATIONS[self.passenger] {
                    self.passenger = IN_TAXI;
                } else {
                    reward = -10.0;
                }
            }
            TaxiAction::Dropoff => {
                let landmark = LOCATIONS.iter().position(|&loc| loc == taxi);
                match landmark {
                    Some(ix) if self.passenger == IN_TAXI && ix == self.destination => {
                        self.passenger = ix;
                        delivered = true;
                        reward = 20.0;
                    }
                    Some(ix) if self.passenger == IN_TAXI => self.passenger = ix,
                    _ => reward = -10.0,
                }
            }
            _ => self.drive(action),
        }

        if delivered || self.steps >= MAX_STEPS {
            (None, reward)
        } else {
            (Some(self.state()), reward)
        }
    }

    fn reset(&mut self) -> Self::State {
        self.row = self.rng.gen_range(0..SIZE);
        self.col = self.rng.gen_range(0..SIZE);
        self.passenger = self.rng.gen_range(0..LOCATIONS.len());
        // Draw the destination from the three other landmarks
        let destination = self.rng.gen_range(0..LOCATIONS.len() - 1);
        self.destination = if destination >= self.passenger {
            destination + 1
        } else {
            destination
        };
        self.steps = 0;

        log::debug!(
            "Taxi reset: taxi at ({}, {}), passenger at {}, destination {}",
            self.row,
            self.col,
            self.passenger,
            self.destination
        );

        self.state()
    }

    fn random_action(&mut self) -> Self::Action {
        TaxiAction::VARIANTS[self.rng.gen_range(0..N_ACTIONS)]
    }
}

impl DiscreteActionSpace for Taxi {
    fn actions(&self) -> Vec<Self::Action> {
        TaxiAction::VARIANTS.to_vec()
    }
}
