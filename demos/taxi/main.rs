use std::{collections::VecDeque, error::Error, fs, path::Path};

use esarsa::{
    env::Environment,
    gym::{Taxi, TaxiAction},
    ExpectedSarsaAgent, ExpectedSarsaConfig,
};

const NUM_EPISODES: u32 = 20_000;
const WINDOW: usize = 100;

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/taxi");

    let mut env = Taxi::new();
    let mut agent = ExpectedSarsaAgent::new(ExpectedSarsaConfig::default())?;

    fs::create_dir_all(path.join("out"))?;

    let mut wtr = csv::Writer::from_path(path.join("out/rewards.csv"))?;
    wtr.write_record(["episode", "reward"])?;

    let mut window = VecDeque::with_capacity(WINDOW);
    let mut best_average = f32::NEG_INFINITY;

    for episode in 1..=NUM_EPISODES {
        let mut state = env.reset();
        let mut episode_reward = 0.0;

        loop {
            let action = agent.select_action(state);
            let taxi_action = TaxiAction::from_index(action).ok_or("action out of range")?;
            let (next, reward) = env.step(taxi_action);
            episode_reward += reward;

            match next {
                Some(next_state) => {
                    agent.step(state, action, reward, next_state, false);
                    state = next_state;
                }
                None => {
                    agent.step(state, action, reward, state, true);
                    break;
                }
            }
        }

        wtr.write_record([episode.to_string(), episode_reward.to_string()])?;

        if window.len() == WINDOW {
            window.pop_front();
        }
        window.push_back(episode_reward);
        if window.len() == WINDOW {
            let average = window.iter().sum::<f32>() / WINDOW as f32;
            best_average = best_average.max(average);
        }

        if episode % 1000 == 0 {
            println!("Episode {episode}/{NUM_EPISODES} || Best average reward {best_average}");
        }
    }

    wtr.flush()?;

    println!(
        "Visited {} states, best {WINDOW}-episode average reward {best_average}",
        agent.q_table().len()
    );

    Ok(())
}
