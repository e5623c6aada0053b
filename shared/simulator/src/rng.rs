pub use rand_chacha::ChaCha8Rng as SeededRng;

pub fn new_rng(seed: u32) -> SeededRng {
    rand_seeder::Seeder::from(seed).make_rng()
}

/// Independent stream for one agent, so adding an agent doesn't shift the
/// random draws of the others.
pub fn agent_rng(seed: u32, rank: usize) -> SeededRng {
    rand_seeder::Seeder::from((seed, rank as u64)).make_rng()
}
