// AI cover letters: one oracle call per letter, stored per user.

pub mod generator;
pub mod handlers;
pub mod prompts;
