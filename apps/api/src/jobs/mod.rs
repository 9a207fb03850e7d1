// Background jobs. The weekly insight refresh is the only one.

pub mod refresh;
pub mod scheduler;
