// Industry insights: synthesis through the text oracle and the read path.
// Storage lives in `store`; the weekly refresh lives in `jobs`.

pub mod handlers;
pub mod prompts;
pub mod service;
pub mod synthesis;
