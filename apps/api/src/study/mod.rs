// Study pack generation: normalize input, assemble prompts, call the
// generation service, present the results.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod handlers;
pub mod material;
pub mod pipeline;
pub mod presenter;
pub mod prompt;
pub mod prompts;
