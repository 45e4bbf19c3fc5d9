pub mod export;
pub mod gateway;
pub mod gemini;
pub mod normalizer;
pub mod prompts;
pub mod studio;
pub mod workflow;
