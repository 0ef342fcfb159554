//! The two-stage extraction core: deterministic entity scanners, then an
//! LLM refinement pass that reconciles candidates into the fixed schema.

pub mod entities;
pub mod prompts;
pub mod refine;
