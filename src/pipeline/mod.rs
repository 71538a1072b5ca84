//! Pipeline stages for financial document analysis.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ summarize ──▶ agents (×4, sequential)
//! (lopdf)    (1 LLM call)   (wrapped in retry)
//! ```
//!
//! 1. [`input`]    : read every page of the uploaded PDF; runs in
//!    `spawn_blocking` because lopdf is synchronous
//! 2. [`summarize`]: one LLM call producing the structured financial brief
//! 3. [`agents`]   : verifier, analyst, advisor, risk assessor over the brief
//! 4. [`retry`]    : rate-limit retry applied by the orchestrator around step 3

pub mod agents;
pub mod input;
pub mod retry;
pub mod summarize;
