// Sticker Generation Engine
// Implements: fiscal year labels, line fitting, serial numbers, page sequencing,
// the generation run against a page sink, and background jobs for the API.
// The engine is synchronous; async callers go through jobs::JobRegistry.

pub mod fiscal_year;
pub mod handlers;
pub mod jobs;
pub mod orchestrator;
pub mod order;
pub mod output;
pub mod sequencer;
pub mod serial;
pub mod sink;
pub mod text_fit;
pub mod validation;
