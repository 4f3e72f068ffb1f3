//! Template workflow engine — from a recorded conversation to a
//! parameterized template.
//!
//! # Architecture
//!
//! ```text
//! transcript ──► StepStore ──► VariableRegistry (seeded from placeholders)
//!                    │                │
//!               edit / rename / delete (kept in sync)
//!                    │                │
//!                    └── TemplateBuilder::build() ──► validator ──► TemplateSubmitter
//!                                            │
//!                                         render(values)
//! ```

pub mod builder;
pub mod registry;
pub mod render;
pub mod steps;
pub mod validator;

pub use builder::TemplateBuilder;
pub use registry::VariableRegistry;
pub use render::{render, RenderedStep};
pub use steps::StepStore;
pub use validator::{is_valid, validate, Violation};
