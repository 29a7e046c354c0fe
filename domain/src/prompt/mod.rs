//! Prompt domain
//!
//! Templates for the judge, debate, and synthesis prompts the strategies
//! issue.

mod template;

pub use template::PromptTemplate;
