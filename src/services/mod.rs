pub mod advisors;
pub mod chat;
pub mod completion;
pub mod development;
pub mod interpreter;
pub mod orchestrator;

pub use advisors::{Advisor, AdvisorAgent};
pub use completion::{CompletionClient, CompletionGateway, GroqClient};
pub use interpreter::{interpret, StructuredResult};
pub use orchestrator::Orchestrator;
