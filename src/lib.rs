mod error;

pub mod config;
pub mod extract;
pub mod model;
pub mod orchestrator;
pub mod providers;
pub mod server;
pub mod types;

pub use config::{Config, Env, ProviderSettings};
pub use error::{Result, VecforgeError};
pub use extract::extract_svg;
pub use model::GenerationModel;
pub use orchestrator::Orchestrator;
pub use providers::{PollPolicy, QwenSvg, WanxImages};
pub use server::{AppState, router};
pub use types::{AssetKind, ErrorReply, GenerateBody, GenerateReply, GeneratedAsset};
