pub mod engine;
pub mod input;
pub mod layout;
pub mod mode;
pub mod paths;
pub mod request;
pub mod session;
pub mod settings;
pub mod syntax;
pub mod task;
pub mod text;

pub use engine::{Engine, EngineAction};
pub use mode::{Divider, Screen};
pub use request::{Request, RunEntry};
