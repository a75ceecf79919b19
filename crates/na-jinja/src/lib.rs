//! na-jinja - Package script templating for napp
//!
//! Package scripts are Jinja templates resolved relative to the project
//! root. Rendering is strict: any variable the context does not define is an
//! error rather than an empty string.

pub mod context;
pub mod environment;
pub mod error;

pub use context::ScriptContext;
pub use environment::ScriptEnvironment;
pub use error::{JinjaError, JinjaResult};
