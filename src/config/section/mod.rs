//! Configuration section definitions.
//!
//! Each module corresponds to a section in `stagehand.toml`:
//!
//! | Module    | TOML Section | Purpose                                 |
//! |-----------|--------------|-----------------------------------------|
//! | `module`  | `[module]`   | Seed modules, source and staging roots  |
//! | `backend` | `[backend]`  | Backing compiler/dev server             |
//! | `serve`   | `[serve]`    | Development server                      |

mod backend;
mod module;
mod serve;

pub use backend::BackendConfig;
pub use module::ModuleConfig;
pub use serve::ServeConfig;
