//! Deployment request configuration
//!
//! Requests are assembled from layered [`DeploySettings`] by the
//! [`ConfigResolver`]:
//!
//! 1. **Global defaults** - `<config_dir>/svn-deploy/config.toml`
//! 2. **Request file** - any TOML, JSON or YAML file passed explicitly
//! 3. **Overrides** - command-line flags
//!
//! # Example
//!
//! ```ignore
//! use deploy_core::config::{ConfigResolver, DeploySettings};
//!
//! let request = ConfigResolver::new()
//!     .with_request_file("deploy.yaml")
//!     .resolve(DeploySettings::default())?;
//! println!("Deploying {}", request.desired.repo_url());
//! ```

mod resolver;
mod settings;

pub use resolver::{ConfigResolver, ResolvedRequest};
pub use settings::DeploySettings;
