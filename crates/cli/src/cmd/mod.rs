mod build;
mod clean;
mod info;

pub use build::{BuildArgs, cmd_build};
pub use clean::{CleanArgs, cmd_clean};
pub use info::{InfoArgs, cmd_info};

use clap::ValueEnum;
use cvbuild_core::EngineKind;

/// CLI-facing engine selection, mapped onto the core engine kind.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum EngineChoice {
  #[default]
  Docker,
  Local,
}

impl From<EngineChoice> for EngineKind {
  fn from(choice: EngineChoice) -> Self {
    match choice {
      EngineChoice::Docker => EngineKind::Docker,
      EngineChoice::Local => EngineKind::Local,
    }
  }
}
