//! `stagehand stage`: one bootstrap, no backing server.

use crate::{backend::Detached, config::StageConfig, log, stage::Session};
use anyhow::{Result, bail};
use std::sync::Arc;

pub fn stage_modules(config: Arc<StageConfig>) -> Result<()> {
    let mut session = Session::new(Arc::clone(&config), Detached::default());
    if !session.bootstrap()? {
        bail!("staging skipped, see messages above");
    }

    log!(
        "stage";
        "{} modules staged into {}",
        session.modules().len(),
        config.module.classes_dir.display()
    );
    for root in session.source_roots().iter() {
        log!("stage"; "source root {}", root.display());
    }
    Ok(())
}
