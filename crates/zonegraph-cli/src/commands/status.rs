//! Status command.

use anyhow::Result;

use super::Backend;
use crate::output;

/// Print node and relationship counts.
pub async fn execute(backend: &Backend) -> Result<()> {
    let counts = backend.store().counts().await?;
    output::print_counts(&counts);
    Ok(())
}
