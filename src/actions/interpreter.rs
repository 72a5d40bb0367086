use super::{Action, ActionScript};
use crate::renderer::{PageRenderer, RenderError};
use crate::PageError;

impl ActionScript {
    /// Runs the first plan matching `url` against the loaded page
    ///
    /// Actions run strictly in order and the first failure stops the plan.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` - Number of actions executed (0 when no plan matches)
    /// * `Err(PageError::Interaction)` - The failing action and renderer error
    pub async fn execute<R>(&self, url: &str, renderer: &mut R) -> Result<usize, PageError>
    where
        R: PageRenderer + ?Sized,
    {
        let Some(plan) = self.plan_for(url) else {
            return Ok(0);
        };

        tracing::debug!(
            "Running {} action(s) for {} (pattern {})",
            plan.actions.len(),
            url,
            plan.pattern
        );

        for action in &plan.actions {
            run_action(action, renderer)
                .await
                .map_err(|source| PageError::Interaction {
                    action: action.to_string(),
                    source,
                })?;
        }

        Ok(plan.actions.len())
    }
}

/// Runs one action against the renderer
async fn run_action<R>(action: &Action, renderer: &mut R) -> Result<(), RenderError>
where
    R: PageRenderer + ?Sized,
{
    match action {
        Action::Sleep(pause) => {
            tokio::time::sleep(*pause).await;
            Ok(())
        }
        Action::Scroll(pixels) => renderer.scroll(*pixels).await,
        Action::Input { selector, text } => renderer.fill_input(selector, text).await,
        Action::Click(selector) => renderer.click(selector).await,
        Action::ClickIfExists(selector) => match renderer.click(selector).await {
            Err(RenderError::ElementNotFound { .. }) => {
                tracing::debug!("Selector not found, skipping click: {}", selector);
                Ok(())
            }
            other => other,
        },
    }
}
