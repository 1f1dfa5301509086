use super::lookup::{Element, Lookup, Target};
use super::surface::Surface;
use super::waiter;
use log::debug;
use std::time::Duration;

/// Turns semantic targets into live elements by trying their strategies in order.
pub struct Resolver<'a> {
    surface: &'a dyn Surface,
}

impl<'a> Resolver<'a> {
    pub fn new(surface: &'a dyn Surface) -> Self {
        Self { surface }
    }

    /// First visible, enabled element of the first productive strategy.
    pub async fn resolve(&self, target: &Target) -> Option<Element> {
        for lookup in &target.strategies {
            if let Some(el) = self.query(target, lookup).await.into_iter().find(Element::usable) {
                debug!("[resolve] {} -> {} via {}", target.name, el.handle, lookup);
                return Some(el);
            }
        }
        debug!("[resolve] {} not found", target.name);
        None
    }

    /// Every visible, enabled element of the first strategy that yields any.
    pub async fn resolve_all(&self, target: &Target) -> Vec<Element> {
        for lookup in &target.strategies {
            let usable: Vec<Element> = self
                .query(target, lookup)
                .await
                .into_iter()
                .filter(Element::usable)
                .collect();
            if !usable.is_empty() {
                return usable;
            }
        }
        Vec::new()
    }

    /// First visible element whatever its enabled state. Used where a
    /// disabled control is itself the signal.
    pub async fn locate(&self, target: &Target) -> Option<Element> {
        for lookup in &target.strategies {
            if let Some(el) = self.query(target, lookup).await.into_iter().find(|el| el.visible) {
                return Some(el);
            }
        }
        None
    }

    pub async fn wait_for(&self, target: &Target, timeout: Duration) -> Option<Element> {
        waiter::poll_until(timeout, || self.resolve(target)).await
    }

    /// Waits for any of `texts` to show up in the document body.
    pub async fn wait_for_text(&self, texts: &[String], timeout: Duration) -> Option<String> {
        waiter::poll_until(timeout, || self.body_text_hit(texts)).await
    }

    pub async fn body_text_hit(&self, texts: &[String]) -> Option<String> {
        for text in texts {
            match self.surface.body_contains(text).await {
                Ok(true) => return Some(text.clone()),
                Ok(false) => {}
                Err(e) => debug!("[resolve] body text check failed: {:#}", e),
            }
        }
        None
    }

    async fn query(&self, target: &Target, lookup: &Lookup) -> Vec<Element> {
        match self.surface.query(lookup).await {
            Ok(found) => found,
            Err(e) => {
                debug!("[resolve] {} lookup {} failed: {:#}", target.name, lookup, e);
                Vec::new()
            }
        }
    }
}
