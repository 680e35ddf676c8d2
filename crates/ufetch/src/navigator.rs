//! Navigation on unauthorized responses

/// Callback run when a request comes back 401 and a redirect target is set
///
/// Closures taking the target URL implement this trait.
pub trait Navigator: Send + Sync {
    /// Navigate to `target`
    fn navigate(&self, target: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, target: &str) {
        self(target)
    }
}

/// Assigns `window.location.href`
///
/// Does nothing outside a window context, e.g. in a web worker.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

#[cfg(target_arch = "wasm32")]
impl Navigator for BrowserNavigator {
    fn navigate(&self, target: &str) {
        match web_sys::window() {
            Some(window) => {
                if let Err(err) = window.location().set_href(target) {
                    tracing::warn!("Could not navigate to {}: {:?}", target, err);
                }
            }
            None => tracing::debug!("No window, skipping navigation to {}", target),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_closure_is_navigator() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let sink = visited.clone();
        let navigator = move |target: &str| {
            sink.lock().expect("Lock not poisoned").push(target.to_string());
        };

        navigator.navigate("/login");
        assert_eq!(
            *visited.lock().expect("Lock not poisoned"),
            vec!["/login".to_string()]
        );
    }
}
