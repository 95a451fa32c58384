//! Process-wide last-chance handler.

use std::{
    panic,
    sync::{Arc, OnceLock},
};

use super::ExceptionDispatcher;

static INSTALLED: OnceLock<Arc<ExceptionDispatcher>> = OnceLock::new();

/// Route panics through `dispatcher` for the rest of the process.
///
/// The previously installed hook still runs afterwards. Only the first call
/// installs anything; later calls return `false` and leave the first
/// dispatcher in place. The hook is never removed.
pub fn install_panic_hook(dispatcher: Arc<ExceptionDispatcher>) -> bool {
    let mut installed_now = false;
    INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        let hook_dispatcher = Arc::clone(&dispatcher);
        panic::set_hook(Box::new(move |info| {
            hook_dispatcher.dispatch_panic(info);
            previous(info);
        }));
        installed_now = true;
        dispatcher
    });
    installed_now
}

/// Dispatcher installed by [`install_panic_hook`], if any.
pub fn installed_dispatcher() -> Option<Arc<ExceptionDispatcher>> {
    INSTALLED.get().cloned()
}
