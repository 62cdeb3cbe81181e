//! Notification routers.
//!
//! Two independent routers, one per push provider, each composed of the same
//! four pieces: a config parser (raw recipient text into a username map), an
//! event filter, a recipient resolver, and a dispatcher issuing HTTP POSTs
//! through the [`transport::PushTransport`] seam. The routers share design but
//! not code; provider quirks live entirely inside their own modules.
//!
//! Each router holds its configuration as an immutable snapshot behind an
//! `RwLock<Arc<_>>`. Reload builds a fresh snapshot and swaps the Arc; an
//! in-flight event keeps reading the snapshot it started with.

pub mod bark;
pub mod outcome;
pub mod transport;
pub mod wxpusher;

pub use bark::BarkRouter;
pub use outcome::DispatchOutcome;
pub use transport::{PushTransport, ReqwestTransport};
pub use wxpusher::WxPusherRouter;

use std::sync::Arc;

use crate::config::Settings;

/// Both routers, bundled for the forwarder task and the API layer.
pub struct Routers {
    pub bark: BarkRouter,
    pub wxpusher: WxPusherRouter,
}

impl Routers {
    /// Build both routers from settings, sharing one transport.
    pub fn new(settings: &Settings, transport: Arc<dyn PushTransport>) -> Self {
        Self {
            bark: BarkRouter::new(&settings.bark, transport.clone()),
            wxpusher: WxPusherRouter::new(&settings.wxpusher, transport),
        }
    }

    /// Atomically replace both router snapshots from freshly loaded settings.
    pub fn reload(&self, settings: &Settings) {
        self.bark.reload(&settings.bark);
        self.wxpusher.reload(&settings.wxpusher);
    }
}
