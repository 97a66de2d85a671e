use std::sync::Arc;

use waypoint_core::MirrorStore;
use waypoint_shortener::LinkService;

#[derive(Clone)]
pub struct AppState {
    links: Arc<dyn LinkService>,
    mirror: Arc<dyn MirrorStore>,
}

impl AppState {
    pub fn new(links: Arc<dyn LinkService>, mirror: Arc<dyn MirrorStore>) -> Self {
        Self { links, mirror }
    }

    pub fn links(&self) -> &dyn LinkService {
        self.links.as_ref()
    }

    pub fn mirror(&self) -> &dyn MirrorStore {
        self.mirror.as_ref()
    }
}
