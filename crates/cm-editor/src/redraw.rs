//! Redraw coalescing.
//!
//! Any number of requests between two frames collapse into one scheduled
//! frame. The host owns the actual scheduling (`requestAnimationFrame` in
//! the browser); this only decides whether a new frame must be asked for.

#[derive(Debug, Default)]
pub struct RedrawCoordinator {
    scheduled: bool,
    coalesced: u32,
}

impl RedrawCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the first request since the last frame.
    pub fn request(&mut self) -> bool {
        if self.scheduled {
            self.coalesced += 1;
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Called at the start of a frame.
    pub fn begin_frame(&mut self) {
        if self.coalesced > 0 {
            log::trace!("frame absorbed {} extra redraw requests", self.coalesced);
        }
        self.scheduled = false;
        self.coalesced = 0;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce_per_frame() {
        let mut r = RedrawCoordinator::new();
        assert!(r.request());
        assert!(!r.request());
        assert!(!r.request());
        assert!(r.is_scheduled());
        r.begin_frame();
        assert!(!r.is_scheduled());
        assert!(r.request());
    }
}
