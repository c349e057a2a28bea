//! Camera handling. The simulation moves the camera in whole tiles once per
//! logic tick; the renderer interpolates between the previous and current
//! snapshot for smooth motion at display rate.

use dn2_core::constants::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

use crate::map::GameMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraSnapshot {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Camera {
    current: CameraSnapshot,
    previous: CameraSnapshot,
    viewport_width: i32,
    viewport_height: i32,
}

impl Camera {
    pub fn new(widescreen: bool) -> Self {
        Self {
            current: CameraSnapshot::default(),
            previous: CameraSnapshot::default(),
            viewport_width: if widescreen {
                VIEWPORT_WIDTH + 8
            } else {
                VIEWPORT_WIDTH
            },
            viewport_height: VIEWPORT_HEIGHT,
        }
    }

    pub fn viewport_width(&self) -> i32 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> i32 {
        self.viewport_height
    }

    pub fn position(&self) -> CameraSnapshot {
        self.current
    }

    /// Camera position for rendering: the previous and current tick
    /// snapshots blended by the interpolation factor, in fractional tiles.
    pub fn interpolated_position(&self, factor: f32) -> (f32, f32) {
        let blend = |previous: i32, current: i32| {
            previous as f32 + (current - previous) as f32 * factor
        };
        (
            blend(self.previous.x, self.current.x),
            blend(self.previous.y, self.current.y),
        )
    }

    /// Re-centers on the player, clamped to the map bounds. Called once per
    /// logic tick, after the player has moved.
    pub fn follow(&mut self, map: &GameMap, focus_x: i32, focus_y: i32) {
        self.previous = self.current;

        let max_x = (map.width() - self.viewport_width).max(0);
        let max_y = (map.height() - self.viewport_height).max(0);

        self.current.x = (focus_x - self.viewport_width / 2).clamp(0, max_x);
        self.current.y = (focus_y - self.viewport_height / 2 - 1).clamp(0, max_y);
    }

    /// Moves both snapshots, e.g. when restoring a checkpoint; rendering
    /// must not interpolate across a teleport.
    pub fn center_immediately(&mut self, map: &GameMap, focus_x: i32, focus_y: i32) {
        self.follow(map, focus_x, focus_y);
        self.previous = self.current;
    }

    /// True when the given box overlaps the active area (the viewport).
    pub fn is_on_screen(&self, left: i32, top: i32, right: i32, bottom: i32) -> bool {
        right >= self.current.x
            && left < self.current.x + self.viewport_width
            && bottom >= self.current.y
            && top < self.current.y + self.viewport_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dn2_core::constants::TileAttributes;

    fn wide_map() -> GameMap {
        GameMap::with_size(128, 32, vec![TileAttributes::empty()])
    }

    #[test]
    fn camera_clamps_to_map_bounds() {
        let map = wide_map();
        let mut camera = Camera::new(false);

        camera.follow(&map, 0, 0);
        assert_eq!(camera.position(), CameraSnapshot { x: 0, y: 0 });

        camera.follow(&map, 127, 31);
        assert_eq!(
            camera.position(),
            CameraSnapshot {
                x: 128 - VIEWPORT_WIDTH,
                y: 32 - VIEWPORT_HEIGHT
            }
        );
    }

    #[test]
    fn interpolation_blends_previous_and_current() {
        let map = wide_map();
        let mut camera = Camera::new(false);
        camera.follow(&map, 40, 16);
        camera.follow(&map, 44, 16);

        let (x_mid, _) = camera.interpolated_position(0.5);
        let (x_now, _) = camera.interpolated_position(1.0);
        assert!(x_mid < x_now);

        let (x_start, _) = camera.interpolated_position(0.0);
        assert_eq!(x_start, (40 - VIEWPORT_WIDTH / 2) as f32);
    }

    #[test]
    fn center_immediately_snaps_both_snapshots() {
        let map = wide_map();
        let mut camera = Camera::new(false);
        camera.follow(&map, 10, 10);
        camera.center_immediately(&map, 100, 16);

        let (x0, _) = camera.interpolated_position(0.0);
        let (x1, _) = camera.interpolated_position(0.99);
        assert_eq!(x0, x1, "no interpolation across a teleport");
    }

    #[test]
    fn widescreen_viewport_is_wider() {
        assert!(Camera::new(true).viewport_width() > Camera::new(false).viewport_width());
    }

    #[test]
    fn on_screen_test_uses_the_viewport() {
        let map = wide_map();
        let mut camera = Camera::new(false);
        camera.follow(&map, 64, 16);

        let cam = camera.position();
        assert!(camera.is_on_screen(cam.x + 1, cam.y + 1, cam.x + 2, cam.y + 2));
        assert!(!camera.is_on_screen(cam.x - 10, cam.y, cam.x - 5, cam.y + 2));
    }
}
