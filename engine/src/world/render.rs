//! The per-frame draw pass for the world. Runs at display rate, not at the
//! logic tick rate; everything here is visual only and is allowed to be
//! non-deterministic (the screen shake jitter uses a real RNG).

use dn2_core::constants::{TileAttributes, TILE_SIZE};
use dn2_core::types::PlayerModel;
use rand::Rng;

use crate::hud;
use crate::map::LevelFlags;
use crate::rng::RandomGenerator;
use crate::services::{DrawStyle, Renderer};
use crate::world::behaviors;
use crate::world::GameWorld;

/// Sprite id of the player
pub const PLAYER_SPRITE_ID: u16 = 0;

impl GameWorld {
    /// Draws one frame. `interpolation` is the fraction of the next logic
    /// tick already elapsed; it is only honored when motion smoothing is
    /// enabled.
    pub fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        model: &PlayerModel,
        interpolation: f32,
        motion_smoothing: bool,
    ) {
        let factor = if motion_smoothing { interpolation } else { 1.0 };
        let (camera_x_f, camera_y_f) = self.camera.interpolated_position(factor);
        let camera_x = camera_x_f.floor() as i32;
        let camera_y = camera_y_f.floor() as i32;

        // Sub-tile smoothing plus the screen shake offset
        let mut shift_x = -((camera_x_f - camera_x as f32) * TILE_SIZE as f32) as i32;
        let shift_y = -((camera_y_f - camera_y as f32) * TILE_SIZE as f32) as i32;
        if self.screen_shake > 0 {
            let mut jitter_rng = rand::thread_rng();
            shift_x += jitter_rng.gen_range(-self.screen_shake..=self.screen_shake);
        }
        renderer.set_global_translation(shift_x, shift_y);

        renderer.clear();

        self.draw_backdrop(renderer, camera_x, camera_y);
        self.draw_tile_layer(renderer, camera_x, camera_y, false);
        self.draw_sprites(renderer, camera_x, camera_y, false);
        self.draw_tile_layer(renderer, camera_x, camera_y, true);
        self.draw_sprites(renderer, camera_x, camera_y, true);
        self.draw_projectiles_and_effects(renderer, camera_x, camera_y);
        self.draw_water_areas(renderer, camera_x, camera_y);

        renderer.set_global_translation(0, 0);

        if let Some(color) = self.screen_flash.take() {
            renderer.flash_screen(color);
        }

        self.message_display.render(renderer);
        hud::draw_hud(
            renderer,
            model,
            self.session_id().level,
            &self.radar_dot_positions(),
            self.tick_count,
        );
    }

    fn draw_backdrop(&self, renderer: &mut dyn Renderer, camera_x: i32, camera_y: i32) {
        let offset_x = if self.level_flags.contains(LevelFlags::BACKDROP_AUTO_SCROLL) {
            self.backdrop_scroll_offset as i32
        } else if self.level_flags.contains(LevelFlags::PARALLAX_BACKDROP) {
            camera_x * TILE_SIZE / 2
        } else {
            camera_x * TILE_SIZE / 4
        };

        renderer.draw_backdrop(&self.backdrop_image, offset_x, camera_y * TILE_SIZE / 4);
    }

    /// Current frame offset for animated tiles: a four-step cycle at 140/16
    /// Hz, halved for tiles with the slow-animation attribute.
    fn animated_tile_frame(&self, slow: bool) -> u16 {
        let step = if slow {
            self.tick_count / 4
        } else {
            self.tick_count / 2
        };
        (step % 4) as u16
    }

    fn draw_tile_layer(
        &self,
        renderer: &mut dyn Renderer,
        camera_x: i32,
        camera_y: i32,
        foreground: bool,
    ) {
        for row in 0..=self.camera.viewport_height() {
            for column in 0..=self.camera.viewport_width() {
                let map_x = camera_x + column;
                let map_y = camera_y + row;

                let tile = self.map.tile_at(map_x, map_y);
                if tile == 0 {
                    continue;
                }

                let attributes = self.map.attributes(tile);
                let is_masked = tile & crate::map::MASKED_TILE_BIT != 0;
                let in_foreground =
                    is_masked || attributes.contains(TileAttributes::FOREGROUND);
                if in_foreground != foreground {
                    continue;
                }

                let tile = if attributes.contains(TileAttributes::ANIMATED) {
                    let slow = attributes.contains(TileAttributes::SLOW_ANIMATION);
                    // Animated tiles cycle through four consecutive
                    // attribute groups
                    tile + self.animated_tile_frame(slow) * 8
                } else {
                    tile
                };

                renderer.draw_tile(tile, column, row);
            }
        }
    }

    fn draw_sprites(
        &self,
        renderer: &mut dyn Renderer,
        camera_x: i32,
        camera_y: i32,
        in_front_pass: bool,
    ) {
        for (_, actor) in self.actors.iter_active() {
            match actor.draw_style {
                DrawStyle::Invisible => continue,
                DrawStyle::InFront if !in_front_pass => continue,
                DrawStyle::InFront => {}
                _ if in_front_pass => continue,
                _ => {}
            }

            let (width, height) = behaviors::dimensions_for(actor.id);
            if !self.camera.is_on_screen(
                actor.x,
                actor.y - height + 1,
                actor.x + width - 1,
                actor.y,
            ) {
                continue;
            }

            renderer.draw_sprite(
                actor.id,
                actor.frame,
                actor.x - camera_x,
                actor.y - camera_y,
                actor.draw_style,
            );
        }

        // The player is drawn with the regular sprite pass
        if !in_front_pass && self.player.is_visible_at(self.tick_count) {
            let style = if self.player.has_active_cloak() {
                DrawStyle::Translucent
            } else {
                DrawStyle::Normal
            };
            renderer.draw_sprite(
                PLAYER_SPRITE_ID,
                self.player.frame,
                self.player.x - camera_x,
                self.player.y - camera_y,
                style,
            );
        }
    }

    /// Player shots draw above all regular sprites, impact/score effects
    /// above the shots, particles on top.
    fn draw_projectiles_and_effects(
        &self,
        renderer: &mut dyn Renderer,
        camera_x: i32,
        camera_y: i32,
    ) {
        for shot in self.player_shots.iter() {
            renderer.draw_sprite(
                crate::world::projectiles::FX_SPRITE_SHOT_IMPACT,
                shot.frame % 2,
                shot.x - camera_x,
                shot.y - camera_y,
                DrawStyle::Normal,
            );
        }

        for effect in self.effects.iter() {
            renderer.draw_sprite(
                effect.sprite_id,
                effect.frame,
                effect.x - camera_x,
                effect.y - camera_y,
                DrawStyle::Normal,
            );
        }

        for (group_index, group) in self.particles.groups().enumerate() {
            for particle in 0..self.particles.particles_per_group() {
                let seed = group_index * 64 + particle;
                let spread_x = (RandomGenerator::number_at(seed) % 16) as i32 - 8;
                let rise = (RandomGenerator::number_at(seed + 7) % 4) as i32;

                let age = group.time_alive;
                let x = group.x + spread_x * age * group.x_velocity_scale / 16;
                let y = group.y - rise * age / 2 + age * age / 16;

                renderer.fill_rect(
                    x - camera_x,
                    y - camera_y,
                    x - camera_x,
                    y - camera_y,
                    group.color,
                );
            }
        }
    }

    fn draw_water_areas(&self, renderer: &mut dyn Renderer, camera_x: i32, camera_y: i32) {
        for (left, top, right, bottom) in &self.water_areas {
            renderer.fill_rect_translucent(
                (left - camera_x) * TILE_SIZE,
                (top - camera_y) * TILE_SIZE,
                (right - camera_x + 1) * TILE_SIZE,
                (bottom - camera_y + 1) * TILE_SIZE,
            );
        }
    }
}
