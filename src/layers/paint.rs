use crate::brush::Brush;
use crate::foundation::core::{ALPHA_MAP_DIM, FULL_OPACITY, MAX_LAYERS, Point, Rect, texel_index};
use crate::foundation::math::shortest_dist;
use crate::layers::blend::clamp_to_full_coverage;
use crate::layers::set::LayerSet;

/// Move `vis[target]` by `delta` and rebalance the other `n - 1` slots so the total stays 255.
fn redistribute(vis: &mut [f32; MAX_LAYERS], n: usize, target: usize, delta: f32) {
    let full = f32::from(FULL_OPACITY);
    if vis[target] + delta >= full {
        for (k, v) in vis.iter_mut().enumerate().take(n) {
            *v = if k == target { full } else { 0.0 };
        }
        return;
    }

    if vis[target] == full && delta < 0.0 {
        // Only one neighbour takes the freed coverage.
        let runner_up = if target == 0 { 1 } else { target - 1 };
        vis[target] += delta;
        vis[runner_up] -= delta;
        return;
    }

    let others = full - vis[target];
    vis[target] += delta;
    for k in 0..n {
        if k == target || vis[k] == 0.0 {
            continue;
        }
        vis[k] -= delta * (vis[k] / others);
    }
}

impl<T: Clone + PartialEq> LayerSet<T> {
    /// Apply one brush tick of `texture` to this chunk.
    ///
    /// `chunk_origin` is the chunk's minimum corner in world space (`y` is world z), `strength`
    /// the opacity to move towards in `[0, 255]`, `pressure` a multiplier in `[0, 1]`. Returns
    /// whether anything changed, including layers reclaimed to make room. When all four slots
    /// hold other textures and none can be reclaimed, the texture is not applied and `false` is
    /// returned.
    pub fn paint<B: Brush + ?Sized>(
        &mut self,
        chunk_origin: Point,
        center: Point,
        brush: &B,
        strength: f32,
        pressure: f32,
        texture: &T,
    ) -> bool {
        let chunk_size = self.geometry.chunk_size;
        let texel_size = self.geometry.texel_size();
        let radius = f64::from(brush.radius());

        // Blend seams with the neighbouring chunk.
        let mut origin = chunk_origin;
        if center.y < origin.y {
            origin.y -= texel_size;
        } else if center.y > origin.y + chunk_size {
            origin.y += texel_size;
        }
        if center.x < origin.x {
            origin.x -= texel_size;
        } else if center.x > origin.x + chunk_size {
            origin.x += texel_size;
        }

        let bounds = Rect::new(origin.x, origin.y, origin.x + chunk_size, origin.y + chunk_size);
        if shortest_dist(center, bounds) > radius {
            return false;
        }

        let strength = strength.clamp(0.0, f32::from(FULL_OPACITY));
        let pressure = pressure.clamp(0.0, 1.0);

        let mut added = false;
        let mut reclaimed = false;
        let target = match self.find_slot(texture) {
            Some(_) if self.slots.len() == 1 => return false,
            Some(i) => i,
            None => {
                if strength == 0.0 {
                    return false;
                }
                if self.slots.len() == MAX_LAYERS {
                    if !self.erase_unused_layers() {
                        tracing::debug!("no free texture slot");
                        return false;
                    }
                    reclaimed = true;
                }
                match self.add_layer(texture.clone()) {
                    Some(0) => return true,
                    Some(i) => {
                        added = true;
                        i
                    }
                    None => {
                        tracing::debug!("unable to add texture layer");
                        return false;
                    }
                }
            }
        };

        self.ensure_independent();

        let n = self.slots.len();
        let mut changed = false;
        for z in 0..ALPHA_MAP_DIM {
            for x in 0..ALPHA_MAP_DIM {
                let texel_center = Point::new(
                    origin.x + (x as f64 + 0.5) * texel_size,
                    origin.y + (z as f64 + 0.5) * texel_size,
                );
                let dist = center.distance(texel_center);
                if dist > radius {
                    continue;
                }

                let texel = texel_index(x, z);
                let mut vis = self.texel_weights(texel);
                if vis[target] == strength {
                    continue;
                }

                let delta = (strength - vis[target]) * pressure * brush.value(dist as f32);
                redistribute(&mut vis, n, target, delta);

                let values = clamp_to_full_coverage(&vis[1..n], target.checked_sub(1));
                let old = self.stored_alphas(texel);
                if old[..n - 1] == values[..n - 1] {
                    continue;
                }
                changed = true;
                for (k, &v) in values.iter().enumerate().take(n - 1) {
                    if let Some(map) = self.slots[k + 1].alpha.as_mut() {
                        map.set(texel, v);
                    }
                    self.write_display_texel(texel, k, v);
                }
            }
        }

        if !changed {
            if added {
                self.remove_slot(target);
                self.regenerate_display();
            }
            return reclaimed;
        }

        let visible = self.layer_visibility();
        if !self.erase_invisible(visible) {
            self.display.stale = true;
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/paint.rs"]
mod tests;
